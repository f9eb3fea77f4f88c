//! Interactive review of similarity groups.
//!
//! [`ReviewSession`] holds the review state of one clustering run: which
//! groups are revealed, which paths are marked for deletion, and what is left
//! after a deletion. Display layers render snapshots of it and forward
//! commands; they never own clustering state.

pub mod session;

use std::path::PathBuf;

pub use session::{ReviewSession, SessionState, DEFAULT_PAGE_SIZE};

/// Errors returned by review commands.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    /// Page size must be at least 1.
    #[error("Invalid page size: must be at least 1")]
    InvalidPageSize,

    /// No group contains the path.
    #[error("Path is not part of any group: {0}")]
    UnknownPath(PathBuf),

    /// The path's group has not been materialized yet.
    #[error("Group of {0} is not materialized yet")]
    NotMaterialized(PathBuf),

    /// Page index past the last page.
    #[error("Page {page} out of range ({pages} pages)")]
    PageOutOfRange {
        /// Requested page (0-based)
        page: usize,
        /// Number of pages
        pages: usize,
    },

    /// Group index is not a materialized group.
    #[error("Group {0} is not materialized")]
    GroupOutOfRange(usize),
}
