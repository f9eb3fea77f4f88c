//! Scanner module for image discovery and fingerprinting.
//!
//! This module provides functionality for:
//! - Recursive directory walking filtered by image extension
//! - Per-image fingerprint extraction
//!
//! # Architecture
//!
//! - [`walker`]: Directory traversal and image file discovery
//! - [`fingerprint`]: Hash channels computed for every decoded image
//!
//! # Example
//!
//! ```no_run
//! use simdupe::scanner::{FingerprintExtractor, Walker};
//! use std::path::Path;
//!
//! let extractor = FingerprintExtractor::new();
//! for path in Walker::new(Path::new(".")).walk().unwrap() {
//!     match extractor.extract_path(&path) {
//!         Ok(set) => println!("{}: {}", path.display(), set.perceptual_hash),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod fingerprint;
pub mod walker;

use std::path::PathBuf;

use serde::Serialize;

// Re-export main types
pub use fingerprint::{FingerprintError, FingerprintExtractor, FingerprintSet, Hash64, HASH_BITS};
pub use walker::{Walker, DEFAULT_EXTENSIONS};

/// A decoded image path paired with its fingerprint.
///
/// Collections of these are always kept as ordered sequences: their order
/// decides group representatives during clustering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFingerprint {
    /// Path of the image file
    pub path: PathBuf,
    /// Hashes computed for the image
    pub fingerprint: FingerprintSet,
}

impl ImageFingerprint {
    /// Pair a path with its fingerprint.
    #[must_use]
    pub fn new(path: PathBuf, fingerprint: FingerprintSet) -> Self {
        Self { path, fingerprint }
    }
}

/// An image that was skipped during fingerprinting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedImage {
    /// Path of the skipped file
    pub path: PathBuf,
    /// Why it was skipped
    pub reason: String,
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing the root directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The walk was interrupted by a shutdown request.
    #[error("Walk interrupted")]
    Interrupted,

    /// An I/O error occurred while accessing the root.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
