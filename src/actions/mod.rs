//! File actions module.
//!
//! This module provides permanent deletion of selected images, one file at a
//! time or as a batch that records failures and keeps going.
//!
//! ```no_run
//! use simdupe::actions::permanent_delete;
//! use std::path::Path;
//!
//! match permanent_delete(Path::new("/photos/copy.jpg")) {
//!     Ok(result) => println!("Deleted {} bytes", result.size),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

pub mod delete;

// Re-export commonly used types
pub use delete::{
    delete_batch, permanent_delete, BatchDeleteResult, DeleteError, DeleteFailure,
    DeleteProgressCallback, DeleteResult,
};
