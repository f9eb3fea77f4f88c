//! Permanent file deletion.
//!
//! Removal is immediate and irreversible: files are unlinked with
//! [`std::fs::remove_file`], never moved to a trash folder.
//!
//! Batch deletion processes every path in order. A failure is logged and
//! recorded, and the batch moves on to the next path.
//!
//! # Example
//!
//! ```no_run
//! use simdupe::actions::delete::delete_batch;
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("/photos/copy1.jpg"), PathBuf::from("/photos/copy2.jpg")];
//! let result = delete_batch(&paths, None);
//! println!("{}", result.summary());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use serde::Serialize;
use thiserror::Error;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Path exists but is not a regular file.
    #[error("not a file: {0}")]
    NotAFile(PathBuf),

    /// The unlink call failed.
    #[error("delete failed for {path}: {message}")]
    RemoveFailed {
        /// File that could not be removed
        path: PathBuf,
        /// OS error message
        message: String,
    },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::NotAFile(p)
            | Self::RemoveFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }
}

/// A successfully deleted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
}

impl DeleteResult {
    /// Create a new delete result.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// A path that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteFailure {
    /// Path that failed
    pub path: PathBuf,
    /// Error message
    pub message: String,
}

/// Results of a batch deletion operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchDeleteResult {
    /// Successfully deleted files.
    pub successes: Vec<DeleteResult>,
    /// Failed deletions with their errors.
    pub failures: Vec<DeleteFailure>,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Total number of attempted deletions.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Every attempted path, successes first.
    pub fn attempted_paths(&self) -> impl Iterator<Item = &Path> {
        self.successes
            .iter()
            .map(|s| s.path.as_path())
            .chain(self.failures.iter().map(|f| f.path.as_path()))
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = ByteSize::b(self.bytes_freed);
        if self.all_succeeded() {
            format!("Deleted {} file(s), freed {}", self.success_count(), freed)
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {}",
                self.success_count(),
                self.failure_count(),
                freed
            )
        }
    }
}

/// Callback trait for deletion progress reporting.
pub trait DeleteProgressCallback: Send + Sync {
    /// Called before each file deletion.
    fn on_before_delete(&self, _path: &Path, _index: usize, _total: usize) {}

    /// Called after successful deletion.
    fn on_delete_success(&self, _path: &Path, _size: u64) {}

    /// Called after failed deletion.
    fn on_delete_failure(&self, _path: &Path, _error: &str) {}

    /// Called when batch operation completes.
    fn on_complete(&self, _result: &BatchDeleteResult) {}
}

/// Permanently delete a file.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the metadata cannot be read
/// - `NotAFile` for directories and other non-files
/// - `RemoveFailed` if the unlink fails
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DeleteError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => DeleteError::PermissionDenied(path.to_path_buf()),
        _ => DeleteError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    if metadata.is_dir() {
        return Err(DeleteError::NotAFile(path.to_path_buf()));
    }
    let size = metadata.len();

    fs::remove_file(path).map_err(|e| DeleteError::RemoveFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    log::info!("Deleted: {} ({})", path.display(), ByteSize::b(size));

    Ok(DeleteResult::new(path.to_path_buf(), size))
}

/// Delete multiple files in order.
///
/// Failures are logged and recorded; they never stop the batch.
///
/// # Arguments
///
/// * `paths` - Paths to delete, in order
/// * `callback` - Optional progress callback
#[must_use]
pub fn delete_batch(
    paths: &[PathBuf],
    callback: Option<&dyn DeleteProgressCallback>,
) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();
    let total = paths.len();

    for (index, path) in paths.iter().enumerate() {
        if let Some(cb) = callback {
            cb.on_before_delete(path, index, total);
        }

        match permanent_delete(path) {
            Ok(del) => {
                result.bytes_freed += del.size;
                if let Some(cb) = callback {
                    cb.on_delete_success(path, del.size);
                }
                result.successes.push(del);
            }
            Err(e) => {
                let message = e.to_string();
                log::warn!("Failed to delete {}: {}", path.display(), message);
                if let Some(cb) = callback {
                    cb.on_delete_failure(path, &message);
                }
                result.failures.push(DeleteFailure {
                    path: path.clone(),
                    message,
                });
            }
        }
    }

    if let Some(cb) = callback {
        cb.on_complete(&result);
    }

    log::info!("{}", result.summary());

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn create_temp_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).expect("Failed to write temp file");
        path
    }

    #[test]
    fn test_delete_error_path() {
        let path = PathBuf::from("/test/path");
        assert_eq!(DeleteError::NotFound(path.clone()).path(), path.as_path());
        assert_eq!(
            DeleteError::RemoveFailed {
                path: path.clone(),
                message: "busy".into()
            }
            .path(),
            path.as_path()
        );
    }

    #[test]
    fn test_delete_error_display() {
        let err = DeleteError::NotFound(PathBuf::from("/x.png"));
        assert!(err.to_string().contains("not found"));
        let err = DeleteError::NotAFile(PathBuf::from("/dir"));
        assert_eq!(err.to_string(), "not a file: /dir");
    }

    #[test]
    fn test_batch_delete_result_default() {
        let result = BatchDeleteResult::default();
        assert_eq!(result.total_count(), 0);
        assert!(result.all_succeeded());
        assert!(result.summary().starts_with("Deleted 0 file(s), freed"));
    }

    #[test]
    fn test_permanent_delete_success() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = create_temp_file(&dir, "delete_me.png", b"test content");

        let result = permanent_delete(&path).expect("Failed to delete");

        assert!(!path.exists());
        assert_eq!(result.size, 12);
    }

    #[test]
    fn test_permanent_delete_not_found() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let result = permanent_delete(&dir.path().join("gone.png"));
        assert!(matches!(result, Err(DeleteError::NotFound(_))));
    }

    #[test]
    fn test_permanent_delete_directory_rejected() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let result = permanent_delete(dir.path());
        assert!(matches!(result, Err(DeleteError::NotAFile(_))));
        assert!(dir.path().exists());
    }

    #[test]
    fn test_delete_batch_continues_after_failure() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let missing = dir.path().join("missing.png");
        let existing = create_temp_file(&dir, "exists.png", b"content");

        let result = delete_batch(&[missing.clone(), existing.clone()], None);

        assert_eq!(result.success_count(), 1);
        assert_eq!(result.failure_count(), 1);
        assert_eq!(result.failures[0].path, missing);
        assert_eq!(result.bytes_freed, 7);
        assert!(!existing.exists());

        let attempted: Vec<_> = result.attempted_paths().collect();
        assert_eq!(attempted, vec![existing.as_path(), missing.as_path()]);
    }

    #[derive(Default)]
    struct TestCallback {
        before: AtomicUsize,
        success: AtomicUsize,
        failure: AtomicUsize,
        complete: AtomicBool,
    }

    impl DeleteProgressCallback for TestCallback {
        fn on_before_delete(&self, _path: &Path, _index: usize, _total: usize) {
            self.before.fetch_add(1, Ordering::SeqCst);
        }

        fn on_delete_success(&self, _path: &Path, _size: u64) {
            self.success.fetch_add(1, Ordering::SeqCst);
        }

        fn on_delete_failure(&self, _path: &Path, _error: &str) {
            self.failure.fetch_add(1, Ordering::SeqCst);
        }

        fn on_complete(&self, _result: &BatchDeleteResult) {
            self.complete.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_delete_batch_with_callback() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = create_temp_file(&dir, "a.png", b"content");
        let callback = TestCallback::default();

        let result = delete_batch(
            &[path, dir.path().join("b.png")],
            Some(&callback as &dyn DeleteProgressCallback),
        );

        assert_eq!(result.total_count(), 2);
        assert_eq!(callback.before.load(Ordering::SeqCst), 2);
        assert_eq!(callback.success.load(Ordering::SeqCst), 1);
        assert_eq!(callback.failure.load(Ordering::SeqCst), 1);
        assert!(callback.complete.load(Ordering::SeqCst));
    }
}
