//! Image file discovery using walkdir.
//!
//! # Overview
//!
//! The [`Walker`] recursively enumerates files under a root directory and
//! keeps those whose extension is one of the recognized image extensions
//! (compared case-insensitively).
//!
//! Entries are sorted by file name inside every directory, so the returned
//! order is stable across runs. Clustering treats that order as load-bearing:
//! it decides which file becomes each group's representative.
//!
//! # Example
//!
//! ```no_run
//! use simdupe::scanner::Walker;
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Pictures"));
//! for path in walker.walk().unwrap() {
//!     println!("{}", path.display());
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::WalkDir;

use super::ScanError;

/// Image extensions recognized by default (lowercase, without dot).
pub const DEFAULT_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "gif"];

/// Directory walker for image discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Lowercase extensions to keep
    extensions: Vec<String>,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a walker for `root` using [`DEFAULT_EXTENSIONS`].
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            shutdown_flag: None,
        }
    }

    /// Replace the recognized extensions.
    ///
    /// Leading dots are stripped and matching is case-insensitive.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Check whether `path` carries one of the recognized extensions.
    #[must_use]
    pub fn is_image_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .is_some_and(|ext| self.extensions.iter().any(|known| *known == ext))
    }

    /// Walk the directory tree and collect matching files in traversal order.
    ///
    /// Unreadable subdirectories are logged and skipped.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the root does not exist
    /// - `NotADirectory` if the root is a file
    /// - `Interrupted` if the shutdown flag was raised during the walk
    pub fn walk(&self) -> Result<Vec<PathBuf>, ScanError> {
        let metadata = std::fs::metadata(&self.root).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ScanError::NotFound(self.root.clone()),
            std::io::ErrorKind::PermissionDenied => {
                ScanError::PermissionDenied(self.root.clone())
            }
            _ => ScanError::Io {
                path: self.root.clone(),
                source: e,
            },
        })?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }

        log::debug!(
            "Walking {} for extensions {:?}",
            self.root.display(),
            self.extensions
        );

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            if self.is_shutdown_requested() {
                log::info!("Walk interrupted after {} files", files.len());
                return Err(ScanError::Interrupted);
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_file() && self.is_image_path(entry.path()) {
                log::trace!("Found image: {}", entry.path().display());
                files.push(entry.into_path());
            }
        }

        log::debug!("Walk complete: {} image files", files.len());
        Ok(files)
    }
}
