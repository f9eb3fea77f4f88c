//! Scan pipeline from a directory to similarity groups.
//!
//! # Overview
//!
//! [`SimilarityFinder`] runs three steps in sequence:
//!
//! 1. **Walk** - collect image paths in stable traversal order
//! 2. **Fingerprint** - decode and hash each file; unreadable files are
//!    logged and skipped
//! 3. **Cluster** - greedy grouping under the configured threshold
//!
//! Cancellation is checked between files. A walk cut short fails with
//! [`FinderError::Interrupted`]; fingerprinting cut short keeps the work done
//! so far, clusters it, and marks the summary as interrupted.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{ClusterBuilder, ClusterError, DistanceMetric, DistanceWeights, SimilarityGroup};
use crate::progress::{ProgressCallback, PHASE_FINGERPRINTING, PHASE_WALKING};
use crate::scanner::{
    FingerprintExtractor, ImageFingerprint, ScanError, SkippedImage, Walker, DEFAULT_EXTENSIONS,
};

/// Configuration for the similarity finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Maximum weighted distance for two images to be grouped.
    pub threshold: f64,
    /// Channel weights of the distance metric.
    pub weights: DistanceWeights,
    /// Recognized image extensions (lowercase, without dot).
    pub extensions: Vec<String>,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("threshold", &self.threshold)
            .field("weights", &self.weights)
            .field("extensions", &self.extensions)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            threshold: super::DEFAULT_THRESHOLD,
            weights: DistanceWeights::default(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the clustering threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the distance weights.
    #[must_use]
    pub fn with_weights(mut self, weights: DistanceWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set the recognized extensions.
    #[must_use]
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a similarity scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Image files found by the walk
    pub total_files: usize,
    /// Images successfully fingerprinted
    pub fingerprinted: usize,
    /// Images that could not be decoded
    pub skipped: Vec<SkippedImage>,
    /// Number of reportable groups
    pub groups: usize,
    /// Members selected for deletion by default across all groups
    pub candidate_deletions: usize,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Whether fingerprinting stopped early on a shutdown request
    pub interrupted: bool,
}

impl ScanSummary {
    /// Check whether no similar images were found.
    #[must_use]
    pub fn is_empty_result(&self) -> bool {
        self.groups == 0
    }
}

/// Images fingerprinted by one pass, in input order.
#[derive(Debug, Default)]
pub struct FingerprintBatch {
    /// Successfully fingerprinted images
    pub fingerprints: Vec<ImageFingerprint>,
    /// Files that failed to decode
    pub skipped: Vec<SkippedImage>,
    /// Whether the pass stopped early
    pub interrupted: bool,
}

/// Errors that can occur during a similarity scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Threshold or weights are invalid.
    #[error(transparent)]
    InvalidConfig(#[from] ClusterError),

    /// A scan error occurred.
    #[error(transparent)]
    Scan(ScanError),
}

impl From<ScanError> for FinderError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::NotFound(path) => Self::PathNotFound(path),
            ScanError::NotADirectory(path) => Self::NotADirectory(path),
            ScanError::Interrupted => Self::Interrupted,
            other => Self::Scan(other),
        }
    }
}

/// Similarity finder that orchestrates walk, fingerprint and cluster.
///
/// # Example
///
/// ```no_run
/// use simdupe::similarity::{FinderConfig, SimilarityFinder};
/// use std::path::Path;
///
/// let finder = SimilarityFinder::new(FinderConfig::default().with_threshold(4.0)).unwrap();
/// let (groups, summary) = finder.find_similar(Path::new("/some/path")).unwrap();
///
/// println!("Found {} groups in {} images", groups.len(), summary.fingerprinted);
/// ```
pub struct SimilarityFinder {
    config: FinderConfig,
    extractor: FingerprintExtractor,
    builder: ClusterBuilder,
}

impl std::fmt::Debug for SimilarityFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityFinder")
            .field("config", &self.config)
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}

impl SimilarityFinder {
    /// Create a new finder with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the threshold or weights are invalid.
    pub fn new(config: FinderConfig) -> Result<Self, FinderError> {
        let metric = DistanceMetric::new(config.weights)?;
        let builder = ClusterBuilder::new(metric, config.threshold)?;
        Ok(Self {
            config,
            extractor: FingerprintExtractor::new(),
            builder,
        })
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// The cluster builder in use.
    #[must_use]
    pub fn builder(&self) -> &ClusterBuilder {
        &self.builder
    }

    /// Collect image paths under `root` in traversal order.
    ///
    /// # Errors
    ///
    /// - `PathNotFound` / `NotADirectory` for a bad root
    /// - `Interrupted` if shutdown was requested during the walk
    pub fn collect_images(&self, root: &Path) -> Result<Vec<PathBuf>, FinderError> {
        let mut walker = Walker::new(root).with_extensions(&self.config.extensions);
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_WALKING, 0);
        }
        let files = walker.walk();
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_WALKING);
        }
        Ok(files?)
    }

    /// Fingerprint `files` in order, stopping early on shutdown.
    ///
    /// Unreadable files are logged and recorded as skipped.
    #[must_use]
    pub fn fingerprint_files(&self, files: &[PathBuf]) -> FingerprintBatch {
        let total = files.len();
        let mut batch = FingerprintBatch::default();

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_FINGERPRINTING, total);
        }

        for (i, path) in files.iter().enumerate() {
            if self.config.is_shutdown_requested() {
                log::info!("Fingerprinting interrupted after {} of {} files", i, total);
                batch.interrupted = true;
                break;
            }

            match self.extractor.extract_path(path) {
                Ok(fingerprint) => {
                    log::trace!("{}: {}", path.display(), fingerprint.perceptual_hash);
                    batch
                        .fingerprints
                        .push(ImageFingerprint::new(path.clone(), fingerprint));
                }
                Err(e) => {
                    log::warn!("Skipping {}", e);
                    batch.skipped.push(SkippedImage {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                }
            }

            if let Some(ref callback) = self.config.progress_callback {
                callback.on_progress(i + 1, total);
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_FINGERPRINTING);
        }
        batch
    }

    /// Find similar images under `root`.
    ///
    /// # Errors
    ///
    /// - `PathNotFound` if the path does not exist
    /// - `NotADirectory` if the path is not a directory
    /// - `Interrupted` if shutdown was requested before fingerprinting
    pub fn find_similar(
        &self,
        root: &Path,
    ) -> Result<(Vec<SimilarityGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        log::info!("Starting similarity scan of {}", root.display());

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let files = self.collect_images(root)?;
        log::info!("Found {} image files", files.len());

        let (groups, mut summary) = self.find_similar_in_files(&files);
        summary.scan_duration = start_time.elapsed();
        Ok((groups, summary))
    }

    /// Fingerprint and cluster an explicit, ordered list of files.
    #[must_use]
    pub fn find_similar_in_files(&self, files: &[PathBuf]) -> (Vec<SimilarityGroup>, ScanSummary) {
        let start_time = Instant::now();
        let batch = self.fingerprint_files(files);
        let groups = self.builder.cluster(&batch.fingerprints);

        let summary = ScanSummary {
            total_files: files.len(),
            fingerprinted: batch.fingerprints.len(),
            skipped: batch.skipped,
            groups: groups.len(),
            candidate_deletions: groups.iter().map(|g| g.len().saturating_sub(1)).sum(),
            scan_duration: start_time.elapsed(),
            interrupted: batch.interrupted,
        };

        log::info!(
            "Scan complete: {} fingerprinted, {} skipped, {} groups",
            summary.fingerprinted,
            summary.skipped.len(),
            summary.groups
        );
        (groups, summary)
    }
}
