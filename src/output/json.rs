//! JSON output formatter for similarity scan results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "generated_at": "2026-01-01T12:00:00+00:00",
//!   "threshold": 4.0,
//!   "weights": { "perceptual": 0.4, "difference": 0.3, "rotation": 0.2, "flip": 0.1 },
//!   "groups": [
//!     {
//!       "index": 1,
//!       "key": "c3a1f00f0e0e1e3c",
//!       "representative": "/photos/a.jpg",
//!       "members": ["/photos/a.jpg", "/photos/a_copy.jpg"],
//!       "default_selection": ["/photos/a_copy.jpg"]
//!     }
//!   ],
//!   "skipped": [{ "path": "/photos/broken.png", "reason": "..." }],
//!   "summary": {
//!     "total_files": 120,
//!     "fingerprinted": 119,
//!     "unreadable": 1,
//!     "groups": 1,
//!     "candidate_deletions": 1,
//!     "scan_duration_ms": 2345,
//!     "interrupted": false,
//!     "exit_code": 0,
//!     "exit_code_name": "SD000"
//!   }
//! }
//! ```

use std::io::Write;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::ExitCode;
use crate::scanner::SkippedImage;
use crate::similarity::{DistanceWeights, FinderConfig, ScanSummary, SimilarityGroup};

/// A single similarity group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonGroup {
    /// 1-based display index
    pub index: usize,
    /// Perceptual hash of the representative, as hex
    pub key: String,
    /// First member; kept by default
    pub representative: String,
    /// All members in group order
    pub members: Vec<String>,
    /// Members pre-selected for deletion
    pub default_selection: Vec<String>,
}

impl JsonGroup {
    /// Convert a group found at zero-based `position`.
    #[must_use]
    pub fn from_group(position: usize, group: &SimilarityGroup) -> Self {
        Self {
            index: position + 1,
            key: group.key().to_string(),
            representative: group
                .representative()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default(),
            members: group
                .members()
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
            default_selection: group
                .default_selection()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Image files found by the walk
    pub total_files: usize,
    /// Images successfully fingerprinted
    pub fingerprinted: usize,
    /// Images that could not be decoded
    pub unreadable: usize,
    /// Number of reportable groups
    pub groups: usize,
    /// Members selected for deletion by default
    pub candidate_deletions: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// Whether the scan was interrupted
    pub interrupted: bool,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "SD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            fingerprinted: summary.fingerprinted,
            unreadable: summary.skipped.len(),
            groups: summary.groups,
            candidate_deletions: summary.candidate_deletions,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            interrupted: summary.interrupted,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// When the report was produced
    pub generated_at: DateTime<Local>,
    /// Clustering threshold in effect
    pub threshold: f64,
    /// Distance weights in effect
    pub weights: DistanceWeights,
    /// Groups in cluster order
    pub groups: Vec<JsonGroup>,
    /// Files skipped during fingerprinting
    pub skipped: Vec<SkippedImage>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build a report.
    ///
    /// # Arguments
    ///
    /// * `groups` - Groups found during scanning
    /// * `summary` - The scan summary statistics
    /// * `config` - Finder settings the scan ran with
    /// * `exit_code` - The exit code for this run
    #[must_use]
    pub fn new(
        groups: &[SimilarityGroup],
        summary: &ScanSummary,
        config: &FinderConfig,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            generated_at: Local::now(),
            threshold: config.threshold,
            weights: config.weights,
            groups: groups
                .iter()
                .enumerate()
                .map(|(i, g)| JsonGroup::from_group(i, g))
                .collect(),
            skipped: summary.skipped.clone(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
