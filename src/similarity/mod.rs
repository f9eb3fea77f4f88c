//! Similarity detection module.
//!
//! This module provides functionality for:
//! - Weighted multi-channel fingerprint distance
//! - Greedy, order-dependent clustering under a threshold
//! - The scan pipeline from directory to similarity groups
//!
//! # Architecture
//!
//! - [`distance`]: [`DistanceMetric`] and weight presets
//! - [`cluster`]: [`ClusterBuilder`] and [`SimilarityGroup`]
//! - [`finder`]: [`SimilarityFinder`] orchestrating walk, fingerprint and cluster

pub mod cluster;
pub mod distance;
pub mod finder;

pub use cluster::{validate_threshold, ClusterBuilder, SimilarityGroup, DEFAULT_THRESHOLD};
pub use distance::{
    flip_component, rotation_component, DistanceComponents, DistanceMetric, DistanceWeights,
    WeightPreset,
};
pub use finder::{FinderConfig, FinderError, ScanSummary, SimilarityFinder};

/// Configuration contract violations for the metric and clustering.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    /// Threshold is negative, NaN or infinite.
    #[error("Invalid threshold {0}: must be a finite number >= 0")]
    InvalidThreshold(f64),

    /// A channel weight is negative, NaN or infinite.
    #[error("Invalid {channel} weight {value}: must be a finite number >= 0")]
    InvalidWeight {
        /// Channel name
        channel: &'static str,
        /// Rejected value
        value: f64,
    },
}
