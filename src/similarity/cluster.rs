//! Greedy single-link clustering of fingerprints.
//!
//! # Algorithm
//!
//! Fingerprints are visited in their given order. Each path not yet assigned
//! to a group seeds a candidate group; every other unassigned path within the
//! threshold of the seed joins it. Candidate groups with a single member are
//! discarded and their seed stays available for later seeds.
//!
//! The result depends on input order: the seed of each group is its
//! representative, and a path close to two seeds joins whichever comes
//! first. Groups are not transitively closed.
//!
//! Complexity is O(n²) fingerprint comparisons, each a fixed number of
//! 64-bit popcounts.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{ClusterError, DistanceMetric};
use crate::scanner::{Hash64, ImageFingerprint};

/// Default clustering threshold.
pub const DEFAULT_THRESHOLD: f64 = 4.0;

/// An ordered group of similar images.
///
/// The first member is the representative: it is never selected for
/// deletion by default. The key is the perceptual hash of the member that
/// seeded the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityGroup {
    /// Perceptual hash of the seeding member
    key: Hash64,
    /// Member paths in discovery order
    members: Vec<PathBuf>,
}

impl SimilarityGroup {
    /// Create a group from its key and ordered members.
    #[must_use]
    pub fn new(key: Hash64, members: Vec<PathBuf>) -> Self {
        Self { key, members }
    }

    /// Representative key of this group.
    #[must_use]
    pub fn key(&self) -> Hash64 {
        self.key
    }

    /// Members in discovery order.
    #[must_use]
    pub fn members(&self) -> &[PathBuf] {
        &self.members
    }

    /// The first member, kept by default.
    #[must_use]
    pub fn representative(&self) -> Option<&Path> {
        self.members.first().map(PathBuf::as_path)
    }

    /// Members selected for deletion by default (all but the first).
    pub fn default_selection(&self) -> impl Iterator<Item = &PathBuf> {
        self.members.iter().skip(1)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if this group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Check if this group has at least two members.
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        self.members.len() > 1
    }

    /// Check whether `path` is a member.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.members.iter().any(|m| m == path)
    }

    /// Rebuild this group without the given paths.
    ///
    /// Returns `None` when fewer than two members survive.
    #[must_use]
    pub fn without(&self, removed: &HashSet<PathBuf>) -> Option<Self> {
        let members: Vec<PathBuf> = self
            .members
            .iter()
            .filter(|m| !removed.contains(*m))
            .cloned()
            .collect();
        let group = Self::new(self.key, members);
        group.is_reportable().then_some(group)
    }
}

/// Validate a clustering threshold.
///
/// # Errors
///
/// Returns `InvalidThreshold` for negative or non-finite values.
pub fn validate_threshold(threshold: f64) -> Result<f64, ClusterError> {
    if threshold.is_finite() && threshold >= 0.0 {
        Ok(threshold)
    } else {
        Err(ClusterError::InvalidThreshold(threshold))
    }
}

/// Partitions fingerprints into similarity groups.
#[derive(Debug, Clone, Copy)]
pub struct ClusterBuilder {
    metric: DistanceMetric,
    threshold: f64,
}

impl ClusterBuilder {
    /// Create a builder with the given metric and threshold.
    ///
    /// # Errors
    ///
    /// Returns `InvalidThreshold` for negative or non-finite thresholds.
    pub fn new(metric: DistanceMetric, threshold: f64) -> Result<Self, ClusterError> {
        Ok(Self {
            metric,
            threshold: validate_threshold(threshold)?,
        })
    }

    /// The metric in use.
    #[must_use]
    pub fn metric(&self) -> &DistanceMetric {
        &self.metric
    }

    /// The threshold in use.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Group `entries` in their given order.
    ///
    /// Paths are expected to be unique within `entries`.
    #[must_use]
    pub fn cluster(&self, entries: &[ImageFingerprint]) -> Vec<SimilarityGroup> {
        let mut assigned = vec![false; entries.len()];
        let mut groups = Vec::new();

        for (i, seed) in entries.iter().enumerate() {
            if assigned[i] {
                continue;
            }

            let mut members = vec![seed.path.clone()];
            for (j, other) in entries.iter().enumerate() {
                if j == i || assigned[j] {
                    continue;
                }
                let distance = self.metric.distance(&seed.fingerprint, &other.fingerprint);
                if distance <= self.threshold {
                    log::trace!(
                        "{} ~ {} (distance {:.2})",
                        seed.path.display(),
                        other.path.display(),
                        distance
                    );
                    members.push(other.path.clone());
                    assigned[j] = true;
                }
            }

            if members.len() > 1 {
                assigned[i] = true;
                log::debug!(
                    "Group {} seeded by {} with {} members",
                    groups.len() + 1,
                    seed.path.display(),
                    members.len()
                );
                groups.push(SimilarityGroup::new(
                    seed.fingerprint.perceptual_hash,
                    members,
                ));
            }
        }

        log::info!(
            "Clustered {} images into {} groups (threshold {})",
            entries.len(),
            groups.len(),
            self.threshold
        );
        groups
    }
}
