//! Weighted multi-channel distance between fingerprints.
//!
//! # Overview
//!
//! The distance between two [`FingerprintSet`]s is a weighted sum of four
//! Hamming-distance channels:
//!
//! | channel    | compared hashes                                      |
//! |------------|------------------------------------------------------|
//! | perceptual | `perceptual_hash`                                    |
//! | difference | `difference_hash`                                    |
//! | rotation   | min over all 16 pairs of orientation hashes          |
//! | flip       | min of the horizontal and vertical flip comparisons  |
//!
//! The rotation channel makes the distance independent of which of the four
//! canonical rotations either image is stored in.
//!
//! The result is symmetric and zero for identical fingerprints, but it is not
//! a metric in the strict sense: the triangle inequality does not hold.
//!
//! # Example
//!
//! ```
//! use simdupe::scanner::{FingerprintSet, Hash64};
//! use simdupe::similarity::{DistanceMetric, DistanceWeights};
//!
//! let h = Hash64::new(0xdead_beef);
//! let set = FingerprintSet {
//!     perceptual_hash: h,
//!     difference_hash: h,
//!     orientation_hashes: [h; 4],
//!     flip_horizontal_hash: h,
//!     flip_vertical_hash: h,
//! };
//!
//! let metric = DistanceMetric::new(DistanceWeights::FOUR_CHANNEL).unwrap();
//! assert_eq!(metric.distance(&set, &set), 0.0);
//! ```

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::ClusterError;
use crate::scanner::FingerprintSet;

/// Weight of each distance channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceWeights {
    /// Weight of the perceptual hash distance
    pub perceptual: f64,
    /// Weight of the difference hash distance
    pub difference: f64,
    /// Weight of the best-matching orientation distance
    pub rotation: f64,
    /// Weight of the best-matching flip distance
    pub flip: f64,
}

impl DistanceWeights {
    /// Perceptual, difference, rotation and flip channels (0.4 / 0.3 / 0.2 / 0.1).
    pub const FOUR_CHANNEL: Self = Self {
        perceptual: 0.4,
        difference: 0.3,
        rotation: 0.2,
        flip: 0.1,
    };

    /// Perceptual and difference channels only (0.6 / 0.4).
    pub const TWO_CHANNEL: Self = Self {
        perceptual: 0.6,
        difference: 0.4,
        rotation: 0.0,
        flip: 0.0,
    };

    /// Check that every weight is finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns `InvalidWeight` naming the first offending channel.
    pub fn validate(&self) -> Result<(), ClusterError> {
        for (channel, value) in [
            ("perceptual", self.perceptual),
            ("difference", self.difference),
            ("rotation", self.rotation),
            ("flip", self.flip),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ClusterError::InvalidWeight { channel, value });
            }
        }
        Ok(())
    }
}

impl Default for DistanceWeights {
    fn default() -> Self {
        Self::FOUR_CHANNEL
    }
}

/// Named weight presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightPreset {
    /// All four channels: 0.4 / 0.3 / 0.2 / 0.1
    #[default]
    FourChannel,
    /// Perceptual and difference only: 0.6 / 0.4
    TwoChannel,
}

impl WeightPreset {
    /// Weights for this preset.
    #[must_use]
    pub fn weights(self) -> DistanceWeights {
        match self {
            Self::FourChannel => DistanceWeights::FOUR_CHANNEL,
            Self::TwoChannel => DistanceWeights::TWO_CHANNEL,
        }
    }
}

impl std::fmt::Display for WeightPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FourChannel => write!(f, "four-channel"),
            Self::TwoChannel => write!(f, "two-channel"),
        }
    }
}

/// Unweighted per-channel Hamming distances between two fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DistanceComponents {
    /// Perceptual hash distance
    pub perceptual: u32,
    /// Difference hash distance
    pub difference: u32,
    /// Best orientation pair distance
    pub rotation: u32,
    /// Best flip distance
    pub flip: u32,
}

/// Minimum Hamming distance over all 16 orientation hash pairs.
#[must_use]
pub fn rotation_component(a: &FingerprintSet, b: &FingerprintSet) -> u32 {
    a.orientation_hashes
        .iter()
        .flat_map(|ha| b.orientation_hashes.iter().map(move |hb| ha.hamming(*hb)))
        .min()
        .unwrap_or(0)
}

/// Minimum of the horizontal-flip and vertical-flip Hamming distances.
#[must_use]
pub fn flip_component(a: &FingerprintSet, b: &FingerprintSet) -> u32 {
    a.flip_horizontal_hash
        .hamming(b.flip_horizontal_hash)
        .min(a.flip_vertical_hash.hamming(b.flip_vertical_hash))
}

/// Weighted fingerprint distance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DistanceMetric {
    weights: DistanceWeights,
}

impl DistanceMetric {
    /// Create a metric with the given weights.
    ///
    /// # Errors
    ///
    /// Returns `InvalidWeight` if any weight is negative or not finite.
    pub fn new(weights: DistanceWeights) -> Result<Self, ClusterError> {
        weights.validate()?;
        Ok(Self { weights })
    }

    /// The weights in use.
    #[must_use]
    pub fn weights(&self) -> DistanceWeights {
        self.weights
    }

    /// Per-channel Hamming distances, before weighting.
    #[must_use]
    pub fn components(&self, a: &FingerprintSet, b: &FingerprintSet) -> DistanceComponents {
        DistanceComponents {
            perceptual: a.perceptual_hash.hamming(b.perceptual_hash),
            difference: a.difference_hash.hamming(b.difference_hash),
            rotation: rotation_component(a, b),
            flip: flip_component(a, b),
        }
    }

    /// Weighted distance between two fingerprints. Always `>= 0`.
    #[must_use]
    pub fn distance(&self, a: &FingerprintSet, b: &FingerprintSet) -> f64 {
        let c = self.components(a, b);
        let w = &self.weights;
        w.perceptual * f64::from(c.perceptual)
            + w.difference * f64::from(c.difference)
            + w.rotation * f64::from(c.rotation)
            + w.flip * f64::from(c.flip)
    }
}
