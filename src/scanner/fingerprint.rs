//! Transformation-tolerant image fingerprints.
//!
//! # Overview
//!
//! A [`FingerprintSet`] bundles several 64-bit hashes of one image:
//!
//! - a DCT-based perceptual hash (global structure)
//! - a gradient-based difference hash
//! - four mean hashes, one per 90° rotation
//! - two mean hashes of the image mirrored left-right and top-bottom
//!
//! Every hash is computed on the same 3-channel RGB normalization of the
//! decoded image, so two fingerprints are always comparable field by field.
//!
//! # Example
//!
//! ```no_run
//! use simdupe::scanner::fingerprint::FingerprintExtractor;
//! use std::path::Path;
//!
//! let extractor = FingerprintExtractor::new();
//! match extractor.extract_path(Path::new("photo.jpg")) {
//!     Ok(set) => println!("pHash {}", set.perceptual_hash),
//!     Err(e) => eprintln!("Skipped: {}", e),
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig, ImageHash};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Width and height of the hash grid. 8 x 8 = 64 bits.
const HASH_GRID: u32 = 8;

/// Number of bits in every fingerprint hash.
pub const HASH_BITS: u32 = HASH_GRID * HASH_GRID;

/// A fixed-length 64-bit image hash.
///
/// Serialized as a 16-digit lowercase hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Hash64(u64);

impl Hash64 {
    /// Wrap raw hash bits.
    #[must_use]
    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw hash bits.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Number of differing bit positions between two hashes.
    #[must_use]
    pub const fn hamming(self, other: Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    fn from_image_hash(hash: &ImageHash) -> Result<Self, FingerprintError> {
        let bytes = hash.as_bytes();
        let array: [u8; 8] = bytes
            .try_into()
            .map_err(|_| FingerprintError::HashLength(bytes.len()))?;
        Ok(Self(u64::from_be_bytes(array)))
    }
}

impl fmt::Display for Hash64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for Hash64 {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 16 {
            return Err(format!("expected 16 hex digits, got '{s}'"));
        }
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|e| format!("invalid hash '{s}': {e}"))
    }
}

impl From<Hash64> for String {
    fn from(hash: Hash64) -> Self {
        hash.to_string()
    }
}

impl TryFrom<String> for Hash64 {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// All hashes computed for one image.
///
/// Immutable once computed; comparisons only ever pair same-named fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintSet {
    /// DCT-based perceptual hash.
    pub perceptual_hash: Hash64,
    /// Row-gradient difference hash.
    pub difference_hash: Hash64,
    /// Mean hashes of the image rotated by 0°, 90°, 180° and 270°.
    pub orientation_hashes: [Hash64; 4],
    /// Mean hash of the image mirrored left-right.
    pub flip_horizontal_hash: Hash64,
    /// Mean hash of the image mirrored top-bottom.
    pub flip_vertical_hash: Hash64,
}

/// Errors that can occur while fingerprinting an image.
#[derive(Debug, Error)]
pub enum FingerprintError {
    /// The file could not be decoded or hashed.
    #[error("unreadable image {}: {reason}", path.display())]
    UnreadableImage {
        /// File that failed
        path: PathBuf,
        /// Decoder or hasher message
        reason: String,
    },

    /// The decoded image has no pixels.
    #[error("image has zero width or height")]
    EmptyImage,

    /// The hasher produced an unexpected number of bytes.
    #[error("hash has {0} bytes, expected 8")]
    HashLength(usize),
}

impl FingerprintError {
    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::UnreadableImage { path, .. } => Some(path),
            Self::EmptyImage | Self::HashLength(_) => None,
        }
    }
}

/// Computes [`FingerprintSet`]s from decoded images.
pub struct FingerprintExtractor {
    perceptual: image_hasher::Hasher,
    difference: image_hasher::Hasher,
    mean: image_hasher::Hasher,
}

impl FingerprintExtractor {
    /// Create an extractor producing 64-bit hashes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            perceptual: HasherConfig::new()
                .hash_size(HASH_GRID, HASH_GRID)
                .hash_alg(HashAlg::Median)
                .preproc_dct()
                .to_hasher(),
            difference: HasherConfig::new()
                .hash_size(HASH_GRID, HASH_GRID)
                .hash_alg(HashAlg::Gradient)
                .to_hasher(),
            mean: HasherConfig::new()
                .hash_size(HASH_GRID, HASH_GRID)
                .hash_alg(HashAlg::Mean)
                .to_hasher(),
        }
    }

    /// Fingerprint an already decoded image.
    ///
    /// # Errors
    ///
    /// Returns `EmptyImage` for images without pixels and `HashLength` if the
    /// hasher does not yield 64 bits.
    pub fn extract(&self, image: &DynamicImage) -> Result<FingerprintSet, FingerprintError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(FingerprintError::EmptyImage);
        }

        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());

        let orientation_hashes = [
            self.mean_hash(&rgb)?,
            self.mean_hash(&rgb.rotate90())?,
            self.mean_hash(&rgb.rotate180())?,
            self.mean_hash(&rgb.rotate270())?,
        ];

        Ok(FingerprintSet {
            perceptual_hash: Hash64::from_image_hash(&self.perceptual.hash_image(&rgb))?,
            difference_hash: Hash64::from_image_hash(&self.difference.hash_image(&rgb))?,
            orientation_hashes,
            flip_horizontal_hash: self.mean_hash(&rgb.fliph())?,
            flip_vertical_hash: self.mean_hash(&rgb.flipv())?,
        })
    }

    /// Decode the image at `path` and fingerprint it.
    ///
    /// # Errors
    ///
    /// Every failure is reported as `UnreadableImage` carrying the path.
    pub fn extract_path(&self, path: &Path) -> Result<FingerprintSet, FingerprintError> {
        let unreadable = |reason: String| FingerprintError::UnreadableImage {
            path: path.to_path_buf(),
            reason,
        };

        let image = image::open(path).map_err(|e| unreadable(e.to_string()))?;
        self.extract(&image).map_err(|e| unreadable(e.to_string()))
    }

    fn mean_hash(&self, image: &DynamicImage) -> Result<Hash64, FingerprintError> {
        Hash64::from_image_hash(&self.mean.hash_image(image))
    }
}

impl Default for FingerprintExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn quadrant_image() -> DynamicImage {
        // Asymmetric pattern so every rotation hashes differently.
        let mut img = RgbImage::new(64, 64);
        for x in 0..64 {
            for y in 0..64 {
                let v = if x < 32 && y < 32 {
                    255
                } else if x >= 32 && y < 16 {
                    180
                } else {
                    0
                };
                img.put_pixel(x, y, Rgb([v, v / 2, 0]));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_hash64_hamming() {
        assert_eq!(Hash64::new(0).hamming(Hash64::new(0)), 0);
        assert_eq!(Hash64::new(0).hamming(Hash64::new(u64::MAX)), 64);
        assert_eq!(Hash64::new(0b1010).hamming(Hash64::new(0b0110)), 2);
    }

    #[test]
    fn test_hash64_display_and_parse() {
        let hash = Hash64::new(0x00ff_00ff_1234_abcd);
        assert_eq!(hash.to_string(), "00ff00ff1234abcd");
        assert_eq!("00ff00ff1234abcd".parse::<Hash64>().unwrap(), hash);
        assert!("abc".parse::<Hash64>().is_err());
        assert!("zzzzzzzzzzzzzzzz".parse::<Hash64>().is_err());
    }

    #[test]
    fn test_hash64_serializes_as_hex() {
        let json = serde_json::to_string(&Hash64::new(1)).unwrap();
        assert_eq!(json, "\"0000000000000001\"");
        let back: Hash64 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Hash64::new(1));
    }

    #[test]
    fn test_extract_is_deterministic() {
        let extractor = FingerprintExtractor::new();
        let img = quadrant_image();
        assert_eq!(
            extractor.extract(&img).unwrap(),
            extractor.extract(&img).unwrap()
        );
    }

    #[test]
    fn test_extract_normalizes_channels() {
        // Same pixels as RGB and RGBA must fingerprint identically.
        let extractor = FingerprintExtractor::new();
        let rgb = quadrant_image();
        let rgba = DynamicImage::ImageRgba8(rgb.to_rgba8());
        assert_eq!(
            extractor.extract(&rgb).unwrap(),
            extractor.extract(&rgba).unwrap()
        );
    }

    #[test]
    fn test_rotated_image_permutes_orientation_hashes() {
        let extractor = FingerprintExtractor::new();
        let img = quadrant_image();
        let original = extractor.extract(&img).unwrap();
        let rotated = extractor.extract(&img.rotate90()).unwrap();

        let o = original.orientation_hashes;
        assert_eq!(rotated.orientation_hashes, [o[1], o[2], o[3], o[0]]);
    }

    #[test]
    fn test_extract_empty_image() {
        let extractor = FingerprintExtractor::new();
        let img = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(matches!(
            extractor.extract(&img),
            Err(FingerprintError::EmptyImage)
        ));
    }

    #[test]
    fn test_extract_path_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let err = FingerprintExtractor::new().extract_path(&path).unwrap_err();
        assert!(matches!(err, FingerprintError::UnreadableImage { .. }));
        assert_eq!(err.path(), Some(path.as_path()));
    }
}
