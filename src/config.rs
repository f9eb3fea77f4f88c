//! Layered application configuration.
//!
//! Settings are merged with `figment`, later layers winning:
//!
//! 1. built-in defaults
//! 2. a TOML file: `--config PATH`, or `config.toml` in the platform config
//!    directory when it exists
//! 3. environment variables prefixed `SIMDUPE_` (`SIMDUPE_THRESHOLD=6`,
//!    `SIMDUPE_CUSTOM_WEIGHTS__FLIP=0.2`)
//! 4. command-line flags
//!
//! Custom weights may name any subset of channels; the rest come from the
//! selected preset.
//!
//! Configuration is read only; nothing is ever written back.
//!
//! ```toml
//! threshold = 5.0
//! page_size = 20
//! weights = "two-channel"
//! extensions = ["jpg", "png", "webp"]
//!
//! [custom_weights]
//! perceptual = 0.5
//! difference = 0.3
//! rotation = 0.2
//! flip = 0.0
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::review::DEFAULT_PAGE_SIZE;
use crate::scanner::DEFAULT_EXTENSIONS;
use crate::similarity::{
    validate_threshold, ClusterError, DistanceWeights, FinderConfig, WeightPreset,
    DEFAULT_THRESHOLD,
};

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "SIMDUPE_";

/// Errors that can occur while loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or has the wrong shape.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// Threshold or weights are out of range.
    #[error(transparent)]
    Invalid(#[from] ClusterError),

    /// Page size is zero.
    #[error("Invalid page size: must be at least 1")]
    InvalidPageSize,

    /// The extension list is empty.
    #[error("No image extensions configured")]
    NoExtensions,
}

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Clustering threshold.
    pub threshold: f64,
    /// Groups per review page.
    pub page_size: usize,
    /// Weight preset.
    pub weights: WeightPreset,
    /// Explicit per-channel weights; take precedence over the preset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_weights: Option<CustomWeights>,
    /// Recognized image extensions.
    pub extensions: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            page_size: DEFAULT_PAGE_SIZE,
            weights: WeightPreset::default(),
            custom_weights: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
        }
    }
}

/// Per-channel weight overrides. Unset channels keep the preset's value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomWeights {
    /// Perceptual hash weight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perceptual: Option<f64>,
    /// Difference hash weight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference: Option<f64>,
    /// Orientation weight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Flip weight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flip: Option<f64>,
}

impl CustomWeights {
    /// Overlay the channels set here onto `base`.
    #[must_use]
    pub fn apply(&self, base: DistanceWeights) -> DistanceWeights {
        DistanceWeights {
            perceptual: self.perceptual.unwrap_or(base.perceptual),
            difference: self.difference.unwrap_or(base.difference),
            rotation: self.rotation.unwrap_or(base.rotation),
            flip: self.flip.unwrap_or(base.flip),
        }
    }
}

impl From<DistanceWeights> for CustomWeights {
    fn from(weights: DistanceWeights) -> Self {
        Self {
            perceptual: Some(weights.perceptual),
            difference: Some(weights.difference),
            rotation: Some(weights.rotation),
            flip: Some(weights.flip),
        }
    }
}

/// Values given on the command line. `None` leaves lower layers in effect.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    /// `--threshold`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    /// `--page-size`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    /// `--weights`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<WeightPreset>,
    /// `--extension`, repeated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
}

impl AppConfig {
    /// Platform default config file (`.../simdupe/config.toml`).
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "simdupe").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Pick the config file to read.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `explicit` names a missing file.
    pub fn resolve_file(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
        match explicit {
            Some(path) if path.is_file() => Ok(Some(path.to_path_buf())),
            Some(path) => Err(ConfigError::NotFound(path.to_path_buf())),
            None => Ok(Self::default_path().filter(|p| p.is_file())),
        }
    }

    /// Build the layered figment without extracting it.
    #[must_use]
    pub fn figment(file: Option<&Path>, overrides: &ConfigOverrides) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Serialized::defaults(overrides.clone()))
    }

    /// Load, merge and validate the configuration.
    ///
    /// # Errors
    ///
    /// - `NotFound` for a missing `--config` file
    /// - `Load` for malformed TOML or mistyped values
    /// - `Invalid`, `InvalidPageSize`, `NoExtensions` for out-of-range values
    pub fn load(explicit: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let file = Self::resolve_file(explicit)?;
        if let Some(ref path) = file {
            log::debug!("Reading configuration from {}", path.display());
        }

        let config: Self = Self::figment(file.as_deref(), overrides)
            .extract()
            .map_err(Box::new)?;
        config.validate()?;
        log::debug!("Effective configuration: {:?}", config);
        Ok(config)
    }

    /// Check every value is in range.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_threshold(self.threshold)?;
        self.distance_weights().validate()?;
        if self.page_size == 0 {
            return Err(ConfigError::InvalidPageSize);
        }
        if self.extensions.iter().all(|e| e.trim_start_matches('.').is_empty()) {
            return Err(ConfigError::NoExtensions);
        }
        Ok(())
    }

    /// Weights in effect: the preset with any custom channels applied.
    #[must_use]
    pub fn distance_weights(&self) -> DistanceWeights {
        let preset = self.weights.weights();
        self.custom_weights.map_or(preset, |c| c.apply(preset))
    }

    /// Finder configuration for these settings.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_threshold(self.threshold)
            .with_weights(self.distance_weights())
            .with_extensions(self.extensions.clone())
    }
}
