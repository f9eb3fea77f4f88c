//! Command-line interface definitions for simdupe.
//!
//! Global options (verbosity, color, error format) apply to every
//! subcommand. Flags left unset fall back to the config file and
//! `SIMDUPE_*` environment variables.
//!
//! # Example
//!
//! ```bash
//! # Review near-duplicates interactively (default)
//! simdupe scan ~/Pictures
//!
//! # Stricter matching, JSON report for scripting
//! simdupe scan ~/Pictures --threshold 2 --output json
//!
//! # Inspect the hashes of two files
//! simdupe fingerprint a.jpg b.jpg
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::ConfigOverrides;
use crate::similarity::WeightPreset;

/// Near-duplicate image finder with interactive review.
///
/// simdupe fingerprints every image under a directory, groups images that
/// look alike (including rotated and mirrored copies) and lets you delete
/// the redundant ones.
#[derive(Debug, Parser)]
#[command(name = "simdupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory for similar images
    Scan(ScanArgs),
    /// Print the fingerprint of each given image
    Fingerprint(FingerprintArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan recursively
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Maximum weighted distance for two images to be grouped
    ///
    /// Lower is stricter. Practical range 1 to 10 (default 4).
    #[arg(short, long, value_name = "N", value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Number of groups revealed per page in the review
    #[arg(long, value_name = "N", value_parser = parse_page_size)]
    pub page_size: Option<usize>,

    /// Distance weight preset
    #[arg(short, long, value_enum, value_name = "PRESET")]
    pub weights: Option<WeightPreset>,

    /// Image extension to include (repeatable; replaces the default list)
    #[arg(short, long = "extension", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Output format (tui for interactive review, json/text for reports)
    #[arg(short, long, value_enum, default_value = "tui")]
    pub output: OutputFormat,

    /// Read configuration from this TOML file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ScanArgs {
    /// Flags that override lower configuration layers.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            threshold: self.threshold,
            page_size: self.page_size,
            weights: self.weights,
            extensions: (!self.extensions.is_empty()).then(|| self.extensions.clone()),
        }
    }
}

/// Arguments for the fingerprint subcommand.
#[derive(Debug, Args)]
pub struct FingerprintArgs {
    /// Image files to fingerprint
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Interactive terminal user interface
    Tui,
    /// JSON report for scripting
    Json,
    /// Plain text listing
    Text,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Tui => write!(f, "tui"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

/// Parse a clustering threshold.
///
/// # Examples
///
/// ```
/// use simdupe::cli::parse_threshold;
///
/// assert_eq!(parse_threshold("4").unwrap(), 4.0);
/// assert_eq!(parse_threshold("2.5").unwrap(), 2.5);
/// assert!(parse_threshold("-1").is_err());
/// ```
///
/// # Errors
///
/// Returns an error for non-numbers, negative numbers, NaN and infinity.
pub fn parse_threshold(s: &str) -> Result<f64, String> {
    let s = s.trim();
    let value: f64 = s
        .parse()
        .map_err(|_| format!("Invalid threshold: '{s}'"))?;
    if !value.is_finite() {
        return Err(format!("Threshold must be finite: '{s}'"));
    }
    if value < 0.0 {
        return Err("Threshold cannot be negative".to_string());
    }
    Ok(value)
}

/// Parse a page size of at least 1.
///
/// # Errors
///
/// Returns an error for non-integers and zero.
pub fn parse_page_size(s: &str) -> Result<usize, String> {
    let s = s.trim();
    match s.parse::<usize>() {
        Ok(0) => Err("Page size must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("Invalid page size: '{s}'")),
    }
}
