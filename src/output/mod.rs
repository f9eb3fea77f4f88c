//! Output formatters for similarity scan results.
//!
//! This module provides the non-interactive output formats:
//! - JSON for automation and scripting
//! - Plain text listing for terminals and logs
//!
//! # Example
//!
//! ```no_run
//! use simdupe::similarity::{FinderConfig, SimilarityFinder};
//! use simdupe::output::json::JsonOutput;
//! use simdupe::error::ExitCode;
//! use std::path::Path;
//!
//! let finder = SimilarityFinder::new(FinderConfig::default()).unwrap();
//! let (groups, summary) = finder.find_similar(Path::new(".")).unwrap();
//!
//! let output = JsonOutput::new(&groups, &summary, finder.config(), ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

// Re-export main types
pub use json::{JsonOutput, JsonOutputError};
pub use text::TextOutput;
