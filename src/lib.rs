//! simdupe - Near-Duplicate Image Finder
//!
//! Finds images that look alike, including rotated and mirrored copies,
//! using several perceptual hashes per image, and offers an interactive TUI
//! to review the groups and delete redundant files.
//!
//! # Pipeline
//!
//! 1. [`scanner`] walks a directory and fingerprints each image
//! 2. [`similarity`] compares fingerprints and clusters them into groups
//! 3. [`review`] pages through the groups and deletes selected files
//! 4. [`tui`] and [`output`] present the results

pub mod actions;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod review;
pub mod scanner;
pub mod signal;
pub mod similarity;
pub mod tui;

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::{Cli, Commands, FingerprintArgs, OutputFormat, ScanArgs};
use crate::config::AppConfig;
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;
use crate::review::ReviewSession;
use crate::scanner::{FingerprintExtractor, FingerprintSet};
use crate::similarity::SimilarityFinder;
use crate::tui::{run_tui, App, RescanTarget};

/// Global flags shared by every subcommand.
#[derive(Debug, Clone, Copy)]
struct GlobalFlags {
    verbose: u8,
    quiet: bool,
    no_color: bool,
}

/// Run the command described by `cli`.
///
/// # Errors
///
/// Returns an error for invalid configuration, a missing or unreadable scan
/// root, an interrupted walk, terminal failures, and output I/O failures.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    log::debug!(
        "simdupe {} (log level {})",
        env!("CARGO_PKG_VERSION"),
        logging::current_level_name()
    );
    let flags = GlobalFlags {
        verbose: cli.verbose,
        quiet: cli.quiet,
        no_color: cli.no_color,
    };

    match cli.command {
        Commands::Scan(args) => run_scan(flags, &args),
        Commands::Fingerprint(args) => run_fingerprint(flags, &args),
    }
}

fn run_scan(flags: GlobalFlags, args: &ScanArgs) -> Result<ExitCode> {
    let config = AppConfig::load(args.config.as_deref(), &args.overrides())
        .context("Failed to load configuration")?;
    let shutdown = signal::install_handler().context("Failed to set up Ctrl+C handling")?;

    let base_config = config.finder_config().with_shutdown_flag(shutdown.get_flag());
    let scan_config = if flags.quiet {
        base_config.clone()
    } else {
        base_config
            .clone()
            .with_progress_callback(Arc::new(Progress::new(false)))
    };
    let finder = SimilarityFinder::new(scan_config).context("Invalid scan settings")?;

    log::info!(
        "Scanning {} (threshold {}, {} per page)",
        args.path.display(),
        config.threshold,
        config.page_size
    );
    let (groups, summary) = finder
        .find_similar(&args.path)
        .with_context(|| format!("Failed to scan {}", args.path.display()))?;

    let exit_code = if summary.interrupted {
        ExitCode::Interrupted
    } else if groups.is_empty() {
        ExitCode::NoSimilarImages
    } else {
        ExitCode::Success
    };
    if summary.interrupted {
        log::warn!(
            "Scan interrupted after {} of {} images",
            summary.fingerprinted,
            summary.total_files
        );
    }

    let mut stdout = io::stdout().lock();
    match args.output {
        OutputFormat::Json => {
            JsonOutput::new(&groups, &summary, finder.config(), exit_code)
                .write_to(&mut stdout, true)
                .context("Failed to write JSON output")?;
        }
        OutputFormat::Text => {
            let color = !flags.no_color && io::stdout().is_terminal();
            TextOutput::new(&groups, &summary, color)
                .write_to(&mut stdout)
                .context("Failed to write text output")?;
        }
        OutputFormat::Tui => {
            if exit_code != ExitCode::Success {
                if exit_code == ExitCode::NoSimilarImages && !flags.quiet {
                    writeln!(stdout, "No similar images found.")?;
                }
                return Ok(exit_code);
            }
            drop(stdout);

            let session = ReviewSession::new(groups, config.page_size)
                .context("Failed to start review")?;
            let mut app = App::new(session);
            let rescan_finder =
                SimilarityFinder::new(base_config).context("Invalid scan settings")?;
            let target = RescanTarget {
                finder: &rescan_finder,
                root: &args.path,
            };

            let previous_level = logging::enter_interactive(flags.verbose);
            let result = run_tui(&mut app, Some(shutdown.get_flag()), Some(target));
            log::set_max_level(previous_level);
            result.context("Interactive review failed")?;

            if shutdown.is_shutdown_requested() {
                return Ok(ExitCode::Interrupted);
            }
            if !flags.quiet {
                if let Some(status) = app.status_message() {
                    println!("{status}");
                }
            }
            return Ok(ExitCode::Success);
        }
    }

    Ok(exit_code)
}

/// One entry of `fingerprint --json`.
#[derive(Debug, Serialize)]
struct FingerprintReport {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fingerprint: Option<FingerprintSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn run_fingerprint(flags: GlobalFlags, args: &FingerprintArgs) -> Result<ExitCode> {
    let extractor = FingerprintExtractor::new();
    let reports: Vec<FingerprintReport> = args
        .files
        .iter()
        .map(|path| {
            let (fingerprint, error) = match extractor.extract_path(path) {
                Ok(set) => (Some(set), None),
                Err(e) => {
                    log::warn!("{}", e);
                    (None, Some(e.to_string()))
                }
            };
            FingerprintReport {
                path: path.to_string_lossy().into_owned(),
                fingerprint,
                error,
            }
        })
        .collect();

    let mut stdout = io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut stdout, &reports)
            .context("Failed to write JSON output")?;
        writeln!(stdout)?;
    } else if !flags.quiet {
        for report in &reports {
            let Some(set) = report.fingerprint else {
                continue;
            };
            let [r0, r90, r180, r270] = set.orientation_hashes;
            writeln!(stdout, "{}", report.path)?;
            writeln!(stdout, "  perceptual  {}", set.perceptual_hash)?;
            writeln!(stdout, "  difference  {}", set.difference_hash)?;
            writeln!(stdout, "  rotations   {r0} {r90} {r180} {r270}")?;
            writeln!(
                stdout,
                "  flips       {} {}",
                set.flip_horizontal_hash, set.flip_vertical_hash
            )?;
        }
    }

    if reports.iter().any(|r| r.error.is_some()) {
        Ok(ExitCode::GeneralError)
    } else {
        Ok(ExitCode::Success)
    }
}
