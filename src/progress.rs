//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`ProgressCallback`] sink the scan reports into,
//! and [`Progress`], which implements it with terminal progress bars for
//! non-quiet runs.
//!
//! Any `Fn(usize, usize) + Send + Sync` closure is also a progress sink:
//!
//! ```
//! use simdupe::progress::ProgressCallback;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let seen = AtomicUsize::new(0);
//! let sink = |processed: usize, _total: usize| seen.store(processed, Ordering::SeqCst);
//! sink.on_progress(3, 10);
//! assert_eq!(seen.load(Ordering::SeqCst), 3);
//! ```

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Name of the directory walk phase.
pub const PHASE_WALKING: &str = "walking";
/// Name of the fingerprinting phase.
pub const PHASE_FINGERPRINTING: &str = "fingerprinting";

/// Progress sink for a scan.
///
/// `on_progress` is called once per processed image; the other hooks are
/// optional.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (e.g. "walking", "fingerprinting")
    /// * `total` - Total number of items, 0 when unknown
    fn on_phase_start(&self, _phase: &str, _total: usize) {}

    /// Called after each processed image.
    ///
    /// # Arguments
    ///
    /// * `processed` - Images processed so far (1-based)
    /// * `total` - Images in this scan
    fn on_progress(&self, processed: usize, total: usize);

    /// Called when a phase completes.
    fn on_phase_end(&self, _phase: &str) {}

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

impl<F> ProgressCallback for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn on_progress(&self, processed: usize, total: usize) {
        self(processed, total);
    }
}

/// Progress reporter using indicatif.
///
/// Shows a spinner while walking and a bar while fingerprinting.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use simdupe::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn walking_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn fingerprint_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn replace_bar(&self, bar: Option<ProgressBar>) -> Option<ProgressBar> {
        match self.bar.lock() {
            Ok(mut guard) => std::mem::replace(&mut *guard, bar),
            Err(_) => None,
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(ref pb) = *guard {
                f(pb);
            }
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let pb = if phase == PHASE_WALKING {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::walking_style());
            pb.set_message("Walking directory");
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(Self::fingerprint_style());
            pb.set_message("Fingerprinting");
            pb
        };

        if let Some(old) = self.replace_bar(Some(pb)) {
            old.finish_and_clear();
        }
    }

    fn on_progress(&self, processed: usize, total: usize) {
        if self.quiet {
            return;
        }
        self.with_bar(|pb| {
            pb.set_length(total as u64);
            pb.set_position(processed as u64);
        });
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }
        if let Some(pb) = self.replace_bar(None) {
            pb.finish_with_message(format!("{} complete", capitalize(phase)));
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.with_bar(|pb| pb.set_message(message.to_string()));
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_closure_is_progress_callback() {
        let calls = AtomicUsize::new(0);
        let sink = |_: usize, _: usize| {
            calls.fetch_add(1, Ordering::SeqCst);
        };
        sink.on_phase_start(PHASE_FINGERPRINTING, 2);
        sink.on_progress(1, 2);
        sink.on_progress(2, 2);
        sink.on_phase_end(PHASE_FINGERPRINTING);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_quiet_progress_is_silent() {
        let progress = Progress::new(true);
        progress.on_phase_start(PHASE_FINGERPRINTING, 5);
        progress.on_progress(1, 5);
        progress.on_phase_end(PHASE_FINGERPRINTING);
        assert!(progress.replace_bar(None).is_none());
    }

    #[test]
    fn test_phase_end_clears_bar() {
        let progress = Progress::new(false);
        progress.on_phase_start(PHASE_FINGERPRINTING, 5);
        progress.on_progress(3, 5);
        progress.on_message("a.png");
        progress.on_phase_end(PHASE_FINGERPRINTING);
        assert!(progress.replace_bar(None).is_none());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("walking"), "Walking");
        assert_eq!(capitalize(""), "");
    }
}
