//! Plain text listing of similarity groups.
//!
//! ```text
//! Group 1 (3 images, key c3a1f00f0e0e1e3c)
//!   keep    /photos/a.jpg (1.2 MiB)
//!   delete  /photos/a_copy.jpg (1.1 MiB)
//!   delete  /photos/a_rotated.jpg (1.2 MiB)
//!
//! 1 group(s), 2 candidate deletion(s), 120 image(s) scanned in 2.35s
//! ```

use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use bytesize::ByteSize;
use yansi::{Paint, Style};

use crate::similarity::{ScanSummary, SimilarityGroup};

/// Text formatter for scan results.
#[derive(Debug)]
pub struct TextOutput<'a> {
    groups: &'a [SimilarityGroup],
    summary: &'a ScanSummary,
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a formatter. `color` enables ANSI styling.
    #[must_use]
    pub fn new(groups: &'a [SimilarityGroup], summary: &'a ScanSummary, color: bool) -> Self {
        Self {
            groups,
            summary,
            color,
        }
    }

    fn styled(&self, text: &str, style: Style) -> String {
        if self.color {
            text.paint(style).to_string()
        } else {
            text.to_string()
        }
    }

    /// Render the full listing.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();

        if self.groups.is_empty() {
            let _ = writeln!(out, "{}", self.styled("No similar images found.", Style::new().yellow()));
        }

        for (i, group) in self.groups.iter().enumerate() {
            let header = format!(
                "Group {} ({} images, key {})",
                i + 1,
                group.len(),
                group.key()
            );
            let _ = writeln!(out, "{}", self.styled(&header, Style::new().bold().cyan()));

            for (position, member) in group.members().iter().enumerate() {
                let label = if position == 0 {
                    self.styled("keep  ", Style::new().green())
                } else {
                    self.styled("delete", Style::new().red())
                };
                let _ = writeln!(
                    out,
                    "  {}  {} ({})",
                    label,
                    member.display(),
                    file_size(member)
                );
            }
            out.push('\n');
        }

        for skipped in &self.summary.skipped {
            let line = format!("skipped {}: {}", skipped.path.display(), skipped.reason);
            let _ = writeln!(out, "{}", self.styled(&line, Style::new().dim()));
        }

        let mut footer = format!(
            "{} group(s), {} candidate deletion(s), {} image(s) scanned in {:.2}s",
            self.summary.groups,
            self.summary.candidate_deletions,
            self.summary.fingerprinted,
            self.summary.scan_duration.as_secs_f64()
        );
        if self.summary.interrupted {
            footer.push_str(" (interrupted)");
        }
        let _ = writeln!(out, "{}", self.styled(&footer, Style::new().bold()));
        out
    }

    /// Write the listing to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(self.render().as_bytes())
    }
}

/// Human-readable size of a file, or `?` if it cannot be read.
#[must_use]
pub fn file_size(path: &Path) -> String {
    match std::fs::metadata(path) {
        Ok(meta) => ByteSize::b(meta.len()).to_string(),
        Err(_) => "?".to_string(),
    }
}
