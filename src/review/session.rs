//! Paginated review of similarity groups.
//!
//! # Overview
//!
//! A [`ReviewSession`] owns every group of one clustering run and reveals
//! them page by page. Materializing a group applies the default selection:
//! every member except the first is marked for deletion. Groups not yet
//! materialized count as carrying their default selection, both for
//! [`ReviewSession::is_selected`] and for [`ReviewSession::delete_selected`].
//!
//! # States
//!
//! ```text
//! Empty
//! Materializing(k) --advance_page--> Materializing(k + 1)
//!                  --advance_page--> AwaitingDeleteDecision   (no pages left)
//! delete_selected --> Materializing(0)   (groups remain)
//!                 --> Exhausted          (no groups remain)
//! ```
//!
//! # Example
//!
//! ```
//! use simdupe::review::{ReviewSession, SessionState};
//! use simdupe::scanner::Hash64;
//! use simdupe::similarity::SimilarityGroup;
//! use std::path::{Path, PathBuf};
//!
//! let group = SimilarityGroup::new(
//!     Hash64::new(0),
//!     vec![PathBuf::from("/a.png"), PathBuf::from("/b.png")],
//! );
//! let mut session = ReviewSession::new(vec![group], 10).unwrap();
//!
//! assert_eq!(session.state(), SessionState::Materializing { page: 0 });
//! assert!(session.is_selected(Path::new("/b.png")));
//! assert!(!session.is_selected(Path::new("/a.png")));
//!
//! session.toggle_selection(Path::new("/b.png")).unwrap();
//! assert_eq!(session.selected_count(), 0);
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::ReviewError;
use crate::actions::{delete_batch, BatchDeleteResult, DeleteProgressCallback};
use crate::similarity::{FinderError, ScanSummary, SimilarityFinder, SimilarityGroup};

/// Default number of groups per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Lifecycle state of a review session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The clustering run produced no groups.
    Empty,
    /// Pages `0..=page` are materialized and more may follow.
    Materializing {
        /// Highest materialized page
        page: usize,
    },
    /// Every page is materialized; the next step is a deletion or a rescan.
    AwaitingDeleteDecision,
    /// A deletion removed the last reportable group.
    Exhausted,
}

impl SessionState {
    /// Check if there is nothing left to review.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Empty | Self::Exhausted)
    }
}

/// Mutable review state over one clustering run.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    /// All groups in clustering order
    groups: Vec<SimilarityGroup>,
    /// Groups per page
    page_size: usize,
    /// Number of leading groups that are materialized
    materialized: usize,
    /// Paths marked for deletion inside materialized groups
    selected: HashSet<PathBuf>,
    /// Current lifecycle state
    state: SessionState,
}

impl ReviewSession {
    /// Create a session and materialize its first page.
    ///
    /// Groups with fewer than two members are dropped.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPageSize` when `page_size` is zero.
    pub fn new(groups: Vec<SimilarityGroup>, page_size: usize) -> Result<Self, ReviewError> {
        if page_size == 0 {
            return Err(ReviewError::InvalidPageSize);
        }
        Ok(Self::with_valid_page_size(groups, page_size))
    }

    fn with_valid_page_size(mut groups: Vec<SimilarityGroup>, page_size: usize) -> Self {
        let before = groups.len();
        groups.retain(SimilarityGroup::is_reportable);
        if groups.len() < before {
            log::warn!(
                "Ignoring {} group(s) with fewer than two members",
                before - groups.len()
            );
        }

        let mut session = Self {
            groups,
            page_size,
            materialized: 0,
            selected: HashSet::new(),
            state: SessionState::Empty,
        };
        session.restart();
        session
    }

    /// Drop all selections and materialize page 0 again.
    fn restart(&mut self) {
        self.selected.clear();
        self.materialized = 0;
        if self.groups.is_empty() {
            self.state = SessionState::Empty;
        } else {
            self.materialize_through(0);
            self.state = SessionState::Materializing { page: 0 };
        }
    }

    /// Materialize every group up to the end of `page`, applying defaults to
    /// groups not yet materialized.
    fn materialize_through(&mut self, page: usize) {
        let end = ((page + 1) * self.page_size).min(self.groups.len());
        for index in self.materialized..end {
            let defaults: Vec<PathBuf> = self.groups[index].default_selection().cloned().collect();
            log::trace!(
                "Materialized group {} with {} default selections",
                index + 1,
                defaults.len()
            );
            self.selected.extend(defaults);
        }
        self.materialized = self.materialized.max(end);
    }

    // ==================== Inspection ====================

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Groups per page.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// All groups in clustering order, materialized or not.
    #[must_use]
    pub fn groups(&self) -> &[SimilarityGroup] {
        &self.groups
    }

    /// Groups revealed so far.
    #[must_use]
    pub fn materialized_groups(&self) -> &[SimilarityGroup] {
        &self.groups[..self.materialized]
    }

    /// Number of pages in the full group sequence.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.groups.len().div_ceil(self.page_size)
    }

    /// Number of materialized pages.
    #[must_use]
    pub fn materialized_pages(&self) -> usize {
        self.materialized.div_ceil(self.page_size)
    }

    /// Check whether more pages can be materialized.
    #[must_use]
    pub fn has_more_pages(&self) -> bool {
        self.materialized < self.groups.len()
    }

    /// Groups of a materialized page.
    #[must_use]
    pub fn page(&self, page: usize) -> Option<&[SimilarityGroup]> {
        let start = page.checked_mul(self.page_size)?;
        if start >= self.materialized {
            return None;
        }
        let end = (start + self.page_size).min(self.materialized);
        Some(&self.groups[start..end])
    }

    /// Check whether the group at `index` is materialized.
    #[must_use]
    pub fn is_materialized(&self, index: usize) -> bool {
        index < self.materialized
    }

    fn group_of(&self, path: &Path) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(path))
    }

    /// Whether `path` is marked for deletion.
    ///
    /// Members of groups not yet materialized report their default selection.
    #[must_use]
    pub fn is_selected(&self, path: &Path) -> bool {
        match self.group_of(path) {
            Some(index) if self.is_materialized(index) => self.selected.contains(path),
            Some(index) => self.groups[index].representative() != Some(path),
            None => false,
        }
    }

    /// Aggregate number of selected paths.
    ///
    /// Explicit state for materialized groups plus the default selection of
    /// every unmaterialized group.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        let pending: usize = self.groups[self.materialized..]
            .iter()
            .map(|g| g.len().saturating_sub(1))
            .sum();
        self.selected.len() + pending
    }

    /// Every selected path, in group and member order.
    ///
    /// Covers explicit state of materialized groups and the default selection
    /// of the rest, so its length always equals
    /// [`selected_count`](Self::selected_count). These are exactly the paths
    /// [`delete_selected`](Self::delete_selected) removes.
    #[must_use]
    pub fn pending_deletions(&self) -> Vec<PathBuf> {
        let (shown, hidden) = self.groups.split_at(self.materialized);
        shown
            .iter()
            .flat_map(SimilarityGroup::members)
            .filter(|p| self.selected.contains(*p))
            .chain(hidden.iter().flat_map(SimilarityGroup::default_selection))
            .cloned()
            .collect()
    }

    // ==================== Commands ====================

    /// Materialize the next page.
    ///
    /// Returns `false` and moves to `AwaitingDeleteDecision` when every page
    /// is already materialized.
    pub fn advance_page(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        if !self.has_more_pages() {
            log::debug!("No more pages; awaiting delete decision");
            self.state = SessionState::AwaitingDeleteDecision;
            return false;
        }

        let page = self.materialized_pages();
        self.materialize_through(page);
        self.state = SessionState::Materializing { page };
        log::debug!(
            "Materialized page {} ({} of {} groups)",
            page + 1,
            self.materialized,
            self.groups.len()
        );
        true
    }

    /// Materialize pages `0..=page`.
    ///
    /// Pages already materialized are left untouched, including any
    /// selection changes made on them.
    ///
    /// # Errors
    ///
    /// Returns `PageOutOfRange` for a page past the end.
    pub fn materialize_page(&mut self, page: usize) -> Result<(), ReviewError> {
        let pages = self.page_count();
        if page >= pages {
            return Err(ReviewError::PageOutOfRange { page, pages });
        }
        if page < self.materialized_pages() {
            log::trace!("Page {} already materialized", page + 1);
            return Ok(());
        }
        self.materialize_through(page);
        self.state = SessionState::Materializing { page };
        Ok(())
    }

    /// Flip the selection of `path`. Returns the new selection state.
    ///
    /// # Errors
    ///
    /// - `UnknownPath` if no group contains `path`
    /// - `NotMaterialized` if its group has not been revealed yet
    pub fn toggle_selection(&mut self, path: &Path) -> Result<bool, ReviewError> {
        let index = self
            .group_of(path)
            .ok_or_else(|| ReviewError::UnknownPath(path.to_path_buf()))?;
        if !self.is_materialized(index) {
            return Err(ReviewError::NotMaterialized(path.to_path_buf()));
        }

        if self.selected.remove(path) {
            log::debug!("Deselected: {}", path.display());
            Ok(false)
        } else {
            self.selected.insert(path.to_path_buf());
            log::debug!("Selected: {}", path.display());
            Ok(true)
        }
    }

    /// Reapply the default selection to a materialized group.
    ///
    /// # Errors
    ///
    /// Returns `GroupOutOfRange` if `index` is not a materialized group.
    pub fn select_defaults(&mut self, index: usize) -> Result<(), ReviewError> {
        if !self.is_materialized(index) {
            return Err(ReviewError::GroupOutOfRange(index));
        }
        let group = &self.groups[index];
        for (position, member) in group.members().iter().enumerate() {
            if position == 0 {
                self.selected.remove(member);
            } else {
                self.selected.insert(member.clone());
            }
        }
        Ok(())
    }

    /// Clear every selection in materialized groups.
    ///
    /// Groups not yet materialized keep their default selection.
    pub fn deselect_all(&mut self) {
        let count = self.selected.len();
        self.selected.clear();
        log::debug!("Deselected all {} files", count);
    }

    /// Delete every selected path, including the default selection of groups
    /// not yet materialized.
    ///
    /// Every attempted path leaves the groups, whether its removal succeeded
    /// or not. Groups left with fewer than two members are dropped. With
    /// nothing selected this is a no-op.
    pub fn delete_selected(&mut self) -> BatchDeleteResult {
        self.delete_selected_with(None)
    }

    /// [`delete_selected`](Self::delete_selected) with per-file progress.
    pub fn delete_selected_with(
        &mut self,
        callback: Option<&dyn DeleteProgressCallback>,
    ) -> BatchDeleteResult {
        let targets = self.pending_deletions();
        if targets.is_empty() {
            log::debug!("Nothing selected; delete skipped");
            return BatchDeleteResult::default();
        }

        log::info!("Deleting {} selected files", targets.len());
        let result = delete_batch(&targets, callback);

        let removed: HashSet<PathBuf> = targets.into_iter().collect();
        let before = self.groups.len();
        self.groups = self
            .groups
            .iter()
            .filter_map(|g| g.without(&removed))
            .collect();
        log::info!(
            "{} of {} groups remain after deletion",
            self.groups.len(),
            before
        );

        if self.groups.is_empty() {
            self.selected.clear();
            self.materialized = 0;
            self.state = SessionState::Exhausted;
        } else {
            self.restart();
        }
        result
    }

    /// Run a fresh scan of `root` and start a new session over its groups.
    ///
    /// The new session keeps this session's page size; nothing else carries
    /// over.
    ///
    /// # Errors
    ///
    /// Propagates any `FinderError` from the scan.
    pub fn rescan(
        &self,
        finder: &SimilarityFinder,
        root: &Path,
    ) -> Result<(Self, ScanSummary), FinderError> {
        log::info!("Rescanning {}", root.display());
        let (groups, summary) = finder.find_similar(root)?;
        Ok((Self::with_valid_page_size(groups, self.page_size), summary))
    }
}
