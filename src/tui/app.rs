//! TUI application state management.
//!
//! # Overview
//!
//! [`App`] wraps a [`ReviewSession`] with the navigation state of the
//! interactive review:
//! - Current mode (Reviewing, Confirming, Finished, Quitting)
//! - Highlighted group and member (limited to materialized groups)
//! - Status and error messages
//!
//! Selection and pagination live in the session. The App only forwards
//! commands to it and keeps the cursor valid when the groups change.
//!
//! # Example
//!
//! ```
//! use simdupe::review::ReviewSession;
//! use simdupe::scanner::Hash64;
//! use simdupe::similarity::SimilarityGroup;
//! use simdupe::tui::app::{Action, App};
//! use std::path::{Path, PathBuf};
//!
//! let group = SimilarityGroup::new(
//!     Hash64::new(0),
//!     vec![PathBuf::from("/a.png"), PathBuf::from("/b.png")],
//! );
//! let mut app = App::new(ReviewSession::new(vec![group], 10).unwrap());
//!
//! app.handle_action(Action::NavigateDown);
//! app.handle_action(Action::ToggleSelect);
//!
//! assert!(!app.is_selected(Path::new("/b.png")));
//! assert_eq!(app.selected_count(), 0);
//! ```

use std::path::{Path, PathBuf};

use crate::actions::BatchDeleteResult;
use crate::review::{ReviewSession, SessionState};
use crate::similarity::SimilarityGroup;

/// Application mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Navigating and selecting within materialized groups
    #[default]
    Reviewing,
    /// Confirming a deletion
    Confirming,
    /// Nothing left to review
    Finished,
    /// Application is quitting
    Quitting,
}

impl AppMode {
    /// Check if the cursor can move in this mode.
    #[must_use]
    pub fn is_navigable(&self) -> bool {
        matches!(self, Self::Reviewing)
    }

    /// Check if the application is done (quitting).
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Quitting)
    }
}

/// User action triggered by keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Move to the previous member
    NavigateUp,
    /// Move to the next member
    NavigateDown,
    /// Move to the next materialized group
    NextGroup,
    /// Move to the previous group
    PreviousGroup,
    /// Toggle selection of the highlighted member
    ToggleSelect,
    /// Reapply the default selection to the current group
    SelectDefaults,
    /// Clear every selection
    DeselectAll,
    /// Materialize the next page of groups
    LoadMore,
    /// Ask to delete the selected files
    Delete,
    /// Confirm the pending deletion
    Confirm,
    /// Cancel the current dialog or dismiss a message
    Cancel,
    /// Scan the directory again
    Rescan,
    /// Quit the application
    Quit,
}

/// Files awaiting a deletion decision, captured when the confirm dialog opens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingDeletion {
    /// Paths that would be removed, in group and member order
    pub files: Vec<PathBuf>,
    /// Combined size of the files still on disk
    pub total_bytes: u64,
}

impl PendingDeletion {
    fn capture(session: &ReviewSession) -> Self {
        let files = session.pending_deletions();
        let total_bytes = files
            .iter()
            .filter_map(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .sum();
        Self { files, total_bytes }
    }
}

/// TUI application state.
///
/// Accessed only from the thread that owns the terminal.
#[derive(Debug, Clone)]
pub struct App {
    /// Review state driven by this UI
    session: ReviewSession,
    /// Current application mode
    mode: AppMode,
    /// Highlighted group (index into the materialized groups)
    group_index: usize,
    /// Highlighted member within the group
    file_index: usize,
    /// Scroll offset for the group list
    group_scroll: usize,
    /// Scroll offset for the member list
    file_scroll: usize,
    /// Number of visible rows in the UI (for scroll calculation)
    visible_rows: usize,
    /// Informational message shown in the header
    status_message: Option<String>,
    /// Error message to display (if any)
    error_message: Option<String>,
    /// Snapshot shown by the confirm dialog
    confirmation: Option<PendingDeletion>,
}

impl App {
    /// Create an App over a review session.
    ///
    /// Starts in `Finished` mode when the session has nothing to review.
    #[must_use]
    pub fn new(session: ReviewSession) -> Self {
        let mut app = Self {
            session,
            mode: AppMode::Reviewing,
            group_index: 0,
            file_index: 0,
            group_scroll: 0,
            file_scroll: 0,
            visible_rows: 20,
            status_message: None,
            error_message: None,
            confirmation: None,
        };
        app.sync_mode();
        app
    }

    // ==================== Mode Management ====================

    /// Get the current application mode.
    #[must_use]
    pub fn mode(&self) -> AppMode {
        self.mode
    }

    /// Set the application mode.
    ///
    /// Entering `Confirming` snapshots the pending deletion; leaving it
    /// drops the snapshot.
    pub fn set_mode(&mut self, mode: AppMode) {
        log::debug!("Mode transition: {:?} -> {:?}", self.mode, mode);
        self.confirmation = (mode == AppMode::Confirming)
            .then(|| PendingDeletion::capture(&self.session));
        self.mode = mode;
    }

    /// The deletion awaiting confirmation, while in `Confirming` mode.
    #[must_use]
    pub fn confirmation(&self) -> Option<&PendingDeletion> {
        self.confirmation.as_ref()
    }

    /// Check if the application should quit.
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.mode.is_done()
    }

    fn sync_mode(&mut self) {
        if self.session.state().is_terminal() {
            self.set_mode(AppMode::Finished);
        } else if self.mode == AppMode::Finished {
            self.set_mode(AppMode::Reviewing);
        }
    }

    // ==================== Session ====================

    /// The underlying review session.
    #[must_use]
    pub fn session(&self) -> &ReviewSession {
        &self.session
    }

    /// Mutable access for commands that need I/O, such as deletion.
    pub fn session_mut(&mut self) -> &mut ReviewSession {
        &mut self.session
    }

    /// Replace the session, e.g. after a rescan. Resets the cursor.
    pub fn set_session(&mut self, session: ReviewSession) {
        self.session = session;
        self.reset_cursor();
        if self.mode == AppMode::Confirming {
            self.set_mode(AppMode::Reviewing);
        }
        self.sync_mode();
        log::info!(
            "Loaded {} similar groups for review",
            self.session.groups().len()
        );
    }

    /// Groups currently revealed.
    #[must_use]
    pub fn visible_groups(&self) -> &[SimilarityGroup] {
        self.session.materialized_groups()
    }

    /// Number of groups currently revealed.
    #[must_use]
    pub fn visible_group_count(&self) -> usize {
        self.visible_groups().len()
    }

    /// Total number of groups in the session.
    #[must_use]
    pub fn total_group_count(&self) -> usize {
        self.session.groups().len()
    }

    /// Aggregate selected count, counting defaults of unrevealed groups.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.session.selected_count()
    }

    /// Paths a confirmed deletion would remove.
    #[must_use]
    pub fn pending_deletions(&self) -> Vec<PathBuf> {
        self.session.pending_deletions()
    }

    /// Check if a path is marked for deletion.
    #[must_use]
    pub fn is_selected(&self, path: &Path) -> bool {
        self.session.is_selected(path)
    }

    // ==================== Navigation ====================

    /// Get the highlighted group index.
    #[must_use]
    pub fn group_index(&self) -> usize {
        self.group_index
    }

    /// Get the highlighted member index.
    #[must_use]
    pub fn file_index(&self) -> usize {
        self.file_index
    }

    /// Get the current group scroll offset.
    #[must_use]
    pub fn group_scroll(&self) -> usize {
        self.group_scroll
    }

    /// Get the current file scroll offset.
    #[must_use]
    pub fn file_scroll(&self) -> usize {
        self.file_scroll
    }

    /// Set the number of visible rows (for scroll calculation).
    pub fn set_visible_rows(&mut self, rows: usize) {
        self.visible_rows = rows.max(1);
    }

    /// Get the highlighted group (if any).
    #[must_use]
    pub fn current_group(&self) -> Option<&SimilarityGroup> {
        self.visible_groups().get(self.group_index)
    }

    /// Get the highlighted member path (if any).
    #[must_use]
    pub fn current_file(&self) -> Option<&PathBuf> {
        self.current_group()
            .and_then(|g| g.members().get(self.file_index))
    }

    /// Move to the next member of the current group.
    pub fn next(&mut self) {
        if !self.mode.is_navigable() {
            return;
        }
        if let Some(group) = self.current_group() {
            if self.file_index + 1 < group.len() {
                self.file_index += 1;
                self.update_file_scroll();
                log::trace!("Navigate next: file_index = {}", self.file_index);
            }
        }
    }

    /// Move to the previous member of the current group.
    pub fn previous(&mut self) {
        if !self.mode.is_navigable() {
            return;
        }
        if self.file_index > 0 {
            self.file_index -= 1;
            self.update_file_scroll();
            log::trace!("Navigate previous: file_index = {}", self.file_index);
        }
    }

    /// Move to the next materialized group.
    ///
    /// Stops at the last revealed group; use [`Action::LoadMore`] to go on.
    pub fn next_group(&mut self) {
        if !self.mode.is_navigable() {
            return;
        }
        if self.group_index + 1 < self.visible_group_count() {
            self.group_index += 1;
            self.file_index = 0;
            self.file_scroll = 0;
            self.update_group_scroll();
            log::trace!("Navigate next group: group_index = {}", self.group_index);
        }
    }

    /// Move to the previous group.
    pub fn previous_group(&mut self) {
        if !self.mode.is_navigable() {
            return;
        }
        if self.group_index > 0 {
            self.group_index -= 1;
            self.file_index = 0;
            self.file_scroll = 0;
            self.update_group_scroll();
            log::trace!(
                "Navigate previous group: group_index = {}",
                self.group_index
            );
        }
    }

    fn update_file_scroll(&mut self) {
        if self.file_index >= self.file_scroll + self.visible_rows {
            self.file_scroll = self.file_index - self.visible_rows + 1;
        }
        if self.file_index < self.file_scroll {
            self.file_scroll = self.file_index;
        }
    }

    fn update_group_scroll(&mut self) {
        if self.group_index >= self.group_scroll + self.visible_rows {
            self.group_scroll = self.group_index - self.visible_rows + 1;
        }
        if self.group_index < self.group_scroll {
            self.group_scroll = self.group_index;
        }
    }

    fn reset_cursor(&mut self) {
        self.group_index = 0;
        self.file_index = 0;
        self.group_scroll = 0;
        self.file_scroll = 0;
    }

    // ==================== Selection ====================

    /// Toggle selection of the highlighted member.
    pub fn toggle_select(&mut self) {
        let Some(path) = self.current_file().cloned() else {
            return;
        };
        if let Err(e) = self.session.toggle_selection(&path) {
            self.set_error(&e.to_string());
        }
    }

    /// Reapply the default selection to the highlighted group.
    pub fn select_defaults(&mut self) {
        if self.current_group().is_none() {
            return;
        }
        if let Err(e) = self.session.select_defaults(self.group_index) {
            self.set_error(&e.to_string());
        }
    }

    /// Clear every selection.
    pub fn deselect_all(&mut self) {
        self.session.deselect_all();
    }

    /// Reveal the next page of groups.
    ///
    /// Returns whether new groups were revealed.
    pub fn load_more(&mut self) -> bool {
        let before = self.visible_group_count();
        if self.session.advance_page() {
            let added = self.visible_group_count() - before;
            self.set_status(&format!("Loaded {added} more group(s)"));
            true
        } else {
            if self.session.state() == SessionState::AwaitingDeleteDecision {
                self.set_status("All groups loaded");
            }
            false
        }
    }

    /// Update state after the session ran a deletion.
    pub fn apply_delete_result(&mut self, result: &BatchDeleteResult) {
        self.reset_cursor();
        self.set_mode(AppMode::Reviewing);
        self.sync_mode();

        if result.all_succeeded() {
            self.set_status(&result.summary());
        } else {
            let first = result
                .failures
                .first()
                .map(|f| format!("{}: {}", f.path.display(), f.message))
                .unwrap_or_default();
            self.set_error(&format!(
                "{} file(s) could not be deleted. First failure: {}",
                result.failure_count(),
                first
            ));
            self.status_message = Some(result.summary());
        }

        if self.mode == AppMode::Finished {
            self.set_status("All similar groups processed.");
        }
    }

    // ==================== Messages ====================

    /// Current status line (if any).
    #[must_use]
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Set the status line.
    pub fn set_status(&mut self, message: &str) {
        log::debug!("Status: {}", message);
        self.status_message = Some(message.to_string());
    }

    /// Get the current error message (if any).
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Set an error message to display.
    pub fn set_error(&mut self, message: &str) {
        log::warn!("{}", message);
        self.error_message = Some(message.to_string());
    }

    /// Clear the error message.
    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    // ==================== Action Handling ====================

    /// Handle a user action and update state accordingly.
    ///
    /// Deletion and rescan need I/O; for those this only validates the mode
    /// and the caller performs the work when `true` is returned.
    pub fn handle_action(&mut self, action: Action) -> bool {
        log::trace!("Handling action: {:?} in mode {:?}", action, self.mode);

        if self.error_message.is_some() && action != Action::Quit {
            self.clear_error();
            return true;
        }

        match action {
            Action::NavigateUp => {
                self.previous();
                true
            }
            Action::NavigateDown => {
                self.next();
                true
            }
            Action::NextGroup => {
                self.next_group();
                true
            }
            Action::PreviousGroup => {
                self.previous_group();
                true
            }
            Action::ToggleSelect if self.mode.is_navigable() => {
                self.toggle_select();
                true
            }
            Action::SelectDefaults if self.mode.is_navigable() => {
                self.select_defaults();
                true
            }
            Action::DeselectAll if self.mode.is_navigable() => {
                self.deselect_all();
                true
            }
            Action::LoadMore if self.mode.is_navigable() => self.load_more(),
            Action::Delete => {
                if self.mode == AppMode::Reviewing && !self.pending_deletions().is_empty() {
                    self.set_mode(AppMode::Confirming);
                    true
                } else {
                    false
                }
            }
            Action::Confirm => self.mode == AppMode::Confirming,
            Action::Cancel => {
                if self.mode == AppMode::Confirming {
                    self.set_mode(AppMode::Reviewing);
                    true
                } else {
                    false
                }
            }
            Action::Rescan => matches!(self.mode, AppMode::Reviewing | AppMode::Finished),
            Action::Quit => {
                self.set_mode(AppMode::Quitting);
                true
            }
            Action::ToggleSelect
            | Action::SelectDefaults
            | Action::DeselectAll
            | Action::LoadMore => false,
        }
    }
}
