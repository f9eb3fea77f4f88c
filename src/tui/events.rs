//! TUI event handling with crossterm.
//!
//! # Overview
//!
//! Keyboard input is translated to [`Action`]s:
//!
//! | Keys                 | Action           |
//! |----------------------|------------------|
//! | `j` / Down           | next member      |
//! | `k` / Up             | previous member  |
//! | `n` / Right / PgDn   | next group       |
//! | `p` / Left / PgUp    | previous group   |
//! | Space                | toggle selection |
//! | `a`                  | default selection for the group |
//! | `u`                  | deselect all     |
//! | `m`                  | load more groups |
//! | `d` / Delete         | delete selected  |
//! | `y` / Enter          | confirm          |
//! | Esc                  | cancel           |
//! | `r`                  | rescan           |
//! | `q` / Ctrl+C         | quit             |
//!
//! While a deletion is being confirmed, `n` cancels instead of moving.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::{Action, AppMode};

/// Errors that can occur while reading terminal events.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// Reading from the terminal failed.
    #[error("failed to read terminal event: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads terminal events and resolves them to actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventHandler;

impl EventHandler {
    /// Create a new event handler.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Wait up to `timeout` for a key press and resolve it for `mode`.
    ///
    /// Returns `Ok(None)` on timeout and for events without a binding.
    ///
    /// # Errors
    ///
    /// Returns `EventError::Io` if the terminal cannot be read.
    pub fn poll(&self, timeout: Duration, mode: AppMode) -> Result<Option<Action>, EventError> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) => Ok(resolve_key(&key, mode)),
            _ => Ok(None),
        }
    }
}

/// Map a key event to an action.
///
/// Key release and repeat events are ignored.
///
/// # Examples
///
/// ```
/// use simdupe::tui::app::{Action, AppMode};
/// use simdupe::tui::events::resolve_key;
/// use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
///
/// let key = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
/// assert_eq!(resolve_key(&key, AppMode::Reviewing), Some(Action::NavigateDown));
/// ```
#[must_use]
pub fn resolve_key(key: &KeyEvent, mode: AppMode) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    if mode == AppMode::Confirming {
        match key.code {
            KeyCode::Char('n') => return Some(Action::Cancel),
            KeyCode::Char('y') | KeyCode::Enter => return Some(Action::Confirm),
            _ => {}
        }
    }

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => Some(Action::NavigateDown),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::NavigateUp),
        KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => Some(Action::NextGroup),
        KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => Some(Action::PreviousGroup),
        KeyCode::Char(' ') => Some(Action::ToggleSelect),
        KeyCode::Char('a') => Some(Action::SelectDefaults),
        KeyCode::Char('u') => Some(Action::DeselectAll),
        KeyCode::Char('m') => Some(Action::LoadMore),
        KeyCode::Char('d') | KeyCode::Delete => Some(Action::Delete),
        KeyCode::Char('y') | KeyCode::Enter => Some(Action::Confirm),
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Char('r') => Some(Action::Rescan),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}
