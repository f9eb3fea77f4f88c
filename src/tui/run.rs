//! TUI main loop.
//!
//! # Terminal Management
//!
//! The TUI takes over the terminal by:
//! - Enabling raw mode (unbuffered input, no echo)
//! - Entering the alternate screen buffer
//! - Hiding the cursor
//!
//! All these changes are reverted on exit, including on panic.
//!
//! # Event Loop
//!
//! 1. Poll for a key with a short timeout
//! 2. Apply the resulting action (deleting or rescanning when confirmed)
//! 3. Render the current state, at most ~60 times per second
//!
//! # Example
//!
//! ```no_run
//! use simdupe::review::ReviewSession;
//! use simdupe::tui::{run_tui, App};
//!
//! let mut app = App::new(ReviewSession::new(Vec::new(), 10).unwrap());
//! run_tui(&mut app, None, None).unwrap();
//! ```

use std::io::{self, Stdout};
use std::panic;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use thiserror::Error;

use super::app::{Action, App, AppMode};
use super::events::EventHandler;
use super::ui::render;
use crate::actions::BatchDeleteResult;
use crate::similarity::SimilarityFinder;

/// Frame rate limit: ~60 FPS.
const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Event poll timeout.
const POLL_TIMEOUT: Duration = Duration::from_millis(16);

/// Error type for TUI operations.
#[derive(Debug, Error)]
pub enum TuiError {
    /// I/O error from terminal operations.
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),

    /// Event handling error.
    #[error("event error: {0}")]
    Event(#[from] super::events::EventError),
}

/// Result type for TUI operations.
pub type TuiResult<T> = Result<T, TuiError>;

type Terminal = ratatui::Terminal<CrosstermBackend<Stdout>>;

/// What a rescan should scan again.
#[derive(Debug, Clone, Copy)]
pub struct RescanTarget<'a> {
    /// Finder configured like the original scan
    pub finder: &'a SimilarityFinder,
    /// Directory that was scanned
    pub root: &'a Path,
}

/// Run the interactive TUI until the user quits.
///
/// # Arguments
///
/// * `app` - The application state over a review session
/// * `shutdown_flag` - Optional flag set by the Ctrl+C handler
/// * `rescan` - Where to rescan from; without it the rescan key is ignored
///
/// # Errors
///
/// Returns `TuiError::Io` for terminal I/O errors and `TuiError::Event` for
/// unreadable input. The terminal is restored in every case.
pub fn run_tui(
    app: &mut App,
    shutdown_flag: Option<Arc<AtomicBool>>,
    rescan: Option<RescanTarget<'_>>,
) -> TuiResult<()> {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));

    let result = setup_terminal().and_then(|mut terminal| {
        let outcome = event_loop(&mut terminal, app, shutdown_flag.as_deref(), rescan);
        restore_terminal();
        outcome
    });

    let _ = panic::take_hook();
    result
}

fn event_loop(
    terminal: &mut Terminal,
    app: &mut App,
    shutdown_flag: Option<&AtomicBool>,
    rescan: Option<RescanTarget<'_>>,
) -> TuiResult<()> {
    let event_handler = EventHandler::new();
    let mut last_render = Instant::now();

    loop {
        if shutdown_flag.is_some_and(|f| f.load(Ordering::SeqCst)) {
            log::info!("Shutdown signal received, exiting TUI");
            break;
        }
        if app.should_quit() {
            log::debug!("App requested quit");
            break;
        }

        terminal.draw(|frame| {
            app.set_visible_rows(frame.area().height.saturating_sub(8) as usize);
            render(frame, app);
        })?;

        if let Some(action) = event_handler.poll(POLL_TIMEOUT, app.mode())? {
            handle_action(app, action, rescan);
        }

        let elapsed = last_render.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
        last_render = Instant::now();
    }

    log::info!("TUI exited normally");
    Ok(())
}

/// Apply an action, performing deletion or rescan when the app accepts it.
pub(crate) fn handle_action(app: &mut App, action: Action, rescan: Option<RescanTarget<'_>>) {
    let was_confirming = app.mode() == AppMode::Confirming;
    let accepted = app.handle_action(action);
    if !accepted {
        log::trace!("Action not handled: {:?}", action);
        return;
    }

    match action {
        Action::Confirm if was_confirming => {
            let result = perform_deletion(app);
            log::info!("{}", result.summary());
        }
        Action::Rescan => match rescan {
            Some(target) => perform_rescan(app, target),
            None => app.set_status("Rescan unavailable"),
        },
        _ => {}
    }
}

/// Delete the session's selected files and refresh the view.
pub(crate) fn perform_deletion(app: &mut App) -> BatchDeleteResult {
    let result = app.session_mut().delete_selected();
    app.apply_delete_result(&result);
    result
}

/// Replace the session with a fresh scan of the same directory.
pub(crate) fn perform_rescan(app: &mut App, target: RescanTarget<'_>) {
    match app.session().rescan(target.finder, target.root) {
        Ok((session, summary)) => {
            app.set_session(session);
            app.set_status(&format!(
                "Rescan found {} group(s) in {} image(s)",
                summary.groups, summary.fingerprinted
            ));
        }
        Err(e) => app.set_error(&format!("Rescan failed: {e}")),
    }
}

fn setup_terminal() -> TuiResult<Terminal> {
    log::debug!("Setting up terminal for TUI");
    terminal::enable_raw_mode()?;

    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, cursor::Hide) {
        restore_terminal();
        return Err(e.into());
    }

    let backend = CrosstermBackend::new(stdout);
    match Terminal::new(backend) {
        Ok(terminal) => Ok(terminal),
        Err(e) => {
            restore_terminal();
            Err(e.into())
        }
    }
}

fn restore_terminal() {
    log::debug!("Restoring terminal");
    let _ = terminal::disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen, cursor::Show);
}
