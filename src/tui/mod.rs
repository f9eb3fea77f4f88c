//! Terminal User Interface module.
//!
//! Interactive review of similarity groups using ratatui with the crossterm
//! backend.
//!
//! # Overview
//!
//! - [`app`]: Application state (modes, cursor, messages) over a
//!   [`ReviewSession`](crate::review::ReviewSession)
//! - [`events`]: Keyboard input to [`Action`] translation
//! - [`ui`]: Ratatui rendering
//! - [`run`]: Terminal setup, event loop, deletion and rescan
//!
//! # Architecture
//!
//! The TUI follows a unidirectional data flow:
//! 1. Events are captured from the terminal (crossterm)
//! 2. Events are translated to Actions
//! 3. Actions update the App, which forwards commands to the session
//! 4. The UI renders a snapshot of the App
//!
//! # Example
//!
//! ```
//! use simdupe::review::ReviewSession;
//! use simdupe::scanner::Hash64;
//! use simdupe::similarity::SimilarityGroup;
//! use simdupe::tui::{Action, App};
//! use std::path::PathBuf;
//!
//! let groups = vec![SimilarityGroup::new(
//!     Hash64::new(0),
//!     vec![PathBuf::from("/a.png"), PathBuf::from("/b.png")],
//! )];
//! let mut app = App::new(ReviewSession::new(groups, 10).unwrap());
//!
//! app.handle_action(Action::NavigateDown);
//! assert_eq!(app.file_index(), 1);
//! assert_eq!(app.selected_count(), 1);
//! ```

pub mod app;
pub mod events;
pub mod run;
pub mod ui;

// Re-export commonly used types
pub use app::{Action, App, AppMode};
pub use events::{resolve_key, EventError, EventHandler};
pub use run::{run_tui, RescanTarget, TuiError, TuiResult};
pub use ui::{format_size, render, truncate_path, truncate_string};
