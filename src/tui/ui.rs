//! TUI layout and rendering with ratatui.
//!
//! # Overview
//!
//! The screen is split into:
//! - Header with title, revealed/total groups and the aggregate selected count
//! - Group list (1-based numbers) and the member list of the highlighted group
//! - Footer with the available commands
//! - Modal dialogs for deletion confirmation and errors
//!
//! # Example
//!
//! ```no_run
//! use simdupe::tui::app::App;
//! use simdupe::tui::ui::render;
//! use ratatui::Frame;
//!
//! fn draw(frame: &mut Frame, app: &App) {
//!     render(frame, app);
//! }
//! ```

use bytesize::ByteSize;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Wrap,
    },
    Frame,
};

use super::app::{App, AppMode};

const PRIMARY: Color = Color::Cyan;
const SECONDARY: Color = Color::Yellow;
const SUCCESS: Color = Color::Green;
const DANGER: Color = Color::Red;
const NORMAL: Color = Color::White;
const DIM: Color = Color::DarkGray;
const INVERTED_FG: Color = Color::Black;

fn create_block(title: impl Into<String>) -> Block<'static> {
    let title: String = title.into();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED);
    if title.is_empty() {
        block
    } else {
        block.title(title)
    }
}

/// Render the TUI based on current application state.
///
/// # Arguments
///
/// * `frame` - The ratatui frame to render to
/// * `app` - The application state to render
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_content(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);

    if app.mode() == AppMode::Confirming {
        render_confirm_dialog(frame, app, area);
    }
    if app.error_message().is_some() {
        render_error_dialog(frame, app, area);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.mode() {
        AppMode::Reviewing => "simdupe - Similar Image Review",
        AppMode::Confirming => "simdupe - Similar Image Review [Confirm Delete]",
        AppMode::Finished => "simdupe - Similar Image Review [Done]",
        AppMode::Quitting => "simdupe - Goodbye!",
    };

    let mut stats = format!(
        " | {}/{} groups shown, {} selected",
        app.visible_group_count(),
        app.total_group_count(),
        app.selected_count()
    );
    if let Some(status) = app.status_message() {
        stats.push_str(" | ");
        stats.push_str(status);
    }

    let header = Paragraph::new(format!("{title}{stats}"))
        .style(Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(create_block("").border_style(Style::default().fg(PRIMARY)));

    frame.render_widget(header, area);
}

fn render_content(frame: &mut Frame, app: &App, area: Rect) {
    if app.mode() == AppMode::Finished || app.visible_group_count() == 0 {
        render_finished_content(frame, app, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_groups_list(frame, app, chunks[0]);
    render_files_list(frame, app, chunks[1]);
}

fn render_finished_content(frame: &mut Frame, app: &App, area: Rect) {
    let text = if app.total_group_count() == 0 && app.status_message().is_none() {
        "No similar images found."
    } else {
        "All similar groups processed. Press r to rescan or q to quit."
    };
    let message = Paragraph::new(text)
        .style(Style::default().fg(SUCCESS))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(create_block("Results"));
    frame.render_widget(message, area);
}

fn render_groups_list(frame: &mut Frame, app: &App, area: Rect) {
    let groups = app.visible_groups();
    let selected_group = app.group_index();
    let visible_height = area.height.saturating_sub(2) as usize;
    let scroll = app.group_scroll();

    let items: Vec<ListItem> = groups
        .iter()
        .enumerate()
        .skip(scroll)
        .take(visible_height.max(1))
        .map(|(i, group)| {
            let label = group
                .representative()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Unknown".to_string());
            let marked = group.members().iter().filter(|p| app.is_selected(p)).count();

            let text = format!(
                "[{}] {} ({} images, {} marked)",
                i + 1,
                truncate_string(&label, 20),
                group.len(),
                marked
            );

            let style = if i == selected_group {
                Style::default()
                    .fg(INVERTED_FG)
                    .bg(PRIMARY)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(NORMAL)
            };
            ListItem::new(text).style(style)
        })
        .collect();

    let more = if app.session().has_more_pages() {
        " +more (m)"
    } else {
        ""
    };
    let title = format!(
        "Groups ({}/{}){}",
        selected_group + 1,
        groups.len(),
        more
    );
    let list = List::new(items).block(create_block(title).border_style(Style::default().fg(PRIMARY)));

    let inner_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    frame.render_widget(list, inner_chunks[0]);

    if groups.len() > visible_height {
        let mut scrollbar_state =
            ScrollbarState::new(groups.len().saturating_sub(visible_height)).position(scroll);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("▲"))
                .end_symbol(Some("▼")),
            inner_chunks[1],
            &mut scrollbar_state,
        );
    }
}

fn render_files_list(frame: &mut Frame, app: &App, area: Rect) {
    let Some(group) = app.current_group() else {
        return;
    };

    let selected_file = app.file_index();
    let visible_height = area.height.saturating_sub(2) as usize;
    let scroll = app.file_scroll();
    let max_path_len = area.width.saturating_sub(20) as usize;

    let items: Vec<ListItem> = group
        .members()
        .iter()
        .enumerate()
        .skip(scroll)
        .take(visible_height.max(1))
        .map(|(i, path)| {
            let is_selected = app.is_selected(path);
            let is_first = i == 0;

            let prefix = if is_selected {
                "[X]"
            } else if is_first {
                "[*]"
            } else {
                "[ ]"
            };
            let size = std::fs::metadata(path)
                .map(|m| format_size(m.len()))
                .unwrap_or_else(|_| "?".to_string());
            let text = format!(
                "{} {} ({})",
                prefix,
                truncate_path(&path.to_string_lossy(), max_path_len),
                size
            );

            let style = if i == selected_file {
                let bg = if is_selected { DANGER } else { SECONDARY };
                Style::default()
                    .fg(INVERTED_FG)
                    .bg(bg)
                    .add_modifier(Modifier::BOLD)
            } else if is_selected {
                Style::default().fg(DANGER)
            } else if is_first {
                Style::default().fg(SUCCESS)
            } else {
                Style::default().fg(NORMAL)
            };

            ListItem::new(text).style(style)
        })
        .collect();

    let title = format!(
        "Group {} - image {}/{} (key {})",
        app.group_index() + 1,
        selected_file + 1,
        group.len(),
        group.key()
    );
    let list =
        List::new(items).block(create_block(title).border_style(Style::default().fg(SECONDARY)));

    frame.render_widget(list, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let spans: Vec<Span> = footer_commands(app.mode())
        .iter()
        .flat_map(|(key, desc)| {
            vec![
                Span::styled(
                    format!("[{key}]"),
                    Style::default().fg(SECONDARY).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("{desc} "), Style::default().fg(NORMAL)),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(create_block("").border_style(Style::default().fg(DIM)));

    frame.render_widget(footer, area);
}

fn footer_commands(mode: AppMode) -> Vec<(&'static str, &'static str)> {
    match mode {
        AppMode::Reviewing => vec![
            ("j/k", "Move"),
            ("n/p", "Group"),
            ("Space", "Toggle"),
            ("a", "Defaults"),
            ("u", "Clear"),
            ("m", "More"),
            ("d", "Delete"),
            ("r", "Rescan"),
            ("q", "Quit"),
        ],
        AppMode::Confirming => vec![("y/Enter", "Confirm"), ("n/Esc", "Cancel")],
        AppMode::Finished => vec![("r", "Rescan"), ("q", "Quit")],
        AppMode::Quitting => vec![],
    }
}

fn render_confirm_dialog(frame: &mut Frame, app: &App, area: Rect) {
    let Some(pending) = app.confirmation() else {
        return;
    };
    let dialog_area = centered_rect(60, 50, area);
    frame.render_widget(Clear, dialog_area);

    let files = &pending.files;
    let total_size = pending.total_bytes;

    let mut lines = vec![
        Line::from(Span::styled(
            "Confirm Deletion",
            Style::default().fg(DANGER).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!(
            "Permanently delete {} file(s) ({})?",
            files.len(),
            format_size(total_size)
        )),
        Line::from(Span::styled(
            "This cannot be undone.",
            Style::default().fg(SECONDARY),
        )),
        Line::from(""),
    ];

    for (i, file) in files.iter().take(5).enumerate() {
        let truncated = truncate_path(&file.to_string_lossy(), 45);
        lines.push(Line::from(format!("  {}. {}", i + 1, truncated)));
    }
    if files.len() > 5 {
        lines.push(Line::from(format!("  ... and {} more", files.len() - 5)));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[y/Enter] Confirm    [n/Esc] Cancel",
        Style::default().fg(PRIMARY),
    )));

    let confirm = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .block(create_block("Confirm").border_style(Style::default().fg(DANGER)));

    frame.render_widget(confirm, dialog_area);
}

fn render_error_dialog(frame: &mut Frame, app: &App, area: Rect) {
    let dialog_area = centered_rect(60, 30, area);
    frame.render_widget(Clear, dialog_area);

    let message = app.error_message().unwrap_or("Unknown error");

    let error = Paragraph::new(vec![
        Line::from(Span::styled(
            "Error",
            Style::default().fg(DANGER).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to dismiss",
            Style::default().fg(DIM),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(create_block("").border_style(Style::default().fg(DANGER)));

    frame.render_widget(error, dialog_area);
}

// ==================== Helper Functions ====================

/// Format bytes as human-readable size.
///
/// # Examples
///
/// ```
/// use simdupe::tui::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// ```
#[must_use]
pub fn format_size(bytes: u64) -> String {
    ByteSize::b(bytes).to_string()
}

/// Truncate a string with ellipsis if it exceeds max length.
///
/// # Examples
///
/// ```
/// use simdupe::tui::ui::truncate_string;
///
/// assert_eq!(truncate_string("hello", 10), "hello");
/// assert_eq!(truncate_string("hello world", 8), "hello...");
/// ```
#[must_use]
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    }
}

/// Truncate a path with ellipsis, preserving the filename.
///
/// # Examples
///
/// ```
/// use simdupe::tui::ui::truncate_path;
///
/// let long = "/very/long/path/to/some/deeply/nested/photo.jpg";
/// let truncated = truncate_path(long, 30);
/// assert!(truncated.ends_with("photo.jpg"));
/// assert!(truncated.contains("..."));
/// ```
#[must_use]
pub fn truncate_path(path: &str, max_len: usize) -> String {
    let len = path.chars().count();
    if len <= max_len {
        return path.to_string();
    }
    if max_len <= 6 {
        return truncate_string(path, max_len);
    }

    if let Some(filename) = path.rsplit(['/', '\\']).next() {
        let name_len = filename.chars().count();
        if name_len + 4 <= max_len {
            let head: String = path.chars().take(max_len - name_len - 4).collect();
            return format!("{head}.../{filename}");
        }
    }

    truncate_string(path, max_len)
}

/// Create a centered rectangle with given percentage of parent.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
