use ratatui::backend::TestBackend;
use ratatui::Terminal;
use simdupe::review::ReviewSession;
use simdupe::scanner::Hash64;
use simdupe::similarity::SimilarityGroup;
use simdupe::tui::app::{Action, App, AppMode};
use simdupe::tui::ui::render;
use std::path::PathBuf;

fn setup_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
    let backend = TestBackend::new(width, height);
    Terminal::new(backend).unwrap()
}

fn make_group(paths: &[&str]) -> SimilarityGroup {
    SimilarityGroup::new(
        Hash64::new(0x00ff_00ff_00ff_00ff),
        paths.iter().map(PathBuf::from).collect(),
    )
}

fn draw(app: &App) -> String {
    let mut terminal = setup_terminal(120, 30);
    terminal
        .draw(|f| {
            render(f, app);
        })
        .unwrap();
    format!("{:?}", terminal.backend().buffer())
}

#[test]
fn test_render_header() {
    let groups = vec![make_group(&["/pics/cat.png", "/pics/cat_copy.png"])];
    let app = App::new(ReviewSession::new(groups, 10).unwrap());

    let content = draw(&app);

    assert!(content.contains("simdupe - Similar Image Review"));
    assert!(content.contains("1/1 groups shown, 1 selected"));
}

#[test]
fn test_render_empty_state() {
    let app = App::new(ReviewSession::new(Vec::new(), 10).unwrap());
    assert_eq!(app.mode(), AppMode::Finished);

    let content = draw(&app);

    assert!(content.contains("No similar images found."));
    assert!(content.contains("[Done]"));
}

#[test]
fn test_render_groups_and_files() {
    let groups = vec![
        make_group(&["/pics/cat.png", "/pics/cat_copy.png", "/pics/cat_small.png"]),
        make_group(&["/pics/dog.jpg", "/pics/dog_rotated.jpg"]),
    ];
    let app = App::new(ReviewSession::new(groups, 10).unwrap());

    let content = draw(&app);

    assert!(content.contains("[1] cat.png (3 images, 2 marked)"));
    assert!(content.contains("[2] dog.jpg (2 images, 1 marked)"));
    assert!(content.contains("[*] /pics/cat.png"));
    assert!(content.contains("[X] /pics/cat_copy.png"));
    assert!(content.contains("Group 1 - image 1/3"));
}

#[test]
fn test_render_more_pages_hint() {
    let groups = vec![
        make_group(&["/a/1.png", "/a/2.png"]),
        make_group(&["/b/1.png", "/b/2.png"]),
    ];
    let mut app = App::new(ReviewSession::new(groups, 1).unwrap());

    let content = draw(&app);
    assert!(content.contains("1/2 groups shown"));
    assert!(content.contains("+more (m)"));

    app.handle_action(Action::LoadMore);
    let content = draw(&app);
    assert!(content.contains("2/2 groups shown"));
    assert!(!content.contains("+more (m)"));
}

#[test]
fn test_render_toggle_updates_marks() {
    let groups = vec![make_group(&["/pics/cat.png", "/pics/cat_copy.png"])];
    let mut app = App::new(ReviewSession::new(groups, 10).unwrap());

    app.handle_action(Action::NavigateDown);
    app.handle_action(Action::ToggleSelect);

    let content = draw(&app);
    assert!(content.contains("0 selected"));
    assert!(content.contains("[ ] /pics/cat_copy.png"));
}

#[test]
fn test_render_confirm_dialog() {
    let groups = vec![make_group(&["/pics/cat.png", "/pics/cat_copy.png"])];
    let mut app = App::new(ReviewSession::new(groups, 10).unwrap());

    app.handle_action(Action::Delete);
    assert_eq!(app.mode(), AppMode::Confirming);

    let content = draw(&app);
    assert!(content.contains("Confirm Deletion"));
    assert!(content.contains("Permanently delete 1 file(s)"));
    assert!(content.contains("This cannot be undone."));
}

#[test]
fn test_render_error_dialog() {
    let groups = vec![make_group(&["/pics/cat.png", "/pics/cat_copy.png"])];
    let mut app = App::new(ReviewSession::new(groups, 10).unwrap());
    app.set_error("Rescan failed: Path not found");

    let content = draw(&app);
    assert!(content.contains("Rescan failed: Path not found"));
    assert!(content.contains("Press any key to dismiss"));
}

#[test]
fn test_render_footer_commands() {
    let groups = vec![make_group(&["/pics/cat.png", "/pics/cat_copy.png"])];
    let app = App::new(ReviewSession::new(groups, 10).unwrap());

    let content = draw(&app);
    assert!(content.contains("[d]"));
    assert!(content.contains("Delete"));
    assert!(content.contains("[r]"));
    assert!(content.contains("Rescan"));
}

#[test]
fn test_render_small_terminal_does_not_panic() {
    let groups = vec![make_group(&["/a/very/long/path/to/some/image_file_name.png", "/b.png"])];
    let app = App::new(ReviewSession::new(groups, 10).unwrap());

    let mut terminal = setup_terminal(20, 8);
    terminal
        .draw(|f| {
            render(f, &app);
        })
        .unwrap();
}
