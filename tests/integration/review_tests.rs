use image::{Rgb, RgbImage};
use simdupe::review::{ReviewError, ReviewSession, SessionState};
use simdupe::scanner::Hash64;
use simdupe::similarity::{FinderConfig, SimilarityFinder, SimilarityGroup};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

fn write_group(dir: &TempDir, prefix: &str, size: usize) -> SimilarityGroup {
    let members = (0..size)
        .map(|i| {
            let path = dir.path().join(format!("{prefix}_{i}.jpg"));
            fs::write(&path, b"jpeg bytes").unwrap();
            path
        })
        .collect();
    SimilarityGroup::new(Hash64::new(0xabc), members)
}

fn virtual_groups(count: usize) -> Vec<SimilarityGroup> {
    (0..count)
        .map(|i| {
            SimilarityGroup::new(
                Hash64::new(i as u64),
                vec![
                    PathBuf::from(format!("/v/{i}/a.png")),
                    PathBuf::from(format!("/v/{i}/b.png")),
                ],
            )
        })
        .collect()
}

#[test]
fn test_default_selection_deletes_all_but_representative() {
    let dir = tempdir().unwrap();
    let group = write_group(&dir, "g", 4);
    let members = group.members().to_vec();
    let mut session = ReviewSession::new(vec![group], 10).unwrap();

    assert_eq!(session.selected_count(), 3);
    assert!(!session.is_selected(&members[0]));
    assert!(members[1..].iter().all(|p| session.is_selected(p)));

    let result = session.delete_selected();

    assert_eq!(result.success_count(), 3);
    assert!(result.all_succeeded());
    assert!(members[0].exists());
    assert!(members[1..].iter().all(|p| !p.exists()));
    assert!(session.groups().is_empty());
    assert_eq!(session.state(), SessionState::Exhausted);
}

#[test]
fn test_deletion_shrinks_surviving_group() {
    let dir = tempdir().unwrap();
    let group = write_group(&dir, "g", 4);
    let members = group.members().to_vec();
    let mut session = ReviewSession::new(vec![group], 10).unwrap();

    // Deselect two of the three defaults
    session.toggle_selection(&members[2]).unwrap();
    session.toggle_selection(&members[3]).unwrap();
    assert_eq!(session.pending_deletions(), vec![members[1].clone()]);

    session.delete_selected();

    assert_eq!(session.groups().len(), 1);
    assert_eq!(
        session.groups()[0].members(),
        &[members[0].clone(), members[2].clone(), members[3].clone()]
    );
    assert!(matches!(session.state(), SessionState::Materializing { page: 0 }));
}

#[test]
fn test_deleting_representative_promotes_next_member() {
    let dir = tempdir().unwrap();
    let group = write_group(&dir, "g", 3);
    let members = group.members().to_vec();
    let mut session = ReviewSession::new(vec![group], 10).unwrap();

    session.deselect_all();
    session.toggle_selection(&members[0]).unwrap();
    session.delete_selected();

    assert_eq!(session.groups().len(), 1);
    assert_eq!(
        session.groups()[0].representative(),
        Some(members[1].as_path())
    );
}

#[test]
fn test_delete_with_nothing_selected_is_noop() {
    let dir = tempdir().unwrap();
    let group = write_group(&dir, "g", 2);
    let mut session = ReviewSession::new(vec![group.clone()], 10).unwrap();

    session.deselect_all();
    let result = session.delete_selected();

    assert_eq!(result.total_count(), 0);
    assert_eq!(session.groups(), &[group]);
}

#[test]
fn test_failed_deletion_still_leaves_group() {
    let dir = tempdir().unwrap();
    let keep = dir.path().join("keep.png");
    fs::write(&keep, b"x").unwrap();
    let vanished = dir.path().join("vanished.png");
    let group = SimilarityGroup::new(Hash64::new(1), vec![keep.clone(), vanished.clone()]);
    let mut session = ReviewSession::new(vec![group], 10).unwrap();

    let result = session.delete_selected();

    assert_eq!(result.failure_count(), 1);
    assert!(keep.exists());
    assert!(session.groups().is_empty());
}

#[test]
fn test_selected_paths_on_later_pages_are_deleted() {
    let dir = tempdir().unwrap();
    let first = write_group(&dir, "a", 2);
    let second = write_group(&dir, "b", 2);
    let hidden = second.members()[1].clone();
    let mut session = ReviewSession::new(vec![first, second], 1).unwrap();

    assert!(session.is_selected(&hidden));
    assert_eq!(session.selected_count(), 2);
    assert_eq!(session.pending_deletions().len(), 2);

    let result = session.delete_selected();

    assert_eq!(result.success_count(), 2);
    assert!(!hidden.exists());
    assert_eq!(session.state(), SessionState::Exhausted);
}

#[test]
fn test_memberless_groups_are_ignored() {
    let group = SimilarityGroup::new(
        Hash64::new(1),
        vec![PathBuf::from("/x/a.png"), PathBuf::from("/x/b.png")],
    );
    let session = ReviewSession::new(
        vec![group, SimilarityGroup::new(Hash64::new(2), Vec::new())],
        1,
    )
    .unwrap();

    assert_eq!(session.selected_count(), 1);
    assert_eq!(session.page_count(), 1);
    assert!(!session.has_more_pages());
}

#[test]
fn test_pagination_reveals_pages_in_order() {
    let mut session = ReviewSession::new(virtual_groups(25), 10).unwrap();

    assert_eq!(session.page_count(), 3);
    assert_eq!(session.materialized_groups().len(), 10);
    assert_eq!(session.selected_count(), 25);
    assert!(session.page(1).is_none());

    assert!(session.advance_page());
    assert_eq!(session.materialized_groups().len(), 20);
    assert!(session.advance_page());
    assert_eq!(session.materialized_groups().len(), 25);
    assert_eq!(session.page(2).map(<[_]>::len), Some(5));

    assert!(!session.advance_page());
    assert_eq!(session.state(), SessionState::AwaitingDeleteDecision);
    assert_eq!(session.pending_deletions().len(), 25);
}

#[test]
fn test_materialize_page_is_idempotent() {
    let mut session = ReviewSession::new(virtual_groups(15), 10).unwrap();
    let edited = PathBuf::from("/v/0/b.png");

    session.toggle_selection(&edited).unwrap();
    session.materialize_page(0).unwrap();
    assert!(!session.is_selected(&edited));

    session.materialize_page(1).unwrap();
    session.materialize_page(1).unwrap();
    assert_eq!(session.materialized_groups().len(), 15);
    assert_eq!(session.selected_count(), 14);

    assert_eq!(
        session.materialize_page(2),
        Err(ReviewError::PageOutOfRange { page: 2, pages: 2 })
    );
}

#[test]
fn test_unmaterialized_groups_cannot_be_edited() {
    let mut session = ReviewSession::new(virtual_groups(3), 1).unwrap();
    let later = Path::new("/v/2/b.png");

    assert!(session.is_selected(later));
    assert_eq!(
        session.toggle_selection(later),
        Err(ReviewError::NotMaterialized(later.to_path_buf()))
    );
    assert_eq!(
        session.toggle_selection(Path::new("/elsewhere.png")),
        Err(ReviewError::UnknownPath(PathBuf::from("/elsewhere.png")))
    );
}

#[test]
fn test_empty_session() {
    let mut session = ReviewSession::new(Vec::new(), 10).unwrap();

    assert_eq!(session.state(), SessionState::Empty);
    assert_eq!(session.page_count(), 0);
    assert!(!session.advance_page());
    assert_eq!(session.delete_selected().total_count(), 0);
}

#[test]
fn test_zero_page_size_rejected() {
    assert_eq!(
        ReviewSession::new(virtual_groups(1), 0).unwrap_err(),
        ReviewError::InvalidPageSize
    );
}

#[test]
fn test_rescan_after_deletion() {
    let dir = tempdir().unwrap();
    let img = RgbImage::from_fn(32, 32, |x, y| Rgb([(x * 8) as u8, (y * 8) as u8, 0]));
    for name in ["a.png", "b.png", "c.png"] {
        img.save(dir.path().join(name)).unwrap();
    }

    let finder = SimilarityFinder::new(FinderConfig::default()).unwrap();
    let (groups, _) = finder.find_similar(dir.path()).unwrap();
    let mut session = ReviewSession::new(groups, 5).unwrap();
    assert_eq!(session.selected_count(), 2);

    session.delete_selected();
    assert_eq!(session.state(), SessionState::Exhausted);

    img.save(dir.path().join("d.png")).unwrap();
    let (fresh, summary) = session.rescan(&finder, dir.path()).unwrap();

    assert_eq!(summary.fingerprinted, 2);
    assert_eq!(fresh.page_size(), 5);
    assert_eq!(fresh.groups().len(), 1);
    assert_eq!(fresh.selected_count(), 1);
}
