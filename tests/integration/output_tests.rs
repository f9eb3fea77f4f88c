use image::{Rgb, RgbImage};
use simdupe::error::ExitCode;
use simdupe::output::{JsonOutput, TextOutput};
use simdupe::similarity::{FinderConfig, SimilarityFinder};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_json_report_from_real_scan() {
    let dir = tempdir().unwrap();
    let img = RgbImage::from_fn(24, 24, |x, _| Rgb([(x * 10) as u8, 40, 90]));
    img.save(dir.path().join("first.png")).unwrap();
    img.save(dir.path().join("second.png")).unwrap();
    fs::write(dir.path().join("zz_bad.png"), b"garbage").unwrap();

    let finder = SimilarityFinder::new(FinderConfig::default()).unwrap();
    let (groups, summary) = finder.find_similar(dir.path()).unwrap();

    let report = JsonOutput::new(&groups, &summary, finder.config(), ExitCode::Success);
    let mut buffer = Vec::new();
    report.write_to(&mut buffer, true).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

    assert_eq!(value["threshold"], 4.0);
    assert_eq!(value["groups"].as_array().unwrap().len(), 1);

    let group = &value["groups"][0];
    assert_eq!(group["index"], 1);
    assert!(group["representative"]
        .as_str()
        .unwrap()
        .ends_with("first.png"));
    assert_eq!(group["default_selection"].as_array().unwrap().len(), 1);

    assert_eq!(value["skipped"].as_array().unwrap().len(), 1);
    assert_eq!(value["summary"]["total_files"], 3);
    assert_eq!(value["summary"]["unreadable"], 1);
    assert_eq!(value["summary"]["exit_code"], 0);
}

#[test]
fn test_text_report_lists_keep_and_delete() {
    let dir = tempdir().unwrap();
    let img = RgbImage::from_fn(24, 24, |_, y| Rgb([0, (y * 10) as u8, 200]));
    img.save(dir.path().join("a.png")).unwrap();
    img.save(dir.path().join("b.png")).unwrap();

    let finder = SimilarityFinder::new(FinderConfig::default()).unwrap();
    let (groups, summary) = finder.find_similar(dir.path()).unwrap();

    let mut buffer = Vec::new();
    TextOutput::new(&groups, &summary, false)
        .write_to(&mut buffer)
        .unwrap();
    let text = String::from_utf8(buffer).unwrap();

    assert!(text.contains("Group 1 (2 images"));
    assert!(text.lines().any(|l| l.contains("keep") && l.ends_with(")") && l.contains("a.png")));
    assert!(text.lines().any(|l| l.contains("delete") && l.contains("b.png")));
    assert!(text.contains("1 group(s), 1 candidate deletion(s), 2 image(s) scanned"));
    assert!(!text.contains('\u{1b}'));
}

#[test]
fn test_text_report_without_groups() {
    let dir = tempdir().unwrap();
    let finder = SimilarityFinder::new(FinderConfig::default()).unwrap();
    let (groups, summary) = finder.find_similar(dir.path()).unwrap();

    let text = TextOutput::new(&groups, &summary, false).render();
    assert!(text.starts_with("No similar images found."));
}
