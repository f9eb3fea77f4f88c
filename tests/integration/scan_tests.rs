use image::{imageops, Rgb, RgbImage};
use simdupe::scanner::{FingerprintExtractor, FingerprintSet, Hash64, ImageFingerprint};
use simdupe::similarity::{
    rotation_component, ClusterBuilder, DistanceMetric, DistanceWeights, FinderConfig,
    FinderError, SimilarityFinder, DEFAULT_THRESHOLD,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::tempdir;

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let v = ((x * 255) / width.max(1)) as u8;
        let w = ((y * 127) / height.max(1)) as u8;
        Rgb([v, w, v / 2])
    })
}

fn save(image: &RgbImage, dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    image.save(&path).unwrap();
    path
}

fn uniform(bits: u64) -> FingerprintSet {
    let h = Hash64::new(bits);
    FingerprintSet {
        perceptual_hash: h,
        difference_hash: h,
        orientation_hashes: [h; 4],
        flip_horizontal_hash: h,
        flip_vertical_hash: h,
    }
}

fn default_builder() -> ClusterBuilder {
    let metric = DistanceMetric::new(DistanceWeights::FOUR_CHANNEL).unwrap();
    ClusterBuilder::new(metric, DEFAULT_THRESHOLD).unwrap()
}

#[test]
fn test_identical_images_form_one_group() {
    let dir = tempdir().unwrap();
    let img = gradient(48, 32);
    let a = save(&img, dir.path(), "a.png");
    save(&img, dir.path(), "b.png");
    save(&img, dir.path(), "c.png");

    let finder = SimilarityFinder::new(FinderConfig::default()).unwrap();
    let (groups, summary) = finder.find_similar(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 3);
    assert_eq!(groups[0].representative(), Some(a.as_path()));
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.fingerprinted, 3);
    assert_eq!(summary.candidate_deletions, 2);
    assert!(!summary.interrupted);
}

#[test]
fn test_rotated_copy_has_zero_rotation_distance() {
    let dir = tempdir().unwrap();
    let img = gradient(40, 40);
    let original = save(&img, dir.path(), "original.png");
    let rotated = save(&imageops::rotate90(&img), dir.path(), "rotated.png");

    let extractor = FingerprintExtractor::new();
    let a = extractor.extract_path(&original).unwrap();
    let b = extractor.extract_path(&rotated).unwrap();

    assert_eq!(rotation_component(&a, &b), 0);
    assert_eq!(a.orientation_hashes[1], b.orientation_hashes[0]);
}

#[test]
fn test_rotation_only_difference_is_grouped() {
    let base = FingerprintSet {
        perceptual_hash: Hash64::new(0x0f0f_0f0f_0000_ffff),
        difference_hash: Hash64::new(0x1234_5678_9abc_def0),
        orientation_hashes: [
            Hash64::new(0x1),
            Hash64::new(0xff00),
            Hash64::new(0xffff_0000),
            Hash64::new(0xff_ffff_0000_0000),
        ],
        flip_horizontal_hash: Hash64::new(0xaaaa),
        flip_vertical_hash: Hash64::new(0x5555),
    };
    let mut turned = base;
    turned.orientation_hashes.rotate_left(1);

    let metric = DistanceMetric::new(DistanceWeights::FOUR_CHANNEL).unwrap();
    assert_eq!(metric.components(&base, &turned).rotation, 0);
    assert!(metric.distance(&base, &turned) <= DEFAULT_THRESHOLD);

    let groups = default_builder().cluster(&[
        ImageFingerprint::new(PathBuf::from("/p/a.jpg"), base),
        ImageFingerprint::new(PathBuf::from("/p/b.jpg"), turned),
    ]);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[test]
fn test_mutually_distant_images_form_no_groups() {
    // Six-bit blocks at distinct offsets: every pair differs in 12 bits
    let entries: Vec<ImageFingerprint> = (0..10)
        .map(|i| {
            ImageFingerprint::new(
                PathBuf::from(format!("/p/{i}.png")),
                uniform(0x3f << (6 * i)),
            )
        })
        .collect();

    let groups = default_builder().cluster(&entries);
    assert!(groups.is_empty());
}

#[test]
fn test_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = SimilarityFinder::new(FinderConfig::default()).unwrap();

    let (groups, summary) = finder.find_similar(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert!(summary.is_empty_result());
    assert_eq!(summary.total_files, 0);
}

#[test]
fn test_unreadable_image_is_skipped() {
    let dir = tempdir().unwrap();
    let img = gradient(32, 32);
    save(&img, dir.path(), "a.png");
    save(&img, dir.path(), "b.png");
    fs::write(dir.path().join("broken.png"), b"not an image").unwrap();
    fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

    let finder = SimilarityFinder::new(FinderConfig::default()).unwrap();
    let (groups, summary) = finder.find_similar(dir.path()).unwrap();

    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.fingerprinted, 2);
    assert_eq!(summary.skipped.len(), 1);
    assert!(summary.skipped[0].path.ends_with("broken.png"));
    assert_eq!(groups.len(), 1);
}

#[test]
fn test_nested_directories_are_scanned() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("nested").join("deeper");
    fs::create_dir_all(&nested).unwrap();

    let img = gradient(32, 24);
    save(&img, dir.path(), "top.png");
    save(&img, &nested, "copy.png");

    let finder = SimilarityFinder::new(FinderConfig::default()).unwrap();
    let (groups, summary) = finder.find_similar(dir.path()).unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(groups.len(), 1);
}

#[test]
fn test_extension_filter() {
    let dir = tempdir().unwrap();
    let img = gradient(32, 32);
    save(&img, dir.path(), "a.png");
    save(&img, dir.path(), "b.png");
    save(&img, dir.path(), "c.bmp");

    let config = FinderConfig::default().with_extensions(vec!["bmp".to_string()]);
    let finder = SimilarityFinder::new(config).unwrap();
    let (groups, summary) = finder.find_similar(dir.path()).unwrap();

    assert_eq!(summary.total_files, 1);
    assert!(groups.is_empty());
}

#[test]
fn test_missing_root() {
    let dir = tempdir().unwrap();
    let finder = SimilarityFinder::new(FinderConfig::default()).unwrap();

    let result = finder.find_similar(&dir.path().join("missing"));
    assert!(matches!(result, Err(FinderError::PathNotFound(_))));
}

#[test]
fn test_file_as_root() {
    let dir = tempdir().unwrap();
    let file = save(&gradient(8, 8), dir.path(), "single.png");
    let finder = SimilarityFinder::new(FinderConfig::default()).unwrap();

    let result = finder.find_similar(&file);
    assert!(matches!(result, Err(FinderError::NotADirectory(_))));
}

#[test]
fn test_shutdown_before_scan() {
    let dir = tempdir().unwrap();
    save(&gradient(8, 8), dir.path(), "a.png");

    let flag = Arc::new(AtomicBool::new(true));
    let config = FinderConfig::default().with_shutdown_flag(flag);
    let finder = SimilarityFinder::new(config).unwrap();

    let result = finder.find_similar(dir.path());
    assert!(matches!(result, Err(FinderError::Interrupted)));
}

#[test]
fn test_invalid_threshold_rejected() {
    let config = FinderConfig::default().with_threshold(-1.0);
    assert!(matches!(
        SimilarityFinder::new(config),
        Err(FinderError::InvalidConfig(_))
    ));
}
