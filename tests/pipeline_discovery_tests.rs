use std::fs;
use std::path::{Path, PathBuf};

use trade_overlay::api::LayoutStyle;
use trade_overlay::pipeline::{
    DEFAULT_COMPOSITOR_MARGIN_PX, PipelineConfig, SourcePair, discover_pairs, prepare_output_dir,
};

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, b"x").expect("write file");
}

fn excluded() -> Vec<String> {
    PipelineConfig::new(".").effective_excluded_dirs()
}

#[test]
fn pairs_match_on_normalized_stems_within_a_directory() {
    let root = tempfile::tempdir().expect("tempdir");
    touch(&root.path().join("EURUSD 2024_01.png"));
    touch(&root.path().join("EURUSD-2024-01.json"));
    touch(&root.path().join("orphan.png"));
    touch(&root.path().join("lonely.json"));
    touch(&root.path().join("notes.txt"));

    let pairs = discover_pairs(root.path(), &excluded()).expect("discover");
    assert_eq!(pairs.len(), 1);
    let pair = &pairs[0];
    assert_eq!(pair.stem, "EURUSD-2024-01");
    assert_eq!(pair.image, root.path().join("EURUSD 2024_01.png"));
    assert_eq!(pair.record, root.path().join("EURUSD-2024-01.json"));
    assert_eq!(pair.relative_dir, PathBuf::new());
}

#[test]
fn files_in_different_directories_never_pair() {
    let root = tempfile::tempdir().expect("tempdir");
    touch(&root.path().join("a/setup.png"));
    touch(&root.path().join("b/setup.json"));

    let pairs = discover_pairs(root.path(), &excluded()).expect("discover");
    assert!(pairs.is_empty());
}

#[test]
fn nested_pairs_keep_relative_directory_and_sorted_order() {
    let root = tempfile::tempdir().expect("tempdir");
    for dir in ["zeta", "alpha/deep", "alpha"] {
        touch(&root.path().join(dir).join("chart.png"));
        touch(&root.path().join(dir).join("chart.json"));
    }

    let pairs = discover_pairs(root.path(), &excluded()).expect("discover");
    let dirs: Vec<PathBuf> = pairs.iter().map(|pair| pair.relative_dir.clone()).collect();
    assert_eq!(
        dirs,
        vec![
            PathBuf::from("alpha"),
            PathBuf::from("alpha/deep"),
            PathBuf::from("zeta")
        ]
    );

    let output_root = root.path().join("output");
    assert_eq!(
        pairs[1].output_path(&output_root),
        output_root.join("alpha/deep/chart.png")
    );
}

#[test]
fn excluded_directories_are_not_entered() {
    let root = tempfile::tempdir().expect("tempdir");
    for dir in ["output", "target", "node_modules", ".git"] {
        touch(&root.path().join(dir).join("chart.png"));
        touch(&root.path().join(dir).join("chart.json"));
    }
    touch(&root.path().join("kept/chart.png"));
    touch(&root.path().join("kept/chart.json"));

    let pairs = discover_pairs(root.path(), &excluded()).expect("discover");
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].relative_dir, PathBuf::from("kept"));
}

#[test]
fn custom_output_dir_is_excluded_from_discovery() {
    let config = PipelineConfig::new("/data").with_output_dir("annotated");
    let excluded = config.effective_excluded_dirs();
    assert!(excluded.iter().any(|name| name == "annotated"));
    assert!(excluded.iter().any(|name| name == "output"));
    assert_eq!(config.output_root(), PathBuf::from("/data/annotated"));
}

#[test]
fn prepare_output_dir_clears_everything_but_reserved_entry() {
    let root = tempfile::tempdir().expect("tempdir");
    let output = root.path().join("output");
    touch(&output.join("stale.png"));
    touch(&output.join("nested/old.png"));
    touch(&output.join(".archive/keep.png"));

    prepare_output_dir(&output, ".archive").expect("prepare");

    let mut remaining: Vec<String> = fs::read_dir(&output)
        .expect("read output")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    remaining.sort();
    assert_eq!(remaining, vec![".archive".to_owned()]);
    assert!(output.join(".archive/keep.png").exists());
}

#[test]
fn prepare_output_dir_creates_missing_directory() {
    let root = tempfile::tempdir().expect("tempdir");
    let output = root.path().join("fresh/output");
    prepare_output_dir(&output, ".archive").expect("prepare");
    assert!(output.is_dir());
}

#[test]
fn pipeline_config_defaults_and_style_file() {
    let root = tempfile::tempdir().expect("tempdir");
    let config = PipelineConfig::new(root.path());
    assert_eq!(config.compositor_margin_px, DEFAULT_COMPOSITOR_MARGIN_PX);
    assert_eq!(config.reserved_output_entry, ".archive");
    assert_eq!(config.style, LayoutStyle::default());

    let style_path = root.path().join("style.json");
    fs::write(&style_path, r#"{"font_size_px": 16.0, "padding_px": 12.0}"#).expect("write");
    let config = config.with_style_file(&style_path).expect("style");
    assert_eq!(config.style.font_size_px, 16.0);
    assert_eq!(config.style.padding_px, 12.0);
    assert_eq!(
        config.style.header_font_size_px,
        LayoutStyle::default().header_font_size_px
    );

    let missing = PipelineConfig::new(root.path()).with_style_file(&root.path().join("nope.json"));
    assert!(missing.is_err());
}

#[test]
fn source_pair_output_path_uses_normalized_stem() {
    let pair = SourcePair {
        image: PathBuf::from("in/EURUSD 1.png"),
        record: PathBuf::from("in/EURUSD_1.json"),
        relative_dir: PathBuf::from("in"),
        stem: "EURUSD-1".to_owned(),
    };
    assert_eq!(
        pair.output_path(Path::new("out")),
        PathBuf::from("out/in/EURUSD-1.png")
    );
}

#[test]
fn colliding_stems_keep_the_first_name_in_sort_order() {
    let root = tempfile::tempdir().expect("tempdir");
    touch(&root.path().join("a b.png"));
    touch(&root.path().join("a_b.png"));
    touch(&root.path().join("a-b.json"));

    let pairs = discover_pairs(root.path(), &excluded()).expect("discover");
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].image, root.path().join("a b.png"));
    assert_eq!(pairs[0].record, root.path().join("a-b.json"));
}

#[cfg(unix)]
#[test]
fn symlinked_directories_are_not_followed() {
    let root = tempfile::tempdir().expect("tempdir");
    let charts = root.path().join("charts");
    touch(&charts.join("setup.png"));
    touch(&charts.join("setup.json"));
    std::os::unix::fs::symlink(&charts, charts.join("loop")).expect("symlink");

    let pairs = discover_pairs(root.path(), &excluded()).expect("discover");
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].relative_dir, PathBuf::from("charts"));
}

#[cfg(unix)]
#[test]
fn unreadable_subdirectory_does_not_stop_discovery() {
    use std::os::unix::fs::PermissionsExt;

    let root = tempfile::tempdir().expect("tempdir");
    touch(&root.path().join("kept/setup.png"));
    touch(&root.path().join("kept/setup.json"));
    let locked = root.path().join("locked");
    touch(&locked.join("other.png"));
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).expect("lock");

    let result = discover_pairs(root.path(), &excluded());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("unlock");

    let pairs = result.expect("discover");
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].relative_dir, PathBuf::from("kept"));
}

#[test]
fn unreadable_root_is_an_error() {
    let root = tempfile::tempdir().expect("tempdir");
    let missing = root.path().join("missing");
    assert!(discover_pairs(&missing, &excluded()).is_err());
}
