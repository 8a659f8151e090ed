#![cfg(feature = "cairo-backend")]

use std::fs::{self, File};
use std::path::Path;

use cairo::{Context, Format, ImageSurface};
use trade_overlay::compositor::decode_png;
use trade_overlay::pipeline::{PipelineConfig, run_pipeline};

fn write_chart(path: &Path, width: i32, height: i32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    let surface = ImageSurface::create(Format::ARgb32, width, height).expect("surface");
    {
        let context = Context::new(&surface).expect("context");
        context.set_source_rgb(0.2, 0.4, 0.6);
        context.paint().expect("paint");
    }
    let mut file = File::create(path).expect("create png");
    surface.write_to_png(&mut file).expect("write png");
}

#[test]
fn run_pipeline_annotates_pairs_and_isolates_failures() {
    let root = tempfile::tempdir().expect("tempdir");
    write_chart(&root.path().join("EURUSD 1.png"), 120, 80);
    fs::write(
        root.path().join("EURUSD_1.json"),
        r#"{"currentMarketStructure": "BEARISH", "orderVolume": 900, "extra": 1}"#,
    )
    .expect("record");
    write_chart(&root.path().join("nested/GBPUSD.png"), 90, 40);
    fs::write(root.path().join("nested/GBPUSD.json"), "\u{feff}{}").expect("record");
    write_chart(&root.path().join("broken.png"), 50, 50);
    fs::write(root.path().join("broken.json"), "{not json").expect("record");
    write_chart(&root.path().join("orphan.png"), 50, 50);

    let output = root.path().join("output");
    fs::create_dir_all(output.join(".archive")).expect("archive");
    fs::write(output.join(".archive/keep.png"), b"old").expect("archived");
    fs::write(output.join("stale.png"), b"stale").expect("stale");

    let summary = run_pipeline(&PipelineConfig::new(root.path())).expect("run");

    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.total(), 3);
    assert_eq!(summary.failed[0].image, root.path().join("broken.png"));

    let annotated = output.join("EURUSD-1.png");
    assert!(annotated.is_file());
    assert!(output.join("nested/GBPUSD.png").is_file());
    assert!(!output.join("broken.png").exists(), "failed pair writes nothing");
    assert!(!output.join("orphan.png").exists());
    assert!(!output.join("stale.png").exists());
    assert!(output.join(".archive/keep.png").exists());

    let decoded = decode_png(&fs::read(&annotated).expect("read output")).expect("decode");
    assert!(decoded.width() > 120 + 20);
    assert!(decoded.height() >= 80 + 2 * 20);
}

#[test]
fn second_run_does_not_pick_up_its_own_output() {
    let root = tempfile::tempdir().expect("tempdir");
    write_chart(&root.path().join("setup.png"), 40, 40);
    fs::write(root.path().join("setup.json"), "{}").expect("record");

    let config = PipelineConfig::new(root.path());
    let first = run_pipeline(&config).expect("first run");
    let second = run_pipeline(&config).expect("second run");
    assert_eq!(first.written, second.written);
    assert_eq!(second.total(), 1);
}

#[test]
fn compositor_margin_setting_sizes_the_output() {
    let root = tempfile::tempdir().expect("tempdir");
    write_chart(&root.path().join("setup.png"), 40, 300);
    fs::write(root.path().join("setup.json"), "{}").expect("record");

    let config = PipelineConfig::new(root.path()).with_compositor_margin(5);
    assert_eq!(config.compositor_margin_px, 5);
    let summary = run_pipeline(&config).expect("run");
    assert_eq!(summary.succeeded(), 1);

    let decoded = decode_png(&fs::read(&summary.written[0]).expect("read output")).expect("decode");
    assert_eq!(decoded.height(), 300 + 2 * 5);
}
