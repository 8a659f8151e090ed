#[cfg(feature = "cairo-backend")]
use trade_overlay::pipeline::{PipelineConfig, run_pipeline};

#[cfg(feature = "cairo-backend")]
fn main() {
    let _ = trade_overlay::telemetry::init_default_tracing();
    if let Err(err) = run() {
        tracing::error!(error = %err, "run aborted");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cairo-backend"))]
fn main() {
    eprintln!("this tool requires feature `cairo-backend`");
    std::process::exit(1);
}

/// Annotates every pair under the working directory. Failed pairs are
/// reported in the summary and do not fail the run.
#[cfg(feature = "cairo-backend")]
fn run() -> trade_overlay::OverlayResult<()> {
    let root = std::env::current_dir().map_err(|source| trade_overlay::OverlayError::Io {
        path: ".".into(),
        source,
    })?;
    let config = PipelineConfig::new(root).with_style_from_env()?;
    let summary = run_pipeline(&config)?;
    println!(
        "done: {} of {} pair(s) annotated, {} failed",
        summary.succeeded(),
        summary.total(),
        summary.failed.len()
    );
    Ok(())
}
