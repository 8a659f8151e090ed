use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::api::{LayoutStyle, build_panel_layout};
use crate::compositor::{OverlayCompositor, decode_png};
use crate::core::TradeRecord;
use crate::error::{OverlayError, OverlayResult};

use super::{PipelineConfig, SourcePair, discover_pairs, prepare_output_dir};

/// A pair that could not be annotated, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairFailure {
    pub image: PathBuf,
    pub reason: String,
}

/// Outcome of one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub written: Vec<PathBuf>,
    pub failed: Vec<PairFailure>,
}

impl RunSummary {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.written.len()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.written.len() + self.failed.len()
    }
}

/// Clears the output directory, discovers pairs and annotates them one at a
/// time.
///
/// Per-pair failures are logged and collected; only output preparation and
/// discovery errors abort the run.
pub fn run_pipeline(config: &PipelineConfig) -> OverlayResult<RunSummary> {
    let output_root = config.output_root();
    prepare_output_dir(&output_root, &config.reserved_output_entry)?;
    let pairs = discover_pairs(&config.source_root, &config.effective_excluded_dirs())?;
    info!(
        root = %config.source_root.display(),
        pairs = pairs.len(),
        "discovered chart/record pairs"
    );

    let compositor = OverlayCompositor::from_style(&config.style, config.compositor_margin_px);
    let mut summary = RunSummary::default();
    for pair in &pairs {
        match process_pair(pair, &output_root, &config.style, &compositor) {
            Ok(output) => {
                info!(
                    image = %pair.image.display(),
                    output = %output.display(),
                    "annotated chart"
                );
                summary.written.push(output);
            }
            Err(err) => {
                error!(image = %pair.image.display(), error = %err, "failed to annotate chart");
                summary.failed.push(PairFailure {
                    image: pair.image.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    info!(
        succeeded = summary.succeeded(),
        failed = summary.failed.len(),
        "run complete"
    );
    Ok(summary)
}

/// Annotates one pair and returns the written file.
///
/// The PNG is encoded in memory first, so nothing is written for a pair
/// that fails part way.
pub fn process_pair(
    pair: &SourcePair,
    output_root: &Path,
    style: &LayoutStyle,
    compositor: &OverlayCompositor,
) -> OverlayResult<PathBuf> {
    let raw = fs::read_to_string(&pair.record).map_err(|err| OverlayError::io(&pair.record, err))?;
    let record = TradeRecord::from_json_str(&raw)?;
    let layout = build_panel_layout(&record, style)?;

    let chart_bytes = fs::read(&pair.image).map_err(|err| OverlayError::io(&pair.image, err))?;
    let chart = decode_png(&chart_bytes)?;
    drop(chart_bytes);

    let png = compositor.compose(&chart, &layout)?.encode_png()?;
    let output_path = pair.output_path(output_root);
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|err| OverlayError::io(parent, err))?;
    }
    fs::write(&output_path, png).map_err(|err| OverlayError::io(&output_path, err))?;
    Ok(output_path)
}
