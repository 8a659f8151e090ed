//! Batch processing around the layout engine: pairing chart images with
//! their records, preparing the output tree and running pairs sequentially.

mod config;
mod discovery;
mod output;
#[cfg(feature = "cairo-backend")]
mod runner;

pub use config::{
    DEFAULT_COMPOSITOR_MARGIN_PX, DEFAULT_EXCLUDED_DIRS, DEFAULT_OUTPUT_DIR,
    DEFAULT_RESERVED_OUTPUT_ENTRY, PipelineConfig, STYLE_PATH_ENV,
};
pub use discovery::{SourcePair, discover_pairs, normalize_stem};
pub use output::prepare_output_dir;
#[cfg(feature = "cairo-backend")]
pub use runner::{PairFailure, RunSummary, process_pair, run_pipeline};
