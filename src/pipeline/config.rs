use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::api::LayoutStyle;
use crate::error::{OverlayError, OverlayResult};

/// Environment variable naming a JSON file with `LayoutStyle` overrides.
pub const STYLE_PATH_ENV: &str = "TRADE_OVERLAY_STYLE";

pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_RESERVED_OUTPUT_ENTRY: &str = ".archive";
pub const DEFAULT_EXCLUDED_DIRS: [&str; 4] = ["output", "target", "node_modules", ".git"];
/// Margin around the chart and between the chart and the panels.
pub const DEFAULT_COMPOSITOR_MARGIN_PX: u32 = 20;

/// Settings for one batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub source_root: PathBuf,
    /// Output directory, relative to `source_root` unless absolute.
    pub output_dir: PathBuf,
    /// Entry inside the output directory that survives clearing.
    pub reserved_output_entry: String,
    pub excluded_dirs: Vec<String>,
    pub compositor_margin_px: u32,
    pub style: LayoutStyle,
}

impl PipelineConfig {
    #[must_use]
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            reserved_output_entry: DEFAULT_RESERVED_OUTPUT_ENTRY.to_owned(),
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.map(str::to_owned).to_vec(),
            compositor_margin_px: DEFAULT_COMPOSITOR_MARGIN_PX,
            style: LayoutStyle::default(),
        }
    }

    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: LayoutStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_compositor_margin(mut self, margin_px: u32) -> Self {
        self.compositor_margin_px = margin_px;
        self
    }

    /// Loads the style override named by `TRADE_OVERLAY_STYLE`, if set.
    pub fn with_style_from_env(self) -> OverlayResult<Self> {
        match std::env::var_os(STYLE_PATH_ENV) {
            Some(path) => self.with_style_file(Path::new(&path)),
            None => Ok(self),
        }
    }

    pub fn with_style_file(self, path: &Path) -> OverlayResult<Self> {
        let raw = fs::read_to_string(path).map_err(|err| OverlayError::io(path, err))?;
        let style = LayoutStyle::from_json_str(&raw)?;
        info!(path = %path.display(), "loaded layout style override");
        Ok(self.with_style(style))
    }

    #[must_use]
    pub fn output_root(&self) -> PathBuf {
        self.source_root.join(&self.output_dir)
    }

    /// Excluded names plus the output directory's own name, so generated
    /// images are never paired again.
    #[must_use]
    pub fn effective_excluded_dirs(&self) -> Vec<String> {
        let mut excluded = self.excluded_dirs.clone();
        if let Some(name) = self.output_dir.file_name().and_then(|name| name.to_str()) {
            if !excluded.iter().any(|existing| existing == name) {
                excluded.push(name.to_owned());
            }
        }
        excluded
    }
}
