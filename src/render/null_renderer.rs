use crate::error::OverlayResult;
use crate::render::{RenderFrame, Renderer};

/// No-op renderer used by tests and headless layout runs.
///
/// Frames are still validated so invalid geometry surfaces without a
/// rasterizer.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub last_rect_count: usize,
    pub last_text_count: usize,
    pub last_text_block_count: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> OverlayResult<()> {
        frame.validate()?;
        self.last_rect_count = frame.rects.len();
        self.last_text_count = frame.texts.len();
        self.last_text_block_count = frame.text_blocks.len();
        Ok(())
    }
}
