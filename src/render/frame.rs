use crate::core::Viewport;
use crate::error::{OverlayError, OverlayResult};
use crate::render::{RectPrimitive, TextBlockPrimitive, TextPrimitive};

/// Backend-agnostic scene for one panel layout.
///
/// Rasterizers draw `rects` first, then `texts`, then `text_blocks`, so panel
/// backgrounds always sit beneath their content.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub rects: Vec<RectPrimitive>,
    pub texts: Vec<TextPrimitive>,
    pub text_blocks: Vec<TextBlockPrimitive>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            rects: Vec::new(),
            texts: Vec::new(),
            text_blocks: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: TextPrimitive) -> Self {
        self.texts.push(text);
        self
    }

    #[must_use]
    pub fn with_rect(mut self, rect: RectPrimitive) -> Self {
        self.rects.push(rect);
        self
    }

    #[must_use]
    pub fn with_text_block(mut self, block: TextBlockPrimitive) -> Self {
        self.text_blocks.push(block);
        self
    }

    /// Text runs matching `text` exactly, in emission order.
    pub fn texts_matching<'a, 't>(&'a self, text: &'t str) -> impl Iterator<Item = &'a TextPrimitive> + use<'a, 't> {
        self.texts.iter().filter(move |primitive| primitive.text == text)
    }

    pub fn validate(&self) -> OverlayResult<()> {
        if !self.viewport.is_valid() {
            return Err(OverlayError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }

        for rect in &self.rects {
            rect.validate()?;
        }
        for text in &self.texts {
            text.validate()?;
        }
        for block in &self.text_blocks {
            block.validate()?;
        }

        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty() && self.texts.is_empty() && self.text_blocks.is_empty()
    }
}
