mod frame;
mod null_renderer;
mod primitives;

pub use frame::RenderFrame;
pub use null_renderer::NullRenderer;
pub use primitives::{Color, FontWeight, RectPrimitive, TextBlockPrimitive, TextPrimitive};

use crate::error::OverlayResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized `RenderFrame`, so drawing code never
/// sees record data or layout rules.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> OverlayResult<()>;
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoContextRenderer, CairoRenderStats, CairoRenderer};
#[cfg(feature = "cairo-backend")]
pub(crate) use cairo_backend::map_backend_error;
