//! Merges a chart image and a rasterized panel layout into one PNG canvas.

use std::io::Cursor;

use cairo::{Context, ImageSurface};
use tracing::debug;

use crate::api::{LayoutStyle, PanelLayout};
use crate::core::Viewport;
use crate::error::{OverlayError, OverlayResult};
use crate::render::{
    CairoContextRenderer, CairoRenderer, Color, RenderFrame, Renderer, map_backend_error,
};

/// Chart on the left inset by `margin_px`, panel layout abutting it on the
/// right, everything on a solid background.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayCompositor {
    pub margin_px: u32,
    pub background_color: Color,
}

impl OverlayCompositor {
    #[must_use]
    pub fn new(margin_px: u32, background_color: Color) -> Self {
        Self {
            margin_px,
            background_color,
        }
    }

    #[must_use]
    pub fn from_style(style: &LayoutStyle, margin_px: u32) -> Self {
        Self::new(margin_px, style.background_color)
    }

    /// `chart.w + layout.w + margin` by `max(chart.h + 2 * margin, layout.h)`.
    #[must_use]
    pub fn canvas_size(&self, chart: Viewport, layout: Viewport) -> Viewport {
        let width = chart
            .width
            .saturating_add(layout.width)
            .saturating_add(self.margin_px);
        let height = chart
            .height
            .saturating_add(self.margin_px.saturating_mul(2))
            .max(layout.height);
        Viewport::new(width, height)
    }

    /// Draws the composite and returns the renderer owning the finished
    /// surface.
    pub fn compose(&self, chart: &ImageSurface, layout: &PanelLayout) -> OverlayResult<CairoRenderer> {
        let chart_viewport = surface_viewport(chart)?;
        let canvas = self.canvas_size(chart_viewport, layout.viewport());
        let canvas_width = to_cairo_dimension(canvas.width, "canvas width")?;
        let canvas_height = to_cairo_dimension(canvas.height, "canvas height")?;

        let mut renderer = CairoRenderer::new(canvas_width, canvas_height)?;
        renderer.set_clear_color(self.background_color)?;
        renderer.render(&RenderFrame::new(canvas))?;

        let margin = f64::from(self.margin_px);
        let context = Context::new(renderer.surface())
            .map_err(|err| map_backend_error("failed to create compositor context", err))?;
        context
            .set_source_surface(chart, margin, margin)
            .map_err(|err| map_backend_error("failed to set chart source", err))?;
        context
            .paint()
            .map_err(|err| map_backend_error("failed to paint chart", err))?;
        context.translate(margin + f64::from(chart_viewport.width), 0.0);
        renderer.render_on_cairo_context(&context, &layout.frame)?;
        drop(context);
        renderer.surface().flush();

        debug!(
            width = canvas.width,
            height = canvas.height,
            chart_width = chart_viewport.width,
            chart_height = chart_viewport.height,
            "composited overlay"
        );
        Ok(renderer)
    }
}

/// Decodes PNG bytes into a Cairo image surface, rejecting empty images.
pub fn decode_png(bytes: &[u8]) -> OverlayResult<ImageSurface> {
    let surface = ImageSurface::create_from_png(&mut Cursor::new(bytes))
        .map_err(|err| OverlayError::Backend(format!("failed to decode png: {err}")))?;
    surface_viewport(&surface)?;
    Ok(surface)
}

fn surface_viewport(surface: &ImageSurface) -> OverlayResult<Viewport> {
    let width = u32::try_from(surface.width()).unwrap_or(0);
    let height = u32::try_from(surface.height()).unwrap_or(0);
    let viewport = Viewport::new(width, height);
    if !viewport.is_valid() {
        return Err(OverlayError::InvalidViewport { width, height });
    }
    Ok(viewport)
}

fn to_cairo_dimension(value: u32, name: &str) -> OverlayResult<i32> {
    i32::try_from(value).map_err(|_| OverlayError::InvalidData(format!("{name} overflows i32")))
}
