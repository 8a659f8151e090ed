use cairo::{Context, Format, ImageSurface};
use pango::{FontDescription, Weight};
use std::f64::consts::{FRAC_PI_2, PI};

use crate::error::{OverlayError, OverlayResult};
use crate::render::{Color, FontWeight, RectPrimitive, RenderFrame, Renderer};

const FONT_FAMILY: &str = "Sans";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub rects_drawn: usize,
    pub texts_drawn: usize,
    pub text_block_lines_drawn: usize,
}

/// Renderers that can draw into a Cairo context they do not own, such as the
/// compositor canvas.
pub trait CairoContextRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> OverlayResult<()>;
}

/// Cairo + Pango + PangoCairo renderer backend.
///
/// `Renderer::render` clears the owned image surface and draws the frame on
/// it. `CairoContextRenderer` draws primitives only, leaving the background
/// to whoever owns the context.
#[derive(Debug)]
pub struct CairoRenderer {
    surface: ImageSurface,
    clear_color: Color,
    last_stats: CairoRenderStats,
}

impl CairoRenderer {
    pub fn new(width: i32, height: i32) -> OverlayResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(OverlayError::InvalidData(
                "cairo surface size must be > 0".to_owned(),
            ));
        }

        let surface = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| map_backend_error("failed to create cairo surface", err))?;
        Ok(Self {
            surface,
            clear_color: Color::rgb(1.0, 1.0, 1.0),
            last_stats: CairoRenderStats::default(),
        })
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        "cairo+pango+pangocairo"
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    #[must_use]
    pub fn into_surface(self) -> ImageSurface {
        self.surface
    }

    #[must_use]
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: Color) -> OverlayResult<()> {
        color.validate()?;
        self.clear_color = color;
        Ok(())
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    /// Logical pixel size of `text` as Pango lays it out for drawing.
    pub fn text_extents_px(
        &self,
        text: &str,
        font_size_px: f64,
        weight: FontWeight,
    ) -> OverlayResult<(f64, f64)> {
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        let layout = text_layout(&context, text, font_size_px, weight);
        let (width, height) = layout.pixel_size();
        Ok((f64::from(width), f64::from(height)))
    }

    /// Encodes the owned surface as PNG bytes.
    pub fn encode_png(&self) -> OverlayResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.surface
            .write_to_png(&mut bytes)
            .map_err(|err| OverlayError::Backend(format!("failed to encode png: {err}")))?;
        Ok(bytes)
    }

    fn draw_primitives(&mut self, context: &Context, frame: &RenderFrame) -> OverlayResult<()> {
        frame.validate()?;
        let mut stats = CairoRenderStats::default();

        for rect in &frame.rects {
            append_rect_path(context, *rect);
            apply_color(context, rect.fill_color);
            if rect.border_width > 0.0 {
                context
                    .fill_preserve()
                    .map_err(|err| map_backend_error("failed to fill rectangle", err))?;
                apply_color(context, rect.border_color);
                context.set_line_width(rect.border_width);
                context
                    .stroke()
                    .map_err(|err| map_backend_error("failed to stroke rectangle border", err))?;
            } else {
                context
                    .fill()
                    .map_err(|err| map_backend_error("failed to fill rectangle", err))?;
            }
            stats.rects_drawn += 1;
        }

        for text in &frame.texts {
            if !text.text.is_empty() {
                show_text(
                    context,
                    &text.text,
                    text.x,
                    text.y,
                    text.font_size_px,
                    text.weight,
                    text.color,
                );
            }
            stats.texts_drawn += 1;
        }

        for block in &frame.text_blocks {
            for (index, line) in block.lines.iter().enumerate() {
                let y = block.y + index as f64 * block.line_height_px;
                show_text(
                    context,
                    line,
                    block.x,
                    y,
                    block.font_size_px,
                    FontWeight::Regular,
                    block.color,
                );
                stats.text_block_lines_drawn += 1;
            }
        }

        self.last_stats = stats;
        Ok(())
    }
}

/// Pango layout for one run; the size is absolute so it matches the pixel
/// geometry of the layout engine rather than points at the surface dpi.
fn text_layout(
    context: &Context,
    text: &str,
    font_size_px: f64,
    weight: FontWeight,
) -> pango::Layout {
    let layout = pangocairo::functions::create_layout(context);
    let mut font_description = FontDescription::new();
    font_description.set_family(FONT_FAMILY);
    font_description.set_absolute_size(font_size_px * f64::from(pango::SCALE));
    if weight == FontWeight::Bold {
        font_description.set_weight(Weight::Bold);
    }
    layout.set_font_description(Some(&font_description));
    layout.set_text(text);
    layout
}

impl Renderer for CairoRenderer {
    fn render(&mut self, frame: &RenderFrame) -> OverlayResult<()> {
        self.clear_color.validate()?;
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        apply_color(&context, self.clear_color);
        context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;
        self.draw_primitives(&context, frame)
    }
}

impl CairoContextRenderer for CairoRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> OverlayResult<()> {
        self.draw_primitives(context, frame)
    }
}

fn show_text(
    context: &Context,
    text: &str,
    x: f64,
    y: f64,
    font_size_px: f64,
    weight: FontWeight,
    color: Color,
) {
    let layout = text_layout(context, text, font_size_px, weight);
    apply_color(context, color);
    context.move_to(x, y);
    pangocairo::functions::show_layout(context, &layout);
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn append_rect_path(context: &Context, rect: RectPrimitive) {
    if rect.corner_radius <= 0.0 {
        context.rectangle(rect.x, rect.y, rect.width, rect.height);
        return;
    }

    let radius = rect
        .corner_radius
        .min(rect.width * 0.5)
        .min(rect.height * 0.5);
    let left = rect.x;
    let top = rect.y;
    let right = rect.right();
    let bottom = rect.bottom();

    context.new_sub_path();
    context.arc(right - radius, top + radius, radius, -FRAC_PI_2, 0.0);
    context.arc(right - radius, bottom - radius, radius, 0.0, FRAC_PI_2);
    context.arc(left + radius, bottom - radius, radius, FRAC_PI_2, PI);
    context.arc(left + radius, top + radius, radius, PI, PI + FRAC_PI_2);
    context.close_path();
}

pub(crate) fn map_backend_error(prefix: &str, err: cairo::Error) -> OverlayError {
    OverlayError::Backend(format!("{prefix}: {err}"))
}
