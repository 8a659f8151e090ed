use smallvec::SmallVec;

use crate::core::{Candle, ImbalanceZone, MarketStructure, ScalarValue};
use crate::render::{Color, FontWeight, RectPrimitive, TextBlockPrimitive, TextPrimitive};

use super::LayoutStyle;
use super::geometry::{
    ASK_COLUMN_OFFSET_PX, PANEL_TEXT_INSET_FACTOR, TRADE_PANEL_TEXT_INSET_FACTOR,
    estimate_text_width_px, line_height_px,
};

/// Position and fixed size handed to a panel builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSlot {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PanelSlot {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Drawing commands of one panel plus the horizontal space it claims.
///
/// A panel with no content has no commands and zero width.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelOutput {
    pub rects: SmallVec<[RectPrimitive; 1]>,
    pub texts: Vec<TextPrimitive>,
    /// Emitted width; the right edge is `slot.x + width`.
    pub width: f64,
}

impl PanelOutput {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty() && self.texts.is_empty()
    }
}

/// Text cursor inside a boxed panel.
struct PanelWriter<'a> {
    style: &'a LayoutStyle,
    slot: PanelSlot,
    line_height: f64,
    first_line_y: f64,
    output: PanelOutput,
}

impl<'a> PanelWriter<'a> {
    fn boxed(slot: PanelSlot, inset_factor: f64, style: &'a LayoutStyle) -> Self {
        let rect = RectPrimitive::new(
            slot.x,
            slot.y,
            slot.width.max(0.0),
            slot.height.max(0.0),
            style.panel_background_color,
        )
        .with_corner_radius(style.corner_radius_px);
        let mut output = PanelOutput::empty();
        output.rects.push(rect);
        output.width = slot.width.max(0.0);
        Self {
            style,
            slot,
            line_height: line_height_px(style.font_size_px),
            first_line_y: slot.y + inset_factor * style.padding_px,
            output,
        }
    }

    fn line_y(&self, line: usize) -> f64 {
        self.first_line_y + line as f64 * self.line_height
    }

    fn push(&mut self, line: usize, column_offset: f64, text: String, color: Color, bold: bool) {
        let x = self.slot.x + self.style.padding_px + column_offset;
        let primitive =
            TextPrimitive::new(text, x, self.line_y(line), self.style.font_size_px, color);
        self.output
            .texts
            .push(if bold { primitive.bold() } else { primitive });
    }

    fn text(&mut self, line: usize, column_offset: f64, text: impl Into<String>, color: Color) {
        self.push(line, column_offset, text.into(), color, false);
    }

    fn title(&mut self, line: usize, column_offset: f64, text: impl Into<String>) {
        let color = self.style.text_color;
        self.push(line, column_offset, text.into(), color, true);
    }

    fn finish(self) -> PanelOutput {
        self.output
    }
}

/// Title plus Indecisive / Open / Close / High / Low, one per line.
#[must_use]
pub fn build_candle_panel(
    title: &str,
    candle: Option<&Candle>,
    slot: PanelSlot,
    style: &LayoutStyle,
) -> PanelOutput {
    let Some(candle) = candle else {
        return PanelOutput::empty();
    };
    let mut writer = PanelWriter::boxed(slot, PANEL_TEXT_INSET_FACTOR, style);
    writer.title(0, 0.0, title);
    for (index, line) in candle.field_lines().into_iter().enumerate() {
        writer.text(index + 1, 0.0, line, style.text_color);
    }
    writer.finish()
}

#[must_use]
pub fn build_order_volume_panel(
    volume: Option<&ScalarValue>,
    slot: PanelSlot,
    style: &LayoutStyle,
) -> PanelOutput {
    let Some(volume) = volume else {
        return PanelOutput::empty();
    };
    let mut writer = PanelWriter::boxed(slot, PANEL_TEXT_INSET_FACTOR, style);
    writer.title(0, 0.0, "Order Volume");
    writer.text(1, 0.0, volume.to_string(), style.text_color);
    writer.finish()
}

/// Value line takes the trend color for `BULLISH` / `BEARISH`.
#[must_use]
pub fn build_market_structure_panel(
    value: Option<&ScalarValue>,
    slot: PanelSlot,
    style: &LayoutStyle,
) -> PanelOutput {
    let Some(value) = value else {
        return PanelOutput::empty();
    };
    let color = match MarketStructure::from_scalar(Some(value)) {
        MarketStructure::Bullish => style.bullish_color,
        MarketStructure::Bearish => style.bearish_color,
        MarketStructure::Neutral => style.text_color,
    };
    let mut writer = PanelWriter::boxed(slot, PANEL_TEXT_INSET_FACTOR, style);
    writer.title(0, 0.0, "Market Structure");
    writer.text(1, 0.0, value.to_string(), color);
    writer.finish()
}

/// Row that gets the trend accent for a zone with `row_count` rows.
#[must_use]
pub fn highlighted_imbalance_row(structure: MarketStructure, row_count: usize) -> Option<usize> {
    match structure {
        MarketStructure::Bearish if row_count > 0 => Some(0),
        MarketStructure::Bullish => row_count.checked_sub(1),
        _ => None,
    }
}

/// Two-column Bids/Asks table for one zone.
///
/// `slot.height` is the shared row height, so adjacent tables line up even
/// when their row counts differ.
#[must_use]
pub fn build_imbalance_panel(
    zone: &ImbalanceZone,
    structure: MarketStructure,
    slot: PanelSlot,
    style: &LayoutStyle,
) -> PanelOutput {
    let highlighted = highlighted_imbalance_row(structure, zone.row_count());
    let mut writer = PanelWriter::boxed(slot, PANEL_TEXT_INSET_FACTOR, style);
    writer.title(0, 0.0, zone.label());
    writer.title(1, 0.0, "Bids");
    writer.title(1, ASK_COLUMN_OFFSET_PX, "Asks");

    for row in 0..zone.row_count() {
        let (bid, ask) = zone.row(row);
        let (bid_color, ask_color) = if highlighted == Some(row) {
            (style.bearish_color, style.bullish_color)
        } else {
            (style.text_color, style.text_color)
        };
        let line = row + 2;
        writer.text(line, 0.0, bid, bid_color);
        writer.text(line, ASK_COLUMN_OFFSET_PX, ask, ask_color);
    }
    writer.finish()
}

/// Boxed `Label: value` lines for the prospective trade; the slot height is
/// expected to fit exactly `lines.len()` lines.
#[must_use]
pub fn build_trade_panel(lines: &[String], slot: PanelSlot, style: &LayoutStyle) -> PanelOutput {
    if lines.is_empty() {
        return PanelOutput::empty();
    }
    let mut writer = PanelWriter::boxed(slot, TRADE_PANEL_TEXT_INSET_FACTOR, style);
    for (index, line) in lines.iter().enumerate() {
        writer.text(index, 0.0, line.as_str(), style.text_color);
    }
    writer.finish()
}

/// Unboxed leftover-fields block: a bold header and the JSON text below it.
#[derive(Debug, Clone, PartialEq)]
pub struct RemainingDetailsOutput {
    pub header: TextPrimitive,
    pub block: TextBlockPrimitive,
    pub width: f64,
    pub height: f64,
}

pub const REMAINING_DETAILS_HEADER: &str = "Remaining Details (JSON)";

#[must_use]
pub fn build_remaining_details(
    json: Option<&str>,
    x: f64,
    y: f64,
    style: &LayoutStyle,
) -> Option<RemainingDetailsOutput> {
    let json = json?;
    let line_height = line_height_px(style.font_size_px);
    let lines: Vec<String> = json.lines().map(str::to_owned).collect();
    let width = lines
        .iter()
        .map(|line| estimate_text_width_px(line, style.font_size_px, FontWeight::Regular))
        .fold(
            estimate_text_width_px(REMAINING_DETAILS_HEADER, style.font_size_px, FontWeight::Bold),
            f64::max,
        );

    let header = TextPrimitive::new(
        REMAINING_DETAILS_HEADER,
        x,
        y,
        style.font_size_px,
        style.text_color,
    )
    .bold();
    let block = TextBlockPrimitive::new(
        lines,
        x,
        y + line_height,
        style.font_size_px,
        line_height,
        style.text_color,
    );
    let height = line_height + block.height();
    Some(RemainingDetailsOutput {
        header,
        block,
        width,
        height,
    })
}
