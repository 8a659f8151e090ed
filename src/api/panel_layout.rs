use tracing::{debug, trace};

use crate::core::{Candle, TradeRecord, Viewport};
use crate::error::OverlayResult;
use crate::render::{FontWeight, RectPrimitive, RenderFrame, TextBlockPrimitive, TextPrimitive};

use super::LayoutStyle;
use super::geometry::{
    CONFLUENCE_LEADING_FACTOR, CONTEXT_ROW_LINE_COUNT, CONTEXT_ROW_TRAILING_FACTOR,
    REMAINING_LEADING_FACTOR, RowFlow, TRADE_LEADING_FACTOR, estimate_text_width_px,
    imbalance_row_height_px, line_height_px, panel_height_px, trade_panel_height_px,
};
use super::panel_builders::{
    PanelOutput, PanelSlot, build_candle_panel, build_imbalance_panel,
    build_market_structure_panel, build_order_volume_panel, build_remaining_details,
    build_trade_panel,
};

pub const TRADE_SETUP_HEADER: &str = "Trade Setup Details";
pub const ZONE_IMBALANCES_HEADER: &str = "Zone Imbalances";
pub const CONFLUENCE_HEADER: &str = "Lower Timeframe Confluence";
pub const PROSPECTIVE_TRADE_HEADER: &str = "Prospective Trade";

/// Result of one layout pass: the drawing commands and the canvas that holds
/// them with margins on every side.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelLayout {
    pub frame: RenderFrame,
    pub width: f64,
    pub height: f64,
}

impl PanelLayout {
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.frame.viewport
    }
}

/// Accumulates commands while a vertical cursor walks down the sections.
struct VerticalFlow<'a> {
    style: &'a LayoutStyle,
    left: f64,
    cursor_y: f64,
    furthest_right: f64,
    rects: Vec<RectPrimitive>,
    texts: Vec<TextPrimitive>,
    text_blocks: Vec<TextBlockPrimitive>,
}

impl<'a> VerticalFlow<'a> {
    fn new(style: &'a LayoutStyle) -> Self {
        Self {
            style,
            left: style.padding_px,
            cursor_y: style.padding_px,
            furthest_right: style.padding_px,
            rects: Vec::new(),
            texts: Vec::new(),
            text_blocks: Vec::new(),
        }
    }

    fn advance(&mut self, section: &str, height: f64) {
        self.cursor_y += height;
        trace!(section, height, cursor_y = self.cursor_y, "advance layout cursor");
    }

    fn section_header(&mut self, text: &str) {
        let font_size = self.style.header_font_size_px;
        let header =
            TextPrimitive::new(text, self.left, self.cursor_y, font_size, self.style.text_color)
                .bold();
        self.furthest_right = self
            .furthest_right
            .max(self.left + estimate_text_width_px(text, font_size, FontWeight::Bold));
        self.texts.push(header);
        self.advance(text, line_height_px(font_size));
    }

    fn new_row(&self) -> RowFlow {
        RowFlow::new(self.left, self.style.table_gap_px)
    }

    fn emit(&mut self, row: &mut RowFlow, panel: PanelOutput) {
        if panel.is_empty() {
            return;
        }
        row.place(panel.width);
        self.rects.extend(panel.rects);
        self.texts.extend(panel.texts);
    }

    /// Closes a row: its panels count toward the canvas width and, when it
    /// emitted anything, the cursor moves past it.
    fn finish_row(&mut self, section: &str, row: &RowFlow, height: f64) {
        if row.is_empty() {
            return;
        }
        self.furthest_right = self.furthest_right.max(row.furthest_right());
        self.advance(section, height);
    }

    fn finish(self) -> PanelLayout {
        let width = self.furthest_right + self.style.padding_px;
        let height = self.cursor_y + self.style.padding_px + self.style.min_footer_px;
        let mut frame = RenderFrame::new(Viewport::covering(width, height));
        frame.rects = self.rects;
        frame.texts = self.texts;
        frame.text_blocks = self.text_blocks;
        PanelLayout {
            frame,
            width,
            height,
        }
    }
}

/// Lays out every section of `record` top to bottom.
///
/// Sections without data are skipped entirely and take no vertical space,
/// except the zone-imbalances header which is always printed.
pub fn build_panel_layout(record: &TradeRecord, style: &LayoutStyle) -> OverlayResult<PanelLayout> {
    style.validate()?;
    let line_height = line_height_px(style.font_size_px);
    let padding = style.padding_px;
    let structure = record.market_structure_kind();
    let mut flow = VerticalFlow::new(style);

    flow.section_header(TRADE_SETUP_HEADER);

    let context_height = panel_height_px(CONTEXT_ROW_LINE_COUNT, line_height, padding);
    let mut row = flow.new_row();
    let panel = build_market_structure_panel(
        record.market_structure.as_ref(),
        PanelSlot::new(row.next_x(), flow.cursor_y, style.context_panel_width_px, context_height),
        style,
    );
    flow.emit(&mut row, panel);
    let panel = build_order_volume_panel(
        record.order_volume.as_ref(),
        PanelSlot::new(row.next_x(), flow.cursor_y, style.context_panel_width_px, context_height),
        style,
    );
    flow.emit(&mut row, panel);
    let panel = build_candle_panel(
        "Indecision Candle",
        record.indecision_candle.as_ref(),
        PanelSlot::new(row.next_x(), flow.cursor_y, style.candle_panel_width_px, context_height),
        style,
    );
    flow.emit(&mut row, panel);
    flow.finish_row(
        "context",
        &row,
        context_height + CONTEXT_ROW_TRAILING_FACTOR * padding,
    );

    flow.section_header(ZONE_IMBALANCES_HEADER);
    let max_rows = record
        .imbalances
        .iter()
        .map(|zone| zone.row_count())
        .max()
        .unwrap_or(0);
    let imbalance_height = imbalance_row_height_px(max_rows, line_height, padding);
    let mut row = flow.new_row();
    for zone in &record.imbalances {
        let slot = PanelSlot::new(
            row.next_x(),
            flow.cursor_y,
            style.imbalance_panel_width_px,
            imbalance_height,
        );
        let panel = build_imbalance_panel(zone, structure, slot, style);
        flow.emit(&mut row, panel);
    }
    flow.finish_row("imbalances", &row, imbalance_height);

    if !record.confluence.is_empty() {
        flow.advance("confluence margin", CONFLUENCE_LEADING_FACTOR * padding);
        flow.section_header(CONFLUENCE_HEADER);
        let candle_height = panel_height_px(1 + Candle::FIELD_COUNT, line_height, padding);
        let mut row = flow.new_row();
        for (timeframe, candle) in &record.confluence {
            let slot = PanelSlot::new(
                row.next_x(),
                flow.cursor_y,
                style.candle_panel_width_px,
                candle_height,
            );
            let panel = build_candle_panel(&timeframe.panel_title(), Some(candle), slot, style);
            flow.emit(&mut row, panel);
        }
        flow.finish_row("confluence", &row, candle_height);
    }

    if let Some(lines) = record.limit_order.as_ref().and_then(|order| order.trade_lines()) {
        flow.advance("trade margin", TRADE_LEADING_FACTOR * padding);
        flow.section_header(PROSPECTIVE_TRADE_HEADER);
        let trade_height = trade_panel_height_px(lines.len(), line_height, padding);
        let mut row = flow.new_row();
        let slot = PanelSlot::new(
            row.next_x(),
            flow.cursor_y,
            style.trade_panel_width_px,
            trade_height,
        );
        let panel = build_trade_panel(&lines, slot, style);
        flow.emit(&mut row, panel);
        flow.finish_row("trade", &row, trade_height);
    }

    let remaining_json = record.remaining_details_json()?;
    let remaining_y = flow.cursor_y + REMAINING_LEADING_FACTOR * padding;
    if let Some(details) =
        build_remaining_details(remaining_json.as_deref(), flow.left, remaining_y, style)
    {
        flow.advance("remaining margin", REMAINING_LEADING_FACTOR * padding);
        flow.furthest_right = flow.furthest_right.max(flow.left + details.width);
        flow.texts.push(details.header);
        flow.text_blocks.push(details.block);
        flow.advance("remaining details", details.height);
    }

    let layout = flow.finish();
    debug!(
        width = layout.width,
        height = layout.height,
        rects = layout.frame.rects.len(),
        texts = layout.frame.texts.len(),
        "panel layout built"
    );
    Ok(layout)
}
