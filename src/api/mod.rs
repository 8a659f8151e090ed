//! Panel layout engine: turns a `TradeRecord` into positioned drawing
//! commands and the canvas size that contains them.

mod geometry;
mod layout_style;
mod panel_builders;
mod panel_layout;

pub use geometry::{
    ASK_COLUMN_OFFSET_PX, CONTEXT_ROW_LINE_COUNT, IMBALANCE_HEADER_LINE_COUNT,
    LINE_HEIGHT_FACTOR, estimate_text_width_px, imbalance_row_height_px, line_height_px,
    panel_height_px, trade_panel_height_px,
};
pub use layout_style::LayoutStyle;
pub use panel_builders::{
    PanelOutput, PanelSlot, REMAINING_DETAILS_HEADER, RemainingDetailsOutput, build_candle_panel,
    build_imbalance_panel, build_market_structure_panel, build_order_volume_panel,
    build_remaining_details, build_trade_panel, highlighted_imbalance_row,
};
pub use panel_layout::{
    CONFLUENCE_HEADER, PROSPECTIVE_TRADE_HEADER, PanelLayout, TRADE_SETUP_HEADER,
    ZONE_IMBALANCES_HEADER, build_panel_layout,
};
