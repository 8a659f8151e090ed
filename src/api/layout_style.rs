use serde::{Deserialize, Serialize};

use crate::error::{OverlayError, OverlayResult};
use crate::render::Color;

/// Styling and sizing contract injected into the layout engine.
///
/// Serializable so the binary can load overrides from a JSON file; any field
/// the file leaves out keeps its default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutStyle {
    /// Canvas fill behind both the chart and the panels.
    pub background_color: Color,
    pub text_color: Color,
    pub panel_background_color: Color,
    /// Bearish market-structure value and highlighted bid cells.
    pub bearish_color: Color,
    /// Bullish market-structure value and highlighted ask cells.
    pub bullish_color: Color,
    pub font_size_px: f64,
    pub header_font_size_px: f64,
    pub padding_px: f64,
    /// Horizontal gap between adjacent panels in a row.
    pub table_gap_px: f64,
    /// Market structure and order volume panels.
    pub context_panel_width_px: f64,
    pub candle_panel_width_px: f64,
    pub imbalance_panel_width_px: f64,
    pub trade_panel_width_px: f64,
    pub corner_radius_px: f64,
    /// Extra space below the last section.
    pub min_footer_px: f64,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            background_color: Color::rgb8(0x1e, 0x22, 0x2d),
            text_color: Color::rgb8(0xd1, 0xd4, 0xdc),
            panel_background_color: Color::rgb8(0x2a, 0x2e, 0x39),
            bearish_color: Color::rgb8(0xef, 0x53, 0x50),
            bullish_color: Color::rgb8(0x26, 0xa6, 0x9a),
            font_size_px: 14.0,
            header_font_size_px: 18.0,
            padding_px: 10.0,
            table_gap_px: 20.0,
            context_panel_width_px: 200.0,
            candle_panel_width_px: 160.0,
            imbalance_panel_width_px: 220.0,
            trade_panel_width_px: 260.0,
            corner_radius_px: 8.0,
            min_footer_px: 40.0,
        }
    }
}

impl LayoutStyle {
    #[must_use]
    pub fn with_font_sizes(mut self, font_size_px: f64, header_font_size_px: f64) -> Self {
        self.font_size_px = font_size_px;
        self.header_font_size_px = header_font_size_px;
        self
    }

    #[must_use]
    pub fn with_padding(mut self, padding_px: f64) -> Self {
        self.padding_px = padding_px;
        self
    }

    #[must_use]
    pub fn with_table_gap(mut self, table_gap_px: f64) -> Self {
        self.table_gap_px = table_gap_px;
        self
    }

    /// Sets the fixed panel widths per kind: context, candle, imbalance, trade.
    #[must_use]
    pub fn with_panel_widths(
        mut self,
        context_panel_width_px: f64,
        candle_panel_width_px: f64,
        imbalance_panel_width_px: f64,
        trade_panel_width_px: f64,
    ) -> Self {
        self.context_panel_width_px = context_panel_width_px;
        self.candle_panel_width_px = candle_panel_width_px;
        self.imbalance_panel_width_px = imbalance_panel_width_px;
        self.trade_panel_width_px = trade_panel_width_px;
        self
    }

    #[must_use]
    pub fn with_trend_colors(mut self, bearish_color: Color, bullish_color: Color) -> Self {
        self.bearish_color = bearish_color;
        self.bullish_color = bullish_color;
        self
    }

    #[must_use]
    pub fn with_min_footer(mut self, min_footer_px: f64) -> Self {
        self.min_footer_px = min_footer_px;
        self
    }

    pub fn validate(&self) -> OverlayResult<()> {
        for color in [
            self.background_color,
            self.text_color,
            self.panel_background_color,
            self.bearish_color,
            self.bullish_color,
        ] {
            color.validate()?;
        }
        for (name, value) in [
            ("font_size_px", self.font_size_px),
            ("header_font_size_px", self.header_font_size_px),
            ("context_panel_width_px", self.context_panel_width_px),
            ("candle_panel_width_px", self.candle_panel_width_px),
            ("imbalance_panel_width_px", self.imbalance_panel_width_px),
            ("trade_panel_width_px", self.trade_panel_width_px),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(OverlayError::InvalidData(format!(
                    "style `{name}` must be finite and > 0"
                )));
            }
        }
        for (name, value) in [
            ("padding_px", self.padding_px),
            ("table_gap_px", self.table_gap_px),
            ("corner_radius_px", self.corner_radius_px),
            ("min_footer_px", self.min_footer_px),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(OverlayError::InvalidData(format!(
                    "style `{name}` must be finite and >= 0"
                )));
            }
        }
        Ok(())
    }

    /// Serializes the style to pretty JSON for config files.
    pub fn to_json_pretty(&self) -> OverlayResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| OverlayError::InvalidData(format!("failed to serialize style: {e}")))
    }

    /// Parses and validates a style from JSON.
    pub fn from_json_str(input: &str) -> OverlayResult<Self> {
        let style: Self = serde_json::from_str(input)
            .map_err(|e| OverlayError::InvalidData(format!("failed to parse style: {e}")))?;
        style.validate()?;
        Ok(style)
    }
}
