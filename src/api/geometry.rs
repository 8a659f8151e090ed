use crate::render::FontWeight;

/// Line height as a multiple of font size, shared by every text line.
pub const LINE_HEIGHT_FACTOR: f64 = 1.4;

/// The contextual row is sized for this many lines whatever it holds.
pub const CONTEXT_ROW_LINE_COUNT: usize = 6;

/// Title line plus the Bids/Asks header line of an imbalance table.
pub const IMBALANCE_HEADER_LINE_COUNT: usize = 2;

/// Ask column offset from the bid column, added to the panel padding.
pub const ASK_COLUMN_OFFSET_PX: f64 = 80.0;

/// Top inset of the first text line in a panel, relative to padding.
pub(crate) const PANEL_TEXT_INSET_FACTOR: f64 = 0.75;
pub(crate) const TRADE_PANEL_TEXT_INSET_FACTOR: f64 = 0.5;

/// Vertical margins between sections, relative to padding.
pub(crate) const CONTEXT_ROW_TRAILING_FACTOR: f64 = 1.0;
pub(crate) const CONFLUENCE_LEADING_FACTOR: f64 = 1.5;
pub(crate) const TRADE_LEADING_FACTOR: f64 = 1.0;
pub(crate) const REMAINING_LEADING_FACTOR: f64 = 1.0;

#[must_use]
pub fn line_height_px(font_size_px: f64) -> f64 {
    font_size_px * LINE_HEIGHT_FACTOR
}

/// Height of a boxed panel holding `lines` lines, title included.
#[must_use]
pub fn panel_height_px(lines: usize, line_height_px: f64, padding_px: f64) -> f64 {
    lines as f64 * line_height_px + 1.5 * padding_px
}

/// The trade panel has no title line and a tighter vertical padding.
#[must_use]
pub fn trade_panel_height_px(lines: usize, line_height_px: f64, padding_px: f64) -> f64 {
    lines as f64 * line_height_px + padding_px
}

/// Uniform height for a row of imbalance tables: the tallest table wins.
#[must_use]
pub fn imbalance_row_height_px(max_rows: usize, line_height_px: f64, padding_px: f64) -> f64 {
    panel_height_px(
        max_rows + IMBALANCE_HEADER_LINE_COUNT,
        line_height_px,
        padding_px,
    )
}

/// Bold runs are this much wider than regular ones.
const BOLD_WIDTH_FACTOR: f64 = 1.15;

/// Upper bound for the rendered width of one text run.
///
/// Per-glyph factors are in em and sit at or above common sans faces, so a
/// canvas sized from this estimate does not clip the drawn text. The result
/// does not depend on installed fonts.
#[must_use]
pub fn estimate_text_width_px(text: &str, font_size_px: f64, weight: FontWeight) -> f64 {
    let units = text.chars().fold(0.0, |acc, ch| {
        acc + match ch {
            '0'..='9' => 0.64,
            '.' | ',' | ':' | ';' => 0.36,
            ' ' => 0.33,
            '-' => 0.42,
            '(' | ')' | '[' | ']' => 0.4,
            '"' | '\'' => 0.46,
            '{' | '}' => 0.64,
            '+' | '=' => 0.84,
            '%' => 1.0,
            'a'..='z' => 0.62,
            'A'..='Z' => 0.78,
            _ => 0.8,
        }
    });
    let weight_factor = match weight {
        FontWeight::Regular => 1.0,
        FontWeight::Bold => BOLD_WIDTH_FACTOR,
    };
    units * weight_factor * font_size_px
}

/// Horizontal placement of panels in one row.
///
/// The furthest right edge is a running maximum of emitted panel edges, so the
/// trailing gap after the last panel never inflates the canvas width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RowFlow {
    x: f64,
    gap_px: f64,
    furthest_right: f64,
    placed: usize,
}

impl RowFlow {
    pub(crate) fn new(left: f64, gap_px: f64) -> Self {
        Self {
            x: left,
            gap_px,
            furthest_right: left,
            placed: 0,
        }
    }

    pub(crate) fn next_x(&self) -> f64 {
        self.x
    }

    /// Records a panel of `width` at the current x; zero width means nothing
    /// was emitted and the cursor stays put.
    pub(crate) fn place(&mut self, width: f64) {
        if width <= 0.0 {
            return;
        }
        self.furthest_right = self.furthest_right.max(self.x + width);
        self.x += width + self.gap_px;
        self.placed += 1;
    }

    pub(crate) fn furthest_right(&self) -> f64 {
        self.furthest_right
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.placed == 0
    }
}
