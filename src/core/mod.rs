pub mod labels;
pub mod record;
pub mod scalar;
pub mod types;

pub use labels::{candle_slot_label, ordinal_suffix};
pub use record::{Candle, ImbalanceZone, LimitOrder, MarketStructure, Timeframe, TradeRecord};
pub use scalar::{MISSING_VALUE_TEXT, ScalarValue};
pub use types::Viewport;
