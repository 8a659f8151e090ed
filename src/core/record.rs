use indexmap::IndexSet;
use serde_json::{Map, Value};
use smallvec::SmallVec;

use crate::core::labels::candle_slot_label;
use crate::core::scalar::{ScalarValue, display_or_missing};
use crate::error::{OverlayError, OverlayResult};

const MARKET_STRUCTURE_KEY: &str = "currentMarketStructure";
const ORDER_VOLUME_KEY: &str = "orderVolume";
const INDECISION_CANDLE_KEY: &str = "indecisionCandle";
const IMBALANCES_KEY: &str = "imbalances";
const CONFLUENCE_KEY: &str = "confluence";
const LIMIT_ORDER_KEY: &str = "limitOrder";
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Trend label driving value coloring and imbalance row highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarketStructure {
    Bullish,
    Bearish,
    /// Any other label, or no label at all.
    #[default]
    Neutral,
}

impl MarketStructure {
    /// Exact, case-sensitive match against `BULLISH` / `BEARISH`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "BULLISH" => Self::Bullish,
            "BEARISH" => Self::Bearish,
            _ => Self::Neutral,
        }
    }

    /// Non-string and missing values are neutral.
    #[must_use]
    pub fn from_scalar(value: Option<&ScalarValue>) -> Self {
        value
            .and_then(ScalarValue::as_text)
            .map_or(Self::Neutral, Self::from_label)
    }
}

/// Lower timeframes shown in the confluence row, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    M1,
    M5,
    M15,
    M30,
    H1,
}

impl Timeframe {
    pub const ALL: [Self; 5] = [Self::M1, Self::M5, Self::M15, Self::M30, Self::H1];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::M1 => "M1",
            Self::M5 => "M5",
            Self::M15 => "M15",
            Self::M30 => "M30",
            Self::H1 => "H1",
        }
    }

    #[must_use]
    pub fn panel_title(self) -> String {
        format!("{} Candle", self.key())
    }
}

/// Candle summary rendered as Indecisive / Open / Close / High / Low.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Candle {
    pub is_indecisive: Option<ScalarValue>,
    pub open: Option<ScalarValue>,
    pub close: Option<ScalarValue>,
    pub high: Option<ScalarValue>,
    pub low: Option<ScalarValue>,
}

impl Candle {
    /// Number of fields every candle panel lists.
    pub const FIELD_COUNT: usize = 5;

    pub fn from_value(field: &str, value: &Value) -> OverlayResult<Self> {
        let Value::Object(object) = value else {
            return Err(OverlayError::InvalidRecord(format!(
                "candle `{field}` must be an object"
            )));
        };
        let read = |key: &str| -> OverlayResult<Option<ScalarValue>> {
            match object.get(key) {
                Some(value) => ScalarValue::from_value(&format!("{field}.{key}"), value),
                None => Ok(None),
            }
        };
        Ok(Self {
            is_indecisive: read("isIndecisive")?,
            open: read("open")?,
            close: read("close")?,
            high: read("high")?,
            low: read("low")?,
        })
    }

    /// `Label: value` lines in fixed display order.
    #[must_use]
    pub fn field_lines(&self) -> [String; Self::FIELD_COUNT] {
        [
            ("Indecisive", &self.is_indecisive),
            ("Open", &self.open),
            ("Close", &self.close),
            ("High", &self.high),
            ("Low", &self.low),
        ]
        .map(|(label, value)| format!("{label}: {}", display_or_missing(value.as_ref())))
    }
}

/// Bid/ask levels recorded for one candle slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImbalanceZone {
    /// Positive slot key; 1 is the indecision candle.
    pub candle_index: u32,
    pub bids: Vec<String>,
    pub asks: Vec<String>,
}

impl ImbalanceZone {
    fn from_entry(key: &str, value: &Value) -> OverlayResult<Self> {
        let candle_index = key
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|index| *index > 0)
            .ok_or_else(|| {
                OverlayError::InvalidRecord(format!(
                    "imbalance key `{key}` must be a positive integer"
                ))
            })?;
        let Value::Object(object) = value else {
            return Err(OverlayError::InvalidRecord(format!(
                "imbalance `{key}` must be an object"
            )));
        };
        Ok(Self {
            candle_index,
            bids: read_levels(key, "bids", object)?,
            asks: read_levels(key, "asks", object)?,
        })
    }

    #[must_use]
    pub fn label(&self) -> String {
        candle_slot_label(self.candle_index)
    }

    /// Rows in the ragged bid/ask table.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.bids.len().max(self.asks.len())
    }

    /// Bid and ask cell for `row`; the shorter side yields empty cells.
    #[must_use]
    pub fn row(&self, row: usize) -> (&str, &str) {
        (level_cell(&self.bids, row), level_cell(&self.asks, row))
    }
}

fn level_cell(levels: &[String], row: usize) -> &str {
    levels.get(row).map_or("", String::as_str)
}

fn read_levels(key: &str, side: &str, object: &Map<String, Value>) -> OverlayResult<Vec<String>> {
    match object.get(side) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(levels)) => levels
            .iter()
            .map(|level| -> OverlayResult<String> {
                let field = format!("{IMBALANCES_KEY}.{key}.{side}");
                Ok(ScalarValue::from_value(&field, level)?
                    .map(|scalar| scalar.to_string())
                    .unwrap_or_default())
            })
            .collect(),
        Some(_) => Err(OverlayError::InvalidRecord(format!(
            "imbalance `{key}` {side} must be an array"
        ))),
    }
}

/// Proposed limit order; only rendered when `limit_price` is set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LimitOrder {
    pub limit_price: Option<ScalarValue>,
    pub take_profit: Option<ScalarValue>,
    pub stop_loss: Option<ScalarValue>,
    pub zone_pips: Option<ScalarValue>,
    pub take_profit_pips: Option<ScalarValue>,
    pub stop_loss_pips: Option<ScalarValue>,
}

impl LimitOrder {
    pub fn from_value(value: &Value) -> OverlayResult<Self> {
        let Value::Object(object) = value else {
            return Err(OverlayError::InvalidRecord(format!(
                "`{LIMIT_ORDER_KEY}` must be an object"
            )));
        };
        let read = |key: &str| -> OverlayResult<Option<ScalarValue>> {
            match object.get(key) {
                Some(value) => ScalarValue::from_value(&format!("{LIMIT_ORDER_KEY}.{key}"), value),
                None => Ok(None),
            }
        };
        Ok(Self {
            limit_price: read("limitPrice")?,
            take_profit: read("takeProfit")?,
            stop_loss: read("stopLoss")?,
            zone_pips: read("zonePips")?,
            take_profit_pips: read("takeProfitPips")?,
            stop_loss_pips: read("stopLossPips")?,
        })
    }

    /// `Label: value` for each present field, in fixed order.
    ///
    /// `None` when the limit price is missing, whatever else is set.
    #[must_use]
    pub fn trade_lines(&self) -> Option<SmallVec<[String; 6]>> {
        self.limit_price.as_ref()?;
        Some(
            [
                ("Limit Price", &self.limit_price),
                ("Take Profit", &self.take_profit),
                ("Stop Loss", &self.stop_loss),
                ("Zone Pips", &self.zone_pips),
                ("Take Profit Pips", &self.take_profit_pips),
                ("Stop Loss Pips", &self.stop_loss_pips),
            ]
            .into_iter()
            .filter_map(|(label, value)| value.as_ref().map(|value| format!("{label}: {value}")))
            .collect(),
        )
    }
}

/// One trade-setup document, read into typed sections plus the leftover
/// top-level fields no section claimed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TradeRecord {
    pub market_structure: Option<ScalarValue>,
    pub order_volume: Option<ScalarValue>,
    pub indecision_candle: Option<Candle>,
    /// Sorted by descending candle index.
    pub imbalances: Vec<ImbalanceZone>,
    /// Present timeframes in `Timeframe::ALL` order.
    pub confluence: Vec<(Timeframe, Candle)>,
    pub limit_order: Option<LimitOrder>,
    /// Unclaimed top-level fields, in document order.
    pub remaining: Map<String, Value>,
}

impl TradeRecord {
    /// Parses a record document, tolerating a leading byte-order mark.
    pub fn from_json_str(input: &str) -> OverlayResult<Self> {
        let input = input.strip_prefix(BYTE_ORDER_MARK).unwrap_or(input);
        let value: Value = serde_json::from_str(input)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> OverlayResult<Self> {
        let Value::Object(object) = value else {
            return Err(OverlayError::InvalidRecord(
                "record root must be a json object".to_owned(),
            ));
        };
        let mut claims = FieldClaims::new(object);

        let market_structure = claims
            .claim(MARKET_STRUCTURE_KEY)
            .map(|value| ScalarValue::from_value(MARKET_STRUCTURE_KEY, value))
            .transpose()?
            .flatten();
        let order_volume = claims
            .claim(ORDER_VOLUME_KEY)
            .map(|value| ScalarValue::from_value(ORDER_VOLUME_KEY, value))
            .transpose()?
            .flatten();
        let indecision_candle = claims
            .claim(INDECISION_CANDLE_KEY)
            .filter(|value| !value.is_null())
            .map(|value| Candle::from_value(INDECISION_CANDLE_KEY, value))
            .transpose()?;
        let imbalances = read_imbalances(claims.claim(IMBALANCES_KEY))?;
        let confluence = read_confluence(&mut claims)?;
        let limit_order = claims
            .claim(LIMIT_ORDER_KEY)
            .filter(|value| !value.is_null())
            .map(LimitOrder::from_value)
            .transpose()?;

        Ok(Self {
            market_structure,
            order_volume,
            indecision_candle,
            imbalances,
            confluence,
            limit_order,
            remaining: claims.remaining(),
        })
    }

    #[must_use]
    pub fn market_structure_kind(&self) -> MarketStructure {
        MarketStructure::from_scalar(self.market_structure.as_ref())
    }

    /// Pretty-printed leftover fields, or `None` when nothing is left over.
    pub fn remaining_details_json(&self) -> OverlayResult<Option<String>> {
        let rendered = serde_json::to_string_pretty(&self.remaining)?;
        Ok((rendered != "{}").then_some(rendered))
    }
}

fn read_imbalances(value: Option<&Value>) -> OverlayResult<Vec<ImbalanceZone>> {
    let object = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(object)) => object,
        Some(_) => {
            return Err(OverlayError::InvalidRecord(format!(
                "`{IMBALANCES_KEY}` must be an object"
            )));
        }
    };
    let mut zones = object
        .iter()
        .map(|(key, value)| ImbalanceZone::from_entry(key, value))
        .collect::<OverlayResult<Vec<_>>>()?;
    zones.sort_by(|a, b| b.candle_index.cmp(&a.candle_index));
    Ok(zones)
}

/// Top-level timeframe keys win; the nested `confluence` object only fills
/// timeframes the top level leaves out.
fn read_confluence(claims: &mut FieldClaims<'_>) -> OverlayResult<Vec<(Timeframe, Candle)>> {
    let nested = match claims.claim(CONFLUENCE_KEY) {
        None | Some(Value::Null) => None,
        Some(Value::Object(object)) => Some(object),
        Some(_) => {
            return Err(OverlayError::InvalidRecord(format!(
                "`{CONFLUENCE_KEY}` must be an object"
            )));
        }
    };

    let mut candles = Vec::new();
    for timeframe in Timeframe::ALL {
        let top_level = claims.claim(timeframe.key()).filter(|value| !value.is_null());
        let value = top_level.or_else(|| {
            nested
                .and_then(|object| object.get(timeframe.key()))
                .filter(|value| !value.is_null())
        });
        if let Some(value) = value {
            candles.push((timeframe, Candle::from_value(timeframe.key(), value)?));
        }
    }
    Ok(candles)
}

/// Read-only view of the record root that remembers which keys were read,
/// so the leftover set is a complement rather than a mutated document.
struct FieldClaims<'a> {
    source: &'a Map<String, Value>,
    claimed: IndexSet<&'a str>,
}

impl<'a> FieldClaims<'a> {
    fn new(source: &'a Map<String, Value>) -> Self {
        Self {
            source,
            claimed: IndexSet::new(),
        }
    }

    fn claim(&mut self, key: &str) -> Option<&'a Value> {
        let (key, value) = self.source.get_key_value(key)?;
        self.claimed.insert(key.as_str());
        Some(value)
    }

    fn remaining(&self) -> Map<String, Value> {
        self.source
            .iter()
            .filter(|(key, _)| !self.claimed.contains(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn claims_leave_only_unread_keys() {
        let value = json!({"orderVolume": 10, "foo": "bar", "M5": null, "zeta": [1]});
        let Value::Object(object) = &value else {
            unreachable!()
        };
        let mut claims = FieldClaims::new(object);
        assert!(claims.claim("orderVolume").is_some());
        assert!(claims.claim("M5").is_some());
        assert!(claims.claim("missing").is_none());

        let remaining = claims.remaining();
        let keys: Vec<&str> = remaining.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["foo", "zeta"]);
    }

    #[test]
    fn market_structure_match_is_exact() {
        assert_eq!(MarketStructure::from_label("BULLISH"), MarketStructure::Bullish);
        assert_eq!(MarketStructure::from_label("BEARISH"), MarketStructure::Bearish);
        assert_eq!(MarketStructure::from_label("bullish"), MarketStructure::Neutral);
        assert_eq!(MarketStructure::from_label("RANGING"), MarketStructure::Neutral);
    }
}
