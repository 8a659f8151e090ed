use std::fmt;

use serde_json::{Number, Value};

use crate::error::{OverlayError, OverlayResult};

/// Placeholder shown for a candle field the record leaves out.
pub const MISSING_VALUE_TEXT: &str = "N/A";

/// A record value displayed verbatim: prices and volumes arrive either as
/// JSON numbers or as pre-formatted strings.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Number(Number),
    Text(String),
    Flag(bool),
}

impl ScalarValue {
    /// Reads a scalar, mapping `null` to `None`.
    pub fn from_value(field: &str, value: &Value) -> OverlayResult<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Number(number) => Ok(Some(Self::Number(number.clone()))),
            Value::String(text) => Ok(Some(Self::Text(text.clone()))),
            Value::Bool(flag) => Ok(Some(Self::Flag(*flag))),
            Value::Array(_) | Value::Object(_) => Err(OverlayError::InvalidRecord(format!(
                "field `{field}` must be a number, string or boolean"
            ))),
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
            Self::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

/// Display text for an optional scalar, using the missing-value placeholder.
#[must_use]
pub fn display_or_missing(value: Option<&ScalarValue>) -> String {
    value.map_or_else(|| MISSING_VALUE_TEXT.to_owned(), ToString::to_string)
}
