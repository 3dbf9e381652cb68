//! Raw cell values as handed over by report producers.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Key every producer uses for the row's entity id (post or user).
pub const ENTITY_ID_KEY: &str = "ID";

static NULL_CELL: CellValue = CellValue::Null;

/// A heterogeneous raw value. Formatting is decided by the column's
/// [`DataType`](super::column::DataType), never by the variant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Null or an empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    /// Loose truthiness: null, zero, `""` and `"0"` are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Null => false,
            CellValue::Integer(value) => *value != 0,
            CellValue::Float(value) => *value != 0.0,
            CellValue::Text(text) => !(text.is_empty() || text == "0"),
        }
    }

    /// Numeric reading of the value. Text is read up to the first
    /// non-numeric character; anything unreadable is `0.0`.
    pub fn as_f64(&self) -> f64 {
        match self {
            CellValue::Null => 0.0,
            CellValue::Integer(value) => *value as f64,
            CellValue::Float(value) => *value,
            CellValue::Text(text) => leading_number(text),
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            CellValue::Integer(value) => *value,
            other => {
                let value = other.as_f64();
                if value.is_finite() {
                    value.trunc() as i64
                } else {
                    0
                }
            }
        }
    }

    /// Absolute integer value, the way ids and counts are sanitised.
    pub fn abs_int(&self) -> u64 {
        self.as_i64().unsigned_abs()
    }

    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Text(text) => Cow::Borrowed(text.as_str()),
            other => Cow::Owned(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Integer(value) => write!(f, "{value}"),
            CellValue::Float(value) => write!(f, "{value}"),
            CellValue::Text(text) => f.write_str(text),
        }
    }
}

fn leading_number(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (idx, ch) in trimmed.char_indices() {
        match ch {
            '+' | '-' if idx == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = idx + ch.len_utf8();
    }

    if !seen_digit {
        return 0.0;
    }

    trimmed[..end]
        .trim_end_matches('.')
        .parse::<f64>()
        .unwrap_or(0.0)
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Integer(value.into())
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        CellValue::Integer(value.into())
    }
}

impl From<u64> for CellValue {
    fn from(value: u64) -> Self {
        CellValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<usize> for CellValue {
    fn from(value: usize) -> Self {
        CellValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// One dataset row: column key to raw value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(HashMap<String, CellValue>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CellValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Missing keys read as [`CellValue::Null`].
    pub fn get(&self, key: &str) -> &CellValue {
        self.0.get(key).unwrap_or(&NULL_CELL)
    }

    /// The row's entity id, used to build edit and drill-down links.
    pub fn entity_id(&self) -> u64 {
        self.get(ENTITY_ID_KEY).abs_int()
    }
}

/// Ordered rows. Row order is preserved by every renderer.
pub type Dataset = Vec<Row>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_reads_leading_number() {
        assert_eq!(CellValue::from("12abc").as_i64(), 12);
        assert_eq!(CellValue::from(" -3.5 apples").as_f64(), -3.5);
        assert_eq!(CellValue::from("abc").as_i64(), 0);
        assert_eq!(CellValue::from("7.").as_f64(), 7.0);
    }

    #[test]
    fn truthiness_matches_loose_rules() {
        assert!(!CellValue::Null.is_truthy());
        assert!(!CellValue::from(0).is_truthy());
        assert!(!CellValue::from("0").is_truthy());
        assert!(!CellValue::from("").is_truthy());
        assert!(CellValue::from(3).is_truthy());
        assert!(CellValue::from("x").is_truthy());
    }

    #[test]
    fn missing_key_reads_as_null() {
        let row = Row::new().with("ID", 42);
        assert_eq!(row.get("title"), &CellValue::Null);
        assert_eq!(row.entity_id(), 42);
    }

    #[test]
    fn rows_deserialize_from_json_objects() {
        let row: Row =
            serde_json::from_str(r#"{"ID": 5, "title": "Gold", "ratio": 0.5, "date": null}"#)
                .unwrap();
        assert_eq!(row.get("ID"), &CellValue::Integer(5));
        assert_eq!(row.get("title"), &CellValue::Text("Gold".into()));
        assert_eq!(row.get("ratio"), &CellValue::Float(0.5));
        assert_eq!(row.get("date"), &CellValue::Null);
    }
}
