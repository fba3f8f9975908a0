use serde::{Serialize, Deserialize};
use serde_json::{Number, Value};
use std::borrow::Cow;
use std::fmt;
use crate::error::{Error, Result};

/// A single table cell.
///
/// Serialized untagged so the wire form is plain JSON scalars; `Null` maps to
/// JSON `null` in both directions and is never coerced to a string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Text used when the cell takes part in string comparison.
    ///
    /// Strings are used as-is, numbers by their JSON text (`1`, `2.5`) and
    /// booleans as `true`/`false`. Null has no text.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            CellValue::Null => None,
            CellValue::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            CellValue::Number(n) => Some(Cow::Owned(n.to_string())),
            CellValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => f.write_str(&text),
            None => f.write_str("null"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(Number::from(n))
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<CellValue> for Value {
    fn from(cell: CellValue) -> Self {
        match cell {
            CellValue::Null => Value::Null,
            CellValue::Bool(b) => Value::Bool(b),
            CellValue::Number(n) => Value::Number(n),
            CellValue::Text(s) => Value::String(s),
        }
    }
}

impl TryFrom<Value> for CellValue {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(CellValue::Null),
            Value::Bool(b) => Ok(CellValue::Bool(b)),
            Value::Number(n) => Ok(CellValue::Number(n)),
            Value::String(s) => Ok(CellValue::Text(s)),
            Value::Array(_) => Err(Error::malformed("cell values must be scalars, found an array")),
            Value::Object(_) => Err(Error::malformed("cell values must be scalars, found an object")),
        }
    }
}
