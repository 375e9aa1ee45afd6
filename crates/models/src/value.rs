use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A stored, non-null field value.
///
/// Numbers keep their integer/float distinction so `12` round-trips as `12`
/// and not `12.0`. Values that are neither numbers, text nor booleans are kept
/// verbatim as JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(Number),
    Text(String),
    Flag(bool),
    Structured(Value),
}

impl FieldValue {
    /// Map a JSON value onto a field slot; `null` clears the slot.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(n) => Some(Self::Number(n)),
            Value::String(s) => Some(Self::Text(s)),
            Value::Bool(b) => Some(Self::Flag(b)),
            other => Some(Self::Structured(other)),
        }
    }

    pub fn into_json(self) -> Value {
        match self {
            Self::Number(n) => Value::Number(n),
            Self::Text(s) => Value::String(s),
            Self::Flag(b) => Value::Bool(b),
            Self::Structured(v) => v,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Structured(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Number(v.into())
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// Parse text that is entirely a finite number. Whole values come back as
/// integers, so `"12"` and `"12.0"` both yield `12`.
///
/// Stricter than JavaScript's `Number(text)`: blank text does not become `0`
/// and hex literals such as `"0x10"` stay text.
pub fn parse_number(text: &str) -> Option<Number> {
    let t = text.trim();
    if t.is_empty() {
        return None;
    }
    if let Ok(i) = t.parse::<i64>() {
        return Some(Number::from(i));
    }
    let f = t.parse::<f64>().ok().filter(|f| f.is_finite())?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        return Some(Number::from(f as i64));
    }
    Number::from_f64(f)
}
