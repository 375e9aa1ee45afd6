//! Input normalization: the coercion applied to every submitted field before
//! it reaches the store, on create and on update alike.
//!
//! Per field, independently:
//! - `""` becomes `null` (cleared, as opposed to absent)
//! - a string that is entirely a finite number becomes that number
//! - anything else is kept as-is

use serde_json::{Map, Value};

use crate::field::DoseField;
use crate::record::FieldMap;
use crate::value::{parse_number, FieldValue};

/// Raw request body: field name to whatever the client sent.
pub type RawFields = Map<String, Value>;

/// Keys the store owns. Client-supplied values for them are always dropped.
pub const PROTECTED_KEYS: [&str; 3] = ["_id", "id", "createdAt"];

/// Fields a strict create refuses to go without.
pub const REQUIRED_ON_CREATE: [DoseField; 3] =
    [DoseField::ScannerManufacturer, DoseField::ScannerModel, DoseField::Month];

/// Coerce a single raw value.
pub fn coerce(value: Value) -> Value {
    match value {
        Value::String(s) if s.is_empty() => Value::Null,
        Value::String(s) => match parse_number(&s) {
            Some(n) => Value::Number(n),
            None => Value::String(s),
        },
        other => other,
    }
}

/// Remove store-owned keys; returns the names that were present.
pub fn strip_protected(raw: &mut RawFields) -> Vec<&'static str> {
    PROTECTED_KEYS
        .iter()
        .copied()
        .filter(|k| raw.remove(*k).is_some())
        .collect()
}

/// Required fields absent from a create payload, in table order.
pub fn missing_required(raw: &RawFields) -> Vec<DoseField> {
    REQUIRED_ON_CREATE
        .iter()
        .copied()
        .filter(|f| !raw.contains_key(f.key()))
        .collect()
}

/// Result of normalizing a payload against the field table.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Normalized {
    pub fields: FieldMap,
    /// Keys that are not dose fields; these are never stored.
    pub ignored: Vec<String>,
}

/// Coerce a payload and project it onto the declared fields. The payload
/// should already have had its protected keys stripped.
pub fn normalize(raw: RawFields) -> Normalized {
    let mut out = Normalized::default();
    for (key, value) in raw {
        match DoseField::from_key(&key) {
            Some(field) => {
                out.fields.insert(field, FieldValue::from_json(coerce(value)));
            }
            None => out.ignored.push(key),
        }
    }
    out
}
