//! Mapping between `DoseRecord` and its BSON document in the collection.
//!
//! Documents carry `_id` as an ObjectId and `createdAt` as a BSON date, the
//! same layout the entry form has always written, so existing collections
//! read back without conversion.

use bson::{doc, Bson, Document};
use serde_json::{Number, Value};
use tracing::trace;

use crate::errors::ModelError;
use crate::field::DoseField;
use crate::record::{DoseRecord, FieldMap, RecordId};
use crate::value::FieldValue;

pub const ID_KEY: &str = "_id";
pub const CREATED_AT_KEY: &str = "createdAt";

/// BSON has no unsigned integers: anything past `i64::MAX` is stored as a
/// double, the way the JavaScript driver writes such numbers.
fn number_to_bson(n: &Number) -> Bson {
    if let Some(i) = n.as_i64() {
        Bson::Int64(i)
    } else if let Some(u) = n.as_u64() {
        Bson::Double(u as f64)
    } else {
        Bson::Double(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn json_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => number_to_bson(n),
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
        Value::Object(map) => Bson::Document(
            map.iter().map(|(k, v)| (k.clone(), json_to_bson(v))).collect(),
        ),
    }
}

fn value_to_bson(value: &Option<FieldValue>) -> Bson {
    match value {
        None => Bson::Null,
        Some(FieldValue::Number(n)) => number_to_bson(n),
        Some(FieldValue::Text(s)) => Bson::String(s.clone()),
        Some(FieldValue::Flag(b)) => Bson::Boolean(*b),
        Some(FieldValue::Structured(v)) => json_to_bson(v),
    }
}

fn write_fields(out: &mut Document, fields: &FieldMap) {
    for (field, value) in fields {
        out.insert(field.key(), value_to_bson(value));
    }
}

pub fn to_document(record: &DoseRecord) -> Document {
    let mut out = doc! {
        ID_KEY: record.id.object_id(),
        CREATED_AT_KEY: bson::DateTime::from_chrono(record.created_at),
    };
    write_fields(&mut out, &record.fields);
    out
}

/// `$set` body for a partial update. Cleared fields are written as `null`.
pub fn set_document(patch: &FieldMap) -> Document {
    let mut out = Document::new();
    write_fields(&mut out, patch);
    out
}

pub fn id_filter(id: &RecordId) -> Document {
    doc! { ID_KEY: id.object_id() }
}

pub fn from_document(mut document: Document) -> Result<DoseRecord, ModelError> {
    let id = match document.remove(ID_KEY) {
        Some(Bson::ObjectId(oid)) => RecordId::from(oid),
        Some(other) => return Err(ModelError::Decode(format!("unexpected _id {other}"))),
        None => return Err(ModelError::Decode("document without _id".into())),
    };
    let created_at = match document.remove(CREATED_AT_KEY) {
        Some(Bson::DateTime(dt)) => dt.to_chrono(),
        // Fall back to the ObjectId's embedded creation second.
        _ => id.object_id().timestamp().to_chrono(),
    };

    let mut fields = FieldMap::new();
    for (key, value) in document {
        let Some(field) = DoseField::from_key(&key) else {
            trace!(%key, "skipping unknown document key");
            continue;
        };
        let slot = match value {
            Bson::Null => None,
            other => Some(
                bson::from_bson::<FieldValue>(other)
                    .map_err(|e| ModelError::Decode(format!("{key}: {e}")))?,
            ),
        };
        fields.insert(field, slot);
    }
    Ok(DoseRecord { id, created_at, fields })
}
