use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::field::DoseField;
use crate::value::FieldValue;

/// Per-field slots. A missing key means "never supplied"; `None` means the
/// field was explicitly cleared.
pub type FieldMap = BTreeMap<DoseField, Option<FieldValue>>;

/// Store-assigned record identity (a MongoDB ObjectId, 24 hex characters on
/// the wire).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(ObjectId);

impl RecordId {
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    /// Parse a client-supplied id: blank is `MissingId`, malformed is `InvalidId`.
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ModelError::MissingId);
        }
        ObjectId::parse_str(raw)
            .map(Self)
            .map_err(|_| ModelError::InvalidId(raw.to_string()))
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for RecordId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl FromStr for RecordId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RecordId {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0.to_hex()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

/// One exam's acquisition parameters as stored and returned to clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoseRecord {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: FieldMap,
}

impl DoseRecord {
    /// New record with a fresh id, stamped with the current time at the
    /// millisecond precision the document store keeps.
    pub fn new(fields: FieldMap) -> Self {
        Self { id: RecordId::generate(), created_at: now_millis(), fields }
    }

    /// Value of a field, or `None` when it is absent or cleared.
    pub fn get(&self, field: DoseField) -> Option<&FieldValue> {
        self.fields.get(&field).and_then(Option::as_ref)
    }

    pub fn is_cleared(&self, field: DoseField) -> bool {
        matches!(self.fields.get(&field), Some(None))
    }

    /// Overwrite exactly the fields named in `patch`, leaving the rest alone.
    pub fn merge(&mut self, patch: &FieldMap) {
        for (field, value) in patch {
            self.fields.insert(*field, value.clone());
        }
    }
}

pub fn now_millis() -> DateTime<Utc> {
    bson::DateTime::now().to_chrono()
}
