//! The closed set of dose parameters a record can carry, and the single table
//! that describes each of them (wire key, display label, declared kind and
//! the options the entry form offers).

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DoseField {
    ScannerManufacturer,
    ScannerModel,
    Month,
    Gender,
    Age,
    Weight,
    Modality,
    ExamDescription,
    Projection,
    AecManual,
    Kvp,
    Mas,
    Dap,
    Grid,
    FocalSpot,
    Sid,
    Collimation,
    TubeOutput,
}

/// Declared kind of a field. Informational: normalization treats every field
/// the same way and never rejects a value because of its kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Choice,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct FieldSpec {
    #[serde(skip)]
    pub field: DoseField,
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "no_options")]
    pub options: &'static [&'static str],
}

fn no_options(options: &&[&str]) -> bool {
    options.is_empty()
}

const fn spec(
    field: DoseField,
    key: &'static str,
    label: &'static str,
    kind: FieldKind,
    options: &'static [&'static str],
) -> FieldSpec {
    FieldSpec { field, key, label, kind, options }
}

const MONTHS: &[&str] = &["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12"];

/// One entry per `DoseField`, in declaration order.
pub static FIELDS: [FieldSpec; 18] = [
    spec(DoseField::ScannerManufacturer, "scannerManufacturer", "Scanner Manufacturer", FieldKind::Text, &[]),
    spec(DoseField::ScannerModel, "scannerModel", "Scanner Model", FieldKind::Text, &[]),
    spec(DoseField::Month, "month", "Month", FieldKind::Number, MONTHS),
    spec(DoseField::Gender, "gender", "Gender", FieldKind::Choice, &["M", "F"]),
    spec(DoseField::Age, "age", "Age", FieldKind::Number, &[]),
    spec(DoseField::Weight, "weight", "Weight (Kg)", FieldKind::Number, &[]),
    spec(DoseField::Modality, "modality", "Modality", FieldKind::Choice, &["CR", "DR"]),
    spec(DoseField::ExamDescription, "examDescription", "Exam Description", FieldKind::Choice, &["CXR", "ABDO"]),
    spec(DoseField::Projection, "projection", "Series Projection (AP, PA, LAT)", FieldKind::Choice, &["AP", "PA", "LAT"]),
    spec(DoseField::AecManual, "aecManual", "AEC/Manual", FieldKind::Choice, &["AEC", "Manual"]),
    spec(DoseField::Kvp, "kvp", "kVp", FieldKind::Number, &[]),
    spec(DoseField::Mas, "mas", "mAs", FieldKind::Number, &[]),
    spec(DoseField::Dap, "dap", "DAP (Gy.cm²)", FieldKind::Number, &[]),
    spec(DoseField::Grid, "grid", "Grid", FieldKind::Choice, &["IN", "OUT"]),
    spec(DoseField::FocalSpot, "focalSpot", "Focal Spot Size", FieldKind::Number, &[]),
    spec(DoseField::Sid, "sid", "SID (cm)", FieldKind::Number, &["180", "100"]),
    spec(DoseField::Collimation, "collimation", "Collimation (cm²)", FieldKind::Number, &[]),
    spec(DoseField::TubeOutput, "tubeOutput", "Tube output (mGy/mAs@SID)", FieldKind::Number, &[]),
];

/// Label of the trailing timestamp column in tabular projections.
pub const CREATED_AT_LABEL: &str = "Created At";

impl DoseField {
    pub fn spec(self) -> &'static FieldSpec {
        &FIELDS[self as usize]
    }

    pub fn key(self) -> &'static str {
        self.spec().key
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }

    pub fn from_key(key: &str) -> Option<Self> {
        FIELDS.iter().find(|s| s.key == key).map(|s| s.field)
    }

    pub fn all() -> impl Iterator<Item = DoseField> {
        FIELDS.iter().map(|s| s.field)
    }
}

impl std::fmt::Display for DoseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_in_declaration_order() {
        for (i, s) in FIELDS.iter().enumerate() {
            assert_eq!(s.field as usize, i, "{} out of place", s.key);
        }
    }

    #[test]
    fn keys_match_serde_names() {
        for s in FIELDS.iter() {
            let wire = serde_json::to_value(s.field).unwrap();
            assert_eq!(wire, serde_json::Value::String(s.key.to_string()));
            assert_eq!(DoseField::from_key(s.key), Some(s.field));
        }
    }

    #[test]
    fn unknown_key_is_not_a_field() {
        assert_eq!(DoseField::from_key("createdAt"), None);
        assert_eq!(DoseField::from_key("Kvp"), None);
    }
}
