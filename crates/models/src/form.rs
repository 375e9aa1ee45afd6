//! Entry-form defaults. The exam description drives the default projection
//! and source-to-image distance; nothing on the store side enforces them.

use serde::Serialize;

use crate::field::DoseField;
use crate::record::FieldMap;
use crate::value::FieldValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamPreset {
    pub exam_description: &'static str,
    pub projection: &'static str,
    pub sid: i64,
}

pub static EXAM_PRESETS: [ExamPreset; 2] = [
    ExamPreset { exam_description: "CXR", projection: "PA", sid: 180 },
    ExamPreset { exam_description: "ABDO", projection: "AP", sid: 100 },
];

/// Values a blank entry form starts with.
pub fn form_defaults() -> FieldMap {
    let text = |s: &str| Some(FieldValue::from(s));
    let chest = &EXAM_PRESETS[0];
    FieldMap::from([
        (DoseField::ScannerManufacturer, text("samsung")),
        (DoseField::ScannerModel, text("GC85A")),
        (DoseField::Modality, text("DR")),
        (DoseField::ExamDescription, text(chest.exam_description)),
        (DoseField::Projection, text(chest.projection)),
        (DoseField::AecManual, text("AEC")),
        (DoseField::Grid, text("IN")),
        (DoseField::Sid, Some(FieldValue::from(chest.sid))),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abdomen_switches_projection_and_sid() {
        let p = &EXAM_PRESETS[1];
        assert_eq!((p.exam_description, p.projection, p.sid), ("ABDO", "AP", 100));
    }

    #[test]
    fn defaults_follow_chest_preset() {
        let d = form_defaults();
        assert_eq!(d[&DoseField::Projection], Some(FieldValue::from("PA")));
        assert_eq!(d[&DoseField::Sid], Some(FieldValue::from(180)));
        assert!(!d.contains_key(&DoseField::Month));
    }
}
