use serde::Deserialize;

use models::value::parse_number;
use models::{DoseField, DoseRecord};

/// Table-view filters. An absent value, an empty value or `all` matches
/// every record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecordFilter {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default, alias = "exam")]
    pub exam_description: Option<String>,
}

fn active(v: &Option<String>) -> Option<&str> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        active(&self.month).is_none() && active(&self.exam_description).is_none()
    }

    pub fn matches(&self, record: &DoseRecord) -> bool {
        if let Some(month) = active(&self.month) {
            let Some(stored) = record.get(DoseField::Month) else { return false };
            let wanted = parse_number(month).and_then(|n| n.as_f64());
            let same = match (stored.as_f64(), wanted) {
                (Some(a), Some(b)) => a == b,
                _ => stored.to_string() == month,
            };
            if !same {
                return false;
            }
        }
        if let Some(exam) = active(&self.exam_description) {
            if record.get(DoseField::ExamDescription).map(ToString::to_string).as_deref() != Some(exam) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, records: Vec<DoseRecord>) -> Vec<DoseRecord> {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
