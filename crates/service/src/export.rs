//! Tabular projection of records for the table view and spreadsheet export.
//! Pure: takes records by reference and never writes to the store.

use serde::Serialize;

use models::field::CREATED_AT_LABEL;
use models::{DoseField, DoseRecord, FIELDS};

/// Placeholder the table view shows for empty cells.
pub const TABLE_PLACEHOLDER: &str = "-";
/// Placeholder written to exported spreadsheets.
pub const EXPORT_PLACEHOLDER: &str = "";
pub const SHEET_NAME: &str = "Patient Data";
pub const FILE_NAME: &str = "patient_data.xlsx";

const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExportTable {
    pub sheet_name: &'static str,
    pub file_name: &'static str,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

fn cell(record: &DoseRecord, field: DoseField, placeholder: &str) -> String {
    record
        .get(field)
        .map(ToString::to_string)
        .unwrap_or_else(|| placeholder.to_string())
}

pub fn project(records: &[DoseRecord], placeholder: &str) -> ExportTable {
    let mut columns: Vec<&'static str> = FIELDS.iter().map(|s| s.label).collect();
    columns.push(CREATED_AT_LABEL);

    let rows = records
        .iter()
        .map(|r| {
            let mut row: Vec<String> = DoseField::all().map(|f| cell(r, f, placeholder)).collect();
            row.push(r.created_at.format(CREATED_AT_FORMAT).to_string());
            row
        })
        .collect();

    ExportTable { sheet_name: SHEET_NAME, file_name: FILE_NAME, columns, rows }
}
