//! Service layer for dose records.
//! - `records`: repository seam and the record rules on top of it.
//! - `export`: labeled table projection for spreadsheet export.
//! - `runtime`: opening the configured store at startup.

pub mod errors;
pub mod export;
pub mod records;
pub mod runtime;
