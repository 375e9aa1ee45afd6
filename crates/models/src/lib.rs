//! Record model for radiographic dose entries: the field table, value and
//! identity types, input normalization and the document mapping.

pub mod db;
pub mod document;
pub mod errors;
pub mod field;
pub mod form;
pub mod normalize;
pub mod record;
pub mod value;

pub use errors::ModelError;
pub use field::{DoseField, FieldKind, FieldSpec, FIELDS};
pub use record::{DoseRecord, FieldMap, RecordId};
pub use value::FieldValue;
