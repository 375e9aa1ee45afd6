use models::{DoseField, ModelError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("ID is required")]
    MissingId,
    #[error("invalid ID format: {0}")]
    InvalidId(String),
    #[error("missing required fields: {}", join_fields(.0))]
    MissingFields(Vec<DoseField>),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
}

fn join_fields(fields: &[DoseField]) -> String {
    fields.iter().map(|f| f.key()).collect::<Vec<_>>().join(", ")
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{} not found", entity))
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }

    /// Whether the caller sent something the service refuses, as opposed to
    /// a lookup miss or a store failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingId | Self::InvalidId(_) | Self::MissingFields(_))
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::MissingId => Self::MissingId,
            ModelError::InvalidId(raw) => Self::InvalidId(raw),
            ModelError::Decode(_) => Self::Storage(e.to_string()),
        }
    }
}

impl From<mongodb::error::Error> for ServiceError {
    fn from(e: mongodb::error::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_errors_map_to_categories() {
        assert!(ServiceError::from(ModelError::MissingId).is_validation());
        assert!(ServiceError::from(ModelError::InvalidId("x".into())).is_validation());
        assert!(matches!(ServiceError::from(ModelError::Decode("bad".into())), ServiceError::Storage(_)));
    }

    #[test]
    fn missing_fields_message_lists_keys() {
        let e = ServiceError::MissingFields(vec![DoseField::ScannerModel, DoseField::Month]);
        assert_eq!(e.to_string(), "missing required fields: scannerModel, month");
    }
}
