use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("ID is required")]
    MissingId,
    #[error("Invalid ID format: {0}")]
    InvalidId(String),
    #[error("document decode error: {0}")]
    Decode(String),
}
