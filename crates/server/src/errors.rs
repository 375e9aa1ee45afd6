use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// JSON error body returned by every handler: a short message for the UI
/// plus optional detail for logs and debugging.
#[derive(Debug, Serialize)]
pub struct JsonApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, details: Option<String>) -> Self {
        Self { status, error: error.into(), details }
    }

    /// Map a service failure to a response. `failure` is the message used
    /// for storage errors, e.g. "Failed to update data".
    pub fn from_service(e: ServiceError, failure: &str) -> Self {
        match e {
            ServiceError::MissingId => Self::new(StatusCode::BAD_REQUEST, "ID is required", None),
            ServiceError::InvalidId(raw) => Self::new(StatusCode::BAD_REQUEST, "Invalid ID format", Some(raw)),
            ServiceError::MissingFields(_) => {
                Self::new(StatusCode::BAD_REQUEST, "Missing required fields", Some(e.to_string()))
            }
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Data not found", None),
            ServiceError::Storage(msg) => {
                error!(err = %msg, "{}", failure);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, failure, Some(msg))
            }
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("record store unavailable: {0}")]
    Store(String),
}
