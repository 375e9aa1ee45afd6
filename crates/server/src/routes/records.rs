use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use common::types::Ack;
use models::form::{self, ExamPreset, EXAM_PRESETS};
use models::normalize::{RawFields, REQUIRED_ON_CREATE};
use models::{DoseRecord, FieldMap, FieldSpec, FIELDS};
use service::errors::ServiceError;
use service::export::{ExportTable, TABLE_PLACEHOLDER};
use service::records::RecordFilter;

use crate::{errors::JsonApiError, metrics, routes::AppState};

/// Field table and entry-form defaults so a client can render the form
/// without hard-coding the record layout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaResponse {
    pub fields: &'static [FieldSpec],
    pub created_at_label: &'static str,
    /// What the table view shows in empty cells.
    pub table_placeholder: &'static str,
    pub required_on_create: Vec<&'static str>,
    pub strict_create: bool,
    pub defaults: FieldMap,
    pub exam_presets: &'static [ExamPreset],
}

fn finish<T>(op: &str, failure: &str, result: Result<T, ServiceError>) -> Result<Json<T>, JsonApiError> {
    metrics::observe(op, &result);
    result.map(Json).map_err(|e| JsonApiError::from_service(e, failure))
}

#[utoipa::path(
    get, path = "/records", tag = "records",
    params(
        ("month" = Option<String>, Query, description = "Month filter; `all` or empty matches every record"),
        ("examDescription" = Option<String>, Query, description = "Exam description filter, e.g. CXR")
    ),
    responses(
        (status = 200, description = "Records, newest first", body = [crate::openapi::DoseRecordDoc]),
        (status = 500, description = "Failed to fetch data", body = crate::openapi::ErrorBody)
    )
)]
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<RecordFilter>,
) -> Result<Json<Vec<DoseRecord>>, JsonApiError> {
    let result = state.records.list(&filter).await;
    if let Ok(list) = &result {
        info!(count = list.len(), filtered = !filter.is_empty(), "list dose records");
    }
    finish("list", "Failed to fetch data", result)
}

#[utoipa::path(
    post, path = "/records", tag = "records",
    request_body = crate::openapi::DoseRecordInputDoc,
    responses(
        (status = 200, description = "Stored record", body = crate::openapi::DoseRecordDoc),
        (status = 400, description = "Missing required fields (strict create)", body = crate::openapi::ErrorBody),
        (status = 500, description = "Failed to save data", body = crate::openapi::ErrorBody)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<RawFields>,
) -> Result<Json<DoseRecord>, JsonApiError> {
    info!(keys = input.len(), "dose_record_create_request");
    finish("create", "Failed to save data", state.records.create(input).await)
}

#[utoipa::path(
    get, path = "/records/{id}", tag = "records",
    params(("id" = String, Path, description = "Record id (24 hex characters)")),
    responses(
        (status = 200, description = "Record", body = crate::openapi::DoseRecordDoc),
        (status = 400, description = "Invalid ID format", body = crate::openapi::ErrorBody),
        (status = 404, description = "Data not found", body = crate::openapi::ErrorBody)
    )
)]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DoseRecord>, JsonApiError> {
    finish("get", "Failed to fetch data", state.records.get(&id).await)
}

#[utoipa::path(
    put, path = "/records/{id}", tag = "records",
    params(("id" = String, Path, description = "Record id (24 hex characters)")),
    request_body = crate::openapi::DoseRecordInputDoc,
    responses(
        (status = 200, description = "Updated record", body = crate::openapi::DoseRecordDoc),
        (status = 400, description = "ID is required / Invalid ID format", body = crate::openapi::ErrorBody),
        (status = 404, description = "Data not found", body = crate::openapi::ErrorBody),
        (status = 500, description = "Failed to update data", body = crate::openapi::ErrorBody)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<RawFields>,
) -> Result<Json<DoseRecord>, JsonApiError> {
    info!(%id, keys = patch.len(), "dose_record_update_request");
    finish("update", "Failed to update data", state.records.update(&id, patch).await)
}

#[utoipa::path(
    delete, path = "/records/{id}", tag = "records",
    params(("id" = String, Path, description = "Record id (24 hex characters)")),
    responses(
        (status = 200, description = "Deleted", body = crate::openapi::AckDoc),
        (status = 400, description = "ID is required / Invalid ID format", body = crate::openapi::ErrorBody),
        (status = 404, description = "Data not found", body = crate::openapi::ErrorBody),
        (status = 500, description = "Failed to delete data", body = crate::openapi::ErrorBody)
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ack>, JsonApiError> {
    let result = state.records.delete(&id).await.map(|()| Ack::success());
    finish("delete", "Failed to delete data", result)
}

/// PUT/DELETE addressed at the collection instead of a record.
pub async fn missing_id() -> JsonApiError {
    metrics::observe::<()>("missing_id", &Err(ServiceError::MissingId));
    JsonApiError::new(StatusCode::BAD_REQUEST, "ID is required", None)
}

#[utoipa::path(
    get, path = "/records/export", tag = "records",
    params(
        ("month" = Option<String>, Query, description = "Month filter"),
        ("examDescription" = Option<String>, Query, description = "Exam description filter")
    ),
    responses(
        (status = 200, description = "Labeled table for spreadsheet export", body = crate::openapi::ExportTableDoc),
        (status = 500, description = "Failed to fetch data", body = crate::openapi::ErrorBody)
    )
)]
pub async fn export(
    State(state): State<AppState>,
    Query(filter): Query<RecordFilter>,
) -> Result<Json<ExportTable>, JsonApiError> {
    let result = state.records.export(&filter).await;
    if let Ok(table) = &result {
        info!(rows = table.rows.len(), "export dose records");
    }
    finish("export", "Failed to fetch data", result)
}

#[utoipa::path(
    get, path = "/records/schema", tag = "records",
    responses((status = 200, description = "Field table, form defaults and exam presets"))
)]
pub async fn schema(State(state): State<AppState>) -> Json<SchemaResponse> {
    Json(SchemaResponse {
        fields: &FIELDS,
        created_at_label: models::field::CREATED_AT_LABEL,
        table_placeholder: TABLE_PLACEHOLDER,
        required_on_create: REQUIRED_ON_CREATE.iter().map(|f| f.key()).collect(),
        strict_create: state.records.policy().strict,
        defaults: form::form_defaults(),
        exam_presets: &EXAM_PRESETS,
    })
}
