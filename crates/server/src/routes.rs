use axum::{
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::records::RecordService;

use crate::metrics::encode_metrics;
use crate::openapi::ApiDoc;

pub mod records;

/// Shared handler state: the record service over the process-wide store handle.
#[derive(Clone)]
pub struct AppState {
    pub records: RecordService,
}

impl AppState {
    pub fn new(records: RecordService) -> Self {
        Self { records }
    }
}

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn metrics() -> (StatusCode, String) {
    encode_metrics()
}

/// Build the full application router: record CRUD, export, schema, health,
/// metrics and the Swagger UI.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let ops = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    // `/records` without an id only supports list and create; PUT/DELETE
    // there answer "ID is required" instead of 405.
    let record_routes = Router::new()
        .route(
            "/records",
            get(records::list)
                .post(records::create)
                .put(records::missing_id)
                .delete(records::missing_id),
        )
        .route("/records/", put(records::missing_id).delete(records::missing_id))
        .route("/records/export", get(records::export))
        .route("/records/schema", get(records::schema))
        .route(
            "/records/:id",
            get(records::get).put(records::update).delete(records::delete),
        );

    ops.merge(record_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
