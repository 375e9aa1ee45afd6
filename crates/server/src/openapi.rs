use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct AckDoc {
    pub success: bool,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub details: Option<String>,
}

/// Create/update payload. Every field is optional; numeric fields also
/// accept numeric strings and `""` clears a field.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoseRecordInputDoc {
    pub scanner_manufacturer: Option<String>,
    pub scanner_model: Option<String>,
    pub month: Option<i32>,
    pub gender: Option<String>,
    pub age: Option<f64>,
    pub weight: Option<f64>,
    pub modality: Option<String>,
    pub exam_description: Option<String>,
    pub projection: Option<String>,
    pub kvp: Option<f64>,
    pub mas: Option<f64>,
    pub dap: Option<f64>,
    pub aec_manual: Option<String>,
    pub grid: Option<String>,
    pub focal_spot: Option<f64>,
    pub sid: Option<f64>,
    pub collimation: Option<f64>,
    pub tube_output: Option<f64>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoseRecordDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub created_at: String,
    #[serde(flatten)]
    pub fields: DoseRecordInputDoc,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportTableDoc {
    pub sheet_name: String,
    pub file_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::records::list,
        crate::routes::records::create,
        crate::routes::records::get,
        crate::routes::records::update,
        crate::routes::records::delete,
        crate::routes::records::export,
        crate::routes::records::schema,
    ),
    components(
        schemas(
            HealthResponse,
            AckDoc,
            ErrorBody,
            DoseRecordInputDoc,
            DoseRecordDoc,
            ExportTableDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "records")
    )
)]
pub struct ApiDoc;
