use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use server::routes::{self, AppState};
use service::records::{CreatePolicy, FileRecordRepository, RecordService};

fn cors() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::very_permissive()
}

async fn build_app(strict: bool) -> anyhow::Result<Router> {
    let path = format!("target/test-data/{}/records.json", Uuid::new_v4());
    let repo = FileRecordRepository::new(path).await?;
    let state = AppState::new(RecordService::new(repo, CreatePolicy { strict }));
    Ok(routes::build_router(state, cors()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))?,
        None => builder.body(Body::empty())?,
    };
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

#[tokio::test]
async fn create_then_list_returns_normalized_record() -> anyhow::Result<()> {
    let app = build_app(false).await?;
    let (status, created) = send(
        &app,
        "POST",
        "/records",
        Some(json!({
            "_id": "65f000000000000000000000",
            "createdAt": "2000-01-01T00:00:00Z",
            "scannerManufacturer": "samsung",
            "month": "3",
            "kvp": "",
            "mas": "2.5",
            "notAField": 1
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(created["_id"], json!("65f000000000000000000000"));
    assert_ne!(created["createdAt"], json!("2000-01-01T00:00:00Z"));
    assert_eq!(created["month"], json!(3));
    assert_eq!(created["mas"], json!(2.5));
    assert_eq!(created["kvp"], Value::Null);
    assert!(created.get("notAField").is_none());

    let (status, list) = send(&app, "GET", "/records", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([created]));
    Ok(())
}

#[tokio::test]
async fn list_is_newest_first_and_filterable() -> anyhow::Result<()> {
    let app = build_app(false).await?;
    let mut ids = Vec::new();
    for (month, exam) in [("1", "CXR"), ("2", "ABDO"), ("1", "ABDO")] {
        let (_, rec) = send(&app, "POST", "/records", Some(json!({"month": month, "examDescription": exam}))).await?;
        ids.push(rec["_id"].clone());
    }

    let (_, all) = send(&app, "GET", "/records", None).await?;
    let order: Vec<Value> = all.as_array().into_iter().flatten().map(|r| r["_id"].clone()).collect();
    assert_eq!(order, vec![ids[2].clone(), ids[1].clone(), ids[0].clone()]);

    let (_, jan) = send(&app, "GET", "/records?month=01", None).await?;
    assert_eq!(jan.as_array().map(Vec::len), Some(2));
    let (_, jan_abdo) = send(&app, "GET", "/records?month=1&examDescription=ABDO", None).await?;
    assert_eq!(jan_abdo.as_array().map(Vec::len), Some(1));
    let (_, every) = send(&app, "GET", "/records?month=all&examDescription=", None).await?;
    assert_eq!(every.as_array().map(Vec::len), Some(3));
    Ok(())
}

#[tokio::test]
async fn update_merges_only_named_fields() -> anyhow::Result<()> {
    let app = build_app(false).await?;
    let (_, rec) = send(&app, "POST", "/records", Some(json!({"age": 30, "weight": "70"}))).await?;
    let uri = format!("/records/{}", rec["_id"].as_str().unwrap_or_default());

    let patch = json!({"age": "31", "createdAt": "1999-01-01T00:00:00Z", "_id": "nope"});
    let (status, once) = send(&app, "PUT", &uri, Some(patch.clone())).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(once["age"], json!(31));
    assert_eq!(once["weight"], json!(70));
    assert_eq!(once["createdAt"], rec["createdAt"]);
    assert_eq!(once["_id"], rec["_id"]);

    let (_, twice) = send(&app, "PUT", &uri, Some(patch)).await?;
    assert_eq!(twice, once);

    let (status, noop) = send(&app, "PUT", &uri, Some(json!({}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(noop, once);

    let (_, fetched) = send(&app, "GET", &uri, None).await?;
    assert_eq!(fetched, once);
    Ok(())
}

#[tokio::test]
async fn update_rejects_bad_ids() -> anyhow::Result<()> {
    let app = build_app(false).await?;
    let (_, rec) = send(&app, "POST", "/records", Some(json!({"age": 30}))).await?;

    let (status, body) = send(&app, "PUT", "/records/", Some(json!({"age": 1}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ID is required");

    let (status, body) = send(&app, "PUT", "/records/%20", Some(json!({"age": 1}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ID is required");

    let (status, body) = send(&app, "PUT", "/records/not-an-id", Some(json!({"age": 1}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid ID format");

    let (status, body) = send(&app, "PUT", "/records/65f000000000000000000000", Some(json!({"age": 1}))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Data not found");

    let (_, list) = send(&app, "GET", "/records", None).await?;
    assert_eq!(list, json!([rec]));
    Ok(())
}

#[tokio::test]
async fn delete_acknowledges_then_reports_not_found() -> anyhow::Result<()> {
    let app = build_app(false).await?;
    let (_, keep) = send(&app, "POST", "/records", Some(json!({"age": 1}))).await?;
    let (_, gone) = send(&app, "POST", "/records", Some(json!({"age": 2}))).await?;
    let uri = format!("/records/{}", gone["_id"].as_str().unwrap_or_default());

    let (status, body) = send(&app, "DELETE", &uri, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (status, _) = send(&app, "DELETE", &uri, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", "/records/xyz", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, body) = send(&app, "DELETE", "/records", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ID is required");

    let (_, list) = send(&app, "GET", "/records", None).await?;
    assert_eq!(list, json!([keep]));
    Ok(())
}

#[tokio::test]
async fn strict_create_rejects_missing_core_fields() -> anyhow::Result<()> {
    let app = build_app(true).await?;
    let (status, body) = send(&app, "POST", "/records", Some(json!({"scannerModel": "GC85A"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");
    let details = body["details"].as_str().unwrap_or_default();
    assert!(details.contains("scannerManufacturer") && details.contains("month"));

    let (_, list) = send(&app, "GET", "/records", None).await?;
    assert_eq!(list, json!([]));

    let ok = json!({"scannerManufacturer": "samsung", "scannerModel": "GC85A", "month": ""});
    let (status, _) = send(&app, "POST", "/records", Some(ok)).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn non_object_body_is_rejected() -> anyhow::Result<()> {
    let app = build_app(false).await?;
    let (status, _) = send(&app, "POST", "/records", Some(json!([1, 2]))).await?;
    assert!(status.is_client_error());
    let (_, list) = send(&app, "GET", "/records", None).await?;
    assert_eq!(list, json!([]));
    Ok(())
}

#[tokio::test]
async fn export_projects_labeled_columns() -> anyhow::Result<()> {
    let app = build_app(false).await?;
    send(&app, "POST", "/records", Some(json!({"examDescription": "CXR", "kvp": "110", "grid": ""}))).await?;
    let (_, before) = send(&app, "GET", "/records", None).await?;

    let (status, table) = send(&app, "GET", "/records/export", None).await?;
    assert_eq!(status, StatusCode::OK);
    let columns = table["columns"].as_array().cloned().unwrap_or_default();
    assert_eq!(columns.len(), 19);
    assert_eq!(columns.last(), Some(&json!("Created At")));
    assert!(columns.contains(&json!("Weight (Kg)")));
    let row = table["rows"][0].as_array().cloned().unwrap_or_default();
    assert_eq!(row.len(), 19);
    assert!(row.contains(&json!("110")));
    assert!(row.contains(&json!("CXR")));

    let (_, filtered) = send(&app, "GET", "/records/export?examDescription=ABDO", None).await?;
    assert_eq!(filtered["rows"], json!([]));

    let (_, after) = send(&app, "GET", "/records", None).await?;
    assert_eq!(before, after);
    Ok(())
}

#[tokio::test]
async fn schema_health_and_metrics() -> anyhow::Result<()> {
    let app = build_app(true).await?;
    let (status, schema) = send(&app, "GET", "/records/schema", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(schema["fields"].as_array().map(Vec::len), Some(18));
    assert_eq!(schema["fields"][0]["key"], "scannerManufacturer");
    assert_eq!(schema["strictCreate"], json!(true));
    assert_eq!(schema["tablePlaceholder"], "-");
    assert_eq!(schema["defaults"]["sid"], json!(180));
    assert_eq!(schema["examPresets"][1]["examDescription"], "ABDO");

    let (status, health) = send(&app, "GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health, json!({"status": "ok"}));

    send(&app, "GET", "/records", None).await?;
    let req = Request::builder().uri("/metrics").body(Body::empty())?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(axum::body::to_bytes(resp.into_body(), usize::MAX).await?.to_vec())?;
    assert!(text.contains("dose_registry_record_ops_total"));
    Ok(())
}
