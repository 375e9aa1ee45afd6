use std::future::Future;

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::records::{CreatePolicy, RecordService};
use service::runtime;

use crate::errors::StartupError;
use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the configured store once and wrap it in the record service.
pub async fn build_state(cfg: &AppConfig) -> Result<AppState, StartupError> {
    let repo = runtime::open_repository(&cfg.database)
        .await
        .map_err(|e| StartupError::Store(e.to_string()))?;
    let policy = CreatePolicy { strict: cfg.records.strict_create };
    let records = RecordService::new(repo, policy);
    info!(backend = records.backend(), strict_create = policy.strict, "record service ready");
    Ok(AppState::new(records))
}

pub fn build_app(state: AppState) -> Router {
    routes::build_router(state, build_cors())
}

/// Bind and serve until `shutdown` resolves.
pub async fn serve<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = build_state(&cfg).await?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind((cfg.server.host.as_str(), cfg.server.port)).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "starting dose registry server");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("server stopped");
    Ok(())
}

pub async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!(event = "shutdown_signal", "received Ctrl+C, draining connections");
    }
}
