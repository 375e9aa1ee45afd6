use std::time::Duration;

use mongodb::{bson::doc, options::ClientOptions, Client, Database};
use tracing::info;

pub const DEFAULT_DATABASE: &str = "dose_registry";

/// Open the client once and ping the server so startup fails fast when the
/// store is unreachable. The returned handle is cheap to clone and pools
/// connections internally.
pub async fn connect_with_config(cfg: &configs::DatabaseConfig) -> anyhow::Result<Database> {
    let mut opts = ClientOptions::parse(cfg.url.as_str()).await?;
    opts.app_name = Some("dose-registry".into());
    opts.max_pool_size = Some(cfg.max_pool_size);
    opts.min_pool_size = Some(cfg.min_pool_size);
    opts.connect_timeout = Some(Duration::from_secs(cfg.connect_timeout_secs));
    opts.server_selection_timeout = Some(Duration::from_secs(cfg.connect_timeout_secs));

    let client = Client::with_options(opts)?;
    let db = if cfg.name.trim().is_empty() {
        client.default_database().unwrap_or_else(|| client.database(DEFAULT_DATABASE))
    } else {
        client.database(cfg.name.trim())
    };
    db.run_command(doc! { "ping": 1 }).await?;
    info!(database = %db.name(), "connected to document store");
    Ok(db)
}
