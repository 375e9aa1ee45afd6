//! Runtime wiring helpers
//!
//! Opens the configured record store once per process so binaries do not
//! need to know about individual backends.

use std::{path::Path, sync::Arc};

use configs::{DatabaseConfig, StoreBackend};
use tracing::info;

use crate::records::{FileRecordRepository, MongoRecordRepository, RecordRepository};

pub async fn open_repository(cfg: &DatabaseConfig) -> anyhow::Result<Arc<dyn RecordRepository>> {
    match cfg.backend {
        StoreBackend::Mongodb => {
            let db = models::db::connect_with_config(cfg).await?;
            info!(collection = %cfg.collection, "using mongodb record store");
            Ok(Arc::new(MongoRecordRepository::new(&db, &cfg.collection)))
        }
        StoreBackend::File => {
            let path = Path::new(&cfg.file_path);
            common::env::ensure_parent_dir(path).await?;
            let repo: Arc<dyn RecordRepository> = FileRecordRepository::new(path).await?;
            info!(path = %path.display(), "using file record store");
            Ok(repo)
        }
    }
}
