use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::debug;

use models::{DoseRecord, FieldMap, RecordId};

use crate::errors::ServiceError;
use crate::records::repository::RecordRepository;

/// JSON file-backed record repository.
///
/// Keeps the collection in memory and rewrites the whole file after every
/// mutation. Meant for local use and tests; same ordering and id scheme as
/// the MongoDB repository.
pub struct FileRecordRepository {
    inner: RwLock<BTreeMap<RecordId, DoseRecord>>,
    file_path: PathBuf,
}

impl FileRecordRepository {
    /// Open the store at `path`, creating an empty file when missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(ServiceError::storage)?;
        }

        let records: Vec<DoseRecord> = match fs::read(&file_path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ServiceError::Storage(format!("corrupt store file {}: {e}", file_path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                fs::write(&file_path, b"[]").await.map_err(ServiceError::storage)?;
                Vec::new()
            }
            Err(e) => return Err(ServiceError::storage(e)),
        };
        debug!(path = %file_path.display(), count = records.len(), "opened record file");

        let map = records.into_iter().map(|r| (r.id, r)).collect();
        Ok(Arc::new(Self { inner: RwLock::new(map), file_path }))
    }

    fn ordered(map: &BTreeMap<RecordId, DoseRecord>) -> Vec<DoseRecord> {
        let mut out: Vec<DoseRecord> = map.values().cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        out
    }

    /// Write through a temp file so a crash never leaves a half-written store.
    async fn save(&self, map: &BTreeMap<RecordId, DoseRecord>) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(&Self::ordered(map)).map_err(ServiceError::storage)?;
        let tmp = self.file_path.with_extension("json.tmp");
        fs::write(&tmp, data).await.map_err(ServiceError::storage)?;
        fs::rename(&tmp, &self.file_path).await.map_err(ServiceError::storage)?;
        Ok(())
    }
}

#[async_trait]
impl RecordRepository for FileRecordRepository {
    fn backend(&self) -> &'static str {
        "file"
    }

    async fn insert(&self, record: &DoseRecord) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        if map.contains_key(&record.id) {
            return Err(ServiceError::Storage(format!("duplicate id {}", record.id)));
        }
        map.insert(record.id, record.clone());
        if let Err(e) = self.save(&map).await {
            map.remove(&record.id);
            return Err(e);
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<DoseRecord>, ServiceError> {
        let map = self.inner.read().await;
        Ok(Self::ordered(&map))
    }

    async fn get(&self, id: &RecordId) -> Result<Option<DoseRecord>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.get(id).cloned())
    }

    async fn update_fields(&self, id: &RecordId, patch: &FieldMap) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        let Some(existing) = map.get_mut(id) else {
            return Ok(false);
        };
        if patch.is_empty() {
            return Ok(true);
        }
        let before = existing.clone();
        existing.merge(patch);
        if let Err(e) = self.save(&map).await {
            map.insert(*id, before);
            return Err(e);
        }
        Ok(true)
    }

    async fn delete(&self, id: &RecordId) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        let Some(removed) = map.remove(id) else {
            return Ok(false);
        };
        if let Err(e) = self.save(&map).await {
            map.insert(*id, removed);
            return Err(e);
        }
        Ok(true)
    }
}
