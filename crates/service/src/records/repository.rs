use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::{Collection, Database};
use tracing::warn;

use models::document::{self, CREATED_AT_KEY, ID_KEY};
use models::{DoseRecord, FieldMap, RecordId};

use crate::errors::ServiceError;

/// Persistence seam for dose records. Implementations hold no business
/// rules: normalization, id checks and existence policy live in
/// `RecordService`.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    async fn insert(&self, record: &DoseRecord) -> Result<(), ServiceError>;

    /// All records, newest `createdAt` first; ties go to the larger id.
    async fn list(&self) -> Result<Vec<DoseRecord>, ServiceError>;

    async fn get(&self, id: &RecordId) -> Result<Option<DoseRecord>, ServiceError>;

    /// Overwrite the named fields of one record. Returns whether a record
    /// matched `id`.
    async fn update_fields(&self, id: &RecordId, patch: &FieldMap) -> Result<bool, ServiceError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: &RecordId) -> Result<bool, ServiceError>;
}

/// MongoDB-backed repository over a single collection.
#[derive(Clone)]
pub struct MongoRecordRepository {
    collection: Collection<Document>,
}

impl MongoRecordRepository {
    pub fn new(db: &Database, collection: &str) -> Self {
        Self { collection: db.collection::<Document>(collection) }
    }
}

#[async_trait]
impl RecordRepository for MongoRecordRepository {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn insert(&self, record: &DoseRecord) -> Result<(), ServiceError> {
        let doc = document::to_document(record);
        self.collection.insert_one(doc).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<DoseRecord>, ServiceError> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { CREATED_AT_KEY: -1, ID_KEY: -1 })
            .await?;
        let docs: Vec<Document> = cursor.try_collect().await?;
        let mut out = Vec::with_capacity(docs.len());
        for d in docs {
            match document::from_document(d) {
                Ok(rec) => out.push(rec),
                Err(e) => warn!(error = %e, "skipping undecodable record document"),
            }
        }
        Ok(out)
    }

    async fn get(&self, id: &RecordId) -> Result<Option<DoseRecord>, ServiceError> {
        let found = self.collection.find_one(document::id_filter(id)).await?;
        Ok(found.map(document::from_document).transpose()?)
    }

    async fn update_fields(&self, id: &RecordId, patch: &FieldMap) -> Result<bool, ServiceError> {
        // MongoDB rejects an empty `$set`; nothing to write means nothing changes.
        if patch.is_empty() {
            let hit = self.collection.find_one(document::id_filter(id)).await?;
            return Ok(hit.is_some());
        }
        let set = document::set_document(patch);
        let res = self
            .collection
            .update_one(document::id_filter(id), doc! { "$set": set })
            .await?;
        Ok(res.matched_count > 0)
    }

    async fn delete(&self, id: &RecordId) -> Result<bool, ServiceError> {
        let res = self.collection.delete_one(document::id_filter(id)).await?;
        Ok(res.deleted_count > 0)
    }
}
