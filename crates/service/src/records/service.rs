use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use models::normalize::{self, RawFields};
use models::{DoseRecord, RecordId};

use crate::errors::ServiceError;
use crate::export::{self, ExportTable};
use crate::records::filter::RecordFilter;
use crate::records::repository::RecordRepository;

/// Create-time policy. `strict` refuses payloads that omit any of
/// scannerManufacturer, scannerModel or month.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CreatePolicy {
    pub strict: bool,
}

/// Application service for dose records: normalization, id handling and
/// existence checks on top of a `RecordRepository`.
#[derive(Clone)]
pub struct RecordService {
    repo: Arc<dyn RecordRepository>,
    policy: CreatePolicy,
}

impl RecordService {
    pub fn new(repo: Arc<dyn RecordRepository>, policy: CreatePolicy) -> Self {
        Self { repo, policy }
    }

    pub fn policy(&self) -> CreatePolicy {
        self.policy
    }

    pub fn backend(&self) -> &'static str {
        self.repo.backend()
    }

    fn prepare(mut raw: RawFields) -> normalize::Normalized {
        let stripped = normalize::strip_protected(&mut raw);
        if !stripped.is_empty() {
            debug!(keys = ?stripped, "dropped store-owned keys from payload");
        }
        let normalized = normalize::normalize(raw);
        if !normalized.ignored.is_empty() {
            debug!(keys = ?normalized.ignored, "ignored undeclared keys");
        }
        normalized
    }

    #[instrument(skip_all, fields(strict = self.policy.strict))]
    pub async fn create(&self, raw: RawFields) -> Result<DoseRecord, ServiceError> {
        if self.policy.strict {
            let missing = normalize::missing_required(&raw);
            if !missing.is_empty() {
                return Err(ServiceError::MissingFields(missing));
            }
        }
        let record = DoseRecord::new(Self::prepare(raw).fields);
        self.repo.insert(&record).await?;
        info!(id = %record.id, fields = record.fields.len(), "created dose record");
        Ok(record)
    }

    pub async fn list(&self, filter: &RecordFilter) -> Result<Vec<DoseRecord>, ServiceError> {
        let all = self.repo.list().await?;
        let total = all.len();
        let out = filter.apply(all);
        debug!(total, returned = out.len(), "listed dose records");
        Ok(out)
    }

    /// Fetch one record by its hex id.
    pub async fn get(&self, id: &str) -> Result<DoseRecord, ServiceError> {
        let id = RecordId::parse(id)?;
        self.repo
            .get(&id)
            .await?
            .ok_or_else(|| ServiceError::not_found("record"))
    }

    #[instrument(skip(self, raw))]
    pub async fn update(&self, id: &str, raw: RawFields) -> Result<DoseRecord, ServiceError> {
        let id = RecordId::parse(id)?;
        let patch = Self::prepare(raw).fields;

        if self.repo.get(&id).await?.is_none() {
            return Err(ServiceError::not_found("record"));
        }
        if !self.repo.update_fields(&id, &patch).await? {
            // Deleted between the existence check and the write.
            return Err(ServiceError::not_found("record"));
        }
        match self.repo.get(&id).await? {
            Some(updated) => {
                info!(id = %id, fields = patch.len(), "updated dose record");
                Ok(updated)
            }
            None => {
                warn!(id = %id, "record missing right after update");
                Err(ServiceError::Storage(format!("record {id} disappeared after update")))
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let id = RecordId::parse(id)?;
        if !self.repo.delete(&id).await? {
            return Err(ServiceError::not_found("record"));
        }
        info!(id = %id, "deleted dose record");
        Ok(())
    }

    /// Labeled table of the filtered records for spreadsheet export.
    pub async fn export(&self, filter: &RecordFilter) -> Result<ExportTable, ServiceError> {
        let records = self.list(filter).await?;
        Ok(export::project(&records, export::EXPORT_PLACEHOLDER))
    }
}
