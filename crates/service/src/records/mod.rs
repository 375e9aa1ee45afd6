//! Dose record persistence: the repository seam, its MongoDB and JSON-file
//! implementations, and the service that applies the record rules.

pub mod file_repo;
pub mod filter;
pub mod repository;
pub mod service;

pub use file_repo::FileRecordRepository;
pub use filter::RecordFilter;
pub use repository::{MongoRecordRepository, RecordRepository};
pub use service::{CreatePolicy, RecordService};
