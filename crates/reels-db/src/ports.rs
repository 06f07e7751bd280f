//! Persistence ports
//!
//! Narrow async traits over the record collections the core touches. Business
//! services depend on these traits, never on a concrete backend, so upsert
//! semantics, filter composition, and pagination are testable without a live
//! database. Implementations: [`crate::pg`] (PostgreSQL) and
//! [`crate::memory`] (in-memory, for tests and embedding).

use async_trait::async_trait;
use uuid::Uuid;

use reels_core::models::{
    AnalyticsEvent, ContentItem, ContentLibraryEntry, ContentStatus, ContentSummary, Customer,
    CustomerStatus, JobStatus, LibraryEntryUpdate, LibraryFilter, Machine, NewContent,
    NewCustomer, NewJob, NewLibraryEntry, NewMachine, ProcessingJob,
};
use reels_core::AppError;

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn create(&self, new: NewCustomer) -> Result<Customer, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Customer>, AppError>;

    /// Case-insensitive exact match on the customer name. Absence is a normal
    /// outcome, not an error.
    async fn find_by_company(&self, company: &str) -> Result<Option<Customer>, AppError>;

    async fn set_status(&self, id: Uuid, status: CustomerStatus) -> Result<Customer, AppError>;
}

#[async_trait]
pub trait MachineStore: Send + Sync {
    async fn create(&self, new: NewMachine) -> Result<Machine, AppError>;

    async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Machine>, AppError>;
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Create the anchor record for an upload: draft status, zero duration.
    /// Duration is filled in by post-upload processing, not by the uploader.
    async fn create_draft(&self, new: NewContent) -> Result<ContentItem, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<ContentItem>, AppError>;

    /// Record the finalized object location after a successful upload.
    async fn set_storage(
        &self,
        id: Uuid,
        storage_key: &str,
        storage_url: &str,
        file_size: i64,
    ) -> Result<ContentItem, AppError>;

    async fn set_status(&self, id: Uuid, status: ContentStatus) -> Result<ContentItem, AppError>;

    /// All content items matching any of the given machine models.
    async fn find_by_machine_models(
        &self,
        models: &[String],
        case_insensitive: bool,
    ) -> Result<Vec<ContentItem>, AppError>;
}

#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Upsert a batch of entries keyed on (customer_id, video_id) in one
    /// statement. A constraint violation fails the whole batch; callers that
    /// need per-item isolation fall back to [`LibraryStore::upsert_one`].
    async fn upsert_many(
        &self,
        entries: Vec<NewLibraryEntry>,
    ) -> Result<Vec<ContentLibraryEntry>, AppError>;

    async fn upsert_one(&self, entry: NewLibraryEntry) -> Result<ContentLibraryEntry, AppError>;

    /// Insert only entries whose (customer_id, video_id) pair does not exist
    /// yet, returning the newly created rows. Drives auto-assignment counting
    /// without a read-modify-write race.
    async fn insert_missing(
        &self,
        entries: Vec<NewLibraryEntry>,
    ) -> Result<Vec<ContentLibraryEntry>, AppError>;

    /// Lookup by natural key.
    async fn get(
        &self,
        customer_id: Uuid,
        video_id: Uuid,
    ) -> Result<Option<ContentLibraryEntry>, AppError>;

    async fn update(
        &self,
        entry_id: Uuid,
        updates: LibraryEntryUpdate,
    ) -> Result<ContentLibraryEntry, AppError>;

    /// Removal by natural key; callers typically know (customer, video), not
    /// the surrogate entry id. NotFound when no entry exists.
    async fn remove(&self, customer_id: Uuid, video_id: Uuid) -> Result<(), AppError>;

    async fn query(
        &self,
        customer_id: Uuid,
        filter: &LibraryFilter,
    ) -> Result<Vec<ContentSummary>, AppError>;
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert all jobs for one upload in a single statement so a partial job
    /// set is never observed by downstream workers.
    async fn create_batch(&self, jobs: Vec<NewJob>) -> Result<Vec<ProcessingJob>, AppError>;

    async fn list_for_video(&self, video_id: Uuid) -> Result<Vec<ProcessingJob>, AppError>;

    async fn set_status(&self, job_id: Uuid, status: JobStatus) -> Result<ProcessingJob, AppError>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn record(&self, event: AnalyticsEvent) -> Result<(), AppError>;
}
