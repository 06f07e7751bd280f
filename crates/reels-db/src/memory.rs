//! In-memory persistence backend
//!
//! Implements every port over `tokio::sync::RwLock` maps. Referential
//! integrity mirrors the PostgreSQL schema: library entries require an
//! existing customer and video, and `upsert_many` fails the whole batch on
//! the first violation the way a single multi-row statement would.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use reels_core::models::{
    AnalyticsEvent, ContentItem, ContentLibraryEntry, ContentStatus, ContentSummary, Customer,
    CustomerStatus, JobStatus, LibraryEntryUpdate, LibraryFilter, LibrarySortKey, Machine,
    NewContent, NewCustomer, NewJob, NewLibraryEntry, NewMachine, ProcessingJob, SortDirection,
};
use reels_core::AppError;

use crate::ports::{
    ContentStore, CustomerStore, EventStore, JobStore, LibraryStore, MachineStore,
};

#[derive(Default)]
struct Tables {
    customers: HashMap<Uuid, Customer>,
    machines: HashMap<Uuid, Machine>,
    videos: HashMap<Uuid, ContentItem>,
    // Keyed by natural key; the unique constraint of the schema.
    entries: HashMap<(Uuid, Uuid), ContentLibraryEntry>,
    jobs: HashMap<Uuid, ProcessingJob>,
    events: Vec<AnalyticsEvent>,
}

/// Shared in-memory store implementing all persistence ports.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a content record directly (test fixture helper).
    pub async fn insert_content(&self, item: ContentItem) {
        self.tables.write().await.videos.insert(item.id, item);
    }

    /// All recorded analytics events (test assertion helper).
    pub async fn events(&self) -> Vec<AnalyticsEvent> {
        self.tables.read().await.events.clone()
    }

    fn check_entry_refs(tables: &Tables, entry: &NewLibraryEntry) -> Result<(), AppError> {
        if !tables.customers.contains_key(&entry.customer_id) {
            return Err(AppError::NotFound(format!(
                "Customer {} not found",
                entry.customer_id
            )));
        }
        if !tables.videos.contains_key(&entry.video_id) {
            return Err(AppError::NotFound(format!(
                "Video {} not found",
                entry.video_id
            )));
        }
        Ok(())
    }

    fn apply_upsert(tables: &mut Tables, new: NewLibraryEntry) -> ContentLibraryEntry {
        let now = Utc::now();
        let key = (new.customer_id, new.video_id);
        let entry = match tables.entries.get(&key) {
            Some(existing) => ContentLibraryEntry {
                id: existing.id,
                customer_id: new.customer_id,
                video_id: new.video_id,
                assignment_type: new.assignment_type,
                assignment_reason: new.assignment_reason,
                featured: new.featured,
                access_level: new.access_level,
                expires_at: new.expires_at,
                assigned_by: new.assigned_by,
                assigned_at: existing.assigned_at,
                updated_at: now,
            },
            None => ContentLibraryEntry {
                id: Uuid::new_v4(),
                customer_id: new.customer_id,
                video_id: new.video_id,
                assignment_type: new.assignment_type,
                assignment_reason: new.assignment_reason,
                featured: new.featured,
                access_level: new.access_level,
                expires_at: new.expires_at,
                assigned_by: new.assigned_by,
                assigned_at: now,
                updated_at: now,
            },
        };
        tables.entries.insert(key, entry.clone());
        entry
    }

    fn summary_matches(summary: &ContentSummary, filter: &LibraryFilter) -> bool {
        if let Some(model) = &filter.machine_model {
            if !summary.machine_models.iter().any(|m| m == model) {
                return false;
            }
        }
        if let Some(process_type) = &filter.process_type {
            if summary.process_type.as_ref() != Some(process_type) {
                return false;
            }
        }
        if let Some(tooling) = &filter.tooling {
            if !summary.tooling.iter().any(|t| t == tooling) {
                return false;
            }
        }
        if let Some(skill_level) = filter.skill_level {
            if summary.skill_level != Some(skill_level) {
                return false;
            }
        }
        // Overlap semantics: at least one filter tag present on the item.
        if let Some(tags) = &filter.tags {
            if !tags.is_empty() && !tags.iter().any(|t| summary.tags.contains(t)) {
                return false;
            }
        }
        if let Some(access_level) = filter.access_level {
            if summary.access_level != access_level {
                return false;
            }
        }
        if let Some(featured) = filter.featured {
            if summary.featured != featured {
                return false;
            }
        }
        if let Some(assignment_type) = filter.assignment_type {
            if summary.assignment_type != assignment_type {
                return false;
            }
        }
        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            let in_title = summary.title.to_lowercase().contains(&needle);
            let in_description = summary
                .description
                .as_ref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_title && !in_description {
                return false;
            }
        }
        if let Some(after) = filter.assigned_after {
            if summary.assigned_at < after {
                return false;
            }
        }
        if let Some(before) = filter.assigned_before {
            if summary.assigned_at > before {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn create(&self, new: NewCustomer) -> Result<Customer, AppError> {
        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4(),
            name: new.name,
            contact_email: new.contact_email,
            subscription_tier: new.subscription_tier,
            status: new.status,
            max_seats: new.max_seats,
            max_storage_gb: new.max_storage_gb,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .await
            .customers
            .insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        Ok(self.tables.read().await.customers.get(&id).cloned())
    }

    async fn find_by_company(&self, company: &str) -> Result<Option<Customer>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .customers
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(company))
            .cloned())
    }

    async fn set_status(&self, id: Uuid, status: CustomerStatus) -> Result<Customer, AppError> {
        let mut tables = self.tables.write().await;
        let customer = tables
            .customers
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Customer {} not found", id)))?;
        customer.status = status;
        customer.updated_at = Utc::now();
        Ok(customer.clone())
    }
}

#[async_trait]
impl MachineStore for MemoryStore {
    async fn create(&self, new: NewMachine) -> Result<Machine, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.customers.contains_key(&new.customer_id) {
            return Err(AppError::NotFound(format!(
                "Customer {} not found",
                new.customer_id
            )));
        }
        let machine = Machine {
            id: Uuid::new_v4(),
            customer_id: new.customer_id,
            model: new.model,
            machine_type: new.machine_type,
            location: new.location,
            status: new.status,
            created_at: Utc::now(),
        };
        tables.machines.insert(machine.id, machine.clone());
        Ok(machine)
    }

    async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Machine>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .machines
            .values()
            .filter(|m| m.customer_id == customer_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn create_draft(&self, new: NewContent) -> Result<ContentItem, AppError> {
        let now = Utc::now();
        let item = ContentItem {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            duration_seconds: 0.0,
            machine_models: new.machine_models,
            process_type: new.process_type,
            tooling: new.tooling,
            skill_level: new.skill_level,
            tags: new.tags,
            content_type: new.content_type,
            file_size: new.file_size,
            status: ContentStatus::Draft,
            storage_key: None,
            storage_url: None,
            uploaded_at: now,
            updated_at: now,
        };
        self.tables.write().await.videos.insert(item.id, item.clone());
        Ok(item)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ContentItem>, AppError> {
        Ok(self.tables.read().await.videos.get(&id).cloned())
    }

    async fn set_storage(
        &self,
        id: Uuid,
        storage_key: &str,
        storage_url: &str,
        file_size: i64,
    ) -> Result<ContentItem, AppError> {
        let mut tables = self.tables.write().await;
        let item = tables
            .videos
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;
        item.storage_key = Some(storage_key.to_string());
        item.storage_url = Some(storage_url.to_string());
        item.file_size = file_size;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn set_status(&self, id: Uuid, status: ContentStatus) -> Result<ContentItem, AppError> {
        let mut tables = self.tables.write().await;
        let item = tables
            .videos
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;
        item.status = status;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn find_by_machine_models(
        &self,
        models: &[String],
        case_insensitive: bool,
    ) -> Result<Vec<ContentItem>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .videos
            .values()
            .filter(|item| {
                models
                    .iter()
                    .any(|m| item.matches_machine_model(m, case_insensitive))
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LibraryStore for MemoryStore {
    async fn upsert_many(
        &self,
        entries: Vec<NewLibraryEntry>,
    ) -> Result<Vec<ContentLibraryEntry>, AppError> {
        let mut tables = self.tables.write().await;
        // Whole batch fails on the first violation, like a multi-row insert.
        for entry in &entries {
            Self::check_entry_refs(&tables, entry)?;
        }
        Ok(entries
            .into_iter()
            .map(|e| Self::apply_upsert(&mut tables, e))
            .collect())
    }

    async fn upsert_one(&self, entry: NewLibraryEntry) -> Result<ContentLibraryEntry, AppError> {
        let mut tables = self.tables.write().await;
        Self::check_entry_refs(&tables, &entry)?;
        Ok(Self::apply_upsert(&mut tables, entry))
    }

    async fn insert_missing(
        &self,
        entries: Vec<NewLibraryEntry>,
    ) -> Result<Vec<ContentLibraryEntry>, AppError> {
        let mut tables = self.tables.write().await;
        for entry in &entries {
            Self::check_entry_refs(&tables, entry)?;
        }
        let mut created = Vec::new();
        for entry in entries {
            let key = (entry.customer_id, entry.video_id);
            if tables.entries.contains_key(&key) {
                continue;
            }
            created.push(Self::apply_upsert(&mut tables, entry));
        }
        Ok(created)
    }

    async fn get(
        &self,
        customer_id: Uuid,
        video_id: Uuid,
    ) -> Result<Option<ContentLibraryEntry>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .entries
            .get(&(customer_id, video_id))
            .cloned())
    }

    async fn update(
        &self,
        entry_id: Uuid,
        updates: LibraryEntryUpdate,
    ) -> Result<ContentLibraryEntry, AppError> {
        let mut tables = self.tables.write().await;
        let entry = tables
            .entries
            .values_mut()
            .find(|e| e.id == entry_id)
            .ok_or_else(|| AppError::NotFound(format!("Library entry {} not found", entry_id)))?;
        if let Some(reason) = updates.assignment_reason {
            entry.assignment_reason = Some(reason);
        }
        if let Some(featured) = updates.featured {
            entry.featured = featured;
        }
        if let Some(access_level) = updates.access_level {
            entry.access_level = access_level;
        }
        if let Some(expires_at) = updates.expires_at {
            entry.expires_at = expires_at;
        }
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn remove(&self, customer_id: Uuid, video_id: Uuid) -> Result<(), AppError> {
        self.tables
            .write()
            .await
            .entries
            .remove(&(customer_id, video_id))
            .map(|_| ())
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No library entry for customer {} and video {}",
                    customer_id, video_id
                ))
            })
    }

    async fn query(
        &self,
        customer_id: Uuid,
        filter: &LibraryFilter,
    ) -> Result<Vec<ContentSummary>, AppError> {
        let tables = self.tables.read().await;
        let mut summaries: Vec<ContentSummary> = tables
            .entries
            .values()
            .filter(|e| e.customer_id == customer_id)
            .filter_map(|e| {
                tables
                    .videos
                    .get(&e.video_id)
                    .map(|v| ContentSummary::from_parts(e, v))
            })
            .filter(|s| Self::summary_matches(s, filter))
            .collect();

        summaries.sort_by(|a, b| {
            let ordering = match filter.sort_by {
                LibrarySortKey::AssignedAt => a.assigned_at.cmp(&b.assigned_at),
                LibrarySortKey::Title => a.title.cmp(&b.title),
                LibrarySortKey::AccessLevel => a.access_level.cmp(&b.access_level),
            };
            match filter.sort_direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let offset = filter.offset.unwrap_or(0).max(0) as usize;
        let limited = summaries.into_iter().skip(offset);
        Ok(match filter.limit {
            Some(limit) => limited.take(limit.max(0) as usize).collect(),
            None => limited.collect(),
        })
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn create_batch(&self, jobs: Vec<NewJob>) -> Result<Vec<ProcessingJob>, AppError> {
        if jobs.is_empty() {
            return Err(AppError::InvalidInput(
                "Job batch must not be empty".to_string(),
            ));
        }
        let mut tables = self.tables.write().await;
        for job in &jobs {
            if !tables.videos.contains_key(&job.video_id) {
                return Err(AppError::NotFound(format!(
                    "Video {} not found",
                    job.video_id
                )));
            }
        }
        let now = Utc::now();
        let mut created = Vec::with_capacity(jobs.len());
        for job in jobs {
            let record = ProcessingJob {
                id: Uuid::new_v4(),
                video_id: job.video_id,
                job_type: job.job_type,
                status: JobStatus::Queued,
                priority: job.priority.as_i32(),
                payload: job.payload,
                created_at: now,
                updated_at: now,
            };
            tables.jobs.insert(record.id, record.clone());
            created.push(record);
        }
        Ok(created)
    }

    async fn list_for_video(&self, video_id: Uuid) -> Result<Vec<ProcessingJob>, AppError> {
        let mut jobs: Vec<ProcessingJob> = self
            .tables
            .read()
            .await
            .jobs
            .values()
            .filter(|j| j.video_id == video_id)
            .cloned()
            .collect();
        jobs.sort_by_key(|j| j.created_at);
        Ok(jobs)
    }

    async fn set_status(&self, job_id: Uuid, status: JobStatus) -> Result<ProcessingJob, AppError> {
        let mut tables = self.tables.write().await;
        let job = tables
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))?;
        job.status = status;
        job.updated_at = Utc::now();
        Ok(job.clone())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn record(&self, event: AnalyticsEvent) -> Result<(), AppError> {
        self.tables.write().await.events.push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reels_core::models::{
        AccessLevel, AssignmentMetadata, AssignmentType, MachineStatus, SkillLevel,
        SubscriptionTier,
    };

    async fn seed_customer(store: &MemoryStore) -> Customer {
        CustomerStore::create(
            store,
            NewCustomer {
                name: "Acme Corp".to_string(),
                contact_email: None,
                subscription_tier: SubscriptionTier::Standard,
                status: CustomerStatus::Active,
                max_seats: 10,
                max_storage_gb: 50,
            },
        )
        .await
        .unwrap()
    }

    async fn seed_video(store: &MemoryStore, title: &str, tags: &[&str]) -> ContentItem {
        store
            .create_draft(NewContent {
                title: title.to_string(),
                description: None,
                machine_models: vec!["CNC-2000".to_string()],
                process_type: Some("drilling".to_string()),
                tooling: vec![],
                skill_level: Some(SkillLevel::Beginner),
                tags: tags.iter().map(|s| s.to_string()).collect(),
                content_type: "video/mp4".to_string(),
                file_size: 0,
            })
            .await
            .unwrap()
    }

    fn entry_for(customer: &Customer, video: &ContentItem) -> NewLibraryEntry {
        AssignmentMetadata::default().entry_for(customer.id, video.id)
    }

    #[tokio::test]
    async fn test_find_by_company_is_case_insensitive() {
        let store = MemoryStore::new();
        seed_customer(&store).await;
        assert!(store.find_by_company("acme corp").await.unwrap().is_some());
        assert!(store.find_by_company("ACME CORP").await.unwrap().is_some());
        assert!(store.find_by_company("Globex").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_on_natural_key() {
        let store = MemoryStore::new();
        let customer = seed_customer(&store).await;
        let video = seed_video(&store, "Safety", &["safety"]).await;

        let first = store.upsert_one(entry_for(&customer, &video)).await.unwrap();
        let second = store.upsert_one(entry_for(&customer, &video)).await.unwrap();

        assert_eq!(first.id, second.id);
        let results = store
            .query(customer.id, &LibraryFilter::default())
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_many_fails_whole_batch_on_missing_video() {
        let store = MemoryStore::new();
        let customer = seed_customer(&store).await;
        let video = seed_video(&store, "Safety", &[]).await;

        let good = entry_for(&customer, &video);
        let mut bad = good.clone();
        bad.video_id = Uuid::new_v4();

        let err = store.upsert_many(vec![good, bad]).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        // Nothing applied.
        assert!(store
            .query(customer.id, &LibraryFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_insert_missing_skips_existing() {
        let store = MemoryStore::new();
        let customer = seed_customer(&store).await;
        let a = seed_video(&store, "A", &[]).await;
        let b = seed_video(&store, "B", &[]).await;

        store.upsert_one(entry_for(&customer, &a)).await.unwrap();

        let created = store
            .insert_missing(vec![entry_for(&customer, &a), entry_for(&customer, &b)])
            .await
            .unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].video_id, b.id);

        // Second run creates nothing.
        let created = store
            .insert_missing(vec![entry_for(&customer, &a), entry_for(&customer, &b)])
            .await
            .unwrap();
        assert!(created.is_empty());
    }

    #[tokio::test]
    async fn test_query_tag_overlap_semantics() {
        let store = MemoryStore::new();
        let customer = seed_customer(&store).await;
        let safety = seed_video(&store, "Safety", &["safety"]).await;
        let quality = seed_video(&store, "Quality", &["quality"]).await;
        store.upsert_one(entry_for(&customer, &safety)).await.unwrap();
        store.upsert_one(entry_for(&customer, &quality)).await.unwrap();

        let filter = LibraryFilter {
            tags: Some(vec!["safety".to_string(), "setup".to_string()]),
            ..Default::default()
        };
        let results = store.query(customer.id, &filter).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Safety");
    }

    #[tokio::test]
    async fn test_query_search_and_sort_by_title() {
        let store = MemoryStore::new();
        let customer = seed_customer(&store).await;
        for title in ["Wire EDM intro", "Drilling deep holes", "Wire maintenance"] {
            let video = seed_video(&store, title, &[]).await;
            store.upsert_one(entry_for(&customer, &video)).await.unwrap();
        }

        let filter = LibraryFilter {
            search: Some("wire".to_string()),
            sort_by: LibrarySortKey::Title,
            sort_direction: SortDirection::Asc,
            ..Default::default()
        };
        let results = store.query(customer.id, &filter).await.unwrap();
        let titles: Vec<&str> = results.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Wire EDM intro", "Wire maintenance"]);
    }

    #[tokio::test]
    async fn test_query_pagination() {
        let store = MemoryStore::new();
        let customer = seed_customer(&store).await;
        for i in 0..5 {
            let video = seed_video(&store, &format!("Video {}", i), &[]).await;
            store.upsert_one(entry_for(&customer, &video)).await.unwrap();
        }

        let filter = LibraryFilter {
            sort_by: LibrarySortKey::Title,
            sort_direction: SortDirection::Asc,
            offset: Some(2),
            limit: Some(2),
            ..Default::default()
        };
        let results = store.query(customer.id, &filter).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Video 2");
    }

    #[tokio::test]
    async fn test_remove_by_natural_key() {
        let store = MemoryStore::new();
        let customer = seed_customer(&store).await;
        let video = seed_video(&store, "Safety", &[]).await;
        store.upsert_one(entry_for(&customer, &video)).await.unwrap();

        store.remove(customer.id, video.id).await.unwrap();
        let err = store.remove(customer.id, video.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_entry_clears_expiry() {
        let store = MemoryStore::new();
        let customer = seed_customer(&store).await;
        let video = seed_video(&store, "Safety", &[]).await;
        let mut new = entry_for(&customer, &video);
        new.expires_at = Some(Utc::now());
        let entry = store.upsert_one(new).await.unwrap();

        let updated = store
            .update(
                entry.id,
                LibraryEntryUpdate {
                    featured: Some(true),
                    access_level: Some(AccessLevel::Premium),
                    expires_at: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.featured);
        assert_eq!(updated.access_level, AccessLevel::Premium);
        assert!(updated.expires_at.is_none());
    }

    #[tokio::test]
    async fn test_machines_require_existing_customer() {
        let store = MemoryStore::new();
        let err = MachineStore::create(
            &store,
            NewMachine {
                customer_id: Uuid::new_v4(),
                model: "CNC-2000".to_string(),
                machine_type: None,
                location: None,
                status: MachineStatus::Active,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_job_batch_rejects_empty() {
        let store = MemoryStore::new();
        let err = store.create_batch(vec![]).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_assignment_type_filter() {
        let store = MemoryStore::new();
        let customer = seed_customer(&store).await;
        let video = seed_video(&store, "Auto", &[]).await;
        let mut new = entry_for(&customer, &video);
        new.assignment_type = AssignmentType::Automatic;
        store.upsert_one(new).await.unwrap();

        let filter = LibraryFilter {
            assignment_type: Some(AssignmentType::Manual),
            ..Default::default()
        };
        assert!(store.query(customer.id, &filter).await.unwrap().is_empty());

        let filter = LibraryFilter {
            assignment_type: Some(AssignmentType::Automatic),
            ..Default::default()
        };
        assert_eq!(store.query(customer.id, &filter).await.unwrap().len(), 1);
    }
}
