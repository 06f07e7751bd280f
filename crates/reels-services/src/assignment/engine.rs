//! Content assignment engine
//!
//! Owns the customer-to-video relationship: manual assignment, bulk
//! assignment with per-group failure isolation, and automatic assignment
//! driven by the customer's registered machine models.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use reels_core::models::{
    AssignmentMetadata, AssignmentType, ContentLibraryEntry, ContentSummary, LibraryEntryUpdate,
    LibraryFilter, MachineStatus, NewLibraryEntry,
};
use reels_core::{AppError, ReelsConfig};
use reels_db::ports::{ContentStore, CustomerStore, LibraryStore, MachineStore};

use crate::assignment::types::{
    AssignmentFailure, AssignmentOutcome, BulkAssignReport, BulkAssignRequest,
};

pub struct AssignmentEngine {
    customers: Arc<dyn CustomerStore>,
    machines: Arc<dyn MachineStore>,
    content: Arc<dyn ContentStore>,
    library: Arc<dyn LibraryStore>,
    machine_match_case_insensitive: bool,
}

impl AssignmentEngine {
    pub fn new(
        customers: Arc<dyn CustomerStore>,
        machines: Arc<dyn MachineStore>,
        content: Arc<dyn ContentStore>,
        library: Arc<dyn LibraryStore>,
        config: &ReelsConfig,
    ) -> Self {
        Self {
            customers,
            machines,
            content,
            library,
            machine_match_case_insensitive: config.machine_match_case_insensitive,
        }
    }

    /// Upsert one entry per video under shared metadata. Tries a single
    /// batch first; when the batch fails, retries per item so one bad video
    /// id does not sink its siblings.
    #[tracing::instrument(skip(self, video_ids, metadata), fields(
        customer_id = %customer_id,
        video_count = video_ids.len()
    ))]
    pub async fn assign(
        &self,
        customer_id: Uuid,
        video_ids: &[Uuid],
        metadata: AssignmentMetadata,
    ) -> Result<AssignmentOutcome, AppError> {
        if video_ids.is_empty() {
            return Err(AppError::InvalidInput(
                "Video id list must not be empty".to_string(),
            ));
        }
        self.customers
            .get(customer_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Customer {} not found", customer_id)))?;

        let entries: Vec<NewLibraryEntry> = video_ids
            .iter()
            .map(|&video_id| metadata.entry_for(customer_id, video_id))
            .collect();

        match self.library.upsert_many(entries.clone()).await {
            Ok(assigned) => Ok(AssignmentOutcome {
                assigned,
                failed: Vec::new(),
            }),
            Err(batch_err) => {
                tracing::warn!(
                    customer_id = %customer_id,
                    error = ?batch_err,
                    "Batch assignment failed, retrying per item"
                );
                let mut outcome = AssignmentOutcome::default();
                for entry in entries {
                    let video_id = entry.video_id;
                    match self.library.upsert_one(entry).await {
                        Ok(e) => outcome.assigned.push(e),
                        Err(e) => outcome.failed.push(AssignmentFailure {
                            video_id,
                            error: e.to_string(),
                        }),
                    }
                }
                Ok(outcome)
            }
        }
    }

    /// Process assignment groups independently; a failure in one group never
    /// aborts the others. When `auto_assign_by_machines` is set, every
    /// touched customer also gets an auto-assignment pass afterwards, with
    /// per-customer errors logged rather than failing the batch.
    #[tracing::instrument(skip(self, requests), fields(group_count = requests.len()))]
    pub async fn bulk_assign(
        &self,
        requests: Vec<BulkAssignRequest>,
        auto_assign_by_machines: bool,
    ) -> Result<BulkAssignReport, AppError> {
        let mut report = BulkAssignReport::default();
        let mut touched: Vec<Uuid> = Vec::new();

        for request in requests {
            match self
                .assign(request.customer_id, &request.video_ids, request.metadata)
                .await
            {
                Ok(outcome) => {
                    report.successful.extend(outcome.assigned);
                    report.failed.extend(outcome.failed);
                    if !touched.contains(&request.customer_id) {
                        touched.push(request.customer_id);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        customer_id = %request.customer_id,
                        error = ?e,
                        "Assignment group failed"
                    );
                    let message = e.to_string();
                    report
                        .failed
                        .extend(request.video_ids.iter().map(|&video_id| AssignmentFailure {
                            video_id,
                            error: message.clone(),
                        }));
                }
            }
        }

        if auto_assign_by_machines {
            for customer_id in touched {
                match self.auto_assign_by_machines(customer_id).await {
                    Ok(count) => report.auto_assigned += count,
                    Err(e) => {
                        tracing::error!(
                            customer_id = %customer_id,
                            error = ?e,
                            "Auto-assignment after bulk assign failed"
                        );
                    }
                }
            }
        }

        Ok(report)
    }

    /// Match the customer's registered machine models against the content
    /// catalog and create entries for every matching, not-yet-assigned
    /// video. Returns the count of newly created entries; re-running on
    /// unchanged data returns 0.
    #[tracing::instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn auto_assign_by_machines(&self, customer_id: Uuid) -> Result<usize, AppError> {
        self.customers
            .get(customer_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Customer {} not found", customer_id)))?;

        let machines = self.machines.list_for_customer(customer_id).await?;
        let mut models: Vec<String> = machines
            .into_iter()
            // Retired machines no longer drive assignment.
            .filter(|m| m.status != MachineStatus::Retired)
            .map(|m| m.model)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        models.sort();
        if models.is_empty() {
            return Ok(0);
        }

        let matching = self
            .content
            .find_by_machine_models(&models, self.machine_match_case_insensitive)
            .await?;
        if matching.is_empty() {
            return Ok(0);
        }

        let metadata = AssignmentMetadata {
            assignment_type: AssignmentType::Automatic,
            assignment_reason: Some("Matched registered machine model".to_string()),
            ..Default::default()
        };
        let entries: Vec<NewLibraryEntry> = matching
            .iter()
            .map(|item| metadata.entry_for(customer_id, item.id))
            .collect();

        let created = self.library.insert_missing(entries).await?;
        if !created.is_empty() {
            tracing::info!(
                customer_id = %customer_id,
                created = created.len(),
                "Auto-assigned content by machine model"
            );
        }
        Ok(created.len())
    }

    pub async fn update_assignment(
        &self,
        entry_id: Uuid,
        updates: LibraryEntryUpdate,
    ) -> Result<ContentLibraryEntry, AppError> {
        self.library.update(entry_id, updates).await
    }

    /// Removal is by natural key; callers know (customer, video), not the
    /// surrogate entry id.
    pub async fn remove(&self, customer_id: Uuid, video_id: Uuid) -> Result<(), AppError> {
        self.library.remove(customer_id, video_id).await
    }

    pub async fn query(
        &self,
        customer_id: Uuid,
        filter: &LibraryFilter,
    ) -> Result<Vec<ContentSummary>, AppError> {
        self.library.query(customer_id, filter).await
    }
}
