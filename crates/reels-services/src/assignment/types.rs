use serde::{Deserialize, Serialize};
use uuid::Uuid;

use reels_core::models::{AssignmentMetadata, ContentLibraryEntry};

/// One video that could not be assigned, with the error that stopped it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentFailure {
    pub video_id: Uuid,
    pub error: String,
}

/// Per-item outcome of a single `assign` call. Partial success is expected,
/// not exceptional.
#[derive(Debug, Clone, Default)]
pub struct AssignmentOutcome {
    pub assigned: Vec<ContentLibraryEntry>,
    pub failed: Vec<AssignmentFailure>,
}

impl AssignmentOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One customer's slice of a bulk assignment.
#[derive(Debug, Clone)]
pub struct BulkAssignRequest {
    pub customer_id: Uuid,
    pub video_ids: Vec<Uuid>,
    pub metadata: AssignmentMetadata,
}

/// Aggregate outcome of a bulk assignment: succeeded and failed items plus
/// the count of entries created by follow-up auto-assignment.
#[derive(Debug, Clone, Default)]
pub struct BulkAssignReport {
    pub successful: Vec<ContentLibraryEntry>,
    pub failed: Vec<AssignmentFailure>,
    pub auto_assigned: usize,
}

impl BulkAssignReport {
    pub fn successful_count(&self) -> usize {
        self.successful.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}
