pub mod engine;
pub mod types;

pub use engine::AssignmentEngine;
pub use types::{AssignmentFailure, AssignmentOutcome, BulkAssignReport, BulkAssignRequest};
