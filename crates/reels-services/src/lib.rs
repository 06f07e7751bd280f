//! Reels business services
//!
//! The access-scope resolver, the content assignment engine, and the
//! analytics sink. Services are constructed once at startup over the
//! persistence ports and shared by reference.

pub mod access;
pub mod analytics;
pub mod assignment;

pub use access::{AccessResolver, PermissionCache};
pub use analytics::AnalyticsService;
pub use assignment::{
    AssignmentEngine, AssignmentFailure, AssignmentOutcome, BulkAssignReport, BulkAssignRequest,
};
