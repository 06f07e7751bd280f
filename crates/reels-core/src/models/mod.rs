pub mod content;
pub mod customer;
pub mod event;
pub mod job;
pub mod library;
pub mod machine;
pub mod user;

pub use content::{ContentItem, ContentStatus, NewContent, SkillLevel};
pub use customer::{Customer, CustomerStatus, NewCustomer, SubscriptionTier};
pub use event::{AnalyticsEvent, EventType};
pub use job::{
    JobPayload, JobStatus, JobType, NewJob, Priority, ProcessingJob, ThumbnailPayload,
    TranscodePayload, TranscribePayload,
};
pub use library::{
    AccessLevel, AssignmentMetadata, AssignmentType, ContentLibraryEntry, ContentSummary,
    LibraryEntryUpdate, LibraryFilter, LibrarySortKey, NewLibraryEntry, SortDirection,
};
pub use machine::{Machine, MachineStatus, NewMachine};
pub use user::{role_permissions, CurrentUser, Permission, UserRole};
