//! Content library models
//!
//! The content library is the many-to-many relationship between customers and
//! videos. `ContentLibraryEntry` is the join record; at most one active entry
//! exists per (customer_id, video_id) pair, and assignment operations must
//! upsert rather than duplicate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

use super::content::{ContentStatus, SkillLevel};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssignmentType {
    Manual,
    Automatic,
    Subscription,
}

impl Display for AssignmentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AssignmentType::Manual => write!(f, "manual"),
            AssignmentType::Automatic => write!(f, "automatic"),
            AssignmentType::Subscription => write!(f, "subscription"),
        }
    }
}

impl FromStr for AssignmentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(AssignmentType::Manual),
            "automatic" => Ok(AssignmentType::Automatic),
            "subscription" => Ok(AssignmentType::Subscription),
            _ => Err(anyhow::anyhow!("Invalid assignment type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, PartialOrd, Ord)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Standard,
    Premium,
    Exclusive,
}

impl Display for AccessLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AccessLevel::Standard => write!(f, "standard"),
            AccessLevel::Premium => write!(f, "premium"),
            AccessLevel::Exclusive => write!(f, "exclusive"),
        }
    }
}

impl FromStr for AccessLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(AccessLevel::Standard),
            "premium" => Ok(AccessLevel::Premium),
            "exclusive" => Ok(AccessLevel::Exclusive),
            _ => Err(anyhow::anyhow!("Invalid access level: {}", s)),
        }
    }
}

/// The assignment record linking a customer to a specific video.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContentLibraryEntry {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub video_id: Uuid,
    pub assignment_type: AssignmentType,
    pub assignment_reason: Option<String>,
    pub featured: bool,
    pub access_level: AccessLevel,
    pub expires_at: Option<DateTime<Utc>>,
    pub assigned_by: Option<Uuid>,
    pub assigned_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentLibraryEntry {
    /// An expired entry is an implicit revocation even if the row has not
    /// been purged yet.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}

/// Insert shape for a library entry upsert, keyed on (customer_id, video_id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLibraryEntry {
    pub customer_id: Uuid,
    pub video_id: Uuid,
    pub assignment_type: AssignmentType,
    pub assignment_reason: Option<String>,
    pub featured: bool,
    pub access_level: AccessLevel,
    pub expires_at: Option<DateTime<Utc>>,
    pub assigned_by: Option<Uuid>,
}

/// Metadata shared by all entries created in one `assign` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentMetadata {
    pub assignment_type: AssignmentType,
    pub assignment_reason: Option<String>,
    pub featured: bool,
    pub access_level: AccessLevel,
    pub expires_at: Option<DateTime<Utc>>,
    pub assigned_by: Option<Uuid>,
}

impl Default for AssignmentMetadata {
    fn default() -> Self {
        Self {
            assignment_type: AssignmentType::Manual,
            assignment_reason: None,
            featured: false,
            access_level: AccessLevel::Standard,
            expires_at: None,
            assigned_by: None,
        }
    }
}

impl AssignmentMetadata {
    /// Build the insert shape for one video under this metadata.
    pub fn entry_for(&self, customer_id: Uuid, video_id: Uuid) -> NewLibraryEntry {
        NewLibraryEntry {
            customer_id,
            video_id,
            assignment_type: self.assignment_type,
            assignment_reason: self.assignment_reason.clone(),
            featured: self.featured,
            access_level: self.access_level,
            expires_at: self.expires_at,
            assigned_by: self.assigned_by,
        }
    }
}

/// Partial update for an existing entry; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryEntryUpdate {
    pub assignment_reason: Option<String>,
    pub featured: Option<bool>,
    pub access_level: Option<AccessLevel>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LibrarySortKey {
    #[default]
    AssignedAt,
    Title,
    AccessLevel,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Filter for library queries. All predicates are ANDed; the tag predicate
/// uses overlap semantics (at least one filter tag present on the item).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryFilter {
    pub machine_model: Option<String>,
    pub process_type: Option<String>,
    pub tooling: Option<String>,
    pub skill_level: Option<SkillLevel>,
    pub tags: Option<Vec<String>>,
    pub access_level: Option<AccessLevel>,
    pub featured: Option<bool>,
    pub assignment_type: Option<AssignmentType>,
    /// Free-text search over title and description.
    pub search: Option<String>,
    pub assigned_after: Option<DateTime<Utc>>,
    pub assigned_before: Option<DateTime<Utc>>,
    pub sort_by: LibrarySortKey,
    pub sort_direction: SortDirection,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

/// Flattened query result joining an entry with its content item.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContentSummary {
    pub entry_id: Uuid,
    pub customer_id: Uuid,
    pub video_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub duration_seconds: f64,
    pub machine_models: Vec<String>,
    pub process_type: Option<String>,
    pub tooling: Vec<String>,
    pub skill_level: Option<SkillLevel>,
    pub tags: Vec<String>,
    pub content_status: ContentStatus,
    pub assignment_type: AssignmentType,
    pub featured: bool,
    pub access_level: AccessLevel,
    pub expires_at: Option<DateTime<Utc>>,
    pub assigned_at: DateTime<Utc>,
}

impl ContentSummary {
    pub fn from_parts(entry: &ContentLibraryEntry, content: &super::content::ContentItem) -> Self {
        Self {
            entry_id: entry.id,
            customer_id: entry.customer_id,
            video_id: entry.video_id,
            title: content.title.clone(),
            description: content.description.clone(),
            duration_seconds: content.duration_seconds,
            machine_models: content.machine_models.clone(),
            process_type: content.process_type.clone(),
            tooling: content.tooling.clone(),
            skill_level: content.skill_level,
            tags: content.tags.clone(),
            content_status: content.status,
            assignment_type: entry.assignment_type,
            featured: entry.featured,
            access_level: entry.access_level,
            expires_at: entry.expires_at,
            assigned_at: entry.assigned_at,
        }
    }
}
