use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    /// Record created, upload not yet finalized.
    Draft,
    /// Upload finalized, processing jobs queued.
    Pending,
    /// Processing complete, playable.
    Ready,
    /// Upload or processing failed; kept for operator inspection.
    Failed,
}

impl Display for ContentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ContentStatus::Draft => write!(f, "draft"),
            ContentStatus::Pending => write!(f, "pending"),
            ContentStatus::Ready => write!(f, "ready"),
            ContentStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for ContentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ContentStatus::Draft),
            "pending" => Ok(ContentStatus::Pending),
            "ready" => Ok(ContentStatus::Ready),
            "failed" => Ok(ContentStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid content status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl Display for SkillLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SkillLevel::Beginner => write!(f, "beginner"),
            SkillLevel::Intermediate => write!(f, "intermediate"),
            SkillLevel::Advanced => write!(f, "advanced"),
        }
    }
}

impl FromStr for SkillLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(SkillLevel::Beginner),
            "intermediate" => Ok(SkillLevel::Intermediate),
            "advanced" => Ok(SkillLevel::Advanced),
            _ => Err(anyhow::anyhow!("Invalid skill level: {}", s)),
        }
    }
}

/// A training video record.
///
/// `duration_seconds` is filled in by post-upload processing, not by the
/// uploader; freshly created records carry zero duration.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContentItem {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub duration_seconds: f64,
    pub machine_models: Vec<String>,
    pub process_type: Option<String>,
    pub tooling: Vec<String>,
    pub skill_level: Option<SkillLevel>,
    pub tags: Vec<String>,
    pub content_type: String,
    pub file_size: i64,
    pub status: ContentStatus,
    pub storage_key: Option<String>,
    pub storage_url: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentItem {
    /// Whether any of this item's machine models matches `model`.
    pub fn matches_machine_model(&self, model: &str, case_insensitive: bool) -> bool {
        if case_insensitive {
            self.machine_models
                .iter()
                .any(|m| m.eq_ignore_ascii_case(model))
        } else {
            self.machine_models.iter().any(|m| m == model)
        }
    }
}

/// Insert shape for a draft content record created at upload start.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewContent {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    #[validate(length(max = 2000, message = "Description too long"))]
    pub description: Option<String>,
    pub machine_models: Vec<String>,
    pub process_type: Option<String>,
    pub tooling: Vec<String>,
    pub skill_level: Option<SkillLevel>,
    pub tags: Vec<String>,
    #[validate(length(min = 1, message = "Content type is required"))]
    pub content_type: String,
    pub file_size: i64,
}
