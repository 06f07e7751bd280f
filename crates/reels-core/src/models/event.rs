use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    View,
    Download,
    Access,
}

impl Display for EventType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            EventType::View => write!(f, "view"),
            EventType::Download => write!(f, "download"),
            EventType::Access => write!(f, "access"),
        }
    }
}

/// A fire-and-forget analytics event. Recording failures must never fail the
/// operation that emitted the event.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AnalyticsEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub video_id: Option<Uuid>,
    pub event_type: EventType,
    pub created_at: DateTime<Utc>,
}

impl AnalyticsEvent {
    pub fn new(user_id: Uuid, video_id: Option<Uuid>, event_type: EventType) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            video_id,
            event_type,
            created_at: Utc::now(),
        }
    }
}
