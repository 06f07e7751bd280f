//! Analytics event sink
//!
//! Fire-and-forget: a failed write is logged and swallowed so it can never
//! fail the operation that emitted the event.

use std::sync::Arc;
use uuid::Uuid;

use reels_core::models::{AnalyticsEvent, EventType};
use reels_db::ports::EventStore;

#[derive(Clone)]
pub struct AnalyticsService {
    events: Arc<dyn EventStore>,
}

impl AnalyticsService {
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        Self { events }
    }

    pub async fn record_access(&self, user_id: Uuid, video_id: Option<Uuid>) {
        self.record(AnalyticsEvent::new(user_id, video_id, EventType::Access))
            .await;
    }

    pub async fn record_view(&self, user_id: Uuid, video_id: Uuid) {
        self.record(AnalyticsEvent::new(user_id, Some(video_id), EventType::View))
            .await;
    }

    pub async fn record_download(&self, user_id: Uuid, video_id: Uuid) {
        self.record(AnalyticsEvent::new(
            user_id,
            Some(video_id),
            EventType::Download,
        ))
        .await;
    }

    async fn record(&self, event: AnalyticsEvent) {
        if let Err(e) = self.events.record(event.clone()).await {
            tracing::warn!(
                user_id = %event.user_id,
                event_type = %event.event_type,
                error = ?e,
                "Failed to record analytics event"
            );
        }
    }
}
