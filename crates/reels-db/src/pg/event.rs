use async_trait::async_trait;

use reels_core::models::AnalyticsEvent;
use reels_core::AppError;

use crate::ports::EventStore;

use super::PgStore;

#[async_trait]
impl EventStore for PgStore {
    #[tracing::instrument(skip(self, event), fields(
        db.system = "postgresql",
        db.table = "analytics_events",
        db.operation = "insert",
        event_type = %event.event_type
    ))]
    async fn record(&self, event: AnalyticsEvent) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO analytics_events (id, user_id, video_id, event_type, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(event.id)
        .bind(event.user_id)
        .bind(event.video_id)
        .bind(event.event_type)
        .bind(event.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
