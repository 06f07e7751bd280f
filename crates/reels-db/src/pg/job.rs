use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use reels_core::models::{JobStatus, NewJob, ProcessingJob};
use reels_core::AppError;

use crate::ports::JobStore;

use super::PgStore;

#[async_trait]
impl JobStore for PgStore {
    #[tracing::instrument(skip(self, jobs), fields(
        db.system = "postgresql",
        db.table = "processing_jobs",
        db.operation = "insert",
        batch_size = jobs.len()
    ))]
    async fn create_batch(&self, jobs: Vec<NewJob>) -> Result<Vec<ProcessingJob>, AppError> {
        if jobs.is_empty() {
            return Err(AppError::InvalidInput(
                "Job batch must not be empty".to_string(),
            ));
        }
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO processing_jobs \
             (id, video_id, job_type, status, priority, payload, created_at, updated_at) ",
        );
        builder.push_values(&jobs, |mut row, job| {
            row.push_bind(Uuid::new_v4())
                .push_bind(job.video_id)
                .push_bind(job.job_type)
                .push_bind(JobStatus::Queued)
                .push_bind(job.priority.as_i32())
                .push_bind(job.payload.clone())
                .push("NOW()")
                .push("NOW()");
        });
        builder.push(" RETURNING *");
        let rows = builder
            .build_query_as::<ProcessingJob>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, batch_size = jobs.len(), "Failed to enqueue job batch");
                AppError::from(e)
            })?;
        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "processing_jobs",
        db.operation = "select"
    ))]
    async fn list_for_video(&self, video_id: Uuid) -> Result<Vec<ProcessingJob>, AppError> {
        let rows = sqlx::query_as::<_, ProcessingJob>(
            "SELECT * FROM processing_jobs WHERE video_id = $1 ORDER BY created_at",
        )
        .bind(video_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "processing_jobs",
        db.operation = "update"
    ))]
    async fn set_status(&self, job_id: Uuid, status: JobStatus) -> Result<ProcessingJob, AppError> {
        let row = sqlx::query_as::<_, ProcessingJob>(
            r#"
            UPDATE processing_jobs
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(job_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))?;
        Ok(row)
    }
}
