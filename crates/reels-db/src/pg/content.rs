use async_trait::async_trait;
use uuid::Uuid;

use reels_core::models::{ContentItem, ContentStatus, NewContent};
use reels_core::AppError;

use crate::ports::ContentStore;

use super::PgStore;

#[async_trait]
impl ContentStore for PgStore {
    #[tracing::instrument(skip(self, new), fields(
        db.system = "postgresql",
        db.table = "videos",
        db.operation = "insert"
    ))]
    async fn create_draft(&self, new: NewContent) -> Result<ContentItem, AppError> {
        let item = sqlx::query_as::<_, ContentItem>(
            r#"
            INSERT INTO videos (
                id, title, description, duration_seconds, machine_models,
                process_type, tooling, skill_level, tags, content_type,
                file_size, status, uploaded_at, updated_at
            )
            VALUES ($1, $2, $3, 0, $4, $5, $6, $7, $8, $9, $10, 'draft', NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.machine_models)
        .bind(&new.process_type)
        .bind(&new.tooling)
        .bind(new.skill_level)
        .bind(&new.tags)
        .bind(&new.content_type)
        .bind(new.file_size)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, title = %new.title, "Failed to create draft video");
            AppError::from(e)
        })?;
        Ok(item)
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "videos",
        db.operation = "select"
    ))]
    async fn get(&self, id: Uuid) -> Result<Option<ContentItem>, AppError> {
        let item = sqlx::query_as::<_, ContentItem>("SELECT * FROM videos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "videos",
        db.operation = "update"
    ))]
    async fn set_storage(
        &self,
        id: Uuid,
        storage_key: &str,
        storage_url: &str,
        file_size: i64,
    ) -> Result<ContentItem, AppError> {
        let item = sqlx::query_as::<_, ContentItem>(
            r#"
            UPDATE videos
            SET storage_key = $2, storage_url = $3, file_size = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(storage_key)
        .bind(storage_url)
        .bind(file_size)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;
        Ok(item)
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "videos",
        db.operation = "update"
    ))]
    async fn set_status(&self, id: Uuid, status: ContentStatus) -> Result<ContentItem, AppError> {
        let item = sqlx::query_as::<_, ContentItem>(
            r#"
            UPDATE videos
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;
        Ok(item)
    }

    #[tracing::instrument(skip(self, models), fields(
        db.system = "postgresql",
        db.table = "videos",
        db.operation = "select",
        model_count = models.len()
    ))]
    async fn find_by_machine_models(
        &self,
        models: &[String],
        case_insensitive: bool,
    ) -> Result<Vec<ContentItem>, AppError> {
        // Array overlap for the exact case; for the case-insensitive flag both
        // sides are lowered element-wise.
        let sql = if case_insensitive {
            r#"
            SELECT * FROM videos
            WHERE EXISTS (
                SELECT 1 FROM unnest(machine_models) AS m
                WHERE LOWER(m) = ANY(SELECT LOWER(q) FROM unnest($1::text[]) AS q)
            )
            "#
        } else {
            "SELECT * FROM videos WHERE machine_models && $1"
        };
        let items = sqlx::query_as::<_, ContentItem>(sql)
            .bind(models)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }
}
