use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use reels_core::models::{
    ContentLibraryEntry, ContentSummary, LibraryEntryUpdate, LibraryFilter, LibrarySortKey,
    NewLibraryEntry, SortDirection,
};
use reels_core::AppError;

use crate::ports::LibraryStore;

use super::PgStore;

const INSERT_COLUMNS: &str = "(id, customer_id, video_id, assignment_type, assignment_reason, \
     featured, access_level, expires_at, assigned_by, assigned_at, updated_at)";

fn push_entry_values(builder: &mut QueryBuilder<'_, Postgres>, entries: &[NewLibraryEntry]) {
    builder.push_values(entries, |mut row, entry| {
        row.push_bind(Uuid::new_v4())
            .push_bind(entry.customer_id)
            .push_bind(entry.video_id)
            .push_bind(entry.assignment_type)
            .push_bind(entry.assignment_reason.clone())
            .push_bind(entry.featured)
            .push_bind(entry.access_level)
            .push_bind(entry.expires_at)
            .push_bind(entry.assigned_by)
            .push("NOW()")
            .push("NOW()");
    });
}

// Re-assigning an existing entry refreshes its metadata but keeps the
// original assigned_at, so "in my library since" stays stable.
const UPSERT_CONFLICT: &str = r#"
    ON CONFLICT (customer_id, video_id) DO UPDATE SET
        assignment_type = EXCLUDED.assignment_type,
        assignment_reason = EXCLUDED.assignment_reason,
        featured = EXCLUDED.featured,
        access_level = EXCLUDED.access_level,
        expires_at = EXCLUDED.expires_at,
        assigned_by = EXCLUDED.assigned_by,
        updated_at = NOW()
    RETURNING *
"#;

#[async_trait]
impl LibraryStore for PgStore {
    #[tracing::instrument(skip(self, entries), fields(
        db.system = "postgresql",
        db.table = "content_library_entries",
        db.operation = "upsert",
        batch_size = entries.len()
    ))]
    async fn upsert_many(
        &self,
        entries: Vec<NewLibraryEntry>,
    ) -> Result<Vec<ContentLibraryEntry>, AppError> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO content_library_entries {} ",
            INSERT_COLUMNS
        ));
        push_entry_values(&mut builder, &entries);
        builder.push(UPSERT_CONFLICT);
        let rows = builder
            .build_query_as::<ContentLibraryEntry>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, batch_size = entries.len(), "Library batch upsert failed");
                AppError::from(e)
            })?;
        Ok(rows)
    }

    #[tracing::instrument(skip(self, entry), fields(
        db.system = "postgresql",
        db.table = "content_library_entries",
        db.operation = "upsert",
        customer_id = %entry.customer_id,
        video_id = %entry.video_id
    ))]
    async fn upsert_one(&self, entry: NewLibraryEntry) -> Result<ContentLibraryEntry, AppError> {
        let sql = format!(
            r#"
            INSERT INTO content_library_entries {}
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW())
            {}
            "#,
            INSERT_COLUMNS, UPSERT_CONFLICT
        );
        let row = sqlx::query_as::<_, ContentLibraryEntry>(&sql)
            .bind(Uuid::new_v4())
            .bind(entry.customer_id)
            .bind(entry.video_id)
            .bind(entry.assignment_type)
            .bind(&entry.assignment_reason)
            .bind(entry.featured)
            .bind(entry.access_level)
            .bind(entry.expires_at)
            .bind(entry.assigned_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    #[tracing::instrument(skip(self, entries), fields(
        db.system = "postgresql",
        db.table = "content_library_entries",
        db.operation = "insert",
        batch_size = entries.len()
    ))]
    async fn insert_missing(
        &self,
        entries: Vec<NewLibraryEntry>,
    ) -> Result<Vec<ContentLibraryEntry>, AppError> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO content_library_entries {} ",
            INSERT_COLUMNS
        ));
        push_entry_values(&mut builder, &entries);
        // DO NOTHING + RETURNING yields only the rows actually created, which
        // is exactly the auto-assignment count.
        builder.push(" ON CONFLICT (customer_id, video_id) DO NOTHING RETURNING *");
        let rows = builder
            .build_query_as::<ContentLibraryEntry>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "content_library_entries",
        db.operation = "select"
    ))]
    async fn get(
        &self,
        customer_id: Uuid,
        video_id: Uuid,
    ) -> Result<Option<ContentLibraryEntry>, AppError> {
        let row = sqlx::query_as::<_, ContentLibraryEntry>(
            "SELECT * FROM content_library_entries WHERE customer_id = $1 AND video_id = $2",
        )
        .bind(customer_id)
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    #[tracing::instrument(skip(self, updates), fields(
        db.system = "postgresql",
        db.table = "content_library_entries",
        db.operation = "update"
    ))]
    async fn update(
        &self,
        entry_id: Uuid,
        updates: LibraryEntryUpdate,
    ) -> Result<ContentLibraryEntry, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE content_library_entries SET updated_at = NOW()");
        if let Some(reason) = &updates.assignment_reason {
            builder.push(", assignment_reason = ").push_bind(reason);
        }
        if let Some(featured) = updates.featured {
            builder.push(", featured = ").push_bind(featured);
        }
        if let Some(access_level) = updates.access_level {
            builder.push(", access_level = ").push_bind(access_level);
        }
        if let Some(expires_at) = updates.expires_at {
            builder.push(", expires_at = ").push_bind(expires_at);
        }
        builder.push(" WHERE id = ").push_bind(entry_id);
        builder.push(" RETURNING *");
        let row = builder
            .build_query_as::<ContentLibraryEntry>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Library entry {} not found", entry_id)))?;
        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "content_library_entries",
        db.operation = "delete"
    ))]
    async fn remove(&self, customer_id: Uuid, video_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "DELETE FROM content_library_entries WHERE customer_id = $1 AND video_id = $2",
        )
        .bind(customer_id)
        .bind(video_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "No library entry for customer {} and video {}",
                customer_id, video_id
            )));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, filter), fields(
        db.system = "postgresql",
        db.table = "content_library_entries",
        db.operation = "select"
    ))]
    async fn query(
        &self,
        customer_id: Uuid,
        filter: &LibraryFilter,
    ) -> Result<Vec<ContentSummary>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT
                cle.id AS entry_id,
                cle.customer_id,
                cle.video_id,
                v.title,
                v.description,
                v.duration_seconds,
                v.machine_models,
                v.process_type,
                v.tooling,
                v.skill_level,
                v.tags,
                v.status AS content_status,
                cle.assignment_type,
                cle.featured,
                cle.access_level,
                cle.expires_at,
                cle.assigned_at
            FROM content_library_entries cle
            JOIN videos v ON v.id = cle.video_id
            WHERE cle.customer_id = "#,
        );
        builder.push_bind(customer_id);

        if let Some(model) = &filter.machine_model {
            builder.push(" AND ").push_bind(model).push(" = ANY(v.machine_models)");
        }
        if let Some(process_type) = &filter.process_type {
            builder.push(" AND v.process_type = ").push_bind(process_type);
        }
        if let Some(tooling) = &filter.tooling {
            builder.push(" AND ").push_bind(tooling).push(" = ANY(v.tooling)");
        }
        if let Some(skill_level) = filter.skill_level {
            builder.push(" AND v.skill_level = ").push_bind(skill_level);
        }
        if let Some(tags) = &filter.tags {
            if !tags.is_empty() {
                builder.push(" AND v.tags && ").push_bind(tags.clone());
            }
        }
        if let Some(access_level) = filter.access_level {
            builder.push(" AND cle.access_level = ").push_bind(access_level);
        }
        if let Some(featured) = filter.featured {
            builder.push(" AND cle.featured = ").push_bind(featured);
        }
        if let Some(assignment_type) = filter.assignment_type {
            builder.push(" AND cle.assignment_type = ").push_bind(assignment_type);
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search);
            builder
                .push(" AND (v.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR v.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(after) = filter.assigned_after {
            builder.push(" AND cle.assigned_at >= ").push_bind(after);
        }
        if let Some(before) = filter.assigned_before {
            builder.push(" AND cle.assigned_at <= ").push_bind(before);
        }

        let sort_column = match filter.sort_by {
            LibrarySortKey::AssignedAt => "cle.assigned_at",
            LibrarySortKey::Title => "v.title",
            // Rank, not alphabetical: standard < premium < exclusive.
            LibrarySortKey::AccessLevel => {
                "CASE cle.access_level WHEN 'standard' THEN 0 WHEN 'premium' THEN 1 ELSE 2 END"
            }
        };
        let direction = match filter.sort_direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        builder.push(format!(" ORDER BY {} {}", sort_column, direction));

        if let Some(limit) = filter.limit {
            builder.push(" LIMIT ").push_bind(limit);
        }
        if let Some(offset) = filter.offset {
            builder.push(" OFFSET ").push_bind(offset);
        }

        let rows = builder
            .build_query_as::<ContentSummary>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, customer_id = %customer_id, "Library query failed");
                AppError::from(e)
            })?;
        Ok(rows)
    }
}
