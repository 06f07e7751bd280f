use async_trait::async_trait;
use uuid::Uuid;

use reels_core::models::{Machine, NewMachine};
use reels_core::AppError;

use crate::ports::MachineStore;

use super::PgStore;

#[async_trait]
impl MachineStore for PgStore {
    #[tracing::instrument(skip(self, new), fields(
        db.system = "postgresql",
        db.table = "machines",
        db.operation = "insert"
    ))]
    async fn create(&self, new: NewMachine) -> Result<Machine, AppError> {
        let machine = sqlx::query_as::<_, Machine>(
            r#"
            INSERT INTO machines (id, customer_id, model, machine_type, location, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.customer_id)
        .bind(&new.model)
        .bind(&new.machine_type)
        .bind(&new.location)
        .bind(new.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(
                error = ?e,
                customer_id = %new.customer_id,
                model = %new.model,
                "Failed to create machine"
            );
            AppError::from(e)
        })?;
        Ok(machine)
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "machines",
        db.operation = "select"
    ))]
    async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Machine>, AppError> {
        let machines = sqlx::query_as::<_, Machine>(
            "SELECT * FROM machines WHERE customer_id = $1 ORDER BY created_at",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(machines)
    }
}
