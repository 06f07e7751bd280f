use async_trait::async_trait;
use uuid::Uuid;

use reels_core::models::{Customer, CustomerStatus, NewCustomer};
use reels_core::AppError;

use crate::ports::CustomerStore;

use super::PgStore;

#[async_trait]
impl CustomerStore for PgStore {
    #[tracing::instrument(skip(self, new), fields(
        db.system = "postgresql",
        db.table = "customers",
        db.operation = "insert"
    ))]
    async fn create(&self, new: NewCustomer) -> Result<Customer, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (
                id, name, contact_email, subscription_tier, status,
                max_seats, max_storage_gb, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.contact_email)
        .bind(new.subscription_tier)
        .bind(new.status)
        .bind(new.max_seats)
        .bind(new.max_storage_gb)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, name = %new.name, "Failed to create customer");
            AppError::from(e)
        })?;
        Ok(customer)
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "customers",
        db.operation = "select"
    ))]
    async fn get(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "customers",
        db.operation = "select"
    ))]
    async fn find_by_company(&self, company: &str) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE LOWER(name) = LOWER($1)",
        )
        .bind(company)
        .fetch_optional(&self.pool)
        .await?;
        Ok(customer)
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "customers",
        db.operation = "update"
    ))]
    async fn set_status(&self, id: Uuid, status: CustomerStatus) -> Result<Customer, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Customer {} not found", id)))?;
        Ok(customer)
    }
}
