//! PostgreSQL persistence backend
//!
//! One `PgStore` over a shared pool implements every port. Queries are
//! runtime-checked `query_as` against the schema in `migrations/`; enums are
//! stored as lowercase text and arrays as native Postgres arrays.

mod content;
mod customer;
mod event;
mod job;
mod library;
mod machine;

use sqlx::PgPool;

/// PostgreSQL-backed store implementing all persistence ports.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
