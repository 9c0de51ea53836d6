//! PostgreSQL implementation of JobRunStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::JobRunStore;

use super::database_error;

pub struct PostgresJobRunStore {
    pool: PgPool,
}

impl PostgresJobRunStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRunStore for PostgresJobRunStore {
    async fn last_successful_run(&self, job_name: &str) -> Result<Option<Timestamp>, DomainError> {
        let at: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT last_successful_run FROM job_runs WHERE job_name = $1")
                .bind(job_name)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("read job run", e))?;

        Ok(at.map(Timestamp::from_datetime))
    }

    async fn save_successful_run(&self, job_name: &str, at: Timestamp) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO job_runs (job_name, last_successful_run)
            VALUES ($1, $2)
            ON CONFLICT (job_name) DO UPDATE SET last_successful_run = EXCLUDED.last_successful_run
            "#,
        )
        .bind(job_name)
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("save job run", e))?;

        Ok(())
    }
}
