//! PostgreSQL implementation of BillingEventStore.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::billing::BillingEvent;
use crate::domain::foundation::DomainError;
use crate::ports::BillingEventStore;

use super::database_error;

/// Append-only log of raw provider events.
///
/// The provider may redeliver an event, so `event_id` is not unique here.
pub struct PostgresBillingEventStore {
    pool: PgPool,
}

impl PostgresBillingEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BillingEventStore for PostgresBillingEventStore {
    async fn append(&self, event: &BillingEvent) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO billing_events (event_id, event_type, environment, user_id, payload)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&event.id)
        .bind(event.event_type.as_str())
        .bind(event.environment.to_string())
        .bind(&event.user_id)
        .bind(&event.raw)
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("append billing event", e))?;

        Ok(())
    }
}
