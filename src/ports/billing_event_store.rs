//! Audit log of raw billing events.

use async_trait::async_trait;

use crate::domain::billing::BillingEvent;
use crate::domain::foundation::DomainError;

/// Append-only store for billing events as they were delivered.
///
/// Events are not unique-constrained; a redelivered event is appended again.
#[async_trait]
pub trait BillingEventStore: Send + Sync {
    async fn append(&self, event: &BillingEvent) -> Result<(), DomainError>;
}
