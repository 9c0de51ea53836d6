//! EventPublisher port - Interface for emitting domain events.
//!
//! Handlers emit events without knowing the transport (in-memory bus,
//! Redis pub/sub).

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
///
/// The envelope's `event_type` is the topic and `aggregate_id` the subject
/// the event is about.
///
/// # Example
///
/// ```ignore
/// let event = ReferralCodeUsed::new(user_id, code);
/// publisher.publish(EventEnvelope::from_event(&event)?).await?;
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event. Errors are returned to the caller.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;
}
