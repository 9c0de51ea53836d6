//! Redis pub/sub event publisher.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::EventPublisher;

/// Publishes each envelope as JSON on a channel named after its event type.
#[derive(Clone)]
pub struct RedisEventPublisher {
    conn: MultiplexedConnection,
    channel_prefix: Option<String>,
}

impl RedisEventPublisher {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            channel_prefix: None,
        }
    }

    pub fn with_channel_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.channel_prefix = Some(prefix.into());
        self
    }

    fn channel(&self, event_type: &str) -> String {
        match &self.channel_prefix {
            Some(prefix) => format!("{}:{}", prefix, event_type),
            None => event_type.to_string(),
        }
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let channel = self.channel(&event.event_type);
        let message = serde_json::to_string(&event).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to encode event: {}", e),
            )
        })?;

        let mut conn = self.conn.clone();
        let receivers: i64 = conn
            .publish(&channel, message)
            .await
            .map_err(|e: redis::RedisError| {
                DomainError::new(ErrorCode::QueueError, format!("Failed to publish event: {}", e))
                    .with_detail("channel", channel.clone())
            })?;

        tracing::debug!(
            channel = %channel,
            event_id = %event.event_id,
            receivers,
            "Event published"
        );
        Ok(())
    }
}

impl std::fmt::Debug for RedisEventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisEventPublisher")
            .field("channel_prefix", &self.channel_prefix)
            .finish_non_exhaustive()
    }
}
