//! Redis adapters: job queues (lists) and domain event publishing (pub/sub).

mod event_publisher;
mod job_queue;

pub use event_publisher::RedisEventPublisher;
pub use job_queue::{RedisJobQueue, COUPON_USAGE_QUEUE_KEY, CRM_QUEUE_KEY};
