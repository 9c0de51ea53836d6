//! Redis list backed job queue.
//!
//! Jobs are JSON documents RPUSHed onto a list; workers BLPOP them.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::charge::Charge;
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::ports::{CouponUsageQueue, CrmNotifier};

/// Default list the CRM worker consumes.
pub const CRM_QUEUE_KEY: &str = "jobs:crm-events";

/// Default list the coupon usage worker consumes.
pub const COUPON_USAGE_QUEUE_KEY: &str = "jobs:coupon-usage";

#[derive(Debug, Serialize)]
struct CrmJob<'a> {
    email: &'a str,
    template: &'a str,
    vars: &'a BTreeMap<String, String>,
    enqueued_at: Timestamp,
}

#[derive(Debug, Serialize)]
struct CouponUsageJob<'a> {
    charge: &'a Charge,
    enqueued_at: Timestamp,
}

/// Job queue over Redis lists. Implements both outbound queues.
#[derive(Clone)]
pub struct RedisJobQueue {
    conn: MultiplexedConnection,
    crm_key: String,
    coupon_usage_key: String,
}

impl RedisJobQueue {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            crm_key: CRM_QUEUE_KEY.to_string(),
            coupon_usage_key: COUPON_USAGE_QUEUE_KEY.to_string(),
        }
    }

    /// Prefix both list keys, e.g. with a deployment name.
    pub fn with_key_prefix(mut self, prefix: &str) -> Self {
        self.crm_key = format!("{}:{}", prefix, CRM_QUEUE_KEY);
        self.coupon_usage_key = format!("{}:{}", prefix, COUPON_USAGE_QUEUE_KEY);
        self
    }

    async fn push(&self, key: &str, jobs: Vec<String>) -> Result<(), DomainError> {
        if jobs.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        conn.rpush::<_, _, ()>(key, jobs)
            .await
            .map_err(|e: redis::RedisError| {
                DomainError::new(ErrorCode::QueueError, format!("Failed to enqueue job: {}", e))
                    .with_detail("queue", key)
            })
    }
}

fn encode<T: Serialize>(job: &T) -> Result<String, DomainError> {
    serde_json::to_string(job).map_err(|e| {
        DomainError::new(ErrorCode::InternalError, format!("Failed to encode job: {}", e))
    })
}

#[async_trait]
impl CrmNotifier for RedisJobQueue {
    async fn enqueue(
        &self,
        email: &str,
        template: &str,
        vars: BTreeMap<String, String>,
    ) -> Result<(), DomainError> {
        let job = encode(&CrmJob {
            email,
            template,
            vars: &vars,
            enqueued_at: Timestamp::now(),
        })?;
        self.push(&self.crm_key, vec![job]).await
    }
}

#[async_trait]
impl CouponUsageQueue for RedisJobQueue {
    async fn enqueue(&self, charges: &[Charge]) -> Result<(), DomainError> {
        let enqueued_at = Timestamp::now();
        let jobs = charges
            .iter()
            .map(|charge| encode(&CouponUsageJob { charge, enqueued_at }))
            .collect::<Result<Vec<_>, _>>()?;
        self.push(&self.coupon_usage_key, jobs).await
    }
}

impl std::fmt::Debug for RedisJobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisJobQueue")
            .field("crm_key", &self.crm_key)
            .field("coupon_usage_key", &self.coupon_usage_key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::coupon::CouponAttribution;
    use crate::domain::foundation::{PlanId, UserId};

    // Queue round trips need a running Redis and are not exercised here.

    #[test]
    fn crm_job_serializes_template_and_vars() {
        let vars = BTreeMap::from([("userName".to_string(), "Ana".to_string())]);
        let json = encode(&CrmJob {
            email: "ana@example.com",
            template: "payment-success",
            vars: &vars,
            enqueued_at: Timestamp::now(),
        })
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["template"], "payment-success");
        assert_eq!(value["vars"]["userName"], "Ana");
    }

    #[test]
    fn coupon_usage_job_embeds_charge() {
        let charge = Charge::for_purchase(
            UserId::new("user-1").unwrap(),
            PlanId::new("annual").unwrap(),
            Timestamp::now(),
            &CouponAttribution::none(),
        );
        let json = encode(&CouponUsageJob {
            charge: &charge,
            enqueued_at: Timestamp::now(),
        })
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["charge"]["user_id"], "user-1");
    }
}
