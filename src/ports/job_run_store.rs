//! Scheduled job bookkeeping port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp};

/// Remembers when each named job last completed successfully.
#[async_trait]
pub trait JobRunStore: Send + Sync {
    async fn last_successful_run(&self, job_name: &str) -> Result<Option<Timestamp>, DomainError>;

    /// Upserts the last successful run of `job_name`.
    async fn save_successful_run(&self, job_name: &str, at: Timestamp) -> Result<(), DomainError>;
}
