//! In-memory job run bookkeeping.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::JobRunStore;

#[derive(Default)]
pub struct InMemoryJobRunStore {
    runs: RwLock<HashMap<String, Timestamp>>,
}

impl InMemoryJobRunStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRunStore for InMemoryJobRunStore {
    async fn last_successful_run(&self, job_name: &str) -> Result<Option<Timestamp>, DomainError> {
        Ok(self
            .runs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(job_name)
            .copied())
    }

    async fn save_successful_run(&self, job_name: &str, at: Timestamp) -> Result<(), DomainError> {
        self.runs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(job_name.to_string(), at);
        Ok(())
    }
}
