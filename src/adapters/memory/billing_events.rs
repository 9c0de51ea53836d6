//! In-memory billing event audit log.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::billing::BillingEvent;
use crate::domain::foundation::DomainError;
use crate::ports::BillingEventStore;

#[derive(Default)]
pub struct InMemoryBillingEventStore {
    events: RwLock<Vec<BillingEvent>>,
}

impl InMemoryBillingEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BillingEvent> {
        self.events
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl BillingEventStore for InMemoryBillingEventStore {
    async fn append(&self, event: &BillingEvent) -> Result<(), DomainError> {
        self.events
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
        Ok(())
    }
}
