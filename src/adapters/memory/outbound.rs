//! In-memory outbound adapters: CRM queue, coupon usage queue,
//! subscriber attribute client and diagnostics sink.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::domain::charge::Charge;
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::{
    CouponUsageQueue, CrmNotifier, Diagnostic, DiagnosticReporter, SubscriberAttributeClient,
};

/// A CRM notification captured by [`InMemoryCrmNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmNotification {
    pub email: String,
    pub template: String,
    pub vars: BTreeMap<String, String>,
}

#[derive(Default)]
pub struct InMemoryCrmNotifier {
    sent: RwLock<Vec<CrmNotification>>,
}

impl InMemoryCrmNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<CrmNotification> {
        self.sent.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl CrmNotifier for InMemoryCrmNotifier {
    async fn enqueue(
        &self,
        email: &str,
        template: &str,
        vars: BTreeMap<String, String>,
    ) -> Result<(), DomainError> {
        self.sent
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(CrmNotification {
                email: email.to_string(),
                template: template.to_string(),
                vars,
            });
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCouponUsageQueue {
    enqueued: RwLock<Vec<Charge>>,
}

impl InMemoryCouponUsageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueued(&self) -> Vec<Charge> {
        self.enqueued
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl CouponUsageQueue for InMemoryCouponUsageQueue {
    async fn enqueue(&self, charges: &[Charge]) -> Result<(), DomainError> {
        self.enqueued
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(charges);
        Ok(())
    }
}

/// Records which users had their referral attribute cleared.
#[derive(Default)]
pub struct InMemorySubscriberAttributeClient {
    cleared: RwLock<Vec<UserId>>,
}

impl InMemorySubscriberAttributeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cleared(&self) -> Vec<UserId> {
        self.cleared
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl SubscriberAttributeClient for InMemorySubscriberAttributeClient {
    async fn clear_referral_attribute(&self, user_id: &UserId) {
        self.cleared
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(user_id.clone());
    }
}

/// Collects diagnostics for assertions.
#[derive(Default)]
pub struct InMemoryDiagnosticReporter {
    reported: RwLock<Vec<Diagnostic>>,
}

impl InMemoryDiagnosticReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reported(&self) -> Vec<Diagnostic> {
        self.reported
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn reported_in(&self, context: &str) -> Vec<Diagnostic> {
        self.reported()
            .into_iter()
            .filter(|d| d.context == context)
            .collect()
    }
}

impl DiagnosticReporter for InMemoryDiagnosticReporter {
    fn report(&self, diagnostic: Diagnostic) {
        self.reported
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(diagnostic);
    }
}
