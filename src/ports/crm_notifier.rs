//! CRM notification port.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::domain::foundation::DomainError;

/// Enqueues marketing/CRM events for delivery by a background worker.
#[async_trait]
pub trait CrmNotifier: Send + Sync {
    /// Queue `template` for `email` with template variables `vars`.
    async fn enqueue(
        &self,
        email: &str,
        template: &str,
        vars: BTreeMap<String, String>,
    ) -> Result<(), DomainError>;
}
