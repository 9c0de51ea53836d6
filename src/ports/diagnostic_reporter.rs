//! Non-fatal diagnostics port.

use std::collections::BTreeMap;

use crate::domain::foundation::UserId;

/// A problem worth surfacing that does not fail the current operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Where the problem was found, e.g. `coupon_attribution`.
    pub context: String,
    pub user_id: Option<UserId>,
    pub message: String,
    pub details: BTreeMap<String, String>,
}

impl Diagnostic {
    pub fn new(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            user_id: None,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn for_user(mut self, user_id: &UserId) -> Self {
        self.user_id = Some(user_id.clone());
        self
    }

    pub fn with_details(mut self, details: BTreeMap<String, String>) -> Self {
        self.details.extend(details);
        self
    }
}

/// Channel for non-fatal diagnostics.
///
/// Reporting is synchronous and infallible so it can be called from any
/// error path.
pub trait DiagnosticReporter: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}
