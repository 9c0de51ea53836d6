//! Billing event processing errors.
//!
//! Every variant here is fatal for the delivery: it reaches the webhook
//! caller so the provider can retry. Non-fatal problems (coupon mismatches,
//! post-purchase side effects) never become a `BillingEventError`.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | UserNotFound | 404 |
//! | PlanNotFound | 404 |
//! | EnvironmentMismatch | 409 |
//! | InvalidPayload | 400 |
//! | Persistence | 500 |
//! | Infrastructure | 500 |

use std::fmt;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};

use super::BillingEnvironment;

/// How a plan lookup was attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanLookup {
    /// Explicit partner plan id from subscriber attributes.
    Partner(String),
    /// Provider product id matched against plan aliases.
    ProductAlias(String),
}

impl fmt::Display for PlanLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanLookup::Partner(id) => write!(f, "planPartner: {}", id),
            PlanLookup::ProductAlias(product_id) => write!(f, "app store alias: {}", product_id),
        }
    }
}

/// Errors that abort processing of a billing event.
#[derive(Debug, Clone, PartialEq)]
pub enum BillingEventError {
    /// The event references a user that does not exist.
    UserNotFound(UserId),

    /// No plan matches the event.
    PlanNotFound(PlanLookup),

    /// The event was produced in a different environment than this deployment serves.
    EnvironmentMismatch {
        event: BillingEnvironment,
        deployment: BillingEnvironment,
    },

    /// The webhook body could not be understood.
    InvalidPayload(String),

    /// A store rejected a write the event depends on. Carries the store's
    /// error unchanged.
    Persistence(DomainError),

    /// Any other infrastructure failure.
    Infrastructure(String),
}

impl BillingEventError {
    pub fn user_not_found(user_id: UserId) -> Self {
        BillingEventError::UserNotFound(user_id)
    }

    pub fn plan_not_found(lookup: PlanLookup) -> Self {
        BillingEventError::PlanNotFound(lookup)
    }

    pub fn environment_mismatch(event: BillingEnvironment, deployment: BillingEnvironment) -> Self {
        BillingEventError::EnvironmentMismatch { event, deployment }
    }

    pub fn invalid_payload(reason: impl Into<String>) -> Self {
        BillingEventError::InvalidPayload(reason.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BillingEventError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BillingEventError::UserNotFound(_) => ErrorCode::UserNotFound,
            BillingEventError::PlanNotFound(_) => ErrorCode::PlanNotFound,
            BillingEventError::EnvironmentMismatch { .. } => ErrorCode::EnvironmentMismatch,
            BillingEventError::InvalidPayload(_) => ErrorCode::InvalidPayload,
            BillingEventError::Persistence(err) => err.code,
            BillingEventError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    /// Returns a human readable message.
    pub fn message(&self) -> String {
        match self {
            BillingEventError::UserNotFound(id) => format!("User not found: {}", id),
            BillingEventError::PlanNotFound(lookup) => {
                format!("There's no plan for {}", lookup)
            }
            BillingEventError::EnvironmentMismatch { event, deployment } => format!(
                "Event environment {} does not match deployment environment {}",
                event, deployment
            ),
            BillingEventError::InvalidPayload(reason) => {
                format!("Invalid billing event payload: {}", reason)
            }
            BillingEventError::Persistence(err) => err.message.clone(),
            BillingEventError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if the provider should retry the delivery.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BillingEventError::Persistence(_) | BillingEventError::Infrastructure(_)
        )
    }
}

impl fmt::Display for BillingEventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for BillingEventError {}

impl From<DomainError> for BillingEventError {
    fn from(err: DomainError) -> Self {
        BillingEventError::Persistence(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_not_found_names_partner_id() {
        let err = BillingEventError::plan_not_found(PlanLookup::Partner("partner-9".to_string()));
        assert_eq!(err.message(), "There's no plan for planPartner: partner-9");
        assert_eq!(err.code(), ErrorCode::PlanNotFound);
    }

    #[test]
    fn plan_not_found_names_product_id() {
        let err =
            BillingEventError::plan_not_found(PlanLookup::ProductAlias("annual_v2".to_string()));
        assert_eq!(err.message(), "There's no plan for app store alias: annual_v2");
    }

    #[test]
    fn persistence_keeps_original_error() {
        let original = DomainError::database("connection reset");
        let err: BillingEventError = original.clone().into();

        assert_eq!(err, BillingEventError::Persistence(original));
        assert_eq!(err.code(), ErrorCode::DatabaseError);
        assert!(err.is_retryable());
    }

    #[test]
    fn environment_mismatch_is_not_retryable() {
        let err = BillingEventError::environment_mismatch(
            BillingEnvironment::Sandbox,
            BillingEnvironment::Production,
        );
        assert_eq!(err.code(), ErrorCode::EnvironmentMismatch);
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("SANDBOX"));
    }

    #[test]
    fn user_not_found_displays_id() {
        let err = BillingEventError::user_not_found(UserId::new("user-1").unwrap());
        assert_eq!(err.to_string(), "User not found: user-1");
    }
}
