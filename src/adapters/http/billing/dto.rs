//! Data Transfer Objects for the billing HTTP API.

use serde::Serialize;

use crate::application::handlers::billing::{HandleBillingEventResult, PurchaseOutcome};
use crate::application::handlers::coupon::ProcessCouponUsageResult;
use crate::domain::coupon::CouponAttribution;
use crate::domain::foundation::Timestamp;

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response to an accepted webhook delivery.
#[derive(Debug, Clone, Serialize)]
pub struct BillingEventResponse {
    /// What the event did: `unsubscribed`, `refunded`, `resubscribed`,
    /// `expired`, `purchase_processed` or `ignored`.
    pub outcome: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Set for ignored events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase: Option<PurchaseResponse>,
}

impl BillingEventResponse {
    fn for_user(outcome: &'static str, user_id: impl ToString) -> Self {
        Self {
            outcome,
            user_id: Some(user_id.to_string()),
            event_type: None,
            purchase: None,
        }
    }
}

impl From<HandleBillingEventResult> for BillingEventResponse {
    fn from(result: HandleBillingEventResult) -> Self {
        match result {
            HandleBillingEventResult::Unsubscribed { user_id } => {
                Self::for_user("unsubscribed", user_id)
            }
            HandleBillingEventResult::Refunded { user_id } => Self::for_user("refunded", user_id),
            HandleBillingEventResult::Resubscribed { user_id } => {
                Self::for_user("resubscribed", user_id)
            }
            HandleBillingEventResult::Expired { user_id } => Self::for_user("expired", user_id),
            HandleBillingEventResult::PurchaseProcessed(outcome) => Self {
                outcome: "purchase_processed",
                user_id: None,
                event_type: None,
                purchase: Some(PurchaseResponse::from(*outcome)),
            },
            HandleBillingEventResult::Ignored { event_type } => Self {
                outcome: "ignored",
                user_id: None,
                event_type: Some(event_type),
                purchase: None,
            },
        }
    }
}

/// Summary of a recorded purchase.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseResponse {
    pub charge_id: String,
    pub plan_id: String,
    pub action: &'static str,
    pub agent: &'static str,
    pub is_new_plan: bool,
    pub coupon: CouponAttribution,
    pub referral_emitted: bool,
    /// Post-purchase actions that failed and were only reported.
    pub failed_steps: Vec<&'static str>,
}

impl From<PurchaseOutcome> for PurchaseResponse {
    fn from(outcome: PurchaseOutcome) -> Self {
        Self {
            charge_id: outcome.charge_id.to_string(),
            plan_id: outcome.plan_id.to_string(),
            action: outcome.action.as_str(),
            agent: outcome.agent.as_str(),
            is_new_plan: outcome.is_new_plan,
            coupon: outcome.attribution,
            referral_emitted: outcome.post_purchase.referral_emitted,
            failed_steps: outcome.post_purchase.failed_steps,
        }
    }
}

/// Response to a coupon usage job run.
#[derive(Debug, Clone, Serialize)]
pub struct CouponUsageJobResponse {
    pub window_start: Timestamp,
    pub window_end: Timestamp,
    pub enqueued: usize,
}

impl From<ProcessCouponUsageResult> for CouponUsageJobResponse {
    fn from(result: ProcessCouponUsageResult) -> Self {
        Self {
            window_start: result.window.start,
            window_end: result.window.end,
            enqueued: result.enqueued,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Response
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Set when the failure is transient and a redelivery may succeed.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
