//! User subscription state as seen by the billing engine.

use serde::{Deserialize, Serialize};

use crate::domain::coupon::CouponType;
use crate::domain::foundation::{PlanId, Timestamp, UserId};

/// Who bills the subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionManagementType {
    /// Billed by us directly.
    Internal,
    /// Billed through an app store via the billing provider.
    #[default]
    External,
}

impl SubscriptionManagementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionManagementType::Internal => "INTERNAL",
            SubscriptionManagementType::External => "EXTERNAL",
        }
    }
}

/// The user's active plan and its validity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentSubscription {
    pub plan_id: PlanId,
    pub start_date: Timestamp,
    pub expiration_date: Timestamp,
    pub auto_renew: bool,
    pub management_type: SubscriptionManagementType,
}

/// Coupon the user is tracked as about to redeem.
///
/// Written by the checkout flow before the store purchase completes and
/// cleared after every processed purchase. The type is stored as written so
/// unexpected values can be reported instead of rejected at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OngoingCoupon {
    pub code: String,
    #[serde(rename = "type")]
    pub coupon_type: String,
    #[serde(default)]
    pub group: Option<String>,
}

impl OngoingCoupon {
    pub fn new(code: impl Into<String>, coupon_type: CouponType, group: Option<String>) -> Self {
        Self {
            code: code.into(),
            coupon_type: coupon_type.to_string(),
            group,
        }
    }

    /// Parsed coupon type, `None` if the stored value is not recognised.
    pub fn parsed_type(&self) -> Option<CouponType> {
        self.coupon_type.parse().ok()
    }
}

/// A user account. Owned by the account system; this service only
/// mutates the subscription fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub current_subscription: CurrentSubscription,
    #[serde(default)]
    pub ongoing_coupon: Option<OngoingCoupon>,
}

impl User {
    pub fn current_plan_id(&self) -> &PlanId {
        &self.current_subscription.plan_id
    }
}
