//! Subscription transitions computed from a purchase.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{PlanId, Timestamp};

use super::{Plan, SubscriptionManagementType};

/// What kind of change a transition represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionAction {
    Subscribe,
    Upgrade,
    Renew,
    /// Access revoked. Only recorded in history, never produced by a purchase.
    Expire,
}

impl SubscriptionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionAction::Subscribe => "SUBSCRIBE",
            SubscriptionAction::Upgrade => "UPGRADE",
            SubscriptionAction::Renew => "RENEW",
            SubscriptionAction::Expire => "EXPIRE",
        }
    }
}

impl fmt::Display for SubscriptionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who initiated a subscription change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionAgent {
    User,
    System,
}

impl SubscriptionAgent {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionAgent::User => "USER",
            SubscriptionAgent::System => "SYSTEM",
        }
    }
}

impl fmt::Display for SubscriptionAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The new subscription snapshot to persist for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionTransition {
    pub agent: SubscriptionAgent,
    pub action: SubscriptionAction,
    pub plan_id: PlanId,
    pub start_date: Timestamp,
    pub expiration_date: Timestamp,
}

impl SubscriptionTransition {
    /// Computes the transition from the user's current plan to `target`.
    ///
    /// `current_plan` is `None` when the user's current plan id no longer
    /// resolves; that is treated as not subscription based. The purchase
    /// instant is normalized to the start of its calendar day in
    /// `reference_offset` before the expiration date is derived.
    pub fn for_purchase(
        current_plan_id: &PlanId,
        current_plan: Option<&Plan>,
        target: &Plan,
        purchased_at: Timestamp,
        reference_offset: FixedOffset,
    ) -> Self {
        let (action, agent) = classify(current_plan_id, current_plan, target);
        let start_date = purchased_at.start_of_day_in(reference_offset);

        Self {
            agent,
            action,
            plan_id: target.id.clone(),
            start_date,
            expiration_date: target.expiration_date(start_date),
        }
    }
}

/// Decides the action and agent for moving to `target`.
///
/// Same plan renews under the system agent, otherwise a paying subscriber
/// upgrades and anyone else subscribes.
pub fn classify(
    current_plan_id: &PlanId,
    current_plan: Option<&Plan>,
    target: &Plan,
) -> (SubscriptionAction, SubscriptionAgent) {
    if *current_plan_id == target.id {
        return (SubscriptionAction::Renew, SubscriptionAgent::System);
    }

    if current_plan.is_some_and(Plan::is_subscription_based) {
        return (SubscriptionAction::Upgrade, SubscriptionAgent::User);
    }

    (SubscriptionAction::Subscribe, SubscriptionAgent::User)
}

/// Options applied alongside a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionOptions {
    pub auto_renew: bool,
    pub management_type: SubscriptionManagementType,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self {
            auto_renew: true,
            management_type: SubscriptionManagementType::External,
        }
    }
}
