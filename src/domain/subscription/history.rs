//! Audit trail of subscription changes.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PlanId, Timestamp, UserId};

use super::{SubscriptionAction, SubscriptionAgent, SubscriptionTransition};

/// One recorded change to a user's subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionChange {
    pub user_id: UserId,
    pub agent: SubscriptionAgent,
    pub action: SubscriptionAction,
    pub plan_id: PlanId,
    pub start_date: Timestamp,
    pub expiration_date: Timestamp,
    pub recorded_at: Timestamp,
}

impl SubscriptionChange {
    pub fn from_transition(user_id: UserId, transition: &SubscriptionTransition) -> Self {
        Self {
            user_id,
            agent: transition.agent,
            action: transition.action,
            plan_id: transition.plan_id.clone(),
            start_date: transition.start_date,
            expiration_date: transition.expiration_date,
            recorded_at: Timestamp::now(),
        }
    }

    /// An expiration of `plan_id` effective `at`.
    pub fn expiration(
        user_id: UserId,
        plan_id: PlanId,
        agent: SubscriptionAgent,
        start_date: Timestamp,
        at: Timestamp,
    ) -> Self {
        Self {
            user_id,
            agent,
            action: SubscriptionAction::Expire,
            plan_id,
            start_date,
            expiration_date: at,
            recorded_at: at,
        }
    }
}
