//! Subscription domain events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EventId, Timestamp, UserId};
use crate::domain_event;

/// Topic the referral program listens on.
pub const REFERRAL_CODE_USED_TOPIC: &str = "referral-code-used";

/// A referral code was redeemed on a purchase that moved the user to a new plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralCodeUsed {
    pub event_id: EventId,
    pub user_id: UserId,
    pub code: String,
    pub occurred_at: Timestamp,
}

impl ReferralCodeUsed {
    pub fn new(user_id: UserId, code: impl Into<String>) -> Self {
        Self {
            event_id: EventId::new(),
            user_id,
            code: code.into(),
            occurred_at: Timestamp::now(),
        }
    }
}

domain_event!(
    ReferralCodeUsed,
    event_type = "referral-code-used",
    aggregate_id = user_id,
    aggregate_type = "User",
    occurred_at = occurred_at,
    event_id = event_id
);
