//! Subscription domain module.
//!
//! Plans, the user's subscription state, and the transitions a purchase
//! applies to it.

mod events;
mod history;
mod plan;
mod transition;
mod user;

pub use events::{ReferralCodeUsed, REFERRAL_CODE_USED_TOPIC};
pub use history::SubscriptionChange;
pub use plan::{ExpirationPolicy, PeriodUnit, Plan, PlanProperties};
pub use transition::{
    classify, SubscriptionAction, SubscriptionAgent, SubscriptionTransition, TransitionOptions,
};
pub use user::{CurrentSubscription, OngoingCoupon, SubscriptionManagementType, User};
