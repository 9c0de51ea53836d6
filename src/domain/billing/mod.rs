//! Billing domain module.
//!
//! Billing provider webhook events and the errors that abort their processing.

mod environment;
mod errors;
mod event;

pub use environment::DeploymentEnvironment;
pub use errors::{BillingEventError, PlanLookup};
pub use event::{
    BillingEnvironment, BillingEvent, BillingEventType, CancelReason, SubscriberAttribute,
    SubscriberAttributes, PLAN_PARTNER_ATTRIBUTE, REFERRAL_CODE_USED_ATTRIBUTE,
};
