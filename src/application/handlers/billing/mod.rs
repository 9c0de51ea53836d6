//! Billing event handlers.
//!
//! `HandleBillingEventHandler` dispatches on event type. Purchases go
//! through `PurchaseProcessor`, which resolves the plan and coupon, records
//! the charge, applies the subscription transition under compensation and
//! then runs the post-purchase actions.

mod handle_billing_event;
mod plan_resolver;
mod post_purchase;
mod process_purchase;
mod saga;
mod transition_applier;

#[cfg(test)]
pub(crate) mod test_support;

pub use handle_billing_event::{
    HandleBillingEventCommand, HandleBillingEventHandler, HandleBillingEventResult,
};
pub use plan_resolver::PlanResolver;
pub use post_purchase::{
    steps as post_purchase_steps, CompletedPurchase, PostPurchaseActions, PostPurchaseReport,
    POST_PURCHASE_CONTEXT,
};
pub use process_purchase::{
    CouponPolicy, PurchaseOutcome, PurchaseProcessor, COUPON_ATTRIBUTION_CONTEXT,
};
pub use saga::{with_compensation, Compensation, DeleteCharge};
pub use transition_applier::SubscriptionTransitionApplier;
