//! Application handlers.
//!
//! Command handlers that orchestrate domain operations over ports.

pub mod billing;
pub mod coupon;

pub use billing::{
    HandleBillingEventCommand, HandleBillingEventHandler, HandleBillingEventResult,
    PurchaseOutcome, PurchaseProcessor,
};
pub use coupon::{ProcessCouponUsageCommand, ProcessCouponUsageHandler, ProcessCouponUsageResult};
