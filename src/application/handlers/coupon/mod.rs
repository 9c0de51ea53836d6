//! Coupon handlers.

mod process_coupon_usage;

pub use process_coupon_usage::{
    ProcessCouponUsageCommand, ProcessCouponUsageHandler, ProcessCouponUsageResult,
};
