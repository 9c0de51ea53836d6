//! Coupon domain module.
//!
//! Coupon types, the referral group allow-list, attribution of a purchase
//! to a coupon, and the coupon usage report window.

mod attribution;
mod coupon_type;
mod usage_window;
mod validator;

pub use attribution::{CouponAttribution, CouponDiagnostic, CouponResolution};
pub use coupon_type::{CouponType, ReferralGroups};
pub use usage_window::CouponUsageWindow;
pub use validator::{resolve_coupon, LegacyReferralPolicy};
