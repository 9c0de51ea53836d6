//! Coupon usage report queue port.

use async_trait::async_trait;

use crate::domain::charge::Charge;
use crate::domain::foundation::DomainError;

/// Hands charges with coupons to the worker that reports coupon usage.
#[async_trait]
pub trait CouponUsageQueue: Send + Sync {
    async fn enqueue(&self, charges: &[Charge]) -> Result<(), DomainError>;
}
