//! Charge repository port.

use async_trait::async_trait;

use crate::domain::charge::Charge;
use crate::domain::coupon::CouponUsageWindow;
use crate::domain::foundation::{ChargeId, DomainError};

/// Persistence for the charge ledger.
#[async_trait]
pub trait ChargeRepository: Send + Sync {
    /// Insert a charge. Returns the stored record.
    async fn create(&self, charge: &Charge) -> Result<Charge, DomainError>;

    /// Delete a charge by id. Deleting a missing charge is not an error.
    async fn delete_by_id(&self, id: &ChargeId) -> Result<(), DomainError>;

    /// Charges created inside `window` that carry a non-empty coupon code,
    /// oldest first.
    async fn find_with_coupon_in(
        &self,
        window: &CouponUsageWindow,
    ) -> Result<Vec<Charge>, DomainError>;
}
