//! In-memory charge ledger.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::charge::Charge;
use crate::domain::coupon::CouponUsageWindow;
use crate::domain::foundation::{ChargeId, DomainError};
use crate::ports::ChargeRepository;

#[derive(Default)]
pub struct InMemoryChargeRepository {
    charges: RwLock<Vec<Charge>>,
}

impl InMemoryChargeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_charges(charges: impl IntoIterator<Item = Charge>) -> Self {
        Self {
            charges: RwLock::new(charges.into_iter().collect()),
        }
    }

    /// All stored charges (for test assertions).
    pub fn all(&self) -> Vec<Charge> {
        self.charges
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn get(&self, id: &ChargeId) -> Option<Charge> {
        self.all().into_iter().find(|charge| charge.id == *id)
    }
}

#[async_trait]
impl ChargeRepository for InMemoryChargeRepository {
    async fn create(&self, charge: &Charge) -> Result<Charge, DomainError> {
        self.charges
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(charge.clone());
        Ok(charge.clone())
    }

    async fn delete_by_id(&self, id: &ChargeId) -> Result<(), DomainError> {
        self.charges
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|charge| charge.id != *id);
        Ok(())
    }

    async fn find_with_coupon_in(
        &self,
        window: &CouponUsageWindow,
    ) -> Result<Vec<Charge>, DomainError> {
        let mut found: Vec<Charge> = self
            .all()
            .into_iter()
            .filter(|charge| charge.has_coupon_code() && window.contains(charge.created_at))
            .collect();
        found.sort_by_key(|charge| charge.created_at);
        Ok(found)
    }
}
