//! Plan repository port (read-only).

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PlanId};
use crate::domain::subscription::Plan;

/// Read access to the plan catalogue.
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Find a plan by id.
    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, DomainError>;

    /// Find the plan whose app store alias or referral-discounted alias is `product_id`.
    async fn find_by_alias(&self, product_id: &str) -> Result<Option<Plan>, DomainError>;
}
