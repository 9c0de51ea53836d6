//! In-memory plan catalogue.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, PlanId};
use crate::domain::subscription::Plan;
use crate::ports::PlanRepository;

#[derive(Default)]
pub struct InMemoryPlanRepository {
    plans: RwLock<Vec<Plan>>,
}

impl InMemoryPlanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plans(plans: impl IntoIterator<Item = Plan>) -> Self {
        Self {
            plans: RwLock::new(plans.into_iter().collect()),
        }
    }

    pub fn insert(&self, plan: Plan) {
        self.plans
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(plan);
    }
}

#[async_trait]
impl PlanRepository for InMemoryPlanRepository {
    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, DomainError> {
        Ok(self
            .plans
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|plan| plan.id == *id)
            .cloned())
    }

    async fn find_by_alias(&self, product_id: &str) -> Result<Option<Plan>, DomainError> {
        Ok(self
            .plans
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|plan| plan.matches_product(product_id))
            .cloned())
    }
}
