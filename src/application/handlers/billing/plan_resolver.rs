//! Resolves the plan a purchase event refers to.

use std::sync::Arc;

use crate::domain::billing::{BillingEvent, BillingEventError, PlanLookup};
use crate::domain::foundation::PlanId;
use crate::domain::subscription::Plan;
use crate::ports::PlanRepository;

/// Maps a billing event to a catalogue plan.
///
/// An explicit `planPartner` subscriber attribute wins over the product id.
pub struct PlanResolver {
    plans: Arc<dyn PlanRepository>,
}

impl PlanResolver {
    pub fn new(plans: Arc<dyn PlanRepository>) -> Self {
        Self { plans }
    }

    pub async fn resolve(&self, event: &BillingEvent) -> Result<Plan, BillingEventError> {
        let lookup = match event.plan_partner() {
            Some(partner) => PlanLookup::Partner(partner.to_string()),
            None => PlanLookup::ProductAlias(event.product_id.clone()),
        };

        let plan = match &lookup {
            PlanLookup::Partner(partner) => match PlanId::new(partner.as_str()) {
                Ok(id) => self.plans.find_by_id(&id).await?,
                Err(_) => None,
            },
            PlanLookup::ProductAlias(product_id) if product_id.is_empty() => None,
            PlanLookup::ProductAlias(product_id) => self.plans.find_by_alias(product_id).await?,
        };

        plan.ok_or_else(|| {
            tracing::warn!(
                event_id = %event.id,
                lookup = %lookup,
                "No plan matches billing event"
            );
            BillingEventError::plan_not_found(lookup)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryPlanRepository;
    use crate::domain::subscription::{ExpirationPolicy, PeriodUnit, PlanProperties};
    use serde_json::json;

    fn plan(id: &str, alias: &str, discounted: &str) -> Plan {
        Plan {
            id: PlanId::new(id).unwrap(),
            name: id.to_string(),
            properties: PlanProperties {
                subscription_based: true,
                app_store_alias: Some(alias.to_string()),
                referral_program_discounted_plan: Some(discounted.to_string()),
            },
            expiration_policy: ExpirationPolicy::new(PeriodUnit::Year, 1),
        }
    }

    fn resolver() -> PlanResolver {
        PlanResolver::new(Arc::new(InMemoryPlanRepository::with_plans([
            plan("annual", "annual_v1", "annual_ref"),
            plan("partner-annual", "partner_v1", "partner_ref"),
        ])))
    }

    fn event(product_id: &str, partner: Option<&str>) -> BillingEvent {
        let mut raw = json!({
            "id": "evt-1",
            "type": "INITIAL_PURCHASE",
            "environment": "PRODUCTION",
            "app_user_id": "user-1",
            "product_id": product_id,
            "purchased_at_ms": 1_705_276_800_000_i64
        });
        if let Some(partner) = partner {
            raw["subscriber_attributes"] = json!({ "planPartner": { "value": partner } });
        }
        BillingEvent::from_json(raw).unwrap()
    }

    #[tokio::test]
    async fn resolves_by_app_store_alias() {
        let plan = resolver().resolve(&event("annual_v1", None)).await.unwrap();
        assert_eq!(plan.id.as_str(), "annual");
    }

    #[tokio::test]
    async fn resolves_by_referral_discounted_alias() {
        let plan = resolver().resolve(&event("annual_ref", None)).await.unwrap();
        assert_eq!(plan.id.as_str(), "annual");
    }

    #[tokio::test]
    async fn partner_attribute_takes_priority_over_product_id() {
        let plan = resolver()
            .resolve(&event("annual_v1", Some("partner-annual")))
            .await
            .unwrap();
        assert_eq!(plan.id.as_str(), "partner-annual");
    }

    #[tokio::test]
    async fn unknown_partner_error_names_partner() {
        let err = resolver()
            .resolve(&event("annual_v1", Some("ghost")))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            BillingEventError::PlanNotFound(PlanLookup::Partner("ghost".to_string()))
        );
        assert!(err.message().contains("planPartner: ghost"));
    }

    #[tokio::test]
    async fn unknown_product_error_names_product() {
        let err = resolver()
            .resolve(&event("monthly_v9", None))
            .await
            .unwrap_err();
        assert!(err.message().contains("app store alias: monthly_v9"));
    }

    #[tokio::test]
    async fn blank_partner_falls_back_to_product_id() {
        let plan = resolver()
            .resolve(&event("annual_v1", Some("  ")))
            .await
            .unwrap();
        assert_eq!(plan.id.as_str(), "annual");
    }
}
