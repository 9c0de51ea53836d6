//! Applies a purchase to the user's subscription.

use chrono::FixedOffset;
use std::sync::Arc;

use crate::domain::billing::BillingEventError;
use crate::domain::foundation::Timestamp;
use crate::domain::subscription::{Plan, SubscriptionTransition, TransitionOptions, User};
use crate::ports::{PlanRepository, UserRepository};

/// Computes and persists the subscription transition for a purchase.
pub struct SubscriptionTransitionApplier {
    users: Arc<dyn UserRepository>,
    plans: Arc<dyn PlanRepository>,
    reference_offset: FixedOffset,
}

impl SubscriptionTransitionApplier {
    pub fn new(
        users: Arc<dyn UserRepository>,
        plans: Arc<dyn PlanRepository>,
        reference_offset: FixedOffset,
    ) -> Self {
        Self {
            users,
            plans,
            reference_offset,
        }
    }

    /// Moves `user` onto `target` starting on the purchase day.
    ///
    /// Store errors are returned unchanged so the caller can compensate.
    pub async fn apply(
        &self,
        user: &User,
        target: &Plan,
        purchased_at: Timestamp,
    ) -> Result<SubscriptionTransition, BillingEventError> {
        tracing::info!(user_id = %user.id, plan_id = %target.id, "Updating active plan");

        let current_plan = self.plans.find_by_id(user.current_plan_id()).await?;
        if current_plan.is_none() {
            tracing::warn!(
                user_id = %user.id,
                plan_id = %user.current_plan_id(),
                "Current plan not found, treating user as not subscribed"
            );
        }

        let transition = SubscriptionTransition::for_purchase(
            user.current_plan_id(),
            current_plan.as_ref(),
            target,
            purchased_at,
            self.reference_offset,
        );

        self.users
            .change_current_subscription(&user.id, &transition, TransitionOptions::default())
            .await?;

        tracing::info!(
            user_id = %user.id,
            action = %transition.action,
            agent = %transition.agent,
            "Finished updating active plan"
        );
        Ok(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryPlanRepository, InMemoryUserRepository};
    use crate::domain::foundation::{PlanId, UserId};
    use crate::domain::subscription::{
        CurrentSubscription, ExpirationPolicy, PeriodUnit, PlanProperties, SubscriptionAction,
        SubscriptionAgent, SubscriptionManagementType,
    };
    use chrono::{DateTime, Utc};

    fn ts(s: &str) -> Timestamp {
        Timestamp::from_datetime(DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc))
    }

    fn plan(id: &str, subscription_based: bool) -> Plan {
        Plan {
            id: PlanId::new(id).unwrap(),
            name: id.to_string(),
            properties: PlanProperties {
                subscription_based,
                ..Default::default()
            },
            expiration_policy: ExpirationPolicy::new(PeriodUnit::Month, 1),
        }
    }

    fn user_on(plan_id: &str) -> User {
        User {
            id: UserId::new("user-1").unwrap(),
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            current_subscription: CurrentSubscription {
                plan_id: PlanId::new(plan_id).unwrap(),
                start_date: ts("2024-01-01T00:00:00Z"),
                expiration_date: ts("2024-02-01T00:00:00Z"),
                auto_renew: false,
                management_type: SubscriptionManagementType::Internal,
            },
            ongoing_coupon: None,
        }
    }

    fn applier(users: Arc<InMemoryUserRepository>) -> SubscriptionTransitionApplier {
        SubscriptionTransitionApplier::new(
            users,
            Arc::new(InMemoryPlanRepository::with_plans([
                plan("free", false),
                plan("monthly", true),
            ])),
            FixedOffset::west_opt(3 * 3600).unwrap(),
        )
    }

    #[tokio::test]
    async fn persists_snapshot_with_default_options() {
        let user = user_on("free");
        let users = Arc::new(InMemoryUserRepository::with_users([user.clone()]));

        let transition = applier(users.clone())
            .apply(&user, &plan("monthly", true), ts("2024-03-10T01:00:00Z"))
            .await
            .unwrap();

        assert_eq!(transition.action, SubscriptionAction::Subscribe);
        let stored = users.get(&user.id).unwrap().current_subscription;
        assert_eq!(stored.plan_id.as_str(), "monthly");
        assert_eq!(stored.start_date, ts("2024-03-09T00:00:00Z"));
        assert_eq!(stored.expiration_date, ts("2024-04-09T00:00:00Z"));
        assert!(stored.auto_renew);
        assert_eq!(stored.management_type, SubscriptionManagementType::External);
        assert_eq!(users.history().len(), 1);
    }

    #[tokio::test]
    async fn same_plan_is_recorded_as_system_renewal() {
        let user = user_on("monthly");
        let users = Arc::new(InMemoryUserRepository::with_users([user.clone()]));

        let transition = applier(users.clone())
            .apply(&user, &plan("monthly", true), ts("2024-03-10T12:00:00Z"))
            .await
            .unwrap();

        assert_eq!(transition.action, SubscriptionAction::Renew);
        assert_eq!(users.history()[0].agent, SubscriptionAgent::System);
    }

    #[tokio::test]
    async fn missing_current_plan_subscribes() {
        let user = user_on("retired");
        let users = Arc::new(InMemoryUserRepository::with_users([user.clone()]));

        let transition = applier(users)
            .apply(&user, &plan("monthly", true), ts("2024-03-10T12:00:00Z"))
            .await
            .unwrap();

        assert_eq!(transition.action, SubscriptionAction::Subscribe);
    }

    #[tokio::test]
    async fn store_failure_is_returned_unchanged() {
        let user = user_on("free");
        // User is not in the store, so the write fails.
        let users = Arc::new(InMemoryUserRepository::new());

        let err = applier(users)
            .apply(&user, &plan("monthly", true), ts("2024-03-10T12:00:00Z"))
            .await
            .unwrap_err();

        assert!(matches!(err, BillingEventError::Persistence(_)));
    }
}
