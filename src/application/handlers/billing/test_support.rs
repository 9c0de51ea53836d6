//! Shared fixtures for billing handler tests.

use async_trait::async_trait;
use chrono::FixedOffset;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

use crate::adapters::events::InMemoryEventBus;
use crate::adapters::memory::{
    InMemoryBillingEventStore, InMemoryChargeRepository, InMemoryCrmNotifier,
    InMemoryDiagnosticReporter, InMemoryPlanRepository, InMemorySubscriberAttributeClient,
    InMemoryUserRepository,
};
use crate::domain::billing::{BillingEvent, DeploymentEnvironment};
use crate::domain::coupon::{LegacyReferralPolicy, ReferralGroups};
use crate::domain::foundation::{DomainError, PlanId, Timestamp, UserId};
use crate::domain::subscription::{
    CurrentSubscription, ExpirationPolicy, OngoingCoupon, PeriodUnit, Plan, PlanProperties,
    SubscriptionAgent, SubscriptionManagementType, SubscriptionTransition, TransitionOptions, User,
};
use crate::ports::UserRepository;

use super::{
    CouponPolicy, HandleBillingEventHandler, PlanResolver, PostPurchaseActions,
    PurchaseProcessor, SubscriptionTransitionApplier,
};

pub const PAYMENT_SUCCESS_TEMPLATE: &str = "payment-success";

pub fn brt() -> FixedOffset {
    FixedOffset::west_opt(3 * 3600).unwrap()
}

pub fn plan(id: &str, alias: Option<&str>, subscription_based: bool) -> Plan {
    Plan {
        id: PlanId::new(id).unwrap(),
        name: id.to_string(),
        properties: PlanProperties {
            subscription_based,
            app_store_alias: alias.map(str::to_string),
            referral_program_discounted_plan: alias.map(|a| format!("{}_ref", a)),
        },
        expiration_policy: ExpirationPolicy::new(PeriodUnit::Year, 1),
    }
}

pub fn user(id: &str, plan_id: &str, ongoing_coupon: Option<OngoingCoupon>) -> User {
    User {
        id: UserId::new(id).unwrap(),
        email: format!("{}@example.com", id),
        name: "Ana".to_string(),
        current_subscription: CurrentSubscription {
            plan_id: PlanId::new(plan_id).unwrap(),
            start_date: Timestamp::now().minus_days(30),
            expiration_date: Timestamp::now().add_days(5),
            auto_renew: true,
            management_type: SubscriptionManagementType::External,
        },
        ongoing_coupon,
    }
}

/// Purchase event body fields; callers patch what they need.
pub fn purchase_json(event_type: &str, user_id: &str, product_id: &str) -> JsonValue {
    json!({
        "id": "evt-1",
        "type": event_type,
        "environment": "PRODUCTION",
        "app_user_id": user_id,
        "product_id": product_id,
        "purchased_at_ms": Timestamp::now().as_unix_millis(),
    })
}

pub fn event(raw: JsonValue) -> BillingEvent {
    BillingEvent::from_json(raw).unwrap()
}

pub fn webhook_body(raw: JsonValue) -> Vec<u8> {
    serde_json::to_vec(&json!({ "api_version": "1.0", "event": raw })).unwrap()
}

/// User store whose subscription writes always fail.
pub struct FailingTransitionUsers {
    pub inner: Arc<InMemoryUserRepository>,
}

#[async_trait]
impl UserRepository for FailingTransitionUsers {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.inner.find_by_id(id).await
    }

    async fn unsubscribe(&self, id: &UserId) -> Result<(), DomainError> {
        self.inner.unsubscribe(id).await
    }

    async fn resubscribe(&self, id: &UserId) -> Result<(), DomainError> {
        self.inner.resubscribe(id).await
    }

    async fn expire(&self, id: &UserId, agent: SubscriptionAgent) -> Result<(), DomainError> {
        self.inner.expire(id, agent).await
    }

    async fn change_current_subscription(
        &self,
        _id: &UserId,
        _transition: &SubscriptionTransition,
        _options: TransitionOptions,
    ) -> Result<(), DomainError> {
        Err(DomainError::database("write conflict on users"))
    }

    async fn clear_ongoing_coupon(&self, id: &UserId) -> Result<(), DomainError> {
        self.inner.clear_ongoing_coupon(id).await
    }
}

/// In-memory wiring of the whole billing pipeline.
pub struct Harness {
    pub environment: DeploymentEnvironment,
    pub users: Arc<InMemoryUserRepository>,
    pub plans: Arc<InMemoryPlanRepository>,
    pub charges: Arc<InMemoryChargeRepository>,
    pub billing_events: Arc<InMemoryBillingEventStore>,
    pub crm: Arc<InMemoryCrmNotifier>,
    pub bus: Arc<InMemoryEventBus>,
    pub attributes: Arc<InMemorySubscriberAttributeClient>,
    pub diagnostics: Arc<InMemoryDiagnosticReporter>,
}

impl Harness {
    /// Plans: `free` (not subscription based), `monthly` (`monthly_v1`),
    /// `annual` (`annual_v1`).
    pub fn new(environment: DeploymentEnvironment) -> Self {
        Self {
            environment,
            users: Arc::new(InMemoryUserRepository::new()),
            plans: Arc::new(InMemoryPlanRepository::with_plans([
                plan("free", None, false),
                plan("monthly", Some("monthly_v1"), true),
                plan("annual", Some("annual_v1"), true),
            ])),
            charges: Arc::new(InMemoryChargeRepository::new()),
            billing_events: Arc::new(InMemoryBillingEventStore::new()),
            crm: Arc::new(InMemoryCrmNotifier::new()),
            bus: Arc::new(InMemoryEventBus::new()),
            attributes: Arc::new(InMemorySubscriberAttributeClient::new()),
            diagnostics: Arc::new(InMemoryDiagnosticReporter::new()),
        }
    }

    pub fn coupon_policy() -> CouponPolicy {
        CouponPolicy {
            referral_groups: ReferralGroups::new(["REF1", "REF2"]),
            legacy_referral: LegacyReferralPolicy::default(),
        }
    }

    pub fn processor(&self) -> PurchaseProcessor {
        self.processor_with_users(self.users.clone())
    }

    /// Pipeline whose subscription writes go to `users`.
    pub fn processor_with_users(&self, users: Arc<dyn UserRepository>) -> PurchaseProcessor {
        PurchaseProcessor::new(
            PlanResolver::new(self.plans.clone()),
            SubscriptionTransitionApplier::new(users, self.plans.clone(), brt()),
            PostPurchaseActions::new(
                self.environment,
                PAYMENT_SUCCESS_TEMPLATE,
                self.users.clone(),
                self.billing_events.clone(),
                self.crm.clone(),
                self.bus.clone(),
                self.attributes.clone(),
                self.diagnostics.clone(),
            ),
            self.charges.clone(),
            self.diagnostics.clone(),
            Self::coupon_policy(),
            brt(),
        )
    }

    pub fn handler(&self) -> HandleBillingEventHandler {
        HandleBillingEventHandler::new(
            self.environment,
            self.users.clone(),
            self.billing_events.clone(),
            self.processor(),
        )
    }
}
