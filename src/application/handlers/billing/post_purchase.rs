//! Best-effort follow-up work after a purchase has been applied.
//!
//! The four actions are independent and run concurrently. Each one's
//! failure is logged and reported on its own; none of them can fail the
//! purchase.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::billing::{BillingEvent, DeploymentEnvironment};
use crate::domain::coupon::CouponAttribution;
use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::domain::subscription::{ReferralCodeUsed, User};
use crate::ports::{
    BillingEventStore, CrmNotifier, Diagnostic, DiagnosticReporter, EventPublisher,
    SubscriberAttributeClient, UserRepository,
};

/// Diagnostic context for failures in this module.
pub const POST_PURCHASE_CONTEXT: &str = "post_purchase";

/// Names of the individual actions, as reported on failure.
pub mod steps {
    pub const PERSIST_EVENT: &str = "persist_billing_event";
    pub const NOTIFY_CRM: &str = "notify_crm";
    pub const EMIT_REFERRAL: &str = "emit_referral_code_used";
    pub const CLEAR_COUPON: &str = "clear_coupon_tracking";
}

/// What the purchase looked like once it was applied.
#[derive(Debug, Clone, Copy)]
pub struct CompletedPurchase<'a> {
    pub event: &'a BillingEvent,
    pub user: &'a User,
    pub attribution: &'a CouponAttribution,
    pub is_new_plan: bool,
}

/// Outcome of the post-purchase group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostPurchaseReport {
    /// False outside production, where the group does not run.
    pub ran: bool,
    pub referral_emitted: bool,
    /// Actions that failed, by name.
    pub failed_steps: Vec<&'static str>,
}

/// Outbound collaborators the post-purchase actions use.
pub struct PostPurchaseActions {
    environment: DeploymentEnvironment,
    payment_success_template: String,
    users: Arc<dyn UserRepository>,
    billing_events: Arc<dyn BillingEventStore>,
    crm: Arc<dyn CrmNotifier>,
    event_publisher: Arc<dyn EventPublisher>,
    attributes: Arc<dyn SubscriberAttributeClient>,
    diagnostics: Arc<dyn DiagnosticReporter>,
}

impl PostPurchaseActions {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        environment: DeploymentEnvironment,
        payment_success_template: impl Into<String>,
        users: Arc<dyn UserRepository>,
        billing_events: Arc<dyn BillingEventStore>,
        crm: Arc<dyn CrmNotifier>,
        event_publisher: Arc<dyn EventPublisher>,
        attributes: Arc<dyn SubscriberAttributeClient>,
        diagnostics: Arc<dyn DiagnosticReporter>,
    ) -> Self {
        Self {
            environment,
            payment_success_template: payment_success_template.into(),
            users,
            billing_events,
            crm,
            event_publisher,
            attributes,
            diagnostics,
        }
    }

    /// Runs all actions in production; a no-op elsewhere.
    pub async fn run(&self, purchase: CompletedPurchase<'_>) -> PostPurchaseReport {
        if !self.environment.is_production() {
            tracing::debug!(
                environment = %self.environment,
                "Skipping post-purchase actions outside production"
            );
            return PostPurchaseReport::default();
        }

        let (persisted, notified, referral, cleared) = futures::join!(
            self.billing_events.append(purchase.event),
            self.notify_crm(purchase.user),
            self.emit_referral(purchase),
            self.clear_coupon_tracking(purchase.user),
        );

        let mut report = PostPurchaseReport {
            ran: true,
            referral_emitted: matches!(referral, Ok(true)),
            failed_steps: Vec::new(),
        };

        let outcomes = [
            (steps::PERSIST_EVENT, persisted),
            (steps::NOTIFY_CRM, notified),
            (steps::EMIT_REFERRAL, referral.map(|_| ())),
            (steps::CLEAR_COUPON, cleared),
        ];
        for (step, outcome) in outcomes {
            if let Err(err) = outcome {
                self.report_failure(purchase, step, &err);
                report.failed_steps.push(step);
            }
        }

        report
    }

    async fn notify_crm(&self, user: &User) -> Result<(), DomainError> {
        let vars = BTreeMap::from([("userName".to_string(), user.name.clone())]);
        self.crm
            .enqueue(&user.email, &self.payment_success_template, vars)
            .await
    }

    /// Emits `referral-code-used` when a referral code moved the user to a
    /// new plan. Returns whether the event was emitted.
    async fn emit_referral(&self, purchase: CompletedPurchase<'_>) -> Result<bool, DomainError> {
        if !purchase.is_new_plan || !purchase.attribution.credits_referral_code() {
            return Ok(false);
        }
        let Some(code) = purchase.attribution.coupon_code.as_deref() else {
            return Ok(false);
        };

        tracing::info!(user_id = %purchase.user.id, code, "Referral code used");

        let event = ReferralCodeUsed::new(purchase.user.id.clone(), code);
        let envelope = EventEnvelope::from_event(&event)
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::InternalError,
                    format!("Failed to encode referral event: {}", e),
                )
            })?
            .with_correlation_id(purchase.event.id.clone())
            .with_user_id(purchase.user.id.to_string());

        self.event_publisher.publish(envelope).await?;
        Ok(true)
    }

    /// Clears the ongoing coupon and the legacy attribute mirror. The
    /// attribute call runs even when the first clear fails.
    async fn clear_coupon_tracking(&self, user: &User) -> Result<(), DomainError> {
        tracing::info!(
            user_id = %user.id,
            code = user.ongoing_coupon.as_ref().map(|c| c.code.as_str()),
            "Cleaning up coupon tracking"
        );
        let cleared = self.users.clear_ongoing_coupon(&user.id).await;
        self.attributes.clear_referral_attribute(&user.id).await;
        cleared
    }

    fn report_failure(&self, purchase: CompletedPurchase<'_>, step: &str, err: &DomainError) {
        tracing::warn!(
            user_id = %purchase.user.id,
            event_id = %purchase.event.id,
            step,
            error = %err,
            "Post-purchase action failed"
        );
        let details = BTreeMap::from([
            ("step".to_string(), step.to_string()),
            ("eventId".to_string(), purchase.event.id.clone()),
            ("errorCode".to_string(), err.code.to_string()),
        ]);
        self.diagnostics.report(
            Diagnostic::new(POST_PURCHASE_CONTEXT, err.message.clone())
                .for_user(&purchase.user.id)
                .with_details(details),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::{
        InMemoryBillingEventStore, InMemoryCrmNotifier, InMemoryDiagnosticReporter,
        InMemorySubscriberAttributeClient, InMemoryUserRepository,
    };
    use crate::domain::coupon::CouponType;
    use crate::domain::foundation::{PlanId, Timestamp, UserId};
    use crate::domain::subscription::{
        CurrentSubscription, OngoingCoupon, SubscriptionManagementType, REFERRAL_CODE_USED_TOPIC,
    };
    use async_trait::async_trait;
    use serde_json::json;

    // ════════════════════════════════════════════════════════════════════════════
    // Mocks
    // ════════════════════════════════════════════════════════════════════════════

    struct FailingCrm;

    #[async_trait]
    impl CrmNotifier for FailingCrm {
        async fn enqueue(
            &self,
            _email: &str,
            _template: &str,
            _vars: BTreeMap<String, String>,
        ) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::QueueError, "queue down"))
        }
    }

    struct FailingEventStore;

    #[async_trait]
    impl BillingEventStore for FailingEventStore {
        async fn append(&self, _event: &BillingEvent) -> Result<(), DomainError> {
            Err(DomainError::database("audit table locked"))
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Fixtures
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        users: Arc<InMemoryUserRepository>,
        events: Arc<InMemoryBillingEventStore>,
        crm: Arc<InMemoryCrmNotifier>,
        bus: Arc<InMemoryEventBus>,
        attributes: Arc<InMemorySubscriberAttributeClient>,
        diagnostics: Arc<InMemoryDiagnosticReporter>,
    }

    impl Fixture {
        fn new(user: &User) -> Self {
            Self {
                users: Arc::new(InMemoryUserRepository::with_users([user.clone()])),
                events: Arc::new(InMemoryBillingEventStore::new()),
                crm: Arc::new(InMemoryCrmNotifier::new()),
                bus: Arc::new(InMemoryEventBus::new()),
                attributes: Arc::new(InMemorySubscriberAttributeClient::new()),
                diagnostics: Arc::new(InMemoryDiagnosticReporter::new()),
            }
        }

        fn actions(&self, environment: DeploymentEnvironment) -> PostPurchaseActions {
            PostPurchaseActions::new(
                environment,
                "payment-success",
                self.users.clone(),
                self.events.clone(),
                self.crm.clone(),
                self.bus.clone(),
                self.attributes.clone(),
                self.diagnostics.clone(),
            )
        }
    }

    fn user() -> User {
        User {
            id: UserId::new("user-1").unwrap(),
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            current_subscription: CurrentSubscription {
                plan_id: PlanId::new("annual").unwrap(),
                start_date: Timestamp::now(),
                expiration_date: Timestamp::now(),
                auto_renew: true,
                management_type: SubscriptionManagementType::External,
            },
            ongoing_coupon: Some(OngoingCoupon::new("FRIEND10", CouponType::Referral, None)),
        }
    }

    fn event() -> BillingEvent {
        BillingEvent::from_json(json!({
            "id": "evt-1",
            "type": "INITIAL_PURCHASE",
            "environment": "PRODUCTION",
            "app_user_id": "user-1",
            "product_id": "annual_v1",
            "purchased_at_ms": 1_705_276_800_000_i64,
            "offer_code": "REF1"
        }))
        .unwrap()
    }

    fn referral(code: Option<&str>) -> CouponAttribution {
        CouponAttribution {
            coupon_code: code.map(str::to_string),
            coupon_group: Some("REF1".to_string()),
            coupon_type: Some(CouponType::Referral),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn production_runs_every_action() {
        let user = user();
        let fixture = Fixture::new(&user);
        let event = event();
        let attribution = referral(Some("FRIEND10"));

        let report = fixture
            .actions(DeploymentEnvironment::Production)
            .run(CompletedPurchase {
                event: &event,
                user: &user,
                attribution: &attribution,
                is_new_plan: true,
            })
            .await;

        assert!(report.ran);
        assert!(report.referral_emitted);
        assert!(report.failed_steps.is_empty());
        assert_eq!(fixture.events.events().len(), 1);

        let notifications = fixture.crm.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].email, "ana@example.com");
        assert_eq!(notifications[0].template, "payment-success");
        assert_eq!(notifications[0].vars["userName"], "Ana");

        let emitted = fixture.bus.events_of_type(REFERRAL_CODE_USED_TOPIC);
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].aggregate_id, "user-1");
        assert_eq!(emitted[0].payload["code"], "FRIEND10");
        assert_eq!(emitted[0].metadata.correlation_id.as_deref(), Some("evt-1"));

        assert!(fixture.users.get(&user.id).unwrap().ongoing_coupon.is_none());
        assert_eq!(fixture.attributes.cleared(), vec![user.id.clone()]);
    }

    #[tokio::test]
    async fn non_production_is_a_no_op() {
        let user = user();
        let fixture = Fixture::new(&user);
        let event = event();
        let attribution = referral(Some("FRIEND10"));

        let report = fixture
            .actions(DeploymentEnvironment::Staging)
            .run(CompletedPurchase {
                event: &event,
                user: &user,
                attribution: &attribution,
                is_new_plan: true,
            })
            .await;

        assert_eq!(report, PostPurchaseReport::default());
        assert!(fixture.events.events().is_empty());
        assert_eq!(fixture.bus.event_count(), 0);
        assert!(fixture.users.get(&user.id).unwrap().ongoing_coupon.is_some());
    }

    #[tokio::test]
    async fn renewal_does_not_emit_referral() {
        let user = user();
        let fixture = Fixture::new(&user);
        let event = event();
        let attribution = referral(Some("FRIEND10"));

        let report = fixture
            .actions(DeploymentEnvironment::Production)
            .run(CompletedPurchase {
                event: &event,
                user: &user,
                attribution: &attribution,
                is_new_plan: false,
            })
            .await;

        assert!(!report.referral_emitted);
        assert!(!fixture.bus.has_event(REFERRAL_CODE_USED_TOPIC));
        assert_eq!(fixture.attributes.cleared().len(), 1);
    }

    #[tokio::test]
    async fn referral_without_code_does_not_emit() {
        let user = user();
        let fixture = Fixture::new(&user);
        let event = event();
        let attribution = referral(None);

        let report = fixture
            .actions(DeploymentEnvironment::Production)
            .run(CompletedPurchase {
                event: &event,
                user: &user,
                attribution: &attribution,
                is_new_plan: true,
            })
            .await;

        assert!(!report.referral_emitted);
        assert_eq!(fixture.bus.event_count(), 0);
    }

    #[tokio::test]
    async fn failures_are_isolated_and_reported() {
        let user = user();
        let fixture = Fixture::new(&user);
        let event = event();
        let attribution = referral(Some("FRIEND10"));

        let actions = PostPurchaseActions::new(
            DeploymentEnvironment::Production,
            "payment-success",
            fixture.users.clone(),
            Arc::new(FailingEventStore),
            Arc::new(FailingCrm),
            fixture.bus.clone(),
            fixture.attributes.clone(),
            fixture.diagnostics.clone(),
        );

        let report = actions
            .run(CompletedPurchase {
                event: &event,
                user: &user,
                attribution: &attribution,
                is_new_plan: true,
            })
            .await;

        assert_eq!(report.failed_steps, vec![steps::PERSIST_EVENT, steps::NOTIFY_CRM]);
        // Independent actions still ran.
        assert!(report.referral_emitted);
        assert!(fixture.users.get(&user.id).unwrap().ongoing_coupon.is_none());
        assert_eq!(fixture.attributes.cleared().len(), 1);

        let reported = fixture.diagnostics.reported_in(POST_PURCHASE_CONTEXT);
        assert_eq!(reported.len(), 2);
        assert!(reported.iter().all(|d| d.user_id.as_ref() == Some(&user.id)));
    }

    #[tokio::test]
    async fn attribute_is_cleared_even_if_user_clear_fails() {
        let user = user();
        let fixture = Fixture::new(&user);
        // Users store without the user: clearing the ongoing coupon fails.
        let actions = PostPurchaseActions::new(
            DeploymentEnvironment::Production,
            "payment-success",
            Arc::new(InMemoryUserRepository::new()),
            fixture.events.clone(),
            fixture.crm.clone(),
            fixture.bus.clone(),
            fixture.attributes.clone(),
            fixture.diagnostics.clone(),
        );
        let event = event();
        let attribution = CouponAttribution::none();

        let report = actions
            .run(CompletedPurchase {
                event: &event,
                user: &user,
                attribution: &attribution,
                is_new_plan: true,
            })
            .await;

        assert_eq!(report.failed_steps, vec![steps::CLEAR_COUPON]);
        assert_eq!(fixture.attributes.cleared(), vec![user.id.clone()]);
    }
}
