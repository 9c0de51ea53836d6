//! Purchase processing: plan, coupon, charge, transition, follow-ups.

use chrono::FixedOffset;
use std::sync::Arc;

use crate::domain::billing::{BillingEvent, BillingEventError};
use crate::domain::charge::Charge;
use crate::domain::coupon::{
    resolve_coupon, CouponAttribution, LegacyReferralPolicy, ReferralGroups,
};
use crate::domain::foundation::{ChargeId, PlanId, Timestamp};
use crate::domain::subscription::{SubscriptionAction, SubscriptionAgent, User};
use crate::ports::{ChargeRepository, Diagnostic, DiagnosticReporter};

use super::plan_resolver::PlanResolver;
use super::post_purchase::{CompletedPurchase, PostPurchaseActions, PostPurchaseReport};
use super::saga::{with_compensation, DeleteCharge};
use super::transition_applier::SubscriptionTransitionApplier;

/// Diagnostic context for coupon attribution problems.
pub const COUPON_ATTRIBUTION_CONTEXT: &str = "coupon_attribution";

/// Coupon rules applied to purchases.
#[derive(Debug, Clone, Default)]
pub struct CouponPolicy {
    pub referral_groups: ReferralGroups,
    pub legacy_referral: LegacyReferralPolicy,
}

/// Result of a processed purchase.
#[derive(Debug, Clone)]
pub struct PurchaseOutcome {
    pub charge_id: ChargeId,
    pub plan_id: PlanId,
    pub action: SubscriptionAction,
    pub agent: SubscriptionAgent,
    /// False when the purchase renewed the plan the user already had.
    pub is_new_plan: bool,
    pub attribution: CouponAttribution,
    pub post_purchase: PostPurchaseReport,
}

/// Processes `INITIAL_PURCHASE` and `RENEWAL` events.
pub struct PurchaseProcessor {
    plan_resolver: PlanResolver,
    transition_applier: SubscriptionTransitionApplier,
    post_purchase: PostPurchaseActions,
    charges: Arc<dyn ChargeRepository>,
    diagnostics: Arc<dyn DiagnosticReporter>,
    coupon_policy: CouponPolicy,
    reference_offset: FixedOffset,
}

impl PurchaseProcessor {
    pub fn new(
        plan_resolver: PlanResolver,
        transition_applier: SubscriptionTransitionApplier,
        post_purchase: PostPurchaseActions,
        charges: Arc<dyn ChargeRepository>,
        diagnostics: Arc<dyn DiagnosticReporter>,
        coupon_policy: CouponPolicy,
        reference_offset: FixedOffset,
    ) -> Self {
        Self {
            plan_resolver,
            transition_applier,
            post_purchase,
            charges,
            diagnostics,
            coupon_policy,
            reference_offset,
        }
    }

    /// Records the purchase and moves the user onto the purchased plan.
    ///
    /// The charge is written before the transition. If the transition fails
    /// the charge is deleted and the transition's error is returned. A
    /// purchase without `purchased_at_ms` is dated now.
    pub async fn process(
        &self,
        event: &BillingEvent,
        user: &User,
    ) -> Result<PurchaseOutcome, BillingEventError> {
        let purchased_at = event.purchased_at().unwrap_or_else(|| {
            tracing::warn!(
                event_id = %event.id,
                user_id = %event.user_id,
                "Purchase event has no purchased_at_ms, using current time"
            );
            Timestamp::now()
        });

        let plan = self.plan_resolver.resolve(event).await?;
        let attribution = self.attribute_coupon(user, event);

        let charge = Charge::for_purchase(
            user.id.clone(),
            plan.id.clone(),
            purchased_at.start_of_day_in(self.reference_offset),
            &attribution,
        );
        let charge = self.charges.create(&charge).await?;

        let compensation = DeleteCharge::new(self.charges.clone(), charge.id);
        let transition = with_compensation(
            &compensation,
            self.transition_applier.apply(user, &plan, purchased_at),
        )
        .await
        .map_err(|err| {
            tracing::error!(
                event_type = %event.event_type,
                user_id = %event.user_id,
                error = %err,
                "Error processing purchase"
            );
            err
        })?;

        let is_new_plan = *user.current_plan_id() != plan.id;

        let post_purchase = self
            .post_purchase
            .run(CompletedPurchase {
                event,
                user,
                attribution: &attribution,
                is_new_plan,
            })
            .await;

        Ok(PurchaseOutcome {
            charge_id: charge.id,
            plan_id: plan.id,
            action: transition.action,
            agent: transition.agent,
            is_new_plan,
            attribution,
            post_purchase,
        })
    }

    fn attribute_coupon(&self, user: &User, event: &BillingEvent) -> CouponAttribution {
        let resolution = resolve_coupon(
            user,
            event,
            &self.coupon_policy.referral_groups,
            &self.coupon_policy.legacy_referral,
            Timestamp::now(),
        );

        if let Some(diagnostic) = resolution.diagnostic {
            tracing::warn!(
                user_id = %user.id,
                event_id = %event.id,
                message = %diagnostic.message,
                "Coupon not attributed"
            );
            self.diagnostics.report(
                Diagnostic::new(COUPON_ATTRIBUTION_CONTEXT, diagnostic.message)
                    .for_user(&user.id)
                    .with_details(diagnostic.details),
            );
        }

        resolution.attribution
    }
}
