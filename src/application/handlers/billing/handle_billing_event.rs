//! HandleBillingEventHandler - Entry point for billing provider webhooks.

use std::sync::Arc;

use crate::domain::billing::{
    BillingEvent, BillingEventError, BillingEventType, DeploymentEnvironment,
};
use crate::domain::foundation::UserId;
use crate::domain::subscription::{SubscriptionAgent, User};
use crate::ports::{BillingEventStore, UserRepository};

use super::process_purchase::{PurchaseOutcome, PurchaseProcessor};

/// Command to handle a billing webhook delivery.
#[derive(Debug, Clone)]
pub struct HandleBillingEventCommand {
    /// Raw webhook body, `{ "event": { ... } }`.
    pub payload: Vec<u8>,
}

/// Result of billing event processing.
#[derive(Debug, Clone)]
pub enum HandleBillingEventResult {
    /// Auto-renew stopped; access kept until expiration.
    Unsubscribed { user_id: UserId },
    /// Refunded through support; subscription expired immediately.
    Refunded { user_id: UserId },
    /// Auto-renew re-enabled.
    Resubscribed { user_id: UserId },
    /// Subscription expired.
    Expired { user_id: UserId },
    /// Purchase or renewal recorded.
    PurchaseProcessed(Box<PurchaseOutcome>),
    /// Event type not handled.
    Ignored { event_type: String },
}

/// Handler for billing provider events.
///
/// Validates the event's environment against the deployment, then applies
/// the event to the user's subscription.
pub struct HandleBillingEventHandler {
    environment: DeploymentEnvironment,
    users: Arc<dyn UserRepository>,
    billing_events: Arc<dyn BillingEventStore>,
    purchases: PurchaseProcessor,
}

impl HandleBillingEventHandler {
    pub fn new(
        environment: DeploymentEnvironment,
        users: Arc<dyn UserRepository>,
        billing_events: Arc<dyn BillingEventStore>,
        purchases: PurchaseProcessor,
    ) -> Self {
        Self {
            environment,
            users,
            billing_events,
            purchases,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleBillingEventCommand,
    ) -> Result<HandleBillingEventResult, BillingEventError> {
        let event = BillingEvent::from_webhook_body(&cmd.payload)?;
        self.handle_event(&event).await
    }

    /// Processes an already parsed event.
    pub async fn handle_event(
        &self,
        event: &BillingEvent,
    ) -> Result<HandleBillingEventResult, BillingEventError> {
        if !self.environment.accepts(event.environment) {
            return Err(BillingEventError::environment_mismatch(
                event.environment,
                self.environment.billing_environment(),
            ));
        }

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            user_id = %event.user_id,
            "Handling billing event"
        );

        match &event.event_type {
            BillingEventType::Cancellation => self.handle_cancellation(event).await,
            BillingEventType::Uncancellation => self.handle_uncancellation(event).await,
            BillingEventType::Expiration => self.handle_expiration(event).await,
            BillingEventType::InitialPurchase | BillingEventType::Renewal => {
                let user = self.load_user(event).await?;
                let outcome = self.purchases.process(event, &user).await?;
                Ok(HandleBillingEventResult::PurchaseProcessed(Box::new(outcome)))
            }
            BillingEventType::Unknown(event_type) => {
                tracing::info!(event_id = %event.id, event_type, "Ignoring billing event");
                Ok(HandleBillingEventResult::Ignored {
                    event_type: event_type.clone(),
                })
            }
        }
    }

    async fn handle_cancellation(
        &self,
        event: &BillingEvent,
    ) -> Result<HandleBillingEventResult, BillingEventError> {
        let user = self.load_user(event).await?;

        let is_refund = event
            .cancel_reason
            .as_ref()
            .is_some_and(|reason| reason.is_refund());

        if is_refund {
            self.users.expire(&user.id, SubscriptionAgent::User).await?;
            self.billing_events.append(event).await?;
            return Ok(HandleBillingEventResult::Refunded { user_id: user.id });
        }

        self.users.unsubscribe(&user.id).await?;
        Ok(HandleBillingEventResult::Unsubscribed { user_id: user.id })
    }

    async fn handle_uncancellation(
        &self,
        event: &BillingEvent,
    ) -> Result<HandleBillingEventResult, BillingEventError> {
        let user = self.load_user(event).await?;
        self.users.resubscribe(&user.id).await?;
        Ok(HandleBillingEventResult::Resubscribed { user_id: user.id })
    }

    async fn handle_expiration(
        &self,
        event: &BillingEvent,
    ) -> Result<HandleBillingEventResult, BillingEventError> {
        let user = self.load_user(event).await?;
        self.users.expire(&user.id, SubscriptionAgent::System).await?;
        Ok(HandleBillingEventResult::Expired { user_id: user.id })
    }

    async fn load_user(&self, event: &BillingEvent) -> Result<User, BillingEventError> {
        let user_id = UserId::new(event.user_id.as_str())
            .map_err(|e| BillingEventError::invalid_payload(e.to_string()))?;

        self.users
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| BillingEventError::user_not_found(user_id))
    }
}
