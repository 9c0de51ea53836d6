//! HTTP handlers for the billing webhook and the coupon usage job.
//!
//! These handlers connect Axum routes to the application layer handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::FixedOffset;

use crate::application::handlers::billing::{
    CouponPolicy, HandleBillingEventCommand, HandleBillingEventHandler, PlanResolver,
    PostPurchaseActions, PurchaseProcessor, SubscriptionTransitionApplier,
};
use crate::application::handlers::coupon::{
    ProcessCouponUsageCommand, ProcessCouponUsageHandler,
};
use crate::config::AppConfig;
use crate::domain::billing::{BillingEventError, DeploymentEnvironment};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::ports::{
    BillingEventStore, ChargeRepository, CouponUsageQueue, CrmNotifier, DiagnosticReporter,
    EventPublisher, JobRunStore, PlanRepository, SubscriberAttributeClient, UserRepository,
};

use super::dto::{BillingEventResponse, CouponUsageJobResponse, ErrorResponse, HealthResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Deployment settings the billing handlers need.
#[derive(Debug, Clone)]
pub struct BillingSettings {
    pub environment: DeploymentEnvironment,
    pub coupon_policy: CouponPolicy,
    pub reference_offset: FixedOffset,
    pub payment_success_template: String,
    pub coupon_usage_job_name: String,
}

impl From<&AppConfig> for BillingSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            environment: config.server.environment,
            coupon_policy: CouponPolicy {
                referral_groups: config.coupons.referral_groups(),
                legacy_referral: config.coupons.legacy_referral_policy(),
            },
            reference_offset: config.coupons.reference_offset(),
            payment_success_template: config.jobs.payment_success_template.clone(),
            coupon_usage_job_name: config.jobs.coupon_usage_job_name.clone(),
        }
    }
}

/// Shared application state containing all dependencies.
///
/// Cloned for each request; handlers are created on demand from the
/// Arc-wrapped ports.
#[derive(Clone)]
pub struct BillingAppState {
    pub users: Arc<dyn UserRepository>,
    pub plans: Arc<dyn PlanRepository>,
    pub charges: Arc<dyn ChargeRepository>,
    pub billing_events: Arc<dyn BillingEventStore>,
    pub job_runs: Arc<dyn JobRunStore>,
    pub crm: Arc<dyn CrmNotifier>,
    pub coupon_usage_queue: Arc<dyn CouponUsageQueue>,
    pub event_publisher: Arc<dyn EventPublisher>,
    pub subscriber_attributes: Arc<dyn SubscriberAttributeClient>,
    pub diagnostics: Arc<dyn DiagnosticReporter>,
    pub settings: Arc<BillingSettings>,
}

impl BillingAppState {
    pub fn billing_event_handler(&self) -> HandleBillingEventHandler {
        let settings = &self.settings;
        let post_purchase = PostPurchaseActions::new(
            settings.environment,
            settings.payment_success_template.clone(),
            self.users.clone(),
            self.billing_events.clone(),
            self.crm.clone(),
            self.event_publisher.clone(),
            self.subscriber_attributes.clone(),
            self.diagnostics.clone(),
        );
        let purchases = PurchaseProcessor::new(
            PlanResolver::new(self.plans.clone()),
            SubscriptionTransitionApplier::new(
                self.users.clone(),
                self.plans.clone(),
                settings.reference_offset,
            ),
            post_purchase,
            self.charges.clone(),
            self.diagnostics.clone(),
            settings.coupon_policy.clone(),
            settings.reference_offset,
        );

        HandleBillingEventHandler::new(
            settings.environment,
            self.users.clone(),
            self.billing_events.clone(),
            purchases,
        )
    }

    pub fn coupon_usage_handler(&self) -> ProcessCouponUsageHandler {
        ProcessCouponUsageHandler::new(
            self.charges.clone(),
            self.coupon_usage_queue.clone(),
            self.job_runs.clone(),
            self.settings.coupon_usage_job_name.clone(),
            self.settings.reference_offset,
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /webhooks/billing - Process one billing provider event
///
/// Any non-2xx response makes the provider retry the delivery.
pub async fn handle_billing_webhook(
    State(state): State<BillingAppState>,
    body: Bytes,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.billing_event_handler();
    let cmd = HandleBillingEventCommand {
        payload: body.to_vec(),
    };

    let result = handler.handle(cmd).await?;

    Ok(Json(BillingEventResponse::from(result)))
}

/// POST /jobs/coupon-usage - Queue the charges of the current coupon report window
pub async fn run_coupon_usage_job(
    State(state): State<BillingAppState>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.coupon_usage_handler();
    let cmd = ProcessCouponUsageCommand {
        now: Timestamp::now(),
    };

    let result = handler.handle(cmd).await?;

    Ok(Json(CouponUsageJobResponse::from(result)))
}

/// GET /health - Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts application errors to HTTP responses.
#[derive(Debug)]
pub enum BillingApiError {
    Billing(BillingEventError),
    Job(DomainError),
}

impl From<BillingEventError> for BillingApiError {
    fn from(err: BillingEventError) -> Self {
        Self::Billing(err)
    }
}

impl From<DomainError> for BillingApiError {
    fn from(err: DomainError) -> Self {
        Self::Job(err)
    }
}

/// HTTP status for an error code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidPayload | ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::UserNotFound | ErrorCode::PlanNotFound | ErrorCode::ChargeNotFound => {
            StatusCode::NOT_FOUND
        }
        ErrorCode::EnvironmentMismatch => StatusCode::CONFLICT,
        ErrorCode::DatabaseError
        | ErrorCode::QueueError
        | ErrorCode::ProviderError
        | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> axum::response::Response {
        let (code, message, details, retryable) = match &self {
            BillingApiError::Billing(err @ BillingEventError::Persistence(store)) => (
                store.code,
                store.message.clone(),
                Some(&store.details),
                err.is_retryable(),
            ),
            BillingApiError::Billing(err) => (err.code(), err.message(), None, err.is_retryable()),
            BillingApiError::Job(err) => (err.code, err.message.clone(), Some(&err.details), true),
        };

        let status = status_for(code);
        log_rejection(status, code, &message);

        let mut body = ErrorResponse::new(code.to_string(), message).with_retryable(retryable);
        if let Some(details) = details.filter(|d| !d.is_empty()) {
            body = body.with_details(serde_json::json!(details));
        }
        (status, Json(body)).into_response()
    }
}

fn log_rejection(status: StatusCode, code: ErrorCode, message: &str) {
    if status.is_server_error() {
        tracing::error!(code = %code, status = status.as_u16(), error = message, "Request failed");
    } else {
        tracing::warn!(code = %code, status = status.as_u16(), error = message, "Request rejected");
    }
}
