//! Axum router configuration for the billing endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::adapters::http::middleware::{require_bearer_token, WebhookAuth};

use super::handlers::{handle_billing_webhook, health, run_coupon_usage_job, BillingAppState};

/// Create the billing API router.
///
/// # Routes
///
/// ## Machine endpoints (bearer token)
/// - `POST /webhooks/billing` - Billing provider webhook
/// - `POST /jobs/coupon-usage` - Coupon usage report, triggered by the scheduler
///
/// ## Public
/// - `GET /health` - Liveness probe
pub fn billing_routes(auth: WebhookAuth) -> Router<BillingAppState> {
    Router::new()
        .route("/webhooks/billing", post(handle_billing_webhook))
        .route("/jobs/coupon-usage", post(run_coupon_usage_job))
        .route_layer(middleware::from_fn_with_state(auth, require_bearer_token))
        .route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::FixedOffset;
    use secrecy::SecretString;
    use tower::ServiceExt;

    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::http::billing::BillingSettings;
    use crate::adapters::memory::{
        InMemoryBillingEventStore, InMemoryChargeRepository, InMemoryCouponUsageQueue,
        InMemoryCrmNotifier, InMemoryDiagnosticReporter, InMemoryJobRunStore,
        InMemoryPlanRepository, InMemorySubscriberAttributeClient, InMemoryUserRepository,
    };
    use crate::application::handlers::billing::CouponPolicy;
    use crate::domain::billing::DeploymentEnvironment;

    fn test_state() -> BillingAppState {
        BillingAppState {
            users: Arc::new(InMemoryUserRepository::new()),
            plans: Arc::new(InMemoryPlanRepository::new()),
            charges: Arc::new(InMemoryChargeRepository::new()),
            billing_events: Arc::new(InMemoryBillingEventStore::new()),
            job_runs: Arc::new(InMemoryJobRunStore::new()),
            crm: Arc::new(InMemoryCrmNotifier::new()),
            coupon_usage_queue: Arc::new(InMemoryCouponUsageQueue::new()),
            event_publisher: Arc::new(InMemoryEventBus::new()),
            subscriber_attributes: Arc::new(InMemorySubscriberAttributeClient::new()),
            diagnostics: Arc::new(InMemoryDiagnosticReporter::new()),
            settings: Arc::new(BillingSettings {
                environment: DeploymentEnvironment::Development,
                coupon_policy: CouponPolicy::default(),
                reference_offset: FixedOffset::west_opt(3 * 3600).unwrap(),
                payment_success_template: "payment-success".to_string(),
                coupon_usage_job_name: "coupon-usage-report".to_string(),
            }),
        }
    }

    fn app() -> Router {
        let auth = WebhookAuth::new(SecretString::new("hook-token".to_string()));
        billing_routes(auth).with_state(test_state())
    }

    #[test]
    fn billing_routes_creates_router() {
        let _: Router = app();
    }

    #[tokio::test]
    async fn health_needs_no_token() {
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn webhook_requires_token() {
        let request = Request::post("/webhooks/billing")
            .body(Body::from("{}"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_webhook_body_is_400() {
        let request = Request::post("/webhooks/billing")
            .header(header::AUTHORIZATION, "Bearer hook-token")
            .body(Body::from("not json"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn coupon_usage_job_runs_with_token() {
        let request = Request::post("/jobs/coupon-usage")
            .header(header::AUTHORIZATION, "Bearer hook-token")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
