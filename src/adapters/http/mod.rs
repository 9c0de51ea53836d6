//! HTTP adapters - REST API implementations.

pub mod billing;
pub mod middleware;

pub use billing::{billing_routes, BillingAppState, BillingSettings};
pub use middleware::WebhookAuth;

use std::time::Duration;

use axum::Router;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use middleware::MakeRequestUuid;

/// Full application router with request tracing, a request timeout and
/// `x-request-id` propagation.
///
/// `SetRequestIdLayer` must stay outermost: every inner layer and the
/// response read the id it sets.
pub fn app_router(state: BillingAppState, auth: WebhookAuth, request_timeout: Duration) -> Router {
    billing_routes(auth)
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
