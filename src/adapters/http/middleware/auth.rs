//! Bearer token authentication for machine callers.
//!
//! The billing provider and the job scheduler both authenticate with a
//! static bearer token configured per deployment:
//!
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! # Example
//!
//! ```ignore
//! let auth = WebhookAuth::new(config.billing.webhook_auth_token.clone());
//!
//! let app = Router::new()
//!     .route("/webhooks/billing", post(handle_billing_webhook))
//!     .route_layer(middleware::from_fn_with_state(auth, require_bearer_token));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::adapters::http::billing::ErrorResponse;
use crate::domain::foundation::ErrorCode;

/// Middleware state holding the expected token.
#[derive(Clone)]
pub struct WebhookAuth {
    token: Arc<SecretString>,
}

impl WebhookAuth {
    pub fn new(token: SecretString) -> Self {
        Self {
            token: Arc::new(token),
        }
    }

    /// Compares a presented token against the configured one in constant time.
    pub fn verify(&self, presented: &str) -> bool {
        let expected = self.token.expose_secret().as_bytes();
        expected.ct_eq(presented.as_bytes()).into()
    }
}

/// Rejects requests without a valid `Authorization: Bearer` header.
pub async fn require_bearer_token(
    State(auth): State<WebhookAuth>,
    request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match token {
        Some(token) if auth.verify(token) => next.run(request).await,
        Some(_) => {
            tracing::warn!(path = %request.uri().path(), "Rejected request with invalid bearer token");
            unauthorized("Invalid bearer token")
        }
        None => unauthorized("Missing bearer token"),
    }
}

fn unauthorized(message: &str) -> Response {
    let body = ErrorResponse::new(ErrorCode::Unauthorized.to_string(), message);
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
