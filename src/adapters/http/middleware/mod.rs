//! HTTP middleware.

pub mod auth;
pub mod request_id;

pub use auth::{require_bearer_token, WebhookAuth};
pub use request_id::MakeRequestUuid;
