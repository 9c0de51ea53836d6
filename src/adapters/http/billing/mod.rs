//! HTTP adapter for billing webhooks and scheduled jobs.
//!
//! - `POST /webhooks/billing` - Billing provider webhook
//! - `POST /jobs/coupon-usage` - Coupon usage report job
//! - `GET /health` - Liveness

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{BillingApiError, BillingAppState, BillingSettings};
pub use routes::billing_routes;
