//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the billing engine to external systems:
//! - `http` - Axum webhook and job endpoints
//! - `postgres` - sqlx store implementations
//! - `redis` - Job queues and domain event pub/sub
//! - `billing_provider` - Provider REST API client
//! - `diagnostics` - Tracing-backed diagnostic reporter
//! - `events` / `memory` - In-process implementations for tests and local runs

pub mod billing_provider;
pub mod diagnostics;
pub mod events;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod redis;

pub use billing_provider::RevenueCatAttributeClient;
pub use diagnostics::TracingDiagnosticReporter;
pub use events::InMemoryEventBus;
