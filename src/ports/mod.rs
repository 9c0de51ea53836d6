//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application handlers and the outside world. Adapters implement them.
//!
//! ## Stores
//!
//! - `UserRepository` - User subscription state
//! - `PlanRepository` - Plan catalogue (read-only)
//! - `ChargeRepository` - Charge ledger
//! - `BillingEventStore` - Raw billing event audit log
//! - `JobRunStore` - Last successful run per scheduled job
//!
//! ## Outbound
//!
//! - `EventPublisher` - Domain events (`referral-code-used`)
//! - `CrmNotifier` - CRM/marketing queue
//! - `CouponUsageQueue` - Coupon usage report queue
//! - `SubscriberAttributeClient` - Billing provider attribute API
//! - `DiagnosticReporter` - Non-fatal diagnostics

mod billing_event_store;
mod charge_repository;
mod coupon_usage_queue;
mod crm_notifier;
mod diagnostic_reporter;
mod event_publisher;
mod job_run_store;
mod plan_repository;
mod subscriber_attribute_client;
mod user_repository;

pub use billing_event_store::BillingEventStore;
pub use charge_repository::ChargeRepository;
pub use coupon_usage_queue::CouponUsageQueue;
pub use crm_notifier::CrmNotifier;
pub use diagnostic_reporter::{Diagnostic, DiagnosticReporter};
pub use event_publisher::EventPublisher;
pub use job_run_store::JobRunStore;
pub use plan_repository::PlanRepository;
pub use subscriber_attribute_client::SubscriberAttributeClient;
pub use user_repository::UserRepository;
