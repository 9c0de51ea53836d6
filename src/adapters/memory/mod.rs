//! In-memory adapters for every port.
//!
//! Used by tests and by local runs without PostgreSQL or Redis. State lives
//! behind `RwLock`s; a poisoned lock is recovered rather than propagated.

mod billing_events;
mod charges;
mod job_runs;
mod outbound;
mod plans;
mod users;

pub use billing_events::InMemoryBillingEventStore;
pub use charges::InMemoryChargeRepository;
pub use job_runs::InMemoryJobRunStore;
pub use outbound::{
    CrmNotification, InMemoryCouponUsageQueue, InMemoryCrmNotifier, InMemoryDiagnosticReporter,
    InMemorySubscriberAttributeClient,
};
pub use plans::InMemoryPlanRepository;
pub use users::InMemoryUserRepository;
