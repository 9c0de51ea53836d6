//! PostgreSQL adapters - Database implementations for the store ports.
//!
//! - `PostgresUserRepository` - Subscription snapshot plus change history
//! - `PostgresPlanRepository` - Plan catalogue
//! - `PostgresChargeRepository` - Charge ledger
//! - `PostgresBillingEventStore` - Raw billing event log
//! - `PostgresJobRunStore` - Last successful run per job
//!
//! The schema lives in `migrations/`; see [`MIGRATOR`].

mod billing_events;
mod charges;
mod job_runs;
mod plans;
mod users;

pub use billing_events::PostgresBillingEventStore;
pub use charges::PostgresChargeRepository;
pub use job_runs::PostgresJobRunStore;
pub use plans::PostgresPlanRepository;
pub use users::PostgresUserRepository;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

fn database_error(action: &str, err: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", action, err))
}

fn corrupt_column(column: &str, value: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} value: {}", column, value),
    )
    .with_detail("column", column)
}
