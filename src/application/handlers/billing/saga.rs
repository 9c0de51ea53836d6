//! Compensated steps.
//!
//! A step that depends on an earlier write runs under
//! [`with_compensation`]: if the step fails, the compensation undoes the
//! earlier write before the step's error is returned.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use crate::domain::foundation::{ChargeId, DomainError};
use crate::ports::ChargeRepository;

/// Undo action for a completed write.
#[async_trait]
pub trait Compensation: Send + Sync {
    /// Short description used in logs.
    fn describe(&self) -> String;

    async fn compensate(&self) -> Result<(), DomainError>;
}

/// Runs `step`; on failure runs `compensation` and returns the step's error.
///
/// A failing compensation is logged. The caller always observes the step's
/// original error, never the compensation's.
pub async fn with_compensation<T, E, F>(compensation: &dyn Compensation, step: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    match step.await {
        Ok(value) => Ok(value),
        Err(err) => {
            tracing::warn!(
                compensation = %compensation.describe(),
                error = %err,
                "Step failed, compensating"
            );
            if let Err(compensation_err) = compensation.compensate().await {
                tracing::error!(
                    compensation = %compensation.describe(),
                    error = %compensation_err,
                    "Compensation failed"
                );
            }
            Err(err)
        }
    }
}

/// Deletes a tentatively created charge.
pub struct DeleteCharge {
    charges: Arc<dyn ChargeRepository>,
    charge_id: ChargeId,
}

impl DeleteCharge {
    pub fn new(charges: Arc<dyn ChargeRepository>, charge_id: ChargeId) -> Self {
        Self { charges, charge_id }
    }
}

#[async_trait]
impl Compensation for DeleteCharge {
    fn describe(&self) -> String {
        format!("delete charge {}", self.charge_id)
    }

    async fn compensate(&self) -> Result<(), DomainError> {
        self.charges.delete_by_id(&self.charge_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryChargeRepository;
    use crate::domain::charge::Charge;
    use crate::domain::coupon::CouponAttribution;
    use crate::domain::foundation::{ErrorCode, PlanId, Timestamp, UserId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCompensation {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingCompensation {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl Compensation for CountingCompensation {
        fn describe(&self) -> String {
            "counting".to_string()
        }

        async fn compensate(&self) -> Result<(), DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DomainError::database("compensation broke"));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn success_skips_compensation() {
        let compensation = CountingCompensation::new(false);

        let result: Result<u32, DomainError> =
            with_compensation(&compensation, async { Ok(7) }).await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(compensation.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failure_runs_compensation_and_returns_original_error() {
        let compensation = CountingCompensation::new(false);
        let original = DomainError::database("transition write failed");

        let result: Result<(), DomainError> =
            with_compensation(&compensation, async { Err(original.clone()) }).await;

        assert_eq!(result.unwrap_err(), original);
        assert_eq!(compensation.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_compensation_does_not_mask_step_error() {
        let compensation = CountingCompensation::new(true);

        let result: Result<(), DomainError> = with_compensation(&compensation, async {
            Err(DomainError::new(ErrorCode::DatabaseError, "step"))
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "step");
    }

    #[tokio::test]
    async fn delete_charge_removes_charge() {
        let charge = Charge::for_purchase(
            UserId::new("user-1").unwrap(),
            PlanId::new("annual").unwrap(),
            Timestamp::now(),
            &CouponAttribution::none(),
        );
        let charges = Arc::new(InMemoryChargeRepository::with_charges([charge.clone()]));
        let compensation = DeleteCharge::new(charges.clone(), charge.id);

        compensation.compensate().await.unwrap();

        assert!(charges.get(&charge.id).is_none());
        assert!(compensation.describe().contains(&charge.id.to_string()));
    }
}
