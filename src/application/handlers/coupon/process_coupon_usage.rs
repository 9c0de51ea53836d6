//! ProcessCouponUsageHandler - Queues charges with coupons for the usage report.

use chrono::FixedOffset;
use std::sync::Arc;

use crate::domain::coupon::CouponUsageWindow;
use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::{ChargeRepository, CouponUsageQueue, JobRunStore};

/// Command to run the coupon usage job.
#[derive(Debug, Clone, Copy)]
pub struct ProcessCouponUsageCommand {
    /// Time the run is anchored at.
    pub now: Timestamp,
}

/// Result of a coupon usage run.
#[derive(Debug, Clone)]
pub struct ProcessCouponUsageResult {
    pub window: CouponUsageWindow,
    pub enqueued: usize,
}

/// Selects charges that used a coupon in the report window and queues them.
///
/// The run is only recorded as successful after the charges are queued, so a
/// failed run is retried over the same window.
pub struct ProcessCouponUsageHandler {
    charges: Arc<dyn ChargeRepository>,
    queue: Arc<dyn CouponUsageQueue>,
    job_runs: Arc<dyn JobRunStore>,
    job_name: String,
    reference_offset: FixedOffset,
}

impl ProcessCouponUsageHandler {
    pub fn new(
        charges: Arc<dyn ChargeRepository>,
        queue: Arc<dyn CouponUsageQueue>,
        job_runs: Arc<dyn JobRunStore>,
        job_name: impl Into<String>,
        reference_offset: FixedOffset,
    ) -> Self {
        Self {
            charges,
            queue,
            job_runs,
            job_name: job_name.into(),
            reference_offset,
        }
    }

    pub async fn handle(
        &self,
        cmd: ProcessCouponUsageCommand,
    ) -> Result<ProcessCouponUsageResult, DomainError> {
        let last_run = self.job_runs.last_successful_run(&self.job_name).await?;
        let window = CouponUsageWindow::compute(cmd.now, last_run, self.reference_offset);

        let charges = self.charges.find_with_coupon_in(&window).await?;
        if !charges.is_empty() {
            self.queue.enqueue(&charges).await?;
        }

        self.job_runs
            .save_successful_run(&self.job_name, cmd.now)
            .await?;

        tracing::info!(
            job = %self.job_name,
            start = %window.start,
            end = %window.end,
            enqueued = charges.len(),
            "Coupon usage job finished"
        );

        Ok(ProcessCouponUsageResult {
            window,
            enqueued: charges.len(),
        })
    }
}
