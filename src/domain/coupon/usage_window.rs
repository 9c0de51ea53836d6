//! Reference window for the weekly coupon usage report.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Days a purchase is held back before it is reported, leaving room for refunds.
const REPORT_DELAY_DAYS: i64 = 7;

/// How far before the last run's day the next window reaches back.
const OVERLAP_DAYS: i64 = 6;

/// The span of charges a coupon usage report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponUsageWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl CouponUsageWindow {
    /// Computes the window for a run at `now`.
    ///
    /// The window always ends at the end of the day seven days ago. Without a
    /// previous run it starts at the beginning of that same day; otherwise it
    /// starts six days before the last successful run's day, so a missed week
    /// is picked up by the next run. Days are taken in `offset`.
    pub fn compute(now: Timestamp, last_successful_run: Option<Timestamp>, offset: FixedOffset) -> Self {
        let reference = now.minus_days(REPORT_DELAY_DAYS);
        let end = reference.end_of_day_in(offset);
        let start = match last_successful_run {
            Some(last) => last.minus_days(OVERLAP_DAYS).start_of_day_in(offset),
            None => reference.start_of_day_in(offset),
        };

        Self { start, end }
    }

    /// Returns true if `at` falls in `[start, end)`.
    pub fn contains(&self, at: Timestamp) -> bool {
        at >= self.start && at < self.end
    }
}
