//! Plan catalogue entries.

use chrono::{DateTime, Days, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{PlanId, Timestamp};

/// Calendar unit used by a plan's expiration policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodUnit {
    Day,
    Month,
    Year,
}

impl fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodUnit::Day => write!(f, "day"),
            PeriodUnit::Month => write!(f, "month"),
            PeriodUnit::Year => write!(f, "year"),
        }
    }
}

/// How long a subscription to a plan lasts from its start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpirationPolicy {
    pub unit: PeriodUnit,
    pub count: u32,
}

impl ExpirationPolicy {
    pub fn new(unit: PeriodUnit, count: u32) -> Self {
        Self { unit, count }
    }

    /// End of the validity window that begins at `start`.
    ///
    /// Month arithmetic clamps to the last day of the target month
    /// (Jan 31 + 1 month = Feb 29 in a leap year). Saturates at the maximum
    /// representable instant.
    pub fn expiration_date(&self, start: Timestamp) -> Timestamp {
        let start = *start.as_datetime();
        let end = match self.unit {
            PeriodUnit::Day => start.checked_add_days(Days::new(u64::from(self.count))),
            PeriodUnit::Month => start.checked_add_months(Months::new(self.count)),
            PeriodUnit::Year => self
                .count
                .checked_mul(12)
                .and_then(|months| start.checked_add_months(Months::new(months))),
        };
        Timestamp::from_datetime(end.unwrap_or(DateTime::<Utc>::MAX_UTC))
    }
}

/// Plan flags the engine reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanProperties {
    /// The user pays a recurring fee while on this plan.
    pub subscription_based: bool,
    /// Store product id of the regular offering.
    pub app_store_alias: Option<String>,
    /// Store product id of the referral-discounted offering.
    pub referral_program_discounted_plan: Option<String>,
}

/// A purchasable plan. Read-only for this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    pub properties: PlanProperties,
    pub expiration_policy: ExpirationPolicy,
}

impl Plan {
    /// Returns true if either store alias equals `product_id`.
    pub fn matches_product(&self, product_id: &str) -> bool {
        let props = &self.properties;
        props.app_store_alias.as_deref() == Some(product_id)
            || props.referral_program_discounted_plan.as_deref() == Some(product_id)
    }

    pub fn is_subscription_based(&self) -> bool {
        self.properties.subscription_based
    }

    pub fn expiration_date(&self, start: Timestamp) -> Timestamp {
        self.expiration_policy.expiration_date(start)
    }
}
