//! Coupon types and the referral group allow-list.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Which validity rule applies to a coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponType {
    Default,
    Referral,
}

impl CouponType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CouponType::Default => "default",
            CouponType::Referral => "referral",
        }
    }
}

impl fmt::Display for CouponType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CouponType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(CouponType::Default),
            "referral" => Ok(CouponType::Referral),
            other => Err(ValidationError::invalid_format(
                "coupon_type",
                format!("unknown coupon type '{}'", other),
            )),
        }
    }
}

/// Store offer-code groups enrolled in the referral program.
///
/// Any referral code may be redeemed through any group in this list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferralGroups(HashSet<String>);

impl ReferralGroups {
    pub fn new<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(groups.into_iter().map(Into::into).collect())
    }

    /// Parses a comma separated list, ignoring blanks and surrounding spaces.
    pub fn from_csv(csv: &str) -> Self {
        Self::new(
            csv.split(',')
                .map(str::trim)
                .filter(|group| !group.is_empty()),
        )
    }

    pub fn contains(&self, group: &str) -> bool {
        self.0.contains(group)
    }

    /// Referral if `group` is enrolled, Default otherwise.
    pub fn classify(&self, group: &str) -> CouponType {
        if self.contains(group) {
            CouponType::Referral
        } else {
            CouponType::Default
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
