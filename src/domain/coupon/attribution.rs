//! Coupon attribution results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::CouponType;

/// Which coupon, if any, a purchase is credited to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponAttribution {
    pub coupon_code: Option<String>,
    pub coupon_group: Option<String>,
    pub coupon_type: Option<CouponType>,
}

impl CouponAttribution {
    /// The purchase used no offer code.
    pub fn none() -> Self {
        Self::default()
    }

    /// Group and type are known but no specific code is credited.
    pub fn uncredited(group: impl Into<String>, coupon_type: CouponType) -> Self {
        Self {
            coupon_code: None,
            coupon_group: Some(group.into()),
            coupon_type: Some(coupon_type),
        }
    }

    /// Returns true if a referral code was actually credited.
    pub fn credits_referral_code(&self) -> bool {
        self.coupon_type == Some(CouponType::Referral) && self.coupon_code.is_some()
    }
}

/// A non-fatal problem found while attributing a coupon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponDiagnostic {
    pub message: String,
    pub details: BTreeMap<String, String>,
}

impl CouponDiagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: Option<&str>) -> Self {
        self.details
            .insert(key.into(), value.unwrap_or_default().to_string());
        self
    }
}

/// Outcome of coupon resolution: the attribution plus anything worth reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CouponResolution {
    pub attribution: CouponAttribution,
    pub diagnostic: Option<CouponDiagnostic>,
}

impl CouponResolution {
    pub fn clean(attribution: CouponAttribution) -> Self {
        Self {
            attribution,
            diagnostic: None,
        }
    }

    pub fn reported(attribution: CouponAttribution, diagnostic: CouponDiagnostic) -> Self {
        Self {
            attribution,
            diagnostic: Some(diagnostic),
        }
    }
}
