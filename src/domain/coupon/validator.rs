//! Decides which coupon a purchase is attributed to.
//!
//! Two sources are consulted. Users who went through the in-app checkout
//! have an ongoing coupon record that must agree with the store offer code
//! the purchase used. Older app versions instead wrote the code into the
//! `referralCodeUsed` subscriber attribute at the provider; that value is
//! honored only while it is fresh.
//!
//! Everything here is pure. Problems are returned as a [`CouponDiagnostic`]
//! for the caller to report.

use chrono::Duration;

use crate::domain::billing::{BillingEvent, SubscriberAttribute};
use crate::domain::foundation::Timestamp;
use crate::domain::subscription::{OngoingCoupon, User};

use super::{CouponAttribution, CouponDiagnostic, CouponResolution, CouponType, ReferralGroups};

/// Freshness rule for the deprecated referral code attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyReferralPolicy {
    window: Duration,
}

impl LegacyReferralPolicy {
    pub const DEFAULT_WINDOW_HOURS: i64 = 2;

    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn from_hours(hours: i64) -> Self {
        Self::new(Duration::hours(hours))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// An attribute written exactly `window` ago is still fresh.
    pub fn is_fresh(&self, updated_at: Timestamp, now: Timestamp) -> bool {
        now.duration_since(&updated_at) <= self.window
    }

    /// The attribute's code, if it is present, non-blank and fresh.
    ///
    /// An attribute without `updated_at_ms` counts as written at `now`, so
    /// its code is honored.
    pub fn honored_code(&self, attribute: &SubscriberAttribute, now: Timestamp) -> Option<String> {
        let code = attribute.non_empty_value()?;
        let updated_at = attribute.updated_at().unwrap_or(now);
        self.is_fresh(updated_at, now).then(|| code.to_string())
    }
}

impl Default for LegacyReferralPolicy {
    fn default() -> Self {
        Self::from_hours(Self::DEFAULT_WINDOW_HOURS)
    }
}

/// Resolves the coupon attribution for a purchase event.
pub fn resolve_coupon(
    user: &User,
    event: &BillingEvent,
    referral_groups: &ReferralGroups,
    legacy_policy: &LegacyReferralPolicy,
    now: Timestamp,
) -> CouponResolution {
    let Some(incoming_group) = event.coupon_group() else {
        return CouponResolution::clean(CouponAttribution::none());
    };
    let incoming_type = referral_groups.classify(incoming_group);

    if let Some(ongoing) = &user.ongoing_coupon {
        return match validate_ongoing(ongoing, incoming_group, referral_groups) {
            Ok(ongoing_type) => CouponResolution::clean(CouponAttribution {
                coupon_code: Some(ongoing.code.clone()),
                coupon_group: Some(incoming_group.to_string()),
                coupon_type: Some(ongoing_type),
            }),
            Err(diagnostic) => CouponResolution::reported(
                CouponAttribution::uncredited(incoming_group, incoming_type),
                diagnostic,
            ),
        };
    }

    let legacy_code = event
        .referral_code_attribute()
        .and_then(|attribute| legacy_policy.honored_code(attribute, now));

    CouponResolution::clean(CouponAttribution {
        coupon_code: legacy_code,
        coupon_group: Some(incoming_group.to_string()),
        coupon_type: Some(incoming_type),
    })
}

/// Checks the ongoing coupon against the offer group the store reported.
fn validate_ongoing(
    ongoing: &OngoingCoupon,
    incoming_group: &str,
    referral_groups: &ReferralGroups,
) -> Result<CouponType, CouponDiagnostic> {
    let ongoing_group = ongoing.group.as_deref();

    match ongoing.parsed_type() {
        Some(CouponType::Referral) => {
            if referral_groups.contains(incoming_group) {
                return Ok(CouponType::Referral);
            }
            Err(CouponDiagnostic::new(
                "Referral incoming coupon group is not present on the referral group list",
            )
            .with_detail("incomingCouponGroup", Some(incoming_group)))
        }
        Some(CouponType::Default) => {
            if ongoing_group == Some(incoming_group) && !referral_groups.contains(incoming_group) {
                return Ok(CouponType::Default);
            }
            Err(
                CouponDiagnostic::new("Ongoing coupon group is not equal to incoming coupon group")
                    .with_detail("ongoingCouponGroup", ongoing_group)
                    .with_detail("incomingCouponGroup", Some(incoming_group)),
            )
        }
        None => Err(CouponDiagnostic::new("Ongoing coupon is invalid")
            .with_detail("ongoingCouponGroup", ongoing_group)
            .with_detail("incomingCouponGroup", Some(incoming_group))
            .with_detail("ongoingCouponType", Some(ongoing.coupon_type.as_str()))),
    }
}
