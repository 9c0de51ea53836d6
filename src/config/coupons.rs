//! Coupon attribution configuration

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;

use crate::domain::coupon::{LegacyReferralPolicy, ReferralGroups};

use super::error::ValidationError;

/// Coupon attribution settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CouponsConfig {
    /// Comma-separated coupon groups that are referral programs.
    #[serde(default)]
    pub referral_groups: String,

    /// How long a legacy `referralCodeUsed` attribute stays honored.
    #[serde(default = "default_legacy_window_hours")]
    pub legacy_referral_window_hours: i64,

    /// Reference timezone used to normalize purchase and report days.
    #[serde(default = "default_reference_utc_offset_hours")]
    pub reference_utc_offset_hours: i32,
}

impl CouponsConfig {
    pub fn referral_groups(&self) -> ReferralGroups {
        ReferralGroups::from_csv(&self.referral_groups)
    }

    pub fn legacy_referral_policy(&self) -> LegacyReferralPolicy {
        LegacyReferralPolicy::from_hours(self.legacy_referral_window_hours)
    }

    /// Reference timezone. Falls back to UTC for an out-of-range offset,
    /// which `validate` rejects up front.
    pub fn reference_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.reference_utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=168).contains(&self.legacy_referral_window_hours) {
            return Err(ValidationError::InvalidLegacyReferralWindow);
        }
        if !(-23..=23).contains(&self.reference_utc_offset_hours) {
            return Err(ValidationError::InvalidUtcOffset);
        }
        Ok(())
    }
}

impl Default for CouponsConfig {
    fn default() -> Self {
        Self {
            referral_groups: String::new(),
            legacy_referral_window_hours: default_legacy_window_hours(),
            reference_utc_offset_hours: default_reference_utc_offset_hours(),
        }
    }
}

fn default_legacy_window_hours() -> i64 {
    LegacyReferralPolicy::DEFAULT_WINDOW_HOURS
}

fn default_reference_utc_offset_hours() -> i32 {
    -3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_timezone() {
        let config = CouponsConfig::default();
        assert_eq!(config.legacy_referral_window_hours, 2);
        assert_eq!(config.reference_offset().local_minus_utc(), -3 * 3600);
        assert!(config.referral_groups().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn referral_groups_are_parsed_from_csv() {
        let config = CouponsConfig {
            referral_groups: "INFLUENCER, PARTNER_A,,".to_string(),
            ..Default::default()
        };
        let groups = config.referral_groups();
        assert_eq!(groups.len(), 2);
        assert!(groups.contains("INFLUENCER"));
        assert!(groups.contains("PARTNER_A"));
    }

    #[test]
    fn out_of_range_offset_is_rejected() {
        let config = CouponsConfig {
            reference_utc_offset_hours: 30,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidUtcOffset));
        assert_eq!(config.reference_offset().local_minus_utc(), 0);
    }

    #[test]
    fn zero_hour_legacy_window_is_rejected() {
        let config = CouponsConfig {
            legacy_referral_window_hours: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidLegacyReferralWindow)
        );
    }
}
