//! Charge ledger records.

use serde::{Deserialize, Serialize};

use crate::domain::coupon::{CouponAttribution, CouponType};
use crate::domain::foundation::{ChargeId, PlanId, Timestamp, UserId};

/// A purchase recorded in the ledger.
///
/// Written before the subscription transition it pays for. If that
/// transition fails the charge is deleted again, so an existing charge always
/// corresponds to an applied transition once processing finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    pub id: ChargeId,
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub requested_date: Timestamp,
    pub coupon_code: Option<String>,
    pub coupon_type: Option<CouponType>,
    pub iap_coupon_group: Option<String>,
    pub created_at: Timestamp,
}

impl Charge {
    /// Creates a charge for a store purchase with its coupon attribution.
    pub fn for_purchase(
        user_id: UserId,
        plan_id: PlanId,
        requested_date: Timestamp,
        attribution: &CouponAttribution,
    ) -> Self {
        Self {
            id: ChargeId::new(),
            user_id,
            plan_id,
            requested_date,
            coupon_code: attribution.coupon_code.clone(),
            coupon_type: attribution.coupon_type,
            iap_coupon_group: attribution.coupon_group.clone(),
            created_at: Timestamp::now(),
        }
    }

    pub fn has_coupon_code(&self) -> bool {
        self.coupon_code.as_deref().is_some_and(|code| !code.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_purchase_copies_attribution() {
        let attribution = CouponAttribution {
            coupon_code: Some("FRIEND10".to_string()),
            coupon_group: Some("REF1".to_string()),
            coupon_type: Some(CouponType::Referral),
        };
        let charge = Charge::for_purchase(
            UserId::new("user-1").unwrap(),
            PlanId::new("annual").unwrap(),
            Timestamp::now(),
            &attribution,
        );

        assert_eq!(charge.coupon_code.as_deref(), Some("FRIEND10"));
        assert_eq!(charge.iap_coupon_group.as_deref(), Some("REF1"));
        assert_eq!(charge.coupon_type, Some(CouponType::Referral));
        assert!(charge.has_coupon_code());
    }

    #[test]
    fn charge_without_coupon_has_no_code() {
        let charge = Charge::for_purchase(
            UserId::new("user-1").unwrap(),
            PlanId::new("annual").unwrap(),
            Timestamp::now(),
            &CouponAttribution::none(),
        );
        assert!(!charge.has_coupon_code());
        assert_eq!(charge.iap_coupon_group, None);
    }
}
