//! Billing provider subscriber attribute port.

use async_trait::async_trait;

use crate::domain::foundation::UserId;

/// Writes subscriber attributes at the billing provider.
///
/// Calls are best-effort: implementations log failures and never return them.
#[async_trait]
pub trait SubscriberAttributeClient: Send + Sync {
    /// Clear the deprecated `referralCodeUsed` attribute for `user_id`.
    async fn clear_referral_attribute(&self, user_id: &UserId);
}
