//! User repository port.
//!
//! The account system owns users; this port exposes only the subscription
//! operations billing events trigger.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::subscription::{
    SubscriptionAgent, SubscriptionTransition, TransitionOptions, User,
};

/// Repository port for user subscription state.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by id.
    ///
    /// Returns `None` if the user does not exist.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Stop auto-renewal. Access is kept until the current expiration date.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the user doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn unsubscribe(&self, id: &UserId) -> Result<(), DomainError>;

    /// Re-enable auto-renewal.
    async fn resubscribe(&self, id: &UserId) -> Result<(), DomainError>;

    /// End the current subscription now, recording who ended it.
    async fn expire(&self, id: &UserId, agent: SubscriptionAgent) -> Result<(), DomainError>;

    /// Replace the current subscription with `transition`.
    ///
    /// The snapshot update and its history entry are written atomically:
    /// either both are visible afterwards or neither is.
    async fn change_current_subscription(
        &self,
        id: &UserId,
        transition: &SubscriptionTransition,
        options: TransitionOptions,
    ) -> Result<(), DomainError>;

    /// Remove the user's ongoing coupon record. A no-op if there is none.
    async fn clear_ongoing_coupon(&self, id: &UserId) -> Result<(), DomainError>;
}
