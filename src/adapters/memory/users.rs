//! In-memory user repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::subscription::{
    CurrentSubscription, SubscriptionAgent, SubscriptionChange, SubscriptionTransition,
    TransitionOptions, User,
};
use crate::ports::UserRepository;

/// User store backed by a `HashMap`, recording subscription history.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
    history: RwLock<Vec<SubscriptionChange>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let repo = Self::new();
        for user in users {
            repo.insert(user);
        }
        repo
    }

    pub fn insert(&self, user: User) {
        self.users
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(user.id.clone(), user);
    }

    /// Current state of a user (for test assertions).
    pub fn get(&self, id: &UserId) -> Option<User> {
        self.users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    /// Every subscription change recorded so far, oldest first.
    pub fn history(&self) -> Vec<SubscriptionChange> {
        self.history
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn update<F>(&self, id: &UserId, change: F) -> Result<(), DomainError>
    where
        F: FnOnce(&mut User) -> Option<SubscriptionChange>,
    {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        let user = users.get_mut(id).ok_or_else(|| {
            DomainError::new(ErrorCode::UserNotFound, format!("User {} not found", id))
        })?;

        if let Some(entry) = change(user) {
            self.history
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .push(entry);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.get(id))
    }

    async fn unsubscribe(&self, id: &UserId) -> Result<(), DomainError> {
        self.update(id, |user| {
            user.current_subscription.auto_renew = false;
            None
        })
    }

    async fn resubscribe(&self, id: &UserId) -> Result<(), DomainError> {
        self.update(id, |user| {
            user.current_subscription.auto_renew = true;
            None
        })
    }

    async fn expire(&self, id: &UserId, agent: SubscriptionAgent) -> Result<(), DomainError> {
        let now = Timestamp::now();
        self.update(id, |user| {
            let subscription = &mut user.current_subscription;
            subscription.expiration_date = now;
            subscription.auto_renew = false;
            Some(SubscriptionChange::expiration(
                user.id.clone(),
                subscription.plan_id.clone(),
                agent,
                subscription.start_date,
                now,
            ))
        })
    }

    async fn change_current_subscription(
        &self,
        id: &UserId,
        transition: &SubscriptionTransition,
        options: TransitionOptions,
    ) -> Result<(), DomainError> {
        self.update(id, |user| {
            user.current_subscription = CurrentSubscription {
                plan_id: transition.plan_id.clone(),
                start_date: transition.start_date,
                expiration_date: transition.expiration_date,
                auto_renew: options.auto_renew,
                management_type: options.management_type,
            };
            Some(SubscriptionChange::from_transition(user.id.clone(), transition))
        })
    }

    async fn clear_ongoing_coupon(&self, id: &UserId) -> Result<(), DomainError> {
        self.update(id, |user| {
            user.ongoing_coupon = None;
            None
        })
    }
}
