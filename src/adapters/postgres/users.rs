//! PostgreSQL implementation of UserRepository.
//!
//! Users are owned by the account system; this adapter reads them and
//! writes only the subscription columns. Every subscription change is
//! recorded in `subscription_history` within the same transaction as the
//! snapshot update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::foundation::{DomainError, ErrorCode, PlanId, Timestamp, UserId};
use crate::domain::subscription::{
    CurrentSubscription, OngoingCoupon, SubscriptionAgent, SubscriptionChange,
    SubscriptionManagementType, SubscriptionTransition, TransitionOptions, User,
};
use crate::ports::UserRepository;

use super::{corrupt_column, database_error};

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<Transaction<'_, Postgres>, DomainError> {
        self.pool
            .begin()
            .await
            .map_err(|e| database_error("begin transaction", e))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    name: String,
    plan_id: String,
    subscription_start: DateTime<Utc>,
    subscription_expiration: DateTime<Utc>,
    auto_renew: bool,
    management_type: String,
    ongoing_coupon_code: Option<String>,
    ongoing_coupon_type: Option<String>,
    ongoing_coupon_group: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let ongoing_coupon = match (row.ongoing_coupon_code, row.ongoing_coupon_type) {
            (Some(code), Some(coupon_type)) => Some(OngoingCoupon {
                code,
                coupon_type,
                group: row.ongoing_coupon_group,
            }),
            _ => None,
        };

        Ok(User {
            id: UserId::new(row.id.clone()).map_err(|_| corrupt_column("users.id", &row.id))?,
            email: row.email,
            name: row.name,
            current_subscription: CurrentSubscription {
                plan_id: PlanId::new(row.plan_id.clone())
                    .map_err(|_| corrupt_column("users.plan_id", &row.plan_id))?,
                start_date: Timestamp::from_datetime(row.subscription_start),
                expiration_date: Timestamp::from_datetime(row.subscription_expiration),
                auto_renew: row.auto_renew,
                management_type: parse_management_type(&row.management_type)?,
            },
            ongoing_coupon,
        })
    }
}

fn parse_management_type(s: &str) -> Result<SubscriptionManagementType, DomainError> {
    match s.to_uppercase().as_str() {
        "INTERNAL" => Ok(SubscriptionManagementType::Internal),
        "EXTERNAL" => Ok(SubscriptionManagementType::External),
        _ => Err(corrupt_column("management_type", s)),
    }
}

fn user_not_found(id: &UserId) -> DomainError {
    DomainError::new(ErrorCode::UserNotFound, format!("User {} not found", id))
}

async fn insert_history(
    tx: &mut Transaction<'_, Postgres>,
    change: &SubscriptionChange,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO subscription_history (
            user_id, agent, action, plan_id, start_date, expiration_date, recorded_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(change.user_id.as_str())
    .bind(change.agent.as_str())
    .bind(change.action.as_str())
    .bind(change.plan_id.as_str())
    .bind(change.start_date.as_datetime())
    .bind(change.expiration_date.as_datetime())
    .bind(change.recorded_at.as_datetime())
    .execute(&mut **tx)
    .await
    .map_err(|e| database_error("record subscription change", e))?;

    Ok(())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, email, name, plan_id, subscription_start, subscription_expiration,
                   auto_renew, management_type,
                   ongoing_coupon_code, ongoing_coupon_type, ongoing_coupon_group
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("find user", e))?;

        row.map(User::try_from).transpose()
    }

    async fn unsubscribe(&self, id: &UserId) -> Result<(), DomainError> {
        set_auto_renew(&self.pool, id, false).await
    }

    async fn resubscribe(&self, id: &UserId) -> Result<(), DomainError> {
        set_auto_renew(&self.pool, id, true).await
    }

    async fn expire(&self, id: &UserId, agent: SubscriptionAgent) -> Result<(), DomainError> {
        let now = Timestamp::now();
        let mut tx = self.begin().await?;

        let row: Option<(String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            UPDATE users SET
                subscription_expiration = $2,
                auto_renew = FALSE,
                updated_at = $2
            WHERE id = $1
            RETURNING plan_id, subscription_start
            "#,
        )
        .bind(id.as_str())
        .bind(now.as_datetime())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| database_error("expire subscription", e))?;

        let (plan_id, start) = row.ok_or_else(|| user_not_found(id))?;
        let plan_id =
            PlanId::new(plan_id.clone()).map_err(|_| corrupt_column("users.plan_id", plan_id))?;

        let change = SubscriptionChange::expiration(
            id.clone(),
            plan_id,
            agent,
            Timestamp::from_datetime(start),
            now,
        );
        insert_history(&mut tx, &change).await?;

        tx.commit()
            .await
            .map_err(|e| database_error("commit expiration", e))
    }

    async fn change_current_subscription(
        &self,
        id: &UserId,
        transition: &SubscriptionTransition,
        options: TransitionOptions,
    ) -> Result<(), DomainError> {
        let mut tx = self.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE users SET
                plan_id = $2,
                subscription_start = $3,
                subscription_expiration = $4,
                auto_renew = $5,
                management_type = $6,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(transition.plan_id.as_str())
        .bind(transition.start_date.as_datetime())
        .bind(transition.expiration_date.as_datetime())
        .bind(options.auto_renew)
        .bind(options.management_type.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| database_error("change subscription", e))?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(id));
        }

        let change = SubscriptionChange::from_transition(id.clone(), transition);
        insert_history(&mut tx, &change).await?;

        tx.commit()
            .await
            .map_err(|e| database_error("commit subscription change", e))
    }

    async fn clear_ongoing_coupon(&self, id: &UserId) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                ongoing_coupon_code = NULL,
                ongoing_coupon_type = NULL,
                ongoing_coupon_group = NULL
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("clear ongoing coupon", e))?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(id));
        }
        Ok(())
    }
}

async fn set_auto_renew(pool: &PgPool, id: &UserId, auto_renew: bool) -> Result<(), DomainError> {
    let result = sqlx::query("UPDATE users SET auto_renew = $2, updated_at = NOW() WHERE id = $1")
        .bind(id.as_str())
        .bind(auto_renew)
        .execute(pool)
        .await
        .map_err(|e| database_error("update auto renew", e))?;

    if result.rows_affected() == 0 {
        return Err(user_not_found(id));
    }
    Ok(())
}
