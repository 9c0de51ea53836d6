//! PostgreSQL implementation of ChargeRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::charge::Charge;
use crate::domain::coupon::{CouponType, CouponUsageWindow};
use crate::domain::foundation::{ChargeId, DomainError, ErrorCode, PlanId, Timestamp, UserId};
use crate::ports::ChargeRepository;

use super::{corrupt_column, database_error};

pub struct PostgresChargeRepository {
    pool: PgPool,
}

impl PostgresChargeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ChargeRow {
    id: Uuid,
    user_id: String,
    plan_id: String,
    requested_date: DateTime<Utc>,
    coupon_code: Option<String>,
    coupon_type: Option<String>,
    iap_coupon_group: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ChargeRow> for Charge {
    type Error = DomainError;

    fn try_from(row: ChargeRow) -> Result<Self, Self::Error> {
        let coupon_type = row
            .coupon_type
            .as_deref()
            .map(|t| {
                t.parse::<CouponType>()
                    .map_err(|_| corrupt_column("charges.coupon_type", t))
            })
            .transpose()?;

        Ok(Charge {
            id: ChargeId::from_uuid(row.id),
            user_id: UserId::new(row.user_id.clone())
                .map_err(|_| corrupt_column("charges.user_id", &row.user_id))?,
            plan_id: PlanId::new(row.plan_id.clone())
                .map_err(|_| corrupt_column("charges.plan_id", &row.plan_id))?,
            requested_date: Timestamp::from_datetime(row.requested_date),
            coupon_code: row.coupon_code,
            coupon_type,
            iap_coupon_group: row.iap_coupon_group,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl ChargeRepository for PostgresChargeRepository {
    async fn create(&self, charge: &Charge) -> Result<Charge, DomainError> {
        let row: ChargeRow = sqlx::query_as(
            r#"
            INSERT INTO charges (
                id, user_id, plan_id, requested_date, coupon_code, coupon_type,
                iap_coupon_group, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, plan_id, requested_date, coupon_code, coupon_type,
                      iap_coupon_group, created_at
            "#,
        )
        .bind(charge.id.as_uuid())
        .bind(charge.user_id.as_str())
        .bind(charge.plan_id.as_str())
        .bind(charge.requested_date.as_datetime())
        .bind(&charge.coupon_code)
        .bind(charge.coupon_type.map(|t| t.as_str()))
        .bind(&charge.iap_coupon_group)
        .bind(charge.created_at.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("create charge", e))?;

        Charge::try_from(row)
    }

    async fn delete_by_id(&self, id: &ChargeId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM charges WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("delete charge", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ChargeNotFound,
                format!("Charge {} not found", id),
            ));
        }
        Ok(())
    }

    async fn find_with_coupon_in(
        &self,
        window: &CouponUsageWindow,
    ) -> Result<Vec<Charge>, DomainError> {
        let rows: Vec<ChargeRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, plan_id, requested_date, coupon_code, coupon_type,
                   iap_coupon_group, created_at
            FROM charges
            WHERE created_at >= $1
              AND created_at < $2
              AND coupon_code IS NOT NULL
              AND coupon_code <> ''
            ORDER BY created_at
            "#,
        )
        .bind(window.start.as_datetime())
        .bind(window.end.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("find coupon charges", e))?;

        rows.into_iter().map(Charge::try_from).collect()
    }
}
