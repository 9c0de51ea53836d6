//! PostgreSQL implementation of PlanRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, PlanId};
use crate::domain::subscription::{ExpirationPolicy, PeriodUnit, Plan, PlanProperties};
use crate::ports::PlanRepository;

use super::{corrupt_column, database_error};

pub struct PostgresPlanRepository {
    pool: PgPool,
}

impl PostgresPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PlanRow {
    id: String,
    name: String,
    subscription_based: bool,
    app_store_alias: Option<String>,
    referral_program_discounted_plan: Option<String>,
    expiration_unit: String,
    expiration_count: i32,
}

impl TryFrom<PlanRow> for Plan {
    type Error = DomainError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        let unit = parse_period_unit(&row.expiration_unit)?;
        let count = u32::try_from(row.expiration_count)
            .map_err(|_| corrupt_column("expiration_count", row.expiration_count))?;

        Ok(Plan {
            id: PlanId::new(row.id.clone()).map_err(|_| corrupt_column("plans.id", &row.id))?,
            name: row.name,
            properties: PlanProperties {
                subscription_based: row.subscription_based,
                app_store_alias: row.app_store_alias,
                referral_program_discounted_plan: row.referral_program_discounted_plan,
            },
            expiration_policy: ExpirationPolicy::new(unit, count),
        })
    }
}

fn parse_period_unit(s: &str) -> Result<PeriodUnit, DomainError> {
    match s.to_lowercase().as_str() {
        "day" | "days" => Ok(PeriodUnit::Day),
        "month" | "months" => Ok(PeriodUnit::Month),
        "year" | "years" => Ok(PeriodUnit::Year),
        _ => Err(corrupt_column("expiration_unit", s)),
    }
}

const SELECT_PLAN: &str = r#"
    SELECT id, name, subscription_based, app_store_alias, referral_program_discounted_plan,
           expiration_unit, expiration_count
    FROM plans
"#;

#[async_trait]
impl PlanRepository for PostgresPlanRepository {
    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, DomainError> {
        let row: Option<PlanRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_PLAN))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("find plan", e))?;

        row.map(Plan::try_from).transpose()
    }

    async fn find_by_alias(&self, product_id: &str) -> Result<Option<Plan>, DomainError> {
        let row: Option<PlanRow> = sqlx::query_as(&format!(
            "{} WHERE app_store_alias = $1 OR referral_program_discounted_plan = $1 \
             ORDER BY id LIMIT 1",
            SELECT_PLAN
        ))
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("find plan by alias", e))?;

        row.map(Plan::try_from).transpose()
    }
}
