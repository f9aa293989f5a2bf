//! PostgreSQL implementation of SubscriptionStore.
//!
//! Every write is a single statement. The upsert relies on the unique index
//! on `subscription_id` (`INSERT ... ON CONFLICT DO UPDATE`), and the status
//! transition is one conditional `UPDATE` checked via `rows_affected`, so
//! concurrent deliveries for the same subscription can interleave without
//! torn or lost writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::subscription::{SubscriptionRecord, SubscriptionStatus, SubscriptionUpdate};
use crate::ports::{SubscriptionFilter, SubscriptionPage, SubscriptionStore};

/// PostgreSQL implementation of the SubscriptionStore port.
///
/// Uses sqlx with connection pooling.
pub struct PostgresSubscriptionStore {
    pool: PgPool,
}

impl PostgresSubscriptionStore {
    /// Creates a new store with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a subscription record.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    subscription_id: String,
    customer_email: String,
    customer_name: Option<String>,
    plan_type: Option<String>,
    status: String,
    current_period_start: Option<DateTime<Utc>>,
    current_period_end: Option<DateTime<Utc>>,
    canceled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SubscriptionRow> for SubscriptionRecord {
    fn from(row: SubscriptionRow) -> Self {
        SubscriptionRecord {
            id: row.id,
            subscription_id: row.subscription_id,
            customer_email: row.customer_email,
            customer_name: row.customer_name,
            plan_type: row.plan_type,
            status: SubscriptionStatus::parse(&row.status),
            current_period_start: row.current_period_start.map(Timestamp::from_datetime),
            current_period_end: row.current_period_end.map(Timestamp::from_datetime),
            canceled_at: row.canceled_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        }
    }
}

const SELECT_COLUMNS: &str = "id, subscription_id, customer_email, customer_name, plan_type, \
     status, current_period_start, current_period_end, canceled_at, created_at, updated_at";

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::database(format!("{}: {}", context, e))
}

#[async_trait]
impl SubscriptionStore for PostgresSubscriptionStore {
    async fn upsert(
        &self,
        update: &SubscriptionUpdate,
        now: Timestamp,
    ) -> Result<SubscriptionRecord, DomainError> {
        let row: SubscriptionRow = sqlx::query_as(
            r#"
            INSERT INTO subscriptions (
                id, subscription_id, customer_email, customer_name, plan_type, status,
                current_period_start, current_period_end, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            ON CONFLICT (subscription_id) DO UPDATE SET
                status = EXCLUDED.status,
                plan_type = COALESCE(EXCLUDED.plan_type, subscriptions.plan_type),
                current_period_start = EXCLUDED.current_period_start,
                current_period_end = EXCLUDED.current_period_end,
                customer_email = EXCLUDED.customer_email,
                customer_name = COALESCE(EXCLUDED.customer_name, subscriptions.customer_name),
                updated_at = EXCLUDED.updated_at
            RETURNING id, subscription_id, customer_email, customer_name, plan_type, status,
                      current_period_start, current_period_end, canceled_at, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&update.subscription_id)
        .bind(&update.customer_email)
        .bind(&update.customer_name)
        .bind(&update.plan_label)
        .bind(update.status.as_str())
        .bind(update.period_start.map(|t| *t.as_datetime()))
        .bind(update.period_end.map(|t| *t.as_datetime()))
        .bind(*now.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("failed to upsert subscription", e))?;

        Ok(row.into())
    }

    async fn transition(
        &self,
        subscription_id: &str,
        status: SubscriptionStatus,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                status = $2,
                canceled_at = $3,
                updated_at = $3
            WHERE subscription_id = $1
            "#,
        )
        .bind(subscription_id)
        .bind(status.as_str())
        .bind(*now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("failed to transition subscription", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM subscriptions WHERE subscription_id = $1",
            SELECT_COLUMNS
        ))
        .bind(subscription_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("failed to find subscription", e))?;

        Ok(row.map(SubscriptionRecord::from))
    }

    async fn entitled_record(
        &self,
        customer_email: &str,
        now: Timestamp,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM subscriptions
            WHERE customer_email = $1
              AND status = 'active'
              AND current_period_end IS NOT NULL
              AND current_period_end > $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            SELECT_COLUMNS
        ))
        .bind(customer_email)
        .bind(*now.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("failed to query entitlement", e))?;

        Ok(row.map(SubscriptionRecord::from))
    }

    async fn latest_for_email(
        &self,
        customer_email: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM subscriptions
            WHERE customer_email = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            SELECT_COLUMNS
        ))
        .bind(customer_email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("failed to find latest subscription", e))?;

        Ok(row.map(SubscriptionRecord::from))
    }

    async fn list(&self, filter: &SubscriptionFilter) -> Result<SubscriptionPage, DomainError> {
        let status = filter.status.as_ref().map(|s| s.as_str().to_string());

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM subscriptions WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(&status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("failed to count subscriptions", e))?;

        let rows: Vec<SubscriptionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM subscriptions
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            SELECT_COLUMNS
        ))
        .bind(&status)
        .bind(i64::from(filter.per_page))
        .bind(filter.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("failed to list subscriptions", e))?;

        Ok(SubscriptionPage {
            records: rows.into_iter().map(SubscriptionRecord::from).collect(),
            total: total.max(0) as u64,
            page: filter.page,
            per_page: filter.per_page,
        })
    }
}
