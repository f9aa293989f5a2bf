//! In-memory implementation of SubscriptionStore.
//!
//! Backs unit and integration tests without a database. Each trait method
//! holds the write lock for its full duration, which gives the same
//! atomicity the PostgreSQL adapter gets from single-statement writes.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::subscription::{SubscriptionRecord, SubscriptionStatus, SubscriptionUpdate};
use crate::ports::{SubscriptionFilter, SubscriptionPage, SubscriptionStore};

/// In-memory subscription store.
pub struct InMemorySubscriptionStore {
    records: Arc<RwLock<Vec<SubscriptionRecord>>>,
    fail_writes: Arc<RwLock<bool>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            fail_writes: Arc::new(RwLock::new(false)),
        }
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Make subsequent writes fail, simulating storage unavailability.
    pub async fn fail_writes(&self, fail: bool) {
        *self.fail_writes.write().await = fail;
    }

    async fn check_available(&self) -> Result<(), DomainError> {
        if *self.fail_writes.read().await {
            Err(DomainError::database("simulated storage failure"))
        } else {
            Ok(())
        }
    }
}

impl Default for InMemorySubscriptionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn upsert(
        &self,
        update: &SubscriptionUpdate,
        now: Timestamp,
    ) -> Result<SubscriptionRecord, DomainError> {
        self.check_available().await?;
        let mut records = self.records.write().await;

        if let Some(existing) = records
            .iter_mut()
            .find(|r| r.subscription_id == update.subscription_id)
        {
            existing.status = update.status.clone();
            existing.plan_type = update
                .plan_label
                .clone()
                .or_else(|| existing.plan_type.clone());
            existing.current_period_start = update.period_start;
            existing.current_period_end = update.period_end;
            existing.customer_email = update.customer_email.clone();
            if update.customer_name.is_some() {
                existing.customer_name = update.customer_name.clone();
            }
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let record = SubscriptionRecord {
            id: Uuid::new_v4(),
            subscription_id: update.subscription_id.clone(),
            customer_email: update.customer_email.clone(),
            customer_name: update.customer_name.clone(),
            plan_type: update.plan_label.clone(),
            status: update.status.clone(),
            current_period_start: update.period_start,
            current_period_end: update.period_end,
            canceled_at: None,
            created_at: now,
            updated_at: now,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn transition(
        &self,
        subscription_id: &str,
        status: SubscriptionStatus,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        self.check_available().await?;
        let mut records = self.records.write().await;

        match records
            .iter_mut()
            .find(|r| r.subscription_id == subscription_id)
        {
            Some(record) => {
                record.status = status;
                record.canceled_at = Some(now);
                record.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.subscription_id == subscription_id)
            .cloned())
    }

    async fn entitled_record(
        &self,
        customer_email: &str,
        now: Timestamp,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.customer_email == customer_email && r.is_entitled(&now))
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn latest_for_email(
        &self,
        customer_email: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.customer_email == customer_email)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn list(&self, filter: &SubscriptionFilter) -> Result<SubscriptionPage, DomainError> {
        let records = self.records.read().await;

        let mut matching: Vec<SubscriptionRecord> = records
            .iter()
            .filter(|r| {
                filter
                    .status
                    .as_ref()
                    .map(|s| &r.status == s)
                    .unwrap_or(true)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let page_records = matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.per_page as usize)
            .collect();

        Ok(SubscriptionPage {
            records: page_records,
            total,
            page: filter.page,
            per_page: filter.per_page,
        })
    }
}
