//! Subscription store port - the Event Store boundary.
//!
//! Defines the contract for the durable table of subscription records keyed
//! by provider subscription ID. This is the only shared mutable resource in
//! the system; all writers go through the reconciler's single upsert/update
//! path.
//!
//! # Design
//!
//! - **Atomic writes**: `upsert` and `transition` must each be a single
//!   atomic operation against the unique `subscription_id` key, never a
//!   read-modify-write split across two round trips. Correctness under
//!   concurrent out-of-order delivery lives here, not in the handlers.
//! - **No deletes**: records transition status; rows are never removed.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::subscription::{SubscriptionRecord, SubscriptionStatus, SubscriptionUpdate};

/// Filter and pagination for administrative listing.
#[derive(Debug, Clone)]
pub struct SubscriptionFilter {
    /// Restrict to records with this status.
    pub status: Option<SubscriptionStatus>,
    /// 1-based page number.
    pub page: u32,
    /// Records per page.
    pub per_page: u32,
}

impl Default for SubscriptionFilter {
    fn default() -> Self {
        Self {
            status: None,
            page: 1,
            per_page: 20,
        }
    }
}

impl SubscriptionFilter {
    /// Row offset for the current page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

/// One page of subscription records, newest-first.
#[derive(Debug, Clone)]
pub struct SubscriptionPage {
    pub records: Vec<SubscriptionRecord>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

/// Port for durable subscription record storage.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Insert-or-update keyed by `subscription_id`, atomic with respect to
    /// concurrent callers.
    ///
    /// If no record exists, inserts one with `created_at = now`. If one
    /// exists, overwrites `status`, `plan_type`, and the period fields with
    /// the event's values, refreshes `customer_email` (always present) and
    /// `customer_name` (when present), and sets `updated_at = now`.
    /// `created_at` is never touched on conflict.
    async fn upsert(
        &self,
        update: &SubscriptionUpdate,
        now: Timestamp,
    ) -> Result<SubscriptionRecord, DomainError>;

    /// Conditional status transition keyed by `subscription_id`.
    ///
    /// Sets `status`, `canceled_at = now`, `updated_at = now` in a single
    /// atomic operation. Returns `false` (not an error) when no record
    /// matches - a transition for an unseen subscription is a no-op.
    async fn transition(
        &self,
        subscription_id: &str,
        status: SubscriptionStatus,
        now: Timestamp,
    ) -> Result<bool, DomainError>;

    /// Look up a record by provider subscription ID.
    async fn find_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError>;

    /// The most recently created record for `customer_email` that currently
    /// grants access (`status = active` and `current_period_end > now`).
    ///
    /// Returns `None` when no record qualifies. Pure read; the freshness
    /// predicate is evaluated against `now` on every call, never cached.
    async fn entitled_record(
        &self,
        customer_email: &str,
        now: Timestamp,
    ) -> Result<Option<SubscriptionRecord>, DomainError>;

    /// The most recently created record for `customer_email` regardless of
    /// status. Used to surface status details when no record qualifies for
    /// access.
    async fn latest_for_email(
        &self,
        customer_email: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError>;

    /// Paginated listing of all records, newest-first, optionally filtered
    /// by status.
    async fn list(&self, filter: &SubscriptionFilter) -> Result<SubscriptionPage, DomainError>;
}
