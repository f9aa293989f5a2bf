//! CheckEntitlementHandler - query handler for access checks.
//!
//! Answers "is this customer currently entitled" from the subscription
//! store. Read-only and safe to call on the request path of every protected
//! operation; entitlement is derived at query time, never cached.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::subscription::SubscriptionStatus;
use crate::ports::SubscriptionStore;

/// Query for a customer's entitlement.
#[derive(Debug, Clone)]
pub struct CheckEntitlementQuery {
    pub customer_email: String,
}

/// Current subscription status as seen by access control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionStatusView {
    /// Derived: `status == active` and the billing period has not elapsed.
    pub active: bool,
    pub plan_type: Option<String>,
    pub status: Option<SubscriptionStatus>,
    pub current_period_end: Option<Timestamp>,
}

impl SubscriptionStatusView {
    fn not_entitled() -> Self {
        Self {
            active: false,
            plan_type: None,
            status: None,
            current_period_end: None,
        }
    }
}

/// Handler for entitlement queries.
pub struct CheckEntitlementHandler {
    store: Arc<dyn SubscriptionStore>,
}

impl CheckEntitlementHandler {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    /// Resolve the customer's current entitlement.
    ///
    /// Picks the most recently created record that qualifies for access;
    /// when none does, falls back to the latest record (any status) so the
    /// caller can still show the customer where they stand. Absence of any
    /// record is simply "not entitled", never an error.
    pub async fn handle(
        &self,
        query: CheckEntitlementQuery,
    ) -> Result<SubscriptionStatusView, DomainError> {
        let now = Timestamp::now();

        if let Some(record) = self
            .store
            .entitled_record(&query.customer_email, now)
            .await?
        {
            return Ok(SubscriptionStatusView {
                active: true,
                plan_type: record.plan_type,
                status: Some(record.status),
                current_period_end: record.current_period_end,
            });
        }

        match self.store.latest_for_email(&query.customer_email).await? {
            Some(record) => Ok(SubscriptionStatusView {
                active: false,
                plan_type: record.plan_type,
                status: Some(record.status),
                current_period_end: record.current_period_end,
            }),
            None => Ok(SubscriptionStatusView::not_entitled()),
        }
    }
}
