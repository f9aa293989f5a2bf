//! ListSubscriptionsHandler - administrative listing query.
//!
//! A thin projection over the store, not part of the reconciliation core.

use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::domain::subscription::SubscriptionStatus;
use crate::ports::{SubscriptionFilter, SubscriptionPage, SubscriptionStore};

/// Maximum page size for administrative listing.
const MAX_PER_PAGE: u32 = 100;

/// Query for the paginated subscription listing.
#[derive(Debug, Clone, Default)]
pub struct ListSubscriptionsQuery {
    pub status: Option<SubscriptionStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Handler for the administrative listing.
pub struct ListSubscriptionsHandler {
    store: Arc<dyn SubscriptionStore>,
}

impl ListSubscriptionsHandler {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        query: ListSubscriptionsQuery,
    ) -> Result<SubscriptionPage, DomainError> {
        let filter = SubscriptionFilter {
            status: query.status,
            page: query.page.unwrap_or(1).max(1),
            per_page: query.per_page.unwrap_or(20).clamp(1, MAX_PER_PAGE),
        };

        self.store.list(&filter).await
    }
}
