//! Request/response DTOs for the HTTP API.
//!
//! These are the wire shapes only; conversion from domain types lives here
//! so handlers stay thin.

use serde::{Deserialize, Serialize};

use crate::application::handlers::SubscriptionStatusView;
use crate::domain::subscription::SubscriptionRecord;
use crate::ports::{CheckoutSession, SubscriptionPage};

/// Standard error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// Webhook acknowledgment body.
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookAckResponse {
    pub success: bool,
}

/// GET /api/subscription response.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionStatusResponse {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_period_end: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<SubscriptionStatusView> for SubscriptionStatusResponse {
    fn from(view: SubscriptionStatusView) -> Self {
        Self {
            active: view.active,
            plan_type: view.plan_type,
            status: view.status.map(|s| s.as_str().to_string()),
            current_period_end: view.current_period_end.map(|t| *t.as_datetime()),
        }
    }
}

/// POST /api/checkout request.
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateCheckoutRequestBody {
    pub plan_type: String,
    pub success_url: String,
    #[serde(default)]
    pub cancel_url: Option<String>,
}

/// POST /api/checkout response.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
    pub checkout_id: String,
}

impl From<CheckoutSession> for CheckoutResponse {
    fn from(session: CheckoutSession) -> Self {
        Self {
            checkout_url: session.url,
            checkout_id: session.id,
        }
    }
}

/// One record in the administrative listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionRecordResponse {
    pub subscription_id: String,
    pub customer_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_type: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_period_end: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canceled_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<SubscriptionRecord> for SubscriptionRecordResponse {
    fn from(record: SubscriptionRecord) -> Self {
        Self {
            subscription_id: record.subscription_id,
            customer_email: record.customer_email,
            customer_name: record.customer_name,
            plan_type: record.plan_type,
            status: record.status.as_str().to_string(),
            current_period_end: record.current_period_end.map(|t| *t.as_datetime()),
            canceled_at: record.canceled_at.map(|t| *t.as_datetime()),
            created_at: *record.created_at.as_datetime(),
            updated_at: *record.updated_at.as_datetime(),
        }
    }
}

/// GET /api/subscriptions query parameters.
#[derive(Debug, Deserialize, Default)]
pub struct ListQueryParams {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// GET /api/subscriptions response.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionListResponse {
    pub subscriptions: Vec<SubscriptionRecordResponse>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl From<SubscriptionPage> for SubscriptionListResponse {
    fn from(page: SubscriptionPage) -> Self {
        Self {
            subscriptions: page
                .records
                .into_iter()
                .map(SubscriptionRecordResponse::from)
                .collect(),
            total: page.total,
            page: page.page,
            per_page: page.per_page,
        }
    }
}
