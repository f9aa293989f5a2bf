//! HTTP handlers for the subscription API.
//!
//! These handlers connect Axum routes to application layer command/query
//! handlers. The webhook endpoint is the only write path; everything else
//! reads.

use std::sync::Arc;

use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::{
    CheckEntitlementHandler, CheckEntitlementQuery, ListSubscriptionsHandler,
    ListSubscriptionsQuery, ProcessWebhookCommand, ProcessWebhookHandler, StartCheckoutCommand,
    StartCheckoutHandler,
};
use crate::domain::foundation::DomainError;
use crate::domain::subscription::{Reconciler, SubscriptionStatus, WebhookError, WebhookVerifier};
use crate::ports::{CheckoutError, CheckoutProvider, SubscriptionStore};

use super::dto::{
    CheckoutResponse, CreateCheckoutRequestBody, ErrorResponse, ListQueryParams,
    SubscriptionListResponse, SubscriptionStatusResponse, WebhookAckResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned per request; everything inside is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SubscriptionStore>,
    pub checkout_provider: Arc<dyn CheckoutProvider>,
    pub webhook_verifier: Arc<WebhookVerifier>,
}

impl AppState {
    /// Create handlers on demand from the shared state.
    pub fn webhook_handler(&self) -> ProcessWebhookHandler {
        ProcessWebhookHandler::new(
            self.webhook_verifier.clone(),
            Arc::new(Reconciler::new(self.store.clone())),
        )
    }

    pub fn entitlement_handler(&self) -> CheckEntitlementHandler {
        CheckEntitlementHandler::new(self.store.clone())
    }

    pub fn checkout_handler(&self) -> StartCheckoutHandler {
        StartCheckoutHandler::new(self.checkout_provider.clone())
    }

    pub fn list_handler(&self) -> ListSubscriptionsHandler {
        ListSubscriptionsHandler::new(self.store.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Customer Context (would come from auth middleware in production)
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated customer context extracted from the request.
///
/// In production this would come from JWT/session auth middleware. For now
/// an X-Customer-Email header stands in for it.
#[derive(Debug, Clone)]
pub struct AuthenticatedCustomer {
    pub email: String,
}

/// Rejection type for AuthenticatedCustomer extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedCustomer
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let email = parts
                .headers
                .get("X-Customer-Email")
                .and_then(|v| v.to_str().ok())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedCustomer { email })
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook endpoint
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/billing - ingest one provider webhook delivery.
///
/// Applied events, no-ops, and unknown event types all acknowledge with
/// `200 {"success": true}` so the provider does not redeliver them.
/// Storage failures return 503: the provider's retry mechanism is the only
/// recovery path for a transiently failed write.
pub async fn handle_billing_webhook(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> axum::response::Response {
    let Some(signature) = headers
        .get("Webhook-Signature")
        .and_then(|v| v.to_str().ok())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "MISSING_SIGNATURE",
                "Missing Webhook-Signature header",
            )),
        )
            .into_response();
    };

    let handler = state.webhook_handler();
    let cmd = ProcessWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    match handler.handle(cmd).await {
        Ok(_) => (StatusCode::OK, Json(WebhookAckResponse { success: true })).into_response(),
        Err(err) => {
            tracing::warn!(
                error = %err,
                retryable = err.is_retryable(),
                "webhook delivery rejected"
            );
            (
                err.status_code(),
                Json(WebhookAckResponse { success: false }),
            )
                .into_response()
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Query endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/subscription - entitlement status for the authenticated customer.
pub async fn get_subscription_status(
    State(state): State<AppState>,
    customer: AuthenticatedCustomer,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.entitlement_handler();
    let view = handler
        .handle(CheckEntitlementQuery {
            customer_email: customer.email,
        })
        .await?;

    Ok(Json(SubscriptionStatusResponse::from(view)))
}

/// GET /api/subscriptions - administrative listing, newest-first.
pub async fn list_subscriptions(
    State(state): State<AppState>,
    Query(params): Query<ListQueryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.list_handler();
    let page = handler
        .handle(ListSubscriptionsQuery {
            status: params.status.as_deref().map(SubscriptionStatus::parse),
            page: params.page,
            per_page: params.per_page,
        })
        .await?;

    Ok(Json(SubscriptionListResponse::from(page)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Checkout endpoint
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/checkout - create a checkout session for a plan.
pub async fn create_checkout(
    State(state): State<AppState>,
    customer: AuthenticatedCustomer,
    Json(request): Json<CreateCheckoutRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.checkout_handler();
    let session = handler
        .handle(StartCheckoutCommand {
            customer_email: customer.email,
            plan_type: request.plan_type,
            success_url: request.success_url,
            cancel_url: request.cancel_url,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CheckoutResponse::from(session))))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts domain errors to HTTP responses.
pub enum ApiError {
    Domain(DomainError),
    Checkout(CheckoutError),
    Webhook(WebhookError),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        ApiError::Webhook(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match &self {
            ApiError::Domain(err) => {
                tracing::error!(error = %err, "request failed on storage");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR".to_string(),
                    "Internal error".to_string(),
                )
            }
            ApiError::Checkout(CheckoutError::InvalidPlan(plan)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_PLAN".to_string(),
                format!("Unknown plan type: {}", plan),
            ),
            ApiError::Checkout(CheckoutError::ProviderUnavailable(_)) => (
                StatusCode::BAD_GATEWAY,
                "PROVIDER_UNAVAILABLE".to_string(),
                "Billing provider unavailable".to_string(),
            ),
            ApiError::Webhook(err) => (
                err.status_code(),
                "WEBHOOK_ERROR".to_string(),
                err.to_string(),
            ),
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}
