//! Axum router configuration.
//!
//! # Routes
//!
//! ## Customer endpoints (require authentication)
//! - `GET /subscription` - entitlement status for the current customer
//! - `POST /checkout` - start a checkout flow
//!
//! ## Admin endpoints
//! - `GET /subscriptions` - paginated listing with optional status filter
//!
//! ## Webhook endpoints (no auth, signature verified)
//! - `POST /webhooks/billing` - ingest provider lifecycle events

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_checkout, get_subscription_status, handle_billing_webhook, list_subscriptions,
    AppState,
};

/// Create the subscription API router.
pub fn subscription_routes() -> Router<AppState> {
    Router::new()
        .route("/subscription", get(get_subscription_status))
        .route("/subscriptions", get(list_subscriptions))
        .route("/checkout", post(create_checkout))
}

/// Create the webhook router.
///
/// Separate from the API routes because webhook deliveries carry no user
/// authentication; they are trusted only after signature verification.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/billing", post(handle_billing_webhook))
}

/// Create the complete API router, suitable for mounting at `/api`.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(subscription_routes())
        .nest("/webhooks", webhook_routes())
}
