//! Checkout provider port for the outbound billing provider boundary.
//!
//! A one-shot outbound call: given a customer and a plan, create a checkout
//! session at the provider and hand back the redirect URL. No durable state
//! is involved on our side; the resulting subscription arrives later as
//! webhook events.

use async_trait::async_trait;
use thiserror::Error;

/// Request to create a checkout session.
#[derive(Debug, Clone)]
pub struct CreateCheckoutRequest {
    /// Customer email, pre-filled at the provider's checkout page.
    pub customer_email: String,

    /// Plan label to resolve against the configured plan catalog.
    pub plan_type: String,

    /// URL to redirect after successful checkout.
    pub success_url: String,

    /// URL to redirect after abandoned checkout.
    pub cancel_url: Option<String>,
}

/// Checkout session created at the provider.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// Provider's checkout session ID.
    pub id: String,

    /// URL for the customer to complete payment.
    pub url: String,
}

/// Errors from the checkout path. Surfaced to the caller as user-facing
/// failures; there is no retry machinery here.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The plan label has no configured provider product ID.
    #[error("Unknown plan type: {0}")]
    InvalidPlan(String),

    /// The provider call failed (network or provider-side error).
    #[error("Billing provider unavailable: {0}")]
    ProviderUnavailable(String),
}

/// Port for billing provider checkout integrations.
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    /// Create a checkout session for the given customer and plan.
    ///
    /// # Errors
    ///
    /// - `InvalidPlan` when `plan_type` is not in the plan catalog
    /// - `ProviderUnavailable` when the provider call errors
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError>;
}
