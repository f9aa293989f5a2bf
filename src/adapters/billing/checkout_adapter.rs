//! Billing provider checkout adapter.
//!
//! Implements the `CheckoutProvider` port against the provider's HTTP API.
//! Plan labels are resolved to provider product IDs through an injected
//! read-only catalog; nothing here is process-wide mutable state.

use std::collections::HashMap;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::ports::{CheckoutError, CheckoutProvider, CheckoutSession, CreateCheckoutRequest};

/// Static plan-label to provider-product-ID mapping.
#[derive(Debug, Clone, Default)]
pub struct PlanCatalog {
    products: HashMap<String, String>,
}

impl PlanCatalog {
    pub fn new(products: HashMap<String, String>) -> Self {
        Self { products }
    }

    /// Resolve a plan label to its provider product ID.
    pub fn resolve(&self, plan_type: &str) -> Option<&str> {
        self.products.get(plan_type).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl FromIterator<(String, String)> for PlanCatalog {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            products: iter.into_iter().collect(),
        }
    }
}

/// Checkout session response from the provider API.
#[derive(Debug, Deserialize)]
struct ProviderCheckoutSession {
    id: String,
    url: String,
}

/// HTTP checkout adapter for the billing provider.
pub struct BillingCheckoutAdapter {
    api_key: SecretString,
    api_base_url: String,
    catalog: PlanCatalog,
    http_client: reqwest::Client,
}

impl BillingCheckoutAdapter {
    pub fn new(api_key: impl Into<String>, api_base_url: impl Into<String>, catalog: PlanCatalog) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: api_base_url.into(),
            catalog,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CheckoutProvider for BillingCheckoutAdapter {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError> {
        let product_id = self
            .catalog
            .resolve(&request.plan_type)
            .ok_or_else(|| CheckoutError::InvalidPlan(request.plan_type.clone()))?;

        let url = format!("{}/v1/checkouts", self.api_base_url);

        let mut params = vec![
            ("product", product_id.to_string()),
            ("customer_email", request.customer_email.clone()),
            ("success_url", request.success_url.clone()),
        ];
        if let Some(cancel_url) = &request.cancel_url {
            params.push(("cancel_url", cancel_url.clone()));
        }

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .form(&params)
            .send()
            .await
            .map_err(|e| CheckoutError::ProviderUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %error_text, "checkout session creation failed");
            return Err(CheckoutError::ProviderUnavailable(format!(
                "provider returned {}: {}",
                status, error_text
            )));
        }

        let session: ProviderCheckoutSession = response.json().await.map_err(|e| {
            CheckoutError::ProviderUnavailable(format!("invalid provider response: {}", e))
        })?;

        tracing::info!(
            checkout_id = %session.id,
            plan_type = %request.plan_type,
            "checkout session created"
        );

        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
        })
    }
}
