//! Billing provider configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::adapters::billing::PlanCatalog;

/// Billing provider configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillingConfig {
    /// Provider API key
    pub api_key: String,

    /// Webhook signing secret shared with the provider
    pub webhook_secret: String,

    /// Base URL of the provider API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Plan mapping as comma-separated `plan=provider_price_id` pairs,
    /// e.g. `monthly=price_abc,annual=price_xyz`
    pub plans: Option<String>,
}

impl BillingConfig {
    /// Build the plan catalog from the configured mapping
    pub fn plan_catalog(&self) -> Result<PlanCatalog, ValidationError> {
        let Some(raw) = self.plans.as_deref() else {
            return Ok(PlanCatalog::default());
        };

        let mut pairs = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (plan, price_id) = entry
                .split_once('=')
                .ok_or_else(|| ValidationError::InvalidPlanMapping(entry.to_string()))?;
            let (plan, price_id) = (plan.trim(), price_id.trim());
            if plan.is_empty() || price_id.is_empty() {
                return Err(ValidationError::InvalidPlanMapping(entry.to_string()));
            }
            pairs.push((plan.to_string(), price_id.to_string()));
        }
        Ok(pairs.into_iter().collect())
    }

    /// Validate billing configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("BILLING_API_KEY"));
        }
        if self.webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("BILLING_WEBHOOK_SECRET"));
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBillingApiUrl);
        }
        self.plan_catalog().map(|_| ())
    }
}

fn default_api_base_url() -> String {
    "https://api.billing.example.com".to_string()
}
