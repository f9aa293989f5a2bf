//! StartCheckoutHandler - command handler for the checkout flow.

use std::sync::Arc;

use crate::ports::{CheckoutError, CheckoutProvider, CheckoutSession, CreateCheckoutRequest};

/// Command to start a checkout for a plan.
#[derive(Debug, Clone)]
pub struct StartCheckoutCommand {
    pub customer_email: String,
    pub plan_type: String,
    pub success_url: String,
    pub cancel_url: Option<String>,
}

/// Handler that creates checkout sessions at the billing provider.
pub struct StartCheckoutHandler {
    provider: Arc<dyn CheckoutProvider>,
}

impl StartCheckoutHandler {
    pub fn new(provider: Arc<dyn CheckoutProvider>) -> Self {
        Self { provider }
    }

    pub async fn handle(
        &self,
        cmd: StartCheckoutCommand,
    ) -> Result<CheckoutSession, CheckoutError> {
        self.provider
            .create_checkout_session(CreateCheckoutRequest {
                customer_email: cmd.customer_email,
                plan_type: cmd.plan_type,
                success_url: cmd.success_url,
                cancel_url: cmd.cancel_url,
            })
            .await
    }
}
