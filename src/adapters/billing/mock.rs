//! Mock checkout provider for tests and local development.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{CheckoutError, CheckoutProvider, CheckoutSession, CreateCheckoutRequest};

/// Checkout provider that fabricates sessions without network calls.
///
/// Records every request it receives so tests can assert on them.
pub struct MockCheckoutProvider {
    known_plans: Vec<String>,
    requests: Mutex<Vec<CreateCheckoutRequest>>,
}

impl MockCheckoutProvider {
    pub fn new(known_plans: Vec<String>) -> Self {
        Self {
            known_plans,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests seen so far.
    pub fn requests(&self) -> Vec<CreateCheckoutRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CheckoutProvider for MockCheckoutProvider {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError> {
        if !self.known_plans.contains(&request.plan_type) {
            return Err(CheckoutError::InvalidPlan(request.plan_type));
        }

        self.requests.lock().unwrap().push(request);
        let n = self.requests.lock().unwrap().len();

        Ok(CheckoutSession {
            id: format!("co_mock_{}", n),
            url: format!("https://checkout.example/pay/co_mock_{}", n),
        })
    }
}
