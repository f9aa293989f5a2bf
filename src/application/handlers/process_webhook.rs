//! ProcessWebhookHandler - command handler for inbound provider webhooks.
//!
//! Coordinates the full ingest path: verify the delivery signature, parse
//! the envelope, normalize the event, and apply it through the reconciler.
//! Each delivery is handled as an independent, stateless request.

use std::sync::Arc;

use crate::domain::subscription::{
    ApplyOutcome, NormalizedEvent, Reconciler, WebhookError, WebhookVerifier,
};

/// Command to process one webhook delivery.
#[derive(Debug, Clone)]
pub struct ProcessWebhookCommand {
    /// Raw request body, exactly as delivered.
    pub payload: Vec<u8>,
    /// Webhook-Signature header value.
    pub signature: String,
}

/// Handler for provider webhook deliveries.
pub struct ProcessWebhookHandler {
    verifier: Arc<WebhookVerifier>,
    reconciler: Arc<Reconciler>,
}

impl ProcessWebhookHandler {
    pub fn new(verifier: Arc<WebhookVerifier>, reconciler: Arc<Reconciler>) -> Self {
        Self {
            verifier,
            reconciler,
        }
    }

    /// Verify, normalize, and apply one delivery.
    ///
    /// Unknown event types and transitions for unseen subscriptions come
    /// back as `ApplyOutcome::Noop`, which the transport acknowledges as
    /// success - the provider must not redeliver them.
    pub async fn handle(&self, cmd: ProcessWebhookCommand) -> Result<ApplyOutcome, WebhookError> {
        let event = self.verifier.verify_and_parse(&cmd.payload, &cmd.signature)?;

        tracing::debug!(event_type = %event.event_type, "webhook delivery verified");

        let normalized = NormalizedEvent::from_provider(&event)?;
        self.reconciler.apply(normalized).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySubscriptionStore;
    use serde_json::json;

    const SECRET: &str = "whsec_test";

    fn handler() -> (ProcessWebhookHandler, Arc<InMemorySubscriptionStore>) {
        let store = Arc::new(InMemorySubscriptionStore::new());
        let handler = ProcessWebhookHandler::new(
            Arc::new(WebhookVerifier::new(SECRET)),
            Arc::new(Reconciler::new(store.clone())),
        );
        (handler, store)
    }

    fn signed_command(body: serde_json::Value) -> ProcessWebhookCommand {
        let payload = serde_json::to_vec(&body).unwrap();
        let signature =
            WebhookVerifier::new(SECRET).sign(chrono::Utc::now().timestamp(), &payload);
        ProcessWebhookCommand { payload, signature }
    }

    #[tokio::test]
    async fn valid_created_event_is_applied() {
        let (handler, store) = handler();

        let outcome = handler
            .handle(signed_command(json!({
                "type": "subscription.created",
                "data": {
                    "subscription": {"id": "sub_1", "status": "active"},
                    "customer": {"email": "a@b.com"}
                }
            })))
            .await
            .unwrap();

        assert_eq!(outcome, ApplyOutcome::Upserted);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn bad_signature_is_rejected_before_any_write() {
        let (handler, store) = handler();

        let payload = serde_json::to_vec(&json!({
            "type": "subscription.created",
            "data": {
                "subscription": {"id": "sub_1", "status": "active"},
                "customer": {"email": "a@b.com"}
            }
        }))
        .unwrap();
        let forged =
            WebhookVerifier::new("whsec_wrong").sign(chrono::Utc::now().timestamp(), &payload);

        let result = handler
            .handle(ProcessWebhookCommand {
                payload,
                signature: forged,
            })
            .await;

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn unknown_event_type_is_acknowledged_noop() {
        let (handler, _) = handler();

        let outcome = handler
            .handle(signed_command(json!({
                "type": "benefit.granted",
                "data": {}
            })))
            .await
            .unwrap();

        assert_eq!(outcome, ApplyOutcome::Noop);
    }

    #[tokio::test]
    async fn malformed_event_is_surfaced_without_partial_apply() {
        let (handler, store) = handler();

        let result = handler
            .handle(signed_command(json!({
                "type": "subscription.created",
                "data": {"subscription": {"status": "active"}}
            })))
            .await;

        assert!(matches!(result, Err(WebhookError::MalformedEvent(_))));
        assert_eq!(store.len().await, 0);
    }
}
