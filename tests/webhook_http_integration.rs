//! Integration tests for the HTTP surface.
//!
//! Exercises the full Axum router with in-memory adapters: signed webhook
//! ingestion, entitlement queries, checkout creation and the admin listing.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use subsync::adapters::billing::MockCheckoutProvider;
use subsync::adapters::http::{api_router, AppState};
use subsync::adapters::memory::InMemorySubscriptionStore;
use subsync::domain::foundation::Timestamp;
use subsync::domain::subscription::WebhookVerifier;

const WEBHOOK_SECRET: &str = "whsec_test_secret";

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestApp {
    router: Router,
    store: Arc<InMemorySubscriptionStore>,
    verifier: WebhookVerifier,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(InMemorySubscriptionStore::new());
        let state = AppState {
            store: store.clone(),
            checkout_provider: Arc::new(MockCheckoutProvider::new(vec!["pro".to_string()])),
            webhook_verifier: Arc::new(WebhookVerifier::new(WEBHOOK_SECRET)),
        };
        Self {
            router: api_router().with_state(state),
            store,
            verifier: WebhookVerifier::new(WEBHOOK_SECRET),
        }
    }

    /// Post a webhook body signed with the configured secret.
    async fn deliver_signed(&self, body: &Value) -> (StatusCode, Value) {
        let payload = serde_json::to_vec(body).unwrap();
        let signature = self.verifier.sign(chrono::Utc::now().timestamp(), &payload);
        self.deliver_with_signature(payload, Some(&signature)).await
    }

    async fn deliver_with_signature(
        &self,
        payload: Vec<u8>,
        signature: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/webhooks/billing")
            .header("content-type", "application/json");
        if let Some(sig) = signature {
            builder = builder.header("Webhook-Signature", sig);
        }
        let request = builder.body(Body::from(payload)).unwrap();
        self.send(request).await
    }

    async fn get_status(&self, email: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri("/subscription")
            .header("X-Customer-Email", email)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

fn created_event(subscription_id: &str, email: &str, period_end: Timestamp) -> Value {
    json!({
        "type": "subscription.created",
        "data": {
            "subscription": {
                "id": subscription_id,
                "status": "active",
                "plan": "pro",
                "current_period_end": period_end.as_unix()
            },
            "customer": { "email": email }
        }
    })
}

// =============================================================================
// Webhook ingestion
// =============================================================================

#[tokio::test]
async fn signed_created_event_is_applied_and_acknowledged() {
    let app = TestApp::new();
    let event = created_event("sub_1", "ada@example.com", Timestamp::now().add_days(1));

    let (status, body) = app.deliver_signed(&event).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn forged_signature_is_rejected_before_any_write() {
    let app = TestApp::new();
    let event = created_event("sub_1", "ada@example.com", Timestamp::now().add_days(1));
    let payload = serde_json::to_vec(&event).unwrap();
    let forged = WebhookVerifier::new("whsec_wrong").sign(chrono::Utc::now().timestamp(), &payload);

    let (status, body) = app.deliver_with_signature(payload, Some(&forged)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(app.store.len().await, 0);
}

#[tokio::test]
async fn missing_signature_header_is_a_bad_request() {
    let app = TestApp::new();
    let event = created_event("sub_1", "ada@example.com", Timestamp::now().add_days(1));
    let payload = serde_json::to_vec(&event).unwrap();

    let (status, body) = app.deliver_with_signature(payload, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "MISSING_SIGNATURE");
}

#[tokio::test]
async fn malformed_event_returns_400_without_write() {
    let app = TestApp::new();
    let event = json!({
        "type": "subscription.created",
        "data": { "subscription": { "status": "active" } }
    });

    let (status, body) = app.deliver_signed(&event).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(app.store.len().await, 0);
}

#[tokio::test]
async fn unknown_event_type_is_acknowledged() {
    let app = TestApp::new();
    let event = json!({
        "type": "invoice.finalized",
        "data": { "invoice": { "id": "in_1" } }
    });

    let (status, body) = app.deliver_signed(&event).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(app.store.len().await, 0);
}

#[tokio::test]
async fn storage_failure_returns_retryable_503() {
    let app = TestApp::new();
    app.store.fail_writes(true).await;
    let event = created_event("sub_1", "ada@example.com", Timestamp::now().add_days(1));

    let (status, body) = app.deliver_signed(&event).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);

    // Redelivery succeeds once storage recovers.
    app.store.fail_writes(false).await;
    let (status, _) = app.deliver_signed(&event).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.store.len().await, 1);
}

// =============================================================================
// Entitlement queries
// =============================================================================

#[tokio::test]
async fn entitlement_reflects_webhook_lifecycle() {
    let app = TestApp::new();
    let email = "ada@example.com";

    // No record yet.
    let (status, body) = app.get_status(email).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], false);

    // Active subscription.
    app.deliver_signed(&created_event("sub_1", email, Timestamp::now().add_days(1)))
        .await;
    let (_, body) = app.get_status(email).await;
    assert_eq!(body["active"], true);
    assert_eq!(body["plan_type"], "pro");
    assert_eq!(body["status"], "active");

    // Cancellation revokes access but keeps the status visible.
    app.deliver_signed(&json!({
        "type": "subscription.canceled",
        "data": { "subscription": { "id": "sub_1" } }
    }))
    .await;
    let (_, body) = app.get_status(email).await;
    assert_eq!(body["active"], false);
    assert_eq!(body["status"], "canceled");
}

#[tokio::test]
async fn status_query_requires_customer_header() {
    let app = TestApp::new();

    let request = Request::builder()
        .method("GET")
        .uri("/subscription")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTHENTICATION_REQUIRED");
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn checkout_returns_session_for_known_plan() {
    let app = TestApp::new();

    let request = Request::builder()
        .method("POST")
        .uri("/checkout")
        .header("X-Customer-Email", "ada@example.com")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "plan_type": "pro",
                "success_url": "https://app.example.com/done"
            })
            .to_string(),
        ))
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["checkout_url"].as_str().unwrap().starts_with("http"));
    assert!(!body["checkout_id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn checkout_rejects_unknown_plan() {
    let app = TestApp::new();

    let request = Request::builder()
        .method("POST")
        .uri("/checkout")
        .header("X-Customer-Email", "ada@example.com")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "plan_type": "platinum",
                "success_url": "https://app.example.com/done"
            })
            .to_string(),
        ))
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "INVALID_PLAN");
}

// =============================================================================
// Admin listing
// =============================================================================

#[tokio::test]
async fn admin_listing_filters_by_status() {
    let app = TestApp::new();
    let tomorrow = Timestamp::now().add_days(1);

    app.deliver_signed(&created_event("sub_1", "ada@example.com", tomorrow))
        .await;
    app.deliver_signed(&created_event("sub_2", "grace@example.com", tomorrow))
        .await;
    app.deliver_signed(&json!({
        "type": "subscription.canceled",
        "data": { "subscription": { "id": "sub_2" } }
    }))
    .await;

    let request = Request::builder()
        .method("GET")
        .uri("/subscriptions?status=canceled")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["subscriptions"][0]["subscription_id"], "sub_2");
    assert_eq!(body["subscriptions"][0]["status"], "canceled");

    let request = Request::builder()
        .method("GET")
        .uri("/subscriptions")
        .body(Body::empty())
        .unwrap();
    let (_, body) = app.send(request).await;
    assert_eq!(body["total"], 2);
}
