//! Provider webhook event types and the event normalizer.
//!
//! The provider delivers a raw envelope `{ "type": ..., "data": ... }`. The
//! normalizer maps each recognized type into a typed internal event the
//! reconciler can apply. Unrecognized types normalize to `Unknown` - forward
//! compatibility with provider schema additions is mandatory, not a failure.

use serde::{Deserialize, Serialize};

use super::errors::WebhookError;
use super::record::SubscriptionStatus;
use crate::domain::foundation::Timestamp;

/// Raw provider webhook event (envelope).
///
/// Only the envelope shape is fixed; `data` is polymorphic based on `type`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderEvent {
    /// Type of event (e.g. "subscription.created").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Object containing event-specific data.
    pub data: serde_json::Value,
}

/// Provider event types that we recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderEventType {
    CheckoutCompleted,
    SubscriptionCreated,
    SubscriptionUpdated,
    SubscriptionCanceled,
    SubscriptionRevoked,
    Unknown,
}

impl ProviderEventType {
    /// Parse event type from the wire string.
    pub fn from_str(s: &str) -> Self {
        match s {
            "checkout.completed" => Self::CheckoutCompleted,
            "subscription.created" => Self::SubscriptionCreated,
            "subscription.updated" => Self::SubscriptionUpdated,
            "subscription.canceled" => Self::SubscriptionCanceled,
            "subscription.revoked" => Self::SubscriptionRevoked,
            _ => Self::Unknown,
        }
    }
}

impl ProviderEvent {
    /// Parse the event type into a known enum variant.
    pub fn parsed_type(&self) -> ProviderEventType {
        ProviderEventType::from_str(&self.event_type)
    }
}

// ── Payload shapes ──────────────────────────────────────────────────────────

/// Subscription object embedded in lifecycle event payloads.
///
/// The provider sends a superset of fields on each event, never a diff, so
/// every field except `id` is optional here and absent fields simply stay
/// `None` after normalization.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubscriptionObject {
    pub id: Option<String>,
    pub status: Option<String>,
    pub plan: Option<String>,
    /// Unix seconds.
    pub current_period_start: Option<i64>,
    /// Unix seconds.
    pub current_period_end: Option<i64>,
}

/// Customer object embedded in lifecycle event payloads.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CustomerObject {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct EventPayload {
    subscription: Option<SubscriptionObject>,
    customer: Option<CustomerObject>,
}

// ── Normalized events ───────────────────────────────────────────────────────

/// Field set carried by create/update lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionUpdate {
    pub subscription_id: String,
    pub customer_email: String,
    pub customer_name: Option<String>,
    pub plan_label: Option<String>,
    pub status: SubscriptionStatus,
    pub period_start: Option<Timestamp>,
    pub period_end: Option<Timestamp>,
}

/// Typed internal representation of a provider webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedEvent {
    /// First lifecycle event for a subscription (or checkout completion,
    /// which carries the same shape).
    Created(SubscriptionUpdate),
    /// Subsequent lifecycle update for a known subscription.
    Updated(SubscriptionUpdate),
    /// Customer-initiated cancellation.
    Canceled { subscription_id: String },
    /// Provider-initiated revocation (e.g. chargeback, fraud).
    Revoked { subscription_id: String },
    /// Unrecognized event type; logged and discarded without error.
    Unknown { event_type: String },
}

impl NormalizedEvent {
    /// Normalizes a raw provider event.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::MalformedEvent` when a recognized event is
    /// missing its required identity fields (`subscription.id` always;
    /// `customer.email` additionally for create/update events). Such events
    /// must not be partially applied.
    pub fn from_provider(event: &ProviderEvent) -> Result<Self, WebhookError> {
        let event_type = event.parsed_type();

        if event_type == ProviderEventType::Unknown {
            return Ok(NormalizedEvent::Unknown {
                event_type: event.event_type.clone(),
            });
        }

        let payload: EventPayload = serde_json::from_value(event.data.clone())
            .map_err(|e| WebhookError::MalformedEvent(format!("invalid payload: {}", e)))?;

        let subscription = payload
            .subscription
            .ok_or(WebhookError::missing_field("subscription"))?;
        let subscription_id = subscription
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or(WebhookError::missing_field("subscription.id"))?;

        match event_type {
            ProviderEventType::SubscriptionCanceled => {
                Ok(NormalizedEvent::Canceled { subscription_id })
            }
            ProviderEventType::SubscriptionRevoked => {
                Ok(NormalizedEvent::Revoked { subscription_id })
            }
            ProviderEventType::CheckoutCompleted
            | ProviderEventType::SubscriptionCreated
            | ProviderEventType::SubscriptionUpdated => {
                let customer = payload.customer.unwrap_or(CustomerObject {
                    email: None,
                    name: None,
                });
                let customer_email = customer
                    .email
                    .filter(|email| !email.is_empty())
                    .ok_or(WebhookError::missing_field("customer.email"))?;

                let update = SubscriptionUpdate {
                    subscription_id,
                    customer_email,
                    customer_name: customer.name,
                    plan_label: subscription.plan,
                    status: subscription
                        .status
                        .as_deref()
                        .map(SubscriptionStatus::parse)
                        .unwrap_or(SubscriptionStatus::Active),
                    period_start: subscription.current_period_start.map(Timestamp::from_unix),
                    period_end: subscription.current_period_end.map(Timestamp::from_unix),
                };

                if event_type == ProviderEventType::SubscriptionUpdated {
                    Ok(NormalizedEvent::Updated(update))
                } else {
                    Ok(NormalizedEvent::Created(update))
                }
            }
            ProviderEventType::Unknown => unreachable!("handled above"),
        }
    }
}

/// Builder for creating test ProviderEvent instances.
#[cfg(test)]
pub struct ProviderEventBuilder {
    event_type: String,
    data: serde_json::Value,
}

#[cfg(test)]
impl ProviderEventBuilder {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            data: serde_json::json!({}),
        }
    }

    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    pub fn build(self) -> ProviderEvent {
        ProviderEvent {
            event_type: self.event_type,
            data: self.data,
        }
    }
}
