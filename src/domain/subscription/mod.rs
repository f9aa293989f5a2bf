//! Subscription reconciliation domain.
//!
//! The core of the service: provider event normalization, the reconciler
//! that applies events to the store, the record model, webhook signature
//! verification, and the webhook error taxonomy.

mod errors;
mod event;
mod record;
mod reconciler;
mod signature;

pub use errors::WebhookError;
pub use event::{
    CustomerObject, NormalizedEvent, ProviderEvent, ProviderEventType, SubscriptionObject,
    SubscriptionUpdate,
};
pub use record::{SubscriptionRecord, SubscriptionStatus};
pub use reconciler::{ApplyOutcome, Reconciler};
pub use signature::{SignatureHeader, WebhookVerifier};

#[cfg(test)]
pub use event::ProviderEventBuilder;
