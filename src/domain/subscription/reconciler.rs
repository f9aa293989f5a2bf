//! Reconciler - applies normalized provider events to the subscription store.
//!
//! This is the single write path into the Event Store. Every transition is an
//! absolute-value overwrite keyed by `subscription_id`, so applying the same
//! event twice (at-least-once delivery) produces the same end state as
//! applying it once. No in-process coordination is needed between concurrent
//! deliveries: the store's atomic upsert/conditional-update carries the
//! consistency guarantee.

use std::sync::Arc;

use super::errors::WebhookError;
use super::event::NormalizedEvent;
use super::record::SubscriptionStatus;
use crate::domain::foundation::Timestamp;
use crate::ports::SubscriptionStore;

/// Outcome of applying one normalized event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A record was inserted or overwritten via the upsert path.
    Upserted,
    /// An existing record's status was transitioned.
    Transitioned,
    /// Nothing to do: unknown event type, or a transition for a
    /// subscription we have never seen.
    Noop,
}

/// Applies normalized events to the subscription store.
pub struct Reconciler {
    store: Arc<dyn SubscriptionStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    /// Apply one normalized event.
    ///
    /// - `Created` / `Updated`: idempotent upsert by `subscription_id`. The
    ///   provider sends a superset of fields on each event, never a diff, so
    ///   creation and update share one path.
    /// - `Canceled` / `Revoked`: conditional status transition. A transition
    ///   for an unseen subscription is logged and recorded as a no-op, since
    ///   there is nothing to transition.
    /// - `Unknown`: logged no-op.
    ///
    /// # Errors
    ///
    /// `StorageUnavailable` when the store fails; the transport layer maps
    /// this to a retryable response so the provider redelivers.
    pub async fn apply(&self, event: NormalizedEvent) -> Result<ApplyOutcome, WebhookError> {
        let now = Timestamp::now();

        match event {
            NormalizedEvent::Created(update) | NormalizedEvent::Updated(update) => {
                let record = self.store.upsert(&update, now).await?;
                tracing::info!(
                    subscription_id = %record.subscription_id,
                    status = %record.status,
                    "subscription upserted"
                );
                Ok(ApplyOutcome::Upserted)
            }

            NormalizedEvent::Canceled { subscription_id } => {
                self.transition(&subscription_id, SubscriptionStatus::Canceled, now)
                    .await
            }

            NormalizedEvent::Revoked { subscription_id } => {
                self.transition(&subscription_id, SubscriptionStatus::Revoked, now)
                    .await
            }

            NormalizedEvent::Unknown { event_type } => {
                tracing::info!(event_type = %event_type, "ignoring unrecognized event type");
                Ok(ApplyOutcome::Noop)
            }
        }
    }

    async fn transition(
        &self,
        subscription_id: &str,
        status: SubscriptionStatus,
        now: Timestamp,
    ) -> Result<ApplyOutcome, WebhookError> {
        let matched = self
            .store
            .transition(subscription_id, status.clone(), now)
            .await?;

        if matched {
            tracing::info!(
                subscription_id = %subscription_id,
                status = %status,
                "subscription transitioned"
            );
            Ok(ApplyOutcome::Transitioned)
        } else {
            tracing::warn!(
                subscription_id = %subscription_id,
                status = %status,
                "transition for unseen subscription - recorded as no-op"
            );
            Ok(ApplyOutcome::Noop)
        }
    }
}
