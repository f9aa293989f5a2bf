//! Webhook error taxonomy for provider event handling.
//!
//! Defines all error conditions that can occur during webhook processing,
//! with HTTP status code mapping and retryability semantics. The provider's
//! redelivery mechanism is the only retry path, driven by the status code we
//! return.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::DomainError;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Webhook timestamp is outside the acceptable window (5 minutes).
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse the webhook body or signature header.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Recognized event missing required identity fields. Scoped to that
    /// event only; the handler discards it and moves on.
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// Storage-layer failure during apply. Transient; must not silently
    /// drop the event.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl WebhookError {
    /// Creates a MalformedEvent error for a missing required field.
    pub fn missing_field(field: &'static str) -> Self {
        WebhookError::MalformedEvent(format!("missing field: {}", field))
    }

    /// Returns true if the provider should retry delivering this webhook.
    ///
    /// Only transient storage failures are retryable; redelivering a
    /// malformed or forged event can never succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::StorageUnavailable(_))
    }

    /// Maps the error to an appropriate HTTP status code.
    ///
    /// Status codes determine the provider's retry behavior:
    /// - 2xx: event acknowledged, no retry
    /// - 4xx: client error, no retry
    /// - 5xx: server error, will retry
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature | WebhookError::TimestampOutOfRange => {
                StatusCode::UNAUTHORIZED
            }

            WebhookError::InvalidTimestamp
            | WebhookError::ParseError(_)
            | WebhookError::MalformedEvent(_) => StatusCode::BAD_REQUEST,

            WebhookError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::StorageUnavailable(err.to_string())
    }
}
