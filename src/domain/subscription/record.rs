//! Subscription record - the Event Store row model.
//!
//! One record per provider subscription ID. Records are created on the first
//! lifecycle event for a subscription, mutated in place on every subsequent
//! event, and never physically deleted: cancellation and revocation are
//! status transitions, preserving audit history.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::Timestamp;

/// Lifecycle status of a subscription.
///
/// `Active`, `Canceled`, and `Revoked` are the statuses this service assigns
/// or reasons about. Any other provider-defined status string is passed
/// through verbatim as `Other` - the provider is the source of truth and new
/// statuses must not break ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
    Revoked,
    Other(String),
}

impl SubscriptionStatus {
    /// Returns the wire representation of the status.
    pub fn as_str(&self) -> &str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Revoked => "revoked",
            SubscriptionStatus::Other(s) => s.as_str(),
        }
    }

    /// Parses a provider status string.
    ///
    /// Never fails: unrecognized values become `Other`.
    pub fn parse(s: &str) -> Self {
        match s {
            "active" => SubscriptionStatus::Active,
            "canceled" => SubscriptionStatus::Canceled,
            "revoked" => SubscriptionStatus::Revoked,
            other => SubscriptionStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for SubscriptionStatus {
    fn from(s: String) -> Self {
        SubscriptionStatus::parse(&s)
    }
}

impl From<SubscriptionStatus> for String {
    fn from(status: SubscriptionStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Durable subscription record keyed by provider subscription ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// Internal primary key.
    pub id: Uuid,

    /// Provider-assigned subscription ID. Unique, immutable identity key.
    pub subscription_id: String,

    /// Entitlement lookup key. Not unique - a customer may have
    /// historical records.
    pub customer_email: String,

    /// Customer display name, when the provider supplied one.
    pub customer_name: Option<String>,

    /// Plan label (product identifier in catalog terms).
    pub plan_type: Option<String>,

    /// Current lifecycle status as reported by the provider.
    pub status: SubscriptionStatus,

    /// Start of the current billing period, when known.
    pub current_period_start: Option<Timestamp>,

    /// End of the current billing period, when known.
    pub current_period_end: Option<Timestamp>,

    /// Set only by cancel/revoke transitions.
    pub canceled_at: Option<Timestamp>,

    /// Set once when the record is first created.
    pub created_at: Timestamp,

    /// Refreshed on every accepted transition.
    pub updated_at: Timestamp,
}

impl SubscriptionRecord {
    /// Derived entitlement check, re-evaluated at query time.
    ///
    /// A record grants access only while its status is `active` and its
    /// billing period has not elapsed. A missing period end never grants
    /// access.
    pub fn is_entitled(&self, now: &Timestamp) -> bool {
        self.status == SubscriptionStatus::Active
            && self
                .current_period_end
                .map(|end| end.is_after(now))
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: SubscriptionStatus, period_end: Option<Timestamp>) -> SubscriptionRecord {
        SubscriptionRecord {
            id: Uuid::new_v4(),
            subscription_id: "sub_test".to_string(),
            customer_email: "a@b.com".to_string(),
            customer_name: None,
            plan_type: Some("pro".to_string()),
            status,
            current_period_start: None,
            current_period_end: period_end,
            canceled_at: None,
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
        }
    }

    #[test]
    fn status_parse_known_values() {
        assert_eq!(SubscriptionStatus::parse("active"), SubscriptionStatus::Active);
        assert_eq!(SubscriptionStatus::parse("canceled"), SubscriptionStatus::Canceled);
        assert_eq!(SubscriptionStatus::parse("revoked"), SubscriptionStatus::Revoked);
    }

    #[test]
    fn status_passes_unknown_values_through_verbatim() {
        let status = SubscriptionStatus::parse("past_due");
        assert_eq!(status, SubscriptionStatus::Other("past_due".to_string()));
        assert_eq!(status.as_str(), "past_due");
    }

    #[test]
    fn status_serde_roundtrip() {
        let json = serde_json::to_string(&SubscriptionStatus::parse("trialing")).unwrap();
        assert_eq!(json, "\"trialing\"");
        let parsed: SubscriptionStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.as_str(), "trialing");
    }

    #[test]
    fn active_record_with_future_period_end_is_entitled() {
        let now = Timestamp::now();
        let rec = record(SubscriptionStatus::Active, Some(now.add_days(1)));
        assert!(rec.is_entitled(&now));
    }

    #[test]
    fn active_record_with_past_period_end_is_not_entitled() {
        let now = Timestamp::now();
        let rec = record(SubscriptionStatus::Active, Some(now.add_days(-1)));
        assert!(!rec.is_entitled(&now));
    }

    #[test]
    fn active_record_without_period_end_is_not_entitled() {
        let now = Timestamp::now();
        let rec = record(SubscriptionStatus::Active, None);
        assert!(!rec.is_entitled(&now));
    }

    #[test]
    fn canceled_record_is_not_entitled_even_with_future_period() {
        let now = Timestamp::now();
        let rec = record(SubscriptionStatus::Canceled, Some(now.add_days(30)));
        assert!(!rec.is_entitled(&now));
    }
}
