//! Command and query handlers wiring ports to the domain.

mod check_entitlement;
mod list_subscriptions;
mod process_webhook;
mod start_checkout;

pub use check_entitlement::{
    CheckEntitlementHandler, CheckEntitlementQuery, SubscriptionStatusView,
};
pub use list_subscriptions::{ListSubscriptionsHandler, ListSubscriptionsQuery};
pub use process_webhook::{ProcessWebhookCommand, ProcessWebhookHandler};
pub use start_checkout::{StartCheckoutCommand, StartCheckoutHandler};
