//! Ports: traits at the seams between the domain and its adapters.

mod checkout_provider;
mod subscription_store;

pub use checkout_provider::{
    CheckoutError, CheckoutProvider, CheckoutSession, CreateCheckoutRequest,
};
pub use subscription_store::{SubscriptionFilter, SubscriptionPage, SubscriptionStore};
