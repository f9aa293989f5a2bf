//! In-memory adapters for tests and local development.

mod subscription_store;

pub use subscription_store::InMemorySubscriptionStore;
