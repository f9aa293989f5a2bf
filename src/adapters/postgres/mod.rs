//! PostgreSQL adapters.

mod subscription_store_impl;

pub use subscription_store_impl::PostgresSubscriptionStore;
