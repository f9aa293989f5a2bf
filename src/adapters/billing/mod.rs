//! Outbound billing provider adapters.

mod checkout_adapter;
mod mock;

pub use checkout_adapter::{BillingCheckoutAdapter, PlanCatalog};
pub use mock::MockCheckoutProvider;
