//! HTTP adapter: router, handlers, and DTOs.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{AppState, AuthenticatedCustomer};
pub use routes::{api_router, subscription_routes, webhook_routes};
