//! Adapters implementing the ports against concrete infrastructure.

pub mod billing;
pub mod http;
pub mod memory;
pub mod postgres;
