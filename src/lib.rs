//! Subsync - Subscription State Reconciliation Service
//!
//! This crate keeps a local view of customer subscriptions in sync with an
//! external billing provider by ingesting signed webhook events, and answers
//! entitlement queries from the reconciled state.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
