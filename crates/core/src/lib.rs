//! Ledgerfolio Core - deterministic portfolio and fixed-deposit engines.
//!
//! This crate replays a transaction stream into holdings, cost basis and
//! money-weighted returns, and computes bank-style fixed-deposit maturity.
//! It performs no I/O beyond optional settings loading; storage, pricing
//! feeds and presentation belong to the host application.

pub mod constants;
pub mod errors;
pub mod fixed_deposits;
pub mod money;
pub mod portfolio;
pub mod settings;
pub mod transactions;
pub mod utils;

// Re-export common types from portfolio modules
pub use portfolio::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
