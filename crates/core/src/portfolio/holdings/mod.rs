//! Holdings view: replay, valuation and returns per holding.

pub mod holdings_model;
pub mod holdings_service;

pub use holdings_model::*;
pub use holdings_service::*;

#[cfg(test)]
mod holdings_service_tests;
