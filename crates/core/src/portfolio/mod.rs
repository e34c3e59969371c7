//! Portfolio engines: corporate actions, replay, valuation, returns and holdings.

pub mod corporate_actions;
pub mod holdings;
pub mod performance;
pub mod snapshot;
pub mod valuation;

pub use holdings::*;
