//! Transaction stream consumed by the holdings replay.

mod transactions_constants;
mod transactions_model;

pub use transactions_constants::*;
pub use transactions_model::*;

#[cfg(test)]
mod transactions_model_tests;
