//! Fixed deposits module - bank-style maturity calculation.

mod fixed_deposits_calculator;
mod fixed_deposits_model;

pub use fixed_deposits_calculator::{
    calculate_many, calculate_maturity, redemption_split, redemption_transactions, value_as_of,
};
pub use fixed_deposits_model::*;

#[cfg(test)]
mod fixed_deposits_calculator_tests;
