//! Core error types for the Ledgerfolio engines.
//!
//! Every engine failure is returned synchronously as a typed value. Nothing here
//! is transient, so nothing is retried.

use chrono::{NaiveDate, ParseError as ChronoParseError};
use rust_decimal::Decimal;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the computation library.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Holdings calculation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("Failed to load configuration: {0}")]
    ConfigIO(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Errors raised by the replay, cost-basis, XIRR and fixed-deposit engines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculatorError {
    #[error("Invalid ratio '{value}' on transaction {transaction_id}: {reason}")]
    InvalidRatio {
        transaction_id: String,
        value: String,
        reason: String,
    },

    #[error("Insufficient holding of {instrument} in account {account_id} on {date}: transaction {transaction_id} disposes {requested} but only {held} is held")]
    InsufficientHolding {
        transaction_id: String,
        account_id: String,
        instrument: String,
        date: NaiveDate,
        requested: Decimal,
        held: Decimal,
    },

    #[error("Average cost is undefined for {instrument} in account {account_id}: quantity is zero")]
    ZeroQuantityCost {
        account_id: String,
        instrument: String,
    },

    #[error("XIRR is not computable: {0}")]
    XirrNotComputable(String),

    #[error("Maturity date {maturity} must be after start date {start}")]
    InvalidDateRange {
        start: NaiveDate,
        maturity: NaiveDate,
    },

    #[error("Invalid transaction {transaction_id}: {reason}")]
    InvalidTransaction {
        transaction_id: String,
        reason: String,
    },
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown transaction kind '{0}'")]
    UnknownTransactionKind(String),

    #[error("Unknown compounding frequency '{0}'")]
    UnknownCompoundingFrequency(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date: {0}")]
    DateParse(#[from] ChronoParseError),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::ConfigIO(err.to_string())
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
