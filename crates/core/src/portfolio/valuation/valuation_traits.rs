//! Live price lookup boundary.

use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Source of the latest traded price per instrument ticker.
///
/// Retrieval, caching and retries live with the implementor. `None` means the
/// price is unknown, which valuation treats as a normal input.
pub trait LivePriceSource: Send + Sync {
    fn latest_price(&self, ticker: &str) -> Option<Decimal>;
}

impl LivePriceSource for HashMap<String, Decimal> {
    fn latest_price(&self, ticker: &str) -> Option<Decimal> {
        self.get(ticker).copied()
    }
}

impl LivePriceSource for BTreeMap<String, Decimal> {
    fn latest_price(&self, ticker: &str) -> Option<Decimal> {
        self.get(ticker).copied()
    }
}

/// No prices at all; every holding is marked at cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLivePrices;

impl LivePriceSource for NoLivePrices {
    fn latest_price(&self, _ticker: &str) -> Option<Decimal> {
        None
    }
}
