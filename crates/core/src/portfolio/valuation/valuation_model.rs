//! Valuation domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Market valuation of one lot on a valuation date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HoldingValuation {
    pub valuation_date: NaiveDate,
    pub quantity: Decimal,
    pub avg_price: Decimal,
    /// Price used for the mark; the average price when none was available.
    pub live_price: Decimal,
    pub price_missing: bool,
    pub total_cost: Decimal,
    pub current_value: Decimal,
    /// Unrealized P&L.
    pub pnl: Decimal,
    /// Unrealized P&L as a percentage of cost; 0 when cost is 0.
    pub pnl_percent: Decimal,
    pub holding_period_years: Decimal,
}
