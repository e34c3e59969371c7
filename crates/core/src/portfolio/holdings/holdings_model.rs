use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::portfolio::snapshot::RealizedGain;

/// Instrument data needed for display
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub ticker: String,
    pub name: Option<String>,
}

impl Instrument {
    pub fn new(ticker: impl Into<String>, name: impl Into<String>) -> Self {
        Instrument {
            ticker: ticker.into(),
            name: Some(name.into()),
        }
    }
}

/// Which lots a holdings request covers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "type", content = "accountId")]
pub enum HoldingsScope {
    /// One account; transfers are external cashflows.
    Account(String),
    /// Every account, consolidated per instrument.
    Portfolio,
}

/// Holding view model for display with total performance
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HoldingView {
    // Core identification
    pub id: String,
    /// `None` for a portfolio-wide holding.
    pub account_id: Option<String>,
    pub ticker: String,
    pub name: String,

    // Position data
    pub quantity: Decimal,
    pub avg_price: Decimal,
    pub live_price: Decimal,
    pub price_missing: bool,
    pub total_cost: Decimal,

    // Current valuation
    pub current_value: Decimal,
    pub pnl: Decimal,
    pub pnl_percent: Decimal,
    pub holding_period_years: Decimal,
    /// Annualised money-weighted return as a fraction; `None` when not computable.
    pub xirr: Option<Decimal>,

    // Lifetime results
    pub realized_pnl: Decimal,
    pub dividend_income: Decimal,

    // Portfolio allocation
    pub weight: Decimal,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    /// Unrealized plus realized P&L plus dividend income.
    pub total_profit_loss: Decimal,
    pub realized_profit_loss: Decimal,
    pub dividend_income: Decimal,
    /// Positions plus cash.
    pub current_portfolio_value: Decimal,
    pub positions_current_value: Decimal,
    /// Deposits minus withdrawals.
    pub invested_value: Decimal,
    pub positions_purchase_cost: Decimal,
    /// Recorded value of stock transferred in minus transferred out.
    pub stock_transfer: Decimal,
    pub cash: Decimal,
    pub xirr: Option<Decimal>,
}

/// Full response of a holdings request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioView {
    pub valuation_date: NaiveDate,
    pub holdings: Vec<HoldingView>,
    pub summary: PortfolioSummary,
    pub realized_gains: Vec<RealizedGain>,
}
