//! Replay output models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{LotState, PositionKey, TransferPairs};
use crate::portfolio::performance::HoldingFlow;

/// A disposal recorded by the replay. Transfer-outs appear with zero P&L.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealizedGain {
    pub transaction_id: String,
    pub account_id: String,
    pub instrument: String,
    pub date: NaiveDate,
    pub quantity: Decimal,
    /// Sale value net of fees; the relieved cost for a transfer.
    pub proceeds: Decimal,
    pub cost_relieved: Decimal,
    pub fees: Decimal,
    pub realized_pnl: Decimal,
}

/// Cash movements of one account, in transaction currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashLedger {
    pub deposits: Decimal,
    pub withdrawals: Decimal,
    pub balance: Decimal,
    /// `quantity * price` of every transfer_in, as recorded.
    pub stock_transfer_in: Decimal,
    /// `quantity * price` of every transfer_out, as recorded.
    pub stock_transfer_out: Decimal,
    /// Dividends net of fees, whether or not they name an instrument.
    pub dividend_income: Decimal,
}

impl CashLedger {
    pub fn net_invested(&self) -> Decimal {
        self.deposits - self.withdrawals
    }

    pub fn net_stock_transfer(&self) -> Decimal {
        self.stock_transfer_in - self.stock_transfer_out
    }

    pub fn absorb(&mut self, other: &CashLedger) {
        self.deposits += other.deposits;
        self.withdrawals += other.withdrawals;
        self.balance += other.balance;
        self.stock_transfer_in += other.stock_transfer_in;
        self.stock_transfer_out += other.stock_transfer_out;
        self.dividend_income += other.dividend_income;
    }
}

/// Everything derived from one replay of a transaction stream. Recomputed on
/// every request and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayResult {
    pub valuation_date: NaiveDate,
    /// Every lot touched by the replay, including closed ones.
    pub positions: BTreeMap<PositionKey, LotState>,
    /// Disposals in replay order.
    pub realized_gains: Vec<RealizedGain>,
    /// Capital movements in replay order.
    pub flows: Vec<HoldingFlow>,
    pub cash: BTreeMap<String, CashLedger>,
    pub transfer_pairs: TransferPairs,
}

impl ReplayResult {
    pub fn new(valuation_date: NaiveDate) -> Self {
        ReplayResult {
            valuation_date,
            positions: BTreeMap::new(),
            realized_gains: Vec::new(),
            flows: Vec::new(),
            cash: BTreeMap::new(),
            transfer_pairs: TransferPairs::default(),
        }
    }

    pub fn position(&self, account_id: &str, instrument: &str) -> Option<&LotState> {
        self.positions.get(&PositionKey::new(account_id, instrument))
    }

    pub fn cash_for(&self, account_id: &str) -> CashLedger {
        self.cash.get(account_id).cloned().unwrap_or_default()
    }

    /// Cash of every account folded together.
    pub fn total_cash(&self) -> CashLedger {
        let mut total = CashLedger::default();
        for ledger in self.cash.values() {
            total.absorb(ledger);
        }
        total
    }

    pub fn account_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .positions
            .keys()
            .map(|k| k.account_id.clone())
            .chain(self.cash.keys().cloned())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}
