use crate::errors::{CalculatorError, Result};
use crate::portfolio::corporate_actions::{normalize_corporate_action, CorporateActionAdjustment};
use crate::portfolio::performance::{FlowKind, HoldingFlow};
use crate::portfolio::snapshot::replay_order::{order_for_replay, SequencedTransaction};
use crate::portfolio::snapshot::transfer_pairing::pair_transfers;
use crate::portfolio::snapshot::{
    CashLedger, Disposal, LotState, PositionKey, RealizedGain, ReplayResult,
};
use crate::settings::EngineSettings;
use crate::transactions::{Transaction, TransactionKind};

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Mutable state owned by one replay run.
struct ReplayState {
    result: ReplayResult,
    /// Cost and acquisition date carried by a paired transfer_out, keyed by
    /// its sequence number, until the matching transfer_in consumes it.
    relocations: HashMap<usize, Disposal>,
}

impl ReplayState {
    fn lot_mut(&mut self, key: PositionKey) -> &mut LotState {
        self.result
            .positions
            .entry(key)
            .or_insert_with_key(|k| LotState::new(k.account_id.clone(), k.instrument.clone()))
    }

    fn cash_mut(&mut self, account_id: &str) -> &mut CashLedger {
        self.result
            .cash
            .entry(account_id.to_string())
            .or_default()
    }

    fn record_flow(&mut self, key: PositionKey, txn: &Transaction, amount: Decimal, kind: FlowKind) {
        self.result.flows.push(HoldingFlow {
            key,
            transaction_id: txn.id.clone(),
            date: txn.date,
            amount,
            kind,
        });
    }
}

fn invalid(txn: &Transaction, reason: impl Into<String>) -> CalculatorError {
    CalculatorError::InvalidTransaction {
        transaction_id: txn.id.clone(),
        reason: reason.into(),
    }
}

fn overflow(txn: &Transaction) -> CalculatorError {
    invalid(txn, format!("{} amounts overflow the position", txn.kind))
}

fn require_instrument(txn: &Transaction) -> Result<&str> {
    match txn.instrument.as_deref().map(str::trim) {
        Some(instrument) if !instrument.is_empty() => Ok(instrument),
        _ => Err(invalid(txn, format!("{} requires an instrument", txn.kind)).into()),
    }
}

fn validate_amounts(txn: &Transaction) -> Result<()> {
    if txn.price.is_sign_negative() && !txn.price.is_zero() {
        return Err(invalid(txn, format!("price must not be negative, got {}", txn.price)).into());
    }
    if txn.fees.is_sign_negative() && !txn.fees.is_zero() {
        return Err(invalid(txn, format!("fees must not be negative, got {}", txn.fees)).into());
    }
    Ok(())
}

/// Ordinary trades move a positive quantity of a named instrument.
fn validate_trade(txn: &Transaction) -> Result<()> {
    require_instrument(txn)?;
    if txn.quantity <= Decimal::ZERO {
        return Err(invalid(txn, format!("quantity must be positive, got {}", txn.quantity)).into());
    }
    validate_amounts(txn)
}

fn validate_cash_movement(txn: &Transaction) -> Result<()> {
    if txn.quantity.is_sign_negative() && !txn.quantity.is_zero() {
        return Err(invalid(txn, format!("quantity must not be negative, got {}", txn.quantity)).into());
    }
    validate_amounts(txn)
}

/// Folds a transaction stream into per-(account, instrument) lot state under
/// weighted-average costing.
///
/// The replay is a pure function of its inputs: lots, realized gains, cash and
/// capital flows are rebuilt from scratch on every call.
#[derive(Debug, Clone, Default)]
pub struct HoldingsCalculator {
    settings: EngineSettings,
}

impl HoldingsCalculator {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Replays every transaction dated on or before `valuation_date`.
    ///
    /// Dates are processed ascending. Within a date, corporate actions are
    /// applied to the opening balance before any trade. A paired transfer_in
    /// whose transfer_out comes later in the same day is held back until the
    /// end of that day's trades. The first failing transaction aborts the
    /// replay with its typed error.
    pub fn replay(
        &self,
        transactions: &[Transaction],
        valuation_date: NaiveDate,
    ) -> Result<ReplayResult> {
        let batches = order_for_replay(transactions, valuation_date);
        let mut state = ReplayState {
            result: ReplayResult::new(valuation_date),
            relocations: HashMap::new(),
        };
        state.result.transfer_pairs = pair_transfers(&batches);

        for batch in &batches {
            debug!(
                "Replaying {} corporate action(s) and {} trade(s) on {}",
                batch.corporate_actions.len(),
                batch.trades.len(),
                batch.date
            );

            for entry in &batch.corporate_actions {
                self.apply_corporate_action(entry.txn, &mut state)?;
            }

            let mut deferred: Vec<SequencedTransaction<'_>> = Vec::new();
            for entry in &batch.trades {
                let waiting_on_origin = entry.txn.kind == TransactionKind::TransferIn
                    && state
                        .result
                        .transfer_pairs
                        .origin_of(entry.seq)
                        .is_some_and(|out_seq| !state.relocations.contains_key(&out_seq));
                if waiting_on_origin {
                    debug!(
                        "Deferring transfer_in {} until its transfer_out is replayed",
                        entry.txn.id
                    );
                    deferred.push(*entry);
                    continue;
                }
                self.apply_trade(*entry, &mut state)?;
            }
            for entry in deferred {
                self.apply_trade(entry, &mut state)?;
            }
        }

        debug!(
            "Replay through {} produced {} lot(s) and {} disposal(s)",
            valuation_date,
            state.result.positions.len(),
            state.result.realized_gains.len()
        );
        Ok(state.result)
    }

    fn apply_trade(&self, entry: SequencedTransaction<'_>, state: &mut ReplayState) -> Result<()> {
        let txn = entry.txn;
        match txn.kind {
            TransactionKind::Buy => self.handle_buy(txn, state),
            TransactionKind::Sell => self.handle_sell(txn, state),
            TransactionKind::TransferIn => self.handle_transfer_in(entry, state),
            TransactionKind::TransferOut => self.handle_transfer_out(entry, state),
            TransactionKind::Deposit => self.handle_deposit(txn, state),
            TransactionKind::Withdrawal => self.handle_withdrawal(txn, state),
            TransactionKind::Dividend => self.handle_dividend(txn, state),
            TransactionKind::Bonus
            | TransactionKind::Split
            | TransactionKind::Demerger
            | TransactionKind::Resulting => self.apply_corporate_action(txn, state),
        }
    }

    // --- Trade handlers ---

    /// BUY: adds units at `qty * price + fees`; cash pays the same amount.
    fn handle_buy(&self, txn: &Transaction, state: &mut ReplayState) -> Result<()> {
        validate_trade(txn)?;
        let key = PositionKey::new(&txn.account_id, require_instrument(txn)?);
        let cost = state
            .lot_mut(key.clone())
            .acquire(txn.quantity, txn.price, txn.fees, txn.date)
            .ok_or_else(|| overflow(txn))?;
        state.cash_mut(&txn.account_id).balance -= cost;
        state.record_flow(key, txn, -cost, FlowKind::Acquisition);
        Ok(())
    }

    /// SELL: relieves `qty * average cost`; realized P&L is proceeds net of
    /// fees minus the relieved cost.
    fn handle_sell(&self, txn: &Transaction, state: &mut ReplayState) -> Result<()> {
        validate_trade(txn)?;
        let key = PositionKey::new(&txn.account_id, require_instrument(txn)?);
        let threshold = self.settings.quantity_threshold;

        let lot = state.lot_mut(key.clone());
        let disposal = lot.dispose(txn, threshold)?;
        let proceeds = txn.gross_amount()? - txn.fees;
        let realized_pnl = proceeds - disposal.cost_relieved;
        lot.realized_pnl += realized_pnl;

        state.cash_mut(&txn.account_id).balance += proceeds;
        state.result.realized_gains.push(RealizedGain {
            transaction_id: txn.id.clone(),
            account_id: txn.account_id.clone(),
            instrument: key.instrument.clone(),
            date: txn.date,
            quantity: disposal.quantity,
            proceeds,
            cost_relieved: disposal.cost_relieved,
            fees: txn.fees,
            realized_pnl,
        });
        state.record_flow(key, txn, proceeds, FlowKind::Disposal);
        Ok(())
    }

    /// TRANSFER_OUT: relocation at average cost, zero realized P&L. Fees are
    /// charged to cash.
    fn handle_transfer_out(
        &self,
        entry: SequencedTransaction<'_>,
        state: &mut ReplayState,
    ) -> Result<()> {
        let txn = entry.txn;
        validate_trade(txn)?;
        let key = PositionKey::new(&txn.account_id, require_instrument(txn)?);
        let threshold = self.settings.quantity_threshold;

        let disposal = state.lot_mut(key.clone()).dispose(txn, threshold)?;
        let gross = txn.gross_amount()?;
        let cash = state.cash_mut(&txn.account_id);
        cash.balance -= txn.fees;
        cash.stock_transfer_out += gross;

        state.result.realized_gains.push(RealizedGain {
            transaction_id: txn.id.clone(),
            account_id: txn.account_id.clone(),
            instrument: key.instrument.clone(),
            date: txn.date,
            quantity: disposal.quantity,
            proceeds: disposal.cost_relieved,
            cost_relieved: disposal.cost_relieved,
            fees: txn.fees,
            realized_pnl: Decimal::ZERO,
        });

        let paired = state.result.transfer_pairs.is_paired_out(entry.seq);
        state.record_flow(
            key,
            txn,
            disposal.cost_relieved,
            FlowKind::TransferOut { paired },
        );
        if paired {
            state.relocations.insert(entry.seq, disposal);
        }
        Ok(())
    }

    /// TRANSFER_IN: a paired leg inherits the origin's cost and weighted
    /// acquisition date; an unpaired leg enters at its recorded price.
    fn handle_transfer_in(
        &self,
        entry: SequencedTransaction<'_>,
        state: &mut ReplayState,
    ) -> Result<()> {
        let txn = entry.txn;
        validate_trade(txn)?;
        let key = PositionKey::new(&txn.account_id, require_instrument(txn)?);

        let origin = state.result.transfer_pairs.origin_of(entry.seq);
        let relocation = origin.and_then(|out_seq| state.relocations.remove(&out_seq));
        if origin.is_some() && relocation.is_none() {
            warn!(
                "transfer_in {} lost its transfer_out; entering at recorded price",
                txn.id
            );
        }

        let paired = relocation.is_some();
        let gross = txn.gross_amount()?;
        let lot = state.lot_mut(key.clone());
        let cost = match relocation {
            Some(moved) => {
                let acquired_on = moved.acquisition_date.unwrap_or(txn.date);
                moved.cost_relieved.checked_add(txn.fees).and_then(|cost| {
                    lot.acquire_with_cost(txn.quantity, cost, acquired_on)
                        .map(|()| cost)
                })
            }
            None => lot.acquire(txn.quantity, txn.price, txn.fees, txn.date),
        }
        .ok_or_else(|| overflow(txn))?;

        let cash = state.cash_mut(&txn.account_id);
        cash.balance -= txn.fees;
        cash.stock_transfer_in += gross;
        state.record_flow(key, txn, -cost, FlowKind::TransferIn { paired });
        Ok(())
    }

    /// DEPOSIT: contributed capital at gross amount; cash receives it net of fees.
    fn handle_deposit(&self, txn: &Transaction, state: &mut ReplayState) -> Result<()> {
        validate_cash_movement(txn)?;
        let amount = txn.gross_amount()?;
        let cash = state.cash_mut(&txn.account_id);
        cash.deposits += amount;
        cash.balance += amount - txn.fees;
        Ok(())
    }

    /// WITHDRAWAL: withdrawn capital at gross amount; cash pays it plus fees.
    fn handle_withdrawal(&self, txn: &Transaction, state: &mut ReplayState) -> Result<()> {
        validate_cash_movement(txn)?;
        let amount = txn.gross_amount()?;
        let cash = state.cash_mut(&txn.account_id);
        cash.withdrawals += amount;
        cash.balance -= amount + txn.fees;
        Ok(())
    }

    /// DIVIDEND: cash-only for lot quantity and cost; income is attributed to
    /// the instrument's lot when one is named.
    fn handle_dividend(&self, txn: &Transaction, state: &mut ReplayState) -> Result<()> {
        validate_cash_movement(txn)?;
        let income = txn.gross_amount()? - txn.fees;
        let cash = state.cash_mut(&txn.account_id);
        cash.balance += income;
        cash.dividend_income += income;

        let instrument = txn.instrument.as_deref().map(str::trim).unwrap_or("");
        if instrument.is_empty() {
            debug!("Dividend {} has no instrument; booked to cash only", txn.id);
            return Ok(());
        }
        let key = PositionKey::new(&txn.account_id, instrument);
        state.lot_mut(key.clone()).dividend_income += income;
        state.record_flow(key, txn, income, FlowKind::Dividend);
        Ok(())
    }

    // --- Corporate actions ---

    fn apply_corporate_action(&self, txn: &Transaction, state: &mut ReplayState) -> Result<()> {
        let key = PositionKey::new(&txn.account_id, require_instrument(txn)?);
        let adjustment = normalize_corporate_action(txn)?;

        if let CorporateActionAdjustment::Acquire {
            quantity,
            unit_cost,
            fees,
        } = adjustment
        {
            let cost = state
                .lot_mut(key.clone())
                .acquire(quantity, unit_cost, fees, txn.date)
                .ok_or_else(|| overflow(txn))?;
            state.record_flow(key, txn, -cost, FlowKind::Acquisition);
            return Ok(());
        }

        let Some(lot) = state
            .result
            .positions
            .get_mut(&key)
            .filter(|lot| lot.quantity > Decimal::ZERO)
        else {
            warn!(
                "{} {} for {} in account {} has no open position on {}; skipped",
                txn.kind, txn.id, key.instrument, key.account_id, txn.date
            );
            return Ok(());
        };

        let cost_before = lot.total_cost;
        lot.apply_adjustment(&adjustment, txn.date).ok_or_else(|| {
            CalculatorError::InvalidRatio {
                transaction_id: txn.id.clone(),
                value: txn
                    .ratio
                    .clone()
                    .unwrap_or_else(|| txn.quantity.to_string()),
                reason: format!("adjusted position in {} overflows", key.instrument),
            }
        })?;
        let released = cost_before - lot.total_cost;
        if !released.is_zero() {
            state.record_flow(key, txn, released, FlowKind::CostReleased);
        }
        Ok(())
    }
}
