//! Total order used by the holdings replay.
//!
//! Transactions sort by date ascending. Within a date every corporate action
//! comes before every trade, so splits and bonuses scale the opening balance
//! and same-day purchases land on the already-adjusted base. Ties keep input
//! order.

use chrono::NaiveDate;

use crate::transactions::Transaction;

/// A transaction tagged with its position in the caller's input slice.
#[derive(Debug, Clone, Copy)]
pub struct SequencedTransaction<'a> {
    pub seq: usize,
    pub txn: &'a Transaction,
}

/// All transactions of one date, split into the two replay phases.
#[derive(Debug, Clone)]
pub struct DayBatch<'a> {
    pub date: NaiveDate,
    pub corporate_actions: Vec<SequencedTransaction<'a>>,
    pub trades: Vec<SequencedTransaction<'a>>,
}

impl DayBatch<'_> {
    pub fn len(&self) -> usize {
        self.corporate_actions.len() + self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn phase(txn: &Transaction) -> u8 {
    if txn.kind.is_corporate_action() {
        0
    } else {
        1
    }
}

/// Groups transactions dated on or before `through` into ordered day batches.
pub fn order_for_replay(transactions: &[Transaction], through: NaiveDate) -> Vec<DayBatch<'_>> {
    let mut ordered: Vec<SequencedTransaction<'_>> = transactions
        .iter()
        .enumerate()
        .filter(|(_, txn)| txn.date <= through)
        .map(|(seq, txn)| SequencedTransaction { seq, txn })
        .collect();
    ordered.sort_by_key(|s| (s.txn.date, phase(s.txn), s.seq));

    let mut batches: Vec<DayBatch<'_>> = Vec::new();
    for entry in ordered {
        if batches.last().map(|batch| batch.date) != Some(entry.txn.date) {
            batches.push(DayBatch {
                date: entry.txn.date,
                corporate_actions: Vec::new(),
                trades: Vec::new(),
            });
        }
        if let Some(batch) = batches.last_mut() {
            if entry.txn.kind.is_corporate_action() {
                batch.corporate_actions.push(entry);
            } else {
                batch.trades.push(entry);
            }
        }
    }
    batches
}
