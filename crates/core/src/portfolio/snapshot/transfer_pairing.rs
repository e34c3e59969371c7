//! Matches transfer-in legs to the transfer-out legs they came from.

use std::collections::HashMap;

use log::{debug, warn};
use rust_decimal::Decimal;

use crate::transactions::TransactionKind;

use super::replay_order::DayBatch;

/// `transfer_in` sequence number -> sequence number of its `transfer_out`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferPairs {
    by_in: HashMap<usize, usize>,
    outs: HashMap<usize, usize>,
}

impl TransferPairs {
    pub fn origin_of(&self, in_seq: usize) -> Option<usize> {
        self.by_in.get(&in_seq).copied()
    }

    pub fn is_paired_out(&self, out_seq: usize) -> bool {
        self.outs.contains_key(&out_seq)
    }

    pub fn len(&self) -> usize {
        self.by_in.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_in.is_empty()
    }

    fn insert(&mut self, in_seq: usize, out_seq: usize) {
        self.by_in.insert(in_seq, out_seq);
        self.outs.insert(out_seq, in_seq);
    }
}

struct OpenOut<'a> {
    seq: usize,
    account_id: &'a str,
    instrument: &'a str,
    quantity: Decimal,
}

/// Pairs every `transfer_in` with the earliest still-open `transfer_out` of
/// the same instrument and quantity from a different account, dated on or
/// before the transfer-in. Legs left over are external transfers.
pub fn pair_transfers(batches: &[DayBatch<'_>]) -> TransferPairs {
    let mut pairs = TransferPairs::default();
    let mut open: Vec<OpenOut<'_>> = Vec::new();

    for batch in batches {
        for entry in &batch.trades {
            if entry.txn.kind == TransactionKind::TransferOut {
                open.push(OpenOut {
                    seq: entry.seq,
                    account_id: &entry.txn.account_id,
                    instrument: entry.txn.instrument_ref(),
                    quantity: entry.txn.quantity,
                });
            }
        }

        for entry in &batch.trades {
            if entry.txn.kind != TransactionKind::TransferIn {
                continue;
            }
            let txn = entry.txn;
            let matched = open.iter().position(|out| {
                out.instrument == txn.instrument_ref()
                    && out.quantity == txn.quantity
                    && out.account_id != txn.account_id
            });
            match matched {
                Some(index) => {
                    let out = open.remove(index);
                    debug!(
                        "Paired transfer_in {} with transfer_out seq {} ({} {})",
                        txn.id, out.seq, txn.quantity, out.instrument
                    );
                    pairs.insert(entry.seq, out.seq);
                }
                None => debug!(
                    "transfer_in {} has no matching transfer_out; treating as external",
                    txn.id
                ),
            }
        }
    }

    if !open.is_empty() {
        warn!(
            "{} transfer_out leg(s) have no matching transfer_in; treating as external",
            open.len()
        );
    }
    pairs
}
