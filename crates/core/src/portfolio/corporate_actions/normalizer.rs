use crate::errors::{CalculatorError, Result};
use crate::transactions::{Transaction, TransactionKind};
use log::debug;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::{CorporateActionAdjustment, Ratio};

fn invalid_ratio(transaction_id: &str, value: &str, reason: impl Into<String>) -> CalculatorError {
    CalculatorError::InvalidRatio {
        transaction_id: transaction_id.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_positive(transaction_id: &str, raw: &str, part: &str) -> Result<Decimal> {
    let parsed = Decimal::from_str(part.trim())
        .or_else(|_| Decimal::from_scientific(part.trim()))
        .map_err(|_| invalid_ratio(transaction_id, raw, format!("'{}' is not a number", part.trim())))?;
    if parsed <= Decimal::ZERO {
        return Err(invalid_ratio(transaction_id, raw, "both sides of the ratio must be positive").into());
    }
    Ok(parsed)
}

/// Parses an "N:M" ratio string. Anything other than two positive numbers
/// separated by a single `:` is rejected.
pub fn parse_ratio(transaction_id: &str, raw: &str) -> Result<Ratio> {
    let mut parts = raw.split(':');
    let (Some(n), Some(m), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid_ratio(transaction_id, raw, "expected the form N:M").into());
    };
    Ok(Ratio {
        numerator: parse_positive(transaction_id, raw, n)?,
        denominator: parse_positive(transaction_id, raw, m)?,
    })
}

fn ratio_value(transaction_id: &str, raw: &str) -> Result<Decimal> {
    parse_ratio(transaction_id, raw)?
        .value()
        .ok_or_else(|| invalid_ratio(transaction_id, raw, "ratio is out of range").into())
}

/// Multiplier carried by a split or bonus: the `ratio` string when present,
/// otherwise the normalized value stored in `quantity`.
fn ratio_multiplier(txn: &Transaction) -> Result<Decimal> {
    match txn.ratio.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => ratio_value(&txn.id, raw),
        None => {
            if txn.quantity <= Decimal::ZERO {
                return Err(invalid_ratio(
                    &txn.id,
                    &txn.quantity.to_string(),
                    "no ratio given and quantity is not a positive multiplier",
                )
                .into());
            }
            Ok(txn.quantity)
        }
    }
}

/// Retention factor for a demerger. Accepts "N:M" or a plain decimal ("0.6").
fn retention_factor(txn: &Transaction) -> Result<Decimal> {
    let (raw, factor) = match txn.ratio.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) if raw.contains(':') => (raw.to_string(), ratio_value(&txn.id, raw)?),
        Some(raw) => (raw.to_string(), parse_positive(&txn.id, raw, raw)?),
        None => (txn.quantity.to_string(), txn.quantity),
    };
    if factor <= Decimal::ZERO || factor > Decimal::ONE {
        return Err(invalid_ratio(&txn.id, &raw, "retention factor must be in (0, 1]").into());
    }
    Ok(factor)
}

/// Converts a corporate-action transaction into its numeric adjustment.
pub fn normalize_corporate_action(txn: &Transaction) -> Result<CorporateActionAdjustment> {
    let adjustment = match txn.kind {
        TransactionKind::Split => CorporateActionAdjustment::ScaleQuantity {
            factor: ratio_multiplier(txn)?,
        },
        TransactionKind::Bonus => CorporateActionAdjustment::BonusUnits {
            factor: ratio_multiplier(txn)?,
        },
        TransactionKind::Demerger => CorporateActionAdjustment::RetainCost {
            retention: retention_factor(txn)?,
        },
        TransactionKind::Resulting => {
            if txn.quantity <= Decimal::ZERO {
                return Err(CalculatorError::InvalidTransaction {
                    transaction_id: txn.id.clone(),
                    reason: format!("resulting quantity must be positive, got {}", txn.quantity),
                }
                .into());
            }
            if txn.price.is_sign_negative() {
                return Err(CalculatorError::InvalidTransaction {
                    transaction_id: txn.id.clone(),
                    reason: format!("resulting cost per unit must not be negative, got {}", txn.price),
                }
                .into());
            }
            CorporateActionAdjustment::Acquire {
                quantity: txn.quantity,
                unit_cost: txn.price,
                fees: txn.fees,
            }
        }
        TransactionKind::Buy
        | TransactionKind::Sell
        | TransactionKind::TransferIn
        | TransactionKind::TransferOut
        | TransactionKind::Deposit
        | TransactionKind::Withdrawal
        | TransactionKind::Dividend => {
            return Err(CalculatorError::InvalidTransaction {
                transaction_id: txn.id.clone(),
                reason: format!("{} is not a corporate action", txn.kind),
            }
            .into());
        }
    };
    debug!("Normalized {} {} to {:?}", txn.kind, txn.id, adjustment);
    Ok(adjustment)
}
