//! Transaction domain models.

use crate::errors::{CalculatorError, Result, ValidationError};
use crate::transactions::transactions_constants::*;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of transaction kinds. Every consumer matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum TransactionKind {
    Buy,
    Sell,
    TransferIn,
    TransferOut,
    Deposit,
    Withdrawal,
    Dividend,
    Bonus,
    Split,
    Demerger,
    Resulting,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Buy => TRANSACTION_KIND_BUY,
            TransactionKind::Sell => TRANSACTION_KIND_SELL,
            TransactionKind::TransferIn => TRANSACTION_KIND_TRANSFER_IN,
            TransactionKind::TransferOut => TRANSACTION_KIND_TRANSFER_OUT,
            TransactionKind::Deposit => TRANSACTION_KIND_DEPOSIT,
            TransactionKind::Withdrawal => TRANSACTION_KIND_WITHDRAWAL,
            TransactionKind::Dividend => TRANSACTION_KIND_DIVIDEND,
            TransactionKind::Bonus => TRANSACTION_KIND_BONUS,
            TransactionKind::Split => TRANSACTION_KIND_SPLIT,
            TransactionKind::Demerger => TRANSACTION_KIND_DEMERGER,
            TransactionKind::Resulting => TRANSACTION_KIND_RESULTING,
        }
    }

    /// Corporate actions are applied to the opening balance of their date,
    /// before any same-day trade.
    pub fn is_corporate_action(&self) -> bool {
        match self {
            TransactionKind::Bonus
            | TransactionKind::Split
            | TransactionKind::Demerger
            | TransactionKind::Resulting => true,
            TransactionKind::Buy
            | TransactionKind::Sell
            | TransactionKind::TransferIn
            | TransactionKind::TransferOut
            | TransactionKind::Deposit
            | TransactionKind::Withdrawal
            | TransactionKind::Dividend => false,
        }
    }

    /// Cash-only kinds never touch lot quantity or cost.
    pub fn is_cash_only(&self) -> bool {
        match self {
            TransactionKind::Deposit | TransactionKind::Withdrawal | TransactionKind::Dividend => {
                true
            }
            TransactionKind::Buy
            | TransactionKind::Sell
            | TransactionKind::TransferIn
            | TransactionKind::TransferOut
            | TransactionKind::Bonus
            | TransactionKind::Split
            | TransactionKind::Demerger
            | TransactionKind::Resulting => false,
        }
    }

    /// Kinds that reduce the held quantity.
    pub fn is_disposal(&self) -> bool {
        matches!(self, TransactionKind::Sell | TransactionKind::TransferOut)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            TRANSACTION_KIND_BUY => Ok(TransactionKind::Buy),
            TRANSACTION_KIND_SELL => Ok(TransactionKind::Sell),
            TRANSACTION_KIND_TRANSFER_IN => Ok(TransactionKind::TransferIn),
            TRANSACTION_KIND_TRANSFER_OUT => Ok(TransactionKind::TransferOut),
            TRANSACTION_KIND_DEPOSIT => Ok(TransactionKind::Deposit),
            TRANSACTION_KIND_WITHDRAWAL => Ok(TransactionKind::Withdrawal),
            TRANSACTION_KIND_DIVIDEND => Ok(TransactionKind::Dividend),
            TRANSACTION_KIND_BONUS => Ok(TransactionKind::Bonus),
            TRANSACTION_KIND_SPLIT => Ok(TransactionKind::Split),
            TRANSACTION_KIND_DEMERGER => Ok(TransactionKind::Demerger),
            TRANSACTION_KIND_RESULTING => Ok(TransactionKind::Resulting),
            _ => Err(ValidationError::UnknownTransactionKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for TransactionKind {
    type Error = ValidationError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        TransactionKind::from_str(&value)
    }
}

/// One record of the externally persisted transaction stream.
///
/// For `split`, `bonus` and `demerger` the ratio travels in `ratio` ("N:M" or a
/// decimal factor); legacy records carry the normalized multiplier in `quantity`
/// instead. For `resulting`, `quantity` is the units received and `price` the
/// acquisition cost per unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    /// Instrument ticker. `None` for pure cash movements.
    #[serde(default)]
    pub instrument: Option<String>,
    pub kind: TransactionKind,
    pub date: NaiveDate,
    #[serde(default)]
    pub quantity: Decimal,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub fees: Decimal,
    #[serde(default)]
    pub ratio: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        account_id: impl Into<String>,
        instrument: Option<&str>,
        kind: TransactionKind,
        date: NaiveDate,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Transaction {
            id: id.into(),
            account_id: account_id.into(),
            instrument: instrument.map(str::to_string),
            kind,
            date,
            quantity,
            price,
            fees: Decimal::ZERO,
            ratio: None,
            notes: None,
        }
    }

    pub fn with_fees(mut self, fees: Decimal) -> Self {
        self.fees = fees;
        self
    }

    pub fn with_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.ratio = Some(ratio.into());
        self
    }

    /// Instrument ticker, empty for cash movements.
    pub fn instrument_ref(&self) -> &str {
        self.instrument.as_deref().unwrap_or("")
    }

    /// `quantity * price`, before fees.
    pub fn gross_amount(&self) -> Result<Decimal> {
        self.quantity.checked_mul(self.price).ok_or_else(|| {
            CalculatorError::InvalidTransaction {
                transaction_id: self.id.clone(),
                reason: format!("{} x {} overflows", self.quantity, self.price),
            }
            .into()
        })
    }
}
