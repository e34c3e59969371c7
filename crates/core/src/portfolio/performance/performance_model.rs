use chrono::NaiveDate;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{CalculatorError, Result};
use crate::portfolio::snapshot::PositionKey;

/// Capital movement recorded by the replay, before scope classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlowKind {
    /// Buy or resulting-entity acquisition.
    Acquisition,
    /// Sell proceeds.
    Disposal,
    TransferIn { paired: bool },
    TransferOut { paired: bool },
    Dividend,
    /// Cost moved off a parent lot by a demerger; offsets the resulting
    /// entity's acquisition.
    CostReleased,
}

/// One signed capital movement on a lot: negative out of the investor's
/// pocket, positive back to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingFlow {
    pub key: PositionKey,
    pub transaction_id: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub kind: FlowKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashflowEvent {
    pub date: NaiveDate,
    pub signed_amount: Decimal,
}

impl CashflowEvent {
    pub fn new(date: NaiveDate, signed_amount: Decimal) -> Self {
        CashflowEvent {
            date,
            signed_amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SolverMethod {
    NewtonRaphson,
    Bisection,
}

/// Result of the XIRR solver. `NotComputable` is an expected outcome (for
/// example a holding with only purchases and no value yet), not a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum XirrOutcome {
    Converged {
        rate: f64,
        iterations: u32,
        method: SolverMethod,
    },
    NotComputable {
        reason: String,
    },
}

impl XirrOutcome {
    pub fn not_computable(reason: impl Into<String>) -> Self {
        XirrOutcome::NotComputable {
            reason: reason.into(),
        }
    }

    pub fn rate(&self) -> Option<f64> {
        match self {
            XirrOutcome::Converged { rate, .. } => Some(*rate),
            XirrOutcome::NotComputable { .. } => None,
        }
    }

    /// Annual rate as a fraction (0.2 = 20%), rounded to `dp` places.
    pub fn rate_decimal(&self, dp: u32) -> Option<Decimal> {
        self.rate()
            .and_then(Decimal::from_f64)
            .map(|r| r.round_dp(dp))
    }

    /// For callers that want an error rather than the `NotComputable` state.
    pub fn into_result(self) -> Result<f64> {
        match self {
            XirrOutcome::Converged { rate, .. } => Ok(rate),
            XirrOutcome::NotComputable { reason } => {
                Err(CalculatorError::XirrNotComputable(reason).into())
            }
        }
    }
}
