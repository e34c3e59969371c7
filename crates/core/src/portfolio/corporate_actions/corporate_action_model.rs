use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed "N:M" ratio. Both sides are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ratio {
    pub numerator: Decimal,
    pub denominator: Decimal,
}

impl Ratio {
    /// `numerator / denominator`.
    pub fn value(&self) -> Option<Decimal> {
        self.numerator.checked_div(self.denominator)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.numerator, self.denominator)
    }
}

/// Numeric effect of a corporate action on a lot's `(quantity, total_cost)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CorporateActionAdjustment {
    /// Split: quantity multiplied by `factor`, total cost unchanged.
    ScaleQuantity { factor: Decimal },
    /// Bonus: `held * factor` new units added, total cost unchanged.
    BonusUnits { factor: Decimal },
    /// Demerger: total cost multiplied by `retention` in (0, 1], quantity unchanged.
    RetainCost { retention: Decimal },
    /// Resulting entity units acquired at an explicit cost per unit.
    Acquire {
        quantity: Decimal,
        unit_cost: Decimal,
        fees: Decimal,
    },
}
