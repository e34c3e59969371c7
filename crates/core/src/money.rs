//! Integer minor-unit money.
//!
//! Amounts that are compounded period after period (fixed deposits) are held
//! as `i64` paise/cents so a long chain of credits never accumulates drift.
//! `Decimal` is only produced at the output boundary.

use crate::constants::MINOR_UNITS_PER_UNIT;
use crate::errors::{Result, ValidationError};
use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// Rounds to whole currency units, half away from zero (bank statement rounding).
pub fn round_to_whole_units(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_minor_units(minor: i64) -> Self {
        Money(minor)
    }

    pub fn minor_units(self) -> i64 {
        self.0
    }

    /// Converts a decimal amount, rounding to the nearest minor unit half away from zero.
    pub fn from_decimal(amount: Decimal) -> Result<Self> {
        amount
            .checked_mul(Decimal::from(MINOR_UNITS_PER_UNIT))
            .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|scaled| scaled.to_i64())
            .map(Money)
            .ok_or_else(|| {
                ValidationError::InvalidInput(format!("amount {} is out of range", amount)).into()
            })
    }

    /// Converts a decimal amount after rounding it to whole currency units.
    pub fn from_whole_units(amount: Decimal) -> Result<Self> {
        Self::from_decimal(round_to_whole_units(amount))
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_decimal_rounds_half_away_from_zero() {
        assert_eq!(Money::from_decimal(dec!(10.005)).unwrap().minor_units(), 1001);
        assert_eq!(Money::from_decimal(dec!(-10.005)).unwrap().minor_units(), -1001);
        assert_eq!(Money::from_decimal(dec!(10.004)).unwrap().minor_units(), 1000);
    }

    #[test]
    fn test_whole_unit_rounding() {
        assert_eq!(round_to_whole_units(dec!(2869.5)), dec!(2870));
        assert_eq!(round_to_whole_units(dec!(2869.4999)), dec!(2869));
        assert_eq!(round_to_whole_units(dec!(-0.5)), dec!(-1));
        assert_eq!(
            Money::from_whole_units(dec!(2971.75125)).unwrap(),
            Money::from_minor_units(297_200)
        );
    }

    #[test]
    fn test_to_decimal_keeps_two_places() {
        let m = Money::from_minor_units(16_000_050);
        assert_eq!(m.to_decimal(), dec!(160000.50));
        assert_eq!(m.to_string(), "160000.50");
    }

    #[test]
    fn test_arithmetic() {
        let mut m = Money::from_minor_units(100);
        m += Money::from_minor_units(250);
        assert_eq!(m, Money::from_minor_units(350));
        assert_eq!(m - Money::from_minor_units(50), Money::from_minor_units(300));
        assert_eq!(Money::ZERO + m, m);
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(Money::from_decimal(Decimal::MAX).is_err());
    }
}
