use chrono::NaiveDate;
use log::{debug, warn};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{CalculatorError, Result};
use crate::portfolio::corporate_actions::CorporateActionAdjustment;
use crate::transactions::Transaction;
use crate::utils::time_utils::{date_from_day_number, day_number, year_fraction};

/// Identifies one lot: a single instrument held in a single account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionKey {
    pub account_id: String,
    pub instrument: String,
}

impl PositionKey {
    pub fn new(account_id: impl Into<String>, instrument: impl Into<String>) -> Self {
        PositionKey {
            account_id: account_id.into(),
            instrument: instrument.into(),
        }
    }
}

/// Cost slice taken out of a lot by a sell or transfer-out.
#[derive(Debug, Clone, PartialEq)]
pub struct Disposal {
    pub quantity: Decimal,
    /// `quantity * average unit cost` at the moment of disposal.
    pub cost_relieved: Decimal,
    /// Quantity-weighted acquisition date of the disposed units.
    pub acquisition_date: Option<NaiveDate>,
}

/// Aggregated `(quantity, total_cost)` state of one (account, instrument) pair
/// under weighted-average costing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LotState {
    pub id: String,
    pub account_id: String,
    pub instrument: String,
    pub quantity: Decimal,
    pub total_cost: Decimal,
    /// Sum of `units * acquisition day number` over the units currently held.
    pub acquisition_day_weight: Decimal,
    pub first_acquired: Option<NaiveDate>,
    pub realized_pnl: Decimal,
    pub dividend_income: Decimal,
}

impl LotState {
    pub fn new(account_id: impl Into<String>, instrument: impl Into<String>) -> Self {
        let account_id = account_id.into();
        let instrument = instrument.into();
        LotState {
            id: format!("POS-{}-{}", instrument, account_id),
            account_id,
            instrument,
            quantity: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            acquisition_day_weight: Decimal::ZERO,
            first_acquired: None,
            realized_pnl: Decimal::ZERO,
            dividend_income: Decimal::ZERO,
        }
    }

    pub fn key(&self) -> PositionKey {
        PositionKey::new(self.account_id.clone(), self.instrument.clone())
    }

    /// `total_cost / quantity`. Undefined on an empty lot.
    pub fn average_unit_cost(&self) -> Result<Decimal> {
        if self.quantity <= Decimal::ZERO {
            return Err(CalculatorError::ZeroQuantityCost {
                account_id: self.account_id.clone(),
                instrument: self.instrument.clone(),
            }
            .into());
        }
        Ok(self.total_cost / self.quantity)
    }

    /// Average unit cost, or zero for an empty lot.
    pub fn average_cost_or_zero(&self) -> Decimal {
        self.average_unit_cost().unwrap_or(Decimal::ZERO)
    }

    /// Adds units at `unit_price` plus `fees`, acquired on `date`.
    /// Returns the cost added, or `None` when the amounts overflow.
    pub fn acquire(
        &mut self,
        quantity: Decimal,
        unit_price: Decimal,
        fees: Decimal,
        date: NaiveDate,
    ) -> Option<Decimal> {
        let cost = quantity.checked_mul(unit_price)?.checked_add(fees)?;
        self.acquire_with_cost(quantity, cost, date)?;
        Some(cost)
    }

    /// Adds units carrying an already-known total cost, e.g. units relocated
    /// from another account together with their original acquisition date.
    /// The lot is left untouched when the new totals overflow.
    pub fn acquire_with_cost(
        &mut self,
        quantity: Decimal,
        cost: Decimal,
        acquired_on: NaiveDate,
    ) -> Option<()> {
        let new_quantity = self.quantity.checked_add(quantity)?;
        let new_cost = self.total_cost.checked_add(cost)?;
        let new_weight = quantity
            .checked_mul(Decimal::from(day_number(acquired_on)))
            .and_then(|weight| self.acquisition_day_weight.checked_add(weight))?;

        self.quantity = new_quantity;
        self.total_cost = new_cost;
        self.acquisition_day_weight = new_weight;
        self.first_acquired = Some(match self.first_acquired {
            Some(existing) if existing <= acquired_on => existing,
            _ => acquired_on,
        });
        Some(())
    }

    /// Removes `txn.quantity` units at the current average cost.
    ///
    /// Disposing of more than is held fails with `InsufficientHolding`. A
    /// remainder at or below `threshold` closes the lot and relieves all
    /// remaining cost.
    pub fn dispose(&mut self, txn: &Transaction, threshold: Decimal) -> Result<Disposal> {
        let requested = txn.quantity;
        if requested > self.quantity || self.quantity <= Decimal::ZERO {
            return Err(CalculatorError::InsufficientHolding {
                transaction_id: txn.id.clone(),
                account_id: self.account_id.clone(),
                instrument: self.instrument.clone(),
                date: txn.date,
                requested,
                held: self.quantity,
            }
            .into());
        }

        let acquisition_date = self.weighted_acquisition_date();
        let remaining = self.quantity - requested;
        let cost_relieved = if remaining <= threshold {
            if !remaining.is_zero() {
                debug!(
                    "Closing {} with residual quantity {} after {}",
                    self.id, remaining, txn.id
                );
            }
            let all_cost = self.total_cost;
            self.quantity = Decimal::ZERO;
            self.total_cost = Decimal::ZERO;
            self.acquisition_day_weight = Decimal::ZERO;
            self.first_acquired = None;
            all_cost
        } else {
            let relieved = self
                .average_unit_cost()?
                .checked_mul(requested)
                .ok_or_else(|| CalculatorError::InvalidTransaction {
                    transaction_id: txn.id.clone(),
                    reason: format!("cost relieved from {} overflows", self.id),
                })?;
            let fraction_kept = remaining / self.quantity;
            self.quantity = remaining;
            self.total_cost -= relieved;
            self.acquisition_day_weight *= fraction_kept;
            relieved
        };

        Ok(Disposal {
            quantity: requested,
            cost_relieved,
            acquisition_date,
        })
    }

    /// Applies a normalized corporate action to this lot. Returns `None`, and
    /// leaves the lot untouched, when the adjusted amounts overflow.
    pub fn apply_adjustment(
        &mut self,
        adjustment: &CorporateActionAdjustment,
        date: NaiveDate,
    ) -> Option<()> {
        match *adjustment {
            CorporateActionAdjustment::ScaleQuantity { factor } => self.scale_units(factor)?,
            CorporateActionAdjustment::BonusUnits { factor } => {
                self.scale_units(Decimal::ONE.checked_add(factor)?)?
            }
            CorporateActionAdjustment::RetainCost { retention } => {
                self.total_cost = self.total_cost.checked_mul(retention)?;
            }
            CorporateActionAdjustment::Acquire {
                quantity,
                unit_cost,
                fees,
            } => {
                self.acquire(quantity, unit_cost, fees, date)?;
            }
        }
        if self.quantity.is_zero() && !matches!(adjustment, CorporateActionAdjustment::Acquire { .. }) {
            warn!("Corporate action on {} applied to an empty lot", self.id);
        }
        Some(())
    }

    fn scale_units(&mut self, multiplier: Decimal) -> Option<()> {
        let quantity = self.quantity.checked_mul(multiplier)?;
        let weight = self.acquisition_day_weight.checked_mul(multiplier)?;
        self.quantity = quantity;
        self.acquisition_day_weight = weight;
        Some(())
    }

    /// Quantity-weighted acquisition date of the units currently held.
    pub fn weighted_acquisition_date(&self) -> Option<NaiveDate> {
        if self.quantity <= Decimal::ZERO {
            return None;
        }
        let mean_day = (self.acquisition_day_weight / self.quantity).round();
        mean_day.to_i64().and_then(date_from_day_number)
    }

    /// Years elapsed since the weighted acquisition date.
    pub fn holding_period_years(&self, valuation_date: NaiveDate, day_basis: Decimal) -> Decimal {
        match self.weighted_acquisition_date() {
            Some(acquired) if acquired <= valuation_date => {
                year_fraction(acquired, valuation_date, day_basis)
            }
            _ => Decimal::ZERO,
        }
    }

    /// Folds another lot of the same instrument into this one (cross-account view).
    pub fn merge(&mut self, other: &LotState) {
        self.quantity += other.quantity;
        self.total_cost += other.total_cost;
        self.acquisition_day_weight += other.acquisition_day_weight;
        self.realized_pnl += other.realized_pnl;
        self.dividend_income += other.dividend_income;
        self.first_acquired = match (self.first_acquired, other.first_acquired) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }
}
