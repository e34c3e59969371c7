use crate::constants::DECIMAL_PRECISION;
use crate::portfolio::snapshot::LotState;
use crate::portfolio::valuation::HoldingValuation;

use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;

/// Marks a lot to market.
///
/// `current_value = quantity * live_price`, `pnl = current_value - total_cost`.
/// When `live_price` is `None` the lot is marked at cost: the value equals the
/// total cost, the unrealized P&L is zero and `price_missing` is set.
///
/// # Arguments
///
/// * `lot` - Replayed lot state at the valuation date.
/// * `live_price` - Latest price for the lot's instrument, if known.
/// * `valuation_date` - Date the holding period runs to.
/// * `holding_period_day_basis` - Days per year for the holding period.
pub fn value_lot(
    lot: &LotState,
    live_price: Option<Decimal>,
    valuation_date: NaiveDate,
    holding_period_day_basis: Decimal,
) -> HoldingValuation {
    let avg_price = lot.average_cost_or_zero();
    let (price, price_missing) = match live_price {
        Some(price) => (price, false),
        None => {
            warn!(
                "No live price for {} in account {}; marking at cost",
                lot.instrument, lot.account_id
            );
            (avg_price, true)
        }
    };

    let current_value = if price_missing {
        lot.total_cost
    } else {
        lot.quantity * price
    };
    let pnl = current_value - lot.total_cost;

    HoldingValuation {
        valuation_date,
        quantity: lot.quantity,
        avg_price: avg_price.round_dp(DECIMAL_PRECISION),
        live_price: price,
        price_missing,
        total_cost: lot.total_cost,
        current_value,
        pnl,
        pnl_percent: pnl_percent(pnl, lot.total_cost),
        holding_period_years: lot
            .holding_period_years(valuation_date, holding_period_day_basis)
            .round_dp(DECIMAL_PRECISION),
    }
}

/// `pnl / cost * 100`, guarded to 0 for a zero cost.
pub fn pnl_percent(pnl: Decimal, cost: Decimal) -> Decimal {
    if cost.is_zero() {
        return Decimal::ZERO;
    }
    (pnl / cost * Decimal::ONE_HUNDRED).round_dp(DECIMAL_PRECISION)
}

/// Share of `value` in `total` as a percentage; 0 when `total` is not positive.
pub fn weight_percent(value: Decimal, total: Decimal) -> Decimal {
    if total <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (value / total * Decimal::ONE_HUNDRED).round_dp(DECIMAL_PRECISION)
}
