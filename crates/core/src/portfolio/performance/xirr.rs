//! Money-weighted return (XIRR) solver.
//!
//! Solves `sum(amount_i / (1 + r)^(days_i / basis)) = 0` with Newton-Raphson
//! from the configured seed, falling back to bisection over a bounded bracket
//! when Newton stalls, leaves the domain or produces a non-finite value.

use log::{debug, warn};
use num_traits::ToPrimitive;

use crate::settings::XirrSettings;
use crate::utils::time_utils::days_between;

use super::performance_model::{CashflowEvent, SolverMethod, XirrOutcome};

/// Cashflows reduced to `(years since first flow, amount)`.
struct Series {
    points: Vec<(f64, f64)>,
}

impl Series {
    fn npv(&self, rate: f64) -> f64 {
        let base = 1.0 + rate;
        self.points
            .iter()
            .map(|(t, amount)| amount / base.powf(*t))
            .sum()
    }

    fn npv_derivative(&self, rate: f64) -> f64 {
        let base = 1.0 + rate;
        self.points
            .iter()
            .map(|(t, amount)| -t * amount / base.powf(t + 1.0))
            .sum()
    }
}

fn build_series(cashflows: &[CashflowEvent], day_basis: f64) -> Option<Series> {
    let origin = cashflows.iter().map(|cf| cf.date).min()?;
    let mut points = Vec::with_capacity(cashflows.len());
    for cf in cashflows {
        let amount = cf.signed_amount.to_f64()?;
        let years = days_between(origin, cf.date) as f64 / day_basis;
        points.push((years, amount));
    }
    Some(Series { points })
}

fn newton(series: &Series, settings: &XirrSettings) -> Option<(f64, u32)> {
    let mut rate = settings.initial_guess;
    for iteration in 1..=settings.max_iterations {
        if rate <= -1.0 {
            debug!("Newton left the domain at iteration {}", iteration);
            return None;
        }
        let value = series.npv(rate);
        if !value.is_finite() {
            return None;
        }
        if value.abs() < settings.npv_tolerance {
            return Some((rate, iteration));
        }
        let slope = series.npv_derivative(rate);
        if !slope.is_finite() || slope == 0.0 {
            return None;
        }
        let next = rate - value / slope;
        if !next.is_finite() {
            return None;
        }
        if (next - rate).abs() < settings.rate_tolerance {
            return (next > -1.0 && series.npv(next).is_finite()).then_some((next, iteration));
        }
        rate = next;
    }
    debug!(
        "Newton did not converge within {} iterations",
        settings.max_iterations
    );
    None
}

fn bisection(series: &Series, settings: &XirrSettings) -> Option<(f64, u32)> {
    let mut low = settings.bisection_low;
    let mut high = settings.bisection_high;
    let mut f_low = series.npv(low);
    let f_high = series.npv(high);
    if !f_low.is_finite() || !f_high.is_finite() {
        return None;
    }
    if f_low.abs() < settings.npv_tolerance {
        return Some((low, 0));
    }
    if f_high.abs() < settings.npv_tolerance {
        return Some((high, 0));
    }
    if f_low.signum() == f_high.signum() {
        return None;
    }
    for iteration in 1..=settings.max_bisection_iterations {
        let mid = (low + high) / 2.0;
        let f_mid = series.npv(mid);
        if f_mid.abs() < settings.npv_tolerance || (high - low) / 2.0 < settings.rate_tolerance {
            return Some((mid, iteration));
        }
        if f_mid.signum() == f_low.signum() {
            low = mid;
            f_low = f_mid;
        } else {
            high = mid;
        }
    }
    Some(((low + high) / 2.0, settings.max_bisection_iterations))
}

/// Solves for the annual money-weighted return of `cashflows`.
///
/// Cashflows need not be sorted. A series without both an outflow and an
/// inflow has no root and yields `NotComputable`.
pub fn calculate_xirr(
    cashflows: &[CashflowEvent],
    day_basis: f64,
    settings: &XirrSettings,
) -> XirrOutcome {
    let has_outflow = cashflows.iter().any(|cf| cf.signed_amount.is_sign_negative() && !cf.signed_amount.is_zero());
    let has_inflow = cashflows.iter().any(|cf| cf.signed_amount.is_sign_positive() && !cf.signed_amount.is_zero());
    if !has_outflow || !has_inflow {
        return XirrOutcome::not_computable("cashflow series has no sign change");
    }

    let Some(series) = build_series(cashflows, day_basis) else {
        return XirrOutcome::not_computable("cashflow amount not representable");
    };

    if let Some((rate, iterations)) = newton(&series, settings) {
        return XirrOutcome::Converged {
            rate,
            iterations,
            method: SolverMethod::NewtonRaphson,
        };
    }

    match bisection(&series, settings) {
        Some((rate, iterations)) => XirrOutcome::Converged {
            rate,
            iterations,
            method: SolverMethod::Bisection,
        },
        None => {
            warn!(
                "XIRR has no root in [{}, {}] for {} cashflows",
                settings.bisection_low,
                settings.bisection_high,
                cashflows.len()
            );
            XirrOutcome::not_computable(format!(
                "no root in [{}, {}]",
                settings.bisection_low, settings.bisection_high
            ))
        }
    }
}
