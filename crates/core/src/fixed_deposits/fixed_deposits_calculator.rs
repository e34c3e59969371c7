//! Bank-style fixed-deposit maturity.
//!
//! Interest is credited period by period and each credit is rounded to whole
//! currency units, half away from zero, before it starts earning. A trailing
//! span shorter than one period earns simple interest on the compounded
//! amount. A closed-form `P * (1 + r/n)^(nt)` does not reproduce bank
//! statements and is not used.

use chrono::NaiveDate;
use log::debug;
use rayon::prelude::*;
use rust_decimal::Decimal;

use crate::errors::{CalculatorError, Error, Result, ValidationError};
use crate::fixed_deposits::fixed_deposits_model::{
    CompoundingStep, FixedDeposit, MaturityStatement, RedemptionBreakdown, StepKind,
};
use crate::money::Money;
use crate::settings::EngineSettings;
use crate::transactions::{Transaction, TransactionKind};
use crate::utils::time_utils::{add_months, days_between};

fn validate(fd: &FixedDeposit) -> Result<()> {
    if fd.maturity_date <= fd.start_date {
        return Err(CalculatorError::InvalidDateRange {
            start: fd.start_date,
            maturity: fd.maturity_date,
        }
        .into());
    }
    if fd.principal <= Decimal::ZERO {
        return Err(ValidationError::InvalidInput(format!(
            "principal must be positive, got {}",
            fd.principal
        ))
        .into());
    }
    if fd.annual_rate_percent.is_sign_negative() && !fd.annual_rate_percent.is_zero() {
        return Err(ValidationError::InvalidInput(format!(
            "annual rate must not be negative, got {}",
            fd.annual_rate_percent
        ))
        .into());
    }
    Ok(())
}

/// Runs the compounding schedule from the start date up to `through`.
///
/// Each compounding date is the previous one plus the period's months,
/// clamped to month end, so a deposit opened on the 31st credits on the 29th
/// of every month after February in a leap year.
fn accrue(fd: &FixedDeposit, through: NaiveDate, day_basis: u32) -> Result<MaturityStatement> {
    let months = fd.compounding_frequency.months_per_period();
    let hundred = Decimal::ONE_HUNDRED;
    let periodic_rate =
        fd.annual_rate_percent / Decimal::from(fd.compounding_frequency.periods_per_year()) / hundred;
    let annual_rate = fd.annual_rate_percent / hundred;

    let principal = Money::from_decimal(fd.principal)?;
    let mut current_amount = principal;
    let mut current_date = fd.start_date;
    let mut steps: Vec<CompoundingStep> = Vec::new();

    for period in 1u32.. {
        let next_date = add_months(current_date, months).ok_or_else(|| {
            Error::Unexpected(format!(
                "compounding date out of range after {} period(s) from {}",
                period, fd.start_date
            ))
        })?;
        if next_date > through {
            break;
        }

        let accrued = current_amount.to_decimal() * periodic_rate;
        let interest = Money::from_whole_units(accrued)?;
        let opening = current_amount;
        current_amount += interest;
        debug!(
            "FD period {} {}..{}: {} + {} (accrued {})",
            period, current_date, next_date, opening, interest, accrued
        );
        steps.push(CompoundingStep {
            kind: StepKind::Compounding,
            period_start: current_date,
            period_end: next_date,
            days: days_between(current_date, next_date),
            opening_amount: opening.to_decimal(),
            accrued_interest: accrued,
            interest: interest.to_decimal(),
            closing_amount: current_amount.to_decimal(),
        });
        current_date = next_date;
    }

    let days_remaining = days_between(current_date, through);
    if days_remaining > 0 {
        let accrued = current_amount.to_decimal() * annual_rate * Decimal::from(days_remaining)
            / Decimal::from(day_basis);
        let interest = Money::from_whole_units(accrued)?;
        let opening = current_amount;
        current_amount += interest;
        debug!(
            "FD broken period {}..{} ({} days): {} + {} (accrued {})",
            current_date, through, days_remaining, opening, interest, accrued
        );
        steps.push(CompoundingStep {
            kind: StepKind::BrokenPeriod,
            period_start: current_date,
            period_end: through,
            days: days_remaining,
            opening_amount: opening.to_decimal(),
            accrued_interest: accrued,
            interest: interest.to_decimal(),
            closing_amount: current_amount.to_decimal(),
        });
    }

    Ok(MaturityStatement {
        principal: principal.to_decimal(),
        maturity_amount: current_amount.to_decimal(),
        total_interest: (current_amount - principal).to_decimal(),
        steps,
    })
}

/// Maturity amount and the credit-by-credit audit trail.
pub fn calculate_maturity(fd: &FixedDeposit, settings: &EngineSettings) -> Result<MaturityStatement> {
    validate(fd)?;
    accrue(fd, fd.maturity_date, settings.fd_broken_period_day_basis)
}

/// Accrued value on `as_of`, capped at maturity. Before the start date the
/// deposit is worth its principal.
pub fn value_as_of(
    fd: &FixedDeposit,
    as_of: NaiveDate,
    settings: &EngineSettings,
) -> Result<MaturityStatement> {
    validate(fd)?;
    let through = as_of.min(fd.maturity_date).max(fd.start_date);
    accrue(fd, through, settings.fd_broken_period_day_basis)
}

/// Maturity for many deposits. Output order matches input order.
pub fn calculate_many(
    deposits: &[FixedDeposit],
    settings: &EngineSettings,
) -> Vec<Result<MaturityStatement>> {
    deposits
        .par_iter()
        .map(|fd| calculate_maturity(fd, settings))
        .collect()
}

/// Splits a redemption into principal and interest. Interest is never
/// negative; a premature redemption below principal is all principal.
pub fn redemption_split(principal: Decimal, final_amount: Decimal) -> RedemptionBreakdown {
    let interest = (final_amount - principal).max(Decimal::ZERO);
    RedemptionBreakdown {
        principal: final_amount - interest,
        interest,
    }
}

/// Cash deposits that credit a redemption to `account_id`: one for the
/// principal and one for any interest.
pub fn redemption_transactions(
    id_prefix: &str,
    account_id: &str,
    redemption_date: NaiveDate,
    breakdown: &RedemptionBreakdown,
) -> Vec<Transaction> {
    let mut credits = Vec::with_capacity(2);
    let parts = [
        ("principal", breakdown.principal),
        ("interest", breakdown.interest),
    ];
    for (part, amount) in parts {
        if amount <= Decimal::ZERO {
            continue;
        }
        let mut txn = Transaction::new(
            format!("{}-{}", id_prefix, part),
            account_id,
            None,
            TransactionKind::Deposit,
            redemption_date,
            amount,
            Decimal::ONE,
        );
        txn.notes = Some(format!("FD redemption ({})", part));
        credits.push(txn);
    }
    credits
}
