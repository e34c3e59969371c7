use super::*;
use crate::errors::{CalculatorError, Error, ValidationError};
use crate::portfolio::snapshot::HoldingsCalculator;
use crate::settings::EngineSettings;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn quarterly_fd() -> FixedDeposit {
    FixedDeposit::new(
        dec!(160000),
        dec!(7.05),
        d(2025, 5, 15),
        d(2026, 5, 15),
        CompoundingFrequency::Quarterly,
    )
}

fn settings() -> EngineSettings {
    EngineSettings::default()
}

#[test]
fn test_quarterly_matches_bank_statement() {
    let statement = calculate_maturity(&quarterly_fd(), &settings()).unwrap();
    assert_eq!(statement.maturity_amount, dec!(171582));
    assert_eq!(statement.total_interest, dec!(11582));
    assert_eq!(statement.principal, dec!(160000));

    let interest: Vec<Decimal> = statement.steps.iter().map(|s| s.interest).collect();
    assert_eq!(interest, vec![dec!(2820), dec!(2870), dec!(2920), dec!(2972)]);
    assert!(statement.steps.iter().all(|s| s.kind == StepKind::Compounding));
    assert_eq!(statement.steps[3].accrued_interest, dec!(2971.75125));
    assert_eq!(statement.steps[3].period_end, d(2026, 5, 15));
}

#[test]
fn test_broken_period_earns_simple_interest() {
    let fd = FixedDeposit::new(
        dec!(100000),
        dec!(7.5),
        d(2024, 1, 1),
        d(2025, 3, 1),
        CompoundingFrequency::Yearly,
    );
    let statement = calculate_maturity(&fd, &settings()).unwrap();

    assert_eq!(statement.steps.len(), 2);
    assert_eq!(statement.steps[0].closing_amount, dec!(107500));
    let broken = &statement.steps[1];
    assert_eq!(broken.kind, StepKind::BrokenPeriod);
    assert_eq!(broken.days, 59);
    assert_eq!(broken.interest, dec!(1303));
    assert_eq!(statement.maturity_amount, dec!(108803));
}

#[test]
fn test_broken_period_day_basis_is_configurable() {
    let fd = FixedDeposit::new(
        dec!(100000),
        dec!(7.5),
        d(2024, 1, 1),
        d(2025, 3, 1),
        CompoundingFrequency::Yearly,
    );
    let custom = EngineSettings {
        fd_broken_period_day_basis: 366,
        ..EngineSettings::default()
    };
    // 107500 * 0.075 * 59 / 366 = 1299.69...
    let statement = calculate_maturity(&fd, &custom).unwrap();
    assert_eq!(statement.steps[1].interest, dec!(1300));
}

#[test]
fn test_monthly_dates_chain_from_previous_credit() {
    let fd = FixedDeposit::new(
        dec!(10000),
        dec!(12),
        d(2024, 1, 31),
        d(2024, 4, 30),
        CompoundingFrequency::Monthly,
    );
    let statement = calculate_maturity(&fd, &settings()).unwrap();
    let ends: Vec<NaiveDate> = statement.steps.iter().map(|s| s.period_end).collect();
    // Jan 31 clamps to Feb 29, and every later credit follows from there.
    assert_eq!(
        ends,
        vec![d(2024, 2, 29), d(2024, 3, 29), d(2024, 4, 29), d(2024, 4, 30)]
    );
    let interest: Vec<Decimal> = statement.steps.iter().map(|s| s.interest).collect();
    assert_eq!(interest, vec![dec!(100), dec!(101), dec!(102), dec!(3)]);
    let broken = &statement.steps[3];
    assert_eq!(broken.kind, StepKind::BrokenPeriod);
    assert_eq!(broken.days, 1);
    assert_eq!(statement.maturity_amount, dec!(10306));
}

#[test]
fn test_interest_rounds_half_away_from_zero() {
    let fd = FixedDeposit::new(
        dec!(105),
        dec!(10),
        d(2024, 1, 1),
        d(2025, 1, 1),
        CompoundingFrequency::Yearly,
    );
    let statement = calculate_maturity(&fd, &settings()).unwrap();
    assert_eq!(statement.steps[0].accrued_interest, dec!(10.5));
    assert_eq!(statement.maturity_amount, dec!(116));
}

#[test]
fn test_zero_rate_returns_principal() {
    let fd = FixedDeposit::new(
        dec!(50000),
        Decimal::ZERO,
        d(2024, 1, 1),
        d(2024, 8, 15),
        CompoundingFrequency::HalfYearly,
    );
    let statement = calculate_maturity(&fd, &settings()).unwrap();
    assert_eq!(statement.maturity_amount, dec!(50000));
    assert_eq!(statement.total_interest, Decimal::ZERO);
    assert_eq!(statement.steps.len(), 2);
}

#[test]
fn test_maturity_not_after_start_is_rejected() {
    let mut fd = quarterly_fd();
    fd.maturity_date = fd.start_date;
    match calculate_maturity(&fd, &settings()) {
        Err(Error::Calculation(CalculatorError::InvalidDateRange { start, maturity })) => {
            assert_eq!(start, maturity);
        }
        other => panic!("expected InvalidDateRange, got {:?}", other),
    }
}

#[test]
fn test_non_positive_principal_and_negative_rate_are_rejected() {
    let mut fd = quarterly_fd();
    fd.principal = Decimal::ZERO;
    assert!(matches!(
        calculate_maturity(&fd, &settings()),
        Err(Error::Validation(ValidationError::InvalidInput(_)))
    ));

    let mut fd = quarterly_fd();
    fd.annual_rate_percent = dec!(-1);
    assert!(matches!(
        calculate_maturity(&fd, &settings()),
        Err(Error::Validation(ValidationError::InvalidInput(_)))
    ));
}

#[test]
fn test_value_as_of_truncates_the_schedule() {
    let fd = quarterly_fd();
    let s = settings();

    assert_eq!(value_as_of(&fd, d(2025, 1, 1), &s).unwrap().maturity_amount, dec!(160000));
    assert_eq!(value_as_of(&fd, d(2025, 11, 15), &s).unwrap().maturity_amount, dec!(165690));
    // 165690 * 0.0705 * 30 / 365 = 960.09...
    assert_eq!(value_as_of(&fd, d(2025, 12, 15), &s).unwrap().maturity_amount, dec!(166650));
    assert_eq!(value_as_of(&fd, d(2030, 1, 1), &s).unwrap().maturity_amount, dec!(171582));
}

#[test]
fn test_calculate_many_keeps_input_order() {
    let mut invalid = quarterly_fd();
    invalid.maturity_date = d(2020, 1, 1);
    let deposits = vec![quarterly_fd(), invalid, quarterly_fd()];

    let results = calculate_many(&deposits, &settings());
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().maturity_amount, dec!(171582));
    assert!(results[1].is_err());
    assert_eq!(results[2].as_ref().unwrap().maturity_amount, dec!(171582));
}

#[test]
fn test_redemption_split() {
    assert_eq!(
        redemption_split(dec!(160000), dec!(171582)),
        RedemptionBreakdown {
            principal: dec!(160000),
            interest: dec!(11582),
        }
    );
    assert_eq!(
        redemption_split(dec!(160000), dec!(159000)),
        RedemptionBreakdown {
            principal: dec!(159000),
            interest: Decimal::ZERO,
        }
    );
}

#[test]
fn test_redemption_credits_replay_as_deposits() {
    let breakdown = redemption_split(dec!(160000), dec!(171582));
    let credits = redemption_transactions("fd-7", "savings", d(2026, 5, 15), &breakdown);
    assert_eq!(credits.len(), 2);
    assert_eq!(credits[0].id, "fd-7-principal");
    assert_eq!(credits[1].gross_amount().unwrap(), dec!(11582));

    let replay = HoldingsCalculator::new(settings())
        .replay(&credits, d(2026, 5, 15))
        .unwrap();
    let ledger = replay.cash_for("savings");
    assert_eq!(ledger.deposits, dec!(171582));
    assert_eq!(ledger.balance, dec!(171582));

    let no_interest = redemption_transactions(
        "fd-8",
        "savings",
        d(2026, 5, 15),
        &redemption_split(dec!(1000), dec!(900)),
    );
    assert_eq!(no_interest.len(), 1);
}

#[test]
fn test_frequency_parsing_and_serialization() {
    assert_eq!(
        CompoundingFrequency::from_str("Half-Yearly").unwrap(),
        CompoundingFrequency::HalfYearly
    );
    assert_eq!(
        CompoundingFrequency::from_str(" QUARTERLY ").unwrap(),
        CompoundingFrequency::Quarterly
    );
    assert!(matches!(
        CompoundingFrequency::from_str("weekly"),
        Err(ValidationError::UnknownCompoundingFrequency(_))
    ));
    assert_eq!(
        serde_json::to_string(&CompoundingFrequency::HalfYearly).unwrap(),
        "\"Half-Yearly\""
    );
    assert_eq!(CompoundingFrequency::Monthly.periods_per_year(), 12);
}

#[test]
fn test_fixed_deposit_from_json_defaults_to_quarterly() {
    let json = r#"{
        "principal": 160000,
        "annualRatePercent": 7.05,
        "startDate": "2025-05-15",
        "maturityDate": "2026-05-15"
    }"#;
    let fd: FixedDeposit = serde_json::from_str(json).unwrap();
    assert_eq!(fd.compounding_frequency, CompoundingFrequency::Quarterly);
    assert_eq!(
        calculate_maturity(&fd, &settings()).unwrap().maturity_amount,
        dec!(171582)
    );
}
