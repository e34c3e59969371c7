use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;

/// Whole days from `start` to `end` (negative when `end` is earlier).
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Adds calendar months, clamping to the last day of a shorter month.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Elapsed time from `start` to `end` in years of `day_basis` days.
pub fn year_fraction(start: NaiveDate, end: NaiveDate, day_basis: Decimal) -> Decimal {
    if day_basis <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    Decimal::from(days_between(start, end)) / day_basis
}

/// Day ordinal used for quantity-weighted acquisition dates.
pub fn day_number(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}

pub fn date_from_day_number(day: i64) -> Option<NaiveDate> {
    i32::try_from(day)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}
