//! Fixed-deposit domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;

/// How often interest is credited to the deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum CompoundingFrequency {
    Monthly,
    #[default]
    Quarterly,
    #[serde(rename = "Half-Yearly")]
    HalfYearly,
    Yearly,
}

impl CompoundingFrequency {
    pub fn months_per_period(&self) -> u32 {
        match self {
            CompoundingFrequency::Monthly => 1,
            CompoundingFrequency::Quarterly => 3,
            CompoundingFrequency::HalfYearly => 6,
            CompoundingFrequency::Yearly => 12,
        }
    }

    pub fn periods_per_year(&self) -> u32 {
        12 / self.months_per_period()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompoundingFrequency::Monthly => "Monthly",
            CompoundingFrequency::Quarterly => "Quarterly",
            CompoundingFrequency::HalfYearly => "Half-Yearly",
            CompoundingFrequency::Yearly => "Yearly",
        }
    }
}

impl fmt::Display for CompoundingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompoundingFrequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(CompoundingFrequency::Monthly),
            "quarterly" => Ok(CompoundingFrequency::Quarterly),
            "half-yearly" | "half_yearly" | "halfyearly" => Ok(CompoundingFrequency::HalfYearly),
            "yearly" | "annually" => Ok(CompoundingFrequency::Yearly),
            _ => Err(ValidationError::UnknownCompoundingFrequency(s.to_string())),
        }
    }
}

impl TryFrom<String> for CompoundingFrequency {
    type Error = ValidationError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        CompoundingFrequency::from_str(&value)
    }
}

/// A fixed deposit as recorded by the bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedDeposit {
    pub principal: Decimal,
    /// Annual rate in percent, e.g. `7.05`.
    pub annual_rate_percent: Decimal,
    pub start_date: NaiveDate,
    pub maturity_date: NaiveDate,
    #[serde(default)]
    pub compounding_frequency: CompoundingFrequency,
}

impl FixedDeposit {
    pub fn new(
        principal: Decimal,
        annual_rate_percent: Decimal,
        start_date: NaiveDate,
        maturity_date: NaiveDate,
        compounding_frequency: CompoundingFrequency,
    ) -> Self {
        FixedDeposit {
            principal,
            annual_rate_percent,
            start_date,
            maturity_date,
            compounding_frequency,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    /// A full compounding period.
    Compounding,
    /// The trailing span shorter than one period, at simple interest.
    BrokenPeriod,
}

/// One credit on the deposit, as it would appear on a bank statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundingStep {
    pub kind: StepKind,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub days: i64,
    pub opening_amount: Decimal,
    /// Interest before rounding.
    pub accrued_interest: Decimal,
    /// Interest credited, rounded to whole currency units.
    pub interest: Decimal,
    pub closing_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaturityStatement {
    pub principal: Decimal,
    pub maturity_amount: Decimal,
    pub total_interest: Decimal,
    pub steps: Vec<CompoundingStep>,
}

/// Principal and interest parts of a redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionBreakdown {
    pub principal: Decimal,
    pub interest: Decimal,
}
