use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Consolidated view across all accounts
pub const PORTFOLIO_TOTAL_ACCOUNT_ID: &str = "TOTAL";

/// Decimal precision for valuation outputs
pub const DECIMAL_PRECISION: u32 = 6;

/// Holdings at or below this quantity are treated as closed
pub const QUANTITY_THRESHOLD: Decimal = dec!(0.0001);

/// Days per year used for holding-period years
pub const HOLDING_PERIOD_DAY_BASIS: Decimal = dec!(365.25);

/// Days per year used for fixed-deposit broken-period interest
pub const FD_BROKEN_PERIOD_DAY_BASIS: u32 = 365;

/// Days per year used to discount XIRR cashflows
pub const XIRR_DAY_BASIS: f64 = 365.0;

/// Minor units (paise/cents) per currency unit
pub const MINOR_UNITS_PER_UNIT: i64 = 100;
