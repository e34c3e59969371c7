//! Engine configuration.
//!
//! Day-count conventions, the closed-position threshold and the XIRR solver
//! bounds are settings rather than constants so a host can match a specific
//! broker or bank statement.

use crate::constants::{
    FD_BROKEN_PERIOD_DAY_BASIS, HOLDING_PERIOD_DAY_BASIS, QUANTITY_THRESHOLD, XIRR_DAY_BASIS,
};
use crate::errors::{Error, Result};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning for the XIRR root finder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct XirrSettings {
    pub initial_guess: f64,
    pub max_iterations: u32,
    pub npv_tolerance: f64,
    pub rate_tolerance: f64,
    pub bisection_low: f64,
    pub bisection_high: f64,
    pub max_bisection_iterations: u32,
}

impl Default for XirrSettings {
    fn default() -> Self {
        XirrSettings {
            initial_guess: 0.1,
            max_iterations: 100,
            npv_tolerance: 1e-6,
            rate_tolerance: 1e-8,
            bisection_low: -0.99,
            bisection_high: 10.0,
            max_bisection_iterations: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Days per year when converting a holding period to years.
    pub holding_period_day_basis: Decimal,
    /// Days per year for fixed-deposit broken-period simple interest.
    pub fd_broken_period_day_basis: u32,
    /// Days per year when discounting XIRR cashflows.
    pub xirr_day_basis: f64,
    pub quantity_threshold: Decimal,
    pub include_dividends_in_xirr: bool,
    pub xirr: XirrSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            holding_period_day_basis: HOLDING_PERIOD_DAY_BASIS,
            fd_broken_period_day_basis: FD_BROKEN_PERIOD_DAY_BASIS,
            xirr_day_basis: XIRR_DAY_BASIS,
            quantity_threshold: QUANTITY_THRESHOLD,
            include_dividends_in_xirr: false,
            xirr: XirrSettings::default(),
        }
    }
}

impl EngineSettings {
    /// Parses settings from a JSON document. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: EngineSettings = serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfigValue(format!("settings JSON: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigIO(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded engine settings from {}", path.display());
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.holding_period_day_basis <= Decimal::ZERO {
            return Err(Error::InvalidConfigValue(
                "holdingPeriodDayBasis must be positive".to_string(),
            ));
        }
        if self.fd_broken_period_day_basis == 0 {
            return Err(Error::InvalidConfigValue(
                "fdBrokenPeriodDayBasis must be positive".to_string(),
            ));
        }
        if !(self.xirr_day_basis.is_finite() && self.xirr_day_basis > 0.0) {
            return Err(Error::InvalidConfigValue(
                "xirrDayBasis must be positive".to_string(),
            ));
        }
        if self.quantity_threshold.is_sign_negative() {
            return Err(Error::InvalidConfigValue(
                "quantityThreshold must not be negative".to_string(),
            ));
        }
        let x = &self.xirr;
        if x.bisection_low <= -1.0 || x.bisection_low >= x.bisection_high {
            return Err(Error::InvalidConfigValue(format!(
                "xirr bisection bounds [{}, {}] are invalid",
                x.bisection_low, x.bisection_high
            )));
        }
        if x.max_iterations == 0 || x.max_bisection_iterations == 0 {
            return Err(Error::InvalidConfigValue(
                "xirr iteration limits must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
