//! Optional TOML configuration for the command-line driver.
//!
//! ```toml
//! default_tax_year = 2024
//! log_level = "info"
//! log_file = "tax-engine.log"
//! bracket_csv = "brackets/2025.csv"
//! annual_interest_rate = "0.08"
//! ```
//!
//! Every key is optional. Command-line flags win over the file, and the file
//! wins over the built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::amendment::AccrualConfig;

pub const DEFAULT_TAX_YEAR: i32 = 2025;
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub default_tax_year: Option<i32>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    /// Replaces the built-in bracket schedules for the years it covers.
    pub bracket_csv: Option<PathBuf>,
    /// Annual underpayment interest rate for amendment accruals.
    pub annual_interest_rate: Option<Decimal>,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("invalid configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file '{}'", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("cannot parse config file '{}'", path.display()))
    }

    pub fn tax_year(&self) -> i32 {
        self.default_tax_year.unwrap_or(DEFAULT_TAX_YEAR)
    }

    /// `override_level` (from the command line) if given, else the file's
    /// level, else the default.
    pub fn log_level<'a>(
        &'a self,
        override_level: Option<&'a str>,
    ) -> &'a str {
        override_level
            .or(self.log_level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn accrual(&self) -> AccrualConfig {
        let defaults = AccrualConfig::default();
        match self.annual_interest_rate {
            Some(rate) => defaults.with_interest_rate(rate),
            None => defaults,
        }
    }
}
