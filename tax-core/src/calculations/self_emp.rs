//! Schedule C net profit and Schedule SE self-employment tax.
//!
//! # Schedule C
//!
//! | Step | Amount |
//! |------|--------|
//! | Gross profit | gross receipts - returns and allowances - cost of goods sold |
//! | Total income | gross profit + other business income |
//! | Total expenses | sum of expense lines; meals count at 50% |
//! | Home office | simplified method: `min(square feet, 300) x $5` |
//! | Net profit or loss | total income - total expenses - home office |
//!
//! # Schedule SE
//!
//! | Step | Amount |
//! |------|--------|
//! | Net earnings | net profit x 92.35% |
//! | Social security | `min(net earnings, wage base) x 12.4%` |
//! | Medicare | net earnings x 2.9% |
//! | Additional Medicare | `max(0, net earnings - 200,000) x 0.9%` |
//! | Deductible portion | total SE tax x 50% |
//!
//! A net profit of zero or less yields zero for every SE tax field.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::{SeTaxConfig, SelfEmploymentCalculator};
//!
//! let config = SeTaxConfig {
//!     ss_wage_max: dec!(168600.00),
//!     ss_tax_rate: dec!(0.124),
//!     medicare_tax_rate: dec!(0.029),
//!     additional_medicare_rate: dec!(0.009),
//!     additional_medicare_threshold: dec!(200000.00),
//!     net_earnings_factor: dec!(0.9235),
//!     deduction_factor: dec!(0.50),
//! };
//!
//! let calculator = SelfEmploymentCalculator::new(config);
//! let se_tax = calculator.self_employment_tax(dec!(50000.00)).unwrap();
//!
//! assert_eq!(se_tax.net_earnings, dec!(46175.00));
//! assert_eq!(se_tax.social_security_tax, dec!(5725.70));
//! assert_eq!(se_tax.medicare_tax, dec!(1339.08));
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::common::{max, min, round_half_up};
use crate::models::{ExpenseCategory, SelfEmploymentFacts, TaxYearConfig};

/// Share of a meals expense that is deductible.
pub const MEALS_DEDUCTIBLE_SHARE: Decimal = dec!(0.50);

/// Simplified home-office method: dollars per square foot.
pub const HOME_OFFICE_RATE_PER_SQ_FT: Decimal = dec!(5);

/// Simplified home-office method: largest qualifying area.
pub const HOME_OFFICE_MAX_SQ_FT: Decimal = dec!(300);

/// Errors raised when the SE tax configuration is out of range.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeTaxConfigError {
    #[error("net earnings factor must be between 0 and 1, got {0}")]
    InvalidNetEarningsFactor(Decimal),

    #[error("social security tax rate must be between 0 and 1, got {0}")]
    InvalidSocialSecurityRate(Decimal),

    #[error("medicare tax rate must be between 0 and 1, got {0}")]
    InvalidMedicareRate(Decimal),

    #[error("additional medicare rate must be between 0 and 1, got {0}")]
    InvalidAdditionalMedicareRate(Decimal),

    #[error("deduction factor must be between 0 and 1, got {0}")]
    InvalidDeductionFactor(Decimal),

    #[error("social security wage maximum must be positive, got {0}")]
    InvalidSsWageMax(Decimal),

    #[error("additional medicare threshold must be non-negative, got {0}")]
    InvalidAdditionalMedicareThreshold(Decimal),
}

/// Rates and limits for one year's SE tax computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeTaxConfig {
    /// Social security wage base.
    pub ss_wage_max: Decimal,
    /// Combined employer and employee social security rate, 12.4%.
    pub ss_tax_rate: Decimal,
    /// Combined employer and employee Medicare rate, 2.9%.
    pub medicare_tax_rate: Decimal,
    pub additional_medicare_rate: Decimal,
    /// Applied the same way for every filing status.
    pub additional_medicare_threshold: Decimal,
    /// Portion of net profit subject to SE tax, 92.35%.
    pub net_earnings_factor: Decimal,
    /// Portion of SE tax deductible as an adjustment to income, 50%.
    pub deduction_factor: Decimal,
}

impl SeTaxConfig {
    pub fn from_tax_year_config(config: &TaxYearConfig) -> Self {
        Self {
            ss_wage_max: config.ss_wage_max,
            ss_tax_rate: config.ss_tax_rate,
            medicare_tax_rate: config.medicare_tax_rate,
            additional_medicare_rate: config.additional_medicare_rate,
            additional_medicare_threshold: config.additional_medicare_threshold,
            net_earnings_factor: config.se_tax_deductible_percentage,
            deduction_factor: config.se_deduction_factor,
        }
    }

    /// # Errors
    ///
    /// Returns [`SeTaxConfigError`] if:
    /// - `net_earnings_factor` is not in (0, 1]
    /// - any rate or `deduction_factor` is not in [0, 1]
    /// - `ss_wage_max` is not positive
    /// - `additional_medicare_threshold` is negative
    pub fn validate(&self) -> Result<(), SeTaxConfigError> {
        if self.net_earnings_factor <= Decimal::ZERO || self.net_earnings_factor > Decimal::ONE {
            return Err(SeTaxConfigError::InvalidNetEarningsFactor(
                self.net_earnings_factor,
            ));
        }
        if !is_unit_fraction(self.ss_tax_rate) {
            return Err(SeTaxConfigError::InvalidSocialSecurityRate(self.ss_tax_rate));
        }
        if !is_unit_fraction(self.medicare_tax_rate) {
            return Err(SeTaxConfigError::InvalidMedicareRate(self.medicare_tax_rate));
        }
        if !is_unit_fraction(self.additional_medicare_rate) {
            return Err(SeTaxConfigError::InvalidAdditionalMedicareRate(
                self.additional_medicare_rate,
            ));
        }
        if !is_unit_fraction(self.deduction_factor) {
            return Err(SeTaxConfigError::InvalidDeductionFactor(self.deduction_factor));
        }
        if self.ss_wage_max <= Decimal::ZERO {
            return Err(SeTaxConfigError::InvalidSsWageMax(self.ss_wage_max));
        }
        if self.additional_medicare_threshold < Decimal::ZERO {
            return Err(SeTaxConfigError::InvalidAdditionalMedicareThreshold(
                self.additional_medicare_threshold,
            ));
        }
        Ok(())
    }
}

fn is_unit_fraction(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE
}

/// One category of Schedule C expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseBreakdownLine {
    pub category: ExpenseCategory,
    pub claimed: Decimal,
    pub deductible: Decimal,
    /// Set when a statutory limitation reduced the claimed amount.
    pub limitation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfEmploymentTax {
    pub net_earnings: Decimal,
    pub social_security_tax: Decimal,
    pub medicare_tax: Decimal,
    pub additional_medicare_tax: Decimal,
    pub total_se_tax: Decimal,
    /// Adjustment to income for the employer-equivalent half.
    pub deductible_portion: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleCResult {
    pub gross_profit: Decimal,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    /// Ordered by category.
    pub expense_breakdown: Vec<ExpenseBreakdownLine>,
    pub home_office_deduction: Decimal,
    pub net_profit_loss: Decimal,
    pub self_employment_tax: SelfEmploymentTax,
}

#[derive(Debug, Clone)]
pub struct SelfEmploymentCalculator {
    config: SeTaxConfig,
}

impl SelfEmploymentCalculator {
    pub fn new(config: SeTaxConfig) -> Self {
        Self { config }
    }

    /// Runs Schedule C and then Schedule SE on its net profit.
    ///
    /// # Errors
    ///
    /// Returns [`SeTaxConfigError`] if the configuration is invalid.
    pub fn calculate(
        &self,
        facts: &SelfEmploymentFacts,
    ) -> Result<ScheduleCResult, SeTaxConfigError> {
        self.config.validate()?;

        let gross_profit = gross_profit(facts);
        let total_income = round_half_up(gross_profit + facts.other_income);
        let expense_breakdown = expense_breakdown(facts);
        let total_expenses = total_expenses(&expense_breakdown);
        let home_office_deduction = home_office_deduction(facts.home_office_square_feet);
        let net_profit_loss = round_half_up(total_income - total_expenses - home_office_deduction);

        debug!(
            gross_profit = %gross_profit,
            total_expenses = %total_expenses,
            net_profit_loss = %net_profit_loss,
            "schedule C computed"
        );

        let self_employment_tax = self.self_employment_tax(net_profit_loss)?;

        Ok(ScheduleCResult {
            gross_profit,
            total_income,
            total_expenses,
            expense_breakdown,
            home_office_deduction,
            net_profit_loss,
            self_employment_tax,
        })
    }

    /// SE tax on a Schedule C net profit.
    ///
    /// # Errors
    ///
    /// Returns [`SeTaxConfigError`] if the configuration is invalid.
    pub fn self_employment_tax(
        &self,
        net_profit_loss: Decimal,
    ) -> Result<SelfEmploymentTax, SeTaxConfigError> {
        self.config.validate()?;

        if net_profit_loss <= Decimal::ZERO {
            warn!(
                net_profit_loss = %net_profit_loss,
                "net profit is zero or negative; no SE tax due"
            );
            return Ok(SelfEmploymentTax::default());
        }

        let net_earnings = self.net_earnings(net_profit_loss);
        let social_security_tax = self.social_security_tax(net_earnings);
        let medicare_tax = round_half_up(net_earnings * self.config.medicare_tax_rate);
        let additional_medicare_tax = self.additional_medicare_tax(net_earnings);
        let total_se_tax =
            round_half_up(social_security_tax + medicare_tax + additional_medicare_tax);
        let deductible_portion = round_half_up(total_se_tax * self.config.deduction_factor);

        Ok(SelfEmploymentTax {
            net_earnings,
            social_security_tax,
            medicare_tax,
            additional_medicare_tax,
            total_se_tax,
            deductible_portion,
        })
    }

    fn net_earnings(
        &self,
        net_profit_loss: Decimal,
    ) -> Decimal {
        round_half_up(net_profit_loss * self.config.net_earnings_factor)
    }

    fn social_security_tax(
        &self,
        net_earnings: Decimal,
    ) -> Decimal {
        if net_earnings > self.config.ss_wage_max {
            debug!(
                net_earnings = %net_earnings,
                ss_wage_max = %self.config.ss_wage_max,
                "net earnings above wage base; social security capped"
            );
        }
        let taxable = min(net_earnings, self.config.ss_wage_max);
        round_half_up(taxable * self.config.ss_tax_rate)
    }

    fn additional_medicare_tax(
        &self,
        net_earnings: Decimal,
    ) -> Decimal {
        let excess = max(
            net_earnings - self.config.additional_medicare_threshold,
            Decimal::ZERO,
        );
        round_half_up(excess * self.config.additional_medicare_rate)
    }
}

/// Schedule C net profit or loss alone, without the SE tax step.
pub fn net_profit_loss(facts: &SelfEmploymentFacts) -> Decimal {
    let total_income = round_half_up(gross_profit(facts) + facts.other_income);
    let total_expenses = total_expenses(&expense_breakdown(facts));
    let home_office = home_office_deduction(facts.home_office_square_feet);
    round_half_up(total_income - total_expenses - home_office)
}

fn gross_profit(facts: &SelfEmploymentFacts) -> Decimal {
    let gross_profit =
        round_half_up(facts.gross_receipts - facts.returns_allowances - facts.cost_of_goods_sold);
    if gross_profit < Decimal::ZERO {
        warn!(
            gross_receipts = %facts.gross_receipts,
            cost_of_goods_sold = %facts.cost_of_goods_sold,
            gross_profit = %gross_profit,
            "gross profit is negative"
        );
    }
    gross_profit
}

/// Groups expense lines by category. Meals are limited to 50% of the
/// claimed amount, and the line says so.
fn expense_breakdown(facts: &SelfEmploymentFacts) -> Vec<ExpenseBreakdownLine> {
    let mut claimed_by_category: BTreeMap<ExpenseCategory, Decimal> = BTreeMap::new();
    for item in &facts.expense_line_items {
        *claimed_by_category.entry(item.category).or_default() += item.amount;
    }

    claimed_by_category
        .into_iter()
        .map(|(category, claimed)| {
            let claimed = round_half_up(claimed);
            if category == ExpenseCategory::Meals {
                ExpenseBreakdownLine {
                    category,
                    claimed,
                    deductible: round_half_up(claimed * MEALS_DEDUCTIBLE_SHARE),
                    limitation: Some(
                        "business meals are 50% deductible; the other 50% is disallowed".to_string(),
                    ),
                }
            } else {
                ExpenseBreakdownLine {
                    category,
                    claimed,
                    deductible: claimed,
                    limitation: None,
                }
            }
        })
        .collect()
}

fn total_expenses(breakdown: &[ExpenseBreakdownLine]) -> Decimal {
    round_half_up(breakdown.iter().map(|l| l.deductible).sum())
}

fn home_office_deduction(square_feet: Option<Decimal>) -> Decimal {
    let Some(square_feet) = square_feet else {
        return Decimal::ZERO;
    };
    if square_feet > HOME_OFFICE_MAX_SQ_FT {
        warn!(
            square_feet = %square_feet,
            max = %HOME_OFFICE_MAX_SQ_FT,
            "home office area above simplified-method maximum; capping"
        );
    }
    let area = max(min(square_feet, HOME_OFFICE_MAX_SQ_FT), Decimal::ZERO);
    round_half_up(area * HOME_OFFICE_RATE_PER_SQ_FT)
}
