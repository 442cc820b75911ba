//! Federal return: gross income through settlement.
//!
//! # Flow
//!
//! 1. Schedule C and SE tax when the facts carry a business.
//! 2. Gross income = wages + other income + business net profit.
//! 3. Adjustments = above-the-line items that reduce AGI + deductible SE tax.
//! 4. Deduction = larger of standard and claimed itemized (ties to standard).
//! 5. Taxable income = `max(0, AGI - deduction)`, then the bracket walk.
//! 6. AMT and NIIT on top of the regular tax.
//! 7. Non-refundable credits up to regular tax + AMT; refundable credits in
//!    full, which may push the total below zero.
//! 8. Refund or amount owed against federal withholding.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::amt::{
    AmtResult, AmtRiskAssessment, assess_amt_risk, compute_amt, compute_niit,
};
use crate::calculations::brackets::{
    compute_bracket_tax, compute_standard_deduction, select_deduction,
};
use crate::calculations::common::{max, min, round_half_up};
use crate::calculations::self_emp::{ScheduleCResult, SeTaxConfig, SelfEmploymentCalculator};
use crate::error::TaxCalcError;
use crate::models::{CalculationResult, InputError, Jurisdiction, TaxReturnFacts};
use crate::tables::TaxYearTables;

/// Intermediate figures behind a federal result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederalDetails {
    pub schedule_c: Option<ScheduleCResult>,
    pub amt: AmtResult,
    pub amt_risk: AmtRiskAssessment,
    pub nonrefundable_credits_claimed: Decimal,
    /// Portion of the claimed non-refundable credits that offset tax.
    pub nonrefundable_credits_applied: Decimal,
    pub refundable_credits: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederalCalculation {
    pub result: CalculationResult,
    pub details: FederalDetails,
}

/// Federal calculator bound to one year's tables.
#[derive(Debug, Clone, Copy)]
pub struct TaxCalculator<'a> {
    tables: &'a TaxYearTables,
}

impl<'a> TaxCalculator<'a> {
    pub fn new(tables: &'a TaxYearTables) -> Self {
        Self { tables }
    }

    /// # Errors
    ///
    /// Returns [`TaxCalcError::Input`] for structurally invalid facts or facts
    /// for a different year than the tables, and [`TaxCalcError::SeConfig`]
    /// if the year's SE configuration is out of range.
    pub fn calculate(
        &self,
        facts: &TaxReturnFacts,
    ) -> Result<FederalCalculation, TaxCalcError> {
        facts.check_structure()?;
        if facts.tax_year != self.tables.tax_year() {
            return Err(InputError::UnsupportedTaxYear(facts.tax_year).into());
        }

        let schedule_c = match &facts.self_employment {
            Some(business) => {
                let config = SeTaxConfig::from_tax_year_config(&self.tables.config);
                Some(SelfEmploymentCalculator::new(config).calculate(business)?)
            }
            None => None,
        };
        let business_income = schedule_c
            .as_ref()
            .map_or(Decimal::ZERO, |c| c.net_profit_loss);
        let se = schedule_c
            .as_ref()
            .map(|c| c.self_employment_tax.clone())
            .unwrap_or_default();

        let gross_income =
            round_half_up(facts.total_wages() + facts.total_other_income() + business_income);
        let adjustments = round_half_up(self.agi_adjustments(facts) + se.deductible_portion);
        let agi = round_half_up(gross_income - adjustments);

        let standard_deduction = compute_standard_deduction(self.tables, facts.filing_status);
        let itemized_deduction =
            round_half_up(facts.itemized_items().map(|d| d.amount).sum());
        let (deduction_amount, deduction_used) =
            select_deduction(standard_deduction, itemized_deduction);
        let taxable_income = max(round_half_up(agi - deduction_amount), Decimal::ZERO);

        let tax_liability = compute_bracket_tax(
            taxable_income,
            self.tables.brackets_for(facts.filing_status),
        );
        let amt = compute_amt(
            taxable_income,
            &facts.amt_preference_items,
            tax_liability,
            facts.filing_status,
            &self.tables.amt,
        );
        let niit = compute_niit(
            agi,
            facts.investment_income,
            facts.filing_status,
            &self.tables.niit,
        );

        let nonrefundable_claimed = round_half_up(facts.nonrefundable_credits());
        let nonrefundable_applied = min(nonrefundable_claimed, tax_liability + amt.amt);
        let refundable = round_half_up(facts.refundable_credits());
        let total_credits = round_half_up(nonrefundable_applied + refundable);

        let total_tax = round_half_up(
            max(tax_liability + amt.amt - nonrefundable_applied, Decimal::ZERO)
                + se.total_se_tax
                + niit
                - refundable,
        );

        debug!(
            taxpayer_id = %facts.taxpayer_id,
            tax_year = facts.tax_year,
            agi = %agi,
            taxable_income = %taxable_income,
            total_tax = %total_tax,
            "federal return computed"
        );

        let result = CalculationResult {
            jurisdiction: Jurisdiction::Federal,
            tax_year: facts.tax_year,
            gross_income,
            adjustments,
            agi,
            standard_deduction,
            itemized_deduction,
            deduction_used,
            deduction_amount,
            taxable_income,
            total_credits,
            tax_liability,
            self_employment_tax: se.total_se_tax,
            amt: amt.amt,
            niit,
            total_tax,
            total_withheld: round_half_up(facts.federal_withheld()),
            refund: Decimal::ZERO,
            amount_owed: Decimal::ZERO,
            effective_rate: Decimal::ZERO,
        }
        .settle();

        Ok(FederalCalculation {
            result,
            details: FederalDetails {
                schedule_c,
                amt_risk: assess_amt_risk(facts, agi),
                amt,
                nonrefundable_credits_claimed: nonrefundable_claimed,
                nonrefundable_credits_applied: nonrefundable_applied,
                refundable_credits: refundable,
            },
        })
    }

    /// Above-the-line items that reduce AGI, as claimed.
    fn agi_adjustments(
        &self,
        facts: &TaxReturnFacts,
    ) -> Decimal {
        facts
            .above_the_line_items()
            .filter(|d| d.category.is_agi_adjustment())
            .map(|d| d.amount)
            .sum()
    }
}
