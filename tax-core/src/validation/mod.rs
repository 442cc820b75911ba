//! Statutory limit enforcement and consistency checks.
//!
//! [`validate`] never fails for a statutory problem. Caps, phase-outs,
//! eligibility and arithmetic mismatches all land in the returned
//! [`ValidationReport`]; only structurally malformed facts are an
//! [`InputError`].
//!
//! | Check | Severity |
//! |-------|----------|
//! | SALT cap, charitable 60% of AGI, medical 7.5% floor, student loan interest | warning |
//! | IRA, HSA and 401(k) contribution limits | error |
//! | CTC phase-out, EITC and education credit eligibility and caps | error |
//! | Non-refundable credits above tax | warning |
//! | Recomputed totals off by more than $1 | error |
//! | SE net earnings of $400 or more | warning |
//! | Gross income below the filing threshold | suggestion |
//! | Bunching, unused IRA room, recovering withholding | suggestion |

mod consistency;
mod contributions;
mod credits;
mod deductions;
mod filing;
mod optimization;

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::net_profit_loss;
use crate::models::{CalculationResult, InputError, TaxReturnFacts, ValidationReport};
use crate::tables::TaxYearTables;

pub use credits::allowed_child_tax_credit;

/// Field names used in validation findings.
pub mod fields {
    pub const SALT_DEDUCTION: &str = "salt_deduction";
    pub const CHARITABLE_CASH: &str = "charitable_cash";
    pub const MEDICAL_EXPENSES: &str = "medical_expenses";
    pub const STUDENT_LOAN_INTEREST: &str = "student_loan_interest";
    pub const IRA_CONTRIBUTION: &str = "ira_contribution";
    pub const IRA_ROOM: &str = "ira_room";
    pub const HSA_CONTRIBUTION: &str = "hsa_contribution";
    pub const ELECTIVE_DEFERRAL: &str = "401k_deferral";
    pub const CHILD_TAX_CREDIT: &str = "child_tax_credit";
    pub const EARNED_INCOME_CREDIT: &str = "earned_income_credit";
    pub const AMERICAN_OPPORTUNITY_CREDIT: &str = "american_opportunity_credit";
    pub const LIFETIME_LEARNING_CREDIT: &str = "lifetime_learning_credit";
    pub const NONREFUNDABLE_CREDITS: &str = "nonrefundable_credits";
    pub const GROSS_INCOME: &str = "gross_income";
    pub const AGI: &str = "agi";
    pub const DEDUCTION_USED: &str = "deduction_used";
    pub const TAXABLE_INCOME: &str = "taxable_income";
    pub const REFUND: &str = "refund";
    pub const AMOUNT_OWED: &str = "amount_owed";
    pub const FILING_REQUIREMENT: &str = "filing_requirement";
    pub const ITEMIZED_DEDUCTION: &str = "itemized_deduction";
    pub const TOTAL_WITHHELD: &str = "total_withheld";
}

/// Inputs shared by every check.
pub(crate) struct Context<'a> {
    pub facts: &'a TaxReturnFacts,
    pub result: &'a CalculationResult,
    pub tables: &'a TaxYearTables,
}

impl Context<'_> {
    /// Schedule C net profit, zero without a business.
    pub fn business_income(&self) -> Decimal {
        self.facts
            .self_employment
            .as_ref()
            .map_or(Decimal::ZERO, net_profit_loss)
    }
}

/// Checks `facts` and the `result` derived from them against the year's
/// limits.
///
/// # Errors
///
/// Returns [`InputError`] if the facts are structurally invalid or belong to
/// a different year than `tables`.
pub fn validate(
    facts: &TaxReturnFacts,
    result: &CalculationResult,
    tables: &TaxYearTables,
) -> Result<ValidationReport, InputError> {
    facts.check_structure()?;
    if facts.tax_year != tables.tax_year() {
        return Err(InputError::UnsupportedTaxYear(facts.tax_year));
    }

    let ctx = Context {
        facts,
        result,
        tables,
    };
    let mut report = ValidationReport::default();
    deductions::check(&ctx, &mut report);
    contributions::check(&ctx, &mut report);
    credits::check(&ctx, &mut report);
    consistency::check(&ctx, &mut report);
    filing::check(&ctx, &mut report);
    optimization::check(&ctx, &mut report);

    debug!(
        taxpayer_id = %facts.taxpayer_id,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        suggestions = report.suggestions.len(),
        "validation finished"
    );

    Ok(report)
}

/// Arithmetic consistency checks for a state result.
///
/// State runs reuse the federal income lines, so only the recomputed totals
/// and the refund/owed settlement apply.
///
/// # Errors
///
/// Same as [`validate`].
pub fn validate_state(
    facts: &TaxReturnFacts,
    state: &CalculationResult,
    tables: &TaxYearTables,
) -> Result<ValidationReport, InputError> {
    facts.check_structure()?;
    if facts.tax_year != tables.tax_year() {
        return Err(InputError::UnsupportedTaxYear(facts.tax_year));
    }

    let ctx = Context {
        facts,
        result: state,
        tables,
    };
    let mut report = ValidationReport::default();
    consistency::check(&ctx, &mut report);

    debug!(
        taxpayer_id = %facts.taxpayer_id,
        jurisdiction = %state.jurisdiction,
        errors = report.errors.len(),
        "state validation finished"
    );

    Ok(report)
}
