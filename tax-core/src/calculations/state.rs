//! State income tax on the federal taxable income.

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::brackets::compute_bracket_tax;
use crate::calculations::common::{max, round_half_up};
use crate::models::{CalculationResult, FilingStatus, InputError, Jurisdiction, TaxReturnFacts};
use crate::tables::{StateSchedule, TaxYearTables};

/// Tax owed to a state under `schedule`. Joint filers use the joint
/// brackets when the state publishes them.
pub fn compute_state_tax(
    taxable_income: Decimal,
    schedule: &StateSchedule,
    filing_status: FilingStatus,
) -> Decimal {
    let taxable_income = max(taxable_income, Decimal::ZERO);
    match schedule {
        StateSchedule::NoIncomeTax => Decimal::ZERO,
        StateSchedule::Flat { rate } => round_half_up(taxable_income * rate),
        StateSchedule::Progressive { single, joint } => {
            let brackets = match joint {
                Some(joint) if filing_status.is_joint() => joint,
                _ => single,
            };
            compute_bracket_tax(taxable_income, brackets)
        }
    }
}

/// State run for `code`, built on an already computed federal result.
///
/// Income, AGI, deduction and taxable income fields are carried over from
/// the federal run. SE tax, AMT and NIIT are federal only and stay zero.
///
/// # Errors
///
/// Returns [`InputError::UnknownJurisdiction`] if the year's tables have no
/// schedule for `code`.
pub fn calculate_state(
    code: &str,
    facts: &TaxReturnFacts,
    federal: &CalculationResult,
    tables: &TaxYearTables,
) -> Result<CalculationResult, InputError> {
    let schedule = tables.state(code)?;
    let tax = compute_state_tax(federal.taxable_income, schedule, facts.filing_status);
    let code = code.trim().to_ascii_uppercase();

    debug!(
        state = %code,
        taxable_income = %federal.taxable_income,
        tax = %tax,
        "state tax computed"
    );

    Ok(CalculationResult {
        jurisdiction: Jurisdiction::State(code),
        tax_year: federal.tax_year,
        gross_income: federal.gross_income,
        adjustments: federal.adjustments,
        agi: federal.agi,
        standard_deduction: federal.standard_deduction,
        itemized_deduction: federal.itemized_deduction,
        deduction_used: federal.deduction_used,
        deduction_amount: federal.deduction_amount,
        taxable_income: federal.taxable_income,
        total_credits: Decimal::ZERO,
        tax_liability: tax,
        self_employment_tax: Decimal::ZERO,
        amt: Decimal::ZERO,
        niit: Decimal::ZERO,
        total_tax: tax,
        total_withheld: round_half_up(facts.state_withheld()),
        refund: Decimal::ZERO,
        amount_owed: Decimal::ZERO,
        effective_rate: Decimal::ZERO,
    }
    .settle())
}
