//! Original-versus-amended comparison for Form 1040-X.
//!
//! Callers go through [`prepare_amendment`], which refuses to produce a diff
//! unless the original return may still be amended.

mod accrual;
mod eligibility;

pub use accrual::{Accrual, AccrualConfig, AccrualError, accrue, months_late};
pub use eligibility::{
    AMENDMENT_WINDOW_MONTHS, EligibilityError, ReturnStatus, amendment_deadline, check_eligibility,
};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::calculations::common::{max, round_half_up};
use crate::models::{
    AmendmentDiff, CalculationResult, DiffLine, DiffSummary, LineEffect, TaxReturnFacts, settle,
};

/// Changes at or below a cent are rounding noise.
const CHANGE_THRESHOLD: Decimal = dec!(0.01);

/// One side of the comparison: a computed result and the facts behind it.
#[derive(Debug, Clone, Copy)]
pub struct ReturnSnapshot<'a> {
    pub facts: &'a TaxReturnFacts,
    pub result: &'a CalculationResult,
}

impl<'a> ReturnSnapshot<'a> {
    pub fn new(
        facts: &'a TaxReturnFacts,
        result: &'a CalculationResult,
    ) -> Self {
        Self { facts, result }
    }

    fn lines(&self) -> [(&'static str, Decimal, LineEffect); 12] {
        let facts = self.facts;
        let result = self.result;
        let wages = round_half_up(facts.total_wages());
        let other_income = round_half_up(facts.total_other_income());
        use LineEffect::{Informational, Liability, Payment};
        [
            ("Wages", wages, Informational),
            ("Other income", other_income, Informational),
            (
                "Business income",
                round_half_up(result.gross_income - wages - other_income),
                Informational,
            ),
            ("Adjustments to income", result.adjustments, Informational),
            ("Adjusted gross income", result.agi, Informational),
            ("Deductions", result.deduction_amount, Informational),
            ("Taxable income", result.taxable_income, Informational),
            ("Tax", round_half_up(result.tax_liability + result.amt), Informational),
            ("Credits", result.total_credits, Informational),
            (
                "Other taxes",
                round_half_up(result.self_employment_tax + result.niit),
                Informational,
            ),
            ("Total tax", result.total_tax, Liability),
            ("Total payments", result.total_withheld, Payment),
        ]
    }
}

/// Line-by-line comparison of two completed returns.
///
/// `net_change` is positive when the amended return leaves the taxpayer
/// better off and always equals the sum of the tax-affecting line changes,
/// signed by their effect.
pub fn diff(
    original: ReturnSnapshot<'_>,
    amended: ReturnSnapshot<'_>,
) -> AmendmentDiff {
    let lines: Vec<DiffLine> = original
        .lines()
        .into_iter()
        .zip(amended.lines())
        .map(|((label, original_amount, effect), (_, amended_amount, _))| {
            let change = round_half_up(amended_amount - original_amount);
            DiffLine {
                line_label: label.to_string(),
                original_amount,
                amended_amount,
                change,
                has_changed: change.abs() > CHANGE_THRESHOLD,
                effect,
            }
        })
        .collect();

    let (original_refund, original_owed) =
        settle(original.result.total_withheld, original.result.total_tax);
    let (amended_refund, amended_owed) =
        settle(amended.result.total_withheld, amended.result.total_tax);
    let net_change =
        round_half_up((amended_refund - original_refund) - (amended_owed - original_owed));

    debug!(
        changed_lines = lines.iter().filter(|l| l.has_changed).count(),
        net_change = %net_change,
        "amendment diff computed"
    );

    AmendmentDiff {
        lines,
        summary: DiffSummary {
            original_refund,
            original_owed,
            amended_refund,
            amended_owed,
            additional_refund: max(net_change, Decimal::ZERO),
            additional_tax_owed: max(-net_change, Decimal::ZERO),
            net_change,
        },
    }
}

/// Checks that the original return may be amended on `today`, then diffs.
///
/// # Errors
///
/// Returns [`EligibilityError`] if the original was never filed or accepted,
/// or if `today` is past the amendment deadline.
pub fn prepare_amendment(
    original_status: ReturnStatus,
    filed_on: NaiveDate,
    today: NaiveDate,
    original: ReturnSnapshot<'_>,
    amended: ReturnSnapshot<'_>,
) -> Result<AmendmentDiff, EligibilityError> {
    check_eligibility(original_status, filed_on, today)?;
    Ok(diff(original, amended))
}

#[cfg(test)]
pub(crate) mod test_support {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::models::{
        CalculationResult, DeductionKind, FilingStatus, IncomeItem, IncomeSourceType, Jurisdiction,
        TaxReturnFacts,
    };

    pub fn wage_facts(wages: Decimal) -> TaxReturnFacts {
        TaxReturnFacts {
            income_items: vec![IncomeItem::wages(IncomeSourceType::W2, wages, dec!(0))],
            ..TaxReturnFacts::new("tp-1", 2024, FilingStatus::Single, 40)
        }
    }

    /// Result with the given wages, tax and payments; other fields follow
    /// from the standard deduction.
    pub fn wage_result(
        wages: Decimal,
        total_tax: Decimal,
        payments: Decimal,
    ) -> CalculationResult {
        CalculationResult {
            jurisdiction: Jurisdiction::Federal,
            tax_year: 2024,
            gross_income: wages,
            adjustments: dec!(0),
            agi: wages,
            standard_deduction: dec!(14600),
            itemized_deduction: dec!(0),
            deduction_used: DeductionKind::Standard,
            deduction_amount: dec!(14600),
            taxable_income: wages - dec!(14600),
            total_credits: dec!(0),
            tax_liability: total_tax,
            self_employment_tax: dec!(0),
            amt: dec!(0),
            niit: dec!(0),
            total_tax,
            total_withheld: payments,
            refund: dec!(0),
            amount_owed: dec!(0),
            effective_rate: dec!(0),
        }
        .settle()
    }
}
