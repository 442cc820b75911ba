use rust_decimal::Decimal;
use tracing::warn;

use super::{Context, fields};
use crate::calculations::common::{max, non_negative, round_half_up};
use crate::models::{DeductionCategory, IssueKind, ValidationIssue, ValidationReport};

pub(super) fn check(
    ctx: &Context<'_>,
    report: &mut ValidationReport,
) {
    salt_cap(ctx, report);
    charitable_limit(ctx, report);
    medical_floor(ctx, report);
    student_loan_interest_cap(ctx, report);
}

fn salt_cap(
    ctx: &Context<'_>,
    report: &mut ValidationReport,
) {
    let claimed = ctx.facts.deduction_total(DeductionCategory::StateLocalTax, true)
        + ctx.facts.deduction_total(DeductionCategory::PropertyTax, true);
    let cap = ctx
        .tables
        .deduction_limits
        .salt_cap_for(ctx.facts.filing_status);

    if claimed > cap {
        warn!(claimed = %claimed, cap = %cap, "SALT deduction above cap");
        report.warnings.push(
            ValidationIssue::new(
                IssueKind::LimitViolation,
                fields::SALT_DEDUCTION,
                format!("state and local tax deduction of {claimed} exceeds the {cap} cap"),
            )
            .with_correction(cap),
        );
    }
}

/// Cash gifts above 60% of AGI carry forward; only the limit is allowed this
/// year.
fn charitable_limit(
    ctx: &Context<'_>,
    report: &mut ValidationReport,
) {
    let claimed = ctx
        .facts
        .deduction_total(DeductionCategory::CharitableCash, true);
    if claimed <= Decimal::ZERO {
        return;
    }
    let limit =
        non_negative(ctx.result.agi * ctx.tables.deduction_limits.charitable_cash_agi_limit);

    if claimed > limit {
        report.warnings.push(
            ValidationIssue::new(
                IssueKind::LimitViolation,
                fields::CHARITABLE_CASH,
                format!(
                    "cash contributions of {claimed} exceed 60% of AGI ({limit}); the excess carries forward"
                ),
            )
            .with_correction(limit),
        );
    }
}

/// Only medical expenses above 7.5% of AGI are deductible.
fn medical_floor(
    ctx: &Context<'_>,
    report: &mut ValidationReport,
) {
    let claimed = ctx
        .facts
        .deduction_total(DeductionCategory::MedicalExpenses, true);
    if claimed <= Decimal::ZERO {
        return;
    }
    let floor = non_negative(ctx.result.agi * ctx.tables.deduction_limits.medical_agi_floor);
    let deductible = max(round_half_up(claimed - floor), Decimal::ZERO);

    let message = if deductible == Decimal::ZERO {
        format!("medical expenses of {claimed} do not exceed 7.5% of AGI ({floor}); nothing is deductible")
    } else {
        format!("only medical expenses above 7.5% of AGI ({floor}) are deductible")
    };
    report.warnings.push(
        ValidationIssue::new(IssueKind::LimitViolation, fields::MEDICAL_EXPENSES, message)
            .with_correction(deductible),
    );
}

fn student_loan_interest_cap(
    ctx: &Context<'_>,
    report: &mut ValidationReport,
) {
    let claimed = ctx
        .facts
        .deduction_total(DeductionCategory::StudentLoanInterest, false);
    let cap = ctx.tables.deduction_limits.student_loan_interest_cap;

    if claimed > cap {
        report.warnings.push(
            ValidationIssue::new(
                IssueKind::LimitViolation,
                fields::STUDENT_LOAN_INTEREST,
                format!("student loan interest of {claimed} exceeds the {cap} limit"),
            )
            .with_correction(cap),
        );
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::super::test_support::{base_facts, validate};
    use super::*;
    use crate::models::{DeductionItem, FilingStatus, TaxReturnFacts};

    fn with_deductions(items: Vec<DeductionItem>) -> TaxReturnFacts {
        TaxReturnFacts {
            deduction_items: items,
            ..base_facts()
        }
    }

    // =========================================================================
    // SALT cap
    // =========================================================================

    #[test]
    fn salt_above_cap_is_warning_with_correction() {
        let facts = with_deductions(vec![DeductionItem::itemized(
            DeductionCategory::StateLocalTax,
            dec!(14200),
        )]);

        let report = validate(&facts);

        let issue = report.find(fields::SALT_DEDUCTION).unwrap();
        assert_eq!(issue.correction, Some(dec!(10000)));
        assert_eq!(issue.kind, IssueKind::LimitViolation);
        assert!(report.warnings.contains(issue));
        assert!(report.errors.is_empty());
    }

    #[test]
    fn salt_cap_includes_property_tax() {
        let facts = with_deductions(vec![
            DeductionItem::itemized(DeductionCategory::StateLocalTax, dec!(6000)),
            DeductionItem::itemized(DeductionCategory::PropertyTax, dec!(5000)),
        ]);

        let report = validate(&facts);

        assert!(report.find(fields::SALT_DEDUCTION).is_some());
    }

    #[test]
    fn salt_cap_halved_for_married_separately() {
        let facts = TaxReturnFacts {
            filing_status: FilingStatus::MarriedFilingSeparately,
            ..with_deductions(vec![DeductionItem::itemized(
                DeductionCategory::StateLocalTax,
                dec!(7000),
            )])
        };

        let report = validate(&facts);

        assert_eq!(
            report.find(fields::SALT_DEDUCTION).and_then(|i| i.correction),
            Some(dec!(5000))
        );
    }

    #[test]
    fn salt_at_cap_is_fine() {
        let facts = with_deductions(vec![DeductionItem::itemized(
            DeductionCategory::StateLocalTax,
            dec!(10000),
        )]);

        assert!(validate(&facts).find(fields::SALT_DEDUCTION).is_none());
    }

    // =========================================================================
    // charitable / medical / student loan
    // =========================================================================

    #[test]
    fn charitable_cash_limited_to_sixty_percent_of_agi() {
        let facts = with_deductions(vec![DeductionItem::itemized(
            DeductionCategory::CharitableCash,
            dec!(50000),
        )]);

        let report = validate(&facts);

        assert_eq!(
            report.find(fields::CHARITABLE_CASH).and_then(|i| i.correction),
            Some(dec!(48000.00))
        );
    }

    #[test]
    fn medical_below_floor_is_warning_with_zero_correction() {
        let facts = with_deductions(vec![DeductionItem::itemized(
            DeductionCategory::MedicalExpenses,
            dec!(5000),
        )]);

        let report = validate(&facts);

        let issue = report.find(fields::MEDICAL_EXPENSES).unwrap();
        assert_eq!(issue.correction, Some(dec!(0)));
        assert!(report.errors.is_empty());
    }

    #[test]
    fn medical_above_floor_corrects_to_excess() {
        let facts = with_deductions(vec![DeductionItem::itemized(
            DeductionCategory::MedicalExpenses,
            dec!(10000),
        )]);

        let report = validate(&facts);

        // 10,000 - 7.5% x 80,000
        assert_eq!(
            report.find(fields::MEDICAL_EXPENSES).and_then(|i| i.correction),
            Some(dec!(4000.00))
        );
    }

    #[test]
    fn student_loan_interest_capped() {
        let facts = with_deductions(vec![DeductionItem::adjustment(
            DeductionCategory::StudentLoanInterest,
            dec!(3100),
        )]);

        let report = validate(&facts);

        assert_eq!(
            report.find(fields::STUDENT_LOAN_INTEREST).and_then(|i| i.correction),
            Some(dec!(2500))
        );
    }
}
