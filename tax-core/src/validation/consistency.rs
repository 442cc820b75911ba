//! Recomputes reported totals from their components.
//!
//! A mismatch means the caller's aggregation is wrong, not the taxpayer's
//! data, so each one is an error naming the inconsistent field with the
//! recomputed value as its correction.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

use super::{Context, fields};
use crate::calculations::common::{differs, max, round_half_up};
use crate::calculations::select_deduction;
use crate::models::{IssueKind, ValidationIssue, ValidationReport};

const TOLERANCE: Decimal = dec!(1.00);

pub(super) fn check(
    ctx: &Context<'_>,
    report: &mut ValidationReport,
) {
    let facts = ctx.facts;
    let result = ctx.result;

    let total_income =
        round_half_up(facts.total_wages() + facts.total_other_income() + ctx.business_income());
    compare(report, fields::GROSS_INCOME, result.gross_income, total_income);

    let agi = round_half_up(result.gross_income - result.adjustments);
    compare(report, fields::AGI, result.agi, agi);

    let (expected_deduction, expected_kind) =
        select_deduction(result.standard_deduction, result.itemized_deduction);
    if result.deduction_used != expected_kind
        || differs(result.deduction_amount, expected_deduction, TOLERANCE)
    {
        report.errors.push(
            ValidationIssue::new(
                IssueKind::MathMismatch,
                fields::DEDUCTION_USED,
                format!(
                    "reported {:?} deduction of {} but the larger deduction is {:?} {expected_deduction}",
                    result.deduction_used, result.deduction_amount, expected_kind
                ),
            )
            .with_correction(expected_deduction),
        );
    }

    let taxable_income = max(round_half_up(result.agi - result.deduction_amount), Decimal::ZERO);
    compare(report, fields::TAXABLE_INCOME, result.taxable_income, taxable_income);

    let net_settlement = round_half_up(result.total_withheld - result.total_tax);
    compare(report, fields::REFUND, result.net_settlement(), net_settlement);

    if result.refund > Decimal::ZERO && result.amount_owed > Decimal::ZERO {
        report.errors.push(ValidationIssue::new(
            IssueKind::MathMismatch,
            fields::AMOUNT_OWED,
            format!(
                "refund of {} and amount owed of {} are both non-zero",
                result.refund, result.amount_owed
            ),
        ));
    }
}

fn compare(
    report: &mut ValidationReport,
    field: &str,
    reported: Decimal,
    recomputed: Decimal,
) {
    if differs(reported, recomputed, TOLERANCE) {
        warn!(field, reported = %reported, recomputed = %recomputed, "reported total mismatch");
        report.errors.push(
            ValidationIssue::new(
                IssueKind::MathMismatch,
                field,
                format!("reported {field} of {reported} does not match recomputed {recomputed}"),
            )
            .with_correction(recomputed),
        );
    }
}
