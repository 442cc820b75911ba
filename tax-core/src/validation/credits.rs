use rust_decimal::Decimal;
use tracing::warn;

use super::{Context, fields};
use crate::calculations::common::{max, non_negative, round_half_up};
use crate::models::{CreditType, FilingStatus, IssueKind, ValidationIssue, ValidationReport};
use crate::tables::CreditParameters;

pub(super) fn check(
    ctx: &Context<'_>,
    report: &mut ValidationReport,
) {
    child_tax_credit(ctx, report);
    earned_income_credit(ctx, report);
    education_credits(ctx, report);
    nonrefundable_ceiling(ctx, report);
}

/// Child tax credit after the phase-out: `$50` for each `$1,000` of AGI, or
/// part of `$1,000`, above the threshold.
pub fn allowed_child_tax_credit(
    params: &CreditParameters,
    filing_status: FilingStatus,
    qualifying_children: usize,
    agi: Decimal,
) -> Decimal {
    let full = params.ctc_per_child * Decimal::from(qualifying_children);
    let excess = max(
        agi - *params.ctc_phase_out_threshold.get(filing_status),
        Decimal::ZERO,
    );
    let steps = (excess / params.ctc_phase_out_step).ceil();
    non_negative(full - steps * params.ctc_reduction_per_step)
}

fn child_tax_credit(
    ctx: &Context<'_>,
    report: &mut ValidationReport,
) {
    let claimed = ctx.facts.credits_of(CreditType::ChildTaxCredit);
    if claimed <= Decimal::ZERO {
        return;
    }
    let children = ctx
        .facts
        .dependents
        .iter()
        .filter(|d| d.is_ctc_qualifying())
        .count();
    let allowed = allowed_child_tax_credit(
        &ctx.tables.credits,
        ctx.facts.filing_status,
        children,
        ctx.result.agi,
    );

    if claimed > allowed {
        report.errors.push(
            ValidationIssue::new(
                IssueKind::LimitViolation,
                fields::CHILD_TAX_CREDIT,
                format!(
                    "child tax credit of {claimed} exceeds the {allowed} allowed for {children} qualifying children at AGI {}",
                    ctx.result.agi
                ),
            )
            .with_correction(allowed),
        );
    }
}

fn earned_income_credit(
    ctx: &Context<'_>,
    report: &mut ValidationReport,
) {
    let claimed = ctx.facts.credits_of(CreditType::EarnedIncomeCredit);
    if claimed <= Decimal::ZERO {
        return;
    }
    let eitc = &ctx.tables.credits.eitc;
    let children = ctx
        .facts
        .dependents
        .iter()
        .filter(|d| d.is_eitc_qualifying())
        .count();
    let Some(row) = eitc.row(u32::try_from(children).unwrap_or(u32::MAX)) else {
        warn!("EITC table has no rows; skipping check");
        return;
    };

    let ineligible = |message: String| {
        ValidationIssue::new(IssueKind::Eligibility, fields::EARNED_INCOME_CREDIT, message)
            .with_correction(Decimal::ZERO)
    };

    if ctx.facts.filing_status == FilingStatus::MarriedFilingSeparately {
        report.errors.push(ineligible(
            "earned income credit is not available when married filing separately".to_string(),
        ));
        return;
    }
    if ctx.facts.investment_income > eitc.investment_income_limit {
        report.errors.push(ineligible(format!(
            "investment income of {} exceeds the EITC limit of {}",
            ctx.facts.investment_income, eitc.investment_income_limit
        )));
        return;
    }
    let agi_limit = if ctx.facts.filing_status.is_joint() {
        row.agi_limit_joint
    } else {
        row.agi_limit
    };
    if ctx.result.agi > agi_limit {
        report.errors.push(ineligible(format!(
            "AGI of {} exceeds the EITC limit of {agi_limit} for {children} qualifying children",
            ctx.result.agi
        )));
        return;
    }
    if claimed > row.max_credit {
        report.errors.push(
            ValidationIssue::new(
                IssueKind::LimitViolation,
                fields::EARNED_INCOME_CREDIT,
                format!(
                    "earned income credit of {claimed} exceeds the {} maximum",
                    row.max_credit
                ),
            )
            .with_correction(row.max_credit),
        );
    }
}

/// Education credits phase out linearly between the start and end of the
/// MAGI range and are unavailable when married filing separately.
fn education_credits(
    ctx: &Context<'_>,
    report: &mut ValidationReport,
) {
    let params = &ctx.tables.credits.education;
    let students = ctx
        .facts
        .dependents
        .iter()
        .filter(|d| d.is_student)
        .count()
        .max(1);
    let claims = [
        (
            CreditType::AmericanOpportunityCredit,
            fields::AMERICAN_OPPORTUNITY_CREDIT,
            params.aotc_max_per_student * Decimal::from(students),
        ),
        (
            CreditType::LifetimeLearningCredit,
            fields::LIFETIME_LEARNING_CREDIT,
            params.llc_max,
        ),
    ];

    let (start, end) = if ctx.facts.filing_status.is_joint() {
        (params.phase_out_start_joint, params.phase_out_end_joint)
    } else {
        (params.phase_out_start, params.phase_out_end)
    };
    let agi = ctx.result.agi;

    for (credit_type, field, cap) in claims {
        let claimed = ctx.facts.credits_of(credit_type);
        if claimed <= Decimal::ZERO {
            continue;
        }
        if ctx.facts.filing_status == FilingStatus::MarriedFilingSeparately {
            report.errors.push(
                ValidationIssue::new(
                    IssueKind::Eligibility,
                    field,
                    "education credits are not available when married filing separately",
                )
                .with_correction(Decimal::ZERO),
            );
            continue;
        }
        if agi >= end {
            report.errors.push(
                ValidationIssue::new(
                    IssueKind::Eligibility,
                    field,
                    format!("AGI of {agi} is at or above the {end} education credit limit"),
                )
                .with_correction(Decimal::ZERO),
            );
            continue;
        }
        let allowed = if agi > start {
            round_half_up(cap * (end - agi) / (end - start))
        } else {
            cap
        };
        if claimed > allowed {
            report.errors.push(
                ValidationIssue::new(
                    IssueKind::LimitViolation,
                    field,
                    format!("education credit of {claimed} exceeds the {allowed} allowed"),
                )
                .with_correction(allowed),
            );
        }
    }
}

/// Non-refundable credits above the tax they offset are lost.
fn nonrefundable_ceiling(
    ctx: &Context<'_>,
    report: &mut ValidationReport,
) {
    let claimed = ctx.facts.nonrefundable_credits();
    let ceiling = ctx.result.tax_liability + ctx.result.amt;

    if claimed > ceiling {
        report.warnings.push(
            ValidationIssue::new(
                IssueKind::LimitViolation,
                fields::NONREFUNDABLE_CREDITS,
                format!(
                    "non-refundable credits of {claimed} exceed tax before credits of {ceiling}; {} is lost",
                    claimed - ceiling
                ),
            )
            .with_correction(ceiling),
        );
    }
}
