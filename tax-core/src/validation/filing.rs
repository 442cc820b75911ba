use rust_decimal::Decimal;

use super::{Context, fields};
use crate::calculations::common::round_half_up;
use crate::models::{IssueKind, ValidationIssue, ValidationReport};

/// Gross income against the status and age threshold. Self-employment net
/// earnings at or above $400 require a return regardless of gross income.
pub(super) fn check(
    ctx: &Context<'_>,
    report: &mut ValidationReport,
) {
    let facts = ctx.facts;
    let config = &ctx.tables.config;

    let se_net_earnings =
        round_half_up(ctx.business_income() * config.se_tax_deductible_percentage);
    if se_net_earnings >= config.min_se_threshold {
        report.warnings.push(ValidationIssue::new(
            IssueKind::FilingRequirement,
            fields::FILING_REQUIREMENT,
            format!(
                "self-employment net earnings of {se_net_earnings} are at least {}; a return is required",
                config.min_se_threshold
            ),
        ));
        return;
    }

    let threshold = ctx.tables.filing_thresholds.threshold_for(
        facts.filing_status,
        facts.taxpayer_age,
        facts.spouse_age,
    );
    if ctx.result.gross_income >= threshold {
        return;
    }

    report.suggestions.push(ValidationIssue::new(
        IssueKind::FilingRequirement,
        fields::FILING_REQUIREMENT,
        format!(
            "gross income of {} is below the {threshold} filing threshold; a return is not required",
            ctx.result.gross_income
        ),
    ));
    if ctx.result.total_withheld > Decimal::ZERO {
        report.suggestions.push(
            ValidationIssue::new(
                IssueKind::Optimization,
                fields::TOTAL_WITHHELD,
                format!(
                    "file anyway to recover {} of withholding",
                    ctx.result.total_withheld
                ),
            )
            .with_correction(ctx.result.refund),
        );
    }
}
