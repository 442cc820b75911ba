use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::contributions::ira_limit;
use super::{Context, fields};
use crate::calculations::common::{min, round_half_up};
use crate::models::{DeductionCategory, IssueKind, Owner, ValidationIssue, ValidationReport};

/// Itemized deductions within this share of the standard deduction get a
/// bunching hint.
const BUNCHING_BAND: Decimal = dec!(0.90);

pub(super) fn check(
    ctx: &Context<'_>,
    report: &mut ValidationReport,
) {
    bunching(ctx, report);
    unused_ira_room(ctx, report);
}

fn bunching(
    ctx: &Context<'_>,
    report: &mut ValidationReport,
) {
    let itemized = ctx.result.itemized_deduction;
    let standard = ctx.result.standard_deduction;
    if itemized <= Decimal::ZERO || itemized > standard || itemized < standard * BUNCHING_BAND {
        return;
    }

    report.suggestions.push(
        ValidationIssue::new(
            IssueKind::Optimization,
            fields::ITEMIZED_DEDUCTION,
            format!(
                "itemized deductions of {itemized} are within 10% of the {standard} standard deduction; \
                 bunching two years of deductions into one may let you itemize"
            ),
        )
        .with_correction(round_half_up(standard - itemized)),
    );
}

fn unused_ira_room(
    ctx: &Context<'_>,
    report: &mut ValidationReport,
) {
    let earned = ctx.facts.earned_income();
    if earned <= Decimal::ZERO {
        return;
    }
    let contributed: Decimal = ctx
        .facts
        .deduction_items
        .iter()
        .filter(|d| d.owner == Owner::Taxpayer && d.category == DeductionCategory::IraContribution)
        .map(|d| d.amount)
        .sum();
    let limit = min(
        ira_limit(&ctx.tables.contribution_limits, Some(ctx.facts.taxpayer_age)),
        earned,
    );
    let room = round_half_up(limit - contributed);
    if room <= Decimal::ZERO {
        return;
    }

    report.suggestions.push(
        ValidationIssue::new(
            IssueKind::Optimization,
            fields::IRA_ROOM,
            format!("up to {room} more can be contributed to an IRA for this year"),
        )
        .with_correction(room),
    );
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::super::test_support::{base_facts, validate};
    use super::*;
    use crate::models::{DeductionItem, TaxReturnFacts};

    #[test]
    fn near_standard_itemized_gets_bunching_hint() {
        let facts = TaxReturnFacts {
            deduction_items: vec![DeductionItem::itemized(
                DeductionCategory::MortgageInterest,
                dec!(14000),
            )],
            ..base_facts()
        };

        let report = validate(&facts);

        let issue = report.find(fields::ITEMIZED_DEDUCTION).unwrap();
        assert!(report.suggestions.contains(issue));
        assert_eq!(issue.correction, Some(dec!(600.00)));
    }

    #[test]
    fn far_below_standard_gets_no_hint() {
        let facts = TaxReturnFacts {
            deduction_items: vec![DeductionItem::itemized(
                DeductionCategory::MortgageInterest,
                dec!(5000),
            )],
            ..base_facts()
        };

        assert!(validate(&facts).find(fields::ITEMIZED_DEDUCTION).is_none());
    }

    #[test]
    fn unused_ira_room_is_suggested() {
        let facts = TaxReturnFacts {
            deduction_items: vec![DeductionItem::adjustment(
                DeductionCategory::IraContribution,
                dec!(2000),
            )],
            ..base_facts()
        };

        let report = validate(&facts);

        assert_eq!(
            report.find(fields::IRA_ROOM).and_then(|i| i.correction),
            Some(dec!(5000.00))
        );
    }

    #[test]
    fn suggestions_never_carry_into_corrections() {
        let report = validate(&base_facts());

        assert!(report.find(fields::IRA_ROOM).is_some());
        assert_eq!(report.corrections().count(), 0);
    }
}
