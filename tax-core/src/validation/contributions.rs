use rust_decimal::Decimal;

use super::{Context, fields};
use crate::models::{DeductionCategory, IssueKind, Owner, ValidationIssue, ValidationReport};
use crate::tables::ContributionLimits;

/// Limit with a catch-up amount once `age` reaches `catch_up_age`. Unknown
/// ages get no catch-up.
pub(super) fn limit_with_catch_up(
    base: Decimal,
    catch_up: Decimal,
    catch_up_age: u32,
    age: Option<u32>,
) -> Decimal {
    if age.is_some_and(|a| a >= catch_up_age) {
        base + catch_up
    } else {
        base
    }
}

pub(super) fn ira_limit(
    limits: &ContributionLimits,
    age: Option<u32>,
) -> Decimal {
    limit_with_catch_up(limits.ira_base, limits.ira_catch_up, limits.ira_catch_up_age, age)
}

pub(super) fn check(
    ctx: &Context<'_>,
    report: &mut ValidationReport,
) {
    for owner in [Owner::Taxpayer, Owner::Spouse] {
        let age = ctx.facts.age_of(owner);
        let limits = &ctx.tables.contribution_limits;
        let owned = |category| owned_total(ctx, owner, category);

        let ira = owned(DeductionCategory::IraContribution);
        check_limit(report, owner, fields::IRA_CONTRIBUTION, "IRA", ira, ira_limit(limits, age));

        let hsa_self = owned(DeductionCategory::HsaContribution);
        let hsa_family = owned(DeductionCategory::HsaFamilyContribution);
        let hsa_base = if hsa_family > Decimal::ZERO {
            limits.hsa_family
        } else {
            limits.hsa_self_only
        };
        check_limit(
            report,
            owner,
            fields::HSA_CONTRIBUTION,
            "HSA",
            hsa_self + hsa_family,
            limit_with_catch_up(hsa_base, limits.hsa_catch_up, limits.hsa_catch_up_age, age),
        );

        let deferral = owned(DeductionCategory::Retirement401k);
        check_limit(
            report,
            owner,
            fields::ELECTIVE_DEFERRAL,
            "401(k)",
            deferral,
            limit_with_catch_up(
                limits.elective_deferral,
                limits.elective_catch_up,
                limits.elective_catch_up_age,
                age,
            ),
        );
    }
}

fn owned_total(
    ctx: &Context<'_>,
    owner: Owner,
    category: DeductionCategory,
) -> Decimal {
    ctx.facts
        .deduction_items
        .iter()
        .filter(|d| d.owner == owner && d.category == category)
        .map(|d| d.amount)
        .sum()
}

/// Field name for an owner's finding: `ira_contribution` for the taxpayer,
/// `ira_contribution.spouse` for the spouse.
pub(super) fn owner_field(
    field: &str,
    owner: Owner,
) -> String {
    match owner {
        Owner::Taxpayer => field.to_string(),
        Owner::Spouse => format!("{field}.spouse"),
    }
}

fn check_limit(
    report: &mut ValidationReport,
    owner: Owner,
    field: &str,
    label: &str,
    contributed: Decimal,
    limit: Decimal,
) {
    if contributed > limit {
        report.errors.push(
            ValidationIssue::new(
                IssueKind::LimitViolation,
                owner_field(field, owner),
                format!("{label} contributions of {contributed} exceed the {limit} limit"),
            )
            .with_correction(limit),
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

    fn contribution(
        category: DeductionCategory,
        amount: Decimal,
        owner: Owner,
    ) -> DeductionItem {
        DeductionItem {
            owner,
            ..DeductionItem::adjustment(category, amount)
        }
    }

    // =========================================================================
    // IRA
    // =========================================================================

    #[test]
    fn ira_over_limit_is_error_with_cap() {
        let facts = TaxReturnFacts {
            deduction_items: vec![contribution(
                DeductionCategory::IraContribution,
                dec!(7500),
                Owner::Taxpayer,
            )],
            ..base_facts()
        };

        let report = validate(&facts);

        let issue = report.find(fields::IRA_CONTRIBUTION).unwrap();
        assert_eq!(issue.correction, Some(dec!(7000)));
        assert!(report.errors.contains(issue));
    }

    #[test]
    fn ira_catch_up_at_fifty() {
        let facts = TaxReturnFacts {
            taxpayer_age: 50,
            deduction_items: vec![contribution(
                DeductionCategory::IraContribution,
                dec!(7500),
                Owner::Taxpayer,
            )],
            ..base_facts()
        };

        assert!(validate(&facts).find(fields::IRA_CONTRIBUTION).is_none());
    }

    #[test]
    fn spouse_limit_uses_spouse_age() {
        let facts = TaxReturnFacts {
            filing_status: FilingStatus::MarriedFilingJointly,
            taxpayer_age: 60,
            spouse_age: Some(45),
            deduction_items: vec![contribution(
                DeductionCategory::IraContribution,
                dec!(8000),
                Owner::Spouse,
            )],
            ..base_facts()
        };

        let report = validate(&facts);

        assert_eq!(
            report.find("ira_contribution.spouse").and_then(|i| i.correction),
            Some(dec!(7000))
        );
    }

    // =========================================================================
    // HSA / 401(k)
    // =========================================================================

    #[test]
    fn hsa_family_limit_with_catch_up_at_fifty_five() {
        let facts = TaxReturnFacts {
            taxpayer_age: 55,
            deduction_items: vec![contribution(
                DeductionCategory::HsaFamilyContribution,
                dec!(9300),
                Owner::Taxpayer,
            )],
            ..base_facts()
        };

        assert!(validate(&facts).find(fields::HSA_CONTRIBUTION).is_none());
    }

    #[test]
    fn hsa_self_only_over_limit() {
        let facts = TaxReturnFacts {
            deduction_items: vec![contribution(
                DeductionCategory::HsaContribution,
                dec!(5000),
                Owner::Taxpayer,
            )],
            ..base_facts()
        };

        assert_eq!(
            validate(&facts)
                .find(fields::HSA_CONTRIBUTION)
                .and_then(|i| i.correction),
            Some(dec!(4150))
        );
    }

    #[test]
    fn elective_deferral_over_limit() {
        let facts = TaxReturnFacts {
            deduction_items: vec![contribution(
                DeductionCategory::Retirement401k,
                dec!(25000),
                Owner::Taxpayer,
            )],
            ..base_facts()
        };

        let report = validate(&facts);

        assert_eq!(
            report.find(fields::ELECTIVE_DEFERRAL).and_then(|i| i.correction),
            Some(dec!(23000))
        );
        assert!(report.blocks_filing());
    }

    #[test]
    fn unknown_age_gets_no_catch_up() {
        assert_eq!(
            limit_with_catch_up(dec!(7000), dec!(1000), 50, None),
            dec!(7000)
        );
    }
}
