//! Alternative minimum tax, net investment income tax and the advisory AMT
//! risk assessment.
//!
//! [`AmtRiskAssessment`] is a qualitative indicator for planning. It never
//! feeds a tax figure; only [`AmtResult::amt`] and [`compute_niit`] do.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{max, min, round_half_up};
use crate::models::{AmtPreferenceItems, FilingStatus, TaxReturnFacts};
use crate::tables::{AmtParameters, NiitParameters};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmtResult {
    pub amti: Decimal,
    pub exemption: Decimal,
    pub amt_taxable_income: Decimal,
    pub tentative_minimum_tax: Decimal,
    pub regular_tax: Decimal,
    /// Never negative.
    pub amt: Decimal,
}

/// AMT from the regular taxable income, the preference add-backs and the
/// regular tax already computed.
pub fn compute_amt(
    taxable_income: Decimal,
    preferences: &AmtPreferenceItems,
    regular_tax: Decimal,
    filing_status: FilingStatus,
    params: &AmtParameters,
) -> AmtResult {
    let amti = round_half_up(taxable_income + preferences.total());
    let exemption = amt_exemption(amti, filing_status, params);
    let amt_taxable_income = max(round_half_up(amti - exemption), Decimal::ZERO);
    let tentative_minimum_tax = tentative_minimum_tax(amt_taxable_income, filing_status, params);
    let amt = max(round_half_up(tentative_minimum_tax - regular_tax), Decimal::ZERO);

    debug!(
        amti = %amti,
        exemption = %exemption,
        tentative_minimum_tax = %tentative_minimum_tax,
        regular_tax = %regular_tax,
        amt = %amt,
        "AMT computed"
    );

    AmtResult {
        amti,
        exemption,
        amt_taxable_income,
        tentative_minimum_tax,
        regular_tax,
        amt,
    }
}

/// Base exemption reduced by the phase-out rate on AMTI above the threshold,
/// floored at zero.
fn amt_exemption(
    amti: Decimal,
    filing_status: FilingStatus,
    params: &AmtParameters,
) -> Decimal {
    let base = *params.exemption.get(filing_status);
    let excess = max(
        amti - *params.phase_out_threshold.get(filing_status),
        Decimal::ZERO,
    );
    max(round_half_up(base - excess * params.phase_out_rate), Decimal::ZERO)
}

fn tentative_minimum_tax(
    amt_taxable_income: Decimal,
    filing_status: FilingStatus,
    params: &AmtParameters,
) -> Decimal {
    let threshold = if filing_status == FilingStatus::MarriedFilingSeparately {
        params.rate_threshold / dec!(2)
    } else {
        params.rate_threshold
    };
    let low = min(amt_taxable_income, threshold) * params.low_rate;
    let high = max(amt_taxable_income - threshold, Decimal::ZERO) * params.high_rate;
    round_half_up(low + high)
}

/// Net investment income tax; MAGI is taken to be AGI.
pub fn compute_niit(
    magi: Decimal,
    net_investment_income: Decimal,
    filing_status: FilingStatus,
    params: &NiitParameters,
) -> Decimal {
    let threshold = *params.threshold.get(filing_status);
    if magi <= threshold || net_investment_income <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_half_up(min(net_investment_income, magi - threshold) * params.rate)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub indicator: String,
    pub weight: u32,
}

/// Qualitative likelihood of owing AMT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmtRiskAssessment {
    pub score: u32,
    pub level: RiskLevel,
    pub factors: Vec<RiskFactor>,
}

const SALT_ADD_BACK_LEVEL: Decimal = dec!(10000);
const HIGH_INCOME_LEVEL: Decimal = dec!(200000);
const MANY_DEPENDENTS: usize = 3;

const HIGH_RISK_SCORE: u32 = 50;
const MEDIUM_RISK_SCORE: u32 = 25;

pub fn assess_amt_risk(
    facts: &TaxReturnFacts,
    agi: Decimal,
) -> AmtRiskAssessment {
    let prefs = &facts.amt_preference_items;
    let indicators = [
        (
            prefs.state_local_tax_deduction >= SALT_ADD_BACK_LEVEL,
            "large state and local tax add-back",
            25,
        ),
        (prefs.exercised_isos > Decimal::ZERO, "exercised incentive stock options", 30),
        (
            prefs.private_activity_bond_interest > Decimal::ZERO,
            "private activity bond interest",
            15,
        ),
        (agi >= HIGH_INCOME_LEVEL, "high income", 20),
        (facts.dependents.len() >= MANY_DEPENDENTS, "many dependents", 10),
    ];

    let factors: Vec<RiskFactor> = indicators
        .into_iter()
        .filter(|(present, _, _)| *present)
        .map(|(_, indicator, weight)| RiskFactor {
            indicator: indicator.to_string(),
            weight,
        })
        .collect();
    let score = factors.iter().map(|f| f.weight).sum();

    AmtRiskAssessment {
        score,
        level: risk_level(score),
        factors,
    }
}

fn risk_level(score: u32) -> RiskLevel {
    if score >= HIGH_RISK_SCORE {
        RiskLevel::High
    } else if score >= MEDIUM_RISK_SCORE {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::{prop_assert, proptest};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::Dependent;
    use crate::tables::{TaxTableRegistry, TaxYearTables};

    fn tables_2024() -> TaxYearTables {
        TaxTableRegistry::builtin().unwrap().get(2024).unwrap().clone()
    }

    // =========================================================================
    // compute_amt tests
    // =========================================================================

    #[test]
    fn no_amt_when_amti_below_exemption() {
        let tables = tables_2024();

        let result = compute_amt(
            dec!(60000),
            &AmtPreferenceItems::default(),
            dec!(8000),
            FilingStatus::Single,
            &tables.amt,
        );

        assert_eq!(result.amt_taxable_income, dec!(0));
        assert_eq!(result.amt, dec!(0));
    }

    #[test]
    fn iso_exercise_triggers_amt() {
        let tables = tables_2024();
        let prefs = AmtPreferenceItems {
            exercised_isos: dec!(200000),
            ..AmtPreferenceItems::default()
        };

        let result = compute_amt(
            dec!(100000),
            &prefs,
            dec!(17053.00),
            FilingStatus::Single,
            &tables.amt,
        );

        assert_eq!(result.amti, dec!(300000.00));
        assert_eq!(result.exemption, dec!(85700.00));
        assert_eq!(result.amt_taxable_income, dec!(214300.00));
        assert_eq!(result.tentative_minimum_tax, dec!(55718.00));
        assert_eq!(result.amt, dec!(38665.00));
    }

    #[test]
    fn exemption_phases_out_above_threshold() {
        let tables = tables_2024();

        assert_eq!(
            amt_exemption(dec!(700000), FilingStatus::Single, &tables.amt),
            dec!(63037.50)
        );
        assert_eq!(
            amt_exemption(dec!(1000000), FilingStatus::Single, &tables.amt),
            dec!(0)
        );
    }

    #[test]
    fn high_rate_applies_above_threshold() {
        let tables = tables_2024();

        // 0.26 x 232,600 + 0.28 x 17,400
        assert_eq!(
            tentative_minimum_tax(dec!(250000), FilingStatus::Single, &tables.amt),
            dec!(65348.00)
        );
    }

    #[test]
    fn married_separately_uses_half_rate_threshold() {
        let tables = tables_2024();

        // 0.26 x 116,300 + 0.28 x 33,700
        assert_eq!(
            tentative_minimum_tax(dec!(150000), FilingStatus::MarriedFilingSeparately, &tables.amt),
            dec!(39674.00)
        );
    }

    // =========================================================================
    // compute_niit tests
    // =========================================================================

    #[test]
    fn niit_zero_at_or_below_threshold() {
        let tables = tables_2024();

        assert_eq!(
            compute_niit(dec!(200000), dec!(50000), FilingStatus::Single, &tables.niit),
            dec!(0)
        );
    }

    #[test]
    fn niit_on_lesser_of_income_and_excess() {
        let tables = tables_2024();

        assert_eq!(
            compute_niit(dec!(230000), dec!(50000), FilingStatus::Single, &tables.niit),
            dec!(1140.00)
        );
        assert_eq!(
            compute_niit(dec!(400000), dec!(50000), FilingStatus::Single, &tables.niit),
            dec!(1900.00)
        );
    }

    #[test]
    fn niit_threshold_depends_on_status() {
        let tables = tables_2024();

        assert_eq!(
            compute_niit(
                dec!(240000),
                dec!(50000),
                FilingStatus::MarriedFilingJointly,
                &tables.niit
            ),
            dec!(0)
        );
    }

    // =========================================================================
    // assess_amt_risk tests
    // =========================================================================

    #[test]
    fn risk_is_low_without_indicators() {
        let facts = TaxReturnFacts::new("tp", 2024, FilingStatus::Single, 40);

        let risk = assess_amt_risk(&facts, dec!(50000));

        assert_eq!(risk.score, 0);
        assert_eq!(risk.level, RiskLevel::Low);
        assert!(risk.factors.is_empty());
    }

    #[test]
    fn risk_is_high_with_isos_and_salt() {
        let mut facts = TaxReturnFacts::new("tp", 2024, FilingStatus::Single, 40);
        facts.amt_preference_items.exercised_isos = dec!(50000);
        facts.amt_preference_items.state_local_tax_deduction = dec!(10000);

        let risk = assess_amt_risk(&facts, dec!(150000));

        assert_eq!(risk.score, 55);
        assert_eq!(risk.level, RiskLevel::High);
    }

    #[test]
    fn risk_is_medium_for_high_income_family() {
        let mut facts = TaxReturnFacts::new("tp", 2024, FilingStatus::Single, 40);
        facts.dependents = vec![Dependent::default(); 3];

        let risk = assess_amt_risk(&facts, dec!(250000));

        assert_eq!(risk.score, 30);
        assert_eq!(risk.level, RiskLevel::Medium);
    }

    // =========================================================================
    // properties
    // =========================================================================

    proptest! {
        #[test]
        fn prop_amt_is_never_negative(
            taxable in 0u64..3_000_000,
            isos in 0u64..1_000_000,
            regular in 0u64..1_000_000,
        ) {
            let tables = tables_2024();
            let prefs = AmtPreferenceItems {
                exercised_isos: Decimal::from(isos),
                ..AmtPreferenceItems::default()
            };

            let result = compute_amt(
                Decimal::from(taxable),
                &prefs,
                Decimal::from(regular),
                FilingStatus::Single,
                &tables.amt,
            );

            prop_assert!(result.amt >= Decimal::ZERO);
            if result.amti <= result.exemption {
                prop_assert!(result.amt == Decimal::ZERO);
            }
        }
    }
}
