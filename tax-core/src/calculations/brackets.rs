//! Progressive bracket tax, standard deduction lookup and deduction choice.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::FilingStatus;
//! use tax_core::calculations::compute_bracket_tax;
//! use tax_core::tables::TaxTableRegistry;
//!
//! let registry = TaxTableRegistry::builtin().unwrap();
//! let tables = registry.get(2024).unwrap();
//!
//! // 10% x 11,600 + 12% x 35,550 + 22% x 15,100
//! let tax = compute_bracket_tax(dec!(62250), tables.brackets_for(FilingStatus::Single));
//! assert_eq!(tax, dec!(8748.00));
//! ```

use rust_decimal::Decimal;
use tracing::warn;

use crate::calculations::common::{min, round_half_up};
use crate::models::{BracketSchedule, DeductionKind, FilingStatus};
use crate::tables::TaxYearTables;

/// Walks the schedule from the bottom, taxing each bracket's slice of
/// `taxable_income` at that bracket's rate.
///
/// Negative income is treated as zero.
pub fn compute_bracket_tax(
    taxable_income: Decimal,
    schedule: &BracketSchedule,
) -> Decimal {
    if taxable_income < Decimal::ZERO {
        warn!(
            taxable_income = %taxable_income,
            "negative taxable income passed to bracket walk; treating as zero"
        );
        return Decimal::ZERO;
    }

    let mut remaining = taxable_income;
    let mut tax = Decimal::ZERO;
    for bracket in schedule.brackets() {
        if remaining <= Decimal::ZERO {
            break;
        }
        let slice = match bracket.width() {
            Some(width) => min(remaining, width),
            None => remaining,
        };
        tax += slice * bracket.tax_rate;
        remaining -= slice;
    }

    round_half_up(tax)
}

/// Rate applied to the next dollar of income.
pub fn marginal_rate(
    taxable_income: Decimal,
    schedule: &BracketSchedule,
) -> Decimal {
    schedule
        .brackets()
        .iter()
        .find(|b| b.max_income.is_none_or(|max| taxable_income < max))
        .map(|b| b.tax_rate)
        .unwrap_or(Decimal::ZERO)
}

pub fn compute_standard_deduction(
    tables: &TaxYearTables,
    filing_status: FilingStatus,
) -> Decimal {
    *tables.standard_deduction.get(filing_status)
}

/// Picks the larger deduction. Itemized wins only when strictly greater, so
/// ties go to the standard deduction.
pub fn select_deduction(
    standard: Decimal,
    itemized: Decimal,
) -> (Decimal, DeductionKind) {
    if itemized > standard {
        (round_half_up(itemized), DeductionKind::Itemized)
    } else {
        (round_half_up(standard), DeductionKind::Standard)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::TaxBracket;
    use crate::tables::TaxTableRegistry;

    fn single_2024() -> BracketSchedule {
        TaxTableRegistry::builtin()
            .unwrap()
            .get(2024)
            .unwrap()
            .brackets_for(FilingStatus::Single)
            .clone()
    }

    /// Sum of each bracket's full width times its rate, for every bracket
    /// below `index`.
    fn cumulative_tax_below(
        schedule: &BracketSchedule,
        index: usize,
    ) -> Decimal {
        schedule.brackets()[..index]
            .iter()
            .map(|b| b.width().unwrap_or_default() * b.tax_rate)
            .sum()
    }

    // =========================================================================
    // compute_bracket_tax tests
    // =========================================================================

    #[test]
    fn zero_income_has_zero_tax() {
        assert_eq!(compute_bracket_tax(dec!(0), &single_2024()), dec!(0));
    }

    #[test]
    fn negative_income_is_treated_as_zero() {
        assert_eq!(compute_bracket_tax(dec!(-500), &single_2024()), dec!(0));
    }

    #[test]
    fn single_filer_scenario_matches_bracket_walk() {
        let tax = compute_bracket_tax(dec!(62250), &single_2024());

        let expected =
            dec!(0.10) * dec!(11600) + dec!(0.12) * dec!(35550) + dec!(0.22) * dec!(15100);
        assert_eq!(tax, round_half_up(expected));
        assert_eq!(tax, dec!(8748.00));
    }

    #[test]
    fn tax_within_first_bracket() {
        assert_eq!(compute_bracket_tax(dec!(10000), &single_2024()), dec!(1000.00));
    }

    #[test]
    fn tax_at_every_boundary_equals_cumulative_prior_brackets() {
        let schedule = single_2024();

        for (index, bracket) in schedule.brackets().iter().enumerate() {
            let tax = compute_bracket_tax(bracket.min_income, &schedule);

            assert_eq!(tax, round_half_up(cumulative_tax_below(&schedule, index)));
        }
    }

    #[test]
    fn top_bracket_taxes_all_remaining_income() {
        let schedule = BracketSchedule::new(vec![
            TaxBracket::new(dec!(0), Some(dec!(100)), dec!(0.10)),
            TaxBracket::new(dec!(100), None, dec!(0.50)),
        ])
        .unwrap();

        assert_eq!(compute_bracket_tax(dec!(1100), &schedule), dec!(510.00));
    }

    #[test]
    fn rounds_fractional_cents_half_up() {
        let schedule =
            BracketSchedule::new(vec![TaxBracket::new(dec!(0), None, dec!(0.105))]).unwrap();

        assert_eq!(compute_bracket_tax(dec!(0.10), &schedule), dec!(0.01));
    }

    // =========================================================================
    // marginal_rate tests
    // =========================================================================

    #[test]
    fn marginal_rate_uses_bracket_of_next_dollar() {
        let schedule = single_2024();

        assert_eq!(marginal_rate(dec!(0), &schedule), dec!(0.10));
        assert_eq!(marginal_rate(dec!(11600), &schedule), dec!(0.12));
        assert_eq!(marginal_rate(dec!(62250), &schedule), dec!(0.22));
        assert_eq!(marginal_rate(dec!(10000000), &schedule), dec!(0.37));
    }

    // =========================================================================
    // standard deduction / select_deduction tests
    // =========================================================================

    #[test]
    fn standard_deduction_comes_from_year_table() {
        let registry = TaxTableRegistry::builtin().unwrap();

        assert_eq!(
            compute_standard_deduction(registry.get(2024).unwrap(), FilingStatus::Single),
            dec!(14600)
        );
        assert_eq!(
            compute_standard_deduction(registry.get(2025).unwrap(), FilingStatus::Single),
            dec!(15000)
        );
    }

    #[test]
    fn select_deduction_prefers_larger_itemized() {
        assert_eq!(
            select_deduction(dec!(14600), dec!(20000)),
            (dec!(20000), DeductionKind::Itemized)
        );
    }

    #[test]
    fn select_deduction_uses_standard_when_itemized_smaller() {
        assert_eq!(
            select_deduction(dec!(14600), dec!(9000)),
            (dec!(14600), DeductionKind::Standard)
        );
    }

    #[test]
    fn select_deduction_tie_goes_to_standard() {
        assert_eq!(
            select_deduction(dec!(14600), dec!(14600)),
            (dec!(14600), DeductionKind::Standard)
        );
    }

    // =========================================================================
    // properties
    // =========================================================================

    proptest! {
        #[test]
        fn prop_bracket_tax_is_monotonic(a in 0u64..2_000_000, b in 0u64..2_000_000) {
            let schedule = single_2024();
            let (low, high) = if a <= b { (a, b) } else { (b, a) };

            let low_tax = compute_bracket_tax(Decimal::from(low), &schedule);
            let high_tax = compute_bracket_tax(Decimal::from(high), &schedule);

            prop_assert!(low_tax <= high_tax);
        }

        #[test]
        fn prop_increment_inside_bracket_is_taxed_at_bracket_rate(
            index in 0usize..6,
            offset_pct in 0u64..50,
            step_pct in 1u64..50,
        ) {
            let schedule = single_2024();
            let bracket = &schedule.brackets()[index];
            let width = bracket.width().unwrap_or_default();
            let start =
                bracket.min_income + (width * Decimal::from(offset_pct) / dec!(100)).floor();
            let increment = (width * Decimal::from(step_pct) / dec!(100)).floor();

            let before = compute_bracket_tax(start, &schedule);
            let after = compute_bracket_tax(start + increment, &schedule);

            prop_assert_eq!(after - before, increment * bracket.tax_rate);
        }
    }
}
