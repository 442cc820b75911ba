//! Versioned tax-year reference data.
//!
//! Every rate, limit and threshold the calculators use lives in a
//! [`TaxYearTables`] value that is passed in explicitly. Nothing in the
//! engine reads a global table, so several years can be computed side by side
//! and tests can inject synthetic schedules.

mod states;
mod y2024;
mod y2025;

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{BracketError, BracketSchedule, FilingStatus, InputError, TaxYearConfig};

/// One value per filing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerStatus<T> {
    pub single: T,
    pub married_filing_jointly: T,
    pub married_filing_separately: T,
    pub head_of_household: T,
    pub qualifying_widow: T,
}

impl<T> PerStatus<T> {
    pub fn get(
        &self,
        status: FilingStatus,
    ) -> &T {
        match status {
            FilingStatus::Single => &self.single,
            FilingStatus::MarriedFilingJointly => &self.married_filing_jointly,
            FilingStatus::MarriedFilingSeparately => &self.married_filing_separately,
            FilingStatus::HeadOfHousehold => &self.head_of_household,
            FilingStatus::QualifyingWidow => &self.qualifying_widow,
        }
    }

    pub fn get_mut(
        &mut self,
        status: FilingStatus,
    ) -> &mut T {
        match status {
            FilingStatus::Single => &mut self.single,
            FilingStatus::MarriedFilingJointly => &mut self.married_filing_jointly,
            FilingStatus::MarriedFilingSeparately => &mut self.married_filing_separately,
            FilingStatus::HeadOfHousehold => &mut self.head_of_household,
            FilingStatus::QualifyingWidow => &mut self.qualifying_widow,
        }
    }
}

impl<T: Clone> PerStatus<T> {
    /// Joint value for MFJ and qualifying widow, `other` for the rest.
    pub fn joint_or(
        joint: T,
        other: T,
    ) -> Self {
        Self {
            single: other.clone(),
            married_filing_jointly: joint.clone(),
            married_filing_separately: other.clone(),
            head_of_household: other,
            qualifying_widow: joint,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmtParameters {
    pub exemption: PerStatus<Decimal>,
    pub phase_out_threshold: PerStatus<Decimal>,
    pub phase_out_rate: Decimal,
    /// AMT taxable income taxed at `low_rate`; halved for MFS.
    pub rate_threshold: Decimal,
    pub low_rate: Decimal,
    pub high_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NiitParameters {
    pub threshold: PerStatus<Decimal>,
    pub rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLimits {
    pub salt_cap: Decimal,
    pub salt_cap_married_separately: Decimal,
    pub charitable_cash_agi_limit: Decimal,
    pub medical_agi_floor: Decimal,
    pub student_loan_interest_cap: Decimal,
}

impl DeductionLimits {
    pub fn salt_cap_for(
        &self,
        status: FilingStatus,
    ) -> Decimal {
        if status == FilingStatus::MarriedFilingSeparately {
            self.salt_cap_married_separately
        } else {
            self.salt_cap
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionLimits {
    pub ira_base: Decimal,
    pub ira_catch_up: Decimal,
    pub ira_catch_up_age: u32,
    pub hsa_self_only: Decimal,
    pub hsa_family: Decimal,
    pub hsa_catch_up: Decimal,
    pub hsa_catch_up_age: u32,
    pub elective_deferral: Decimal,
    pub elective_catch_up: Decimal,
    pub elective_catch_up_age: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EitcRow {
    pub qualifying_children: u32,
    pub max_credit: Decimal,
    pub agi_limit: Decimal,
    pub agi_limit_joint: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EitcTable {
    pub investment_income_limit: Decimal,
    /// Rows for 0, 1, 2 and 3-or-more qualifying children.
    pub rows: Vec<EitcRow>,
}

impl EitcTable {
    /// Row for the given child count; counts above the last row use it.
    pub fn row(
        &self,
        qualifying_children: u32,
    ) -> Option<&EitcRow> {
        self.rows
            .iter()
            .rev()
            .find(|r| r.qualifying_children <= qualifying_children)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationCreditParameters {
    pub aotc_max_per_student: Decimal,
    pub llc_max: Decimal,
    pub phase_out_start: Decimal,
    pub phase_out_end: Decimal,
    pub phase_out_start_joint: Decimal,
    pub phase_out_end_joint: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditParameters {
    pub ctc_per_child: Decimal,
    pub ctc_phase_out_threshold: PerStatus<Decimal>,
    pub ctc_reduction_per_step: Decimal,
    pub ctc_phase_out_step: Decimal,
    pub eitc: EitcTable,
    pub education: EducationCreditParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingThresholds {
    /// Gross income threshold when nobody on the return is 65 or older.
    pub base: PerStatus<Decimal>,
    /// Added once per filer (taxpayer, and spouse on a joint return) who is
    /// 65 or older.
    pub additional_per_senior: PerStatus<Decimal>,
    pub senior_age: u32,
}

impl FilingThresholds {
    pub fn threshold_for(
        &self,
        status: FilingStatus,
        taxpayer_age: u32,
        spouse_age: Option<u32>,
    ) -> Decimal {
        let mut seniors = u32::from(taxpayer_age >= self.senior_age);
        if status.is_joint() && spouse_age.is_some_and(|age| age >= self.senior_age) {
            seniors += 1;
        }
        *self.base.get(status) + *self.additional_per_senior.get(status) * Decimal::from(seniors)
    }
}

/// How a state taxes the federal taxable income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StateSchedule {
    NoIncomeTax,
    Flat {
        rate: Decimal,
    },
    Progressive {
        single: BracketSchedule,
        /// Used by joint filers; falls back to `single` when absent.
        joint: Option<BracketSchedule>,
    },
}

/// Every table the calculators need for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearTables {
    pub config: TaxYearConfig,
    pub brackets: PerStatus<BracketSchedule>,
    pub standard_deduction: PerStatus<Decimal>,
    pub amt: AmtParameters,
    pub niit: NiitParameters,
    pub deduction_limits: DeductionLimits,
    pub contribution_limits: ContributionLimits,
    pub credits: CreditParameters,
    pub filing_thresholds: FilingThresholds,
    pub states: BTreeMap<String, StateSchedule>,
}

impl TaxYearTables {
    pub fn tax_year(&self) -> i32 {
        self.config.tax_year
    }

    pub fn brackets_for(
        &self,
        status: FilingStatus,
    ) -> &BracketSchedule {
        self.brackets.get(status)
    }

    /// Looks up a state schedule by its two-letter code, case-insensitively.
    pub fn state(
        &self,
        code: &str,
    ) -> Result<&StateSchedule, InputError> {
        self.states
            .get(&code.trim().to_ascii_uppercase())
            .ok_or_else(|| InputError::UnknownJurisdiction(code.to_string()))
    }
}

/// Tables for every supported year.
#[derive(Debug, Clone, Default)]
pub struct TaxTableRegistry {
    years: BTreeMap<i32, TaxYearTables>,
}

impl TaxTableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in 2024 and 2025 tables.
    ///
    /// # Errors
    ///
    /// Returns [`BracketError`] if a built-in schedule is malformed.
    pub fn builtin() -> Result<Self, BracketError> {
        let mut registry = Self::new();
        registry.insert(y2024::tables()?);
        registry.insert(y2025::tables()?);
        Ok(registry)
    }

    /// Adds or replaces the tables for their tax year.
    pub fn insert(
        &mut self,
        tables: TaxYearTables,
    ) {
        self.years.insert(tables.tax_year(), tables);
    }

    pub fn get(
        &self,
        year: i32,
    ) -> Result<&TaxYearTables, InputError> {
        self.years
            .get(&year)
            .ok_or(InputError::UnsupportedTaxYear(year))
    }

    pub fn get_mut(
        &mut self,
        year: i32,
    ) -> Result<&mut TaxYearTables, InputError> {
        self.years
            .get_mut(&year)
            .ok_or(InputError::UnsupportedTaxYear(year))
    }

    pub fn years(&self) -> Vec<i32> {
        self.years.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn registry() -> TaxTableRegistry {
        TaxTableRegistry::builtin().unwrap()
    }

    #[test]
    fn builtin_registry_has_2024_and_2025() {
        assert_eq!(registry().years(), vec![2024, 2025]);
    }

    #[test]
    fn unknown_year_is_input_error() {
        assert_eq!(
            registry().get(1999).unwrap_err(),
            InputError::UnsupportedTaxYear(1999)
        );
    }

    #[test]
    fn standard_deductions_2024() {
        let registry = registry();
        let tables = registry.get(2024).unwrap();

        assert_eq!(*tables.standard_deduction.get(FilingStatus::Single), dec!(14600));
        assert_eq!(
            *tables.standard_deduction.get(FilingStatus::MarriedFilingJointly),
            dec!(29200)
        );
        assert_eq!(
            *tables.standard_deduction.get(FilingStatus::HeadOfHousehold),
            dec!(21900)
        );
    }

    #[test]
    fn every_status_has_seven_brackets() {
        let registry = registry();
        for year in registry.years() {
            let tables = registry.get(year).unwrap();
            for status in FilingStatus::ALL {
                assert_eq!(tables.brackets_for(status).brackets().len(), 7);
            }
        }
    }

    #[test]
    fn filing_threshold_adds_senior_amounts() {
        let registry = registry();
        let thresholds = &registry.get(2024).unwrap().filing_thresholds;

        assert_eq!(
            thresholds.threshold_for(FilingStatus::Single, 40, None),
            dec!(14600)
        );
        assert_eq!(
            thresholds.threshold_for(FilingStatus::Single, 66, None),
            dec!(16550)
        );
        assert_eq!(
            thresholds.threshold_for(FilingStatus::MarriedFilingJointly, 70, Some(68)),
            dec!(32300)
        );
        assert_eq!(
            thresholds.threshold_for(FilingStatus::MarriedFilingSeparately, 70, Some(68)),
            dec!(5)
        );
    }

    #[test]
    fn eitc_row_caps_at_three_children() {
        let registry = registry();
        let eitc = &registry.get(2024).unwrap().credits.eitc;

        assert_eq!(eitc.row(5).map(|r| r.qualifying_children), Some(3));
        assert_eq!(eitc.row(0).map(|r| r.max_credit), Some(dec!(632)));
    }

    #[test]
    fn state_lookup_is_case_insensitive() {
        let registry = registry();
        let tables = registry.get(2024).unwrap();

        assert_eq!(tables.state("tx"), Ok(&StateSchedule::NoIncomeTax));
        assert_eq!(
            tables.state("ZZ"),
            Err(InputError::UnknownJurisdiction("ZZ".to_string()))
        );
    }
}
