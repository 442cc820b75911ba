//! One entry point over the tables, calculators, validation and amendment
//! flow.
//!
//! [`TaxEngine`] owns a [`TaxTableRegistry`] and resolves the right year's
//! tables for every call, so callers only deal with facts and results.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::amendment::{
    Accrual, AccrualConfig, ReturnSnapshot, ReturnStatus, accrue, check_eligibility, diff,
};
use crate::calculations::{
    FederalCalculation, TaxCalculator, calculate_state, compute_bracket_tax, marginal_rate,
};
use crate::error::TaxCalcError;
use crate::models::{
    AmendmentDiff, CalculationResult, FilingStatus, InputError, TaxReturnFacts, ValidationReport,
};
use crate::store::{CalculationStore, StoredCalculation};
use crate::tables::{TaxTableRegistry, TaxYearTables};
use crate::validation;

/// Federal result and its validation report, plus the state result and its
/// report when the facts name a state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnCalculation {
    pub federal: FederalCalculation,
    pub federal_report: ValidationReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<CalculationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_report: Option<ValidationReport>,
}

impl ReturnCalculation {
    pub fn into_stored(
        self,
        facts: &TaxReturnFacts,
    ) -> StoredCalculation {
        StoredCalculation {
            taxpayer_id: facts.taxpayer_id.clone(),
            tax_year: facts.tax_year,
            facts: facts.clone(),
            federal: self.federal.result,
            federal_report: self.federal_report,
            state: self.state,
            state_report: self.state_report,
        }
    }
}

/// Where the original return stands and when the amendment is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmendmentRequest {
    pub original_status: ReturnStatus,
    pub filed_on: NaiveDate,
    pub today: NaiveDate,
    /// Original payment due date; April 15 of the following year if unset.
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmendmentOutcome {
    pub deadline: NaiveDate,
    pub diff: AmendmentDiff,
    pub amended_report: ValidationReport,
    pub accrual: Accrual,
}

/// What-if pricing of a taxable income against one schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketQuote {
    pub tax_year: i32,
    pub filing_status: FilingStatus,
    pub taxable_income: Decimal,
    pub tax: Decimal,
    pub marginal_rate: Decimal,
}

#[derive(Debug, Clone)]
pub struct TaxEngine {
    registry: TaxTableRegistry,
    accrual: AccrualConfig,
}

impl TaxEngine {
    pub fn new(registry: TaxTableRegistry) -> Self {
        Self {
            registry,
            accrual: AccrualConfig::default(),
        }
    }

    /// Engine over the built-in 2024 and 2025 tables.
    ///
    /// # Errors
    ///
    /// Returns [`TaxCalcError::Bracket`] if a built-in schedule is malformed.
    pub fn builtin() -> Result<Self, TaxCalcError> {
        Ok(Self::new(TaxTableRegistry::builtin()?))
    }

    pub fn with_accrual_config(
        mut self,
        accrual: AccrualConfig,
    ) -> Self {
        self.accrual = accrual;
        self
    }

    pub fn registry(&self) -> &TaxTableRegistry {
        &self.registry
    }

    /// Mutable access for loaders that replace a year's schedules.
    pub fn registry_mut(&mut self) -> &mut TaxTableRegistry {
        &mut self.registry
    }

    pub fn tables(
        &self,
        year: i32,
    ) -> Result<&TaxYearTables, InputError> {
        self.registry.get(year)
    }

    /// Federal calculation and validation, plus the state return and its
    /// consistency report when `facts.state` is set.
    ///
    /// # Errors
    ///
    /// Returns [`TaxCalcError::Input`] for malformed facts, an unsupported
    /// year or an unknown state.
    pub fn calculate(
        &self,
        facts: &TaxReturnFacts,
    ) -> Result<ReturnCalculation, TaxCalcError> {
        let tables = self.registry.get(facts.tax_year)?;
        let federal = TaxCalculator::new(tables).calculate(facts)?;
        let federal_report = validation::validate(facts, &federal.result, tables)?;
        let state = facts
            .state
            .as_deref()
            .map(|code| calculate_state(code, facts, &federal.result, tables))
            .transpose()?;
        let state_report = state
            .as_ref()
            .map(|result| validation::validate_state(facts, result, tables))
            .transpose()?;

        debug!(
            taxpayer_id = %facts.taxpayer_id,
            tax_year = facts.tax_year,
            total_tax = %federal.result.total_tax,
            has_state = state.is_some(),
            "return calculated"
        );

        Ok(ReturnCalculation {
            federal,
            federal_report,
            state,
            state_report,
        })
    }

    /// Validation report for the return computed from `facts`.
    ///
    /// # Errors
    ///
    /// Same as [`TaxEngine::calculate`].
    pub fn validate(
        &self,
        facts: &TaxReturnFacts,
    ) -> Result<ValidationReport, TaxCalcError> {
        let tables = self.registry.get(facts.tax_year)?;
        let federal = TaxCalculator::new(tables).calculate(facts)?;
        Ok(validation::validate(facts, &federal.result, tables)?)
    }

    /// Eligibility check, then original-versus-amended diff with interest and
    /// penalty on any additional tax.
    ///
    /// # Errors
    ///
    /// Returns [`TaxCalcError::Eligibility`] before anything is computed if
    /// the original cannot be amended, and [`TaxCalcError::Input`] if the two
    /// returns are for different taxpayers or years or the due date falls
    /// within the tax year. Returns [`TaxCalcError::Accrual`] if the interest
    /// does not fit in a `Decimal`.
    pub fn amend(
        &self,
        original: &TaxReturnFacts,
        amended: &TaxReturnFacts,
        request: &AmendmentRequest,
    ) -> Result<AmendmentOutcome, TaxCalcError> {
        let deadline = check_eligibility(request.original_status, request.filed_on, request.today)?;
        if original.taxpayer_id != amended.taxpayer_id || original.tax_year != amended.tax_year {
            return Err(InputError::MismatchedAmendment {
                original_id: original.taxpayer_id.clone(),
                original_year: original.tax_year,
                amended_id: amended.taxpayer_id.clone(),
                amended_year: amended.tax_year,
            }
            .into());
        }
        let due_date = request
            .due_date
            .unwrap_or_else(|| original_due_date(original.tax_year));
        if due_date.year() <= original.tax_year {
            return Err(InputError::DueDateBeforeYearEnd {
                due_date,
                tax_year: original.tax_year,
            }
            .into());
        }

        let tables = self.registry.get(original.tax_year)?;
        let calculator = TaxCalculator::new(tables);
        let original_result = calculator.calculate(original)?.result;
        let amended_result = calculator.calculate(amended)?.result;
        let amended_report = validation::validate(amended, &amended_result, tables)?;

        let diff = diff(
            ReturnSnapshot::new(original, &original_result),
            ReturnSnapshot::new(amended, &amended_result),
        );
        let accrual = accrue(
            diff.summary.additional_tax_owed,
            due_date,
            request.today,
            &self.accrual,
        )?;

        info!(
            taxpayer_id = %original.taxpayer_id,
            tax_year = original.tax_year,
            net_change = %diff.summary.net_change,
            "amendment prepared"
        );

        Ok(AmendmentOutcome {
            deadline,
            diff,
            amended_report,
            accrual,
        })
    }

    /// Bracket tax and marginal rate for a what-if taxable income.
    ///
    /// # Errors
    ///
    /// Returns [`TaxCalcError::Input`] if `year` has no tables.
    pub fn quote_brackets(
        &self,
        year: i32,
        filing_status: FilingStatus,
        taxable_income: Decimal,
    ) -> Result<BracketQuote, TaxCalcError> {
        let schedule = self.registry.get(year)?.brackets_for(filing_status);
        Ok(BracketQuote {
            tax_year: year,
            filing_status,
            taxable_income,
            tax: compute_bracket_tax(taxable_income, schedule),
            marginal_rate: marginal_rate(taxable_income, schedule),
        })
    }

    /// Calculates and upserts the record for the facts' taxpayer and year.
    ///
    /// # Errors
    ///
    /// Returns the calculation error, or [`TaxCalcError::Store`] if the store
    /// rejects the record.
    pub async fn calculate_and_store(
        &self,
        facts: &TaxReturnFacts,
        store: &dyn CalculationStore,
    ) -> Result<StoredCalculation, TaxCalcError> {
        let record = self.calculate(facts)?.into_stored(facts);
        store.upsert(record.clone()).await?;
        Ok(record)
    }
}

/// April 15 of the year after `tax_year`.
fn original_due_date(tax_year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(tax_year + 1, 4, 15).unwrap_or(NaiveDate::MAX)
}
