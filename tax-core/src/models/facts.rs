//! Input data model: everything the engine knows about a return.
//!
//! A [`TaxReturnFacts`] value is supplied whole by the caller and never
//! mutated by the engine. All aggregations over its lists are plain sums, so
//! the order of items never affects a result.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::FilingStatus;

/// Structural problems with a facts value. These are the only failures the
/// calculators report as errors; statutory problems go to the validation
/// report instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("missing required identifier: {0}")]
    MissingIdentifier(&'static str),

    #[error("no tax tables available for tax year {0}")]
    UnsupportedTaxYear(i32),

    #[error("unknown state jurisdiction '{0}'")]
    UnknownJurisdiction(String),

    #[error("{field} must not be negative, got {value}")]
    NegativeAmount { field: String, value: Decimal },

    #[error("spouse age is required for filing status {0}")]
    MissingSpouseAge(FilingStatus),

    #[error(
        "amended return ({amended_id}, {amended_year}) does not match the original \
         ({original_id}, {original_year})"
    )]
    MismatchedAmendment {
        original_id: String,
        original_year: i32,
        amended_id: String,
        amended_year: i32,
    },

    #[error("payment due date {due_date} falls before the end of tax year {tax_year}")]
    DueDateBeforeYearEnd {
        due_date: NaiveDate,
        tax_year: i32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncomeSourceType {
    #[serde(rename = "W-2")]
    W2,
    #[serde(rename = "1099-NEC")]
    Nec1099,
    #[serde(rename = "1099-INT")]
    Int1099,
    #[serde(rename = "1099-DIV")]
    Div1099,
    #[serde(rename = "1099-R")]
    R1099,
    #[serde(rename = "1099-G")]
    G1099,
    #[serde(rename = "capital_gain")]
    CapitalGain,
    #[serde(rename = "rental")]
    Rental,
    #[serde(rename = "other")]
    Other,
}

impl IncomeSourceType {
    /// Income that counts as compensation for IRA contribution room.
    pub fn is_earned(&self) -> bool {
        matches!(self, Self::W2 | Self::Nec1099)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeItem {
    pub source_type: IncomeSourceType,
    #[serde(default)]
    pub wages: Decimal,
    #[serde(default)]
    pub other_income: Decimal,
    #[serde(default)]
    pub federal_withheld: Decimal,
    #[serde(default)]
    pub state_withheld: Decimal,
}

impl IncomeItem {
    pub fn wages(
        source_type: IncomeSourceType,
        wages: Decimal,
        federal_withheld: Decimal,
    ) -> Self {
        Self {
            source_type,
            wages,
            other_income: Decimal::ZERO,
            federal_withheld,
            state_withheld: Decimal::ZERO,
        }
    }

    pub fn other(
        source_type: IncomeSourceType,
        other_income: Decimal,
    ) -> Self {
        Self {
            source_type,
            wages: Decimal::ZERO,
            other_income,
            federal_withheld: Decimal::ZERO,
            state_withheld: Decimal::ZERO,
        }
    }

    pub fn total(&self) -> Decimal {
        self.wages + self.other_income
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionCategory {
    StateLocalTax,
    PropertyTax,
    MortgageInterest,
    CharitableCash,
    CharitableNonCash,
    MedicalExpenses,
    StudentLoanInterest,
    IraContribution,
    HsaContribution,
    HsaFamilyContribution,
    #[serde(rename = "401k_deferral")]
    Retirement401k,
    SelfEmployedHealthInsurance,
    EducatorExpenses,
    Other,
}

impl DeductionCategory {
    /// Whether an above-the-line item of this category reduces AGI.
    ///
    /// 401(k) deferrals are already excluded from W-2 wages, so they are
    /// carried only for limit checks.
    pub fn is_agi_adjustment(&self) -> bool {
        !matches!(self, Self::Retirement401k)
    }

    pub fn is_salt(&self) -> bool {
        matches!(self, Self::StateLocalTax | Self::PropertyTax)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Owner {
    #[default]
    Taxpayer,
    Spouse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionItem {
    pub category: DeductionCategory,
    pub amount: Decimal,
    pub is_itemized: bool,
    #[serde(default)]
    pub owner: Owner,
}

impl DeductionItem {
    pub fn itemized(
        category: DeductionCategory,
        amount: Decimal,
    ) -> Self {
        Self {
            category,
            amount,
            is_itemized: true,
            owner: Owner::Taxpayer,
        }
    }

    pub fn adjustment(
        category: DeductionCategory,
        amount: Decimal,
    ) -> Self {
        Self {
            category,
            amount,
            is_itemized: false,
            owner: Owner::Taxpayer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditType {
    ChildTaxCredit,
    EarnedIncomeCredit,
    AmericanOpportunityCredit,
    LifetimeLearningCredit,
    ChildAndDependentCare,
    RetirementSavings,
    Other,
}

impl CreditType {
    pub fn is_education(&self) -> bool {
        matches!(
            self,
            Self::AmericanOpportunityCredit | Self::LifetimeLearningCredit
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditClaim {
    pub credit_type: CreditType,
    pub amount: Decimal,
    pub is_refundable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Advertising,
    CarAndTruck,
    Commissions,
    ContractLabor,
    Depreciation,
    Insurance,
    Interest,
    LegalAndProfessional,
    OfficeExpense,
    Rent,
    Repairs,
    Supplies,
    Taxes,
    Travel,
    Meals,
    Utilities,
    Wages,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseLineItem {
    pub category: ExpenseCategory,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfEmploymentFacts {
    pub gross_receipts: Decimal,
    pub returns_allowances: Decimal,
    pub cost_of_goods_sold: Decimal,
    pub other_income: Decimal,
    pub expense_line_items: Vec<ExpenseLineItem>,
    pub home_office_square_feet: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmtPreferenceItems {
    pub state_local_tax_deduction: Decimal,
    pub misc_itemized_deductions: Decimal,
    pub private_activity_bond_interest: Decimal,
    pub exercised_isos: Decimal,
    pub depreciation_adjustment: Decimal,
}

impl AmtPreferenceItems {
    pub fn total(&self) -> Decimal {
        self.state_local_tax_deduction
            + self.misc_itemized_deductions
            + self.private_activity_bond_interest
            + self.exercised_isos
            + self.depreciation_adjustment
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dependent {
    pub age: u32,
    pub is_student: bool,
    pub is_disabled: bool,
}

impl Dependent {
    /// Under 17 at year end.
    pub fn is_ctc_qualifying(&self) -> bool {
        self.age < 17
    }

    /// EITC qualifying-child age test.
    pub fn is_eitc_qualifying(&self) -> bool {
        self.age < 19 || (self.is_student && self.age < 24) || self.is_disabled
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxReturnFacts {
    pub taxpayer_id: String,
    pub tax_year: i32,
    pub filing_status: FilingStatus,
    pub taxpayer_age: u32,
    #[serde(default)]
    pub spouse_age: Option<u32>,
    /// Two-letter jurisdiction code for the state run.
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub income_items: Vec<IncomeItem>,
    #[serde(default)]
    pub deduction_items: Vec<DeductionItem>,
    #[serde(default)]
    pub credit_claims: Vec<CreditClaim>,
    #[serde(default)]
    pub self_employment: Option<SelfEmploymentFacts>,
    #[serde(default)]
    pub amt_preference_items: AmtPreferenceItems,
    #[serde(default)]
    pub investment_income: Decimal,
    #[serde(default)]
    pub dependents: Vec<Dependent>,
}

impl TaxReturnFacts {
    /// Minimal facts for a filer with no income; tests and callers fill in
    /// the rest with struct-update syntax.
    pub fn new(
        taxpayer_id: impl Into<String>,
        tax_year: i32,
        filing_status: FilingStatus,
        taxpayer_age: u32,
    ) -> Self {
        Self {
            taxpayer_id: taxpayer_id.into(),
            tax_year,
            filing_status,
            taxpayer_age,
            spouse_age: None,
            state: None,
            income_items: Vec::new(),
            deduction_items: Vec::new(),
            credit_claims: Vec::new(),
            self_employment: None,
            amt_preference_items: AmtPreferenceItems::default(),
            investment_income: Decimal::ZERO,
            dependents: Vec::new(),
        }
    }

    /// Checks the structural requirements the calculators rely on.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] if the taxpayer id is blank, a married-joint
    /// return lacks a spouse age, or any amount that cannot be negative is.
    pub fn check_structure(&self) -> Result<(), InputError> {
        if self.taxpayer_id.trim().is_empty() {
            return Err(InputError::MissingIdentifier("taxpayer_id"));
        }
        if self.filing_status == FilingStatus::MarriedFilingJointly && self.spouse_age.is_none() {
            return Err(InputError::MissingSpouseAge(self.filing_status));
        }

        for (i, item) in self.income_items.iter().enumerate() {
            non_negative(format!("income_items[{i}].wages"), item.wages)?;
            non_negative(format!("income_items[{i}].federal_withheld"), item.federal_withheld)?;
            non_negative(format!("income_items[{i}].state_withheld"), item.state_withheld)?;
        }
        for (i, item) in self.deduction_items.iter().enumerate() {
            non_negative(format!("deduction_items[{i}].amount"), item.amount)?;
        }
        for (i, claim) in self.credit_claims.iter().enumerate() {
            non_negative(format!("credit_claims[{i}].amount"), claim.amount)?;
        }
        if let Some(se) = &self.self_employment {
            non_negative("self_employment.gross_receipts".to_string(), se.gross_receipts)?;
            non_negative(
                "self_employment.cost_of_goods_sold".to_string(),
                se.cost_of_goods_sold,
            )?;
            for (i, expense) in se.expense_line_items.iter().enumerate() {
                non_negative(
                    format!("self_employment.expense_line_items[{i}].amount"),
                    expense.amount,
                )?;
            }
            if let Some(sq_ft) = se.home_office_square_feet {
                non_negative("self_employment.home_office_square_feet".to_string(), sq_ft)?;
            }
        }
        Ok(())
    }

    pub fn total_wages(&self) -> Decimal {
        self.income_items.iter().map(|i| i.wages).sum()
    }

    pub fn total_other_income(&self) -> Decimal {
        self.income_items.iter().map(|i| i.other_income).sum()
    }

    pub fn federal_withheld(&self) -> Decimal {
        self.income_items.iter().map(|i| i.federal_withheld).sum()
    }

    pub fn state_withheld(&self) -> Decimal {
        self.income_items.iter().map(|i| i.state_withheld).sum()
    }

    /// Wages and nonemployee compensation, used for IRA contribution room.
    pub fn earned_income(&self) -> Decimal {
        self.income_items
            .iter()
            .filter(|i| i.source_type.is_earned())
            .map(IncomeItem::total)
            .sum()
    }

    pub fn itemized_items(&self) -> impl Iterator<Item = &DeductionItem> {
        self.deduction_items.iter().filter(|d| d.is_itemized)
    }

    pub fn above_the_line_items(&self) -> impl Iterator<Item = &DeductionItem> {
        self.deduction_items.iter().filter(|d| !d.is_itemized)
    }

    /// Sum of items in `category` with the given itemized flag.
    pub fn deduction_total(
        &self,
        category: DeductionCategory,
        is_itemized: bool,
    ) -> Decimal {
        self.deduction_items
            .iter()
            .filter(|d| d.category == category && d.is_itemized == is_itemized)
            .map(|d| d.amount)
            .sum()
    }

    pub fn credits_of(
        &self,
        credit_type: CreditType,
    ) -> Decimal {
        self.credit_claims
            .iter()
            .filter(|c| c.credit_type == credit_type)
            .map(|c| c.amount)
            .sum()
    }

    pub fn nonrefundable_credits(&self) -> Decimal {
        self.credit_claims
            .iter()
            .filter(|c| !c.is_refundable)
            .map(|c| c.amount)
            .sum()
    }

    pub fn refundable_credits(&self) -> Decimal {
        self.credit_claims
            .iter()
            .filter(|c| c.is_refundable)
            .map(|c| c.amount)
            .sum()
    }

    pub fn age_of(
        &self,
        owner: Owner,
    ) -> Option<u32> {
        match owner {
            Owner::Taxpayer => Some(self.taxpayer_age),
            Owner::Spouse => self.spouse_age,
        }
    }
}

fn non_negative(
    field: String,
    value: Decimal,
) -> Result<(), InputError> {
    if value < Decimal::ZERO {
        return Err(InputError::NegativeAmount { field, value });
    }
    Ok(())
}
