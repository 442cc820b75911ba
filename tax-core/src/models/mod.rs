mod amendment_diff;
mod calculation_result;
mod facts;
mod filing_status;
mod tax_bracket;
mod tax_year_config;
mod validation_report;

pub use amendment_diff::{AmendmentDiff, DiffLine, DiffSummary, LineEffect};
pub use calculation_result::{CalculationResult, DeductionKind, Jurisdiction, settle};
pub use facts::{
    AmtPreferenceItems, CreditClaim, CreditType, DeductionCategory, DeductionItem, Dependent,
    ExpenseCategory, ExpenseLineItem, IncomeItem, IncomeSourceType, InputError, Owner,
    SelfEmploymentFacts, TaxReturnFacts,
};
pub use filing_status::FilingStatus;
pub use tax_bracket::{BracketError, BracketSchedule, TaxBracket};
pub use tax_year_config::TaxYearConfig;
pub use validation_report::{IssueKind, ValidationIssue, ValidationReport};
