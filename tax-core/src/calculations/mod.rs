//! Pure calculators: bracket tax, self-employment tax, AMT/NIIT, state tax
//! and the federal orchestration that combines them.
//!
//! Every calculator takes its rates and limits from an explicit
//! [`TaxYearTables`](crate::tables::TaxYearTables) value and rounds each
//! derived amount to cents with [`common::round_half_up`].

pub mod amt;
pub mod brackets;
pub mod common;
pub mod federal;
pub mod self_emp;
pub mod state;

pub use amt::{
    AmtResult, AmtRiskAssessment, RiskFactor, RiskLevel, assess_amt_risk, compute_amt, compute_niit,
};
pub use brackets::{
    compute_bracket_tax, compute_standard_deduction, marginal_rate, select_deduction,
};
pub use federal::{FederalCalculation, FederalDetails, TaxCalculator};
pub use self_emp::{
    ExpenseBreakdownLine, ScheduleCResult, SeTaxConfig, SeTaxConfigError, SelfEmploymentCalculator,
    SelfEmploymentTax, net_profit_loss,
};
pub use state::{calculate_state, compute_state_tax};
