use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{max, round_half_up};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Jurisdiction {
    Federal,
    State(String),
}

impl fmt::Display for Jurisdiction {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Federal => f.write_str("federal"),
            Self::State(code) => write!(f, "state:{code}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionKind {
    Standard,
    Itemized,
}

/// Output of one federal or state run. Every money field is already
/// rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub jurisdiction: Jurisdiction,
    pub tax_year: i32,
    pub gross_income: Decimal,
    pub adjustments: Decimal,
    pub agi: Decimal,
    pub standard_deduction: Decimal,
    pub itemized_deduction: Decimal,
    pub deduction_used: DeductionKind,
    pub deduction_amount: Decimal,
    pub taxable_income: Decimal,
    pub total_credits: Decimal,
    pub tax_liability: Decimal,
    pub self_employment_tax: Decimal,
    pub amt: Decimal,
    pub niit: Decimal,
    /// Net tax after every credit. Negative only when refundable credits
    /// exceed all other liabilities.
    pub total_tax: Decimal,
    pub total_withheld: Decimal,
    pub refund: Decimal,
    pub amount_owed: Decimal,
    /// Total tax as a percentage of AGI, two decimal places.
    pub effective_rate: Decimal,
}

impl CalculationResult {
    /// Fills `refund`, `amount_owed` and `effective_rate` from the totals so
    /// the settlement identities always hold.
    pub fn settle(mut self) -> Self {
        let (refund, owed) = settle(self.total_withheld, self.total_tax);
        self.refund = refund;
        self.amount_owed = owed;
        self.effective_rate = effective_rate(self.total_tax, self.agi);
        self
    }

    /// `refund - amount_owed`, positive when money comes back.
    pub fn net_settlement(&self) -> Decimal {
        self.refund - self.amount_owed
    }
}

/// Returns `(refund, owed)` for the given payments and tax; at most one is
/// non-zero.
pub fn settle(
    payments: Decimal,
    total_tax: Decimal,
) -> (Decimal, Decimal) {
    let refund = max(round_half_up(payments - total_tax), Decimal::ZERO);
    let owed = max(round_half_up(total_tax - payments), Decimal::ZERO);
    (refund, owed)
}

fn effective_rate(
    total_tax: Decimal,
    agi: Decimal,
) -> Decimal {
    if agi <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_half_up(total_tax / agi * Decimal::ONE_HUNDRED)
}

impl fmt::Display for CalculationResult {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "{} {}", self.jurisdiction, self.tax_year)?;
        writeln!(f, "  gross income:   {:>12}", self.gross_income)?;
        writeln!(f, "  AGI:            {:>12}", self.agi)?;
        writeln!(f, "  taxable income: {:>12}", self.taxable_income)?;
        writeln!(f, "  total tax:      {:>12}", self.total_tax)?;
        writeln!(f, "  withheld:       {:>12}", self.total_withheld)?;
        writeln!(f, "  refund:         {:>12}", self.refund)?;
        write!(f, "  amount owed:    {:>12}", self.amount_owed)
    }
}
