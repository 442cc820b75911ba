use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: Decimal,
    /// `None` marks the open-ended top bracket.
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        min_income: Decimal,
        max_income: Option<Decimal>,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            min_income,
            max_income,
            tax_rate,
        }
    }

    /// Width of the bracket, or `None` for the unbounded top bracket.
    pub fn width(&self) -> Option<Decimal> {
        self.max_income.map(|max| max - self.min_income)
    }
}

/// Reasons a list of brackets cannot be used as a schedule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketError {
    #[error("bracket schedule is empty")]
    Empty,

    #[error("first bracket must start at 0, starts at {0}")]
    NonZeroStart(Decimal),

    #[error("bracket {index} starts at {found}, expected {expected}")]
    NotContiguous {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    #[error("bracket {index} has max {max} not above min {min}")]
    NonAscending {
        index: usize,
        min: Decimal,
        max: Decimal,
    },

    #[error("only the last bracket may be unbounded (bracket {0} is)")]
    UnboundedBeforeEnd(usize),

    #[error("last bracket must be unbounded")]
    BoundedTop,

    #[error("bracket {index} has rate {rate} outside [0, 1]")]
    InvalidRate { index: usize, rate: Decimal },
}

/// An ordered, contiguous set of brackets whose last bracket is unbounded.
///
/// The invariants are checked once in [`BracketSchedule::new`] so the bracket
/// walk itself can never fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct BracketSchedule {
    brackets: Vec<TaxBracket>,
}

impl BracketSchedule {
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, BracketError> {
        let first = brackets.first().ok_or(BracketError::Empty)?;
        if first.min_income != Decimal::ZERO {
            return Err(BracketError::NonZeroStart(first.min_income));
        }

        let last_index = brackets.len() - 1;
        let mut expected_min = Decimal::ZERO;
        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.tax_rate < Decimal::ZERO || bracket.tax_rate > Decimal::ONE {
                return Err(BracketError::InvalidRate {
                    index,
                    rate: bracket.tax_rate,
                });
            }
            if bracket.min_income != expected_min {
                return Err(BracketError::NotContiguous {
                    index,
                    expected: expected_min,
                    found: bracket.min_income,
                });
            }
            match bracket.max_income {
                Some(_) if index == last_index => return Err(BracketError::BoundedTop),
                Some(max) => {
                    if max <= bracket.min_income {
                        return Err(BracketError::NonAscending {
                            index,
                            min: bracket.min_income,
                            max,
                        });
                    }
                    expected_min = max;
                }
                None if index != last_index => {
                    return Err(BracketError::UnboundedBeforeEnd(index));
                }
                None => {}
            }
        }

        Ok(Self { brackets })
    }

    /// Builds a schedule from `(upper bound, rate)` pairs; the final rate
    /// applies to all income above the last bound.
    pub fn from_thresholds(
        thresholds: &[(Decimal, Decimal)],
        top_rate: Decimal,
    ) -> Result<Self, BracketError> {
        let mut brackets = Vec::with_capacity(thresholds.len() + 1);
        let mut min = Decimal::ZERO;
        for &(max, rate) in thresholds {
            brackets.push(TaxBracket::new(min, Some(max), rate));
            min = max;
        }
        brackets.push(TaxBracket::new(min, None, top_rate));
        Self::new(brackets)
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }
}

impl TryFrom<Vec<TaxBracket>> for BracketSchedule {
    type Error = BracketError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<BracketSchedule> for Vec<TaxBracket> {
    fn from(schedule: BracketSchedule) -> Self {
        schedule.brackets
    }
}
