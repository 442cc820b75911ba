use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::{min, round_half_up};

const DAYS_PER_YEAR: Decimal = dec!(365);

/// Rates applied to additional tax paid after the original due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualConfig {
    /// Annual underpayment interest rate, compounded daily.
    pub annual_interest_rate: Decimal,
    /// Late-payment penalty per month or part of a month.
    pub penalty_rate_per_month: Decimal,
    /// Ceiling on the total penalty as a share of the tax.
    pub penalty_cap: Decimal,
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self {
            annual_interest_rate: dec!(0.08),
            penalty_rate_per_month: dec!(0.005),
            penalty_cap: dec!(0.25),
        }
    }
}

impl AccrualConfig {
    pub fn with_interest_rate(
        mut self,
        annual_interest_rate: Decimal,
    ) -> Self {
        self.annual_interest_rate = annual_interest_rate;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccrualError {
    #[error("interest on {tax} from {due_date} to {as_of} exceeds the representable range")]
    Overflow {
        tax: Decimal,
        due_date: NaiveDate,
        as_of: NaiveDate,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accrual {
    pub additional_tax_owed: Decimal,
    pub due_date: NaiveDate,
    pub as_of: NaiveDate,
    pub days_late: i64,
    pub months_late: u32,
    pub interest: Decimal,
    pub penalty: Decimal,
    pub total_due: Decimal,
}

/// Months or partial months from `due_date` to `as_of`; zero when not late.
pub fn months_late(
    due_date: NaiveDate,
    as_of: NaiveDate,
) -> u32 {
    if as_of <= due_date {
        return 0;
    }
    let mut whole = 0u32;
    while due_date
        .checked_add_months(Months::new(whole + 1))
        .is_some_and(|d| d <= as_of)
    {
        whole += 1;
    }
    let partial = due_date
        .checked_add_months(Months::new(whole))
        .is_some_and(|d| d < as_of);
    whole + u32::from(partial)
}

/// `factor` raised to `days` by repeated squaring; `None` on overflow.
fn compound(
    factor: Decimal,
    mut days: u64,
) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    let mut base = factor;
    while days > 0 {
        if days & 1 == 1 {
            result = result.checked_mul(base)?;
        }
        days >>= 1;
        if days > 0 {
            base = base.checked_mul(base)?;
        }
    }
    Some(result)
}

/// Interest and late-payment penalty on `additional_tax_owed` from the
/// original due date through `as_of`.
///
/// # Errors
///
/// Returns [`AccrualError::Overflow`] when the compounded balance does not
/// fit in a `Decimal`.
pub fn accrue(
    additional_tax_owed: Decimal,
    due_date: NaiveDate,
    as_of: NaiveDate,
    config: &AccrualConfig,
) -> Result<Accrual, AccrualError> {
    let days_late = (as_of - due_date).num_days().max(0);
    let months = months_late(due_date, as_of);

    if additional_tax_owed <= Decimal::ZERO {
        return Ok(Accrual {
            additional_tax_owed: Decimal::ZERO,
            due_date,
            as_of,
            days_late,
            months_late: months,
            interest: Decimal::ZERO,
            penalty: Decimal::ZERO,
            total_due: Decimal::ZERO,
        });
    }

    let overflow = || AccrualError::Overflow {
        tax: additional_tax_owed,
        due_date,
        as_of,
    };
    let daily_factor = Decimal::ONE + config.annual_interest_rate / DAYS_PER_YEAR;
    let balance = compound(daily_factor, days_late.unsigned_abs())
        .and_then(|growth| additional_tax_owed.checked_mul(growth))
        .ok_or_else(overflow)?;
    let interest = round_half_up(balance - additional_tax_owed);

    let penalty_rate = min(
        config.penalty_rate_per_month * Decimal::from(months),
        config.penalty_cap,
    );
    let penalty = round_half_up(additional_tax_owed * penalty_rate);

    debug!(
        days_late,
        months_late = months,
        interest = %interest,
        penalty = %penalty,
        "accrued amendment interest and penalty"
    );

    let total_due = additional_tax_owed
        .checked_add(interest)
        .and_then(|sum| sum.checked_add(penalty))
        .ok_or_else(overflow)?;

    Ok(Accrual {
        additional_tax_owed,
        due_date,
        as_of,
        days_late,
        months_late: months,
        interest,
        penalty,
        total_due: round_half_up(total_due),
    })
}
