use std::fmt;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A filed return can be amended for three years after filing.
pub const AMENDMENT_WINDOW_MONTHS: u32 = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    Draft,
    InProgress,
    Filed,
    Accepted,
    Rejected,
    Amended,
}

impl ReturnStatus {
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Filed | Self::Accepted)
    }
}

impl fmt::Display for ReturnStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let label = match self {
            Self::Draft => "draft",
            Self::InProgress => "in progress",
            Self::Filed => "filed",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Amended => "amended",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EligibilityError {
    #[error("a {status} return cannot be amended; it must be filed or accepted first")]
    NotFiled { status: ReturnStatus },

    #[error("the amendment window closed on {deadline} (filed {filed_on}, today {today})")]
    WindowClosed {
        filed_on: NaiveDate,
        deadline: NaiveDate,
        today: NaiveDate,
    },
}

/// Last day an amended return may be submitted.
pub fn amendment_deadline(filed_on: NaiveDate) -> NaiveDate {
    filed_on
        .checked_add_months(Months::new(AMENDMENT_WINDOW_MONTHS))
        .unwrap_or(NaiveDate::MAX)
}

/// Returns the amendment deadline when the original return may be amended
/// on `today`.
///
/// # Errors
///
/// Returns [`EligibilityError::NotFiled`] unless the original is filed or
/// accepted, and [`EligibilityError::WindowClosed`] once `today` is past
/// the deadline.
pub fn check_eligibility(
    status: ReturnStatus,
    filed_on: NaiveDate,
    today: NaiveDate,
) -> Result<NaiveDate, EligibilityError> {
    if !status.is_final() {
        return Err(EligibilityError::NotFiled { status });
    }

    let deadline = amendment_deadline(filed_on);
    if today > deadline {
        return Err(EligibilityError::WindowClosed {
            filed_on,
            deadline,
            today,
        });
    }
    Ok(deadline)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn date(
        y: i32,
        m: u32,
        d: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn deadline_is_three_years_after_filing() {
        assert_eq!(amendment_deadline(date(2025, 4, 15)), date(2028, 4, 15));
    }

    #[test]
    fn leap_day_filing_clamps_to_month_end() {
        assert_eq!(amendment_deadline(date(2024, 2, 29)), date(2027, 2, 28));
    }

    #[test]
    fn deadline_day_itself_is_eligible() {
        let deadline =
            check_eligibility(ReturnStatus::Filed, date(2025, 4, 15), date(2028, 4, 15)).unwrap();

        assert_eq!(deadline, date(2028, 4, 15));
    }

    #[test]
    fn day_after_deadline_names_the_deadline() {
        let err = check_eligibility(ReturnStatus::Accepted, date(2025, 4, 15), date(2028, 4, 16))
            .unwrap_err();

        assert_eq!(
            err,
            EligibilityError::WindowClosed {
                filed_on: date(2025, 4, 15),
                deadline: date(2028, 4, 15),
                today: date(2028, 4, 16),
            }
        );
        assert!(err.to_string().contains("2028-04-15"));
    }

    #[test]
    fn only_filed_or_accepted_returns_are_eligible() {
        for status in [
            ReturnStatus::Draft,
            ReturnStatus::InProgress,
            ReturnStatus::Rejected,
            ReturnStatus::Amended,
        ] {
            let err = check_eligibility(status, date(2025, 4, 15), date(2025, 5, 1)).unwrap_err();
            assert_eq!(err, EligibilityError::NotFiled { status });
        }
    }
}
