use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use tax_core::AmendmentRequest;
use tax_core::amendment::ReturnStatus;

use super::{Output, Session, read_facts};

#[derive(Args, Debug)]
pub struct AmendCommand {
    /// JSON facts of the return as originally filed
    #[arg(long)]
    pub original: PathBuf,

    /// JSON facts of the corrected return
    #[arg(long)]
    pub amended: PathBuf,

    /// Status of the original return
    #[arg(long, value_enum)]
    pub status: StatusArg,

    /// Date the original return was filed (YYYY-MM-DD)
    #[arg(long)]
    pub filed_on: NaiveDate,

    /// Date to compute eligibility and accruals for; defaults to today
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Original payment due date; defaults to April 15 after the tax year
    #[arg(long)]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Draft,
    InProgress,
    Filed,
    Accepted,
    Rejected,
    Amended,
}

impl From<StatusArg> for ReturnStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Draft => ReturnStatus::Draft,
            StatusArg::InProgress => ReturnStatus::InProgress,
            StatusArg::Filed => ReturnStatus::Filed,
            StatusArg::Accepted => ReturnStatus::Accepted,
            StatusArg::Rejected => ReturnStatus::Rejected,
            StatusArg::Amended => ReturnStatus::Amended,
        }
    }
}

impl AmendCommand {
    pub fn exec(
        &self,
        session: &Session,
    ) -> Result<Output> {
        let original = read_facts(&self.original)?;
        let amended = read_facts(&self.amended)?;
        let request = AmendmentRequest {
            original_status: self.status.into(),
            filed_on: self.filed_on,
            today: self.today.unwrap_or_else(|| Local::now().date_naive()),
            due_date: self.due_date,
        };

        let outcome = session
            .engine
            .amend(&original, &amended, &request)
            .context("cannot prepare amendment")?;
        Output::ok(&outcome)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;
    use crate::cmd::test_support::{decimal, fixture, session};

    fn command(
        status: StatusArg,
        today: &str,
    ) -> AmendCommand {
        AmendCommand {
            original: fixture("single_2024.json"),
            amended: fixture("single_2024_amended.json"),
            status,
            filed_on: NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(),
            today: Some(today.parse().unwrap()),
            due_date: None,
        }
    }

    #[test]
    fn emits_diff_and_accrual() {
        let output = command(StatusArg::Filed, "2025-07-15").exec(&session()).unwrap();

        assert_eq!(output.body["deadline"], json!("2028-04-10"));
        assert_eq!(
            decimal(&output.body["diff"]["summary"]["additional_tax_owed"]),
            dec!(1100)
        );
        assert_eq!(output.body["accrual"]["months_late"], json!(3));
        assert_eq!(decimal(&output.body["accrual"]["penalty"]), dec!(16.50));
    }

    #[test]
    fn draft_original_is_refused() {
        let err = command(StatusArg::Draft, "2025-07-15")
            .exec(&session())
            .unwrap_err();

        assert!(format!("{err:#}").contains("filed or accepted"));
    }

    #[test]
    fn late_amendment_names_the_deadline() {
        let err = command(StatusArg::Accepted, "2028-04-11")
            .exec(&session())
            .unwrap_err();

        assert!(format!("{err:#}").contains("2028-04-10"));
    }

    #[test]
    fn due_date_before_year_end_is_refused() {
        let cmd = AmendCommand {
            due_date: Some(NaiveDate::from_ymd_opt(1, 4, 15).unwrap()),
            ..command(StatusArg::Filed, "2025-07-15")
        };

        let err = cmd.exec(&session()).unwrap_err();

        assert!(format!("{err:#}").contains("before the end of tax year 2024"));
    }
}
