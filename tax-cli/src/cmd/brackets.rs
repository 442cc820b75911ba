use anyhow::Result;
use clap::Args;
use rust_decimal::Decimal;
use tax_core::FilingStatus;

use super::{Output, Session};

#[derive(Args, Debug)]
pub struct BracketsCommand {
    /// Tax year; defaults to the configured year
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Filing status: S, MFJ, MFS, HOH or QW
    #[arg(short, long, value_parser = parse_filing_status)]
    pub status: FilingStatus,

    /// Taxable income to price
    #[arg(short, long)]
    pub income: Decimal,
}

fn parse_filing_status(s: &str) -> Result<FilingStatus, String> {
    FilingStatus::parse(s).ok_or_else(|| format!("unknown filing status '{s}'"))
}

impl BracketsCommand {
    pub fn exec(
        &self,
        session: &Session,
    ) -> Result<Output> {
        let year = self.year.unwrap_or(session.default_tax_year);
        let quote = session
            .engine
            .quote_brackets(year, self.status, self.income)?;
        Output::ok(&quote)
    }
}
