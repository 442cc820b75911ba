use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use super::{Output, Session, read_facts};

#[derive(Args, Debug)]
pub struct CalculateCommand {
    /// JSON file containing the return facts
    #[arg(short, long)]
    pub facts: PathBuf,
}

impl CalculateCommand {
    pub fn exec(
        &self,
        session: &Session,
    ) -> Result<Output> {
        let facts = read_facts(&self.facts)?;
        let calc = session
            .engine
            .calculate(&facts)
            .with_context(|| format!("cannot calculate '{}'", self.facts.display()))?;

        info!(
            taxpayer_id = %facts.taxpayer_id,
            errors = calc.federal_report.errors.len(),
            "calculation complete"
        );
        Output::ok(&calc)
    }
}
