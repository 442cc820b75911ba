use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::warn;

use super::{Output, Session, read_facts};

#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// JSON file containing the return facts
    #[arg(short, long)]
    pub facts: PathBuf,
}

impl ValidateCommand {
    pub fn exec(
        &self,
        session: &Session,
    ) -> Result<Output> {
        let facts = read_facts(&self.facts)?;
        let report = session
            .engine
            .validate(&facts)
            .with_context(|| format!("cannot validate '{}'", self.facts.display()))?;

        if !report.errors.is_empty() {
            warn!(errors = report.errors.len(), "return has validation errors");
        }
        let mut output = Output::ok(&report)?;
        output.success = report.errors.is_empty();
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;
    use crate::cmd::test_support::{decimal, fixture, session};

    #[test]
    fn clean_return_succeeds() {
        let cmd = ValidateCommand {
            facts: fixture("single_2024.json"),
        };

        let output = cmd.exec(&session()).unwrap();

        assert!(output.success);
        assert_eq!(output.body["errors"], json!([]));
    }

    #[test]
    fn over_contribution_fails() {
        let cmd = ValidateCommand {
            facts: fixture("ira_over_limit_2024.json"),
        };

        let output = cmd.exec(&session()).unwrap();

        assert!(!output.success);
        let issue = output.body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .find(|issue| issue["field"] == json!("ira_contribution"))
            .unwrap();
        assert_eq!(decimal(&issue["correction"]), dec!(7000));
    }
}
