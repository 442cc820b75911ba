//! Subcommand implementations.
//!
//! Each command reads its inputs, runs the engine and returns an [`Output`];
//! `main` decides how to print it and which exit status to use.

mod amend;
mod brackets;
mod calculate;
mod validate;

pub use amend::{AmendCommand, StatusArg};
pub use brackets::BracketsCommand;
pub use calculate::CalculateCommand;
pub use validate::ValidateCommand;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tax_core::{TaxEngine, TaxReturnFacts};

/// Shared state for every command.
pub struct Session {
    pub engine: TaxEngine,
    /// Year used when a command does not name one.
    pub default_tax_year: i32,
}

/// A command's JSON result and whether it counts as success.
#[derive(Debug)]
pub struct Output {
    pub body: serde_json::Value,
    pub success: bool,
}

impl Output {
    fn ok<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self {
            body: serde_json::to_value(value).context("cannot serialize result")?,
            success: true,
        })
    }
}

pub fn read_facts(path: &Path) -> Result<TaxReturnFacts> {
    let file = File::open(path)
        .with_context(|| format!("cannot open facts file '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("cannot parse facts file '{}'", path.display()))
}
