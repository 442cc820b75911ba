use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cmd::{AmendCommand, BracketsCommand, CalculateCommand, ValidateCommand};

/// US personal income tax calculator and return checker.
///
/// Reads return facts as JSON and writes results as JSON to stdout. Logs go
/// to stderr.
#[derive(Debug, Parser)]
#[command(name = "tax-engine", version, about)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level or filter directive; `RUST_LOG` takes precedence.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Federal and state results with validation findings.
    Calculate(CalculateCommand),
    /// Validation findings only; exits non-zero when errors are present.
    Validate(ValidateCommand),
    /// Compare an amended return against the original.
    Amend(AmendCommand),
    /// Price a taxable income against one bracket schedule.
    Brackets(BracketsCommand),
}
