use std::fs::File;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tax_cli::cli::{Cli, Command};
use tax_cli::cmd::Session;
use tax_cli::config::Config;
use tax_cli::logging::init_logging;
use tax_core::TaxEngine;
use tax_data::TaxBracketLoader;
use tracing::{error, info};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    init_logging(
        config.log_level(cli.log_level.as_deref()),
        config.log_file.as_deref(),
    )?;

    let session = Session {
        engine: build_engine(&config)?,
        default_tax_year: config.tax_year(),
    };

    let output = match &cli.command {
        Command::Calculate(cmd) => cmd.exec(&session)?,
        Command::Validate(cmd) => cmd.exec(&session)?,
        Command::Amend(cmd) => cmd.exec(&session)?,
        Command::Brackets(cmd) => cmd.exec(&session)?,
    };

    let json = serde_json::to_string_pretty(&output.body).context("cannot format output")?;
    println!("{json}");

    Ok(if output.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn build_engine(config: &Config) -> Result<TaxEngine> {
    let mut engine = TaxEngine::builtin().context("built-in tax tables are invalid")?;
    if let Some(path) = &config.bracket_csv {
        let installed = load_brackets(&mut engine, path)?;
        info!(path = %path.display(), installed, "bracket schedules replaced");
    }
    Ok(engine.with_accrual_config(config.accrual()))
}

fn load_brackets(
    engine: &mut TaxEngine,
    path: &Path,
) -> Result<usize> {
    let file = File::open(path)
        .with_context(|| format!("cannot open bracket file '{}'", path.display()))?;
    let records = TaxBracketLoader::parse(file)
        .with_context(|| format!("cannot parse bracket file '{}'", path.display()))?;
    TaxBracketLoader::apply(engine.registry_mut(), &records)
        .with_context(|| format!("cannot apply bracket file '{}'", path.display()))
}
