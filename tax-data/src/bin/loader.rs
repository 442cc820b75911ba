use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use tax_core::FilingStatus;
use tax_core::calculations::{compute_bracket_tax, marginal_rate};
use tax_core::tables::TaxTableRegistry;
use tax_data::TaxBracketLoader;

/// Check a tax bracket CSV against the built-in tables and show the result.
///
/// The CSV file should have the following columns:
/// - tax_year: The tax year (e.g., 2025)
/// - schedule: The IRS schedule code (X, Y-1, Y-2, Z)
/// - min_income: The minimum income for this bracket
/// - max_income: The maximum income (empty for unlimited)
/// - base_tax: The tax on all income below min_income
/// - rate: The marginal tax rate as a decimal (e.g., 0.10)
#[derive(Parser, Debug)]
#[command(name = "tax-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing tax bracket data
    #[arg(short, long)]
    file: PathBuf,

    /// Taxable income to price against every loaded schedule
    #[arg(short, long)]
    income: Option<Decimal>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Loading tax brackets from: {}", args.file.display());

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let records = TaxBracketLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    println!("Parsed {} records from CSV", records.len());

    let mut registry = TaxTableRegistry::builtin().context("Failed to build built-in tables")?;
    let installed = TaxBracketLoader::apply(&mut registry, &records)
        .context("Failed to apply tax brackets")?;

    println!("Replaced {} filing-status schedules.", installed);

    let mut years: Vec<i32> = records.iter().map(|r| r.tax_year).collect();
    years.sort_unstable();
    years.dedup();

    for year in years {
        let tables = registry
            .get(year)
            .with_context(|| format!("Tax year {} disappeared after loading", year))?;
        println!("\n{}", year);
        for status in FilingStatus::ALL {
            let schedule = tables.brackets_for(status);
            print!("  {:<28} {} brackets", status.label(), schedule.brackets().len());
            if let Some(income) = args.income {
                print!(
                    ", tax on {} = {} (marginal {})",
                    income,
                    compute_bracket_tax(income, schedule),
                    marginal_rate(income, schedule)
                );
            }
            println!();
        }
    }

    Ok(())
}
