use std::collections::BTreeMap;
use std::io::Read;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use tax_core::calculations::common::round_half_up;
use tax_core::tables::TaxTableRegistry;
use tax_core::{BracketError, BracketSchedule, FilingStatus, TaxBracket};
use thiserror::Error;
use tracing::{debug, info};

/// Published base taxes are rounded to the cent.
const BASE_TAX_TOLERANCE: Decimal = dec!(0.01);

/// Errors that can occur when loading tax bracket data.
#[derive(Debug, Error)]
pub enum TaxBracketLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Tax year {0} has no tables to update")]
    TaxYearNotFound(i32),

    #[error("Schedule {schedule} for {tax_year} is not a valid bracket schedule: {source}")]
    InvalidBrackets {
        tax_year: i32,
        schedule: String,
        #[source]
        source: BracketError,
    },

    #[error(
        "Schedule {schedule} for {tax_year}: base tax at {min_income} is {found}, \
         brackets below it add up to {expected}"
    )]
    BaseTaxMismatch {
        tax_year: i32,
        schedule: String,
        min_income: Decimal,
        expected: Decimal,
        found: Decimal,
    },
}

impl From<csv::Error> for TaxBracketLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxBracketLoaderError::CsvParse(err.to_string())
    }
}

/// Maps IRS schedule codes to filing statuses.
///
/// - Schedule X → Single
/// - Schedule Y-1 → Married Filing Jointly and Qualifying Surviving Spouse
/// - Schedule Y-2 → Married Filing Separately
/// - Schedule Z → Head of Household
fn schedule_to_filing_statuses(
    schedule: &str
) -> Result<&'static [FilingStatus], TaxBracketLoaderError> {
    match schedule {
        "X" => Ok(&[FilingStatus::Single]),
        "Y-1" => Ok(&[
            FilingStatus::MarriedFilingJointly,
            FilingStatus::QualifyingWidow,
        ]),
        "Y-2" => Ok(&[FilingStatus::MarriedFilingSeparately]),
        "Z" => Ok(&[FilingStatus::HeadOfHousehold]),
        _ => Err(TaxBracketLoaderError::InvalidSchedule(schedule.to_string())),
    }
}

/// A single record from the tax brackets CSV file.
///
/// The CSV format uses IRS schedule designations:
/// - `tax_year`: The tax year (e.g., 2025)
/// - `schedule`: The IRS schedule code (X, Y-1, Y-2, Z)
/// - `min_income`: The minimum income for this bracket
/// - `max_income`: The maximum income for this bracket (empty for unlimited)
/// - `base_tax`: The tax on all income below `min_income`
/// - `rate`: The marginal tax rate as a decimal (e.g., 0.10 for 10%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxBracketRecord {
    pub tax_year: i32,
    pub schedule: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub base_tax: Decimal,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for tax bracket data from CSV files.
///
/// The CSV uses IRS schedule codes (X, Y-1, Y-2, Z) which are mapped to the
/// filing statuses whose schedules they replace in a [`TaxTableRegistry`].
pub struct TaxBracketLoader;

impl TaxBracketLoader {
    /// Parse tax bracket records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxBracketRecord>, TaxBracketLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: TaxBracketRecord = result?;
            records.push(record);
        }

        debug!(records = records.len(), "parsed tax bracket CSV");
        Ok(records)
    }

    /// Replace bracket schedules in `registry` with the ones in `records`.
    ///
    /// Records are grouped by (tax_year, schedule) and ordered by
    /// `min_income`. Every group is checked before anything is installed, so
    /// a bad file leaves the registry untouched. Returns the number of
    /// filing-status schedules replaced; Y-1 counts twice because it serves
    /// both joint statuses.
    pub fn apply(
        registry: &mut TaxTableRegistry,
        records: &[TaxBracketRecord],
    ) -> Result<usize, TaxBracketLoaderError> {
        let mut groups: BTreeMap<(i32, &str), Vec<&TaxBracketRecord>> = BTreeMap::new();
        for record in records {
            groups
                .entry((record.tax_year, record.schedule.as_str()))
                .or_default()
                .push(record);
        }

        let mut staged = Vec::new();
        for ((tax_year, schedule), mut group) in groups {
            let statuses = schedule_to_filing_statuses(schedule)?;
            if registry.get(tax_year).is_err() {
                return Err(TaxBracketLoaderError::TaxYearNotFound(tax_year));
            }
            group.sort_by(|a, b| a.min_income.cmp(&b.min_income));
            verify_base_tax(tax_year, schedule, &group)?;

            let brackets = group
                .iter()
                .map(|r| TaxBracket::new(r.min_income, r.max_income, r.rate))
                .collect();
            let bracket_schedule = BracketSchedule::new(brackets).map_err(|source| {
                TaxBracketLoaderError::InvalidBrackets {
                    tax_year,
                    schedule: schedule.to_string(),
                    source,
                }
            })?;
            staged.push((tax_year, statuses, bracket_schedule));
        }

        let mut installed = 0;
        for (tax_year, statuses, schedule) in staged {
            let tables = registry
                .get_mut(tax_year)
                .map_err(|_| TaxBracketLoaderError::TaxYearNotFound(tax_year))?;
            for &status in statuses {
                *tables.brackets.get_mut(status) = schedule.clone();
                installed += 1;
            }
        }

        info!(installed, "tax bracket schedules replaced");
        Ok(installed)
    }
}

/// Each row's base tax must equal the tax on the brackets below it.
fn verify_base_tax(
    tax_year: i32,
    schedule: &str,
    group: &[&TaxBracketRecord],
) -> Result<(), TaxBracketLoaderError> {
    let mut cumulative = Decimal::ZERO;
    for record in group {
        let expected = round_half_up(cumulative);
        if (record.base_tax - expected).abs() > BASE_TAX_TOLERANCE {
            return Err(TaxBracketLoaderError::BaseTaxMismatch {
                tax_year,
                schedule: schedule.to_string(),
                min_income: record.min_income,
                expected,
                found: record.base_tax,
            });
        }
        if let Some(max) = record.max_income {
            cumulative += (max - record.min_income) * record.rate;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const TEST_CSV: &str = r#"tax_year,schedule,min_income,max_income,base_tax,rate
2025,X,0,11925,0,0.10
2025,X,11925,48475,1192.50,0.12
2025,X,48475,103350,5578.50,0.22
2025,X,103350,197300,17651.00,0.24
2025,X,197300,250525,40199.00,0.32
2025,X,250525,626350,57231.00,0.35
2025,X,626350,,188769.75,0.37
2025,Y-1,0,23850,0,0.10
2025,Y-1,23850,96950,2385.00,0.12
2025,Y-1,96950,206700,11157.00,0.22
2025,Y-1,206700,394600,35302.00,0.24
2025,Y-1,394600,501050,80398.00,0.32
2025,Y-1,501050,751600,114462.00,0.35
2025,Y-1,751600,,202154.50,0.37
2025,Y-2,0,11925,0,0.10
2025,Y-2,11925,48475,1192.50,0.12
2025,Y-2,48475,103350,5578.50,0.22
2025,Y-2,103350,197300,17651.00,0.24
2025,Y-2,197300,250525,40199.00,0.32
2025,Y-2,250525,375800,57231.00,0.35
2025,Y-2,375800,,101077.25,0.37
2025,Z,0,17000,0,0.10
2025,Z,17000,64850,1700.00,0.12
2025,Z,64850,103350,7442.00,0.22
2025,Z,103350,197300,15912.00,0.24
2025,Z,197300,250500,38460.00,0.32
2025,Z,250500,626350,55484.00,0.35
2025,Z,626350,,187031.50,0.37
"#;

    fn registry() -> TaxTableRegistry {
        TaxTableRegistry::builtin().unwrap()
    }

    // =========================================================================
    // parse tests
    // =========================================================================

    #[test]
    fn test_parse_csv_single_bracket() {
        let csv = "tax_year,schedule,min_income,max_income,base_tax,rate\n2025,X,0,11925,0,0.10";

        let records = TaxBracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            TaxBracketRecord {
                tax_year: 2025,
                schedule: "X".to_string(),
                min_income: dec!(0),
                max_income: Some(dec!(11925)),
                base_tax: dec!(0),
                rate: dec!(0.10),
            }
        );
    }

    #[test]
    fn test_parse_csv_unlimited_max_income() {
        let csv =
            "tax_year,schedule,min_income,max_income,base_tax,rate\n2025,X,626350,,188769.75,0.37";

        let records = TaxBracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].max_income, None);
        assert_eq!(records[0].base_tax, dec!(188769.75));
    }

    #[test]
    fn test_parse_csv_all_schedules() {
        let records = TaxBracketLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 28);
        for schedule in ["X", "Y-1", "Y-2", "Z"] {
            let count = records.iter().filter(|r| r.schedule == schedule).count();
            assert_eq!(count, 7, "Expected 7 brackets for schedule {}", schedule);
        }
    }

    #[test]
    fn test_parse_invalid_csv_missing_column() {
        let csv = "tax_year,schedule,min_income\n2025,X,0";

        let err =
            TaxBracketLoader::parse(csv.as_bytes()).expect_err("Should fail for missing column");

        let TaxBracketLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("missing field"),
            "Expected 'missing field' in error, got: {}",
            msg
        );
    }

    #[test]
    fn test_parse_invalid_csv_bad_decimal() {
        let csv = "tax_year,schedule,min_income,max_income,base_tax,rate\n2025,X,abc,11925,0,0.10";

        let err =
            TaxBracketLoader::parse(csv.as_bytes()).expect_err("Should fail for invalid decimal");

        assert!(matches!(err, TaxBracketLoaderError::CsvParse(_)));
    }

    // =========================================================================
    // schedule mapping tests
    // =========================================================================

    #[test]
    fn test_schedule_mapping() {
        assert_eq!(
            schedule_to_filing_statuses("X").unwrap(),
            &[FilingStatus::Single]
        );
        assert_eq!(
            schedule_to_filing_statuses("Y-1").unwrap(),
            &[
                FilingStatus::MarriedFilingJointly,
                FilingStatus::QualifyingWidow
            ]
        );
        assert_eq!(
            schedule_to_filing_statuses("Y-2").unwrap(),
            &[FilingStatus::MarriedFilingSeparately]
        );
        assert_eq!(
            schedule_to_filing_statuses("Z").unwrap(),
            &[FilingStatus::HeadOfHousehold]
        );
        assert!(matches!(
            schedule_to_filing_statuses("Q"),
            Err(TaxBracketLoaderError::InvalidSchedule(_))
        ));
    }

    // =========================================================================
    // apply tests
    // =========================================================================

    #[test]
    fn test_apply_installs_every_status() {
        let mut registry = registry();
        let records = TaxBracketLoader::parse(TEST_CSV.as_bytes()).unwrap();

        let installed = TaxBracketLoader::apply(&mut registry, &records).unwrap();

        assert_eq!(installed, 5);
    }

    #[test]
    fn test_apply_replaces_schedule() {
        let mut registry = registry();
        let csv = "tax_year,schedule,min_income,max_income,base_tax,rate\n\
                   2025,X,0,10000,0,0.10\n\
                   2025,X,10000,,1000,0.20";
        let records = TaxBracketLoader::parse(csv.as_bytes()).unwrap();

        TaxBracketLoader::apply(&mut registry, &records).unwrap();

        let schedule = registry.get(2025).unwrap().brackets_for(FilingStatus::Single);
        assert_eq!(
            schedule.brackets(),
            &[
                TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(0.10)),
                TaxBracket::new(dec!(10000), None, dec!(0.20)),
            ]
        );
    }

    #[test]
    fn test_apply_rejects_base_tax_mismatch() {
        let mut registry = registry();
        let csv = "tax_year,schedule,min_income,max_income,base_tax,rate\n\
                   2025,X,0,10000,0,0.10\n\
                   2025,X,10000,,1200,0.20";
        let records = TaxBracketLoader::parse(csv.as_bytes()).unwrap();

        let err = TaxBracketLoader::apply(&mut registry, &records).unwrap_err();

        let TaxBracketLoaderError::BaseTaxMismatch {
            expected, found, ..
        } = err
        else {
            panic!("Expected BaseTaxMismatch, got: {:?}", err);
        };
        assert_eq!(expected, dec!(1000.00));
        assert_eq!(found, dec!(1200));
    }

    #[test]
    fn test_apply_rejects_gap_between_brackets() {
        let mut registry = registry();
        let csv = "tax_year,schedule,min_income,max_income,base_tax,rate\n\
                   2025,Z,0,10000,0,0.10\n\
                   2025,Z,12000,,1000,0.20";
        let records = TaxBracketLoader::parse(csv.as_bytes()).unwrap();

        let err = TaxBracketLoader::apply(&mut registry, &records).unwrap_err();

        assert!(matches!(
            err,
            TaxBracketLoaderError::InvalidBrackets {
                source: BracketError::NotContiguous { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_apply_unknown_year() {
        let mut registry = registry();
        let csv = "tax_year,schedule,min_income,max_income,base_tax,rate\n1999,X,0,,0,0.10";
        let records = TaxBracketLoader::parse(csv.as_bytes()).unwrap();

        let err = TaxBracketLoader::apply(&mut registry, &records).unwrap_err();

        assert!(matches!(err, TaxBracketLoaderError::TaxYearNotFound(1999)));
    }

    #[test]
    fn test_failed_apply_leaves_registry_untouched() {
        let mut registry = registry();
        let before = registry.get(2025).unwrap().clone();
        let csv = "tax_year,schedule,min_income,max_income,base_tax,rate\n\
                   2025,X,0,,0,0.15\n\
                   2025,Q,0,,0,0.10";
        let records = TaxBracketLoader::parse(csv.as_bytes()).unwrap();

        assert!(TaxBracketLoader::apply(&mut registry, &records).is_err());

        assert_eq!(registry.get(2025).unwrap(), &before);
    }
}
