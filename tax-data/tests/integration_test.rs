//! Integration tests for loading tax bracket CSVs into the engine's tables.

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tax_core::tables::TaxTableRegistry;
use tax_core::{FilingStatus, IncomeItem, IncomeSourceType, TaxBracket, TaxEngine, TaxReturnFacts};
use tax_data::{TaxBracketLoader, TaxBracketLoaderError};

const TEST_CSV_2024: &str = include_str!("../test-data/tax_brackets_2024.csv");
const TEST_CSV_2025: &str = include_str!("../test-data/tax_brackets_2025.csv");

fn load(csv: &str) -> TaxTableRegistry {
    let mut registry = TaxTableRegistry::builtin().expect("Failed to build built-in tables");
    let records = TaxBracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");
    TaxBracketLoader::apply(&mut registry, &records).expect("Failed to load brackets");
    registry
}

#[test]
fn test_load_all_2025_brackets() {
    let mut registry = TaxTableRegistry::builtin().unwrap();

    let records = TaxBracketLoader::parse(TEST_CSV_2025.as_bytes()).expect("Failed to parse CSV");
    // 4 schedules, but Y-1 serves both MFJ and QSS
    let installed =
        TaxBracketLoader::apply(&mut registry, &records).expect("Failed to load brackets");

    assert_eq!(records.len(), 28);
    assert_eq!(installed, 5);
}

#[test]
fn test_published_schedules_match_builtin_tables() {
    let builtin = TaxTableRegistry::builtin().unwrap();

    let loaded_2024 = load(TEST_CSV_2024);
    let loaded_2025 = load(TEST_CSV_2025);

    assert_eq!(loaded_2024.get(2024).unwrap(), builtin.get(2024).unwrap());
    assert_eq!(loaded_2025.get(2025).unwrap(), builtin.get(2025).unwrap());
}

#[test]
fn test_load_and_retrieve_single_brackets() {
    let registry = load(TEST_CSV_2025);

    let brackets = registry
        .get(2025)
        .unwrap()
        .brackets_for(FilingStatus::Single)
        .brackets();

    assert_eq!(brackets.len(), 7);
    assert_eq!(
        brackets[0],
        TaxBracket::new(dec!(0), Some(dec!(11925)), dec!(0.10))
    );
    assert_eq!(
        brackets[6],
        TaxBracket::new(dec!(626350), None, dec!(0.37))
    );
}

#[test]
fn test_load_and_retrieve_qss_brackets() {
    let registry = load(TEST_CSV_2025);
    let tables = registry.get(2025).unwrap();

    assert_eq!(
        tables.brackets_for(FilingStatus::QualifyingWidow),
        tables.brackets_for(FilingStatus::MarriedFilingJointly)
    );
}

#[test]
fn test_loaded_brackets_drive_the_engine() {
    let mut engine = TaxEngine::builtin().unwrap();
    let csv = "tax_year,schedule,min_income,max_income,base_tax,rate\n\
               2024,X,0,,0,0.10";
    let records = TaxBracketLoader::parse(csv.as_bytes()).unwrap();
    TaxBracketLoader::apply(engine.registry_mut(), &records).unwrap();
    let facts = TaxReturnFacts {
        income_items: vec![IncomeItem::wages(
            IncomeSourceType::W2,
            dec!(64600),
            dec!(0),
        )],
        ..TaxReturnFacts::new("tp-1", 2024, FilingStatus::Single, 40)
    };

    let calc = engine.calculate(&facts).unwrap();

    assert_eq!(calc.federal.result.taxable_income, dec!(50000.00));
    assert_eq!(calc.federal.result.tax_liability, dec!(5000.00));
}

#[test]
fn test_load_unknown_year_fails() {
    let mut registry = TaxTableRegistry::builtin().unwrap();
    let csv = TEST_CSV_2025.replace("2025,", "2031,");
    let records = TaxBracketLoader::parse(csv.as_bytes()).unwrap();

    let err = TaxBracketLoader::apply(&mut registry, &records).unwrap_err();

    assert!(matches!(err, TaxBracketLoaderError::TaxYearNotFound(2031)));
}
