//! Tax computation and compliance engine.
//!
//! Pure calculators turn a [`TaxReturnFacts`] value and one year's
//! [`tables::TaxYearTables`] into a [`CalculationResult`]. Validation,
//! amendment diffs and persistence are layered on top; [`TaxEngine`] ties
//! them together.
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::{FilingStatus, IncomeItem, IncomeSourceType, TaxEngine, TaxReturnFacts};
//!
//! let engine = TaxEngine::builtin().unwrap();
//! let facts = TaxReturnFacts {
//!     income_items: vec![IncomeItem::wages(IncomeSourceType::W2, dec!(76850), dec!(9000))],
//!     ..TaxReturnFacts::new("tp-1", 2024, FilingStatus::Single, 40)
//! };
//!
//! let calc = engine.calculate(&facts).unwrap();
//! assert_eq!(calc.federal.result.taxable_income, dec!(62250.00));
//! assert_eq!(calc.federal.result.tax_liability, dec!(8748.00));
//! ```

pub mod amendment;
pub mod calculations;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;
pub mod tables;
pub mod validation;

pub use engine::{AmendmentOutcome, AmendmentRequest, BracketQuote, ReturnCalculation, TaxEngine};
pub use error::TaxCalcError;
pub use models::*;
