//! IRS bracket schedules from CSV.

mod loader;

pub use loader::{TaxBracketLoader, TaxBracketLoaderError, TaxBracketRecord};
