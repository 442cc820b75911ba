//! Persistence contract for completed calculations.
//!
//! The engine itself never persists anything. Callers hand results to a
//! [`CalculationStore`]; records are keyed by taxpayer and tax year, and a
//! recomputation replaces the previous record for that key.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CalculationResult, TaxReturnFacts, ValidationReport};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no calculation stored for taxpayer '{taxpayer_id}' in {tax_year}")]
    NotFound { taxpayer_id: String, tax_year: i32 },

    #[error("invalid record key: {0}")]
    InvalidKey(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Everything produced for one taxpayer and year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCalculation {
    pub taxpayer_id: String,
    pub tax_year: i32,
    pub facts: TaxReturnFacts,
    pub federal: CalculationResult,
    pub federal_report: ValidationReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<CalculationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_report: Option<ValidationReport>,
}

impl StoredCalculation {
    pub fn key(&self) -> (&str, i32) {
        (&self.taxpayer_id, self.tax_year)
    }
}

#[async_trait]
pub trait CalculationStore: Send + Sync {
    /// Inserts or replaces the record for its key, returning the replaced
    /// record if there was one.
    async fn upsert(
        &self,
        record: StoredCalculation,
    ) -> Result<Option<StoredCalculation>, StoreError>;

    async fn get(
        &self,
        taxpayer_id: &str,
        tax_year: i32,
    ) -> Result<StoredCalculation, StoreError>;

    /// All records for a taxpayer, oldest year first.
    async fn list(
        &self,
        taxpayer_id: &str,
    ) -> Result<Vec<StoredCalculation>, StoreError>;

    async fn delete(
        &self,
        taxpayer_id: &str,
        tax_year: i32,
    ) -> Result<(), StoreError>;
}
