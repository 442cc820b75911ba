use thiserror::Error;

use crate::amendment::{AccrualError, EligibilityError};
use crate::calculations::SeTaxConfigError;
use crate::models::{BracketError, InputError};
use crate::store::StoreError;

/// Any failure the engine facade can report.
#[derive(Debug, Error)]
pub enum TaxCalcError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("invalid self-employment tax configuration: {0}")]
    SeConfig(#[from] SeTaxConfigError),

    #[error("invalid bracket schedule: {0}")]
    Bracket(#[from] BracketError),

    #[error(transparent)]
    Eligibility(#[from] EligibilityError),

    #[error(transparent)]
    Accrual(#[from] AccrualError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
