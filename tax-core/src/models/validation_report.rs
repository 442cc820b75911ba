use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What kind of problem a finding describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A statutory cap or phase-out was exceeded.
    LimitViolation,
    /// Reported totals disagree with totals recomputed from components.
    MathMismatch,
    /// The taxpayer does not qualify for a claimed benefit.
    Eligibility,
    FilingRequirement,
    Optimization,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
    pub kind: IssueKind,
    /// The value the field should take, when one can be derived. The caller
    /// decides whether to apply it.
    pub correction: Option<Decimal>,
}

impl ValidationIssue {
    pub fn new(
        kind: IssueKind,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind,
            correction: None,
        }
    }

    pub fn with_correction(
        mut self,
        correction: Decimal,
    ) -> Self {
        self.correction = Some(correction);
        self
    }
}

/// Findings of one validation call, split by severity.
///
/// `errors` block e-filing and amendment, `warnings` carry corrections that
/// must be surfaced, `suggestions` are advisory only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub suggestions: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Alias of `!is_valid()` named for the downstream decision it drives.
    pub fn blocks_filing(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty() && self.suggestions.is_empty()
    }

    /// `(field, value)` pairs for every error and warning that carries a
    /// correction.
    pub fn corrections(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .filter_map(|issue| issue.correction.map(|c| (issue.field.as_str(), c)))
    }

    pub fn find(
        &self,
        field: &str,
    ) -> Option<&ValidationIssue> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .chain(self.suggestions.iter())
            .find(|issue| issue.field == field)
    }
}
