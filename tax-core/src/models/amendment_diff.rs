use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a line's change feeds the refund/owed settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineEffect {
    /// Shown on the 1040-X but already folded into a later line.
    Informational,
    /// An increase moves money toward the taxpayer.
    Payment,
    /// An increase moves money toward the government.
    Liability,
}

impl LineEffect {
    pub fn sign(&self) -> Decimal {
        match self {
            Self::Informational => Decimal::ZERO,
            Self::Payment => Decimal::ONE,
            Self::Liability => Decimal::NEGATIVE_ONE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub line_label: String,
    pub original_amount: Decimal,
    pub amended_amount: Decimal,
    pub change: Decimal,
    pub has_changed: bool,
    pub effect: LineEffect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub original_refund: Decimal,
    pub original_owed: Decimal,
    pub amended_refund: Decimal,
    pub amended_owed: Decimal,
    pub additional_refund: Decimal,
    pub additional_tax_owed: Decimal,
    /// Positive: the taxpayer is better off after amending.
    pub net_change: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmendmentDiff {
    pub lines: Vec<DiffLine>,
    pub summary: DiffSummary,
}

impl AmendmentDiff {
    pub fn changed_lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.lines.iter().filter(|l| l.has_changed)
    }

    pub fn line(
        &self,
        label: &str,
    ) -> Option<&DiffLine> {
        self.lines.iter().find(|l| l.line_label == label)
    }
}
