use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Single,
    MarriedFilingJointly,
    MarriedFilingSeparately,
    HeadOfHousehold,
    QualifyingWidow,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 5] = [
        Self::Single,
        Self::MarriedFilingJointly,
        Self::MarriedFilingSeparately,
        Self::HeadOfHousehold,
        Self::QualifyingWidow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "S",
            Self::MarriedFilingJointly => "MFJ",
            Self::MarriedFilingSeparately => "MFS",
            Self::HeadOfHousehold => "HOH",
            Self::QualifyingWidow => "QW",
        }
    }

    /// Accepts the short codes (`S`, `MFJ`, ...) as well as the snake_case
    /// names used in serialized facts.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "S" | "single" => Some(Self::Single),
            "MFJ" | "married_filing_jointly" => Some(Self::MarriedFilingJointly),
            "MFS" | "married_filing_separately" => Some(Self::MarriedFilingSeparately),
            "HOH" | "head_of_household" => Some(Self::HeadOfHousehold),
            "QW" | "QSS" | "qualifying_widow" => Some(Self::QualifyingWidow),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::MarriedFilingJointly => "Married Filing Jointly",
            Self::MarriedFilingSeparately => "Married Filing Separately",
            Self::HeadOfHousehold => "Head of Household",
            Self::QualifyingWidow => "Qualifying Widow(er)",
        }
    }

    /// Statuses that share the joint-return schedules and thresholds.
    pub fn is_joint(&self) -> bool {
        matches!(self, Self::MarriedFilingJointly | Self::QualifyingWidow)
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}
