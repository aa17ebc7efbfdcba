use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::FeatureError;

/// Ranking source for `top`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TopBy {
    /// total occurrences across the corpus
    #[default]
    #[serde(rename = "counts")]
    Counts,
    /// number of documents containing the token
    #[serde(rename = "documentCounts", alias = "document_counts")]
    DocumentCounts,
}

impl FromStr for TopBy {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "counts" => Ok(TopBy::Counts),
            "documentCounts" | "document_counts" => Ok(TopBy::DocumentCounts),
            other => Err(FeatureError::invalid_config(format!(
                "unknown ranking source '{other}', expected 'counts' or 'documentCounts'"
            ))),
        }
    }
}

impl fmt::Display for TopBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopBy::Counts => write!(f, "counts"),
            TopBy::DocumentCounts => write!(f, "documentCounts"),
        }
    }
}

/// What subtraction does when it would take a count below zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtractPolicy {
    /// stop at zero
    #[default]
    Clamp,
    /// fail with `FeatureError::Underflow` and leave the feature untouched
    Strict,
}
