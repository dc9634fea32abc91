//! Aggregate deployment status

use std::fmt;

use serde::{Deserialize, Serialize};

/// Overall result of applying a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateStatus {
    /// Every node applied or was already current
    Success,
    /// Some nodes applied, some did not
    PartialFailure,
    /// Nothing was applied
    Failure,
}

impl AggregateStatus {
    /// Derive the status from per-node counts
    pub fn from_counts(succeeded: usize, not_succeeded: usize) -> Self {
        match (succeeded, not_succeeded) {
            (_, 0) => Self::Success,
            (0, _) => Self::Failure,
            _ => Self::PartialFailure,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::PartialFailure => "partial_failure",
            Self::Failure => "failure",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for AggregateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
