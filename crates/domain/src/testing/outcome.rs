//! Comparison outcomes and structured diffs.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::path::NodePath;

/// Expected-vs-actual description at the deepest differing path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    /// Deepest path at which the documents differ.
    pub path: NodePath,
    /// Rendered expected value (or expectation) at that path.
    pub expected: String,
    /// Rendered actual value at that path.
    pub actual: String,
    /// Human-readable summary.
    pub message: String,
}

impl Diff {
    /// Creates a diff.
    #[must_use]
    pub fn new(
        path: NodePath,
        expected: impl Into<String>,
        actual: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path,
            expected: expected.into(),
            actual: actual.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}: expected {}, actual {}",
            self.message, self.path, self.expected, self.actual
        )
    }
}

/// Result of one comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    /// The actual body satisfies the mode.
    Match,
    /// The actual body does not satisfy the mode.
    Mismatch(Diff),
}

impl ComparisonOutcome {
    /// Returns true for `Match`.
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }

    /// Returns the diff of a mismatch.
    #[must_use]
    pub const fn diff(&self) -> Option<&Diff> {
        match self {
            Self::Match => None,
            Self::Mismatch(diff) => Some(diff),
        }
    }
}
