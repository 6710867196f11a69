//! Comparison modes and the per-assertion comparison request.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::path::NodePath;
use crate::fixture::Expectation;

/// The strategy used to decide whether an actual body matches.
///
/// Exactly one mode applies per comparison; callers combine checks by
/// issuing several requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ComparisonMode {
    /// Whole document structural equality.
    FullEquality,
    /// Structural equality of the subtree at `path`.
    NodeEquality {
        /// Node to compare.
        path: NodePath,
    },
    /// Array whose length is at least `min`.
    IsArrayWithMinSize {
        /// Minimum length (inclusive).
        min: usize,
    },
    /// Array whose length is exactly `size`.
    IsArrayExact {
        /// Required length.
        size: usize,
    },
    /// Structural equality of one array element against the expected fragment.
    ArrayElementEquality {
        /// Zero-based element index.
        index: usize,
    },
    /// Array or object with no elements or keys.
    IsEmpty,
    /// The node at `path` must not exist.
    NodeAbsent {
        /// Node that must be absent.
        path: NodePath,
    },
}

impl ComparisonMode {
    /// Returns true if this mode compares against an expected value.
    #[must_use]
    pub const fn needs_expectation(&self) -> bool {
        matches!(
            self,
            Self::FullEquality | Self::NodeEquality { .. } | Self::ArrayElementEquality { .. }
        )
    }
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullEquality => f.write_str("FullEquality"),
            Self::NodeEquality { path } => write!(f, "NodeEquality({path})"),
            Self::IsArrayWithMinSize { min } => write!(f, "IsArrayWithMinSize({min})"),
            Self::IsArrayExact { size } => write!(f, "IsArrayExact({size})"),
            Self::ArrayElementEquality { index } => write!(f, "ArrayElementEquality({index})"),
            Self::IsEmpty => f.write_str("IsEmpty"),
            Self::NodeAbsent { path } => write!(f, "NodeAbsent({path})"),
        }
    }
}

/// A configured body check: mode plus optional expectation and scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    /// Comparison strategy.
    pub mode: ComparisonMode,
    /// Expected value for modes that compare against one.
    pub expected: Option<Expectation>,
    /// Subtree of the actual body the mode applies to.
    pub scope: Option<NodePath>,
}

impl Check {
    /// Creates a check without expectation or scope.
    #[must_use]
    pub const fn new(mode: ComparisonMode) -> Self {
        Self {
            mode,
            expected: None,
            scope: None,
        }
    }

    /// Sets the expected value.
    #[must_use]
    pub fn expecting(mut self, expected: Expectation) -> Self {
        self.expected = Some(expected);
        self
    }

    /// Narrows the actual body to `scope` before applying the mode.
    #[must_use]
    pub fn scoped(mut self, scope: NodePath) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Pairs this check with an actual body.
    #[must_use]
    pub fn request(&self, actual: impl Into<String>) -> ComparisonRequest {
        ComparisonRequest {
            actual: actual.into(),
            expected: self.expected.clone(),
            mode: self.mode.clone(),
            scope: self.scope.clone(),
        }
    }
}

/// One comparison to perform: created per assertion and discarded afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRequest {
    /// Actual response body text.
    pub actual: String,
    /// Expected fixture or literal.
    pub expected: Option<Expectation>,
    /// Comparison strategy.
    pub mode: ComparisonMode,
    /// Optional subtree of the actual body to compare.
    pub scope: Option<NodePath>,
}

impl ComparisonRequest {
    /// Creates a request with no expectation or scope.
    #[must_use]
    pub fn new(actual: impl Into<String>, mode: ComparisonMode) -> Self {
        Self {
            actual: actual.into(),
            expected: None,
            mode,
            scope: None,
        }
    }

    /// Sets the expected value.
    #[must_use]
    pub fn expecting(mut self, expected: Expectation) -> Self {
        self.expected = Some(expected);
        self
    }

    /// Narrows the actual body to `scope` before applying the mode.
    #[must_use]
    pub fn scoped(mut self, scope: NodePath) -> Self {
        self.scope = Some(scope);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_display() {
        let path = NodePath::parse("[0].city").unwrap();
        assert_eq!(ComparisonMode::FullEquality.to_string(), "FullEquality");
        assert_eq!(
            ComparisonMode::NodeAbsent { path }.to_string(),
            "NodeAbsent([0].city)"
        );
        assert_eq!(
            ComparisonMode::IsArrayWithMinSize { min: 1000 }.to_string(),
            "IsArrayWithMinSize(1000)"
        );
    }

    #[test]
    fn test_needs_expectation() {
        assert!(ComparisonMode::FullEquality.needs_expectation());
        assert!(ComparisonMode::ArrayElementEquality { index: 0 }.needs_expectation());
        assert!(!ComparisonMode::IsEmpty.needs_expectation());
        assert!(!ComparisonMode::IsArrayExact { size: 6 }.needs_expectation());
    }

    #[test]
    fn test_check_to_request() {
        let check = Check::new(ComparisonMode::FullEquality)
            .expecting(Expectation::fixture("user_12.json"))
            .scoped(NodePath::parse("data").unwrap());
        let request = check.request("{}");

        assert_eq!(request.actual, "{}");
        assert_eq!(request.mode, ComparisonMode::FullEquality);
        assert_eq!(request.expected, Some(Expectation::fixture("user_12.json")));
        assert_eq!(request.scope.unwrap().to_string(), "data");
    }

    #[test]
    fn test_mode_serde_tagged() {
        let mode: ComparisonMode =
            serde_json::from_str(r#"{"mode":"node_equality","path":"todo"}"#).unwrap();
        assert_eq!(
            mode,
            ComparisonMode::NodeEquality {
                path: NodePath::parse("todo").unwrap()
            }
        );
    }
}
