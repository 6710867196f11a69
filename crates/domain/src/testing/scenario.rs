//! Scenario definitions.
//!
//! `ScenarioSpec` is what a suite file declares: values may still contain
//! `{{key}}` dataset references. `Scenario` is the resolved form the runner
//! executes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::mode::Check;
use crate::request::APPLICATION_JSON;

/// A set of scenarios loaded from one suite file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuiteSpec {
    /// Declared scenarios, in declaration order.
    #[serde(default)]
    pub scenarios: Vec<ScenarioSpec>,
}

/// A scenario as declared, before dataset references are resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    /// Unique scenario name, used in logs and reports.
    pub name: String,
    /// Tags used for filtering, e.g. `@functional`.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Logical endpoint name.
    pub endpoint: String,
    /// Path placeholder values.
    #[serde(default)]
    pub path_params: BTreeMap<String, String>,
    /// Query string parameters.
    #[serde(default)]
    pub query_params: BTreeMap<String, String>,
    /// Extra request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Status and content-type expectations.
    #[serde(default)]
    pub expect: ExpectSpec,
    /// Body checks, evaluated in order, fail-fast.
    #[serde(default)]
    pub checks: Vec<CheckSpec>,
}

/// Declared response metadata expectations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectSpec {
    /// Expected status; 200 when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Expected media type; defaults to JSON for 2xx statuses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// A declared body check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckSpec {
    /// Mode with its (possibly templated) arguments.
    #[serde(flatten)]
    pub mode: ModeSpec,
    /// Fixture name holding the expected value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture: Option<String>,
    /// Inline expected value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<Value>,
    /// Node path narrowing the actual body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// A comparison mode as declared in a suite file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ModeSpec {
    /// See `ComparisonMode::FullEquality`.
    FullEquality,
    /// See `ComparisonMode::NodeEquality`.
    NodeEquality {
        /// Node path expression.
        path: String,
    },
    /// See `ComparisonMode::IsArrayWithMinSize`.
    IsArrayWithMinSize {
        /// Minimum length or dataset reference.
        min: Count,
    },
    /// See `ComparisonMode::IsArrayExact`.
    IsArrayExact {
        /// Exact length or dataset reference.
        size: Count,
    },
    /// See `ComparisonMode::ArrayElementEquality`.
    ArrayElementEquality {
        /// Element index or dataset reference.
        index: Count,
    },
    /// See `ComparisonMode::IsEmpty`.
    IsEmpty,
    /// See `ComparisonMode::NodeAbsent`.
    NodeAbsent {
        /// Node path expression.
        path: String,
    },
}

/// A numeric argument written either as a number or as text (usually `{{key}}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Count {
    /// Literal number.
    Number(usize),
    /// Text to interpolate and coerce.
    Text(String),
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A fully resolved scenario ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Tags.
    pub tags: Vec<String>,
    /// Logical endpoint name.
    pub endpoint: String,
    /// Path placeholder values.
    pub path_params: BTreeMap<String, String>,
    /// Query string parameters.
    pub query_params: BTreeMap<String, String>,
    /// Extra request headers.
    pub headers: BTreeMap<String, String>,
    /// Expected status code.
    pub expected_status: u16,
    /// Expected media type, if it is checked.
    pub expected_content_type: Option<String>,
    /// Body checks.
    pub checks: Vec<Check>,
}

impl Scenario {
    /// Creates a scenario expecting `200 application/json` with no checks.
    #[must_use]
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            endpoint: endpoint.into(),
            path_params: BTreeMap::new(),
            query_params: BTreeMap::new(),
            headers: BTreeMap::new(),
            expected_status: 200,
            expected_content_type: Some(APPLICATION_JSON.to_string()),
            checks: Vec::new(),
        }
    }

    /// Adds a path parameter.
    #[must_use]
    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Sets the expected status. Non-2xx statuses stop checking content type.
    #[must_use]
    pub fn expecting_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        if !(200..300).contains(&status) {
            self.expected_content_type = None;
        }
        self
    }

    /// Adds a body check.
    #[must_use]
    pub fn with_check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }
}

/// Lifecycle of one scenario run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioState {
    /// Request descriptor constructed; nothing sent.
    Built,
    /// Transport invoked and returned.
    Sent,
    /// Status and content type accepted.
    Validated,
    /// All checks matched.
    Passed,
    /// First mismatch or error encountered.
    Failed,
}

impl ScenarioState {
    /// Returns true for `Passed` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }

    /// Returns true if moving from `self` to `next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Built, Self::Sent | Self::Failed)
                | (Self::Sent, Self::Validated | Self::Failed)
                | (Self::Validated, Self::Passed | Self::Failed)
        )
    }
}

impl fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Built => "built",
            Self::Sent => "sent",
            Self::Validated => "validated",
            Self::Passed => "passed",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_check_spec_from_json() {
        let check: CheckSpec = serde_json::from_str(
            r#"{"mode":"is_array_with_min_size","min":"{{minExpectedAllUsers}}"}"#,
        )
        .unwrap();
        assert_eq!(
            check.mode,
            ModeSpec::IsArrayWithMinSize {
                min: Count::Text("{{minExpectedAllUsers}}".to_string())
            }
        );

        let check: CheckSpec =
            serde_json::from_str(r#"{"mode":"full_equality","fixture":"user_12.json"}"#).unwrap();
        assert_eq!(check.mode, ModeSpec::FullEquality);
        assert_eq!(check.fixture.as_deref(), Some("user_12.json"));
    }

    #[test]
    fn test_scenario_builder_not_found() {
        let scenario = Scenario::new("user_userIdNotFound_NotFound", "user")
            .with_path_param("userId", "9999999")
            .expecting_status(404);
        assert_eq!(scenario.expected_status, 404);
        assert_eq!(scenario.expected_content_type, None);
        assert!(scenario.checks.is_empty());
    }

    #[test]
    fn test_state_transitions() {
        use ScenarioState::{Built, Failed, Passed, Sent, Validated};
        assert!(Built.can_transition_to(Sent));
        assert!(Sent.can_transition_to(Validated));
        assert!(Validated.can_transition_to(Passed));
        assert!(Sent.can_transition_to(Failed));
        assert!(!Built.can_transition_to(Passed));
        assert!(!Passed.can_transition_to(Failed));
        assert!(Passed.is_terminal() && Failed.is_terminal());
        assert!(!Validated.is_terminal());
    }
}
