//! Scenario and suite reports.

use serde::{Deserialize, Serialize};

use super::mode::ComparisonMode;
use super::outcome::Diff;
use super::scenario::ScenarioState;

/// Why a scenario failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Error class, e.g. `UnexpectedStatus` or `Mismatch`.
    pub kind: String,
    /// The comparison mode that failed, if the failure came from a body check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ComparisonMode>,
    /// Human-readable message.
    pub message: String,
    /// Expected-vs-actual diff for mismatches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<Diff>,
}

impl Failure {
    /// Creates a failure without mode or diff.
    #[must_use]
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            mode: None,
            message: message.into(),
            diff: None,
        }
    }

    /// Records the comparison mode that failed.
    #[must_use]
    pub fn with_mode(mut self, mode: ComparisonMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Attaches a diff.
    #[must_use]
    pub fn with_diff(mut self, diff: Diff) -> Self {
        self.diff = Some(diff);
        self
    }
}

/// Result of running one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub name: String,
    /// Terminal state.
    pub state: ScenarioState,
    /// Number of body checks that matched before the run ended.
    pub checks_passed: usize,
    /// Failure details when `state` is `Failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// States visited, in order, ending with `state`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trail: Vec<ScenarioState>,
}

impl ScenarioReport {
    /// Creates a passed report.
    #[must_use]
    pub fn passed(name: impl Into<String>, checks_passed: usize, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            state: ScenarioState::Passed,
            checks_passed,
            failure: None,
            duration_ms,
            trail: Vec::new(),
        }
    }

    /// Creates a failed report.
    #[must_use]
    pub fn failed(
        name: impl Into<String>,
        failure: Failure,
        checks_passed: usize,
        duration_ms: u64,
    ) -> Self {
        Self {
            name: name.into(),
            state: ScenarioState::Failed,
            checks_passed,
            failure: Some(failure),
            duration_ms,
            trail: Vec::new(),
        }
    }

    /// Records the states the run went through.
    #[must_use]
    pub fn with_trail(mut self, trail: Vec<ScenarioState>) -> Self {
        self.trail = trail;
        self
    }

    /// Returns true if the scenario passed.
    #[must_use]
    pub fn is_passed(&self) -> bool {
        self.state == ScenarioState::Passed
    }
}

/// Results from running a set of scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Profile the suite ran against.
    pub profile: String,
    /// Dataset used.
    pub dataset: String,
    /// Per-scenario reports in declaration order.
    pub scenarios: Vec<ScenarioReport>,
    /// Total number of scenarios run.
    pub total: usize,
    /// Number that passed.
    pub passed: usize,
    /// Number that failed.
    pub failed: usize,
    /// Total wall-clock time in milliseconds.
    pub duration_ms: u64,
}

impl SuiteReport {
    /// Create a new suite report.
    #[must_use]
    pub fn new(
        profile: impl Into<String>,
        dataset: impl Into<String>,
        scenarios: Vec<ScenarioReport>,
        duration_ms: u64,
    ) -> Self {
        let total = scenarios.len();
        let passed = scenarios.iter().filter(|r| r.is_passed()).count();
        let failed = total - passed;

        Self {
            profile: profile.into(),
            dataset: dataset.into(),
            scenarios,
            total,
            passed,
            failed,
            duration_ms,
        }
    }

    /// Check if every scenario passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Get pass rate as percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    /// Iterates over failed scenarios.
    pub fn failures(&self) -> impl Iterator<Item = &ScenarioReport> {
        self.scenarios.iter().filter(|r| !r.is_passed())
    }
}
