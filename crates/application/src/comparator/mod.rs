//! Response comparator
//!
//! Decides whether an actual response body satisfies a `ComparisonMode`,
//! producing a structured `Diff` on mismatch. Mismatches are outcomes;
//! unparseable documents, missing nodes and bad indices are errors.

pub mod json_diff;

use std::sync::Arc;

use covenant_domain::{
    ComparisonMode, ComparisonOutcome, ComparisonRequest, Diff, Expectation, NodePath,
};
use serde_json::Value;
use tracing::trace;

use crate::error::{JsonSide, ScenarioError};
use crate::fixture_store::FixtureStore;

pub use json_diff::{first_difference, numbers_equal};

/// Expected side of a comparison after fixture lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpectedDocument {
    /// A fixture whose content is empty or whitespace: expect an empty body.
    Blank,
    /// A parsed JSON document or fragment.
    Json(Value),
}

/// Compares response bodies against fixtures and literals.
pub struct ResponseComparator {
    fixtures: Arc<FixtureStore>,
}

impl ResponseComparator {
    /// Creates a comparator reading fixtures from `fixtures`.
    #[must_use]
    pub const fn new(fixtures: Arc<FixtureStore>) -> Self {
        Self { fixtures }
    }

    /// Runs one comparison.
    ///
    /// # Errors
    ///
    /// - `MissingExpectation` if the mode needs an expected value and has none
    /// - `FixtureNotFound` / `FixtureUnreadable` from the fixture store
    /// - `MalformedJson` naming the side that failed to parse
    /// - `NodePathNotFound` if the scope or `NodeEquality` path is missing
    /// - `IndexOutOfRange` for `ArrayElementEquality` past the end
    pub async fn compare(
        &self,
        request: &ComparisonRequest,
    ) -> Result<ComparisonOutcome, ScenarioError> {
        let expected = if request.mode.needs_expectation() {
            Some(self.expected_document(request).await?)
        } else {
            None
        };
        let outcome = evaluate(request, expected.as_ref())?;
        trace!(mode = %request.mode, matched = outcome.is_match(), "Compared body");
        Ok(outcome)
    }

    async fn expected_document(
        &self,
        request: &ComparisonRequest,
    ) -> Result<ExpectedDocument, ScenarioError> {
        match &request.expected {
            None => Err(ScenarioError::MissingExpectation(request.mode.to_string())),
            Some(Expectation::Literal(value)) => Ok(ExpectedDocument::Json(value.clone())),
            Some(Expectation::Fixture(name)) => {
                let fixture = self.fixtures.get(name).await?;
                if fixture.is_blank() {
                    return Ok(ExpectedDocument::Blank);
                }
                serde_json::from_str(&fixture.content)
                    .map(ExpectedDocument::Json)
                    .map_err(|e| malformed(JsonSide::Expected, &e))
            }
        }
    }
}

/// Applies `request.mode` to the actual body. Pure and deterministic.
///
/// `expected` must be `Some` for modes that need it.
///
/// # Errors
///
/// See [`ResponseComparator::compare`].
pub fn evaluate(
    request: &ComparisonRequest,
    expected: Option<&ExpectedDocument>,
) -> Result<ComparisonOutcome, ScenarioError> {
    let expected = match (request.mode.needs_expectation(), expected) {
        (false, _) => None,
        (true, None) => return Err(ScenarioError::MissingExpectation(request.mode.to_string())),
        (true, Some(ExpectedDocument::Json(value))) => Some(value),
        (true, Some(ExpectedDocument::Blank)) => return blank_expectation(request),
    };

    let actual: Value =
        serde_json::from_str(&request.actual).map_err(|e| malformed(JsonSide::Actual, &e))?;

    let (target, base) = match &request.scope {
        Some(scope) => (
            scope
                .resolve(&actual)
                .ok_or_else(|| ScenarioError::NodePathNotFound(scope.to_string()))?,
            scope.clone(),
        ),
        None => (&actual, NodePath::root()),
    };

    let diff = match &request.mode {
        ComparisonMode::FullEquality => equal(expected, target, &base),
        ComparisonMode::NodeEquality { path } => {
            let at = base.join(path);
            let node = path
                .resolve(target)
                .ok_or_else(|| ScenarioError::NodePathNotFound(at.to_string()))?;
            equal(expected, node, &at)
        }
        ComparisonMode::IsArrayWithMinSize { min } => match target.as_array() {
            Some(items) if items.len() >= *min => None,
            Some(items) => Some(Diff::new(
                base,
                format!(">= {min} elements"),
                format!("{} elements", items.len()),
                format!("{} < {min}", items.len()),
            )),
            None => Some(not_an_array(base, target)),
        },
        ComparisonMode::IsArrayExact { size } => match target.as_array() {
            Some(items) if items.len() == *size => None,
            Some(items) => Some(Diff::new(
                base,
                format!("{size} elements"),
                format!("{} elements", items.len()),
                format!("{} != {size}", items.len()),
            )),
            None => Some(not_an_array(base, target)),
        },
        ComparisonMode::ArrayElementEquality { index } => match target.as_array() {
            Some(items) => {
                let element = items.get(*index).ok_or(ScenarioError::IndexOutOfRange {
                    index: *index,
                    len: items.len(),
                })?;
                equal(expected, element, &base.index(*index))
            }
            None => Some(not_an_array(base, target)),
        },
        ComparisonMode::IsEmpty => match target {
            Value::Array(items) if items.is_empty() => None,
            Value::Object(map) if map.is_empty() => None,
            Value::Array(items) => Some(Diff::new(
                base,
                "[]",
                format!("{} elements", items.len()),
                "expected an empty array",
            )),
            Value::Object(map) => Some(Diff::new(
                base,
                "{}",
                format!("{} keys", map.len()),
                "expected an empty object",
            )),
            other => Some(Diff::new(
                base,
                "empty array or object",
                json_diff::render(other),
                format!("expected an empty array or object, found {}", json_diff::type_name(other)),
            )),
        },
        ComparisonMode::NodeAbsent { path } => path.resolve(target).map(|node| {
            Diff::new(base.join(path), "<absent>", json_diff::render(node), "node is present")
        }),
    };

    Ok(diff.map_or(ComparisonOutcome::Match, ComparisonOutcome::Mismatch))
}

fn equal(expected: Option<&Value>, actual: &Value, path: &NodePath) -> Option<Diff> {
    // Only reachable for modes that need an expectation, which is checked above.
    expected.and_then(|e| first_difference(e, actual, path))
}

fn blank_expectation(request: &ComparisonRequest) -> Result<ComparisonOutcome, ScenarioError> {
    match request.mode {
        ComparisonMode::FullEquality if request.actual.trim().is_empty() => {
            Ok(ComparisonOutcome::Match)
        }
        ComparisonMode::FullEquality => Ok(ComparisonOutcome::Mismatch(Diff::new(
            NodePath::root(),
            "<empty body>",
            json_diff::preview(request.actual.trim()),
            "expected an empty body",
        ))),
        _ => Err(ScenarioError::MalformedJson {
            side: JsonSide::Expected,
            message: "fixture is empty".to_string(),
        }),
    }
}

fn not_an_array(path: NodePath, actual: &Value) -> Diff {
    Diff::new(
        path,
        "array",
        json_diff::render(actual),
        format!("expected an array, found {}", json_diff::type_name(actual)),
    )
}

fn malformed(side: JsonSide, error: &serde_json::Error) -> ScenarioError {
    ScenarioError::MalformedJson {
        side,
        message: error.to_string(),
    }
}
