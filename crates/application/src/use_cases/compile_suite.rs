//! Compile suite declarations into runnable scenarios.
//!
//! Dataset references are substituted and every argument is validated here,
//! at startup, so nothing scenario-shaped can fail for configuration reasons
//! once the run has begun.

use std::collections::{BTreeMap, HashSet};

use covenant_domain::{
    APPLICATION_JSON, Check, CheckSpec, ComparisonMode, Count, Dataset, Expectation, ModeSpec,
    NodePath, Scenario, ScenarioSpec, SuiteSpec, TagExpression, coerce,
};

use crate::error::ConfigError;
use crate::variable_resolver::{VariableResolver, extract_variable_names};

/// Resolves every scenario of `suite` against `dataset`, in declaration order.
///
/// # Errors
///
/// - `Interpolation` for a `{{key}}` with no dataset value
/// - `InvalidDatasetValue` when a numeric argument does not coerce
/// - `InvalidScenario` for bad node paths or expectation misuse
/// - `DuplicateScenario` when two scenarios share a name
pub fn compile_suite(suite: &SuiteSpec, dataset: &Dataset) -> Result<Vec<Scenario>, ConfigError> {
    let mut seen = HashSet::new();
    let resolver = VariableResolver::new(dataset);

    suite
        .scenarios
        .iter()
        .map(|spec| {
            if !seen.insert(spec.name.as_str()) {
                return Err(ConfigError::DuplicateScenario(spec.name.clone()));
            }
            ScenarioCompiler {
                spec,
                resolver: &resolver,
            }
            .compile()
        })
        .collect()
}

/// Keeps the scenarios whose tags satisfy `filter`; all of them without one.
#[must_use]
pub fn select_by_tags(scenarios: Vec<Scenario>, filter: Option<&TagExpression>) -> Vec<Scenario> {
    match filter {
        Some(expression) => scenarios
            .into_iter()
            .filter(|s| expression.matches(&s.tags))
            .collect(),
        None => scenarios,
    }
}

struct ScenarioCompiler<'a> {
    spec: &'a ScenarioSpec,
    resolver: &'a VariableResolver<'a>,
}

impl ScenarioCompiler<'_> {
    fn compile(&self) -> Result<Scenario, ConfigError> {
        let spec = self.spec;
        let status = spec.expect.status.unwrap_or(200);
        let content_type = match &spec.expect.content_type {
            Some(declared) => Some(self.text(declared)?),
            None if (200..300).contains(&status) => Some(APPLICATION_JSON.to_string()),
            None => None,
        };

        Ok(Scenario {
            name: spec.name.clone(),
            tags: spec.tags.clone(),
            endpoint: self.text(&spec.endpoint)?,
            path_params: self.map(&spec.path_params)?,
            query_params: self.map(&spec.query_params)?,
            headers: self.map(&spec.headers)?,
            expected_status: status,
            expected_content_type: content_type,
            checks: spec
                .checks
                .iter()
                .map(|check| self.check(check))
                .collect::<Result<_, _>>()?,
        })
    }

    fn check(&self, spec: &CheckSpec) -> Result<Check, ConfigError> {
        let mode = self.mode(&spec.mode)?;

        let expected = match (&spec.fixture, &spec.literal) {
            (Some(_), Some(_)) => {
                return Err(self.invalid("a check takes either 'fixture' or 'literal', not both"));
            }
            (Some(name), None) => Some(Expectation::Fixture(self.text(name)?)),
            (None, Some(value)) => Some(Expectation::Literal(value.clone())),
            (None, None) => None,
        };
        if mode.needs_expectation() && expected.is_none() {
            return Err(self.invalid(format!("{mode} needs a 'fixture' or 'literal'")));
        }

        let mut check = Check::new(mode);
        check.expected = expected;
        if let Some(scope) = &spec.scope {
            check = check.scoped(self.node_path(scope)?);
        }
        Ok(check)
    }

    fn mode(&self, spec: &ModeSpec) -> Result<ComparisonMode, ConfigError> {
        Ok(match spec {
            ModeSpec::FullEquality => ComparisonMode::FullEquality,
            ModeSpec::NodeEquality { path } => ComparisonMode::NodeEquality {
                path: self.node_path(path)?,
            },
            ModeSpec::IsArrayWithMinSize { min } => ComparisonMode::IsArrayWithMinSize {
                min: self.count("min", min)?,
            },
            ModeSpec::IsArrayExact { size } => ComparisonMode::IsArrayExact {
                size: self.count("size", size)?,
            },
            ModeSpec::ArrayElementEquality { index } => ComparisonMode::ArrayElementEquality {
                index: self.count("index", index)?,
            },
            ModeSpec::IsEmpty => ComparisonMode::IsEmpty,
            ModeSpec::NodeAbsent { path } => ComparisonMode::NodeAbsent {
                path: self.node_path(path)?,
            },
        })
    }

    /// Numeric arguments coerce after substitution; a failure names the
    /// dataset key the value came from.
    fn count(&self, argument: &str, count: &Count) -> Result<usize, ConfigError> {
        match count {
            Count::Number(n) => Ok(*n),
            Count::Text(raw) => {
                let resolved = self.text(raw)?;
                let key = extract_variable_names(raw)
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| argument.to_string());
                Ok(coerce(&key, &resolved)?)
            }
        }
    }

    fn node_path(&self, raw: &str) -> Result<NodePath, ConfigError> {
        NodePath::parse(&self.text(raw)?).map_err(|e| self.invalid(e))
    }

    fn map(&self, values: &BTreeMap<String, String>) -> Result<BTreeMap<String, String>, ConfigError> {
        values
            .iter()
            .map(|(k, v)| Ok((k.clone(), self.text(v)?)))
            .collect()
    }

    fn text(&self, raw: &str) -> Result<String, ConfigError> {
        self.resolver
            .resolve(raw)
            .map_err(|reference| ConfigError::Interpolation {
                scenario: self.spec.name.clone(),
                reference,
            })
    }

    fn invalid(&self, reason: impl std::fmt::Display) -> ConfigError {
        ConfigError::invalid_scenario(&self.spec.name, reason)
    }
}
