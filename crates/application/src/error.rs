//! Application error types
//!
//! Two families: `ConfigError` aborts the whole run before any scenario
//! starts; `ScenarioError` fails one scenario and the run continues.

use std::fmt;

use covenant_domain::DomainError;
use thiserror::Error;

use crate::ports::{ConfigSourceError, FixtureSourceError, TransportError};

/// Which document failed to parse as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonSide {
    /// The response body.
    Actual,
    /// The fixture or literal.
    Expected,
}

impl fmt::Display for JsonSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Actual => "actual",
            Self::Expected => "expected",
        })
    }
}

/// Startup configuration errors. Always fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The selected profile is not declared.
    #[error("profile '{0}' is not defined")]
    ProfileNotFound(String),

    /// A required key is absent for the resolved profile.
    #[error("missing required key '{key}' for profile '{profile}'")]
    MissingKey {
        /// Profile being resolved.
        profile: String,
        /// Dotted key, e.g. `server.host` or `path.user`.
        key: String,
    },

    /// A key is present but its value is unusable.
    #[error("invalid value for '{key}': '{value}' ({reason})")]
    InvalidValue {
        /// Dotted key.
        key: String,
        /// Raw value.
        value: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A dataset value could not be coerced to the type a scenario needs.
    #[error("invalid dataset value for '{key}': '{value}'")]
    InvalidDatasetValue {
        /// Dataset key.
        key: String,
        /// Raw value.
        value: String,
    },

    /// The selected dataset does not exist.
    #[error("dataset '{0}' not found")]
    DatasetNotFound(String),

    /// The backing store could not be read or parsed.
    #[error("configuration source error: {0}")]
    Source(String),

    /// A `{{key}}` reference has no value in the dataset.
    #[error("scenario '{scenario}' references unknown dataset key '{reference}'")]
    Interpolation {
        /// Scenario declaring the reference.
        scenario: String,
        /// The unresolved key.
        reference: String,
    },

    /// A scenario declaration is unusable (bad node path, missing argument, ...).
    #[error("scenario '{scenario}': {reason}")]
    InvalidScenario {
        /// Scenario name.
        scenario: String,
        /// What is wrong.
        reason: String,
    },

    /// Two scenarios share a name.
    #[error("duplicate scenario name '{0}'")]
    DuplicateScenario(String),

    /// A tag filter did not parse.
    #[error("{0}")]
    InvalidTags(String),
}

impl ConfigError {
    /// Creates a `MissingKey` error.
    pub fn missing_key(profile: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingKey {
            profile: profile.into(),
            key: key.into(),
        }
    }

    /// Creates an `InvalidScenario` error.
    pub fn invalid_scenario(scenario: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::InvalidScenario {
            scenario: scenario.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<ConfigSourceError> for ConfigError {
    fn from(error: ConfigSourceError) -> Self {
        Self::Source(error.to_string())
    }
}

impl From<DomainError> for ConfigError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::InvalidDatasetValue { key, value } => {
                Self::InvalidDatasetValue { key, value }
            }
            other @ DomainError::InvalidTagExpression { .. } => Self::InvalidTags(other.to_string()),
            other => Self::Source(other.to_string()),
        }
    }
}

/// Errors that fail one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    /// The endpoint is not configured for the active profile.
    #[error("unknown endpoint '{0}'")]
    UnknownEndpoint(String),

    /// A template placeholder has no value.
    #[error("missing path parameter '{0}'")]
    MissingPathParam(String),

    /// A document did not parse as JSON.
    #[error("{side} body is not valid JSON: {message}")]
    MalformedJson {
        /// Which side failed.
        side: JsonSide,
        /// Parser message.
        message: String,
    },

    /// The addressed node does not exist in the actual body.
    #[error("node path '{0}' not found")]
    NodePathNotFound(String),

    /// An element index is past the end of the array.
    #[error("index {index} out of range for array of length {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Actual array length.
        len: usize,
    },

    /// A referenced fixture is not stored.
    #[error("fixture '{0}' not found")]
    FixtureNotFound(String),

    /// A fixture exists but could not be read or decoded.
    #[error("fixture '{name}' is unreadable: {message}")]
    FixtureUnreadable {
        /// Fixture name.
        name: String,
        /// Underlying error text.
        message: String,
    },

    /// A mode that compares against a value was given none.
    #[error("{0} requires an expected fixture or literal")]
    MissingExpectation(String),

    /// The transport returned no response.
    #[error("transport failure: {0}")]
    TransportFailure(#[from] TransportError),

    /// The status code differs from the expected one.
    #[error("expected status {expected}, got {actual}")]
    UnexpectedStatus {
        /// Expected status.
        expected: u16,
        /// Actual status.
        actual: u16,
    },

    /// The media type differs from the expected one.
    #[error("expected content type '{expected}', got '{}'", .actual.as_deref().unwrap_or("<none>"))]
    UnexpectedContentType {
        /// Expected media type.
        expected: String,
        /// Raw `Content-Type` header, if any.
        actual: Option<String>,
    },
}

impl ScenarioError {
    /// Short error class name used in reports.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownEndpoint(_) => "UnknownEndpoint",
            Self::MissingPathParam(_) => "MissingPathParam",
            Self::MalformedJson { .. } => "MalformedJson",
            Self::NodePathNotFound(_) => "NodePathNotFound",
            Self::IndexOutOfRange { .. } => "IndexOutOfRange",
            Self::FixtureNotFound(_) => "FixtureNotFound",
            Self::FixtureUnreadable { .. } => "FixtureUnreadable",
            Self::MissingExpectation(_) => "MissingExpectation",
            Self::TransportFailure(_) => "TransportFailure",
            Self::UnexpectedStatus { .. } => "UnexpectedStatus",
            Self::UnexpectedContentType { .. } => "UnexpectedContentType",
        }
    }
}

impl From<FixtureSourceError> for ScenarioError {
    fn from(error: FixtureSourceError) -> Self {
        match error {
            FixtureSourceError::NotFound(name) => Self::FixtureNotFound(name),
            FixtureSourceError::Io { name, message } => Self::FixtureUnreadable { name, message },
        }
    }
}
