//! Expected-response fixtures.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored JSON document (or fragment) keyed by logical name.
///
/// Empty content is legitimate and means "expect an empty body"; a name that
/// cannot be resolved at all never produces a `Fixture`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    /// Logical name, e.g. `user_12.json`.
    pub name: String,
    /// Raw text as stored.
    pub content: Arc<str>,
}

impl Fixture {
    /// Creates a fixture.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Returns true if the stored text is empty or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Where the expected side of a comparison comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// A fixture looked up by logical name.
    Fixture(String),
    /// An inline JSON value.
    Literal(Value),
}

impl Expectation {
    /// Creates a fixture expectation.
    #[must_use]
    pub fn fixture(name: impl Into<String>) -> Self {
        Self::Fixture(name.into())
    }

    /// Creates a literal expectation.
    #[must_use]
    pub const fn literal(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixture(name) => write!(f, "fixture '{name}'"),
            Self::Literal(value) => write!(f, "literal {value}"),
        }
    }
}
