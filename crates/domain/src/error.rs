//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A node path expression could not be parsed.
    #[error("invalid node path '{path}': {reason}")]
    InvalidNodePath {
        /// The offending expression.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An endpoint path template is malformed (e.g. unbalanced braces).
    #[error("invalid path template '{template}': {reason}")]
    InvalidPathTemplate {
        /// The offending template.
        template: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A tag filter expression could not be parsed.
    #[error("invalid tag expression '{expression}': {reason}")]
    InvalidTagExpression {
        /// The offending expression.
        expression: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A dataset value could not be coerced to the type the caller asked for.
    #[error("invalid dataset value for '{key}': '{value}'")]
    InvalidDatasetValue {
        /// Dataset key.
        key: String,
        /// Raw value found in the dataset.
        value: String,
    },
}

impl DomainError {
    /// Creates an `InvalidNodePath` error.
    pub fn invalid_node_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidNodePath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates an `InvalidPathTemplate` error.
    pub fn invalid_template(template: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPathTemplate {
            template: template.into(),
            reason: reason.into(),
        }
    }

    /// Creates an `InvalidTagExpression` error.
    pub fn invalid_tags(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTagExpression {
            expression: expression.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
