//! Named test datasets.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A named bag of test inputs and expected scalar outcomes.
///
/// Values are raw strings; coercion is the caller's responsibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Dataset name.
    pub name: String,
    /// Raw key/value pairs.
    pub values: BTreeMap<String, String>,
}

impl Dataset {
    /// Creates a dataset from its key/value pairs.
    #[must_use]
    pub fn new(name: impl Into<String>, values: BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Gets a raw value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Gets a value and parses it into `T`.
    ///
    /// Returns `Ok(None)` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDatasetValue` naming the key and value
    /// when the value does not parse.
    pub fn parse<T: FromStr>(&self, key: &str) -> DomainResult<Option<T>> {
        self.get(key)
            .map(|raw| coerce(key, raw))
            .transpose()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the dataset has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parses a raw dataset value, reporting the key on failure.
///
/// # Errors
///
/// Returns `DomainError::InvalidDatasetValue` if `raw` does not parse as `T`.
pub fn coerce<T: FromStr>(key: &str, raw: &str) -> DomainResult<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| DomainError::InvalidDatasetValue {
            key: key.to_string(),
            value: raw.to_string(),
        })
}
