//! Configuration source port

use std::collections::BTreeMap;

use async_trait::async_trait;

/// A flat dotted-key table, e.g. `server.host -> localhost`.
pub type KeyTable = BTreeMap<String, String>;

/// Errors reading the backing configuration store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigSourceError {
    /// The store could not be read.
    #[error("cannot read {location}: {message}")]
    Unreadable {
        /// File, URL or other locator.
        location: String,
        /// Underlying error text.
        message: String,
    },

    /// The store was read but its content is not valid.
    #[error("cannot parse {location}: {message}")]
    Parse {
        /// File, URL or other locator.
        location: String,
        /// Parser message.
        message: String,
    },
}

/// Format-agnostic access to profile and dataset key tables.
///
/// Files, environment variables and remote config services are all
/// acceptable backings.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Profile names in declaration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn profile_names(&self) -> Result<Vec<String>, ConfigSourceError>;

    /// The profile the store names as default, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn default_profile(&self) -> Result<Option<String>, ConfigSourceError>;

    /// The dataset the store names as default, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn default_dataset(&self) -> Result<Option<String>, ConfigSourceError> {
        Ok(None)
    }

    /// The effective key table for a profile, or `None` if it is not declared.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn profile(&self, name: &str) -> Result<Option<KeyTable>, ConfigSourceError>;

    /// Key/value pairs of a dataset, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset exists but cannot be read.
    async fn dataset(&self, name: &str) -> Result<Option<KeyTable>, ConfigSourceError>;
}
