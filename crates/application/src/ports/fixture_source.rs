//! Fixture source port

use async_trait::async_trait;

/// Errors looking up a fixture.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixtureSourceError {
    /// No fixture is stored under this name.
    #[error("fixture not found: {0}")]
    NotFound(String),

    /// The fixture exists but could not be read.
    #[error("cannot read fixture '{name}': {message}")]
    Io {
        /// Logical fixture name.
        name: String,
        /// Underlying error text.
        message: String,
    },
}

/// Named-lookup byte store for expected-response fixtures.
#[async_trait]
pub trait FixtureSource: Send + Sync {
    /// Loads the raw bytes stored under `name`.
    ///
    /// An empty result is a valid fixture, distinct from `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `FixtureSourceError::NotFound` if nothing is stored under
    /// `name`, or `Io` if reading failed.
    async fn load(&self, name: &str) -> Result<Vec<u8>, FixtureSourceError>;
}
