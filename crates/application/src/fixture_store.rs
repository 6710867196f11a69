//! Lazily loaded, process-lifetime fixture cache.

use std::sync::Arc;

use covenant_domain::Fixture;
use moka::future::Cache;
use tracing::debug;

use crate::error::ScenarioError;
use crate::ports::{FixtureSource, FixtureSourceError};

/// Loads fixtures by logical name and keeps them for the rest of the run.
///
/// Only one load runs per name; concurrent callers await it. A failed load
/// is not cached, so the next lookup tries again.
pub struct FixtureStore {
    source: Arc<dyn FixtureSource>,
    cache: Cache<String, Fixture>,
}

impl FixtureStore {
    /// Creates a store over `source`.
    #[must_use]
    pub fn new(source: Arc<dyn FixtureSource>) -> Self {
        Self {
            source,
            cache: Cache::builder().build(),
        }
    }

    /// Returns the fixture stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns `FixtureNotFound` if the source has nothing under `name`,
    /// or `FixtureUnreadable` if it cannot be read or is not UTF-8.
    pub async fn get(&self, name: &str) -> Result<Fixture, ScenarioError> {
        let source = Arc::clone(&self.source);
        let key = name.to_string();
        self.cache
            .try_get_with(key.clone(), async move {
                let bytes = source.load(&key).await?;
                let text = String::from_utf8(bytes).map_err(|e| FixtureSourceError::Io {
                    name: key.clone(),
                    message: e.to_string(),
                })?;
                let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
                debug!(fixture = %key, bytes = text.len(), "Loaded fixture");
                Ok::<_, FixtureSourceError>(Fixture::new(key, text))
            })
            .await
            .map_err(|e| ScenarioError::from(Arc::unwrap_or_clone(e)))
    }
}
