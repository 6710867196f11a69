//! Profile and dataset resolution.
//!
//! Constructed once at startup from an explicit `ConfigSource`. Every
//! required key is checked here so a misconfigured environment aborts the
//! run before a single request is sent.

use std::sync::Arc;

use covenant_domain::{
    DEFAULT_PROFILE, Dataset, EndpointSpec, PathTemplate, Profile, ResolvedConfig, Scenario,
};
use moka::future::Cache;
use tracing::debug;

use crate::error::ConfigError;
use crate::ports::{ConfigSource, KeyTable};

/// Key holding the URI scheme.
pub const SCHEME_KEY: &str = "server.scheme";
/// Key holding the host.
pub const HOST_KEY: &str = "server.host";
/// Key holding the port.
pub const PORT_KEY: &str = "server.port";
/// Prefix of endpoint path template keys (`path.user`, `path.city`, ...).
pub const PATH_PREFIX: &str = "path.";

/// Resolves profiles and datasets from a configuration source.
pub struct ConfigResolver {
    source: Arc<dyn ConfigSource>,
    datasets: Cache<String, Arc<Dataset>>,
}

impl ConfigResolver {
    /// Creates a resolver over `source`.
    #[must_use]
    pub fn new(source: Arc<dyn ConfigSource>) -> Self {
        Self {
            source,
            datasets: Cache::builder().build(),
        }
    }

    /// Picks the profile to run against.
    ///
    /// An explicit selection wins, then the source's default, then the first
    /// declared profile, then `local`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Source` if the source cannot be read.
    pub async fn select_profile(&self, requested: Option<&str>) -> Result<String, ConfigError> {
        if let Some(name) = non_blank(requested) {
            return Ok(name.to_string());
        }
        if let Some(name) = self.source.default_profile().await? {
            return Ok(name);
        }
        let declared = self.source.profile_names().await?;
        Ok(declared
            .into_iter()
            .next()
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string()))
    }

    /// Picks the dataset: explicit selection, then the source's default,
    /// then a dataset named after the profile.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Source` if the source cannot be read.
    pub async fn select_dataset(
        &self,
        requested: Option<&str>,
        profile: &str,
    ) -> Result<String, ConfigError> {
        if let Some(name) = non_blank(requested) {
            return Ok(name.to_string());
        }
        Ok(self
            .source
            .default_dataset()
            .await?
            .unwrap_or_else(|| profile.to_string()))
    }

    /// Resolves base URI and endpoint paths for a profile.
    ///
    /// # Errors
    ///
    /// - `ProfileNotFound` if the profile is not declared
    /// - `MissingKey` if scheme, host or port is absent or blank
    /// - `InvalidValue` if the port is not a valid `u16` or a path template
    ///   is malformed
    pub async fn resolve(&self, profile_name: &str) -> Result<ResolvedConfig, ConfigError> {
        let table = self
            .source
            .profile(profile_name)
            .await?
            .ok_or_else(|| ConfigError::ProfileNotFound(profile_name.to_string()))?;

        let scheme = required(&table, profile_name, SCHEME_KEY)?;
        let host = required(&table, profile_name, HOST_KEY)?;
        let raw_port = required(&table, profile_name, PORT_KEY)?;
        let port = raw_port
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidValue {
                key: PORT_KEY.to_string(),
                value: raw_port.to_string(),
                reason: e.to_string(),
            })?;

        let endpoints = endpoints(&table)?;
        let config = ResolvedConfig::new(Profile::new(profile_name, scheme, host, port), endpoints);
        debug!(
            profile = %profile_name,
            base_uri = %config.base_uri,
            endpoints = config.endpoints.len(),
            "Resolved profile"
        );
        Ok(config)
    }

    /// Returns the dataset's raw key/value pairs, loading it on first use.
    ///
    /// Concurrent first lookups of the same name share one load; failures
    /// are not cached.
    ///
    /// # Errors
    ///
    /// Returns `DatasetNotFound` if the source has no such dataset, or
    /// `Source` if it cannot be read.
    pub async fn dataset(&self, name: &str) -> Result<Arc<Dataset>, ConfigError> {
        let source = Arc::clone(&self.source);
        let key = name.to_string();
        self.datasets
            .try_get_with(key.clone(), async move {
                let values = source
                    .dataset(&key)
                    .await?
                    .ok_or_else(|| ConfigError::DatasetNotFound(key.clone()))?;
                debug!(dataset = %key, entries = values.len(), "Loaded dataset");
                Ok::<_, ConfigError>(Arc::new(Dataset::new(key, values)))
            })
            .await
            .map_err(Arc::unwrap_or_clone)
    }

    /// Checks that every endpoint the scenarios use has a path for this
    /// profile.
    ///
    /// # Errors
    ///
    /// Returns `MissingKey` naming the first absent `path.<endpoint>` key.
    pub fn require_endpoints(
        config: &ResolvedConfig,
        scenarios: &[Scenario],
    ) -> Result<(), ConfigError> {
        scenarios
            .iter()
            .find(|s| config.endpoint(&s.endpoint).is_none())
            .map_or(Ok(()), |s| {
                Err(ConfigError::missing_key(
                    &config.profile.name,
                    format!("{PATH_PREFIX}{}", s.endpoint),
                ))
            })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(table: &'a KeyTable, profile: &str, key: &str) -> Result<&'a str, ConfigError> {
    table
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::missing_key(profile, key))
}

fn endpoints(table: &KeyTable) -> Result<Vec<EndpointSpec>, ConfigError> {
    table
        .iter()
        .filter_map(|(key, raw)| key.strip_prefix(PATH_PREFIX).map(|name| (key, name, raw)))
        .map(|(key, name, raw)| {
            PathTemplate::parse(raw.trim())
                .map(|template| EndpointSpec::new(name, template))
                .map_err(|e| ConfigError::InvalidValue {
                    key: key.clone(),
                    value: raw.clone(),
                    reason: e.to_string(),
                })
        })
        .collect()
}
