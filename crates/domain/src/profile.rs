//! Deployment profiles and the configuration resolved from them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::endpoint::EndpointSpec;

/// Name of the profile used when nothing else is selected or declared.
pub const DEFAULT_PROFILE: &str = "local";

/// A named deployment environment (e.g. `local`, `staging`).
///
/// Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Profile name.
    pub name: String,
    /// URI scheme, usually `http` or `https`.
    pub scheme: String,
    /// Host name or address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Profile {
    /// Creates a new profile.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        scheme: impl Into<String>,
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            name: name.into(),
            scheme: scheme.into(),
            host: host.into(),
            port,
        }
    }

    /// Combines scheme, host and port into the base URI.
    #[must_use]
    pub fn base_uri(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.base_uri())
    }
}

/// Configuration resolved for one profile at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// The selected profile.
    pub profile: Profile,
    /// `scheme://host:port` of the selected profile.
    pub base_uri: String,
    /// Endpoint path templates keyed by logical endpoint name.
    pub endpoints: BTreeMap<String, EndpointSpec>,
}

impl ResolvedConfig {
    /// Builds a resolved config from a profile and its endpoints.
    #[must_use]
    pub fn new(profile: Profile, endpoints: impl IntoIterator<Item = EndpointSpec>) -> Self {
        let base_uri = profile.base_uri();
        Self {
            profile,
            base_uri,
            endpoints: endpoints
                .into_iter()
                .map(|e| (e.name.clone(), e))
                .collect(),
        }
    }

    /// Looks up an endpoint by logical name.
    #[must_use]
    pub fn endpoint(&self, name: &str) -> Option<&EndpointSpec> {
        self.endpoints.get(name)
    }

    /// Raw path templates keyed by endpoint name.
    #[must_use]
    pub fn endpoint_paths(&self) -> BTreeMap<String, String> {
        self.endpoints
            .iter()
            .map(|(name, spec)| (name.clone(), spec.template.as_str().to_string()))
            .collect()
    }
}
