//! Builds request descriptors from resolved configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use covenant_domain::{APPLICATION_JSON, RequestDescriptor, ResolvedConfig, TemplateSegment};
use tracing::debug;

use crate::error::ScenarioError;

/// Turns an endpoint name plus parameters into a `RequestDescriptor`.
///
/// Building never touches the network.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    config: Arc<ResolvedConfig>,
    timeout_ms: u64,
}

impl RequestBuilder {
    /// Creates a builder for one resolved profile.
    #[must_use]
    pub const fn new(config: Arc<ResolvedConfig>) -> Self {
        Self {
            config,
            timeout_ms: RequestDescriptor::DEFAULT_TIMEOUT_MS,
        }
    }

    /// Sets the per-call timeout carried by every descriptor.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// The configuration requests are built against.
    #[must_use]
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Builds a GET request for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownEndpoint` if the profile has no such endpoint, or
    /// `MissingPathParam` naming the first placeholder without a value.
    pub fn build(
        &self,
        endpoint: &str,
        path_params: &BTreeMap<String, String>,
        query_params: &BTreeMap<String, String>,
    ) -> Result<RequestDescriptor, ScenarioError> {
        self.build_with_headers(endpoint, path_params, query_params, &BTreeMap::new())
    }

    /// Like [`build`](Self::build), with extra headers. A caller-supplied
    /// `Accept` replaces the default one.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_with_headers(
        &self,
        endpoint: &str,
        path_params: &BTreeMap<String, String>,
        query_params: &BTreeMap<String, String>,
        headers: &BTreeMap<String, String>,
    ) -> Result<RequestDescriptor, ScenarioError> {
        let spec = self
            .config
            .endpoint(endpoint)
            .ok_or_else(|| ScenarioError::UnknownEndpoint(endpoint.to_string()))?;

        let mut path = String::new();
        for segment in spec.template.segments() {
            match segment {
                TemplateSegment::Literal(text) => path.push_str(text),
                TemplateSegment::Placeholder(name) => {
                    let value = path_params
                        .get(name)
                        .ok_or_else(|| ScenarioError::MissingPathParam(name.clone()))?;
                    path.push_str(&urlencoding::encode(value));
                }
            }
        }

        let mut url = self.config.base_uri.trim_end_matches('/').to_string();
        if !path.is_empty() && !path.starts_with('/') {
            url.push('/');
        }
        url.push_str(&path);

        if !query_params.is_empty() {
            let query = query_params
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&query);
        }

        let mut request = RequestDescriptor::get(url);
        request.timeout_ms = self.timeout_ms;
        request.headers.set("Accept", APPLICATION_JSON);
        for (name, value) in headers {
            request.headers.set(name, value);
        }

        debug!(endpoint, url = %request.url, "Built request");
        Ok(request)
    }
}
