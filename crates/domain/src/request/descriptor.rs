//! Request descriptor handed to the transport.

use serde::{Deserialize, Serialize};

use super::{Headers, HttpMethod};

/// Description of one HTTP request, fully resolved and encoded.
///
/// Building a descriptor has no network effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute URL with path parameters substituted and percent-encoded.
    pub url: String,
    /// Request headers.
    pub headers: Headers,
    /// Per-call timeout the transport must enforce, in milliseconds.
    pub timeout_ms: u64,
}

impl RequestDescriptor {
    /// Default per-call timeout.
    pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

    /// Creates a GET descriptor with no headers.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Headers::new(),
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
        }
    }

    /// Path part of the URL (everything after the authority, before `?`).
    #[must_use]
    pub fn path(&self) -> &str {
        let after_scheme = self
            .url
            .split_once("://")
            .map_or(self.url.as_str(), |(_, rest)| rest);
        let path = after_scheme
            .find('/')
            .map_or("", |idx| &after_scheme[idx..]);
        path.split_once('?').map_or(path, |(p, _)| p)
    }
}
