//! Transport port
//!
//! The HTTP call itself is an external collaborator: the harness hands it a
//! fully built descriptor and gets back status, content type and body.

use async_trait::async_trait;
use covenant_domain::{RequestDescriptor, ResponseSpec};

/// Errors a transport can report.
///
/// Every variant surfaces as a scenario failure; none is retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The per-call timeout elapsed.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The bound that was enforced.
        timeout_ms: u64,
    },

    /// Could not connect to the server.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The descriptor URL was rejected by the client.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// TLS handshake or certificate problem.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Anything else the client reported.
    #[error("{0}")]
    Other(String),
}

/// Port for sending one HTTP request.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request exactly once and returns what came back.
    ///
    /// Implementations must enforce `request.timeout_ms`.
    ///
    /// # Errors
    ///
    /// Returns a `TransportError` when no HTTP response was obtained.
    async fn send(&self, request: &RequestDescriptor) -> Result<ResponseSpec, TransportError>;
}
