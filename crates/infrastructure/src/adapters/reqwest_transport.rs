//! Transport implementation using reqwest.
//!
//! The descriptor URL arrives fully encoded; this adapter only performs the
//! call, enforces the per-call timeout and maps client errors onto the
//! transport port's error type. It never retries.

use std::error::Error as _;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use covenant_application::ports::{Transport, TransportError};
use covenant_domain::{HttpMethod, RequestDescriptor, ResponseSpec};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use tracing::debug;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("covenant/", env!("CARGO_PKG_VERSION"));

/// HTTP transport backed by `reqwest::Client`.
///
/// Redirects are followed (up to 10) so the harness sees the final answer,
/// the same way a plain HTTP client pointed at the API would.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with the default client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created (e.g. TLS backend
    /// initialisation fails).
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wraps a preconfigured reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
        }
    }

    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }

        let message = full_message(error);
        if error.is_connect() {
            let lower = message.to_lowercase();
            if lower.contains("certificate") || lower.contains("tls") {
                return TransportError::Tls(message);
            }
            return TransportError::Connection(message);
        }
        if error.is_builder() {
            return TransportError::InvalidUrl(message);
        }

        TransportError::Other(message)
    }
}

/// Converts descriptor headers, naming the offending header on failure.
fn to_header_map(request: &RequestDescriptor) -> Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::new();
    for header in request.headers.iter() {
        let name = HeaderName::from_bytes(header.name.as_bytes())
            .map_err(|e| TransportError::Other(format!("invalid header name '{}': {e}", header.name)))?;
        let value = HeaderValue::from_str(&header.value)
            .map_err(|e| TransportError::Other(format!("invalid value for header '{}': {e}", header.name)))?;
        headers.append(name, value);
    }
    Ok(headers)
}

/// Joins an error with its source chain; reqwest keeps the useful part
/// ("connection refused", "invalid peer certificate") in the sources.
fn full_message(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<ResponseSpec, TransportError> {
        let url = Url::parse(&request.url)
            .map_err(|e| TransportError::InvalidUrl(format!("{e}: {}", request.url)))?;
        let headers = to_header_map(request)?;
        let timeout_ms = request.timeout_ms;

        let builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .headers(headers)
            .timeout(Duration::from_millis(timeout_ms));

        let start = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // The timeout covers the body read as well as the headers.
        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?
            .to_vec();
        let duration = start.elapsed();

        debug!(
            url = %request.url,
            status,
            bytes = body.len(),
            duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            "Response received"
        );

        Ok(ResponseSpec::new(status, content_type, body, duration))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use covenant_domain::APPLICATION_JSON;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serves exactly one connection. Returns the base URL and a receiver for
    /// the raw request head the client sent.
    async fn one_shot_server(
        response: &'static str,
        delay: Duration,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0_u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let _ = tx.send(String::from_utf8_lossy(&head).into_owned());
            tokio::time::sleep(delay).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        (format!("http://{addr}"), rx)
    }

    const JSON_OK: &str = "HTTP/1.1 200 OK\r\n\
        Content-Type: application/json; charset=utf-8\r\n\
        Content-Length: 13\r\n\
        Connection: close\r\n\r\n\
        {\"id\":\"12\"}\r\n";

    const NOT_FOUND: &str = "HTTP/1.1 404 Not Found\r\n\
        Content-Length: 0\r\n\
        Connection: close\r\n\r\n";

    #[tokio::test]
    async fn test_returns_status_content_type_and_body() {
        let (base, head) = one_shot_server(JSON_OK, Duration::ZERO).await;
        let mut request = RequestDescriptor::get(format!("{base}/user/12"));
        request.headers.set("Accept", APPLICATION_JSON);

        let response = ReqwestTransport::new().unwrap().send(&request).await.unwrap();

        assert_eq!(response.status, 200);
        assert!(response.has_media_type(APPLICATION_JSON));
        assert_eq!(response.body_text(), "{\"id\":\"12\"}\r\n");

        let head = head.await.unwrap();
        assert!(head.starts_with("GET /user/12 HTTP/1.1\r\n"));
        assert!(head.to_lowercase().contains("accept: application/json"));
        assert!(head.to_lowercase().contains("user-agent: covenant/"));
    }

    #[tokio::test]
    async fn test_path_is_sent_as_encoded() {
        let (base, head) = one_shot_server(JSON_OK, Duration::ZERO).await;
        let request = RequestDescriptor::get(format!("{base}/city/Krak%C3%B3w/users"));

        ReqwestTransport::new().unwrap().send(&request).await.unwrap();

        let head = head.await.unwrap();
        assert!(head.starts_with("GET /city/Krak%C3%B3w/users HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_an_error() {
        let (base, _head) = one_shot_server(NOT_FOUND, Duration::ZERO).await;
        let request = RequestDescriptor::get(format!("{base}/user/9999999"));

        let response = ReqwestTransport::new().unwrap().send(&request).await.unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.content_type, None);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_is_enforced() {
        let (base, _head) = one_shot_server(JSON_OK, Duration::from_secs(5)).await;
        let mut request = RequestDescriptor::get(format!("{base}/users"));
        request.timeout_ms = 100;

        let err = ReqwestTransport::new()
            .unwrap()
            .send(&request)
            .await
            .unwrap_err();

        assert_eq!(err, TransportError::Timeout { timeout_ms: 100 });
    }

    #[tokio::test]
    async fn test_refused_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let request = RequestDescriptor::get(format!("http://{addr}/users"));
        let err = ReqwestTransport::new()
            .unwrap()
            .send(&request)
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Connection(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let request = RequestDescriptor::get("not a url");
        let err = ReqwestTransport::new()
            .unwrap()
            .send(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl(_)));
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(ReqwestTransport::to_reqwest_method(HttpMethod::Get), Method::GET);
    }

    #[tokio::test]
    async fn test_invalid_header_names_the_header() {
        let mut request = RequestDescriptor::get("http://127.0.0.1:9/users");
        request.headers.set("X-Trace Id", "abc");
        let err = ReqwestTransport::new()
            .unwrap()
            .send(&request)
            .await
            .unwrap_err();
        assert!(
            matches!(&err, TransportError::Other(m) if m.contains("'X-Trace Id'")),
            "{err:?}"
        );

        let mut request = RequestDescriptor::get("http://127.0.0.1:9/users");
        request.headers.set("X-Trace", "line\nbreak");
        let err = ReqwestTransport::new()
            .unwrap()
            .send(&request)
            .await
            .unwrap_err();
        assert!(
            matches!(&err, TransportError::Other(m) if m.contains("header 'X-Trace'")),
            "{err:?}"
        );
    }
}
