//! Received HTTP response type

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What the transport hands back for one call: status, content type and body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSpec {
    /// HTTP status code
    pub status: u16,
    /// Raw `Content-Type` header, if any
    pub content_type: Option<String>,
    /// Response body bytes
    pub body: Vec<u8>,
    /// Response time
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl ResponseSpec {
    /// Creates a new response.
    #[must_use]
    pub fn new(
        status: u16,
        content_type: Option<String>,
        body: impl Into<Vec<u8>>,
        duration: Duration,
    ) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
            duration,
        }
    }

    /// Body decoded as UTF-8, replacing invalid sequences. For logging only.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body as strict UTF-8.
    ///
    /// # Errors
    ///
    /// Returns the decode error when the body holds invalid UTF-8.
    pub fn body_utf8(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }

    /// Media type without parameters, lowercased (`application/json; charset=utf-8` -> `application/json`).
    #[must_use]
    pub fn media_type(&self) -> Option<String> {
        self.content_type.as_deref().map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }

    /// Returns true if the response media type equals `expected`, ignoring
    /// parameters and case.
    #[must_use]
    pub fn has_media_type(&self, expected: &str) -> bool {
        self.media_type()
            .is_some_and(|actual| actual == expected.trim().to_ascii_lowercase())
    }

}

impl Default for ResponseSpec {
    fn default() -> Self {
        Self {
            status: 0,
            content_type: None,
            body: Vec::new(),
            duration: Duration::ZERO,
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Truncation is acceptable: durations over ~584 million years are not realistic
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
