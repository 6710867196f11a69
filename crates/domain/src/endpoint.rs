//! Logical endpoints and their path templates.
//!
//! A template such as `/city/{city}/users` is parsed once into literal and
//! placeholder segments so substitution never has to re-scan the string.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// One piece of a parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSegment {
    /// Text copied verbatim into the URL.
    Literal(String),
    /// A named placeholder, written `{name}` in the template.
    Placeholder(String),
}

/// A parsed endpoint path template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathTemplate {
    raw: String,
    segments: Vec<TemplateSegment>,
}

impl PathTemplate {
    /// Parses a template string.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPathTemplate` for unbalanced braces,
    /// nested braces, or an empty placeholder name.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.chars();

        while let Some(ch) = chars.next() {
            match ch {
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        match inner {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => {
                                return Err(DomainError::invalid_template(
                                    raw,
                                    "nested '{' inside placeholder",
                                ));
                            }
                            other => name.push(other),
                        }
                    }
                    if !closed {
                        return Err(DomainError::invalid_template(raw, "unclosed placeholder"));
                    }
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(DomainError::invalid_template(raw, "empty placeholder name"));
                    }
                    if !literal.is_empty() {
                        segments.push(TemplateSegment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(TemplateSegment::Placeholder(name.to_string()));
                }
                '}' => {
                    return Err(DomainError::invalid_template(raw, "unmatched '}'"));
                }
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            segments.push(TemplateSegment::Literal(literal));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The template as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed segments in order.
    #[must_use]
    pub fn segments(&self) -> &[TemplateSegment] {
        &self.segments
    }

    /// Placeholder names in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            TemplateSegment::Placeholder(name) => Some(name.as_str()),
            TemplateSegment::Literal(_) => None,
        })
    }
}

impl TryFrom<String> for PathTemplate {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PathTemplate> for String {
    fn from(value: PathTemplate) -> Self {
        value.raw
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A named logical endpoint (`user`, `city`, ...).
///
/// Paths are profile-agnostic; only the base URI varies by profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSpec {
    /// Logical endpoint name.
    pub name: String,
    /// Path template relative to the base URI.
    pub template: PathTemplate,
}

impl EndpointSpec {
    /// Creates a new endpoint.
    #[must_use]
    pub fn new(name: impl Into<String>, template: PathTemplate) -> Self {
        Self {
            name: name.into(),
            template,
        }
    }
}
