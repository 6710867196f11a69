//! Node path addressing into JSON documents.
//!
//! Grammar: a sequence of dot-separated keys and bracketed indices, e.g.
//! `todo`, `[0]`, `[0].first_name`, `data.items[2]["display name"]`.
//! An optional leading `$` is accepted; the empty string addresses the root.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// One step of a node path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object member by key.
    Key(String),
    /// Array element by zero-based index.
    Index(usize),
}

/// A parsed path addressing one node of a JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodePath {
    segments: Vec<PathSegment>,
}

impl NodePath {
    /// The path addressing the document root.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parses a path expression.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidNodePath` for empty keys, unterminated
    /// brackets or quotes, and non-numeric unquoted indices.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let trimmed = input.trim();
        let body = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let mut parser = Parser {
            input,
            chars: body.chars().peekable(),
            segments: Vec::new(),
        };
        parser.run()?;
        Ok(Self {
            segments: parser.segments,
        })
    }

    /// Parsed segments in order.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns true if this path addresses the root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns a new path with a key appended.
    #[must_use]
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.segments.push(PathSegment::Key(key.into()));
        next
    }

    /// Returns a new path with an index appended.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.segments.push(PathSegment::Index(index));
        next
    }

    /// Returns the concatenation of this path and `other`.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        let mut next = self.clone();
        next.segments.extend(other.segments.iter().cloned());
        next
    }

    /// Looks up the addressed node, or `None` if any step is missing.
    #[must_use]
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |node, segment| match segment {
                PathSegment::Key(key) => node.as_object()?.get(key),
                PathSegment::Index(index) => node.as_array()?.get(*index),
            })
    }
}

struct Parser<'a> {
    input: &'a str,
    chars: Peekable<Chars<'a>>,
    segments: Vec<PathSegment>,
}

impl Parser<'_> {
    fn error(&self, reason: &str) -> DomainError {
        DomainError::invalid_node_path(self.input, reason)
    }

    fn run(&mut self) -> DomainResult<()> {
        let mut expect_key = false;

        while let Some(&ch) = self.chars.peek() {
            match ch {
                '.' => {
                    self.chars.next();
                    if expect_key {
                        return Err(self.error("empty key between dots"));
                    }
                    if self.segments.is_empty() {
                        // `$.a` and `.a` both start with a separator
                        expect_key = true;
                        continue;
                    }
                    expect_key = true;
                }
                '[' => {
                    if expect_key {
                        return Err(self.error("expected key after '.'"));
                    }
                    self.chars.next();
                    let segment = self.bracket()?;
                    self.segments.push(segment);
                }
                _ => {
                    if !expect_key && !self.segments.is_empty() {
                        return Err(self.error("expected '.' or '[' between segments"));
                    }
                    let key = self.bare_key();
                    self.segments.push(PathSegment::Key(key));
                    expect_key = false;
                }
            }
        }

        if expect_key {
            return Err(self.error("trailing '.'"));
        }
        Ok(())
    }

    fn bare_key(&mut self) -> String {
        let mut key = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch == '.' || ch == '[' {
                break;
            }
            key.push(ch);
            self.chars.next();
        }
        key
    }

    fn bracket(&mut self) -> DomainResult<PathSegment> {
        match self.chars.peek().copied() {
            Some(quote) if quote == '"' || quote == '\'' => {
                self.chars.next();
                let mut key = String::new();
                loop {
                    match self.chars.next() {
                        Some('\\') => match self.chars.next() {
                            Some(escaped) => key.push(escaped),
                            None => return Err(self.error("unterminated escape")),
                        },
                        Some(ch) if ch == quote => break,
                        Some(ch) => key.push(ch),
                        None => return Err(self.error("unterminated quoted key")),
                    }
                }
                if self.chars.next() != Some(']') {
                    return Err(self.error("expected ']' after quoted key"));
                }
                Ok(PathSegment::Key(key))
            }
            _ => {
                let mut digits = String::new();
                loop {
                    match self.chars.next() {
                        Some(']') => break,
                        Some(ch) => digits.push(ch),
                        None => return Err(self.error("unterminated '['")),
                    }
                }
                let digits = digits.trim();
                if digits.is_empty() {
                    return Err(self.error("empty index"));
                }
                digits
                    .parse::<usize>()
                    .map(PathSegment::Index)
                    .map_err(|_| self.error("index must be a non-negative integer"))
            }
        }
    }
}

impl TryFrom<String> for NodePath {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NodePath> for String {
    fn from(value: NodePath) -> Self {
        value.to_string()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("$");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Index(index) => write!(f, "[{index}]")?,
                PathSegment::Key(key) if is_plain_key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathSegment::Key(key) => {
                    let escaped = key.replace('\\', "\\\\").replace('"', "\\\"");
                    write!(f, "[\"{escaped}\"]")?;
                }
            }
        }
        Ok(())
    }
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('$')
        && key.chars().all(|c| c != '.' && c != '[' && c != ']' && c != '"' && c != '\'')
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn key(k: &str) -> PathSegment {
        PathSegment::Key(k.to_string())
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(NodePath::parse("todo").unwrap().segments(), &[key("todo")]);
        assert_eq!(NodePath::parse("[0]").unwrap().segments(), &[PathSegment::Index(0)]);
        assert_eq!(
            NodePath::parse("[0].first_name").unwrap().segments(),
            &[PathSegment::Index(0), key("first_name")]
        );
        assert_eq!(
            NodePath::parse("$.data.items[2][\"display name\"]").unwrap().segments(),
            &[key("data"), key("items"), PathSegment::Index(2), key("display name")]
        );
        assert!(NodePath::parse("").unwrap().is_root());
        assert!(NodePath::parse("$").unwrap().is_root());
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["a..b", "a.", "[x]", "[", "[]", "a[0]b", "[\"open]", "a.[0]"] {
            assert!(NodePath::parse(bad).is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_display_is_canonical() {
        let path = NodePath::parse("$.users[3]['odd.key'].name").unwrap();
        assert_eq!(path.to_string(), "users[3][\"odd.key\"].name");
        assert_eq!(NodePath::parse(&path.to_string()).unwrap(), path);
        assert_eq!(NodePath::root().to_string(), "$");
    }

    #[test]
    fn test_resolve() {
        let doc = json!([{"id": 1, "first_name": "Maurise"}, {"id": 2}]);
        let first = NodePath::parse("[0].first_name").unwrap();
        assert_eq!(first.resolve(&doc), Some(&json!("Maurise")));

        assert_eq!(NodePath::parse("[1].first_name").unwrap().resolve(&doc), None);
        assert_eq!(NodePath::parse("[5]").unwrap().resolve(&doc), None);
        assert_eq!(NodePath::parse("id").unwrap().resolve(&doc), None);
        assert_eq!(NodePath::root().resolve(&doc), Some(&doc));
    }

    #[test]
    fn test_builders() {
        let path = NodePath::root().index(0).key("city");
        assert_eq!(path.to_string(), "[0].city");
        let joined = NodePath::parse("data").unwrap().join(&path);
        assert_eq!(joined.to_string(), "data[0].city");
    }
}
