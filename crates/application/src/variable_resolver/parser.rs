//! Parser for `{{key}}` dataset references
//!
//! Extracts references with their byte spans so the resolver can splice
//! values in without re-scanning.

use std::ops::Range;

/// A `{{key}}` reference found in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference {
    /// The dataset key, trimmed, without the braces.
    pub name: String,

    /// Byte range of the whole `{{...}}` in the original string.
    pub span: Range<usize>,
}

impl VariableReference {
    /// Creates a new reference.
    #[must_use]
    pub fn new(name: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Parses a string and extracts all `{{key}}` references in order.
///
/// Unclosed and empty references are left as literal text.
///
/// # Examples
///
/// ```
/// use covenant_application::variable_resolver::parse_variables;
///
/// let refs = parse_variables("user_{{validUserId}}.json");
/// assert_eq!(refs.len(), 1);
/// assert_eq!(refs[0].name, "validUserId");
/// assert_eq!(refs[0].span, 5..20);
/// ```
#[must_use]
pub fn parse_variables(input: &str) -> Vec<VariableReference> {
    let mut references = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        if ch != '{' || !matches!(chars.peek(), Some((_, '{'))) {
            continue;
        }
        chars.next();

        let mut name = String::new();
        let mut end = None;
        while let Some((_, ch)) = chars.next() {
            if ch == '}' {
                if let Some(&(idx, '}')) = chars.peek() {
                    chars.next();
                    end = Some(idx + 1);
                    break;
                }
            }
            name.push(ch);
        }

        let Some(end) = end else {
            break;
        };
        let name = name.trim();
        if !name.is_empty() {
            references.push(VariableReference::new(name, start..end));
        }
    }

    references
}

/// Returns true if the input contains at least one reference.
#[must_use]
pub fn has_variables(input: &str) -> bool {
    !parse_variables(input).is_empty()
}

/// Extracts just the referenced keys.
#[must_use]
pub fn extract_variable_names(input: &str) -> Vec<String> {
    parse_variables(input).into_iter().map(|r| r.name).collect()
}
