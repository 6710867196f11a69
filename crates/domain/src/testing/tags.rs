//! Cucumber-style tag expressions for selecting scenarios.
//!
//! `@functional`, `not @slow`, `@smoke and (@users or @city)`.

use std::fmt;

use crate::error::{DomainError, DomainResult};

/// A parsed tag filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagExpression {
    /// Matches scenarios carrying this tag.
    Tag(String),
    /// Negation.
    Not(Box<Self>),
    /// Both operands must match.
    And(Box<Self>, Box<Self>),
    /// Either operand must match.
    Or(Box<Self>, Box<Self>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Tag(String),
    Not,
    And,
    Or,
    Open,
    Close,
}

impl TagExpression {
    /// Parses an expression.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTagExpression` on empty input, tags not
    /// starting with `@`, dangling operators or unbalanced parentheses.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(DomainError::invalid_tags(input, "empty expression"));
        }
        let mut parser = Parser {
            input,
            tokens,
            pos: 0,
        };
        let expr = parser.or()?;
        if parser.pos != parser.tokens.len() {
            return Err(DomainError::invalid_tags(input, "unexpected trailing tokens"));
        }
        Ok(expr)
    }

    /// Evaluates the expression against a scenario's tags.
    #[must_use]
    pub fn matches<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        match self {
            Self::Tag(tag) => tags.iter().any(|t| t.as_ref() == tag),
            Self::Not(inner) => !inner.matches(tags),
            Self::And(left, right) => left.matches(tags) && right.matches(tags),
            Self::Or(left, right) => left.matches(tags) || right.matches(tags),
        }
    }
}

impl fmt::Display for TagExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(tag) => f.write_str(tag),
            Self::Not(inner) => write!(f, "not {inner}"),
            Self::And(left, right) => write!(f, "({left} and {right})"),
            Self::Or(left, right) => write!(f, "({left} or {right})"),
        }
    }
}

fn tokenize(input: &str) -> DomainResult<Vec<Token>> {
    let spaced = input.replace('(', " ( ").replace(')', " ) ");
    spaced
        .split_whitespace()
        .map(|word| match word {
            "(" => Ok(Token::Open),
            ")" => Ok(Token::Close),
            "not" => Ok(Token::Not),
            "and" => Ok(Token::And),
            "or" => Ok(Token::Or),
            tag if tag.starts_with('@') && tag.len() > 1 => Ok(Token::Tag(tag.to_string())),
            other => Err(DomainError::invalid_tags(
                input,
                format!("'{other}' is not a tag or operator"),
            )),
        })
        .collect()
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn or(&mut self) -> DomainResult<TagExpression> {
        let mut left = self.and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let right = self.and()?;
            left = TagExpression::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> DomainResult<TagExpression> {
        let mut left = self.unary()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let right = self.unary()?;
            left = TagExpression::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> DomainResult<TagExpression> {
        let token = self.peek().cloned();
        self.pos += 1;
        match token {
            Some(Token::Not) => Ok(TagExpression::Not(Box::new(self.unary()?))),
            Some(Token::Tag(tag)) => Ok(TagExpression::Tag(tag)),
            Some(Token::Open) => {
                let inner = self.or()?;
                if self.peek() != Some(&Token::Close) {
                    return Err(DomainError::invalid_tags(self.input, "missing ')'"));
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(Token::Close | Token::And | Token::Or) => Err(DomainError::invalid_tags(
                self.input,
                "operator or ')' where a tag was expected",
            )),
            None => Err(DomainError::invalid_tags(self.input, "unexpected end of expression")),
        }
    }
}
