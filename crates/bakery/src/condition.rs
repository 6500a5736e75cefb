//! Caveat conditions: `key <op> value`.
//!
//! The canonical text form has exactly one space on each side of the
//! operator. Its UTF-8 bytes are both the first-party caveat predicate and
//! the message sealed for a third party.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A condition that cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse condition {input:?}: {reason}")]
pub struct ParseError {
    /// The offending text.
    pub input: String,
    /// What was wrong with it.
    pub reason: &'static str,
}

impl ParseError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`: the presented value is less than the condition value.
    LessThan,
    /// `<=`
    LessOrEqual,
    /// `>`: the presented value is greater than the condition value.
    GreaterThan,
    /// `>=`
    GreaterOrEqual,
}

impl Operator {
    /// All operators, in symbol-length order.
    pub const ALL: [Operator; 6] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::LessThan,
        Operator::LessOrEqual,
        Operator::GreaterThan,
        Operator::GreaterOrEqual,
    ];

    /// Textual symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterOrEqual => ">=",
        }
    }

    /// Parse a symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Equal => ordering == Ordering::Equal,
            Self::NotEqual => ordering != Ordering::Equal,
            Self::LessThan => ordering == Ordering::Less,
            Self::LessOrEqual => ordering != Ordering::Greater,
            Self::GreaterThan => ordering == Ordering::Greater,
            Self::GreaterOrEqual => ordering != Ordering::Less,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A parsed caveat predicate. Immutable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    key: String,
    operator: Operator,
    value: String,
}

impl Condition {
    /// Build a condition, validating each part.
    pub fn new(
        key: impl Into<String>,
        operator: Operator,
        value: impl Into<String>,
    ) -> Result<Self, ParseError> {
        let key = key.into();
        let value = value.into();

        if key.is_empty() {
            return Err(ParseError::new(&key, "empty key"));
        }
        if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ParseError::new(&key, "key must be alphanumeric or '_'"));
        }
        if value.is_empty() {
            return Err(ParseError::new(&value, "empty value"));
        }
        if value.starts_with(char::is_whitespace) {
            return Err(ParseError::new(&value, "value starts with whitespace"));
        }

        Ok(Self {
            key,
            operator,
            value,
        })
    }

    /// `key = value`
    pub fn equal(key: impl Into<String>, value: impl Into<String>) -> Result<Self, ParseError> {
        Self::new(key, Operator::Equal, value)
    }

    /// Parse the canonical text form.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let (key, rest) = text
            .split_once(' ')
            .ok_or_else(|| ParseError::new(text, "expected `key <op> value`"))?;
        let (symbol, value) = rest
            .split_once(' ')
            .ok_or_else(|| ParseError::new(text, "expected a single space around the operator"))?;
        let operator = Operator::from_symbol(symbol)
            .ok_or_else(|| ParseError::new(text, "unknown operator"))?;

        Self::new(key, operator, value).map_err(|e| ParseError::new(text, e.reason))
    }

    /// Parse predicate bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        let text = std::str::from_utf8(bytes).map_err(|_| ParseError {
            input: String::from_utf8_lossy(bytes).into_owned(),
            reason: "not UTF-8",
        })?;
        Self::parse(text)
    }

    /// Canonical byte encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether `candidate` satisfies this condition.
    ///
    /// Ordering operators compare numerically when both sides are integers
    /// and lexicographically otherwise.
    pub fn is_satisfied_by(&self, candidate: &str) -> bool {
        let ordering = match (candidate.parse::<i64>(), self.value.parse::<i64>()) {
            (Ok(a), Ok(b)) if self.operator != Operator::Equal && self.operator != Operator::NotEqual => {
                a.cmp(&b)
            }
            _ => candidate.cmp(self.value.as_str()),
        };
        self.operator.holds(ordering)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.key, self.operator, self.value)
    }
}

impl FromStr for Condition {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
