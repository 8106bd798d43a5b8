//! Filter leaves.
//!
//! A [`FilterLeaf`] is a single field condition: a field path, a [`Test`]
//! (search type paired with its operand), and a negation flag. Search type
//! and operand are checked together when the test is built, so a `Test`
//! always describes a meaningful comparison.

use regex::{Regex, RegexBuilder};

use crate::error::LeafError;
use crate::op::SearchType;
use crate::record::FieldPath;
use crate::value::{Number, Value};

/// Default compiled-size limit for `regex` patterns, in bytes.
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 1 << 20;

/// The `searchFor` operand of a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// String operand.
    Text(String),
    /// Numeric operand.
    Number(Number),
}

impl Operand {
    /// Returns the operand type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Operand::Text(_) => "string",
            Operand::Number(_) => "number",
        }
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::Text(s.to_string())
    }
}

impl From<String> for Operand {
    fn from(s: String) -> Self {
        Operand::Text(s)
    }
}

impl From<Number> for Operand {
    fn from(n: Number) -> Self {
        Operand::Number(n)
    }
}

impl From<i64> for Operand {
    fn from(n: i64) -> Self {
        Operand::Number(Number::I64(n))
    }
}

impl From<f64> for Operand {
    fn from(n: f64) -> Self {
        Operand::Number(Number::F64(n))
    }
}

/// A search type paired with an operand of the matching type.
#[derive(Debug, Clone)]
pub enum Test {
    /// Field contains the literal substring.
    Contains(String),
    /// Field equals the string.
    Exact(String),
    /// Field starts with the literal prefix.
    StartsWith(String),
    /// Field ends with the literal suffix.
    EndsWith(String),
    /// Field matches the compiled pattern anywhere.
    Regex(Regex),
    /// Field lies strictly between the bounds of a `"low;high"` string.
    ///
    /// The bounds are parsed at compile time; an unparseable string yields
    /// a condition that never matches.
    Between(String),
    /// Field equals the number.
    ExactValue(Number),
    /// Field is strictly less than the number.
    LessThan(Number),
    /// Field is strictly greater than the number.
    GreaterThan(Number),
}

impl Test {
    /// Builds a test from a search type and operand.
    ///
    /// Returns an error if the operand type does not fit the search type or
    /// a regex pattern does not compile.
    pub fn new(search_type: SearchType, operand: Operand) -> Result<Self, LeafError> {
        Self::with_regex_limit(search_type, operand, DEFAULT_REGEX_SIZE_LIMIT)
    }

    /// Like [`Test::new`], with an explicit compiled-size limit for regex
    /// patterns.
    pub fn with_regex_limit(
        search_type: SearchType,
        operand: Operand,
        size_limit: usize,
    ) -> Result<Self, LeafError> {
        let test = match (search_type, operand) {
            (SearchType::Contains, Operand::Text(s)) => Test::Contains(s),
            (SearchType::Exact, Operand::Text(s)) => Test::Exact(s),
            (SearchType::StartsWith, Operand::Text(s)) => Test::StartsWith(s),
            (SearchType::EndsWith, Operand::Text(s)) => Test::EndsWith(s),
            (SearchType::Regex, Operand::Text(s)) => {
                Test::Regex(RegexBuilder::new(&s).size_limit(size_limit).build()?)
            }
            (SearchType::Between, Operand::Text(s)) => Test::Between(s),
            (SearchType::ExactValue, Operand::Number(n)) => Test::ExactValue(n),
            (SearchType::LessThan, Operand::Number(n)) => Test::LessThan(n),
            (SearchType::GreaterThan, Operand::Number(n)) => Test::GreaterThan(n),
            (search_type, operand) => {
                return Err(LeafError::OperandType {
                    search_type,
                    operand: operand.type_name(),
                })
            }
        };
        Ok(test)
    }

    /// Returns the search type of this test.
    pub fn search_type(&self) -> SearchType {
        match self {
            Test::Contains(_) => SearchType::Contains,
            Test::Exact(_) => SearchType::Exact,
            Test::StartsWith(_) => SearchType::StartsWith,
            Test::EndsWith(_) => SearchType::EndsWith,
            Test::Regex(_) => SearchType::Regex,
            Test::Between(_) => SearchType::Between,
            Test::ExactValue(_) => SearchType::ExactValue,
            Test::LessThan(_) => SearchType::LessThan,
            Test::GreaterThan(_) => SearchType::GreaterThan,
        }
    }
}

impl std::fmt::Display for Test {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Test::Exact(s) => write!(f, "== {s:?}"),
            Test::Regex(re) => write!(f, "=~ /{}/", re.as_str()),
            Test::ExactValue(n) => write!(f, "== {n}"),
            Test::LessThan(n) => write!(f, "< {n}"),
            Test::GreaterThan(n) => write!(f, "> {n}"),
            Test::Contains(s) | Test::StartsWith(s) | Test::EndsWith(s) | Test::Between(s) => {
                write!(f, "{} {s:?}", self.search_type())
            }
        }
    }
}

/// A single field condition.
#[derive(Debug, Clone)]
pub struct FilterLeaf {
    /// The field to test.
    pub field: FieldPath,
    /// The comparison to apply.
    pub test: Test,
    /// Invert the result.
    pub negate: bool,
}

impl FilterLeaf {
    /// Creates a non-negated leaf.
    pub fn new(field: impl Into<FieldPath>, test: Test) -> Self {
        FilterLeaf {
            field: field.into(),
            test,
            negate: false,
        }
    }
}

impl std::fmt::Display for FilterLeaf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negate {
            write!(f, "!({} {})", self.field, self.test)
        } else {
            write!(f, "{} {}", self.field, self.test)
        }
    }
}

/// Exclusive numeric range parsed from a `"low;high"` string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub low: f64,
    pub high: f64,
}

impl Bounds {
    /// Parses `"low;high"`. Both parts are trimmed and must parse as finite
    /// `f64` values.
    pub fn parse(s: &str) -> Option<Self> {
        let (low, high) = s.split_once(';')?;
        let bounds = Bounds {
            low: low.trim().parse().ok()?,
            high: high.trim().parse().ok()?,
        };
        (bounds.low.is_finite() && bounds.high.is_finite()).then_some(bounds)
    }

    /// Returns `true` if `n` lies strictly between the bounds.
    ///
    /// Swapped bounds (`low > high`) contain nothing.
    pub fn contains(self, n: Number) -> bool {
        let n = n.to_f64();
        n > self.low && n < self.high
    }
}

/// A test lowered for evaluation.
#[derive(Debug, Clone)]
pub(crate) enum Condition {
    /// Literal string comparison.
    Text(SearchType, String),
    Regex(Regex),
    Range(Bounds),
    /// Ordering comparison against a number.
    Numeric(SearchType, Number),
    /// Degenerate condition that never matches.
    Never,
}

impl Condition {
    pub(crate) fn lower(test: &Test) -> Self {
        match test {
            Test::Contains(s) | Test::Exact(s) | Test::StartsWith(s) | Test::EndsWith(s) => {
                Condition::Text(test.search_type(), s.clone())
            }
            Test::Regex(re) => Condition::Regex(re.clone()),
            Test::Between(raw) => match Bounds::parse(raw) {
                Some(bounds) => Condition::Range(bounds),
                None => Condition::Never,
            },
            Test::ExactValue(n) | Test::LessThan(n) | Test::GreaterThan(n) => {
                Condition::Numeric(test.search_type(), *n)
            }
        }
    }

    /// Evaluates this condition against a field value.
    ///
    /// Returns `false` if the value doesn't match or if the types are
    /// incompatible.
    pub(crate) fn matches(&self, field_value: &Value<'_>) -> bool {
        match (self, field_value) {
            (Condition::Text(search_type, pattern), Value::String(s)) => {
                match_text(*search_type, s, pattern)
            }
            (Condition::Regex(regex), Value::String(s)) => regex.is_match(s),
            (Condition::Range(bounds), Value::Number(n)) => bounds.contains(*n),
            (Condition::Numeric(search_type, clause), Value::Number(n)) => {
                match_number(*search_type, *n, *clause)
            }
            // A missing field never matches any positive assertion
            (_, Value::None) => false,
            // Type mismatch, including Never
            _ => false,
        }
    }
}

fn match_text(search_type: SearchType, field: &str, pattern: &str) -> bool {
    match search_type {
        SearchType::Contains => field.contains(pattern),
        SearchType::Exact => field == pattern,
        SearchType::StartsWith => field.starts_with(pattern),
        SearchType::EndsWith => field.ends_with(pattern),
        _ => false,
    }
}

fn match_number(search_type: SearchType, field: Number, clause: Number) -> bool {
    match field.compare(clause) {
        Some(ordering) => search_type.eval_ordering(ordering),
        None => false, // NaN comparison
    }
}
