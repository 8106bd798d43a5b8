//! Search types for filter leaves.
//!
//! The [`SearchType`] enum names every comparison a leaf can perform,
//! organized by the operand type it accepts. Not all search types are valid
//! for all operands.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::LeafError;

/// Comparison mode of a filter leaf (the wire field `searchType`).
///
/// Search types are grouped by the operand (`searchFor`) they accept:
/// - **String**: `Contains`, `Exact`, `StartsWith`, `EndsWith`, `Regex`, `Between`
/// - **Number**: `ExactValue`, `LessThan`, `GreaterThan`
///
/// `Between` takes a string operand of the form `"<low>;<high>"` but
/// compares numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchType {
    // String operands
    /// Literal substring match.
    Contains,
    /// String equality.
    Exact,
    /// Literal prefix match.
    StartsWith,
    /// Literal suffix match.
    EndsWith,
    /// Unanchored regular expression match.
    Regex,
    /// Exclusive numeric range, bounds given as `"low;high"`.
    Between,

    // Number operands
    /// Numeric equality.
    ExactValue,
    /// Strictly less than.
    LessThan,
    /// Strictly greater than.
    GreaterThan,
}

impl SearchType {
    /// All search types, in wire order.
    pub const ALL: [SearchType; 9] = [
        SearchType::Contains,
        SearchType::Exact,
        SearchType::StartsWith,
        SearchType::EndsWith,
        SearchType::Regex,
        SearchType::Between,
        SearchType::ExactValue,
        SearchType::LessThan,
        SearchType::GreaterThan,
    ];

    /// Returns `true` if this search type takes a string operand.
    pub fn is_string_op(self) -> bool {
        matches!(
            self,
            SearchType::Contains
                | SearchType::Exact
                | SearchType::StartsWith
                | SearchType::EndsWith
                | SearchType::Regex
                | SearchType::Between
        )
    }

    /// Returns `true` if this search type takes a number operand.
    pub fn is_number_op(self) -> bool {
        matches!(
            self,
            SearchType::ExactValue | SearchType::LessThan | SearchType::GreaterThan
        )
    }

    /// Evaluates a numeric comparison given the ordering of field vs operand.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            SearchType::ExactValue => ordering == Ordering::Equal,
            SearchType::LessThan => ordering == Ordering::Less,
            SearchType::GreaterThan => ordering == Ordering::Greater,
            _ => false, // Not an ordering-based search type
        }
    }

    /// Returns the wire name of this search type.
    pub fn as_str(self) -> &'static str {
        match self {
            SearchType::Contains => "contains",
            SearchType::Exact => "exact",
            SearchType::StartsWith => "startsWith",
            SearchType::EndsWith => "endsWith",
            SearchType::Regex => "regex",
            SearchType::Between => "between",
            SearchType::ExactValue => "exactValue",
            SearchType::LessThan => "lessThan",
            SearchType::GreaterThan => "greaterThan",
        }
    }
}

impl FromStr for SearchType {
    type Err = LeafError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchType::ALL
            .into_iter()
            .find(|search_type| search_type.as_str() == s)
            .ok_or_else(|| LeafError::UnknownSearchType(s.to_string()))
    }
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
