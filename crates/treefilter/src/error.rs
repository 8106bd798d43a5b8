//! Error types for query validation.

use thiserror::Error;

use crate::op::SearchType;

/// A query tree was rejected before compilation.
///
/// Every variant that refers to a node carries its location in the input,
/// written like `[1].args[0]`.
#[derive(Debug, Error)]
pub enum MalformedQueryError {
    /// The top-level input is not a sequence of nodes.
    #[error("query must be a sequence of nodes, got {0}")]
    NotASequence(&'static str),

    /// The query text is not valid JSON.
    #[error("could not decode query: {0}")]
    Decode(#[from] serde_json::Error),

    /// An element of the query is not a JSON object.
    #[error("{at}: expected a node object, got {found}")]
    NotANode { at: String, found: &'static str },

    /// A node field has the wrong JSON type.
    #[error("{at}: {source}")]
    InvalidNode {
        at: String,
        #[source]
        source: serde_json::Error,
    },

    /// A node's `type` tag is not one of `filter`, `AND` or `OR`.
    #[error("{at}: unrecognized node type '{kind}' (expected filter, AND or OR)")]
    UnknownNodeType { at: String, kind: String },

    /// A required field is absent.
    #[error("{at}: missing required field '{field}'")]
    MissingField { at: String, field: &'static str },

    /// A combinator has no arguments.
    #[error("{at}: {kind} node needs at least one argument")]
    EmptyArgs { at: String, kind: &'static str },

    /// `searchOn` is empty or contains an empty segment.
    #[error("{at}: invalid field path '{path}'")]
    InvalidFieldPath { at: String, path: String },

    /// The leaf's search type and operand do not form a valid condition.
    #[error("{at}: {source}")]
    InvalidLeaf {
        at: String,
        #[source]
        source: LeafError,
    },

    /// Combinators are nested deeper than the configured limit.
    #[error("{at}: nesting exceeds the maximum depth of {max}")]
    TooDeep { at: String, max: usize },
}

/// A search type and operand could not be combined into a condition.
#[derive(Debug, Error)]
pub enum LeafError {
    /// `searchType` names no known mode.
    #[error("unknown search type '{0}'")]
    UnknownSearchType(String),

    /// The search type does not accept this kind of operand.
    #[error("search type '{search_type}' is not valid for {operand} values")]
    OperandType {
        search_type: SearchType,
        operand: &'static str,
    },

    /// `searchFor` is neither a string nor a number.
    #[error("searchFor must be a string or a number, got {0}")]
    UnsupportedOperand(&'static str),

    /// Invalid regular expression pattern.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),
}

/// Result type for query validation.
pub type Result<T> = std::result::Result<T, MalformedQueryError>;
