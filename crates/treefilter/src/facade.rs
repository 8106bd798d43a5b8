//! Filter facade: wire-format decoding and validation.
//!
//! This is the only place malformed input is rejected. A query arrives as a
//! JSON array of nodes:
//!
//! ```json
//! [
//!   { "type": "filter", "searchOn": "speciesName", "searchFor": "Campylobacter jejuni", "searchType": "exact" },
//!   { "type": "OR", "not": false, "args": [
//!     { "type": "filter", "searchOn": "microscopist", "searchFor": "Davi Ortega", "searchType": "exact" },
//!     { "type": "filter", "searchOn": "microscopist", "searchFor": "Alasdair McDowall", "searchType": "exact" }
//!   ]}
//! ]
//! ```
//!
//! Validation turns the wire nodes into a typed [`QueryTree`]; from there on
//! compilation cannot fail.

use serde::Deserialize;
use tracing::debug;

use crate::clause::{FilterLeaf, Operand, Test, DEFAULT_REGEX_SIZE_LIMIT};
use crate::compile::Predicate;
use crate::error::{LeafError, MalformedQueryError, Result};
use crate::op::SearchType;
use crate::query::{Combinator, Group, QueryNode, QueryTree};
use crate::record::FieldPath;
use crate::value::Number;

/// Default maximum combinator nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Limits applied while validating untrusted queries.
///
/// Deserializable so it can live in an application's config file; missing
/// fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterOptions {
    /// Maximum nesting of `AND`/`OR` nodes. A root-level combinator has
    /// depth 1.
    pub max_depth: usize,
    /// Compiled-size limit for `regex` patterns, in bytes.
    pub regex_size_limit: usize,
}

impl Default for FilterOptions {
    fn default() -> Self {
        FilterOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
        }
    }
}

/// Builder for validating queries and producing predicates.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use treefilter::FilterBuilder;
///
/// let query = json!([
///     { "type": "filter", "searchOn": "NCBItaxID", "searchFor": "5000;10000", "searchType": "between" }
/// ]);
///
/// let predicate = FilterBuilder::new()
///     .max_depth(8)
///     .build(&query)
///     .unwrap();
///
/// assert!(predicate.matches(&json!({"NCBItaxID": 7000})));
/// assert!(!predicate.matches(&json!({"NCBItaxID": 10000})));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    options: FilterOptions,
}

impl FilterBuilder {
    /// Creates a builder with default options.
    pub fn new() -> Self {
        FilterBuilder::default()
    }

    /// Creates a builder from existing options.
    pub fn with_options(options: FilterOptions) -> Self {
        FilterBuilder { options }
    }

    /// Sets the maximum combinator nesting depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.options.max_depth = depth;
        self
    }

    /// Sets the compiled-size limit for regex patterns.
    pub fn regex_size_limit(mut self, bytes: usize) -> Self {
        self.options.regex_size_limit = bytes;
        self
    }

    /// Returns the current options.
    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Validates a JSON query into a typed tree.
    pub fn parse(&self, query: &serde_json::Value) -> Result<QueryTree> {
        let result = self.decode(query);
        match &result {
            Ok(tree) => debug!(nodes = tree.nodes().len(), "accepted query"),
            Err(err) => debug!(error = %err, "rejected malformed query"),
        }
        result
    }

    /// Validates JSON text into a typed tree.
    pub fn parse_str(&self, query: &str) -> Result<QueryTree> {
        let value: serde_json::Value = serde_json::from_str(query)?;
        self.parse(&value)
    }

    /// Validates a JSON query and compiles it.
    pub fn build(&self, query: &serde_json::Value) -> Result<Predicate> {
        Ok(self.parse(query)?.compile())
    }

    fn decode(&self, query: &serde_json::Value) -> Result<QueryTree> {
        let Some(nodes) = query.as_array() else {
            return Err(MalformedQueryError::NotASequence(json_type(query)));
        };
        nodes
            .iter()
            .enumerate()
            .map(|(i, node)| self.lower(node, format!("[{i}]"), 0))
            .collect()
    }

    /// Decodes a single node, so type errors carry its location.
    fn lower(&self, node: &serde_json::Value, at: String, level: usize) -> Result<QueryNode> {
        if !node.is_object() {
            return Err(MalformedQueryError::NotANode {
                at,
                found: json_type(node),
            });
        }
        let raw = match RawNode::deserialize(node) {
            Ok(raw) => raw,
            Err(source) => return Err(MalformedQueryError::InvalidNode { at, source }),
        };

        let Some(kind) = raw.kind.as_deref() else {
            return Err(MalformedQueryError::MissingField { at, field: "type" });
        };
        let op = match kind {
            "filter" => return self.lower_leaf(raw, at).map(QueryNode::Filter),
            "AND" => Combinator::And,
            "OR" => Combinator::Or,
            other => {
                return Err(MalformedQueryError::UnknownNodeType {
                    kind: other.to_string(),
                    at,
                })
            }
        };

        let level = level + 1;
        if level > self.options.max_depth {
            return Err(MalformedQueryError::TooDeep {
                at,
                max: self.options.max_depth,
            });
        }

        let args = match raw.args {
            None => return Err(MalformedQueryError::MissingField { at, field: "args" }),
            Some(args) if args.is_empty() => {
                return Err(MalformedQueryError::EmptyArgs {
                    at,
                    kind: op.as_str(),
                })
            }
            Some(args) => args,
        };

        let args = args
            .iter()
            .enumerate()
            .map(|(i, child)| self.lower(child, format!("{at}.args[{i}]"), level))
            .collect::<Result<Vec<_>>>()?;

        Ok(QueryNode::Group(Group {
            op,
            args,
            negate: raw.not,
        }))
    }

    fn lower_leaf(&self, raw: RawNode, at: String) -> Result<FilterLeaf> {
        let Some(search_on) = raw.search_on else {
            return Err(MalformedQueryError::MissingField {
                at,
                field: "searchOn",
            });
        };
        let Some(field) = FieldPath::parse(&search_on) else {
            return Err(MalformedQueryError::InvalidFieldPath {
                at,
                path: search_on,
            });
        };
        let Some(search_for) = raw.search_for else {
            return Err(MalformedQueryError::MissingField {
                at,
                field: "searchFor",
            });
        };
        let Some(search_type) = raw.search_type else {
            return Err(MalformedQueryError::MissingField {
                at,
                field: "searchType",
            });
        };

        let test = operand(search_for)
            .and_then(|operand| {
                let search_type: SearchType = search_type.parse()?;
                Test::with_regex_limit(search_type, operand, self.options.regex_size_limit)
            })
            .map_err(|source| MalformedQueryError::InvalidLeaf { at, source })?;

        Ok(FilterLeaf {
            field,
            test,
            negate: raw.not,
        })
    }
}

/// A query node as it appears on the wire, before validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    #[serde(rename = "type")]
    kind: Option<String>,
    search_on: Option<String>,
    search_for: Option<serde_json::Value>,
    search_type: Option<String>,
    #[serde(default)]
    not: bool,
    /// Children stay undecoded until each is lowered at its own location.
    args: Option<Vec<serde_json::Value>>,
}

fn operand(value: serde_json::Value) -> std::result::Result<Operand, LeafError> {
    match value {
        serde_json::Value::String(s) => Ok(Operand::Text(s)),
        serde_json::Value::Number(n) => Ok(Operand::Number(Number::from(&n))),
        other => Err(LeafError::UnsupportedOperand(json_type(&other))),
    }
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Validates a JSON query into a typed tree with default options.
pub fn parse_query(query: &serde_json::Value) -> Result<QueryTree> {
    FilterBuilder::new().parse(query)
}

/// Validates a JSON query and compiles it into a predicate, with default
/// options.
///
/// Fails with [`MalformedQueryError`] before any record is evaluated if the
/// query shape is invalid.
///
/// ```
/// use serde_json::json;
/// use treefilter::make_filter_predicate;
///
/// let query = json!([
///     { "type": "filter", "searchOn": "microscopist", "searchFor": "av", "searchType": "contains" }
/// ]);
/// let records = vec![
///     json!({"microscopist": "Gavin Murphy"}),
///     json!({"microscopist": "Davi Ortega"}),
///     json!({"microscopist": "Bill Tivol"}),
/// ];
///
/// let predicate = make_filter_predicate(&query).unwrap();
/// let matched: Vec<_> = records.iter().filter(|r| predicate.matches(*r)).collect();
/// assert_eq!(matched.len(), 2);
///
/// let bad = json!([{ "type": "simple", "searchOn": "microscopist", "searchFor": "x", "searchType": "contains" }]);
/// assert!(make_filter_predicate(&bad).is_err());
/// ```
pub fn make_filter_predicate(query: &serde_json::Value) -> Result<Predicate> {
    FilterBuilder::new().build(query)
}
