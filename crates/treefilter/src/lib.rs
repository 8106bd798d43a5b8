//! Treefilter - compile JSON query trees into record predicates.
//!
//! A query is a tree of filter leaves combined with AND/OR and optional
//! negation. Treefilter validates the tree once and compiles it into a
//! [`Predicate`] that tests single records: nested key/value structures
//! such as `serde_json::Value`. No code is ever generated from query input.
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use treefilter::make_filter_predicate;
//!
//! let query = json!([
//!     { "type": "filter", "searchOn": "speciesName", "searchFor": "Campylobacter jejuni", "searchType": "exact" },
//!     { "type": "OR", "args": [
//!         { "type": "filter", "searchOn": "microscopist", "searchFor": "Davi Ortega", "searchType": "exact" },
//!         { "type": "filter", "searchOn": "microscopist", "searchFor": "Alasdair McDowall", "searchType": "exact" }
//!     ]}
//! ]);
//!
//! let records = vec![
//!     json!({"speciesName": "Campylobacter jejuni", "microscopist": "Davi Ortega"}),
//!     json!({"speciesName": "Campylobacter jejuni", "microscopist": "Gavin Murphy"}),
//!     json!({"speciesName": "Vibrio cholerae", "microscopist": "Alasdair McDowall"}),
//! ];
//!
//! let predicate = make_filter_predicate(&query).unwrap();
//! let matched = predicate.filter(&records);
//! assert_eq!(matched.len(), 1);
//! assert_eq!(matched[0]["microscopist"], "Davi Ortega");
//! ```
//!
//! # Query Semantics
//!
//! - Root nodes are combined with AND.
//! - `AND`/`OR` nodes combine their `args` left to right.
//! - `not: true` inverts the node it is set on, leaf or group, and nothing
//!   else.
//! - A field that is missing, or whose type does not fit the comparison,
//!   never matches. Negating such a leaf therefore always matches.
//!
//! # Search Types
//!
//! | `searchFor` | `searchType` |
//! |------|-----------|
//! | string | `contains`, `exact`, `startsWith`, `endsWith`, `regex`, `between` |
//! | number | `exactValue`, `lessThan`, `greaterThan` |
//!
//! `between` takes `"low;high"` and matches numbers strictly inside the
//! range. Pairing a search type with the wrong operand type is rejected as a
//! [`MalformedQueryError`].

mod clause;
mod compile;
mod error;
mod facade;
mod op;
mod query;
mod record;
mod value;

// Re-export public API
pub use clause::{Bounds, FilterLeaf, Operand, Test, DEFAULT_REGEX_SIZE_LIMIT};
pub use compile::{compile, Predicate};
pub use error::{LeafError, MalformedQueryError, Result};
pub use facade::{
    make_filter_predicate, parse_query, FilterBuilder, FilterOptions, DEFAULT_MAX_DEPTH,
};
pub use op::SearchType;
pub use query::{Combinator, Group, QueryNode, QueryTree};
pub use record::{FieldPath, Record};
pub use value::{Number, Value};
