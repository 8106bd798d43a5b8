//! Typed query trees.
//!
//! A [`QueryTree`] is an ordered list of [`QueryNode`]s combined with an
//! implicit AND. Each node is either a [`FilterLeaf`] or a [`Group`] that
//! combines its arguments with AND or OR. Any node can be negated.
//!
//! Trees are usually produced by the facade from JSON input, but can also be
//! built in code:
//!
//! ```
//! use treefilter::{QueryNode, QueryTree};
//!
//! let tree = QueryTree::new(vec![
//!     QueryNode::exact("speciesName", "Campylobacter jejuni"),
//!     QueryNode::or(vec![
//!         QueryNode::exact("microscopist", "Davi Ortega"),
//!         QueryNode::exact("microscopist", "Alasdair McDowall"),
//!     ]),
//! ]);
//!
//! assert_eq!(
//!     tree.to_string(),
//!     r#"(speciesName == "Campylobacter jejuni" && (microscopist == "Davi Ortega" || microscopist == "Alasdair McDowall"))"#
//! );
//! ```

use std::fmt;
use std::str::FromStr;

use crate::clause::{FilterLeaf, Test};
use crate::compile::{compile, Predicate};
use crate::error::{LeafError, MalformedQueryError};
use crate::op::SearchType;
use crate::record::FieldPath;
use crate::value::Number;

/// Boolean operator of a [`Group`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Every argument must match.
    And,
    /// At least one argument must match.
    Or,
}

impl Combinator {
    /// Returns the wire tag of this combinator.
    pub fn as_str(self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Combinator::And => "&&",
            Combinator::Or => "||",
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Child conditions combined with one operator.
#[derive(Debug, Clone)]
pub struct Group {
    pub op: Combinator,
    pub args: Vec<QueryNode>,
    pub negate: bool,
}

/// A node of a query tree.
#[derive(Debug, Clone)]
pub enum QueryNode {
    /// A single field condition.
    Filter(FilterLeaf),
    /// An AND/OR combination of child nodes.
    Group(Group),
}

impl QueryNode {
    // ========================================================================
    // Leaf constructors
    // ========================================================================

    /// Field contains `needle` as a literal substring.
    pub fn contains(field: impl Into<FieldPath>, needle: impl Into<String>) -> Self {
        Self::filter(field, Test::Contains(needle.into()))
    }

    /// Field equals `value` exactly.
    pub fn exact(field: impl Into<FieldPath>, value: impl Into<String>) -> Self {
        Self::filter(field, Test::Exact(value.into()))
    }

    /// Field starts with `prefix`.
    pub fn starts_with(field: impl Into<FieldPath>, prefix: impl Into<String>) -> Self {
        Self::filter(field, Test::StartsWith(prefix.into()))
    }

    /// Field ends with `suffix`.
    pub fn ends_with(field: impl Into<FieldPath>, suffix: impl Into<String>) -> Self {
        Self::filter(field, Test::EndsWith(suffix.into()))
    }

    /// Field matches `pattern` anywhere.
    ///
    /// Returns an error if the pattern is invalid.
    pub fn regex(field: impl Into<FieldPath>, pattern: &str) -> Result<Self, LeafError> {
        let test = Test::new(SearchType::Regex, pattern.into())?;
        Ok(Self::filter(field, test))
    }

    /// Field lies strictly between `low` and `high`.
    pub fn between(field: impl Into<FieldPath>, low: f64, high: f64) -> Self {
        Self::filter(field, Test::Between(format!("{low};{high}")))
    }

    /// Field equals `value` numerically.
    pub fn exact_value(field: impl Into<FieldPath>, value: impl Into<Number>) -> Self {
        Self::filter(field, Test::ExactValue(value.into()))
    }

    /// Field is strictly less than `value`.
    pub fn less_than(field: impl Into<FieldPath>, value: impl Into<Number>) -> Self {
        Self::filter(field, Test::LessThan(value.into()))
    }

    /// Field is strictly greater than `value`.
    pub fn greater_than(field: impl Into<FieldPath>, value: impl Into<Number>) -> Self {
        Self::filter(field, Test::GreaterThan(value.into()))
    }

    /// Wraps an already-built test.
    pub fn filter(field: impl Into<FieldPath>, test: Test) -> Self {
        QueryNode::Filter(FilterLeaf::new(field, test))
    }

    // ========================================================================
    // Combinators
    // ========================================================================

    /// All of `args` must match. An empty AND matches everything.
    pub fn and(args: Vec<QueryNode>) -> Self {
        Self::group(Combinator::And, args)
    }

    /// Any of `args` must match. An empty OR matches nothing.
    pub fn or(args: Vec<QueryNode>) -> Self {
        Self::group(Combinator::Or, args)
    }

    /// Combines `args` with `op`.
    pub fn group(op: Combinator, args: Vec<QueryNode>) -> Self {
        QueryNode::Group(Group {
            op,
            args,
            negate: false,
        })
    }

    /// Inverts this node's result.
    ///
    /// Negation applies to the node as a whole and is never pushed into
    /// children. Negating twice restores the original node.
    pub fn negate(mut self) -> Self {
        match &mut self {
            QueryNode::Filter(leaf) => leaf.negate = !leaf.negate,
            QueryNode::Group(group) => group.negate = !group.negate,
        }
        self
    }

    /// Returns `true` if this node is negated.
    pub fn is_negated(&self) -> bool {
        match self {
            QueryNode::Filter(leaf) => leaf.negate,
            QueryNode::Group(group) => group.negate,
        }
    }

    /// Returns the combinator nesting depth below and including this node.
    ///
    /// A leaf has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            QueryNode::Filter(_) => 0,
            QueryNode::Group(group) => {
                1 + group.args.iter().map(QueryNode::depth).max().unwrap_or(0)
            }
        }
    }
}

impl From<FilterLeaf> for QueryNode {
    fn from(leaf: FilterLeaf) -> Self {
        QueryNode::Filter(leaf)
    }
}

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryNode::Filter(leaf) => write!(f, "{leaf}"),
            QueryNode::Group(group) => {
                if group.negate {
                    write!(f, "!(")?;
                    if group.args.len() > 1 {
                        write_members(f, group.op, &group.args)?;
                    } else {
                        write_joined(f, group.op, &group.args)?;
                    }
                    write!(f, ")")
                } else {
                    write_joined(f, group.op, &group.args)
                }
            }
        }
    }
}

/// Writes `args` joined by `op`, parenthesized when there is more than one.
fn write_joined(f: &mut fmt::Formatter<'_>, op: Combinator, args: &[QueryNode]) -> fmt::Result {
    match args {
        [] => write!(f, "{}", op == Combinator::And),
        [only] => write!(f, "{only}"),
        _ => {
            write!(f, "(")?;
            write_members(f, op, args)?;
            write!(f, ")")
        }
    }
}

fn write_members(f: &mut fmt::Formatter<'_>, op: Combinator, args: &[QueryNode]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", op.symbol())?;
        }
        write!(f, "{arg}")?;
    }
    Ok(())
}

/// A complete query: root nodes combined with an implicit AND.
#[derive(Debug, Clone, Default)]
pub struct QueryTree {
    nodes: Vec<QueryNode>,
}

impl QueryTree {
    /// Creates a tree from its root nodes.
    pub fn new(nodes: Vec<QueryNode>) -> Self {
        QueryTree { nodes }
    }

    /// Returns the root nodes.
    pub fn nodes(&self) -> &[QueryNode] {
        &self.nodes
    }

    /// Returns `true` if the tree has no nodes (matches everything).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the deepest combinator nesting among the root nodes.
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(QueryNode::depth).max().unwrap_or(0)
    }

    /// Compiles this tree into a predicate.
    pub fn compile(&self) -> Predicate {
        compile(self)
    }

    /// Validates a JSON query tree.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, MalformedQueryError> {
        crate::facade::parse_query(value)
    }
}

impl From<Vec<QueryNode>> for QueryTree {
    fn from(nodes: Vec<QueryNode>) -> Self {
        QueryTree::new(nodes)
    }
}

impl FromIterator<QueryNode> for QueryTree {
    fn from_iter<I: IntoIterator<Item = QueryNode>>(iter: I) -> Self {
        QueryTree::new(iter.into_iter().collect())
    }
}

/// Parses JSON text.
impl FromStr for QueryTree {
    type Err = MalformedQueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: serde_json::Value = serde_json::from_str(s)?;
        QueryTree::from_json(&value)
    }
}

/// Renders the boolean expression the tree denotes.
impl fmt::Display for QueryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, Combinator::And, &self.nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_leaf_renders_without_parens() {
        let tree = QueryTree::new(vec![QueryNode::contains("microscopist", "av")]);
        assert_eq!(tree.to_string(), r#"microscopist contains "av""#);
    }

    #[test]
    fn root_siblings_render_as_and() {
        let tree = QueryTree::new(vec![
            QueryNode::contains("microscopist", "Matt Swulius"),
            QueryNode::contains("institution", "Caltech"),
        ]);
        assert_eq!(
            tree.to_string(),
            r#"(microscopist contains "Matt Swulius" && institution contains "Caltech")"#
        );
    }

    #[test]
    fn negated_group_wraps_whole_group() {
        let node = QueryNode::or(vec![
            QueryNode::exact("lab", "Jensen Lab"),
            QueryNode::exact("institution", "ETDB"),
        ])
        .negate();
        assert_eq!(
            node.to_string(),
            r#"!(lab == "Jensen Lab" || institution == "ETDB")"#
        );
    }

    #[test]
    fn negated_single_argument_group() {
        let node = QueryNode::and(vec![QueryNode::exact("lab", "Jensen Lab")]).negate();
        assert_eq!(node.to_string(), r#"!(lab == "Jensen Lab")"#);

        let nested = QueryNode::and(vec![QueryNode::or(vec![
            QueryNode::exact("lab", "Jensen Lab"),
            QueryNode::exact("institution", "ETDB"),
        ])])
        .negate();
        assert_eq!(
            nested.to_string(),
            r#"!((lab == "Jensen Lab" || institution == "ETDB"))"#
        );
    }

    #[test]
    fn single_argument_group_renders_as_its_child() {
        let node = QueryNode::and(vec![QueryNode::greater_than("NCBItaxID", 90000i64)]);
        assert_eq!(node.to_string(), "NCBItaxID > 90000");
    }

    #[test]
    fn empty_groups_render_as_constants() {
        assert_eq!(QueryNode::and(vec![]).to_string(), "true");
        assert_eq!(QueryNode::or(vec![]).to_string(), "false");
        assert_eq!(QueryTree::default().to_string(), "true");
    }

    #[test]
    fn negate_toggles() {
        let node = QueryNode::exact_value("NCBItaxID", 1076i64);
        assert!(!node.is_negated());
        let node = node.negate();
        assert!(node.is_negated());
        assert!(!node.negate().is_negated());
    }

    #[test]
    fn between_constructor_formats_bounds() {
        let node = QueryNode::between("NCBItaxID", 5000.0, 10000.0);
        assert_eq!(node.to_string(), r#"NCBItaxID between "5000;10000""#);
    }

    #[test]
    fn depth() {
        let tree = QueryTree::new(vec![
            QueryNode::exact("speciesName", "Halothiobacillus neapolitanus"),
            QueryNode::or(vec![
                QueryNode::exact("microscopist", "Cristina Iancu"),
                QueryNode::and(vec![
                    QueryNode::exact("microscopist", "Matt Swulius"),
                    QueryNode::exact("lab", "Jensen Lab"),
                ]),
            ]),
        ]);
        assert_eq!(tree.depth(), 2);
        assert_eq!(QueryTree::default().depth(), 0);
    }

    #[test]
    fn regex_constructor_rejects_bad_pattern() {
        assert!(QueryNode::regex("microscopist", "[a-").is_err());
        assert!(QueryNode::regex("microscopist", "^Davi").is_ok());
    }

    #[test]
    fn combinator_tags() {
        assert_eq!(Combinator::And.to_string(), "AND");
        assert_eq!(Combinator::Or.as_str(), "OR");
    }
}
