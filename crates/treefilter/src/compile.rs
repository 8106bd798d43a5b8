//! Predicate compiler.
//!
//! [`compile`] lowers a [`QueryTree`] into a [`Predicate`]: an immutable
//! evaluator tree that owns everything it needs. Between bounds are parsed
//! once here; regexes were already compiled when their leaves were built.
//!
//! Compilation never fails. Leaves that cannot be evaluated meaningfully
//! compile to conditions that never match, so one bad leaf cannot abort
//! filtering of a whole collection.

use tracing::{debug, warn};

use crate::clause::{Condition, FilterLeaf, Test};
use crate::query::{Combinator, QueryNode, QueryTree};
use crate::record::{FieldPath, Record};

/// A compiled query, testing whether a record matches.
///
/// Predicates are immutable and `Send + Sync`, so one predicate can be
/// shared across threads.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use treefilter::{QueryNode, QueryTree};
///
/// let predicate = QueryTree::new(vec![QueryNode::contains("microscopist", "av")]).compile();
///
/// let records = vec![
///     json!({"microscopist": "Gavin Murphy"}),
///     json!({"microscopist": "Davi Ortega"}),
///     json!({"microscopist": "Bill Tivol"}),
/// ];
///
/// let matched = predicate.filter(&records);
/// assert_eq!(matched.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Predicate {
    root: Compiled,
}

#[derive(Debug, Clone)]
enum Compiled {
    Leaf {
        path: FieldPath,
        condition: Condition,
        negate: bool,
    },
    Group {
        op: Combinator,
        args: Vec<Compiled>,
        negate: bool,
    },
}

/// Compiles a query tree into a predicate.
///
/// The root nodes are combined exactly like an AND group.
pub fn compile(tree: &QueryTree) -> Predicate {
    let root = Compiled::Group {
        op: Combinator::And,
        args: tree.nodes().iter().map(lower_node).collect(),
        negate: false,
    };
    debug!(nodes = tree.nodes().len(), depth = tree.depth(), "compiled query tree");
    Predicate { root }
}

fn lower_node(node: &QueryNode) -> Compiled {
    match node {
        QueryNode::Filter(leaf) => lower_leaf(leaf),
        QueryNode::Group(group) => Compiled::Group {
            op: group.op,
            args: group.args.iter().map(lower_node).collect(),
            negate: group.negate,
        },
    }
}

fn lower_leaf(leaf: &FilterLeaf) -> Compiled {
    let condition = Condition::lower(&leaf.test);
    if let (Condition::Never, Test::Between(raw)) = (&condition, &leaf.test) {
        warn!(field = %leaf.field, bounds = %raw, "between bounds are not two finite numbers \"low;high\", leaf will never match");
    }
    Compiled::Leaf {
        path: leaf.field.clone(),
        condition,
        negate: leaf.negate,
    }
}

impl Compiled {
    fn eval<R: Record>(&self, record: &R) -> bool {
        match self {
            Compiled::Leaf {
                path,
                condition,
                negate,
            } => condition.matches(&record.resolve(path)) != *negate,
            Compiled::Group { op, args, negate } => {
                let result = match op {
                    Combinator::And => args.iter().all(|arg| arg.eval(record)),
                    Combinator::Or => args.iter().any(|arg| arg.eval(record)),
                };
                result != *negate
            }
        }
    }
}

impl Predicate {
    /// Tests if a single record matches.
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        self.root.eval(record)
    }

    /// Returns this predicate as a closure, for use with iterator adapters.
    ///
    /// ```
    /// use serde_json::json;
    /// use treefilter::{QueryNode, QueryTree};
    ///
    /// let predicate = QueryTree::new(vec![QueryNode::less_than("NCBItaxID", 1078)]).compile();
    /// let is_match = predicate.as_fn::<serde_json::Value>();
    ///
    /// let records = vec![json!({"NCBItaxID": 1076}), json!({"NCBItaxID": 80880})];
    /// let ids: Vec<_> = records.iter().filter(|record| is_match(*record)).collect();
    /// assert_eq!(ids.len(), 1);
    /// ```
    pub fn as_fn<R: Record>(&self) -> impl Fn(&R) -> bool + '_ {
        move |record: &R| self.matches(record)
    }

    /// Filters a slice, returning references to matching records in order.
    pub fn filter<'a, R: Record>(&self, records: &'a [R]) -> Vec<&'a R> {
        records
            .iter()
            .filter(|record| self.matches(*record))
            .collect()
    }

    /// Filters and clones matching records.
    pub fn filter_cloned<R: Record + Clone>(&self, records: &[R]) -> Vec<R> {
        self.filter(records).into_iter().cloned().collect()
    }

    /// Counts the number of matching records.
    pub fn count<R: Record>(&self, records: &[R]) -> usize {
        records
            .iter()
            .filter(|record| self.matches(*record))
            .count()
    }
}
