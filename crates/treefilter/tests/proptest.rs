//! Property-based tests for treefilter using proptest.

use proptest::prelude::*;
use serde_json::{json, Value};
use treefilter::{QueryNode, QueryTree};

// ============================================================================
// Test helpers
// ============================================================================

#[derive(Debug, Clone)]
struct TestItem {
    value: Option<i64>,
    name: String,
}

impl TestItem {
    fn to_json(&self) -> Value {
        match self.value {
            Some(value) => json!({"name": self.name, "value": value}),
            None => json!({"name": self.name}),
        }
    }

    fn nested(&self) -> Value {
        json!({"outer": {"inner": self.to_json()}})
    }
}

/// A leaf description that can be built against any field prefix.
#[derive(Debug, Clone)]
enum LeafShape {
    Contains(String),
    Exact(String),
    StartsWith(String),
    EndsWith(String),
    LessThan(i64),
    GreaterThan(i64),
    ExactValue(i64),
    Between(i64, i64),
}

impl LeafShape {
    fn build(&self, prefix: &str) -> QueryNode {
        let name = format!("{prefix}name");
        let value = format!("{prefix}value");
        match self {
            LeafShape::Contains(s) => QueryNode::contains(name, s.as_str()),
            LeafShape::Exact(s) => QueryNode::exact(name, s.as_str()),
            LeafShape::StartsWith(s) => QueryNode::starts_with(name, s.as_str()),
            LeafShape::EndsWith(s) => QueryNode::ends_with(name, s.as_str()),
            LeafShape::LessThan(n) => QueryNode::less_than(value, *n),
            LeafShape::GreaterThan(n) => QueryNode::greater_than(value, *n),
            LeafShape::ExactValue(n) => QueryNode::exact_value(value, *n),
            LeafShape::Between(low, high) => QueryNode::between(value, *low as f64, *high as f64),
        }
    }
}

fn test_item_strategy() -> impl Strategy<Value = TestItem> {
    (prop::option::of(-1000i64..1000), "[a-c]{0,6}")
        .prop_map(|(value, name)| TestItem { value, name })
}

fn leaf_shape_strategy() -> impl Strategy<Value = LeafShape> {
    prop_oneof![
        "[a-c]{0,3}".prop_map(LeafShape::Contains),
        "[a-c]{0,3}".prop_map(LeafShape::Exact),
        "[a-c]{0,3}".prop_map(LeafShape::StartsWith),
        "[a-c]{0,3}".prop_map(LeafShape::EndsWith),
        (-1000i64..1000).prop_map(LeafShape::LessThan),
        (-1000i64..1000).prop_map(LeafShape::GreaterThan),
        (-1000i64..1000).prop_map(LeafShape::ExactValue),
        (-1000i64..1000, -1000i64..1000).prop_map(|(low, high)| LeafShape::Between(low, high)),
    ]
}

fn leaf_strategy() -> impl Strategy<Value = QueryNode> {
    leaf_shape_strategy().prop_map(|shape| shape.build(""))
}

/// Random trees of AND/OR groups over leaves, each node possibly negated.
fn node_strategy() -> impl Strategy<Value = QueryNode> {
    leaf_strategy().prop_recursive(3, 24, 4, |inner| {
        (prop::collection::vec(inner, 1..4), any::<bool>(), any::<bool>()).prop_map(
            |(args, is_or, negate)| {
                let node = if is_or {
                    QueryNode::or(args)
                } else {
                    QueryNode::and(args)
                };
                if negate {
                    node.negate()
                } else {
                    node
                }
            },
        )
    })
}

fn matches(nodes: Vec<QueryNode>, record: &Value) -> bool {
    QueryTree::new(nodes).compile().matches(record)
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Filter should never return more items than the input.
    #[test]
    fn filter_never_grows_collection(
        items in prop::collection::vec(test_item_strategy(), 0..50),
        leaf in leaf_strategy(),
    ) {
        let records: Vec<Value> = items.iter().map(TestItem::to_json).collect();
        let predicate = QueryTree::new(vec![leaf]).compile();
        prop_assert!(predicate.filter(&records).len() <= records.len());
    }

    /// A negated node matches exactly the records the node does not.
    #[test]
    fn negation_is_complement(item in test_item_strategy(), leaf in leaf_strategy()) {
        let record = item.to_json();
        let plain = matches(vec![leaf.clone()], &record);
        let negated = matches(vec![leaf.negate()], &record);
        prop_assert_ne!(plain, negated);
    }

    /// Negating a group inverts the whole group.
    #[test]
    fn group_negation_is_complement(
        item in test_item_strategy(),
        leaves in prop::collection::vec(leaf_strategy(), 0..6),
    ) {
        let record = item.to_json();
        prop_assert_ne!(
            matches(vec![QueryNode::or(leaves.clone())], &record),
            matches(vec![QueryNode::or(leaves).negate()], &record)
        );
    }

    /// Negating twice restores the original result.
    #[test]
    fn double_negation_is_identity(item in test_item_strategy(), leaf in leaf_strategy()) {
        let record = item.to_json();
        prop_assert_eq!(
            matches(vec![leaf.clone()], &record),
            matches(vec![leaf.negate().negate()], &record)
        );
    }

    /// Sibling order never changes the result of AND or OR.
    #[test]
    fn sibling_order_is_irrelevant(
        item in test_item_strategy(),
        leaves in prop::collection::vec(leaf_strategy(), 0..6),
    ) {
        let record = item.to_json();
        let mut reversed = leaves.clone();
        reversed.reverse();

        prop_assert_eq!(
            matches(vec![QueryNode::and(leaves.clone())], &record),
            matches(vec![QueryNode::and(reversed.clone())], &record)
        );
        prop_assert_eq!(
            matches(vec![QueryNode::or(leaves)], &record),
            matches(vec![QueryNode::or(reversed)], &record)
        );
    }

    /// Root siblings behave exactly like an explicit AND group.
    #[test]
    fn root_is_and(
        item in test_item_strategy(),
        leaves in prop::collection::vec(leaf_strategy(), 0..6),
    ) {
        let record = item.to_json();
        prop_assert_eq!(
            matches(leaves.clone(), &record),
            matches(vec![QueryNode::and(leaves)], &record)
        );
    }

    /// Compiling the same tree twice gives predicates that agree on every record.
    #[test]
    fn compile_is_idempotent(
        nodes in prop::collection::vec(node_strategy(), 0..4),
        items in prop::collection::vec(test_item_strategy(), 0..20),
    ) {
        let tree = QueryTree::new(nodes);
        let first = tree.compile();
        let second = tree.compile();

        let records: Vec<Value> = items.iter().map(TestItem::to_json).collect();
        for record in &records {
            prop_assert_eq!(first.matches(record), second.matches(record));
        }
        prop_assert_eq!(first.count(&records), second.count(&records));
    }

    /// Between never includes its bounds.
    #[test]
    fn between_is_exclusive(value in -1000i64..1000, low in -1000i64..1000, high in -1000i64..1000) {
        let record = json!({"value": value});
        let expected = low < value && value < high;
        prop_assert_eq!(
            matches(vec![QueryNode::between("value", low as f64, high as f64)], &record),
            expected
        );
    }

    /// Contains agrees with literal substring search, even on regex characters.
    #[test]
    fn contains_is_literal(name in "[a-c.*]{0,6}", needle in "[a-c.*]{0,3}") {
        let record = json!({"name": name});
        prop_assert_eq!(
            matches(vec![QueryNode::contains("name", needle.as_str())], &record),
            name.contains(needle.as_str())
        );
    }

    /// A leaf on a nested path behaves like the same leaf on a flat record.
    #[test]
    fn nested_path_matches_flat_path(item in test_item_strategy(), shape in leaf_shape_strategy()) {
        prop_assert_eq!(
            matches(vec![shape.build("")], &item.to_json()),
            matches(vec![shape.build("outer.inner.")], &item.nested())
        );
    }
}
