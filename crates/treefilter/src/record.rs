//! Records and field paths.
//!
//! A [`Record`] is any nested key/value structure a predicate can be tested
//! against. Fields are located by a [`FieldPath`], a dot-separated list of
//! keys walked left to right.

use crate::value::{Number, Value};

/// Trait for nested key/value structures that can be filtered.
///
/// Implementations are provided for `serde_json::Value` and
/// `serde_yaml::Value`. Other structures only need to expose child lookup
/// and a scalar projection.
///
/// # Manual Implementation
///
/// ```
/// use treefilter::{Record, Value};
///
/// enum Node {
///     Leaf(String),
///     Branch(Vec<(String, Node)>),
/// }
///
/// impl Record for Node {
///     fn field(&self, key: &str) -> Option<&Self> {
///         match self {
///             Node::Branch(children) => children
///                 .iter()
///                 .find(|(name, _)| name == key)
///                 .map(|(_, child)| child),
///             Node::Leaf(_) => None,
///         }
///     }
///
///     fn value(&self) -> Value<'_> {
///         match self {
///             Node::Leaf(s) => Value::String(s),
///             Node::Branch(_) => Value::None,
///         }
///     }
/// }
/// ```
pub trait Record {
    /// Returns the child stored under `key`, if this is a keyed structure
    /// containing it.
    fn field(&self, key: &str) -> Option<&Self>;

    /// Returns the scalar view of this node.
    ///
    /// Nested structures and nulls should return [`Value::None`].
    fn value(&self) -> Value<'_>;

    /// Resolves a field path to a scalar value.
    ///
    /// Returns [`Value::None`] if any segment along the path is missing.
    fn resolve(&self, path: &FieldPath) -> Value<'_> {
        let mut current = self;
        for segment in path.segments() {
            match current.field(segment) {
                Some(child) => current = child,
                None => return Value::None,
            }
        }
        current.value()
    }
}

impl Record for serde_json::Value {
    fn field(&self, key: &str) -> Option<&Self> {
        self.as_object()?.get(key)
    }

    fn value(&self) -> Value<'_> {
        match self {
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Number(n) => Value::Number(Number::from(n)),
            serde_json::Value::Bool(b) => Value::Bool(*b),
            _ => Value::None,
        }
    }
}

impl Record for serde_yaml::Value {
    fn field(&self, key: &str) -> Option<&Self> {
        self.as_mapping()?.get(key)
    }

    fn value(&self) -> Value<'_> {
        match self {
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Number(n) => Value::Number(Number::from(n)),
            serde_yaml::Value::Bool(b) => Value::Bool(*b),
            serde_yaml::Value::Tagged(tagged) => tagged.value.value(),
            _ => Value::None,
        }
    }
}

/// Dot-separated location of a possibly nested field, e.g.
/// `level1.level2.microscopist`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parses a dotted path, rejecting empty paths and empty segments.
    pub fn parse(path: &str) -> Option<Self> {
        if path.is_empty() || path.split('.').any(str::is_empty) {
            return None;
        }
        Some(FieldPath::from(path))
    }

    /// Returns the keys of this path, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Returns the number of keys in this path.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

/// Splits on dots without validation; an empty segment simply never
/// resolves.
impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        FieldPath {
            segments: path.split('.').map(str::to_string).collect(),
        }
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        FieldPath::from(path.as_str())
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_valid_paths() {
        let path = FieldPath::parse("level1.level2.microscopist").unwrap();
        assert_eq!(path.depth(), 3);
        assert_eq!(
            path.segments().collect::<Vec<_>>(),
            ["level1", "level2", "microscopist"]
        );
        assert_eq!(path.to_string(), "level1.level2.microscopist");

        assert_eq!(FieldPath::parse("NCBItaxID").unwrap().depth(), 1);
    }

    #[test]
    fn parse_rejects_empty_segments() {
        assert!(FieldPath::parse("").is_none());
        assert!(FieldPath::parse(".lab").is_none());
        assert!(FieldPath::parse("lab.").is_none());
        assert!(FieldPath::parse("level1..lab").is_none());
    }

    #[test]
    fn resolve_flat_field() {
        let record = json!({"microscopist": "Davi Ortega", "NCBItaxID": 80880});
        assert_eq!(
            record.resolve(&"microscopist".into()),
            Value::String("Davi Ortega")
        );
        assert_eq!(
            record.resolve(&"NCBItaxID".into()),
            Value::Number(Number::I64(80880))
        );
    }

    #[test]
    fn resolve_nested_field() {
        let record = json!({"level1": {"level2": {"microscopist": "Davi Ortega"}}});
        assert_eq!(
            record.resolve(&"level1.level2.microscopist".into()),
            Value::String("Davi Ortega")
        );
    }

    #[test]
    fn resolve_missing_segments() {
        let record = json!({"level1": {"level2": {"microscopist": "Davi Ortega"}}});
        assert_eq!(record.resolve(&"level1.missing.microscopist".into()), Value::None);
        assert_eq!(record.resolve(&"biologist".into()), Value::None);
        // Walking through a scalar stops resolution
        assert_eq!(
            record.resolve(&"level1.level2.microscopist.first".into()),
            Value::None
        );
    }

    #[test]
    fn non_scalars_project_to_none() {
        let record = json!({"level1": {"a": 1}, "tags": ["a", "b"], "notes": null});
        assert_eq!(record.resolve(&"level1".into()), Value::None);
        assert_eq!(record.resolve(&"tags".into()), Value::None);
        assert_eq!(record.resolve(&"notes".into()), Value::None);
        // Arrays are not indexed
        assert_eq!(record.resolve(&"tags.0".into()), Value::None);
    }

    #[test]
    fn resolve_yaml_record() {
        let record: serde_yaml::Value = serde_yaml::from_str(
            "level1:\n  microscopist: Gavin Murphy\n  tiltMin: -65\n  dual: true\n",
        )
        .unwrap();
        assert_eq!(
            record.resolve(&"level1.microscopist".into()),
            Value::String("Gavin Murphy")
        );
        assert_eq!(
            record.resolve(&"level1.tiltMin".into()),
            Value::Number(Number::I64(-65))
        );
        assert_eq!(record.resolve(&"level1.dual".into()), Value::Bool(true));
        assert_eq!(record.resolve(&"level1.lab".into()), Value::None);
    }
}
