//! Immutable, structurally shared state snapshots.
//!
//! A [`StateTree`] is a cheap-to-clone handle to an immutable JSON-like node.
//! Container nodes hold their children as `StateTree` handles, so a modified
//! copy of a tree only allocates fresh nodes along the modified path and shares
//! every other branch with the original. Handle identity is observable through
//! [`StateTree::ptr_eq`]; consumers use it to skip work when nothing changed.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

use crate::path::StatePath;

/// A single node of a [`StateTree`].
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<StateTree>),
    Object(BTreeMap<String, StateTree>),
}

/// Shared handle to an immutable state node.
#[derive(Clone)]
pub struct StateTree(Arc<Node>);

impl StateTree {
    /// Wrap a node in a new handle.
    pub fn new(node: Node) -> Self {
        Self(Arc::new(node))
    }

    pub fn null() -> Self {
        Self::new(Node::Null)
    }

    /// An object with no keys; the usual root of a fresh state.
    pub fn empty_object() -> Self {
        Self::new(Node::Object(BTreeMap::new()))
    }

    /// Build an object node from key/value pairs.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, StateTree)>,
    {
        Self::new(Node::Object(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// The node behind this handle.
    pub fn node(&self) -> &Node {
        &self.0
    }

    /// Returns `true` if both handles point at the same node allocation.
    pub fn ptr_eq(a: &StateTree, b: &StateTree) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.node(), Node::Null)
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, StateTree>> {
        match self.node() {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[StateTree]> {
        match self.node() {
            Node::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.node() {
            Node::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.node() {
            Node::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.node() {
            Node::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Look up a direct child: an object key, or an array index when the
    /// segment is a decimal number.
    pub fn child(&self, segment: &str) -> Option<&StateTree> {
        match self.node() {
            Node::Object(map) => map.get(segment),
            Node::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Read the subtree at `path`. Missing locations yield `None`.
    pub fn get_path(&self, path: &StatePath) -> Option<&StateTree> {
        path.segments()
            .iter()
            .try_fold(self, |node, segment| node.child(segment))
    }

    /// Convert into an owned `serde_json::Value`.
    pub fn to_value(&self) -> Value {
        match self.node() {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => Value::Number(n.clone()),
            Node::String(s) => Value::String(s.clone()),
            Node::Array(items) => Value::Array(items.iter().map(StateTree::to_value).collect()),
            Node::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
        }
    }
}

impl PartialEq for StateTree {
    fn eq(&self, other: &Self) -> bool {
        StateTree::ptr_eq(self, other) || self.0 == other.0
    }
}

impl Default for StateTree {
    fn default() -> Self {
        Self::empty_object()
    }
}

impl From<Value> for StateTree {
    fn from(value: Value) -> Self {
        let node = match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => Node::Number(n),
            Value::String(s) => Node::String(s),
            Value::Array(items) => Node::Array(items.into_iter().map(StateTree::from).collect()),
            Value::Object(map) => Node::Object(
                map.into_iter()
                    .map(|(k, v)| (k, StateTree::from(v)))
                    .collect(),
            ),
        };
        Self::new(node)
    }
}

impl From<&StateTree> for Value {
    fn from(tree: &StateTree) -> Self {
        tree.to_value()
    }
}

impl From<Node> for StateTree {
    fn from(node: Node) -> Self {
        Self::new(node)
    }
}

impl Serialize for StateTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.node() {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Number(n) => n.serialize(serializer),
            Node::String(s) => serializer.serialize_str(s),
            Node::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for StateTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(StateTree::from)
    }
}

impl fmt::Display for StateTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl fmt::Debug for StateTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(p: &str) -> StatePath {
        StatePath::parse(p).unwrap()
    }

    #[test]
    fn value_round_trip() {
        let value = json!({"user": {"name": "ada", "tags": [1, 2.5, null, true]}});
        let tree = StateTree::from(value.clone());
        assert_eq!(tree.to_value(), value);
    }

    #[test]
    fn get_path_through_objects_and_arrays() {
        let tree = StateTree::from(json!({"todos": [{"title": "a"}, {"title": "b"}]}));
        assert_eq!(
            tree.get_path(&path("todos.1.title")).and_then(StateTree::as_str),
            Some("b")
        );
        assert!(tree.get_path(&path("todos.2.title")).is_none());
        assert!(tree.get_path(&path("todos.x")).is_none());
        assert!(tree.get_path(&path("missing.deeper")).is_none());
    }

    #[test]
    fn scalar_has_no_children() {
        let tree = StateTree::from(json!({"count": 3}));
        assert!(tree.get_path(&path("count.inner")).is_none());
    }

    #[test]
    fn deep_equality_and_identity() {
        let a = StateTree::from(json!({"s": [1, {"x": "y"}]}));
        let b = StateTree::from(json!({"s": [1, {"x": "y"}]}));
        let c = a.clone();

        assert_eq!(a, b);
        assert!(!StateTree::ptr_eq(&a, &b));
        assert!(StateTree::ptr_eq(&a, &c));
        assert_ne!(a, StateTree::from(json!({"s": [1, {"x": "z"}]})));
    }

    #[test]
    fn serializes_like_json() {
        let tree = StateTree::from(json!({"b": [1, "two"], "a": null}));
        assert_eq!(tree.to_string(), r#"{"a":null,"b":[1,"two"]}"#);

        let parsed: StateTree = serde_json::from_str(r#"{"a":null,"b":[1,"two"]}"#).unwrap();
        assert_eq!(parsed, tree);
    }

    #[test]
    fn object_builder() {
        let tree = StateTree::object([
            ("one", StateTree::from(json!(1))),
            ("two", StateTree::from(json!("2"))),
        ]);
        assert_eq!(tree.to_value(), json!({"one": 1, "two": "2"}));
    }

    #[test]
    fn default_is_empty_object() {
        let tree = StateTree::default();
        assert!(tree.as_object().is_some_and(BTreeMap::is_empty));
    }
}
