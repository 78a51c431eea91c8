//! Node classification and slot access.
//!
//! A node is any [`Value`]. Containers (arrays and objects) own children
//! addressed by a [`Key`]; every other value is a scalar leaf.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shape of a node, decided at visit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Ordered, index-addressed container (`Value::Array`).
    Sequence,
    /// String-keyed container (`Value::Object`).
    Mapping,
    /// Leaf value; never descended into.
    Scalar,
}

impl NodeKind {
    /// Classifies a value.
    #[inline]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Array(_) => NodeKind::Sequence,
            Value::Object(_) => NodeKind::Mapping,
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                NodeKind::Scalar
            }
        }
    }

    /// Returns true for sequences and mappings.
    #[inline]
    pub const fn is_container(self) -> bool {
        matches!(self, NodeKind::Sequence | NodeKind::Mapping)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Sequence => "Sequence",
            NodeKind::Mapping => "Mapping",
            NodeKind::Scalar => "Scalar",
        };
        f.write_str(name)
    }
}

/// Address of a child within its immediate container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// Position in a sequence.
    Index(usize),
    /// Name in a mapping.
    Name(String),
}

impl Key {
    /// Looks up this key in `container`.
    ///
    /// Returns `None` when the container has a different shape or the key is
    /// absent.
    pub fn get<'a>(&self, container: &'a Value) -> Option<&'a Value> {
        match (self, container) {
            (Key::Index(index), Value::Array(items)) => items.get(*index),
            (Key::Name(name), Value::Object(map)) => map.get(name),
            _ => None,
        }
    }

    /// Mutable counterpart of [`Key::get`].
    pub fn get_mut<'a>(&self, container: &'a mut Value) -> Option<&'a mut Value> {
        match (self, container) {
            (Key::Index(index), Value::Array(items)) => items.get_mut(*index),
            (Key::Name(name), Value::Object(map)) => map.get_mut(name),
            _ => None,
        }
    }

    /// Removes this key's slot from `container`, returning the removed value.
    ///
    /// Removing from a sequence shifts every later element down by one.
    pub fn remove(&self, container: &mut Value) -> Option<Value> {
        match (self, container) {
            (Key::Index(index), Value::Array(items)) if *index < items.len() => {
                Some(items.remove(*index))
            }
            (Key::Name(name), Value::Object(map)) => map.remove(name),
            _ => None,
        }
    }

    /// Returns the index if this is a sequence key.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(index) => Some(*index),
            Key::Name(_) => None,
        }
    }

    /// Returns the name if this is a mapping key.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Index(_) => None,
            Key::Name(name) => Some(name),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(index) => write!(f, "{index}"),
            Key::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

/// Follows `path` down from `root`.
pub(crate) fn resolve<'a>(root: &'a Value, path: &[Key]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, key| key.get(node))
}

/// Follows `path` down from `root`, mutably.
pub(crate) fn resolve_mut<'a>(root: &'a mut Value, path: &[Key]) -> Option<&'a mut Value> {
    path.iter().try_fold(root, |node, key| key.get_mut(node))
}
