//! Ancestor chain handed to decision functions.
//!
//! The chain describes how the node being visited is reached from the root:
//! one [`AncestorFrame`] per level, outermost first. It is a read-only view
//! over the traversed value and the walker's key stack, so it never owns a
//! container and costs nothing to build.

use std::fmt;

use serde_json::Value;

use crate::node::Key;

/// One step of the path to the current node: `container[key]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AncestorFrame<'a> {
    /// The container holding the next node on the path.
    pub container: &'a Value,
    /// Key of that node within `container`.
    pub key: &'a Key,
}

impl<'a> AncestorFrame<'a> {
    /// The node this frame points at.
    pub fn node(&self) -> Option<&'a Value> {
        self.key.get(self.container)
    }
}

/// Path from the root to the node currently being visited.
///
/// `len()` equals the node's depth: the root is visited with an empty chain,
/// and the last frame of a non-empty chain identifies the current node inside
/// its immediate container.
#[derive(Debug, Clone, Copy)]
pub struct AncestorChain<'a> {
    root: &'a Value,
    keys: &'a [Key],
}

impl<'a> AncestorChain<'a> {
    pub(crate) fn new(root: &'a Value, keys: &'a [Key]) -> Self {
        Self { root, keys }
    }

    /// Number of frames, equal to the depth of the current node.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true when the root itself is being visited.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Depth of the current node (the root has depth 0).
    #[inline]
    pub fn depth(&self) -> usize {
        self.keys.len()
    }

    /// The value the traversal started from.
    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// Keys along the path, outermost first.
    pub fn keys(&self) -> &'a [Key] {
        self.keys
    }

    /// Iterates over the frames, outermost first.
    pub fn frames(&self) -> Frames<'a> {
        Frames {
            current: Some(self.root),
            keys: self.keys.iter(),
        }
    }

    /// Returns the frame at `index` (0 is the root's child).
    pub fn get(&self, index: usize) -> Option<AncestorFrame<'a>> {
        self.frames().nth(index)
    }

    /// The frame identifying the current node within its immediate container.
    pub fn last(&self) -> Option<AncestorFrame<'a>> {
        self.frames().last()
    }

    /// The immediate container of the current node.
    pub fn parent(&self) -> Option<&'a Value> {
        self.last().map(|frame| frame.container)
    }

    /// The key of the current node within its parent.
    pub fn key(&self) -> Option<&'a Key> {
        self.keys.last()
    }

    /// RFC 6901 JSON Pointer to the current node.
    ///
    /// The root is the empty pointer `""`.
    pub fn pointer(&self) -> String {
        let mut pointer = String::new();
        for key in self.keys {
            pointer.push('/');
            match key {
                Key::Index(index) => pointer.push_str(&index.to_string()),
                Key::Name(name) => pointer.push_str(&name.replace('~', "~0").replace('/', "~1")),
            }
        }
        pointer
    }
}

/// Renders the path as `$`, `$.name`, `$.list[0]`.
impl fmt::Display for AncestorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for key in self.keys {
            match key {
                Key::Index(index) => write!(f, "[{index}]")?,
                Key::Name(name) => write!(f, ".{name}")?,
            }
        }
        Ok(())
    }
}

/// Iterator over the frames of an [`AncestorChain`].
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    current: Option<&'a Value>,
    keys: std::slice::Iter<'a, Key>,
}

impl<'a> Iterator for Frames<'a> {
    type Item = AncestorFrame<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let container = self.current?;
        let key = self.keys.next()?;
        self.current = key.get(container);
        Some(AncestorFrame { container, key })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.current {
            Some(_) => (0, Some(self.keys.len())),
            None => (0, Some(0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn path() -> Vec<Key> {
        vec![Key::from("a"), Key::Index(1), Key::from("b/c~d")]
    }

    #[test]
    fn root_chain_is_empty() {
        let root = json!({"a": 1});
        let chain = AncestorChain::new(&root, &[]);

        assert!(chain.is_empty());
        assert_eq!(chain.len(), 0);
        assert!(chain.last().is_none());
        assert!(chain.parent().is_none());
        assert_eq!(chain.frames().count(), 0);
        assert_eq!(chain.pointer(), "");
        assert_eq!(chain.to_string(), "$");
    }

    #[test]
    fn frames_follow_the_path() {
        let root = json!({"a": [0, {"b/c~d": "leaf"}]});
        let keys = path();
        let chain = AncestorChain::new(&root, &keys);

        assert_eq!(chain.len(), 3);
        assert_eq!(chain.depth(), 3);

        let frames: Vec<_> = chain.frames().collect();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].container, &root);
        assert_eq!(frames[0].key, &Key::from("a"));
        assert_eq!(frames[1].container, &json!([0, {"b/c~d": "leaf"}]));
        assert_eq!(frames[1].key, &Key::Index(1));
        assert_eq!(frames[2].container, &json!({"b/c~d": "leaf"}));

        let last = chain.last().unwrap();
        assert_eq!(last.node(), Some(&json!("leaf")));
        assert_eq!(chain.parent(), Some(&json!({"b/c~d": "leaf"})));
        assert_eq!(chain.key(), Some(&Key::from("b/c~d")));
        assert_eq!(chain.get(1).map(|f| f.key), Some(&Key::Index(1)));
        assert!(chain.get(3).is_none());
    }

    #[test]
    fn pointer_escapes_reserved_characters() {
        let root = json!({"a": [0, {"b/c~d": "leaf"}]});
        let keys = path();
        let chain = AncestorChain::new(&root, &keys);

        assert_eq!(chain.pointer(), "/a/1/b~1c~0d");
        assert_eq!(root.pointer(&chain.pointer()), Some(&json!("leaf")));
        assert_eq!(chain.to_string(), "$.a[1].b/c~d");
    }
}
