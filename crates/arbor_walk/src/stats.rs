//! Per-traversal counters.

use serde::Serialize;

/// Summary of a finished traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WalkStats {
    /// Nodes handed to the decision function, the root included.
    pub visited: usize,
    /// Slots overwritten by [`Decision::Replace`](crate::Decision::Replace).
    pub replaced: usize,
    /// Slots removed by [`Decision::Delete`](crate::Decision::Delete).
    pub deleted: usize,
    /// Whether the traversal ended through an Exit flow.
    pub exited: bool,
}

impl WalkStats {
    /// Returns true if the traversal changed the structure.
    pub fn is_modified(&self) -> bool {
        self.replaced > 0 || self.deleted > 0
    }
}
