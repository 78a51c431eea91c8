//! Synchronous walker.
//!
//! The decision function runs to completion for every node before the walker
//! moves on.
//!
//! # Example
//!
//! ```rust
//! use arbor_walk::{Decision, walk};
//! use serde_json::json;
//!
//! let mut data = json!({"a": [1, 2, 3, 2, 4]});
//! walk(&mut data, |node, _chain| {
//!     (node == &json!(2)).then(Decision::delete)
//! })
//! .unwrap();
//! assert_eq!(data, json!({"a": [1, 3, 4]}));
//! ```

use serde_json::Value;
use tracing::debug;

use crate::chain::AncestorChain;
use crate::config::WalkConfig;
use crate::cursor::Traversal;
use crate::decision::Decision;
use crate::{WalkError, WalkStats};

/// Walks `root` depth-first, pre-order, mutating it in place.
///
/// `decide` is called once per node with the node and its ancestor chain and
/// returns a [`Decision`], or `None` for [`Decision::Continue`].
///
/// # Errors
///
/// Returns [`WalkError::InvalidRootMutation`] if the root's decision is a
/// Replace or Delete; the root is left untouched.
pub fn walk<F, D>(root: &mut Value, decide: F) -> Result<(), WalkError>
where
    F: FnMut(&Value, &AncestorChain<'_>) -> D,
    D: Into<Option<Decision>>,
{
    Walker::with_defaults().walk(root, decide).map(|_| ())
}

/// Like [`walk()`], with an explicit configuration, returning traversal counters.
pub fn walk_with<F, D>(root: &mut Value, config: &WalkConfig, decide: F) -> Result<WalkStats, WalkError>
where
    F: FnMut(&Value, &AncestorChain<'_>) -> D,
    D: Into<Option<Decision>>,
{
    Walker::new(config.clone()).walk(root, decide)
}

/// Reusable synchronous walker.
#[derive(Debug, Clone, Default)]
pub struct Walker {
    config: WalkConfig,
}

impl Walker {
    /// Creates a new `Walker` with the given configuration.
    pub fn new(config: WalkConfig) -> Self {
        Self { config }
    }

    /// Creates a new `Walker` with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(WalkConfig::default())
    }

    /// Returns the walker's configuration.
    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    /// Walks `root`, see [`walk()`].
    pub fn walk<F, D>(&self, root: &mut Value, mut decide: F) -> Result<WalkStats, WalkError>
    where
        F: FnMut(&Value, &AncestorChain<'_>) -> D,
        D: Into<Option<Decision>>,
    {
        debug!(max_depth = ?self.config.max_depth, "Starting traversal");

        let mut traversal = Traversal::new(&self.config);
        loop {
            let decision = match traversal.next(root)? {
                Some(visit) => decide(visit.node, &visit.chain).into(),
                None => break,
            };
            if traversal.apply(root, decision)?.is_break() {
                break;
            }
        }

        let stats = traversal.finish();
        debug!(
            visited = stats.visited,
            replaced = stats.replaced,
            deleted = stats.deleted,
            exited = stats.exited,
            "Traversal finished"
        );
        Ok(stats)
    }
}
