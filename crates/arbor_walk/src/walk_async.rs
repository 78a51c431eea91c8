//! Asynchronous walker.
//!
//! Same traversal as [`walk`](crate::walk()), except that the decision function
//! returns a future. The walker awaits each decision before touching any
//! other node, so visit order and final structure match the synchronous walker
//! no matter how long individual decisions take.
//!
//! # Example
//!
//! ```rust
//! use arbor_walk::{Decision, walk_async};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut data = json!({"a": [1, 2, 3]});
//! walk_async(&mut data, |node, _chain| {
//!     Box::pin(async move {
//!         let decision = (node == &json!(2)).then(|| Decision::replace(99));
//!         Ok::<_, std::convert::Infallible>(decision)
//!     })
//! })
//! .await
//! .unwrap();
//! assert_eq!(data, json!({"a": [1, 99, 3]}));
//! # }
//! ```

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use tracing::debug;

use crate::chain::AncestorChain;
use crate::config::WalkConfig;
use crate::cursor::Traversal;
use crate::decision::Decision;
use crate::error::BoxError;
use crate::{WalkError, WalkStats};

/// Boxed future returned by asynchronous decision functions.
///
/// The future may borrow the node and chain it was created from.
pub type DecideFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Like [`DecideFuture`], for decisions that hold `!Send` state across an
/// await. Accepted by [`walk_async_local`] and [`AsyncWalker::walk_local`].
pub type LocalDecideFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Walks `root` like [`walk`](crate::walk()), awaiting each decision.
///
/// # Errors
///
/// - [`WalkError::InvalidRootMutation`] if the root's decision is a Replace
///   or Delete.
/// - [`WalkError::Decide`] as soon as a decision future fails. Mutations
///   committed before the failure are kept.
pub async fn walk_async<F, D, E>(root: &mut Value, decide: F) -> Result<(), WalkError>
where
    F: for<'a> FnMut(&'a Value, &'a AncestorChain<'a>) -> DecideFuture<'a, Result<D, E>>,
    D: Into<Option<Decision>>,
    E: Into<BoxError>,
{
    AsyncWalker::with_defaults()
        .walk(root, decide)
        .await
        .map(|_| ())
}

/// Like [`walk_async`], with an explicit configuration, returning traversal
/// counters.
pub async fn walk_async_with<F, D, E>(
    root: &mut Value,
    config: &WalkConfig,
    decide: F,
) -> Result<WalkStats, WalkError>
where
    F: for<'a> FnMut(&'a Value, &'a AncestorChain<'a>) -> DecideFuture<'a, Result<D, E>>,
    D: Into<Option<Decision>>,
    E: Into<BoxError>,
{
    AsyncWalker::new(config.clone()).walk(root, decide).await
}

/// Like [`walk_async`], for decision futures that are not `Send`.
///
/// The returned future is not `Send` either; drive it on a single-threaded
/// executor or a `LocalSet`.
pub async fn walk_async_local<F, D, E>(root: &mut Value, decide: F) -> Result<(), WalkError>
where
    F: for<'a> FnMut(&'a Value, &'a AncestorChain<'a>) -> LocalDecideFuture<'a, Result<D, E>>,
    D: Into<Option<Decision>>,
    E: Into<BoxError>,
{
    AsyncWalker::with_defaults()
        .walk_local(root, decide)
        .await
        .map(|_| ())
}

/// Reusable asynchronous walker.
#[derive(Debug, Clone, Default)]
pub struct AsyncWalker {
    config: WalkConfig,
}

impl AsyncWalker {
    /// Creates a new `AsyncWalker` with the given configuration.
    pub fn new(config: WalkConfig) -> Self {
        Self { config }
    }

    /// Creates a new `AsyncWalker` with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(WalkConfig::default())
    }

    /// Returns the walker's configuration.
    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    /// Walks `root`, see [`walk_async`].
    pub async fn walk<F, D, E>(&self, root: &mut Value, mut decide: F) -> Result<WalkStats, WalkError>
    where
        F: for<'a> FnMut(&'a Value, &'a AncestorChain<'a>) -> DecideFuture<'a, Result<D, E>>,
        D: Into<Option<Decision>>,
        E: Into<BoxError>,
    {
        debug!(max_depth = ?self.config.max_depth, "Starting async traversal");

        let mut traversal = Traversal::new(&self.config);
        loop {
            let decision: Option<Decision> = match traversal.next(root)? {
                Some(visit) => decide(visit.node, &visit.chain)
                    .await
                    .map_err(WalkError::decide)?
                    .into(),
                None => break,
            };
            if traversal.apply(root, decision)?.is_break() {
                break;
            }
        }

        Ok(finished(traversal))
    }

    /// Walks `root`, see [`walk_async_local`].
    pub async fn walk_local<F, D, E>(
        &self,
        root: &mut Value,
        mut decide: F,
    ) -> Result<WalkStats, WalkError>
    where
        F: for<'a> FnMut(&'a Value, &'a AncestorChain<'a>) -> LocalDecideFuture<'a, Result<D, E>>,
        D: Into<Option<Decision>>,
        E: Into<BoxError>,
    {
        debug!(max_depth = ?self.config.max_depth, "Starting local async traversal");

        let mut traversal = Traversal::new(&self.config);
        loop {
            let decision: Option<Decision> = match traversal.next(root)? {
                Some(visit) => decide(visit.node, &visit.chain)
                    .await
                    .map_err(WalkError::decide)?
                    .into(),
                None => break,
            };
            if traversal.apply(root, decision)?.is_break() {
                break;
            }
        }

        Ok(finished(traversal))
    }
}

fn finished(traversal: Traversal<'_>) -> WalkStats {
    let stats = traversal.finish();
    debug!(
        visited = stats.visited,
        replaced = stats.replaced,
        deleted = stats.deleted,
        exited = stats.exited,
        "Async traversal finished"
    );
    stats
}
