//! # arbor_walk
//!
//! Single-pass traversal and in-place mutation of nested JSON-like data.
//!
//! A walk visits every node of a [`serde_json::Value`] depth-first, pre-order,
//! and asks a decision function what to do with each one:
//!
//! - [`Decision::Continue`] - descend into the node's children
//! - [`Decision::StepOver`] - skip the node's children
//! - [`Decision::Break`] - skip the node's remaining siblings
//! - [`Decision::Exit`] - stop the traversal
//! - [`Decision::Replace`] - overwrite the node, then apply a [`Flow`]
//! - [`Decision::Delete`] - remove the node, then apply a [`Flow`]
//!
//! The decision function also receives the node's [`AncestorChain`], the
//! path of `(container, key)` frames leading to it from the root.
//!
//! ## Architecture
//!
//! - [`walk()`] and [`walk_async`] drive the same traversal engine; the async
//!   variant awaits each decision before visiting anything else, so both
//!   produce identical visit orders and results
//! - Mutations are committed before the walk moves below or beside the
//!   mutated slot, and descent after a Replace enters the new value
//! - Array length is re-read at every step; object keys are read once per
//!   object, which only ever has its visited slot changed while open
//!
//! ## Example
//!
//! ```rust
//! use arbor_walk::{Decision, Flow, walk};
//! use serde_json::json;
//!
//! let mut data = json!({"users": [{"name": "a", "secret": 1}, {"name": "b"}]});
//!
//! walk(&mut data, |node, chain| {
//!     if chain.key().and_then(|k| k.as_name()) == Some("secret") {
//!         return Some(Decision::delete());
//!     }
//!     if node.is_string() {
//!         return Some(Decision::replace_then(node.as_str()?.to_uppercase(), Flow::StepOver));
//!     }
//!     None
//! })
//! .unwrap();
//!
//! assert_eq!(data, json!({"users": [{"name": "A"}, {"name": "B"}]}));
//! ```

mod chain;
mod config;
mod cursor;
mod decision;
mod error;
mod node;
mod stats;
mod walk;
mod walk_async;

pub use chain::{AncestorChain, AncestorFrame, Frames};
pub use config::WalkConfig;
pub use decision::{Decision, Flow};
pub use error::{BoxError, WalkError};
pub use node::{Key, NodeKind};
pub use stats::WalkStats;
pub use walk::{Walker, walk, walk_with};
pub use walk_async::{
    AsyncWalker, DecideFuture, LocalDecideFuture, walk_async, walk_async_local, walk_async_with,
};
