//! Depth-first traversal engine shared by both walkers.
//!
//! [`Traversal`] is the pre-order walk written as a resumable state machine:
//! [`Traversal::next`] advances to the next node and lends it out together
//! with its [`AncestorChain`], and [`Traversal::apply`] commits the decision
//! made for that node. The synchronous and asynchronous walkers differ only in
//! how they obtain the decision between those two calls.
//!
//! Bookkeeping:
//! - `keys` is the ancestor chain. A key is pushed when a child is entered and
//!   popped either right after its decision (no descent) or when the container
//!   it names is exhausted or broken out of.
//! - `levels` holds one cursor per container being iterated. The container of
//!   the innermost level is found by following `keys` from the root, so there
//!   is never a stale reference to a container that was replaced.
//!
//! Sequences are iterated by index with the length re-read on every step.
//! Mappings are iterated over a snapshot of their keys taken when the level is
//! entered. Only the slot being visited can change while its level is open
//! (Replace writes it, Delete removes it), so the snapshot order is the map's
//! order. Keys the map no longer holds are skipped.

use std::ops::ControlFlow;

use serde_json::Value;
use tracing::trace;

use crate::chain::AncestorChain;
use crate::config::WalkConfig;
use crate::decision::{Decision, Flow};
use crate::node::{Key, NodeKind, resolve, resolve_mut};
use crate::{WalkError, WalkStats};

/// A node lent to the decision function.
pub(crate) struct Visit<'a> {
    pub(crate) node: &'a Value,
    pub(crate) chain: AncestorChain<'a>,
}

/// Iteration cursor over one container's children.
#[derive(Debug)]
enum Level {
    Sequence { next: usize },
    Mapping { keys: Vec<String>, next: usize },
}

impl Level {
    fn for_node(node: &Value) -> Option<Self> {
        match NodeKind::of(node) {
            NodeKind::Sequence => Some(Level::Sequence { next: 0 }),
            NodeKind::Mapping => Some(Level::Mapping {
                keys: node.as_object()?.keys().cloned().collect(),
                next: 0,
            }),
            NodeKind::Scalar => None,
        }
    }

    /// Picks the next child key of `container`, or `None` once exhausted.
    fn advance(&mut self, container: &Value) -> Option<Key> {
        match (self, container) {
            (Level::Sequence { next }, Value::Array(items)) => {
                if *next >= items.len() {
                    return None;
                }
                let key = Key::Index(*next);
                *next += 1;
                Some(key)
            }
            (Level::Mapping { keys, next }, Value::Object(map)) => {
                while let Some(name) = keys.get(*next) {
                    *next += 1;
                    if map.contains_key(name) {
                        return Some(Key::Name(name.clone()));
                    }
                }
                None
            }
            _ => None,
        }
    }

    /// Compensates for the removal of the child just visited.
    ///
    /// In a sequence the following element shifts into the freed index, which
    /// must be visited next.
    fn step_back(&mut self) {
        if let Level::Sequence { next } = self {
            *next = next.saturating_sub(1);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// The root has not been handed out yet.
    Start,
    /// The root is awaiting its decision.
    AtRoot,
    Walking,
    Done,
}

/// Single-use pre-order traversal over one root value.
#[derive(Debug)]
pub(crate) struct Traversal<'c> {
    config: &'c WalkConfig,
    keys: Vec<Key>,
    levels: Vec<Level>,
    state: State,
    stats: WalkStats,
}

impl<'c> Traversal<'c> {
    pub(crate) fn new(config: &'c WalkConfig) -> Self {
        Self {
            config,
            keys: Vec::new(),
            levels: Vec::new(),
            state: State::Start,
            stats: WalkStats::default(),
        }
    }

    /// Advances to the next node in pre-order.
    ///
    /// Returns `None` once the traversal is over. Every `Some` must be followed
    /// by exactly one [`Traversal::apply`] before `next` is called again.
    pub(crate) fn next<'a>(&'a mut self, root: &'a Value) -> Result<Option<Visit<'a>>, WalkError> {
        match self.state {
            State::Start => {
                self.state = State::AtRoot;
                self.stats.visited += 1;
                return Ok(Some(Visit {
                    node: root,
                    chain: AncestorChain::new(root, &self.keys),
                }));
            }
            State::Done => return Ok(None),
            State::AtRoot | State::Walking => {}
        }

        loop {
            let Some(level) = self.levels.last_mut() else {
                self.state = State::Done;
                return Ok(None);
            };
            let container = resolve(root, &self.keys).ok_or_else(|| unresolved(&self.keys))?;
            match level.advance(container) {
                Some(key) => {
                    self.keys.push(key);
                    break;
                }
                None => self.leave(),
            }
        }

        let node = resolve(root, &self.keys).ok_or_else(|| unresolved(&self.keys))?;
        self.stats.visited += 1;
        Ok(Some(Visit {
            node,
            chain: AncestorChain::new(root, &self.keys),
        }))
    }

    /// Commits the decision for the node last returned by [`Traversal::next`].
    ///
    /// Returns `ControlFlow::Break(())` once nothing else will be visited.
    pub(crate) fn apply(
        &mut self,
        root: &mut Value,
        decision: Option<Decision>,
    ) -> Result<ControlFlow<()>, WalkError> {
        let decision = decision.unwrap_or_default();
        if self.state == State::AtRoot {
            return self.apply_at_root(root, decision);
        }

        let (flow, removed) = match decision {
            Decision::Replace(value, then) => {
                let slot = resolve_mut(root, &self.keys).ok_or_else(|| unresolved(&self.keys))?;
                *slot = value;
                self.stats.replaced += 1;
                trace!(path = %AncestorChain::new(root, &self.keys), %then, "Replaced node");
                (then, false)
            }
            Decision::Delete(then) => {
                let (key, parent_path) = self
                    .keys
                    .split_last()
                    .ok_or_else(|| WalkError::internal("delete without a current key"))?;
                let parent =
                    resolve_mut(root, parent_path).ok_or_else(|| unresolved(parent_path))?;
                key.remove(parent).ok_or_else(|| unresolved(&self.keys))?;
                if let Some(level) = self.levels.last_mut() {
                    level.step_back();
                }
                self.stats.deleted += 1;
                trace!(path = %AncestorChain::new(root, &self.keys), %then, "Deleted node");
                (then, true)
            }
            other => (other.flow(), false),
        };

        let child = if removed || flow != Flow::Continue {
            None
        } else {
            self.child_level(root)?
        };
        match child {
            // The visited key stays on the chain as the new container's key.
            Some(level) => self.levels.push(level),
            None => {
                self.keys.pop();
            }
        }

        Ok(self.steer(flow))
    }

    /// Consumes the traversal, returning its counters.
    pub(crate) fn finish(self) -> WalkStats {
        self.stats
    }

    fn apply_at_root(
        &mut self,
        root: &Value,
        decision: Decision,
    ) -> Result<ControlFlow<()>, WalkError> {
        if decision.is_mutation() {
            self.state = State::Done;
            return Err(WalkError::InvalidRootMutation {
                decision: decision.name(),
            });
        }

        match decision.flow() {
            Flow::Continue => {
                self.state = State::Walking;
                if self.config.descends_at(0) {
                    self.levels.extend(Level::for_node(root));
                }
                Ok(ControlFlow::Continue(()))
            }
            // The root has no siblings, so these all end the traversal.
            Flow::StepOver | Flow::Break => {
                self.state = State::Done;
                Ok(ControlFlow::Break(()))
            }
            Flow::Exit => {
                self.exit();
                Ok(ControlFlow::Break(()))
            }
        }
    }

    fn child_level(&self, root: &Value) -> Result<Option<Level>, WalkError> {
        if !self.config.descends_at(self.keys.len()) {
            return Ok(None);
        }
        let node = resolve(root, &self.keys).ok_or_else(|| unresolved(&self.keys))?;
        Ok(Level::for_node(node))
    }

    fn steer(&mut self, flow: Flow) -> ControlFlow<()> {
        match flow {
            Flow::Continue | Flow::StepOver => ControlFlow::Continue(()),
            Flow::Break => {
                self.leave();
                ControlFlow::Continue(())
            }
            Flow::Exit => {
                self.exit();
                ControlFlow::Break(())
            }
        }
    }

    /// Drops the innermost container and its key.
    fn leave(&mut self) {
        self.levels.pop();
        self.keys.pop();
    }

    fn exit(&mut self) {
        self.levels.clear();
        self.keys.clear();
        self.state = State::Done;
        self.stats.exited = true;
    }
}

fn unresolved(path: &[Key]) -> WalkError {
    WalkError::internal(format!(
        "no node at {}",
        AncestorChain::new(&Value::Null, path)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// Drives a traversal, recording `(pointer, depth)` for every visit.
    fn drive(
        root: &mut Value,
        config: &WalkConfig,
        mut decide: impl FnMut(&Value, &AncestorChain<'_>) -> Option<Decision>,
    ) -> (Vec<(String, usize)>, Result<WalkStats, WalkError>) {
        let mut traversal = Traversal::new(config);
        let mut seen = Vec::new();
        loop {
            let decision = match traversal.next(root) {
                Ok(Some(visit)) => {
                    seen.push((visit.chain.pointer(), visit.chain.len()));
                    decide(visit.node, &visit.chain)
                }
                Ok(None) => break,
                Err(e) => return (seen, Err(e)),
            };
            match traversal.apply(root, decision) {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => break,
                Err(e) => return (seen, Err(e)),
            }
        }
        (seen, Ok(traversal.finish()))
    }

    fn pointers(seen: &[(String, usize)]) -> Vec<&str> {
        seen.iter().map(|(p, _)| p.as_str()).collect()
    }

    #[test]
    fn chain_length_matches_depth_after_step_over_and_delete() {
        let mut root = json!({
            "a": [[1, 2], "drop", [3], "drop", 4],
            "b": {"c": [5]}
        });
        let config = WalkConfig::new();

        let (seen, result) = drive(&mut root, &config, |node, chain| {
            // Depth and pointer must agree with the node actually visited.
            assert_eq!(chain.root().pointer(&chain.pointer()), Some(node));
            match node {
                Value::String(s) if s == "drop" => Some(Decision::delete()),
                Value::Array(items) if items.len() == 2 => Some(Decision::StepOver),
                _ => None,
            }
        });

        let stats = result.unwrap();
        assert_eq!(
            pointers(&seen),
            vec![
                "", "/a", "/a/0", "/a/1", "/a/1", "/a/1/0", "/a/2", "/a/2", "/b", "/b/c", "/b/c/0"
            ]
        );
        for (pointer, depth) in &seen {
            assert_eq!(pointer.matches('/').count(), *depth);
        }
        assert_eq!(stats.deleted, 2);
        assert_eq!(root, json!({"a": [[1, 2], [3], 4], "b": {"c": [5]}}));
    }

    #[test]
    fn exit_ends_iteration() {
        let mut root = json!([[1, 2], [3]]);
        let config = WalkConfig::new();
        let mut traversal = Traversal::new(&config);

        assert!(traversal.next(&root).unwrap().is_some());
        assert!(traversal.apply(&mut root, None).unwrap().is_continue());
        assert!(traversal.next(&root).unwrap().is_some()); // [1, 2]
        assert!(traversal.apply(&mut root, None).unwrap().is_continue());
        assert!(traversal.next(&root).unwrap().is_some()); // 1
        assert!(
            traversal
                .apply(&mut root, Some(Decision::Exit))
                .unwrap()
                .is_break()
        );
        assert!(traversal.next(&root).unwrap().is_none());

        let stats = traversal.finish();
        assert_eq!(stats.visited, 3);
        assert!(stats.exited);
    }

    #[test]
    fn break_in_mapping_resumes_enclosing_level() {
        let mut root = json!([{"a": 1, "b": 2, "c": 3}, "after"]);
        let config = WalkConfig::new();

        let (seen, result) = drive(&mut root, &config, |_, chain| {
            (chain.pointer() == "/0/a").then_some(Decision::delete_then(Flow::Break))
        });
        result.unwrap();
        assert_eq!(pointers(&seen), vec!["", "/0", "/0/a", "/1"]);
        assert_eq!(root, json!([{"b": 2, "c": 3}, "after"]));
    }

    #[test]
    fn replaced_mapping_child_is_not_revisited() {
        let mut root = json!({"a": {"x": 1}, "b": 2});
        let config = WalkConfig::new();

        let (seen, result) = drive(&mut root, &config, |node, chain| {
            if chain.pointer() == "/a" && node.get("x").is_some() {
                return Some(Decision::replace(json!({"y": 2})));
            }
            None
        });
        result.unwrap();
        assert_eq!(pointers(&seen), vec!["", "/a", "/a/y", "/b"]);
        assert_eq!(root, json!({"a": {"y": 2}, "b": 2}));
    }

    #[test]
    fn replacing_mapping_child_keeps_sibling_order() {
        let mut root = json!({"a": 1, "m": {"x": 1}, "z": 3});
        let config = WalkConfig::new();

        let (seen, result) = drive(&mut root, &config, |_, chain| {
            (chain.pointer() == "/m").then(|| Decision::replace(json!({"b": 1, "n": 2, "y": 3})))
        });
        result.unwrap();
        assert_eq!(
            pointers(&seen),
            vec!["", "/a", "/m", "/m/b", "/m/n", "/m/y", "/z"]
        );
    }

    #[test]
    fn wide_mapping_is_walked_in_key_order() {
        let width = 50_000;
        let mut root = Value::Object(
            (0..width)
                .map(|i| (format!("k{i:07}"), json!(i)))
                .collect(),
        );
        let expected: Vec<String> = root
            .as_object()
            .unwrap()
            .keys()
            .map(|name| format!("/{name}"))
            .collect();
        let config = WalkConfig::new();

        let (seen, result) = drive(&mut root, &config, |_, _| None);
        assert_eq!(result.unwrap().visited, width + 1);
        let visited: Vec<&str> = pointers(&seen).into_iter().skip(1).collect();
        let expected: Vec<&str> = expected.iter().map(String::as_str).collect();
        assert_eq!(visited, expected);
    }

    #[test]
    fn deleting_mapping_keys_keeps_remaining_order() {
        let mut root = json!({"a": 1, "b": 2, "c": 3, "d": 4});
        let config = WalkConfig::new();

        let (seen, result) = drive(&mut root, &config, |node, _| {
            (node.as_i64().is_some_and(|n| n % 2 == 1)).then(Decision::delete)
        });
        result.unwrap();
        assert_eq!(pointers(&seen), vec!["", "/a", "/b", "/c", "/d"]);
        assert_eq!(root, json!({"b": 2, "d": 4}));
    }

    #[test]
    fn depth_limit_stops_descent() {
        let mut root = json!({"a": {"b": {"c": 1}}, "d": [1]});
        let config = WalkConfig::new().max_depth(1);

        let (seen, result) = drive(&mut root, &config, |_, _| None);
        result.unwrap();
        assert_eq!(pointers(&seen), vec!["", "/a", "/d"]);
    }

    #[test]
    fn depth_limit_zero_visits_only_root() {
        let mut root = json!([1, 2]);
        let config = WalkConfig::new().max_depth(0);

        let (seen, result) = drive(&mut root, &config, |_, _| None);
        assert_eq!(result.unwrap().visited, 1);
        assert_eq!(pointers(&seen), vec![""]);
    }

    #[test]
    fn scalar_root_is_visited_once() {
        let mut root = json!("leaf");
        let config = WalkConfig::new();

        let (seen, result) = drive(&mut root, &config, |_, _| None);
        assert_eq!(result.unwrap().visited, 1);
        assert_eq!(seen, vec![(String::new(), 0)]);
    }
}
