//! Walker configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::WalkError;

/// Configuration shared by the synchronous and asynchronous walkers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct WalkConfig {
    /// Maximum depth whose containers are descended into.
    ///
    /// A container at depth `max_depth` is still visited, but its children are
    /// not. The root has depth 0.
    /// Default: None (no limit)
    pub max_depth: Option<usize>,
}

impl WalkConfig {
    /// Creates a new `WalkConfig` with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum descent depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, WalkError> {
        serde_json::from_str(json)
            .map_err(|e| WalkError::config(format!("Failed to parse walk config: {e}")))
    }

    /// Loads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, WalkError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Returns true if children of a container at `depth` may be visited.
    pub(crate) fn descends_at(&self, depth: usize) -> bool {
        self.max_depth.is_none_or(|max| depth < max)
    }
}
