//! Flow-control vocabulary returned by decision functions.
//!
//! Every visited node yields one [`Decision`]. Four variants only steer the
//! traversal; [`Decision::Replace`] and [`Decision::Delete`] mutate the node's
//! slot first and then steer with a nested [`Flow`].
//!
//! Decisions can also arrive as data (for example from a rule file). The
//! accepted JSON shapes are:
//!
//! ```text
//! null | "continue" | "step-over" | "break" | "exit" | "delete"
//! {"replace": <value>, "then": <flow>?}
//! {"delete": true, "then": <flow>?}
//! ```
//!
//! Anything else is rejected with [`WalkError::UnknownDecision`].

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::WalkError;

/// Steering outcome applied after a node has been visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flow {
    /// Descend into the node's children if it is a container.
    #[default]
    Continue,
    /// Do not descend; proceed to the next sibling.
    StepOver,
    /// Skip the remaining siblings; the enclosing level resumes.
    Break,
    /// Abort the whole traversal.
    Exit,
}

impl Flow {
    /// Returns the canonical name of this flow.
    pub const fn as_str(self) -> &'static str {
        match self {
            Flow::Continue => "continue",
            Flow::StepOver => "step-over",
            Flow::Break => "break",
            Flow::Exit => "exit",
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flow {
    type Err = WalkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "continue" => Ok(Flow::Continue),
            "step-over" | "step_over" | "stepOver" => Ok(Flow::StepOver),
            "break" => Ok(Flow::Break),
            "exit" => Ok(Flow::Exit),
            other => Err(WalkError::unknown_decision(format!(
                "'{other}' is not a flow (expected continue, step-over, break or exit)"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Flow {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Outcome of visiting a single node.
///
/// Returning `None` from a decision function is the same as
/// [`Decision::Continue`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Decision {
    /// Descend into the node's children if it is a container.
    #[default]
    Continue,
    /// Do not descend; proceed to the next sibling.
    StepOver,
    /// Skip the remaining siblings; the enclosing level resumes.
    Break,
    /// Abort the whole traversal.
    Exit,
    /// Overwrite the node's slot, then apply the flow.
    ///
    /// With [`Flow::Continue`] the walker descends into the new value.
    Replace(Value, Flow),
    /// Remove the node's slot, then apply the flow.
    ///
    /// [`Flow::Continue`] and [`Flow::StepOver`] behave the same here: there is
    /// nothing left to descend into.
    Delete(Flow),
}

impl Decision {
    /// Replaces the node and descends into the replacement.
    pub fn replace(value: impl Into<Value>) -> Self {
        Decision::Replace(value.into(), Flow::Continue)
    }

    /// Replaces the node, then applies `then`.
    pub fn replace_then(value: impl Into<Value>, then: Flow) -> Self {
        Decision::Replace(value.into(), then)
    }

    /// Removes the node and continues with the next sibling.
    pub fn delete() -> Self {
        Decision::Delete(Flow::Continue)
    }

    /// Removes the node, then applies `then`.
    pub fn delete_then(then: Flow) -> Self {
        Decision::Delete(then)
    }

    /// The flow applied once any mutation has been committed.
    pub fn flow(&self) -> Flow {
        match self {
            Decision::Continue => Flow::Continue,
            Decision::StepOver => Flow::StepOver,
            Decision::Break => Flow::Break,
            Decision::Exit => Flow::Exit,
            Decision::Replace(_, then) | Decision::Delete(then) => *then,
        }
    }

    /// Returns true for Replace and Delete.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Decision::Replace(..) | Decision::Delete(_))
    }

    /// Short name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Decision::Replace(..) => "replace",
            Decision::Delete(_) => "delete",
            other => other.flow().as_str(),
        }
    }

    /// Parses a decision from its JSON form.
    pub fn from_value(value: &Value) -> Result<Self, WalkError> {
        match value {
            Value::Null => Ok(Decision::Continue),
            Value::String(name) if name == "delete" => Ok(Decision::delete()),
            Value::String(name) => name.parse::<Flow>().map(Decision::from),
            Value::Object(map) => {
                let then = match map.get("then") {
                    None | Some(Value::Null) => Flow::Continue,
                    Some(Value::String(name)) => name.parse()?,
                    Some(other) => {
                        return Err(WalkError::unknown_decision(format!(
                            "'then' must name a flow, got {other}"
                        )));
                    }
                };

                let extra = map
                    .keys()
                    .find(|key| !matches!(key.as_str(), "replace" | "delete" | "then"));
                if let Some(key) = extra {
                    return Err(WalkError::unknown_decision(format!(
                        "unexpected field '{key}'"
                    )));
                }

                match (map.get("replace"), map.get("delete")) {
                    (Some(replacement), None) => Ok(Decision::Replace(replacement.clone(), then)),
                    (None, Some(Value::Bool(true))) => Ok(Decision::Delete(then)),
                    (None, Some(other)) => Err(WalkError::unknown_decision(format!(
                        "'delete' must be true, got {other}"
                    ))),
                    (Some(_), Some(_)) => Err(WalkError::unknown_decision(
                        "a decision cannot both replace and delete",
                    )),
                    (None, None) => Err(WalkError::unknown_decision(
                        "object decisions need a 'replace' or 'delete' field",
                    )),
                }
            }
            other => Err(WalkError::unknown_decision(format!(
                "expected a string or object, got {other}"
            ))),
        }
    }
}

impl From<Flow> for Decision {
    fn from(flow: Flow) -> Self {
        match flow {
            Flow::Continue => Decision::Continue,
            Flow::StepOver => Decision::StepOver,
            Flow::Break => Decision::Break,
            Flow::Exit => Decision::Exit,
        }
    }
}

impl Serialize for Decision {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Decision::Replace(value, then) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("replace", value)?;
                map.serialize_entry("then", then)?;
                map.end()
            }
            Decision::Delete(then) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("delete", &true)?;
                map.serialize_entry("then", then)?;
                map.end()
            }
            other => other.flow().serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Decision {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Decision::from_value(&value).map_err(serde::de::Error::custom)
    }
}
