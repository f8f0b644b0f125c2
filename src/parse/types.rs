//! Rust types for the workflow automation JSON (nodes + named connections).
//!
//! Past the top-level shape the model is lenient: a field of the wrong JSON
//! type reads as absent (or as its default) instead of failing the whole
//! graph, so the validator can still report every finding. A non-string
//! `id`, `name` or `type` is therefore reported as missing.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Node type that carries a JavaScript payload in `parameters.jsCode`.
pub const CODE_NODE_TYPE: &str = "n8n-nodes-base.code";

// =============================================================================
// TOP-LEVEL WORKFLOW
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowGraph {
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_each")]
    pub nodes: Vec<Node>,
    /// Keyed by source node id. Sorted so every scan is deterministic.
    #[serde(default, deserialize_with = "lenient_values")]
    pub connections: BTreeMap<String, OutputConnections>,
}

impl WorkflowGraph {
    /// Find a node by its id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == Some(id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position(pub f64, pub f64);

// =============================================================================
// NODES
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub node_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub parameters: Map<String, Value>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub position: Option<Position>,
    /// Any truthy value routes errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Option<Value>,
    /// Any truthy value continues on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_on_fail: Option<Value>,
}

/// Only the empty string counts as absent; whitespace is a value.
fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl Node {
    pub fn id(&self) -> Option<&str> {
        non_empty(&self.id)
    }

    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }

    pub fn node_type(&self) -> Option<&str> {
        non_empty(&self.node_type)
    }

    /// Name for messages: the node name, then its id, then a placeholder.
    pub fn label(&self) -> &str {
        self.name().or_else(|| self.id()).unwrap_or("<unnamed>")
    }

    pub fn is_code(&self) -> bool {
        self.node_type() == Some(CODE_NODE_TYPE)
    }

    /// JavaScript source of a code node, if present.
    pub fn js_code(&self) -> Option<&str> {
        self.parameters.get("jsCode").and_then(Value::as_str)
    }

    /// True when the node routes errors, continues on failure, or retries.
    pub fn has_error_handling(&self) -> bool {
        let routes_errors = self.on_error.as_ref().is_some_and(is_truthy);
        let continues = self.continue_on_fail.as_ref().is_some_and(is_truthy);
        let retries = self
            .parameters
            .get("options")
            .and_then(|o| o.get("retry"))
            .is_some_and(is_truthy);
        routes_errors || continues || retries
    }
}

/// JSON truthiness: null, false, 0 and "" are falsy; everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// =============================================================================
// CONNECTIONS
// =============================================================================

/// Output ports of one source node. Each outer slot is one port, holding
/// zero or more fan-out targets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConnections {
    /// A slot that is not an array (e.g. `null`) reads as an empty port so
    /// later slot numbers stay put.
    #[serde(default, deserialize_with = "lenient_slots")]
    pub main: Vec<Vec<ConnectionTarget>>,
}

impl OutputConnections {
    /// All targets with the output slot they hang off, in declaration order.
    pub fn targets(&self) -> impl Iterator<Item = (usize, &ConnectionTarget)> {
        self.main
            .iter()
            .enumerate()
            .flat_map(|(slot, targets)| targets.iter().map(move |t| (slot, t)))
    }
}

/// One fan-out target. An absent or non-string `node` reads as `""`, which
/// never names an existing node and is reported as a dangling target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTarget {
    #[serde(default, deserialize_with = "lenient")]
    pub node: String,
    #[serde(rename = "type", default = "default_connection_type")]
    #[serde(deserialize_with = "lenient_kind")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient")]
    pub index: u32,
}

impl Default for ConnectionTarget {
    fn default() -> Self {
        ConnectionTarget {
            node: String::new(),
            kind: default_connection_type(),
            index: 0,
        }
    }
}

fn default_connection_type() -> String {
    "main".into()
}

// =============================================================================
// LENIENT READERS
// =============================================================================

/// Read any JSON value; keep it if it has the expected type, else default.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn lenient_kind<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(default_connection_type))
}

/// Array whose malformed elements read as `T::default()`.
fn lenient_each<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

/// Object whose malformed values read as `T::default()`.
fn lenient_values<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(key, item)| (key, serde_json::from_value(item).unwrap_or_default()))
            .collect(),
        _ => BTreeMap::new(),
    })
}

fn lenient_slots<'de, D>(deserializer: D) -> Result<Vec<Vec<ConnectionTarget>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(slots) = value else {
        return Ok(Vec::new());
    };
    Ok(slots
        .into_iter()
        .map(|slot| match slot {
            Value::Array(targets) => targets
                .into_iter()
                .map(|t| serde_json::from_value(t).unwrap_or_default())
                .collect(),
            _ => Vec::new(),
        })
        .collect())
}
