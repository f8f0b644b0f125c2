//! Parse phase: JSON text or value → shape check → typed `WorkflowGraph`.

pub mod graph;
pub mod types;

pub use graph::ConnectionGraph;
pub use types::*;

use serde_json::Value;

use crate::error::AuditError;

/// Validator input: serialized text or an already-structured JSON value.
#[derive(Debug, Clone)]
pub enum GraphInput {
    Text(String),
    Value(Value),
}

impl From<&str> for GraphInput {
    fn from(text: &str) -> Self {
        GraphInput::Text(text.to_string())
    }
}

impl From<String> for GraphInput {
    fn from(text: String) -> Self {
        GraphInput::Text(text)
    }
}

impl From<Value> for GraphInput {
    fn from(value: Value) -> Self {
        GraphInput::Value(value)
    }
}

/// Parse and shape-check the input, then read it into the typed model.
///
/// Errors here are terminal for the structural validator: a graph that fails
/// to parse cannot be checked any further.
pub fn parse(input: impl Into<GraphInput>) -> Result<WorkflowGraph, Vec<AuditError>> {
    let value = match input.into() {
        GraphInput::Value(value) => value,
        GraphInput::Text(text) => serde_json::from_str::<Value>(&text)
            .map_err(|e| vec![AuditError::parse(format!("JSON syntax invalid: {}", e))])?,
    };

    check_shape(&value)?;

    serde_json::from_value::<WorkflowGraph>(value).map_err(|e| {
        vec![AuditError::structure(
            "S003",
            format!("Invalid workflow structure: {}", e),
        )]
    })
}

/// Require an array `nodes` and an object `connections` at the top level.
fn check_shape(value: &Value) -> Result<(), Vec<AuditError>> {
    let mut errors = Vec::new();

    if !value.get("nodes").is_some_and(Value::is_array) {
        errors.push(AuditError::structure(
            "S001",
            "Invalid workflow structure: missing or invalid nodes array",
        ));
    }
    if !value.get("connections").is_some_and(Value::is_object) {
        errors.push(AuditError::structure(
            "S002",
            "Invalid workflow structure: missing or invalid connections object",
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
