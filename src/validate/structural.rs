//! Referential-integrity and required-field rules (C001–C002, F001, W001–W002).

use std::collections::HashSet;

use crate::error::{AuditError, ErrorKind};
use crate::parse::graph::ConnectionGraph;
use crate::parse::types::WorkflowGraph;

/// Run all structural rules. Returns every finding, errors and warnings.
pub fn validate_structural(workflow: &WorkflowGraph, graph: &ConnectionGraph) -> Vec<AuditError> {
    let mut errors = Vec::new();

    c001_c002_connections_reference_existing_nodes(workflow, &mut errors);
    f001_required_node_fields(workflow, &mut errors);
    w001_orphan_nodes(workflow, graph, &mut errors);
    w002_duplicate_ids(workflow, &mut errors);

    errors
}

fn c001_c002_connections_reference_existing_nodes(
    workflow: &WorkflowGraph,
    errors: &mut Vec<AuditError>,
) {
    let node_ids: HashSet<&str> = workflow.nodes.iter().filter_map(|n| n.id()).collect();

    for (source, outputs) in &workflow.connections {
        if !node_ids.contains(source.as_str()) {
            errors.push(AuditError::technical(
                "C001",
                ErrorKind::DanglingSourceError,
                format!("Connection source {} does not exist", source),
                Some(source.clone()),
            ));
        }
        for (_, target) in outputs.targets() {
            if !node_ids.contains(target.node.as_str()) {
                errors.push(AuditError::technical(
                    "C002",
                    ErrorKind::DanglingTargetError,
                    format!("Connection target {} does not exist", target_label(&target.node)),
                    Some(source.clone()),
                ));
            }
        }
    }
}

fn target_label(node: &str) -> &str {
    if node.is_empty() { "<unnamed>" } else { node }
}

fn f001_required_node_fields(workflow: &WorkflowGraph, errors: &mut Vec<AuditError>) {
    for (position, node) in workflow.nodes.iter().enumerate() {
        let node_id = node.id().map(str::to_string);
        let subject = match node.id() {
            Some(id) => format!("Node {}", id),
            None => format!("Node at position {}", position),
        };

        let missing = [
            ("id", node.id().is_none()),
            ("name", node.name().is_none()),
            ("type", node.node_type().is_none()),
        ];
        for (field, absent) in missing {
            if absent {
                errors.push(AuditError::technical(
                    "F001",
                    ErrorKind::MissingFieldError,
                    format!("{} missing required {} field", subject, field),
                    node_id.clone(),
                ));
            }
        }
    }
}

fn w001_orphan_nodes(
    workflow: &WorkflowGraph,
    graph: &ConnectionGraph,
    errors: &mut Vec<AuditError>,
) {
    if workflow.nodes.len() < 2 {
        return;
    }
    for id in graph.orphans() {
        errors.push(AuditError::warning(
            "W001",
            format!("Node {} is not connected to any other node", id),
            Some(id.to_string()),
        ));
    }
}

fn w002_duplicate_ids(workflow: &WorkflowGraph, errors: &mut Vec<AuditError>) {
    let mut seen = HashSet::new();
    for id in workflow.nodes.iter().filter_map(|n| n.id()) {
        if !seen.insert(id) {
            errors.push(AuditError::warning(
                "W002",
                format!("Node id {} is used by more than one node", id),
                Some(id.to_string()),
            ));
        }
    }
}
