//! Structural validation of a workflow graph.
//!
//! Parse and shape errors stop validation early. Past that point every rule
//! runs and all findings are collected in a fixed order: connections, node
//! fields, graph warnings, then lint rules node by node.

pub mod expressions;
pub mod rules;
pub mod structural;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{AuditError, ErrorKind, PhaseError, Severity};
use crate::parse::{self, ConnectionGraph, GraphInput, WorkflowGraph};
use crate::phase::PhaseOutcome;
use rules::{LintPolicy, LintRule, RuleContext, RuleSeverity};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub node_count: usize,
    /// Number of source entries in `connections`.
    pub connection_count: usize,
    /// Number of targets that resolve to an existing node.
    pub edge_count: usize,
    pub expression_count: usize,
}

/// Resolved in/out edges of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConnectivity {
    pub id: String,
    pub incoming: usize,
    pub outgoing: usize,
    pub successors: Vec<String>,
}

fn connectivity(graph: &ConnectionGraph) -> Vec<NodeConnectivity> {
    graph
        .graph
        .node_weights()
        .map(|id| NodeConnectivity {
            id: id.clone(),
            incoming: graph.incoming_count(id),
            outgoing: graph.outgoing_count(id),
            successors: graph.successors(id).into_iter().map(String::from).collect(),
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    pub diagnostics: Vec<AuditError>,
    pub stats: GraphStats,
    /// Per-node fan-in and fan-out, in node order.
    pub connectivity: Vec<NodeConnectivity>,
    /// The typed graph, when the input got past parsing and the shape check.
    pub graph: Option<WorkflowGraph>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.diagnostics.iter().all(|d| !d.is_error())
    }

    pub fn errors(&self) -> Vec<&AuditError> {
        self.diagnostics.iter().filter(|d| d.is_error()).collect()
    }

    pub fn warnings(&self) -> Vec<&AuditError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .collect()
    }

    /// Error messages in report order.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors().into_iter().map(|e| e.message.clone()).collect()
    }

    fn has_error_of(&self, kinds: &[ErrorKind]) -> bool {
        self.errors().iter().any(|e| kinds.contains(&e.kind))
    }
}

/// Validate with the default lint policy.
pub fn validate(input: impl Into<GraphInput>) -> ValidationOutcome {
    validate_with(input, &LintPolicy::default())
}

/// Validate with the built-in rule set under `policy`.
pub fn validate_with(input: impl Into<GraphInput>, policy: &LintPolicy) -> ValidationOutcome {
    let rules = rules::builtin_rules(policy);
    validate_with_rules(input, &rules, policy)
}

/// Validate with a caller-supplied rule set.
pub fn validate_with_rules(
    input: impl Into<GraphInput>,
    rules: &[Box<dyn LintRule>],
    policy: &LintPolicy,
) -> ValidationOutcome {
    match parse::parse(input) {
        Ok(workflow) => validate_graph(workflow, rules, policy),
        Err(diagnostics) => ValidationOutcome {
            diagnostics,
            ..Default::default()
        },
    }
}

/// Validate an already-typed graph. Never mutates it; the graph is handed
/// back in the outcome.
pub fn validate_graph(
    workflow: WorkflowGraph,
    rules: &[Box<dyn LintRule>],
    policy: &LintPolicy,
) -> ValidationOutcome {
    let graph = ConnectionGraph::build(&workflow);
    let mut diagnostics = structural::validate_structural(&workflow, &graph);

    let mut expression_count = 0;
    for node in &workflow.nodes {
        let scan = expressions::scan_node(node);
        expression_count += scan.count();
        let payload = serde_json::to_string(&node.parameters).unwrap_or_default();
        let ctx = RuleContext {
            node,
            payload: &payload,
            expressions: &scan,
        };
        for rule in rules {
            let severity = match policy.severity(rule.code()) {
                RuleSeverity::Off => continue,
                RuleSeverity::Error => Severity::Error,
                RuleSeverity::Warning => Severity::Warning,
            };
            for message in rule.check(&ctx) {
                diagnostics.push(
                    AuditError::technical(
                        rule.code(),
                        ErrorKind::ExpressionLintError,
                        message,
                        node.id().map(str::to_string),
                    )
                    .with_severity(severity),
                );
            }
        }
    }

    let stats = GraphStats {
        node_count: workflow.nodes.len(),
        connection_count: workflow.connections.len(),
        edge_count: graph.edge_count(),
        expression_count,
    };

    ValidationOutcome {
        diagnostics,
        stats,
        connectivity: connectivity(&graph),
        graph: Some(workflow),
    }
}

// =============================================================================
// TECHNICAL PHASE
// =============================================================================

/// Check-by-check view of one technical validation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalResults {
    pub json_syntax: bool,
    pub workflow_structure: bool,
    pub node_connections: bool,
    pub expressions: bool,
    pub node_configurations: bool,
    pub stats: GraphStats,
    pub connectivity: Vec<NodeConnectivity>,
    pub diagnostics: Vec<AuditError>,
}

impl TechnicalResults {
    fn from_outcome(outcome: &ValidationOutcome) -> Self {
        let json_syntax = !outcome.has_error_of(&[ErrorKind::ParseError]);
        let workflow_structure = json_syntax && !outcome.has_error_of(&[ErrorKind::StructureError]);
        TechnicalResults {
            json_syntax,
            workflow_structure,
            node_connections: workflow_structure
                && !outcome.has_error_of(&[
                    ErrorKind::DanglingSourceError,
                    ErrorKind::DanglingTargetError,
                ]),
            expressions: workflow_structure
                && !outcome.has_error_of(&[ErrorKind::ExpressionLintError]),
            node_configurations: workflow_structure
                && !outcome.has_error_of(&[ErrorKind::MissingFieldError]),
            stats: outcome.stats.clone(),
            connectivity: outcome.connectivity.clone(),
            diagnostics: outcome.diagnostics.clone(),
        }
    }
}

/// Run the structural validator as the technical phase. The phase fails
/// with every error message joined when any error-level finding exists.
pub fn technical_phase(
    input: impl Into<GraphInput>,
    policy: &LintPolicy,
) -> (PhaseOutcome<TechnicalResults>, Option<WorkflowGraph>) {
    info!("starting technical validation");
    let outcome = validate_with(input, policy);
    let results = TechnicalResults::from_outcome(&outcome);

    for warning in outcome.warnings() {
        debug!(code = %warning.code, "{}", warning.message);
    }

    let phase = if outcome.is_valid() {
        info!(
            nodes = outcome.stats.node_count,
            connections = outcome.stats.connection_count,
            expressions = outcome.stats.expression_count,
            "technical validation complete"
        );
        PhaseOutcome::passed(results)
    } else {
        let errors = outcome.errors().into_iter().cloned().collect::<Vec<_>>();
        warn!(errors = errors.len(), "technical validation failed");
        PhaseOutcome::failed(results, PhaseError::Validation(errors))
    };

    (phase, outcome.graph)
}
