//! Compliance scoring: six boolean predicates over already-computed state.
//!
//! Pure aggregation. Nothing here does I/O or re-validates the graph.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::PhaseError;
use crate::parse::types::WorkflowGraph;
use crate::phase::PhaseOutcome;

pub const MAX_SCORE: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompliancePolicy {
    /// Largest node count still considered incremental development.
    pub max_nodes: usize,
    pub required_docs: Vec<String>,
    pub min_scenarios: usize,
    /// Minimum score (out of 6) for a pass.
    pub pass_threshold: u32,
}

impl Default for CompliancePolicy {
    fn default() -> Self {
        CompliancePolicy {
            max_nodes: 50,
            required_docs: vec!["requirements.md".into(), "architecture.md".into()],
            min_scenarios: 3,
            pass_threshold: 5,
        }
    }
}

/// Named context documents and whether each is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextDocuments(BTreeMap<String, bool>);

impl ContextDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, present: bool) {
        self.0.insert(name.into(), present);
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }
}

impl<S: Into<String>> FromIterator<S> for ContextDocuments {
    /// Every named document is marked present.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ContextDocuments(iter.into_iter().map(|name| (name.into(), true)).collect())
    }
}

/// Pass flags of the phases that run before compliance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorPhases {
    pub discovery: bool,
    pub technical: bool,
    pub logic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceResult {
    pub discovery_first: bool,
    pub incremental_development: bool,
    pub documentation_present: bool,
    pub test_scenarios_created: bool,
    pub error_handling_implemented: bool,
    pub validation_executed: bool,
    pub missing_docs: Vec<String>,
    pub score: u32,
    pub max_score: u32,
    pub passed: bool,
}

impl ComplianceResult {
    /// The six predicates with their report labels, in scoring order.
    pub fn checks(&self) -> [(&'static str, bool); 6] {
        [
            ("Discovery-first methodology", self.discovery_first),
            ("Incremental development", self.incremental_development),
            ("Documentation created", self.documentation_present),
            ("Test scenarios", self.test_scenarios_created),
            ("Error handling", self.error_handling_implemented),
            ("Validation executed", self.validation_executed),
        ]
    }
}

pub fn score(
    workflow: &WorkflowGraph,
    prior: &PriorPhases,
    docs: &ContextDocuments,
    scenario_count: usize,
    policy: &CompliancePolicy,
) -> ComplianceResult {
    let missing_docs: Vec<String> = policy
        .required_docs
        .iter()
        .filter(|d| !docs.is_present(d))
        .cloned()
        .collect();

    let mut result = ComplianceResult {
        discovery_first: prior.discovery,
        incremental_development: workflow.nodes.len() <= policy.max_nodes,
        documentation_present: missing_docs.is_empty(),
        test_scenarios_created: scenario_count >= policy.min_scenarios,
        error_handling_implemented: workflow.nodes.iter().any(|n| n.has_error_handling()),
        validation_executed: prior.discovery && prior.technical && prior.logic,
        missing_docs,
        score: 0,
        max_score: MAX_SCORE,
        passed: false,
    };
    result.score = result.checks().iter().filter(|(_, ok)| *ok).count() as u32;
    result.passed = result.score >= policy.pass_threshold;
    result
}

/// Score the workflow as the manifesto phase.
pub fn manifesto_phase(
    workflow: &WorkflowGraph,
    prior: &PriorPhases,
    docs: &ContextDocuments,
    scenario_count: usize,
    policy: &CompliancePolicy,
) -> PhaseOutcome<ComplianceResult> {
    info!("starting compliance audit");
    let result = score(workflow, prior, docs, scenario_count, policy);

    if result.passed {
        info!(score = result.score, "compliance audit complete");
        return PhaseOutcome::passed(result);
    }

    warn!(
        score = result.score,
        required = policy.pass_threshold,
        "compliance issues found"
    );
    let error = PhaseError::ComplianceBelowThreshold {
        score: result.score,
        max_score: result.max_score,
        required: policy.pass_threshold,
    };
    PhaseOutcome::failed(result, error)
}
