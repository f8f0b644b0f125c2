//! Integration tests for compliance scoring.

#[allow(dead_code)]
mod helpers;

use auditor::compliance::{
    self, CompliancePolicy, ContextDocuments, MAX_SCORE, PriorPhases,
};
use auditor::parse::WorkflowGraph;
use helpers::*;
use serde_json::json;

const ALL_PASSED: PriorPhases = PriorPhases {
    discovery: true,
    technical: true,
    logic: true,
};

fn both_docs() -> ContextDocuments {
    ["requirements.md", "architecture.md"].into_iter().collect()
}

/// `count` nodes chained together; the last one retries on failure.
fn sized_workflow(count: usize) -> WorkflowGraph {
    let mut nodes: Vec<_> = (0..count)
        .map(|i| node(&format!("n{}", i), &format!("Node {}", i), "n8n-nodes-base.set"))
        .collect();
    if let Some(last) = nodes.last_mut() {
        last["parameters"] = json!({ "options": { "retry": { "enabled": true } } });
    }
    parsed(workflow(nodes, json!({})))
}

#[test]
fn ten_nodes_with_retry_score_six() {
    let result = compliance::score(
        &sized_workflow(10),
        &ALL_PASSED,
        &both_docs(),
        4,
        &CompliancePolicy::default(),
    );
    assert_eq!(result.score, MAX_SCORE);
    assert!(result.passed);
    assert!(result.missing_docs.is_empty());
    assert!(result.checks().iter().all(|(_, ok)| *ok));
}

#[test]
fn sentiment_fixture_has_error_handling() {
    let workflow = auditor::parse::parse(include_str!("fixtures/sentiment_workflow.json")).unwrap();
    let result = compliance::score(
        &workflow,
        &ALL_PASSED,
        &both_docs(),
        3,
        &CompliancePolicy::default(),
    );
    assert!(result.error_handling_implemented);
    assert_eq!(result.score, 6);
}

#[test]
fn adding_a_document_never_lowers_the_score() {
    let workflow = sized_workflow(3);
    let policy = CompliancePolicy::default();

    let mut docs = ContextDocuments::new();
    docs.insert("requirements.md", true);
    docs.insert("architecture.md", false);
    let before = compliance::score(&workflow, &ALL_PASSED, &docs, 3, &policy);
    assert!(!before.documentation_present);
    assert_eq!(before.missing_docs, vec!["architecture.md".to_string()]);

    docs.insert("architecture.md", true);
    let after = compliance::score(&workflow, &ALL_PASSED, &docs, 3, &policy);
    assert_eq!(after.score, before.score + 1);
}

#[test]
fn node_ceiling_is_inclusive() {
    let policy = CompliancePolicy::default();
    let at_limit = compliance::score(&sized_workflow(50), &ALL_PASSED, &both_docs(), 3, &policy);
    assert!(at_limit.incremental_development);

    let over = compliance::score(&sized_workflow(51), &ALL_PASSED, &both_docs(), 3, &policy);
    assert!(!over.incremental_development);
    assert_eq!(over.score, 5);
    assert!(over.passed, "five out of six still meets the default threshold");
}

#[test]
fn validation_requires_every_prior_phase() {
    let prior = PriorPhases {
        discovery: true,
        technical: true,
        logic: false,
    };
    let result = compliance::score(
        &sized_workflow(2),
        &prior,
        &both_docs(),
        3,
        &CompliancePolicy::default(),
    );
    assert!(result.discovery_first);
    assert!(!result.validation_executed);
}

#[test]
fn failed_phases_and_no_docs_fall_below_threshold() {
    let outcome = compliance::manifesto_phase(
        &sized_workflow(2),
        &PriorPhases::default(),
        &ContextDocuments::new(),
        1,
        &CompliancePolicy::default(),
    );
    assert!(!outcome.passed);
    // Only incremental development and error handling hold.
    assert_eq!(outcome.results.score, 2);
    assert_eq!(
        outcome.error.as_deref(),
        Some("Manifesto compliance: 2/6 (5 required)")
    );
}

#[test]
fn policy_changes_the_bar() {
    let policy = CompliancePolicy {
        max_nodes: 5,
        required_docs: vec!["runbook.md".into()],
        min_scenarios: 1,
        pass_threshold: 6,
    };
    let docs: ContextDocuments = ["runbook.md"].into_iter().collect();
    let outcome =
        compliance::manifesto_phase(&sized_workflow(6), &ALL_PASSED, &docs, 1, &policy);
    assert_eq!(outcome.results.score, 5);
    assert!(!outcome.passed);
}

#[test]
fn policy_from_json_keeps_defaults() {
    let policy: CompliancePolicy = serde_json::from_str(r#"{ "maxNodes": 20 }"#).unwrap();
    assert_eq!(policy.max_nodes, 20);
    assert_eq!(policy.pass_threshold, 5);
    assert_eq!(policy.required_docs.len(), 2);
}
