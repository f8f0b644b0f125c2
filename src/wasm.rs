//! WASM entry points for browser use.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::compliance::{self, CompliancePolicy, ContextDocuments, PriorPhases};
use crate::error::AuditError;
use crate::parse::WorkflowGraph;
use crate::validate;

/// Validate a workflow JSON with the default lint policy.
/// Returns a JSON array of diagnostic objects (errors and warnings).
#[wasm_bindgen]
pub fn validate_workflow(json: &str) -> JsValue {
    let result = validate_workflow_inner(json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn validate_workflow_inner(json: &str) -> Vec<DiagnosticDto> {
    validate::validate(json)
        .diagnostics
        .into_iter()
        .map(DiagnosticDto::from)
        .collect()
}

/// Score a workflow JSON against a scoring context JSON
/// (`{ priorPhases, documents, scenarioCount, policy? }`).
/// Returns the compliance result, or a JSON array of diagnostics when either
/// input cannot be read.
#[wasm_bindgen]
pub fn score_workflow(workflow_json: &str, context_json: &str) -> JsValue {
    let result = score_workflow_inner(workflow_json, context_json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn score_workflow_inner(workflow_json: &str, context_json: &str) -> ScoreResult {
    let workflow = match crate::parse::parse(workflow_json) {
        Ok(w) => w,
        Err(errors) => {
            return ScoreResult::Errors(errors.into_iter().map(DiagnosticDto::from).collect());
        }
    };

    let context = match serde_json::from_str::<ScoreContextDto>(context_json) {
        Ok(c) => c,
        Err(e) => {
            return ScoreResult::Errors(vec![DiagnosticDto::from(AuditError::parse(format!(
                "Failed to parse scoring context JSON: {}",
                e
            )))]);
        }
    };

    ScoreResult::Scored(score(&workflow, &context))
}

fn score(workflow: &WorkflowGraph, context: &ScoreContextDto) -> compliance::ComplianceResult {
    compliance::score(
        workflow,
        &context.prior_phases,
        &context.documents,
        context.scenario_count,
        &context.policy,
    )
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DiagnosticDto {
    code: String,
    kind: String,
    severity: String,
    phase: String,
    message: String,
    node_id: Option<String>,
}

impl From<AuditError> for DiagnosticDto {
    fn from(e: AuditError) -> Self {
        let severity = if e.is_error() { "error" } else { "warning" };
        DiagnosticDto {
            code: e.code,
            kind: e.kind.to_string(),
            severity: severity.into(),
            phase: e.phase.key().into(),
            message: e.message,
            node_id: e.node_id,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoreContextDto {
    #[serde(default)]
    prior_phases: PriorPhases,
    #[serde(default)]
    documents: ContextDocuments,
    #[serde(default)]
    scenario_count: usize,
    #[serde(default)]
    policy: CompliancePolicy,
}

#[derive(Serialize)]
#[serde(tag = "status")]
enum ScoreResult {
    #[serde(rename = "scored")]
    Scored(compliance::ComplianceResult),
    #[serde(rename = "errors")]
    Errors(Vec<DiagnosticDto>),
}
