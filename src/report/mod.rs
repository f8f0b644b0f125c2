//! Text reports for each phase and for a whole audit run.
//!
//! Public API: `render_*` per phase, `comprehensive_report(run)` for the
//! structured summary and `render_run(run)` for the full terminal output.

mod writer;

use serde::Serialize;

use crate::compliance::ComplianceResult;
use crate::discovery::DiscoveryResults;
use crate::error::ErrorKind;
use crate::phase::{Phase, PhaseOutcome};
use crate::pipeline::AuditRun;
use crate::scenario::LogicResults;
use crate::validate::TechnicalResults;
use writer::ReportWriter;

const RULE_WIDTH: usize = 60;

fn mark(ok: bool) -> &'static str {
    if ok { "✅" } else { "❌" }
}

/// The question put to the reviewer after each phase.
pub fn strategic_question(phase: Phase) -> &'static str {
    match phase {
        Phase::Discovery => "Does this discovery approach align with your business goals?",
        Phase::Technical => "Does this technical approach seem reasonable?",
        Phase::Logic => "Do these test results meet your business requirements?",
        Phase::Manifesto => "Are you satisfied with manifesto compliance?",
    }
}

fn close_with_question(w: &mut ReportWriter, phase: Phase) {
    w.dedent();
    w.blank();
    w.line(&format!("Strategic Question: {}", strategic_question(phase)));
}

/// `Found N <what>: a, b` (the list is left off when nothing was found).
fn found<'a>(what: &str, items: impl Iterator<Item = &'a str>) -> String {
    let items: Vec<&str> = items.collect();
    if items.is_empty() {
        format!("Found 0 {}", what)
    } else {
        format!("Found {} {}: {}", items.len(), what, items.join(", "))
    }
}

// =============================================================================
// PER-PHASE REPORTS
// =============================================================================

pub fn render_discovery(outcome: &PhaseOutcome<DiscoveryResults>) -> String {
    let r = &outcome.results;
    let mut w = ReportWriter::new();

    if let Some(error) = &outcome.error {
        w.section("❌ Discovery Phase Failed");
        w.bullet(&format!("Searched for: \"{}\"", r.search_query));
        w.bullet(&format!("Error: {}", error));
        w.dedent();
        return w.finish();
    }

    w.section("✅ Discovery Phase Complete");
    w.bullet(&format!("Searched for: \"{}\"", r.search_query));
    w.bullet(&found(
        "relevant nodes",
        r.nodes_found.iter().map(|n| n.name.as_str()),
    ));
    w.bullet(&found(
        "working templates",
        r.templates_found.iter().map(|t| t.name.as_str()),
    ));
    w.bullet(&format!(
        "Reviewed {} documents for the chosen nodes",
        r.docs_reviewed.len()
    ));
    w.bullet(&format!("Risk assessment: {}", r.risk_assessment));
    close_with_question(&mut w, Phase::Discovery);
    w.finish()
}

pub fn render_technical(outcome: &PhaseOutcome<TechnicalResults>) -> String {
    let r = &outcome.results;
    let mut w = ReportWriter::new();

    w.section(if outcome.passed {
        "✅ Technical Validation Complete"
    } else {
        "❌ Technical Validation Failed"
    });
    w.bullet(&format!("JSON syntax: {}", mark(r.json_syntax)));
    w.bullet(&format!(
        "Workflow structure: {} ({} nodes, {} connections, {} edges)",
        mark(r.workflow_structure),
        r.stats.node_count,
        r.stats.connection_count,
        r.stats.edge_count
    ));
    w.bullet(&format!("Node connections: {}", mark(r.node_connections)));
    w.bullet(&format!(
        "Expressions: {} ({} found)",
        mark(r.expressions),
        r.stats.expression_count
    ));
    w.bullet(&format!("Node configurations: {}", mark(r.node_configurations)));

    if !r.connectivity.is_empty() {
        w.section("Connectivity:");
        for node in &r.connectivity {
            let mut line = format!("{}: in {}, out {}", node.id, node.incoming, node.outgoing);
            if !node.successors.is_empty() {
                line.push_str(&format!(" → {}", node.successors.join(", ")));
            }
            w.bullet(&line);
        }
        w.dedent();
    }

    let (errors, warnings): (Vec<_>, Vec<_>) = r.diagnostics.iter().partition(|d| d.is_error());
    if !errors.is_empty() {
        w.section("Errors:");
        for e in &errors {
            w.bullet(&e.to_string());
        }
        w.dedent();
    }
    if !warnings.is_empty() {
        w.section("Warnings:");
        for d in &warnings {
            w.bullet(&d.to_string());
        }
        w.dedent();
    }

    close_with_question(&mut w, Phase::Technical);
    w.finish()
}

pub fn render_logic(outcome: &PhaseOutcome<LogicResults>) -> String {
    let r = &outcome.results;
    let mut w = ReportWriter::new();

    w.section(if outcome.passed {
        "✅ Logic Testing Complete"
    } else {
        "❌ Logic Testing Failed"
    });
    for test in &r.test_results {
        match &test.error {
            None => w.bullet(&format!(
                "{}: {} Passed ({}ms)",
                test.name,
                mark(test.passed),
                test.duration_ms
            )),
            Some(error) => w.bullet(&format!(
                "{}: {} Failed ({}ms): {}",
                test.name,
                mark(test.passed),
                test.duration_ms,
                error
            )),
        }
    }
    w.bullet(&format!("{} of {} passed", r.passed_tests, r.total_tests));

    close_with_question(&mut w, Phase::Logic);
    w.finish()
}

pub fn render_manifesto(outcome: &PhaseOutcome<ComplianceResult>) -> String {
    let r = &outcome.results;
    let mut w = ReportWriter::new();

    w.section(if r.passed {
        "✅ Manifesto Compliance Audit Complete"
    } else {
        "⚠️ Manifesto Compliance Issues Found"
    });
    for (label, ok) in r.checks() {
        w.bullet(&format!("{}: {}", label, mark(ok)));
    }
    if !r.missing_docs.is_empty() {
        w.bullet(&format!("Missing documents: {}", r.missing_docs.join(", ")));
    }
    w.blank();
    w.line(&format!("Score: {}/{}", r.score, r.max_score));

    close_with_question(&mut w, Phase::Manifesto);
    w.finish()
}

// =============================================================================
// COMPREHENSIVE REPORT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSummary {
    pub phase: Phase,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveReport {
    pub overall_passed: bool,
    pub phases: Vec<PhaseSummary>,
    pub strategic_checkpoints: Vec<String>,
    pub next_steps: Vec<String>,
}

impl ComprehensiveReport {
    pub fn overall_status(&self) -> &'static str {
        if self.overall_passed { "PASSED" } else { "FAILED" }
    }
}

pub fn comprehensive_report(run: &AuditRun) -> ComprehensiveReport {
    let overall_passed = run.overall_passed();
    let next_steps = if overall_passed {
        vec!["Ready for deployment", "Consider production monitoring setup"]
    } else {
        vec!["Address failed validations", "Re-run the audit after fixes"]
    };

    ComprehensiveReport {
        overall_passed,
        phases: Phase::ALL
            .iter()
            .map(|&phase| PhaseSummary {
                phase,
                passed: run.phase_passed(phase),
                error: run.phase_error(phase).map(str::to_string),
                error_kind: run.phase_error_kind(phase),
            })
            .collect(),
        strategic_checkpoints: Phase::ALL
            .iter()
            .map(|&p| strategic_question(p).to_string())
            .collect(),
        next_steps: next_steps.into_iter().map(String::from).collect(),
    }
}

pub fn render_summary(report: &ComprehensiveReport) -> String {
    let mut w = ReportWriter::new();

    w.line(&format!("Overall Status: {}", report.overall_status()));
    w.blank();

    w.section("Phase Results:");
    for summary in &report.phases {
        let status = match (summary.passed, summary.error_kind) {
            (true, _) => "✅ PASSED".to_string(),
            (false, Some(kind)) => format!("❌ FAILED ({})", kind),
            (false, None) => "❌ FAILED".to_string(),
        };
        w.line(&format!("{}: {}", summary.phase.key(), status));
    }
    w.dedent();
    w.blank();

    w.section("Strategic Checkpoints:");
    w.numbered(&report.strategic_checkpoints);
    w.dedent();
    w.blank();

    w.section("Next Steps:");
    w.numbered(&report.next_steps);
    w.dedent();
    w.finish()
}

fn banner(w: &mut ReportWriter, title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    w.line(&rule);
    w.line(title);
    w.line(&rule);
}

/// Full terminal output: one banner-delimited section per phase that ran,
/// then the summary.
pub fn render_run(run: &AuditRun) -> String {
    let mut sections: Vec<(&str, String)> = Vec::new();
    if let Some(p) = &run.discovery {
        sections.push(("PHASE 1: DISCOVERY", render_discovery(p)));
    }
    if let Some(p) = &run.technical {
        sections.push(("PHASE 2: TECHNICAL VALIDATION", render_technical(p)));
    }
    if let Some(p) = &run.logic {
        sections.push(("PHASE 3: LOGIC TESTING", render_logic(p)));
    }
    if let Some(p) = &run.manifesto {
        sections.push(("PHASE 4: MANIFESTO COMPLIANCE", render_manifesto(p)));
    }
    sections.push((
        "COMPREHENSIVE AUDIT REPORT",
        render_summary(&comprehensive_report(run)),
    ));

    let mut out = String::new();
    for (title, body) in sections {
        let mut w = ReportWriter::new();
        banner(&mut w, title);
        out.push_str(&w.finish());
        out.push_str(&body);
        out.push('\n');
    }
    out
}
