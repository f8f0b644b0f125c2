//! Tests for phase reports and the comprehensive summary.

#[allow(dead_code)]
mod helpers;

use std::sync::Arc;

use auditor::compliance::{self, CompliancePolicy, PriorPhases};
use auditor::discovery::UnavailableProvider;
use auditor::pipeline::{AuditRequest, Auditor};
use auditor::report;
use auditor::validate::{self, rules::LintPolicy};
use helpers::*;

fn request() -> AuditRequest {
    AuditRequest {
        search_query: "sentiment analysis".into(),
        use_case: "employee review analysis".into(),
        workflow: include_str!("fixtures/sentiment_workflow.json").into(),
        scenarios: vec![],
        context_documents: ["requirements.md", "architecture.md"].into_iter().collect(),
    }
}

#[test]
fn manifesto_report_text() {
    let workflow = auditor::parse::parse(include_str!("fixtures/sentiment_workflow.json")).unwrap();
    let prior = PriorPhases {
        discovery: true,
        technical: true,
        logic: false,
    };
    let docs = ["requirements.md"].into_iter().collect();
    let outcome =
        compliance::manifesto_phase(&workflow, &prior, &docs, 3, &CompliancePolicy::default());

    let expected = "\
⚠️ Manifesto Compliance Issues Found
  - Discovery-first methodology: ✅
  - Incremental development: ✅
  - Documentation created: ❌
  - Test scenarios: ✅
  - Error handling: ✅
  - Validation executed: ❌
  - Missing documents: architecture.md

  Score: 4/6

Strategic Question: Are you satisfied with manifesto compliance?
";
    assert_eq!(report::render_manifesto(&outcome), expected);
}

#[test]
fn technical_report_lists_errors() {
    let (outcome, _) = validate::technical_phase(
        include_str!("fixtures/dangling_target.json"),
        &LintPolicy::default(),
    );
    let text = report::render_technical(&outcome);
    assert!(text.starts_with("❌ Technical Validation Failed\n"));
    assert!(text.contains("  - Node connections: ❌\n"));
    assert!(text.contains("[Technical:C002] Connection target missing does not exist"));
    assert!(text.lines().all(|l| l == l.trim_end()), "no trailing spaces");
}

#[tokio::test]
async fn failed_discovery_report() {
    let auditor = Auditor::with_provider(Arc::new(UnavailableProvider));
    let run = auditor.run(&request()).await;
    let text = report::render_discovery(run.discovery.as_ref().unwrap());
    assert_eq!(
        text,
        "❌ Discovery Phase Failed\n\
         \x20 - Searched for: \"sentiment analysis\"\n\
         \x20 - Error: IMPLEMENTATION REQUIRED: no discovery provider supplies 'search_nodes'\n"
    );
}

#[tokio::test]
async fn comprehensive_report_of_failed_run() {
    let auditor = Auditor::with_provider(Arc::new(UnavailableProvider));
    let run = auditor.run(&request()).await;
    let summary = report::comprehensive_report(&run);
    assert_eq!(summary.overall_status(), "FAILED");
    insta::assert_json_snapshot!("failed_run_summary", summary);
}

#[tokio::test]
async fn full_run_output_has_every_section() {
    let auditor = Auditor::with_provider(Arc::new(FakeProvider::with(3, 1)));
    let run = auditor.run(&request()).await;
    let text = report::render_run(&run);

    for title in [
        "PHASE 1: DISCOVERY",
        "PHASE 2: TECHNICAL VALIDATION",
        "PHASE 3: LOGIC TESTING",
        "PHASE 4: MANIFESTO COMPLIANCE",
        "COMPREHENSIVE AUDIT REPORT",
    ] {
        assert!(text.contains(title), "missing {}", title);
    }
    assert!(text.contains("✅ Discovery Phase Complete"));
    assert!(text.contains("Score: 6/6"));
    assert!(text.contains("Overall Status: PASSED"));
    assert!(text.contains("1. Ready for deployment"));
    assert!(text.lines().all(|l| l == l.trim_end()), "no trailing spaces");
}

#[tokio::test]
async fn discovery_report_without_templates() {
    let outcome = auditor::discovery::discover(&FakeProvider::with(1, 0), "q", "u").await;
    let text = report::render_discovery(&outcome);
    assert!(text.contains("  - Found 1 relevant nodes: Node 0\n"));
    assert!(text.contains("  - Found 0 working templates\n"));
    assert!(text.contains("  - Risk assessment: high\n"));
    assert!(text.ends_with(
        "\nStrategic Question: Does this discovery approach align with your business goals?\n"
    ));
}

#[test]
fn technical_report_lists_connectivity() {
    let (outcome, _) = validate::technical_phase(
        include_str!("fixtures/sentiment_workflow.json"),
        &LintPolicy::default(),
    );
    let text = report::render_technical(&outcome);
    assert!(text.contains(
        "  Connectivity:\n\
         \x20   - schedule-trigger: in 0, out 1 → http-request\n\
         \x20   - http-request: in 1, out 1 → openai-analysis\n\
         \x20   - openai-analysis: in 1, out 0\n"
    ));
}

#[tokio::test]
async fn summary_names_the_failure_kind() {
    let auditor = Auditor::with_provider(Arc::new(UnavailableProvider));
    let run = auditor.run(&request()).await;
    let text = report::render_summary(&report::comprehensive_report(&run));
    assert!(text.contains("  discovery: ❌ FAILED (NotImplementedError)\n"));
    assert!(text.contains("  manifesto: ❌ FAILED\n"));
}
