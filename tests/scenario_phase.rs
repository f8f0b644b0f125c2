//! Integration tests for the scenario phase: sequencing, failures and timeouts.

#[allow(dead_code)]
mod helpers;

use std::time::Duration;

use auditor::parse::WorkflowGraph;
use auditor::scenario::{self, StubRunner, TestScenario};
use helpers::*;

#[tokio::test]
async fn stub_runner_passes_defaults() {
    let scenarios = scenario::default_scenarios();
    let outcome = scenario::run_scenarios(&StubRunner, &WorkflowGraph::default(), &scenarios).await;
    assert!(outcome.passed);
    assert_eq!(outcome.results.total_tests, 3);
    assert_eq!(outcome.results.passed_tests, 3);
    let names: Vec<&str> = outcome
        .results
        .test_results
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names, vec!["Happy Path", "Empty Input", "Error Recovery"]);
}

#[tokio::test]
async fn failures_are_counted_and_fail_the_phase() {
    let runner = FailingRunner {
        fail: vec!["Empty Input"],
    };
    let scenarios = scenario::default_scenarios();
    let outcome = scenario::run_scenarios(&runner, &WorkflowGraph::default(), &scenarios).await;
    assert!(!outcome.passed);
    assert_eq!(outcome.results.failed_tests, 1);
    assert_eq!(outcome.error.as_deref(), Some("1 out of 3 tests failed"));
    assert_eq!(
        outcome.results.test_results[1].error.as_deref(),
        Some("Empty Input broke")
    );
}

#[tokio::test(start_paused = true)]
async fn slow_scenario_times_out() {
    let runner = SlowRunner {
        delay: Duration::from_secs(5),
    };
    let scenarios = vec![scenario("Quick budget", 1_000), scenario("Roomy budget", 10_000)];
    let outcome = scenario::run_scenarios(&runner, &WorkflowGraph::default(), &scenarios).await;

    assert!(!outcome.passed);
    let first = &outcome.results.test_results[0];
    assert!(!first.passed);
    assert_eq!(first.error.as_deref(), Some("timed out after 1000ms"));
    assert!(outcome.results.test_results[1].passed);
}

#[tokio::test(start_paused = true)]
async fn zero_timeout_means_no_limit() {
    let runner = SlowRunner {
        delay: Duration::from_secs(600),
    };
    let scenarios = vec![scenario("Unbounded", 0)];
    let outcome = scenario::run_scenarios(&runner, &WorkflowGraph::default(), &scenarios).await;
    assert!(outcome.passed);
}

#[test]
fn scenarios_fixture_parses() {
    let scenarios: Vec<TestScenario> =
        serde_json::from_str(include_str!("fixtures/scenarios.json")).unwrap();
    assert_eq!(scenarios.len(), 1);
    assert_eq!(scenarios[0].timeout_ms, 20_000);
    assert!(!scenarios[0].triggers_error());
}
