//! Phase orchestrator: discovery → technical → logic → manifesto.
//!
//! Each call to [`Auditor::run`] returns a fresh [`AuditRun`]; nothing is kept
//! on the auditor between runs. A failing phase is recorded and the next
//! phase still runs.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::compliance::{self, ComplianceResult, ContextDocuments, PriorPhases};
use crate::config::AuditConfig;
use crate::discovery::{self, DiscoveryProvider, DiscoveryResults};
use crate::error::ErrorKind;
use crate::parse::{GraphInput, WorkflowGraph};
use crate::phase::{Phase, PhaseOutcome};
use crate::scenario::{self, LogicResults, ScenarioRunner, StubRunner, TestScenario};
use crate::validate::{self, TechnicalResults};

/// Everything one audit run needs from the caller.
#[derive(Debug, Clone)]
pub struct AuditRequest {
    pub search_query: String,
    pub use_case: String,
    pub workflow: GraphInput,
    pub scenarios: Vec<TestScenario>,
    pub context_documents: ContextDocuments,
}

/// Per-run record of phase outcomes. A phase that has not run is `None`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditRun {
    pub discovery: Option<PhaseOutcome<DiscoveryResults>>,
    pub technical: Option<PhaseOutcome<TechnicalResults>>,
    pub logic: Option<PhaseOutcome<LogicResults>>,
    pub manifesto: Option<PhaseOutcome<ComplianceResult>>,
}

impl AuditRun {
    pub fn phase_passed(&self, phase: Phase) -> bool {
        match phase {
            Phase::Discovery => self.discovery.as_ref().is_some_and(|p| p.passed),
            Phase::Technical => self.technical.as_ref().is_some_and(|p| p.passed),
            Phase::Logic => self.logic.as_ref().is_some_and(|p| p.passed),
            Phase::Manifesto => self.manifesto.as_ref().is_some_and(|p| p.passed),
        }
    }

    pub fn phase_error(&self, phase: Phase) -> Option<&str> {
        match phase {
            Phase::Discovery => self.discovery.as_ref().and_then(|p| p.error.as_deref()),
            Phase::Technical => self.technical.as_ref().and_then(|p| p.error.as_deref()),
            Phase::Logic => self.logic.as_ref().and_then(|p| p.error.as_deref()),
            Phase::Manifesto => self.manifesto.as_ref().and_then(|p| p.error.as_deref()),
        }
    }

    pub fn phase_error_kind(&self, phase: Phase) -> Option<ErrorKind> {
        match phase {
            Phase::Discovery => self.discovery.as_ref().and_then(|p| p.error_kind),
            Phase::Technical => self.technical.as_ref().and_then(|p| p.error_kind),
            Phase::Logic => self.logic.as_ref().and_then(|p| p.error_kind),
            Phase::Manifesto => self.manifesto.as_ref().and_then(|p| p.error_kind),
        }
    }

    pub fn prior_phases(&self) -> PriorPhases {
        PriorPhases {
            discovery: self.phase_passed(Phase::Discovery),
            technical: self.phase_passed(Phase::Technical),
            logic: self.phase_passed(Phase::Logic),
        }
    }

    /// True only when all four phases ran and passed.
    pub fn overall_passed(&self) -> bool {
        Phase::ALL.iter().all(|&p| self.phase_passed(p))
    }
}

pub struct Auditor {
    discovery: Arc<dyn DiscoveryProvider>,
    runner: Arc<dyn ScenarioRunner>,
    config: AuditConfig,
}

impl Auditor {
    pub fn new(
        discovery: Arc<dyn DiscoveryProvider>,
        runner: Arc<dyn ScenarioRunner>,
        config: AuditConfig,
    ) -> Self {
        Auditor {
            discovery,
            runner,
            config,
        }
    }

    /// Auditor with the stub scenario runner and default config.
    pub fn with_provider(discovery: Arc<dyn DiscoveryProvider>) -> Self {
        Self::new(discovery, Arc::new(StubRunner), AuditConfig::default())
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub async fn run(&self, request: &AuditRequest) -> AuditRun {
        let mut run = AuditRun::default();

        run.discovery = Some(
            self.discovery_phase(&request.search_query, &request.use_case)
                .await,
        );

        let (technical, parsed) = self.technical_phase(request.workflow.clone());
        run.technical = Some(technical);
        let workflow = parsed.unwrap_or_default();

        let logic = self.logic_phase(&workflow, &request.scenarios).await;
        let scenario_count = logic.results.total_tests;
        run.logic = Some(logic);

        run.manifesto = Some(self.manifesto_phase(
            &workflow,
            &run.prior_phases(),
            &request.context_documents,
            scenario_count,
        ));

        info!(passed = run.overall_passed(), "audit run complete");
        run
    }

    pub async fn discovery_phase(
        &self,
        search_query: &str,
        use_case: &str,
    ) -> PhaseOutcome<DiscoveryResults> {
        discovery::discover(self.discovery.as_ref(), search_query, use_case).await
    }

    /// Returns the typed graph alongside the outcome when parsing succeeded.
    pub fn technical_phase(
        &self,
        input: impl Into<GraphInput>,
    ) -> (PhaseOutcome<TechnicalResults>, Option<WorkflowGraph>) {
        validate::technical_phase(input, &self.config.lint)
    }

    /// Runs the default scenarios (unless disabled) followed by `custom`.
    pub async fn logic_phase(
        &self,
        workflow: &WorkflowGraph,
        custom: &[TestScenario],
    ) -> PhaseOutcome<LogicResults> {
        let mut scenarios = if self.config.include_default_scenarios {
            scenario::default_scenarios()
        } else {
            Vec::new()
        };
        scenarios.extend_from_slice(custom);
        scenario::run_scenarios(self.runner.as_ref(), workflow, &scenarios).await
    }

    pub fn manifesto_phase(
        &self,
        workflow: &WorkflowGraph,
        prior: &PriorPhases,
        docs: &ContextDocuments,
        scenario_count: usize,
    ) -> PhaseOutcome<ComplianceResult> {
        compliance::manifesto_phase(
            workflow,
            prior,
            docs,
            scenario_count,
            &self.config.compliance,
        )
    }
}
