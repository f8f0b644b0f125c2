//! Unified diagnostic type used across all audit phases.

use serde::Serialize;
use thiserror::Error;

use crate::phase::Phase;

/// Error taxonomy for findings raised while auditing a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Malformed serialized input.
    ParseError,
    /// Missing or mistyped top-level collections.
    StructureError,
    /// A connection keyed by a node id that does not exist.
    DanglingSourceError,
    /// A connection target naming a node id that does not exist.
    DanglingTargetError,
    /// A required node field is absent or empty.
    MissingFieldError,
    /// A lint rule matched an expression or code payload.
    ExpressionLintError,
    /// A mandatory external collaborator was not supplied.
    NotImplementedError,
    /// Findings that never fail a phase on their own.
    GraphWarning,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::ParseError => "ParseError",
            ErrorKind::StructureError => "StructureError",
            ErrorKind::DanglingSourceError => "DanglingSourceError",
            ErrorKind::DanglingTargetError => "DanglingTargetError",
            ErrorKind::MissingFieldError => "MissingFieldError",
            ErrorKind::ExpressionLintError => "ExpressionLintError",
            ErrorKind::NotImplementedError => "NotImplementedError",
            ErrorKind::GraphWarning => "GraphWarning",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditError {
    pub code: String,
    pub kind: ErrorKind,
    pub phase: Phase,
    pub severity: Severity,
    pub message: String,
    pub node_id: Option<String>,
}

impl std::fmt::Display for AuditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.node_id {
            Some(id) => write!(
                f,
                "[{}:{}] {} (node '{}')",
                self.phase, self.code, self.message, id
            ),
            None => write!(f, "[{}:{}] {}", self.phase, self.code, self.message),
        }
    }
}

impl std::error::Error for AuditError {}

impl AuditError {
    pub fn technical(
        code: &str,
        kind: ErrorKind,
        message: impl Into<String>,
        node_id: Option<String>,
    ) -> Self {
        AuditError {
            code: code.into(),
            kind,
            phase: Phase::Technical,
            severity: Severity::Error,
            message: message.into(),
            node_id,
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::technical("P001", ErrorKind::ParseError, message, None)
    }

    pub fn structure(code: &str, message: impl Into<String>) -> Self {
        Self::technical(code, ErrorKind::StructureError, message, None)
    }

    pub fn warning(code: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        Self::technical(code, ErrorKind::GraphWarning, message, node_id)
            .with_severity(Severity::Warning)
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Aggregated failure of a single phase. Rendered into `PhaseOutcome::error`.
#[derive(Debug, Error)]
pub enum PhaseError {
    #[error(transparent)]
    Discovery(#[from] crate::discovery::DiscoveryError),
    #[error("Discovery incomplete - no relevant nodes found for '{0}'")]
    NoNodesFound(String),
    #[error("{}", join_messages(.0))]
    Validation(Vec<AuditError>),
    #[error("{failed} out of {total} tests failed")]
    ScenariosFailed { failed: usize, total: usize },
    #[error("Manifesto compliance: {score}/{max_score} ({required} required)")]
    ComplianceBelowThreshold {
        score: u32,
        max_score: u32,
        required: u32,
    },
}

impl PhaseError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            PhaseError::Discovery(e) => e.kind(),
            _ => None,
        }
    }
}

/// Join the messages of error-level diagnostics with `", "`.
pub fn join_messages(errors: &[AuditError]) -> String {
    errors
        .iter()
        .filter(|e| e.is_error())
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
