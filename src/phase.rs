//! Phase identifiers and the per-phase result record.

use serde::Serialize;

use crate::error::{ErrorKind, PhaseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Discovery,
    Technical,
    Logic,
    Manifesto,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Discovery,
        Phase::Technical,
        Phase::Logic,
        Phase::Manifesto,
    ];

    /// Lowercase key used in summaries and JSON output.
    pub fn key(&self) -> &'static str {
        match self {
            Phase::Discovery => "discovery",
            Phase::Technical => "technical",
            Phase::Logic => "logic",
            Phase::Manifesto => "manifesto",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Discovery => write!(f, "Discovery"),
            Phase::Technical => write!(f, "Technical"),
            Phase::Logic => write!(f, "Logic"),
            Phase::Manifesto => write!(f, "Manifesto"),
        }
    }
}

/// Outcome of one phase in one run. `results` is always populated, even on
/// failure, so callers can see how far the phase got.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseOutcome<T> {
    pub passed: bool,
    pub results: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Taxonomy kind of the failure, when it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl<T> PhaseOutcome<T> {
    pub fn passed(results: T) -> Self {
        PhaseOutcome {
            passed: true,
            results,
            error: None,
            error_kind: None,
        }
    }

    pub fn failed(results: T, error: PhaseError) -> Self {
        PhaseOutcome {
            passed: false,
            results,
            error: Some(error.to_string()),
            error_kind: error.kind(),
        }
    }
}
