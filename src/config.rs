//! Audit configuration: policy constants and lint severities.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compliance::CompliancePolicy;
use crate::validate::rules::LintPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuditConfig {
    pub compliance: CompliancePolicy,
    pub lint: LintPolicy,
    /// Prepend the three built-in scenarios to caller scenarios.
    pub include_default_scenarios: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        AuditConfig {
            compliance: CompliancePolicy::default(),
            lint: LintPolicy::default(),
            include_default_scenarios: true,
        }
    }
}

impl AuditConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
