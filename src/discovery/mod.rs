//! Discovery phase: look up candidate nodes, templates and their docs.
//!
//! The lookup service is a capability injected by the caller. There is no
//! built-in fallback: [`UnavailableProvider`] fails every call, which fails
//! the phase.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::{ErrorKind, PhaseError};
use crate::phase::PhaseOutcome;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("IMPLEMENTATION REQUIRED: no discovery provider supplies '{0}'")]
    NotImplemented(&'static str),
    #[error("discovery provider failed: {0}")]
    Provider(String),
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog: {0}")]
    Json(#[from] serde_json::Error),
}

impl DiscoveryError {
    /// `NotImplementedError` when no real provider backs the call.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            DiscoveryError::NotImplemented(_) => Some(ErrorKind::NotImplementedError),
            _ => None,
        }
    }
}

// =============================================================================
// DESCRIPTORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    pub name: String,
    pub node_type: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub node_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDescriptor {
    pub node_type: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

// =============================================================================
// PROVIDERS
// =============================================================================

#[async_trait]
pub trait DiscoveryProvider: Send + Sync {
    async fn search_nodes(&self, query: &str) -> Result<Vec<NodeDescriptor>, DiscoveryError>;

    async fn search_templates(
        &self,
        use_case: &str,
    ) -> Result<Vec<TemplateDescriptor>, DiscoveryError>;

    async fn get_documentation(
        &self,
        nodes: &[NodeDescriptor],
    ) -> Result<Vec<DocumentDescriptor>, DiscoveryError>;
}

/// Provider used when nothing real was injected. Every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableProvider;

#[async_trait]
impl DiscoveryProvider for UnavailableProvider {
    async fn search_nodes(&self, _query: &str) -> Result<Vec<NodeDescriptor>, DiscoveryError> {
        Err(DiscoveryError::NotImplemented("search_nodes"))
    }

    async fn search_templates(
        &self,
        _use_case: &str,
    ) -> Result<Vec<TemplateDescriptor>, DiscoveryError> {
        Err(DiscoveryError::NotImplemented("search_templates"))
    }

    async fn get_documentation(
        &self,
        _nodes: &[NodeDescriptor],
    ) -> Result<Vec<DocumentDescriptor>, DiscoveryError> {
        Err(DiscoveryError::NotImplemented("get_documentation"))
    }
}

/// Provider backed by a local JSON catalog of nodes, templates and docs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogProvider {
    #[serde(default)]
    pub nodes: Vec<NodeDescriptor>,
    #[serde(default)]
    pub templates: Vec<TemplateDescriptor>,
    #[serde(default)]
    pub docs: Vec<DocumentDescriptor>,
}

impl CatalogProvider {
    pub fn from_json(json: &str) -> Result<Self, DiscoveryError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DiscoveryError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Case-insensitive keyword match: any query word found in any field.
fn matches_query(query: &str, fields: &[&str]) -> bool {
    let haystack = fields.join(" ").to_lowercase();
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .any(|word| haystack.contains(&word))
}

#[async_trait]
impl DiscoveryProvider for CatalogProvider {
    async fn search_nodes(&self, query: &str) -> Result<Vec<NodeDescriptor>, DiscoveryError> {
        Ok(self
            .nodes
            .iter()
            .filter(|n| matches_query(query, &[&n.name, &n.node_type, &n.description]))
            .cloned()
            .collect())
    }

    async fn search_templates(
        &self,
        use_case: &str,
    ) -> Result<Vec<TemplateDescriptor>, DiscoveryError> {
        Ok(self
            .templates
            .iter()
            .filter(|t| matches_query(use_case, &[&t.name, &t.description]))
            .cloned()
            .collect())
    }

    async fn get_documentation(
        &self,
        nodes: &[NodeDescriptor],
    ) -> Result<Vec<DocumentDescriptor>, DiscoveryError> {
        Ok(self
            .docs
            .iter()
            .filter(|d| nodes.iter().any(|n| n.node_type == d.node_type))
            .cloned()
            .collect())
    }
}

// =============================================================================
// PHASE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Unknown,
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Unknown => write!(f, "unknown"),
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResults {
    pub search_query: String,
    pub use_case: String,
    pub nodes_found: Vec<NodeDescriptor>,
    pub templates_found: Vec<TemplateDescriptor>,
    pub docs_reviewed: Vec<DocumentDescriptor>,
    pub risk_assessment: RiskLevel,
    pub provider_used: bool,
}

impl DiscoveryResults {
    fn new(search_query: &str, use_case: &str) -> Self {
        DiscoveryResults {
            search_query: search_query.to_string(),
            use_case: use_case.to_string(),
            nodes_found: vec![],
            templates_found: vec![],
            docs_reviewed: vec![],
            risk_assessment: RiskLevel::Unknown,
            provider_used: false,
        }
    }
}

/// Risk from what discovery turned up: reuse of templates lowers it.
pub fn assess_risk(nodes_found: usize, templates_found: usize) -> RiskLevel {
    if nodes_found >= 3 && templates_found >= 1 {
        RiskLevel::Low
    } else if templates_found == 0 {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    }
}

/// Run the discovery phase against `provider`.
pub async fn discover(
    provider: &dyn DiscoveryProvider,
    search_query: &str,
    use_case: &str,
) -> PhaseOutcome<DiscoveryResults> {
    info!(query = search_query, use_case, "starting discovery");
    let mut results = DiscoveryResults::new(search_query, use_case);

    match lookup(provider, &mut results).await {
        Ok(()) => {
            info!(
                nodes = results.nodes_found.len(),
                templates = results.templates_found.len(),
                risk = %results.risk_assessment,
                "discovery complete"
            );
            PhaseOutcome::passed(results)
        }
        Err(e) => {
            warn!(error = %e, "discovery failed");
            PhaseOutcome::failed(results, e)
        }
    }
}

async fn lookup(
    provider: &dyn DiscoveryProvider,
    results: &mut DiscoveryResults,
) -> Result<(), PhaseError> {
    results.nodes_found = provider.search_nodes(&results.search_query).await?;
    results.templates_found = provider.search_templates(&results.use_case).await?;
    results.docs_reviewed = provider.get_documentation(&results.nodes_found).await?;
    results.provider_used = true;

    if results.nodes_found.is_empty() {
        return Err(PhaseError::NoNodesFound(results.search_query.clone()));
    }

    results.risk_assessment = assess_risk(results.nodes_found.len(), results.templates_found.len());
    if results.risk_assessment == RiskLevel::High {
        warn!("no templates found - building from scratch (higher risk)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_levels() {
        assert_eq!(assess_risk(1, 0), RiskLevel::High);
        assert_eq!(assess_risk(5, 0), RiskLevel::High);
        assert_eq!(assess_risk(2, 1), RiskLevel::Medium);
        assert_eq!(assess_risk(3, 1), RiskLevel::Low);
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        assert!(matches_query("Sentiment scraping", &["OpenAI sentiment model"]));
        assert!(!matches_query("weather", &["HTTP Request", "n8n-nodes-base.httpRequest"]));
    }

    #[tokio::test]
    async fn unavailable_provider_fails_phase() {
        let outcome = discover(&UnavailableProvider, "sentiment", "reviews").await;
        assert!(!outcome.passed);
        assert!(!outcome.results.provider_used);
        assert_eq!(outcome.error_kind, Some(ErrorKind::NotImplementedError));
        assert!(outcome.error.unwrap().contains("IMPLEMENTATION REQUIRED"));
    }
}
