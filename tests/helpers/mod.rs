use std::time::Duration;

use async_trait::async_trait;
use auditor::discovery::{
    DiscoveryError, DiscoveryProvider, DocumentDescriptor, NodeDescriptor, TemplateDescriptor,
};
use auditor::parse::WorkflowGraph;
use auditor::scenario::{ScenarioError, ScenarioRunner, TestScenario};
use serde_json::{Value, json};

// =============================================================================
// Workflow JSON builders
// =============================================================================

pub fn node(id: &str, name: &str, node_type: &str) -> Value {
    json!({ "id": id, "name": name, "type": node_type, "parameters": {} })
}

pub fn node_with_params(id: &str, node_type: &str, parameters: Value) -> Value {
    json!({ "id": id, "name": id, "type": node_type, "parameters": parameters })
}

pub fn target(node: &str) -> Value {
    json!({ "node": node, "type": "main", "index": 0 })
}

/// `connections` map with a single output slot per source.
pub fn chain(links: &[(&str, &[&str])]) -> Value {
    let mut map = serde_json::Map::new();
    for (source, targets) in links {
        let slot: Vec<Value> = targets.iter().map(|t| target(t)).collect();
        map.insert(source.to_string(), json!({ "main": [slot] }));
    }
    Value::Object(map)
}

pub fn workflow(nodes: Vec<Value>, connections: Value) -> Value {
    json!({ "nodes": nodes, "connections": connections })
}

/// Three well-formed nodes in a line: a → b → c.
pub fn linear_workflow() -> Value {
    workflow(
        vec![
            node("a", "A", "n8n-nodes-base.manualTrigger"),
            node("b", "B", "n8n-nodes-base.set"),
            node("c", "C", "n8n-nodes-base.noOp"),
        ],
        chain(&[("a", &["b"]), ("b", &["c"])]),
    )
}

pub fn parsed(value: Value) -> WorkflowGraph {
    serde_json::from_value(value).expect("builder produces a valid graph")
}

// =============================================================================
// Discovery fakes
// =============================================================================

pub fn descriptor(name: &str, node_type: &str) -> NodeDescriptor {
    NodeDescriptor {
        name: name.into(),
        node_type: node_type.into(),
        description: String::new(),
    }
}

pub fn template(name: &str) -> TemplateDescriptor {
    TemplateDescriptor {
        name: name.into(),
        description: String::new(),
        node_types: vec![],
    }
}

/// Provider that returns fixed lists regardless of the query.
pub struct FakeProvider {
    pub nodes: Vec<NodeDescriptor>,
    pub templates: Vec<TemplateDescriptor>,
}

impl FakeProvider {
    pub fn with(nodes: usize, templates: usize) -> Self {
        FakeProvider {
            nodes: (0..nodes)
                .map(|i| descriptor(&format!("Node {}", i), &format!("n8n-nodes-base.n{}", i)))
                .collect(),
            templates: (0..templates)
                .map(|i| template(&format!("Template {}", i)))
                .collect(),
        }
    }
}

#[async_trait]
impl DiscoveryProvider for FakeProvider {
    async fn search_nodes(&self, _query: &str) -> Result<Vec<NodeDescriptor>, DiscoveryError> {
        Ok(self.nodes.clone())
    }

    async fn search_templates(
        &self,
        _use_case: &str,
    ) -> Result<Vec<TemplateDescriptor>, DiscoveryError> {
        Ok(self.templates.clone())
    }

    async fn get_documentation(
        &self,
        nodes: &[NodeDescriptor],
    ) -> Result<Vec<DocumentDescriptor>, DiscoveryError> {
        Ok(nodes
            .iter()
            .map(|n| DocumentDescriptor {
                node_type: n.node_type.clone(),
                title: format!("{} docs", n.name),
                url: None,
            })
            .collect())
    }
}

/// Provider whose backing service is down.
pub struct BrokenProvider;

#[async_trait]
impl DiscoveryProvider for BrokenProvider {
    async fn search_nodes(&self, _query: &str) -> Result<Vec<NodeDescriptor>, DiscoveryError> {
        Err(DiscoveryError::Provider("connection refused".into()))
    }

    async fn search_templates(
        &self,
        _use_case: &str,
    ) -> Result<Vec<TemplateDescriptor>, DiscoveryError> {
        Err(DiscoveryError::Provider("connection refused".into()))
    }

    async fn get_documentation(
        &self,
        _nodes: &[NodeDescriptor],
    ) -> Result<Vec<DocumentDescriptor>, DiscoveryError> {
        Err(DiscoveryError::Provider("connection refused".into()))
    }
}

// =============================================================================
// Scenario runners
// =============================================================================

/// Fails every scenario whose name is listed.
pub struct FailingRunner {
    pub fail: Vec<&'static str>,
}

#[async_trait]
impl ScenarioRunner for FailingRunner {
    async fn run(
        &self,
        _workflow: &WorkflowGraph,
        scenario: &TestScenario,
    ) -> Result<Value, ScenarioError> {
        if self.fail.contains(&scenario.name.as_str()) {
            return Err(ScenarioError::Failed(format!("{} broke", scenario.name)));
        }
        Ok(json!({ "ok": true }))
    }
}

/// Sleeps before answering, to exercise scenario timeouts.
pub struct SlowRunner {
    pub delay: Duration,
}

#[async_trait]
impl ScenarioRunner for SlowRunner {
    async fn run(
        &self,
        _workflow: &WorkflowGraph,
        _scenario: &TestScenario,
    ) -> Result<Value, ScenarioError> {
        tokio::time::sleep(self.delay).await;
        Ok(json!({ "ok": true }))
    }
}

pub fn scenario(name: &str, timeout_ms: u64) -> TestScenario {
    TestScenario {
        name: name.into(),
        description: String::new(),
        input: json!({}),
        expected_output: None,
        expected_behavior: Some("completes".into()),
        timeout_ms,
    }
}
