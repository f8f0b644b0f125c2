//! petgraph-based directed view over the resolvable connections.
//!
//! Only edges whose source and target both name an existing node are added;
//! dangling references are reported by the validator, not here.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

use super::types::WorkflowGraph;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLabel {
    /// Output port on the source node.
    pub slot: usize,
    pub kind: String,
    /// Input index on the target node.
    pub index: u32,
}

pub struct ConnectionGraph {
    pub graph: DiGraph<String, EdgeLabel>,
    pub node_indices: HashMap<String, NodeIndex>,
}

impl ConnectionGraph {
    pub fn build(workflow: &WorkflowGraph) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        // Nodes without an id cannot be referenced; the first node wins on duplicates.
        for node in &workflow.nodes {
            let Some(id) = node.id() else { continue };
            if !node_indices.contains_key(id) {
                let idx = graph.add_node(id.to_string());
                node_indices.insert(id.to_string(), idx);
            }
        }

        for (source, outputs) in &workflow.connections {
            let Some(&s) = node_indices.get(source) else {
                continue;
            };
            for (slot, target) in outputs.targets() {
                if let Some(&t) = node_indices.get(&target.node) {
                    graph.add_edge(
                        s,
                        t,
                        EdgeLabel {
                            slot,
                            kind: target.kind.clone(),
                            index: target.index,
                        },
                    );
                }
            }
        }

        ConnectionGraph {
            graph,
            node_indices,
        }
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn successors(&self, node_id: &str) -> Vec<&str> {
        let Some(&idx) = self.node_indices.get(node_id) else {
            return vec![];
        };
        // petgraph yields the newest edge first.
        let mut ids: Vec<&str> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|n| self.graph[n].as_str())
            .collect();
        ids.reverse();
        ids
    }

    pub fn incoming_count(&self, node_id: &str) -> usize {
        self.degree(node_id, Direction::Incoming)
    }

    pub fn outgoing_count(&self, node_id: &str) -> usize {
        self.degree(node_id, Direction::Outgoing)
    }

    /// Node ids with neither incoming nor outgoing edges, in insertion order.
    pub fn orphans(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .edges_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
                    && self
                        .graph
                        .edges_directed(idx, Direction::Outgoing)
                        .next()
                        .is_none()
            })
            .map(|idx| self.graph[idx].as_str())
            .collect()
    }

    fn degree(&self, node_id: &str, dir: Direction) -> usize {
        let Some(&idx) = self.node_indices.get(node_id) else {
            return 0;
        };
        self.graph.edges_directed(idx, dir).count()
    }
}
