//! The causal infrastructure graph.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{InfraEdge, InfraNode};

/// Ordered collection of nodes and edges plus free-form metadata.
///
/// Node and edge order is preserved everywhere: iteration order in results,
/// tie-breaking in analyzers, and witness rendering all derive from
/// insertion order, which keeps every analysis deterministic.
///
/// Structural invariants (every edge endpoint resolves, the graph is
/// acyclic) are enforced when the graph enters the engine — by
/// [`crate::topology::GraphIndex::build`] and the SCM builder — not on
/// every push, so a graph under construction may be temporarily invalid.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CausalGraph {
    /// Nodes in insertion order.
    #[serde(default)]
    pub nodes: Vec<InfraNode>,
    /// Edges in insertion order.
    #[serde(default)]
    pub edges: Vec<InfraEdge>,
    /// Free-form scenario metadata (breach name, sources, year, ...).
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl CausalGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node.
    #[must_use]
    pub fn add_node(mut self, node: InfraNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Appends an edge.
    #[must_use]
    pub fn add_edge(mut self, edge: InfraEdge) -> Self {
        self.edges.push(edge);
        self
    }

    /// Sets one metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Linear lookup of a node by id.
    ///
    /// Analyzers on the hot path use the O(1) lookup on
    /// [`crate::topology::GraphIndex`] instead.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&InfraNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Returns `true` if a node with this id exists.
    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// All control nodes, in insertion order.
    pub fn controls(&self) -> impl Iterator<Item = &InfraNode> {
        self.nodes.iter().filter(|n| n.is_control())
    }

    /// All identity nodes, in insertion order.
    pub fn identities(&self) -> impl Iterator<Item = &InfraNode> {
        self.nodes.iter().filter(|n| n.is_identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ControlState, EdgeKind};

    #[test]
    fn insertion_order_is_preserved() {
        let graph = CausalGraph::new()
            .add_node(InfraNode::identity("z", "Z"))
            .add_node(InfraNode::asset("a", "A"))
            .add_edge(InfraEdge::new("z", "a", EdgeKind::Access));
        let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["z", "a"]);
    }

    #[test]
    fn controls_filter() {
        let graph = CausalGraph::new()
            .add_node(InfraNode::asset("a", "A"))
            .add_node(InfraNode::control("c1", "C1", ControlState::Active))
            .add_node(InfraNode::control("c2", "C2", ControlState::Inactive));
        assert_eq!(graph.controls().count(), 2);
        assert_eq!(graph.identities().count(), 0);
    }
}
