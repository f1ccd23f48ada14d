//! Optional petgraph compatibility layer.
//!
//! Converts a [`CausalGraph`] into a petgraph `DiGraph` for advanced
//! algorithms, exports DOT for visualization, and offers an alternative
//! cycle check for cross-verification of the built-in detection.
//!
//! # Feature Gate
//!
//! Only available with the `petgraph-compat` feature:
//!
//! ```toml
//! [dependencies]
//! inevitability = { version = "0.1", features = ["petgraph-compat"] }
//! ```

use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;

use crate::model::CausalGraph;
use crate::types::EdgeKind;

/// Petgraph rendition of a causal graph: node weights are node ids, edge
/// weights are the edge kind.
pub type CausalDiGraph = DiGraph<String, EdgeKind>;

/// Result of converting a [`CausalGraph`] to petgraph form.
#[derive(Debug, Clone)]
pub struct PetgraphConversion {
    /// The petgraph directed graph.
    pub graph: CausalDiGraph,
    /// Mapping from node id to petgraph index.
    pub index_map: FxHashMap<String, NodeIndex>,
}

impl PetgraphConversion {
    /// Looks up the petgraph index of a node id.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index_map.get(id).copied()
    }
}

/// Converts a causal graph to a petgraph `DiGraph`.
///
/// Node indices follow node insertion order, so conversion is
/// deterministic. Edges with unknown endpoints are skipped.
#[must_use]
pub fn to_petgraph(graph: &CausalGraph) -> PetgraphConversion {
    let mut pg = DiGraph::new();
    let mut index_map: FxHashMap<String, NodeIndex> = FxHashMap::default();

    for node in &graph.nodes {
        if !index_map.contains_key(&node.id) {
            let idx = pg.add_node(node.id.clone());
            index_map.insert(node.id.clone(), idx);
        }
    }
    for edge in &graph.edges {
        if let (Some(&from), Some(&to)) = (index_map.get(&edge.source), index_map.get(&edge.target))
        {
            pg.add_edge(from, to, edge.kind);
        }
    }

    PetgraphConversion {
        graph: pg,
        index_map,
    }
}

/// Exports the graph to DOT format for Graphviz rendering.
///
/// Nodes are labeled with their display names; control-kind edges are
/// drawn dashed so blocking relationships stand out.
#[must_use]
pub fn to_dot(graph: &CausalGraph) -> String {
    use std::fmt::Write;

    let conversion = to_petgraph(graph);
    let mut output = String::new();

    let _ = writeln!(output, "digraph {{");
    let _ = writeln!(output, "    rankdir=LR;");
    let _ = writeln!(output, "    node [shape=box, style=rounded];");

    for idx in conversion.graph.node_indices() {
        if let Some(id) = conversion.graph.node_weight(idx) {
            let label = graph.node(id).map_or(id.as_str(), |n| n.name.as_str());
            let _ = writeln!(output, "    {} [ label=\"{}\" ];", idx.index(), label);
        }
    }

    let _ = writeln!(output);

    for edge in conversion.graph.edge_indices() {
        if let Some((from, to)) = conversion.graph.edge_endpoints(edge) {
            let style = match conversion.graph.edge_weight(edge) {
                Some(EdgeKind::Control) => " [style=dashed]",
                _ => "",
            };
            let _ = writeln!(output, "    {} -> {}{};", from.index(), to.index(), style);
        }
    }

    let _ = writeln!(output, "}}");
    output
}

/// Cycle check via petgraph's algorithm, for cross-verification of the
/// built-in detection in [`crate::topology::GraphIndex::build`].
#[must_use]
pub fn is_cyclic(graph: &CausalGraph) -> bool {
    let conversion = to_petgraph(graph);
    petgraph::algo::is_cyclic_directed(&conversion.graph)
}
