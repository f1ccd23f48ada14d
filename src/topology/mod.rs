//! Graph primitives over a [`CausalGraph`].
//!
//! [`GraphIndex`] precomputes the adjacency queries every analyzer needs:
//! node lookup by id, parents/children, incoming/outgoing edges, the
//! control list, topological order, and ancestor closures. Building the
//! index also performs cycle detection — the one place acyclicity is
//! enforced, so downstream code can rely on the DAG property instead of
//! re-checking it.
//!
//! The index borrows the graph and never mutates it. All query results are
//! deterministic: adjacency lists follow edge insertion order and the
//! topological order breaks ties by node insertion order.
//!
//! # Examples
//!
//! ```rust
//! use inevitability::model::{CausalGraph, InfraEdge, InfraNode};
//! use inevitability::topology::GraphIndex;
//! use inevitability::types::EdgeKind;
//!
//! let graph = CausalGraph::new()
//!     .add_node(InfraNode::identity("attacker", "Attacker"))
//!     .add_node(InfraNode::asset("web", "Web Server"))
//!     .add_node(InfraNode::asset("db", "Database"))
//!     .add_edge(InfraEdge::new("attacker", "web", EdgeKind::Access))
//!     .add_edge(InfraEdge::new("web", "db", EdgeKind::Lateral));
//!
//! let index = GraphIndex::build(&graph).unwrap();
//! assert_eq!(index.parents("db"), ["web"]);
//! assert_eq!(index.topo_order().last().map(String::as_str), Some("db"));
//! assert!(index.ancestors("db").contains(&"attacker".to_string()));
//! ```

#[cfg(feature = "petgraph-compat")]
pub mod petgraph_compat;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{EngineError, EngineResult};
use crate::model::{CausalGraph, InfraEdge, InfraNode};

/// Maximum number of cycle witnesses reported in a [`EngineError::CycleDetected`].
const MAX_CYCLE_WITNESSES: usize = 3;

/// Precomputed adjacency index over a borrowed [`CausalGraph`].
#[derive(Debug)]
pub struct GraphIndex<'g> {
    graph: &'g CausalGraph,
    node_pos: FxHashMap<&'g str, usize>,
    parents: FxHashMap<&'g str, Vec<&'g str>>,
    children: FxHashMap<&'g str, Vec<&'g str>>,
    incoming: FxHashMap<&'g str, Vec<usize>>,
    outgoing: FxHashMap<&'g str, Vec<usize>>,
    topo: Vec<String>,
}

impl<'g> GraphIndex<'g> {
    /// Builds the index, failing with [`EngineError::CycleDetected`] if the
    /// graph is not a DAG.
    ///
    /// Edges whose endpoints are missing from the node list are tolerated
    /// here (the engine boundary validates them separately); they simply do
    /// not contribute adjacency for unknown ids.
    pub fn build(graph: &'g CausalGraph) -> EngineResult<Self> {
        let index = Self::build_unchecked(graph);
        let cycles = index.find_cycles(MAX_CYCLE_WITNESSES);
        if cycles.is_empty() {
            Ok(index)
        } else {
            Err(EngineError::CycleDetected { cycles })
        }
    }

    /// Builds the index without the cycle check.
    ///
    /// Reserved for callers holding a graph already validated as acyclic
    /// (the SCM keeps that invariant after a successful build).
    pub(crate) fn build_unchecked(graph: &'g CausalGraph) -> Self {
        let mut node_pos = FxHashMap::default();
        for (pos, node) in graph.nodes.iter().enumerate() {
            node_pos.entry(node.id.as_str()).or_insert(pos);
        }

        let mut parents: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
        let mut children: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
        let mut incoming: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
        let mut outgoing: FxHashMap<&str, Vec<usize>> = FxHashMap::default();

        for (pos, edge) in graph.edges.iter().enumerate() {
            if !node_pos.contains_key(edge.source.as_str())
                || !node_pos.contains_key(edge.target.as_str())
            {
                continue;
            }
            parents
                .entry(edge.target.as_str())
                .or_default()
                .push(edge.source.as_str());
            children
                .entry(edge.source.as_str())
                .or_default()
                .push(edge.target.as_str());
            incoming.entry(edge.target.as_str()).or_default().push(pos);
            outgoing.entry(edge.source.as_str()).or_default().push(pos);
        }

        let mut index = Self {
            graph,
            node_pos,
            parents,
            children,
            incoming,
            outgoing,
            topo: Vec::new(),
        };
        index.topo = index.compute_topo_order();
        index
    }

    /// The underlying graph.
    #[must_use]
    pub fn graph(&self) -> &'g CausalGraph {
        self.graph
    }

    /// O(1) node lookup by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&'g InfraNode> {
        self.node_pos.get(id).map(|&pos| &self.graph.nodes[pos])
    }

    /// Returns `true` if a node with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.node_pos.contains_key(id)
    }

    /// Parent node ids of `id`, in edge insertion order.
    #[must_use]
    pub fn parents(&self, id: &str) -> &[&'g str] {
        self.parents.get(id).map_or(&[], Vec::as_slice)
    }

    /// Child node ids of `id`, in edge insertion order.
    #[must_use]
    pub fn children(&self, id: &str) -> &[&'g str] {
        self.children.get(id).map_or(&[], Vec::as_slice)
    }

    /// Edges pointing at `id`, in insertion order.
    pub fn edges_to(&self, id: &str) -> impl Iterator<Item = &'g InfraEdge> + '_ {
        self.incoming
            .get(id)
            .into_iter()
            .flatten()
            .map(|&pos| &self.graph.edges[pos])
    }

    /// Edges leaving `id`, in insertion order.
    pub fn edges_from(&self, id: &str) -> impl Iterator<Item = &'g InfraEdge> + '_ {
        self.outgoing
            .get(id)
            .into_iter()
            .flatten()
            .map(|&pos| &self.graph.edges[pos])
    }

    /// All control nodes, in node insertion order.
    pub fn controls(&self) -> impl Iterator<Item = &'g InfraNode> + '_ {
        self.graph.controls()
    }

    /// All identity nodes, in node insertion order.
    pub fn identities(&self) -> impl Iterator<Item = &'g InfraNode> + '_ {
        self.graph.identities()
    }

    /// Node ids in topological order (dependencies before dependents).
    ///
    /// On a cyclic graph (only reachable through
    /// [`build_unchecked`](Self::build_unchecked)) cycle members are
    /// omitted; [`build`](Self::build) rejects cycles up front.
    #[must_use]
    pub fn topo_order(&self) -> &[String] {
        &self.topo
    }

    /// Ancestor ids of `id` (excluding `id` itself), in discovery order of
    /// a breadth-first walk over parent edges.
    #[must_use]
    pub fn ancestors(&self, id: &str) -> Vec<String> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut order: Vec<String> = Vec::new();
        let mut frontier: Vec<&str> = vec![id];
        seen.insert(id);
        while let Some(current) = frontier.pop() {
            for &parent in self.parents(current) {
                if seen.insert(parent) {
                    order.push(parent.to_string());
                    frontier.push(parent);
                }
            }
        }
        order
    }

    /// Kahn's algorithm with insertion-order tie-breaking.
    fn compute_topo_order(&self) -> Vec<String> {
        let mut in_degree: FxHashMap<&str, usize> = FxHashMap::default();
        for node in &self.graph.nodes {
            in_degree.insert(node.id.as_str(), self.parents(node.id.as_str()).len());
        }

        let mut queue: Vec<&str> = self
            .graph
            .nodes
            .iter()
            .map(|n| n.id.as_str())
            .filter(|id| in_degree.get(id) == Some(&0))
            .collect();
        queue.reverse();

        let mut order = Vec::with_capacity(self.graph.nodes.len());
        while let Some(id) = queue.pop() {
            order.push(id.to_string());
            for &child in self.children(id) {
                if let Some(degree) = in_degree.get_mut(child) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        // Insert keeping the pending set ordered by node
                        // position so ties resolve by insertion order.
                        queue.push(child);
                        queue.sort_by_key(|id| std::cmp::Reverse(self.node_pos[*id]));
                    }
                }
            }
        }
        order
    }

    /// Finds up to `limit` simple cycles, each rendered with the starting
    /// id repeated at the end (`a → b → a`).
    fn find_cycles(&self, limit: usize) -> Vec<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Gray,
            Black,
        }

        let mut color: FxHashMap<&str, Color> = self
            .graph
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), Color::White))
            .collect();
        let mut cycles: Vec<Vec<String>> = Vec::new();
        let mut stack: Vec<&str> = Vec::new();

        fn visit<'a>(
            index: &GraphIndex<'a>,
            id: &'a str,
            color: &mut FxHashMap<&'a str, Color>,
            stack: &mut Vec<&'a str>,
            cycles: &mut Vec<Vec<String>>,
            limit: usize,
        ) {
            if cycles.len() >= limit {
                return;
            }
            color.insert(id, Color::Gray);
            stack.push(id);
            for &child in index.children(id) {
                match color.get(child).copied().unwrap_or(Color::White) {
                    Color::White => visit(index, child, color, stack, cycles, limit),
                    Color::Gray => {
                        if cycles.len() < limit
                            && let Some(start) = stack.iter().position(|&n| n == child)
                        {
                            let mut cycle: Vec<String> =
                                stack[start..].iter().map(|s| s.to_string()).collect();
                            cycle.push(child.to_string());
                            cycles.push(cycle);
                        }
                    }
                    Color::Black => {}
                }
                if cycles.len() >= limit {
                    break;
                }
            }
            stack.pop();
            color.insert(id, Color::Black);
        }

        for node in &self.graph.nodes {
            if color.get(node.id.as_str()) == Some(&Color::White) {
                visit(self, node.id.as_str(), &mut color, &mut stack, &mut cycles, limit);
            }
            if cycles.len() >= limit {
                break;
            }
        }
        cycles
    }
}
