//! SCM construction from an infrastructure graph.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::EngineResult;
use crate::model::CausalGraph;
use crate::topology::GraphIndex;
use crate::types::NodeClass;

use super::{Assumption, AssumptionCategory, EquationKind, ExogenousDefault, Scm, StructuralEquation};

/// Builds a [`Scm`] from a [`CausalGraph`].
///
/// Construction validates the DAG property (returning
/// [`CycleDetected`](crate::error::EngineError::CycleDetected) otherwise),
/// synthesizes one Boolean equation per endogenous node, harvests the
/// assumption ledger, and records exogenous defaults for every root.
///
/// # Examples
///
/// ```rust
/// use inevitability::model::{CausalGraph, InfraEdge, InfraNode};
/// use inevitability::scm::ScmBuilder;
/// use inevitability::types::{ControlState, EdgeKind};
///
/// let graph = CausalGraph::new()
///     .add_node(InfraNode::identity("attacker", "Attacker"))
///     .add_node(InfraNode::asset("web", "Web Server"))
///     .add_node(InfraNode::control("fw", "Firewall", ControlState::Active))
///     .add_edge(InfraEdge::new("attacker", "web", EdgeKind::Access))
///     .add_edge(InfraEdge::new("fw", "web", EdgeKind::Control));
///
/// let scm = ScmBuilder::new(graph).build().unwrap();
/// let eq = scm.equation_for("web").unwrap();
/// assert_eq!(eq.parent_variables, ["attacker"]);
/// assert_eq!(eq.negated_parents, ["fw"]);
/// ```
pub struct ScmBuilder {
    graph: CausalGraph,
}

impl ScmBuilder {
    /// Wraps a graph for building.
    #[must_use]
    pub fn new(graph: CausalGraph) -> Self {
        Self { graph }
    }

    /// Runs the full construction pipeline.
    ///
    /// # Errors
    ///
    /// [`CycleDetected`](crate::error::EngineError::CycleDetected) when the
    /// graph is not a DAG; up to three cycle witnesses are attached.
    pub fn build(self) -> EngineResult<Scm> {
        let index = GraphIndex::build(&self.graph)?;

        let equations = Self::generate_equations(&index);
        let assumptions = Self::extract_assumptions(&self.graph);
        let exogenous = Self::exogenous_defaults(&index);

        debug!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            equations = equations.len(),
            assumptions = assumptions.len(),
            roots = exogenous.len(),
            "SCM built"
        );

        drop(index);
        Ok(Scm::new(self.graph, equations, assumptions, exogenous))
    }

    /// One equation per node with at least one parent.
    ///
    /// Incoming edges split by source variant and edge variant: a Control
    /// source reached over a Control edge blocks (negated parent); every
    /// other combination enables. The equation kind is conjunction
    /// regardless of the target variant; the asymmetry lives in the solver
    /// encoding.
    fn generate_equations(index: &GraphIndex<'_>) -> Vec<StructuralEquation> {
        let mut equations = Vec::new();

        for node in &index.graph().nodes {
            if index.parents(&node.id).is_empty() {
                continue; // exogenous
            }

            let mut enabling = Vec::new();
            let mut blocking = Vec::new();
            for edge in index.edges_to(&node.id) {
                let source_is_control = index
                    .node(&edge.source)
                    .is_some_and(|source| source.is_control());
                if source_is_control && edge.is_control_edge() {
                    blocking.push(edge.source.clone());
                } else {
                    enabling.push(edge.source.clone());
                }
            }

            equations.push(StructuralEquation {
                target: node.id.clone(),
                parent_variables: enabling,
                negated_parents: blocking,
                equation_type: EquationKind::BooleanConjunction,
            });
        }

        equations
    }

    /// Harvests the assumption ledger: every named edge assumption, one
    /// synthetic `"<name>_is_<state>"` per control, and one synthetic
    /// `"<name>_mfa_enabled|disabled"` per identity with a known MFA flag.
    /// De-duplicated by name; synthetic entries carry a binding to their
    /// node id.
    fn extract_assumptions(graph: &CausalGraph) -> Vec<Assumption> {
        let mut assumptions: Vec<Assumption> = Vec::new();
        let mut seen: FxHashSet<String> = FxHashSet::default();

        for edge in &graph.edges {
            for text in &edge.constraint.assumptions {
                if seen.insert(text.clone()) {
                    let source = if edge.label.is_empty() {
                        edge.id.clone()
                    } else {
                        edge.label.clone()
                    };
                    assumptions.push(Assumption {
                        id: format!("assumption_{}", assumptions.len()),
                        name: text.clone(),
                        description: format!("Assumed by edge {source}"),
                        category: AssumptionCategory::Threat,
                        active: true,
                        sensitivity: None,
                        binding: None,
                    });
                }
            }
        }

        for node in &graph.nodes {
            if let Some(profile) = node.control_profile() {
                let name = format!("{}_is_{}", node.name, profile.state);
                if seen.insert(name.clone()) {
                    assumptions.push(Assumption {
                        id: format!("ctrl_assumption_{}", node.id),
                        name,
                        description: format!("Control {} state assumption", node.name),
                        category: AssumptionCategory::Config,
                        active: true,
                        sensitivity: None,
                        binding: Some(node.id.clone()),
                    });
                }
            }
        }

        for node in &graph.nodes {
            if let Some(mfa) = node.identity_profile().and_then(|p| p.mfa_enabled) {
                let tag = if mfa { "mfa_enabled" } else { "mfa_disabled" };
                let name = format!("{}_{tag}", node.name);
                if seen.insert(name.clone()) {
                    assumptions.push(Assumption {
                        id: format!("mfa_assumption_{}", node.id),
                        name,
                        description: format!("MFA status for {}", node.name),
                        category: AssumptionCategory::Config,
                        active: true,
                        sensitivity: None,
                        binding: Some(node.id.clone()),
                    });
                }
            }
        }

        assumptions
    }

    /// Constraint table for root variables, in node insertion order.
    fn exogenous_defaults(index: &GraphIndex<'_>) -> Vec<ExogenousDefault> {
        index
            .graph()
            .nodes
            .iter()
            .filter(|node| index.parents(&node.id).is_empty())
            .map(|node| ExogenousDefault {
                id: node.id.clone(),
                class: node.class(),
                name: node.name.clone(),
                range: "boolean".to_string(),
                default: match node.class() {
                    NodeClass::Identity => Some(true),
                    _ => None,
                },
            })
            .collect()
    }
}
