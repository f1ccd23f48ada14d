//! Structural Causal Model types.
//!
//! An [`Scm`] is the formal representation every analyzer works against: a
//! validated DAG plus one Boolean structural equation per endogenous node,
//! the assumption ledger harvested from edges and node properties, and the
//! exogenous-constraint table for root variables. SCMs are created once
//! per graph by [`ScmBuilder`] and are read-only afterwards; analyzers
//! borrow them and express every hypothetical through solver-level
//! interventions, never by mutating the model.

mod builder;

pub use builder::ScmBuilder;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::model::{CausalGraph, GoalPredicate, InfraNode};
use crate::topology::GraphIndex;
use crate::types::NodeClass;

/// Kind of Boolean structural equation.
///
/// Only conjunction (`any enabler ∧ no active blocker`) is generated today;
/// the tag is kept open so serialized models remain self-describing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquationKind {
    #[default]
    BooleanConjunction,
}

/// One structural equation: the target node as a Boolean function of its
/// parents.
///
/// `parent_variables` enable the target disjunctively (any single attack
/// path suffices); `negated_parents` are controls that block it, also
/// disjunctively (any active blocker defends).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuralEquation {
    /// Endogenous node this equation defines.
    pub target: String,
    /// Enabling parent ids, in edge insertion order.
    #[serde(default)]
    pub parent_variables: Vec<String>,
    /// Blocking control ids, in edge insertion order.
    #[serde(default)]
    pub negated_parents: Vec<String>,
    /// Equation kind tag.
    #[serde(default)]
    pub equation_type: EquationKind,
}

/// Category of a modeling assumption.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssumptionCategory {
    #[default]
    Threat,
    Config,
    Trust,
    Business,
}

/// One named modeling assumption.
///
/// Synthetic assumptions derived from a node property carry a `binding` to
/// that node's id, recorded at build time so assumption toggling resolves
/// by lookup instead of name parsing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assumption {
    /// Stable identifier.
    pub id: String,
    /// Unique assumption name.
    pub name: String,
    /// Where the assumption came from.
    #[serde(default)]
    pub description: String,
    /// Assumption category.
    #[serde(default)]
    pub category: AssumptionCategory,
    /// Whether the assumption currently holds.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Optional sensitivity weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<f64>,
    /// Node id this assumption is bound to, for synthetic assumptions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Exogenous-constraint entry for one root node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExogenousDefault {
    /// Root node id.
    pub id: String,
    /// Node classification.
    pub class: NodeClass,
    /// Node display name.
    pub name: String,
    /// Value range; always `"boolean"` in the current encoding.
    pub range: String,
    /// Default value, when the class implies one (identities default true).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
}

/// A built Structural Causal Model.
///
/// Owns the validated graph and everything derived from it. Internal
/// lookup tables are rebuilt on construction and excluded from
/// serialization.
#[derive(Clone, Debug, Serialize)]
pub struct Scm {
    /// The validated (acyclic) infrastructure graph.
    pub graph: CausalGraph,
    /// One equation per node with at least one parent, in node insertion
    /// order.
    pub equations: Vec<StructuralEquation>,
    /// De-duplicated assumption ledger.
    pub assumptions: Vec<Assumption>,
    /// Root-variable table, in node insertion order.
    pub exogenous: Vec<ExogenousDefault>,
    #[serde(skip)]
    node_pos: FxHashMap<String, usize>,
    #[serde(skip)]
    equation_pos: FxHashMap<String, usize>,
}

impl Scm {
    pub(crate) fn new(
        graph: CausalGraph,
        equations: Vec<StructuralEquation>,
        assumptions: Vec<Assumption>,
        exogenous: Vec<ExogenousDefault>,
    ) -> Self {
        let node_pos = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(pos, node)| (node.id.clone(), pos))
            .collect();
        let equation_pos = equations
            .iter()
            .enumerate()
            .map(|(pos, eq)| (eq.target.clone(), pos))
            .collect();
        Self {
            graph,
            equations,
            assumptions,
            exogenous,
            node_pos,
            equation_pos,
        }
    }

    /// O(1) node lookup by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&InfraNode> {
        self.node_pos.get(id).map(|&pos| &self.graph.nodes[pos])
    }

    /// The equation defining `id`, if `id` is endogenous.
    #[must_use]
    pub fn equation_for(&self, id: &str) -> Option<&StructuralEquation> {
        self.equation_pos.get(id).map(|&pos| &self.equations[pos])
    }

    /// Returns `true` if `id` is a root (has no defining equation).
    #[must_use]
    pub fn is_exogenous(&self, id: &str) -> bool {
        !self.equation_pos.contains_key(id)
    }

    /// Borrowed adjacency index over the owned graph.
    ///
    /// The graph was validated acyclic at build time, so this cannot fail.
    #[must_use]
    pub fn index(&self) -> GraphIndex<'_> {
        GraphIndex::build_unchecked(&self.graph)
    }

    /// Node ids in topological order.
    #[must_use]
    pub fn topological_order(&self) -> Vec<String> {
        self.index().topo_order().to_vec()
    }

    /// Backward causal slice: all ancestors of `target` plus `target`
    /// itself.
    #[must_use]
    pub fn backward_slice(&self, target: &str) -> Vec<String> {
        let mut slice = vec![target.to_string()];
        slice.extend(self.index().ancestors(target));
        slice
    }

    /// Resolves an assumption by id or by name.
    #[must_use]
    pub fn assumption(&self, key: &str) -> Option<&Assumption> {
        self.assumptions
            .iter()
            .find(|a| a.id == key || a.name == key)
    }

    /// Resolves the node a control/identity assumption is bound to.
    #[must_use]
    pub fn assumption_binding(&self, key: &str) -> Option<&str> {
        self.assumption(key)
            .and_then(|a| a.binding.as_deref())
    }

    /// Validates that every target asset of a goal resolves to a known
    /// node id. Required conditions may reference free variables and are
    /// not checked here.
    #[must_use]
    pub fn resolves_goal(&self, goal: &GoalPredicate) -> bool {
        goal.target_assets
            .iter()
            .all(|id| self.node_pos.contains_key(id))
    }
}
