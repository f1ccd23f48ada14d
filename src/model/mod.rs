//! Infrastructure data model.
//!
//! Pure value types describing the analyzed environment: typed nodes,
//! directed causal edges, the containing [`CausalGraph`], and attacker
//! [`GoalPredicate`]s. These carry no behavior beyond construction and
//! accessors; graph queries live in [`crate::topology`] and causal
//! semantics in [`crate::scm`] and [`crate::solver`].
//!
//! Node shapes are heterogeneous: each [`InfraNode`] carries a shared
//! header (id, name, description, confidence) plus a [`NodeKind`] variant
//! with the per-class payload. Downstream code pattern-matches on the
//! variant instead of probing optional fields.
//!
//! # Examples
//!
//! ```rust
//! use inevitability::model::{CausalGraph, GoalPredicate, InfraEdge, InfraNode};
//! use inevitability::types::{ControlState, EdgeKind};
//!
//! let graph = CausalGraph::new()
//!     .add_node(InfraNode::identity("attacker", "External Attacker"))
//!     .add_node(InfraNode::asset("web", "Web Server"))
//!     .add_node(
//!         InfraNode::control("fw", "Perimeter Firewall", ControlState::Active)
//!             .with_annual_cost(50_000.0),
//!     )
//!     .add_edge(InfraEdge::new("attacker", "web", EdgeKind::Access).with_exploit_probability(0.8))
//!     .add_edge(InfraEdge::new("fw", "web", EdgeKind::Control));
//!
//! let goal = GoalPredicate::new("exfil", "Data Exfiltration").with_target("web");
//! assert_eq!(graph.node_count(), 3);
//! assert_eq!(goal.threshold, 0.7);
//! ```

mod edge;
mod goal;
mod graph;
mod node;

pub use edge::{EdgeConstraint, InfraEdge};
pub use goal::GoalPredicate;
pub use graph::CausalGraph;
pub use node::{AssetProfile, ControlProfile, IdentityProfile, InfraNode, NodeKind};
