//! # Inevitability: Causal Security Posture Analysis
//!
//! Inevitability models an infrastructure as a Structural Causal Model
//! (SCM) and answers causal questions about attacker goals: is a goal
//! structurally inevitable, what is the minimum set of controls that
//! blocks it, which controls are security theater, how fragile is the
//! architecture, how does risk drift over time, and which defenses yield
//! the best return.
//!
//! ## Core Concepts
//!
//! - **Nodes**: Typed infrastructure entities — assets, identities,
//!   privileges, controls, channels, trust boundaries
//! - **Edges**: Directed causal relationships; control edges block,
//!   everything else enables
//! - **SCM**: One Boolean equation per endogenous node over a validated DAG
//! - **Interventions**: do-operator pins that sever equations; every
//!   hypothetical goes through them, never through model mutation
//! - **Analyzers**: inevitability, MCS, theater, counterfactual, collapse,
//!   economics, forecasting, and a quantitative probability layer
//!
//! ## Quick Start
//!
//! ```rust
//! use inevitability::engine::{AnalysisOptions, run_analysis};
//! use inevitability::model::{CausalGraph, GoalPredicate, InfraEdge, InfraNode};
//! use inevitability::types::{ControlState, EdgeKind};
//!
//! let graph = CausalGraph::new()
//!     .add_node(InfraNode::identity("attacker", "External Attacker"))
//!     .add_node(InfraNode::asset("web", "Web Server"))
//!     .add_node(InfraNode::asset("db", "Customer Database"))
//!     .add_node(
//!         InfraNode::control("fw", "Perimeter Firewall", ControlState::Inactive)
//!             .with_annual_cost(50_000.0)
//!             .with_bypass_probability(0.3),
//!     )
//!     .add_edge(InfraEdge::new("attacker", "web", EdgeKind::Access).with_exploit_probability(0.8))
//!     .add_edge(InfraEdge::new("web", "db", EdgeKind::Lateral).with_exploit_probability(0.9))
//!     .add_edge(InfraEdge::new("fw", "web", EdgeKind::Control));
//!
//! let goal = GoalPredicate::new("exfil", "Data Exfiltration").with_target("db");
//!
//! let result = run_analysis(graph, vec![goal], AnalysisOptions::default()).unwrap();
//! assert_eq!(result.inevitability_results[0].score, 1.0);
//! assert_eq!(result.mcs_results[0].mcs_sets[0].control_ids(), ["fw"]);
//! ```
//!
//! ## Follow-up Queries
//!
//! Sessions that retain the SCM and solver can run counterfactuals
//! without re-analyzing:
//!
//! ```rust
//! use inevitability::engine::toggle_assumption;
//! use inevitability::model::{CausalGraph, GoalPredicate, InfraEdge, InfraNode};
//! use inevitability::scm::ScmBuilder;
//! use inevitability::solver::CausalSolver;
//! use inevitability::types::{ControlState, EdgeKind};
//!
//! let graph = CausalGraph::new()
//!     .add_node(InfraNode::identity("attacker", "Attacker"))
//!     .add_node(InfraNode::asset("db", "Database"))
//!     .add_node(InfraNode::control("fw", "Firewall", ControlState::Inactive))
//!     .add_edge(InfraEdge::new("attacker", "db", EdgeKind::Access))
//!     .add_edge(InfraEdge::new("fw", "db", EdgeKind::Control));
//! let goals = vec![GoalPredicate::new("exfil", "Exfiltration").with_target("db")];
//!
//! let scm = ScmBuilder::new(graph).build().unwrap();
//! let solver = CausalSolver::new(&scm);
//!
//! let outcomes = toggle_assumption(&solver, &goals, "fw", true, None);
//! assert!(outcomes["exfil"].crossed_threshold);
//! ```
//!
//! ## Module Guide
//!
//! - [`model`] - Infrastructure graph, goal predicates, node/edge types
//! - [`topology`] - Adjacency index, topological order, cycle detection
//! - [`scm`] - Structural equations, assumptions, SCM construction
//! - [`solver`] - Boolean satisfiability, interventions, inevitability
//! - [`analysis`] - MCS, theater, counterfactual, collapse, and friends
//! - [`probability`] - Path risk, Monte Carlo, control impact ranking
//! - [`engine`] - Validation and the fixed analysis pipeline
//! - [`error`] - Engine boundary errors
//! - [`telemetry`] - Opt-in tracing initialization

pub mod analysis;
pub mod engine;
pub mod error;
pub mod model;
pub mod probability;
pub mod scm;
pub mod solver;
pub mod telemetry;
pub mod topology;
pub mod types;

mod utils;
