//! Symbolic satisfiability solver over a Structural Causal Model.
//!
//! [`CausalSolver`] wraps a read-only [`Scm`] and answers one question:
//! can an attacker goal be realized under the encoded model and a set of
//! do-operator interventions? `Sat` means the attacker wins, `Unsat` means
//! the defender wins, and `Timeout` is a recoverable verdict that callers
//! score conservatively.
//!
//! The encoding (see [`encode`]) treats enabler lists disjunctively — any
//! single attack path suffices — and blocking controls disjunctively
//! inside a negation — any active blocker defends. The solver computes
//! reachability under blocking, not a probabilistic product; quantitative
//! risk lives in [`crate::probability`].
//!
//! # Examples
//!
//! ```rust
//! use inevitability::model::{CausalGraph, GoalPredicate, InfraEdge, InfraNode};
//! use inevitability::scm::ScmBuilder;
//! use inevitability::solver::{CausalSolver, Interventions};
//! use inevitability::types::{ControlState, EdgeKind, SolverStatus};
//!
//! let graph = CausalGraph::new()
//!     .add_node(InfraNode::identity("attacker", "Attacker"))
//!     .add_node(InfraNode::asset("db", "Database"))
//!     .add_node(InfraNode::control("fw", "Firewall", ControlState::Inactive))
//!     .add_edge(InfraEdge::new("attacker", "db", EdgeKind::Access))
//!     .add_edge(InfraEdge::new("fw", "db", EdgeKind::Control));
//!
//! let scm = ScmBuilder::new(graph).build().unwrap();
//! let solver = CausalSolver::new(&scm);
//! let goal = GoalPredicate::new("exfil", "Exfiltration").with_target("db");
//!
//! // The inactive firewall does not block: the attacker wins.
//! assert_eq!(solver.check_satisfiability(&goal, None).status, SolverStatus::Sat);
//!
//! // Forcing the firewall on blocks the goal.
//! let mut force = Interventions::default();
//! force.insert("fw".into(), true);
//! assert_eq!(
//!     solver.check_satisfiability(&goal, Some(&force)).status,
//!     SolverStatus::Unsat
//! );
//! ```

mod encode;
mod inevitability;

pub use inevitability::{InevitabilityResult, RiskDistribution};

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::GoalPredicate;
use crate::scm::Scm;
use crate::topology::GraphIndex;
use crate::types::SolverStatus;

use encode::{Encoding, SolveOutcome};

/// Default per-call solver deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A partial do-operator map: node id → pinned Boolean value.
///
/// Pinning a variable severs its structural equation; everything not in
/// the map keeps its modeled behavior.
pub type Interventions = FxHashMap<String, bool>;

/// A satisfying assignment: every declared variable id → value, ordered by
/// id so serialized witnesses are stable.
pub type Witness = BTreeMap<String, bool>;

/// Outcome of one satisfiability check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolverResult {
    /// Verdict.
    pub status: SolverStatus,
    /// Full assignment when `status` is `Sat`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub witness: Option<Witness>,
    /// Wall-clock solve time in milliseconds.
    pub solve_time_ms: f64,
    /// Name of the deciding backend.
    pub solver_used: String,
}

const SOLVER_NAME: &str = "scm-boolean-search";

/// Symbolic solver borrowing a built SCM.
///
/// The solver carries only its own adjacency index and timeout knob; it
/// never mutates the model, so one solver can serve every analyzer of an
/// analysis sequentially.
pub struct CausalSolver<'s> {
    scm: &'s Scm,
    index: GraphIndex<'s>,
    timeout: Duration,
}

impl<'s> CausalSolver<'s> {
    /// Wraps an SCM with the default 30-second timeout.
    #[must_use]
    pub fn new(scm: &'s Scm) -> Self {
        Self::with_timeout(scm, DEFAULT_TIMEOUT)
    }

    /// Wraps an SCM with an explicit per-call timeout.
    #[must_use]
    pub fn with_timeout(scm: &'s Scm, timeout: Duration) -> Self {
        Self {
            scm,
            index: scm.index(),
            timeout,
        }
    }

    /// The wrapped model.
    #[must_use]
    pub fn scm(&self) -> &'s Scm {
        self.scm
    }

    /// The solver's adjacency index over the wrapped model.
    #[must_use]
    pub(crate) fn graph_index(&self) -> &GraphIndex<'s> {
        &self.index
    }

    /// Checks whether `goal` is satisfiable under `interventions`.
    ///
    /// Returns `Sat` with a full witness, `Unsat`, or `Timeout` once the
    /// per-call deadline passes. Timeouts are verdicts, not errors.
    pub fn check_satisfiability(
        &self,
        goal: &GoalPredicate,
        interventions: Option<&Interventions>,
    ) -> SolverResult {
        let started = Instant::now();
        let empty = Interventions::default();
        let interventions = interventions.unwrap_or(&empty);

        let encoding = Encoding::lower(self.scm, goal, interventions);
        debug!(
            goal = %goal.id,
            pinned = interventions.len(),
            free = encoding.free_count(),
            "checking satisfiability"
        );

        let timeout_ms = self.timeout.as_millis() as u64;
        let outcome = encoding.solve(started, timeout_ms);
        let elapsed = started.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            SolveOutcome::Sat(values) => {
                let witness: Witness = encoding
                    .var_ids
                    .iter()
                    .cloned()
                    .zip(values)
                    .collect();
                SolverResult {
                    status: SolverStatus::Sat,
                    witness: Some(witness),
                    solve_time_ms: elapsed,
                    solver_used: SOLVER_NAME.to_string(),
                }
            }
            SolveOutcome::Unsat => SolverResult {
                status: SolverStatus::Unsat,
                witness: None,
                solve_time_ms: elapsed,
                solver_used: SOLVER_NAME.to_string(),
            },
            SolveOutcome::Timeout => {
                warn!(goal = %goal.id, elapsed_ms = elapsed, "solver timed out");
                SolverResult {
                    status: SolverStatus::Timeout,
                    witness: None,
                    solve_time_ms: elapsed,
                    solver_used: SOLVER_NAME.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CausalGraph, InfraEdge, InfraNode};
    use crate::scm::ScmBuilder;
    use crate::types::{ControlState, EdgeKind};

    fn chain_scm(firewall: ControlState) -> Scm {
        let graph = CausalGraph::new()
            .add_node(InfraNode::identity("attacker", "Attacker"))
            .add_node(InfraNode::asset("web", "Web"))
            .add_node(InfraNode::asset("db", "DB"))
            .add_node(InfraNode::control("fw", "Firewall", firewall))
            .add_edge(InfraEdge::new("attacker", "web", EdgeKind::Access))
            .add_edge(InfraEdge::new("web", "db", EdgeKind::Lateral))
            .add_edge(InfraEdge::new("fw", "web", EdgeKind::Control));
        ScmBuilder::new(graph).build().unwrap()
    }

    #[test]
    fn witness_covers_every_variable() {
        let scm = chain_scm(ControlState::Inactive);
        let solver = CausalSolver::new(&scm);
        let goal = GoalPredicate::new("g", "G").with_target("db");
        let result = solver.check_satisfiability(&goal, None);
        assert_eq!(result.status, SolverStatus::Sat);
        let witness = result.witness.unwrap();
        assert_eq!(witness.len(), 4);
        assert_eq!(witness.get("db"), Some(&true));
        assert_eq!(witness.get("fw"), Some(&false));
    }

    #[test]
    fn active_firewall_defends_by_default() {
        let scm = chain_scm(ControlState::Active);
        let solver = CausalSolver::new(&scm);
        let goal = GoalPredicate::new("g", "G").with_target("db");
        assert_eq!(
            solver.check_satisfiability(&goal, None).status,
            SolverStatus::Unsat
        );
    }

    #[test]
    fn identical_interventions_give_identical_results() {
        let scm = chain_scm(ControlState::Inactive);
        let solver = CausalSolver::new(&scm);
        let goal = GoalPredicate::new("g", "G").with_target("db");
        let mut iv = Interventions::default();
        iv.insert("fw".to_string(), true);
        let first = solver.check_satisfiability(&goal, Some(&iv));
        let second = solver.check_satisfiability(&goal, Some(&iv));
        assert_eq!(first.status, second.status);
        assert_eq!(first.witness, second.witness);
    }

    #[test]
    fn goal_over_required_condition_conjoins() {
        let scm = chain_scm(ControlState::Active);
        let solver = CausalSolver::new(&scm);
        // web is blocked by the active firewall, so requiring it alongside
        // an intervention-freed db still fails.
        let goal = GoalPredicate::new("g", "G").with_target("db").with_condition("web");
        let mut iv = Interventions::default();
        iv.insert("db".to_string(), true);
        assert_eq!(
            solver.check_satisfiability(&goal, Some(&iv)).status,
            SolverStatus::Unsat
        );
    }
}
