//! Inevitability scoring.
//!
//! The inevitability score answers: what fraction of realistic attacker
//! starting positions make the goal achievable? Each identity is tested as
//! the sole compromised entry point; the ratio of entry points that still
//! reach the goal is the score, with two structural boosts layered on top
//! (a reachable goal never scores below 0.3, and a reachable goal whose
//! targets have no adjacent control never scores below 0.8).

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::GoalPredicate;
use crate::types::SolverStatus;
use crate::utils::round_to;

use super::{CausalSolver, Interventions, SolverResult, Witness};

/// Monte Carlo risk summary attached by the probability layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskDistribution {
    /// Mean simulated success probability.
    pub mean: f64,
    /// Lower bound of the 95% confidence interval.
    pub ci_lower: f64,
    /// Upper bound of the 95% confidence interval.
    pub ci_upper: f64,
}

/// Inevitability verdict for one goal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InevitabilityResult {
    /// Goal id.
    pub goal_id: String,
    /// Goal display name.
    pub goal_name: String,
    /// Score in `[0, 1]`, rounded to two decimals.
    pub score: f64,
    /// `score >= goal.threshold`.
    pub is_inevitable: bool,
    /// Names of the true nodes on one attack path back from the targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub witness_path: Option<Vec<String>>,
    /// The base satisfiability check backing this score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver_result: Option<SolverResult>,
    /// Quantitative combined risk, attached by the probability layer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilistic_score: Option<f64>,
    /// Adversary profile name used for the probabilistic score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adversary_profile: Option<String>,
    /// Monte Carlo distribution, attached by the probability layer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_distribution: Option<RiskDistribution>,
}

impl InevitabilityResult {
    fn new(goal: &GoalPredicate, score: f64, is_inevitable: bool) -> Self {
        Self {
            goal_id: goal.id.clone(),
            goal_name: goal.name.clone(),
            score,
            is_inevitable,
            witness_path: None,
            solver_result: None,
            probabilistic_score: None,
            adversary_profile: None,
            risk_distribution: None,
        }
    }
}

impl CausalSolver<'_> {
    /// Computes the inevitability score for `goal` under optional baseline
    /// interventions.
    ///
    /// A timed-out base check is scored conservatively as 1.0 so a
    /// defender never reads a timeout as "safe"; the timeout status stays
    /// visible in `solver_result`.
    pub fn compute_inevitability(
        &self,
        goal: &GoalPredicate,
        interventions: Option<&Interventions>,
    ) -> InevitabilityResult {
        let base = self.check_satisfiability(goal, interventions);

        if base.status == SolverStatus::Timeout {
            let mut result = InevitabilityResult::new(goal, 1.0, 1.0 >= goal.threshold);
            result.solver_result = Some(base);
            return result;
        }

        if base.status == SolverStatus::Unsat {
            let mut result = InevitabilityResult::new(goal, 0.0, false);
            result.solver_result = Some(base);
            return result;
        }

        let identities: Vec<&str> = self
            .scm()
            .graph
            .identities()
            .map(|n| n.id.as_str())
            .collect();

        if identities.is_empty() {
            let score = if base.status.is_sat() { 1.0 } else { 0.0 };
            let mut result = InevitabilityResult::new(goal, score, score >= goal.threshold);
            result.witness_path = base
                .witness
                .as_ref()
                .map(|w| self.extract_attack_path(w, goal));
            result.solver_result = Some(base);
            return result;
        }

        // Entry-point analysis: pin one identity compromised, all others
        // clean, and count the starting positions that still reach the
        // goal.
        let mut achievable = 0usize;
        for &identity in &identities {
            let mut test: Interventions = interventions.cloned().unwrap_or_default();
            for &other in &identities {
                test.insert(other.to_string(), other == identity);
            }
            if self
                .check_satisfiability(goal, Some(&test))
                .status
                .is_sat()
            {
                achievable += 1;
            }
        }

        let mut score = achievable as f64 / identities.len() as f64;

        // A goal reachable at all never scores below 0.3.
        if base.status.is_sat() {
            score = score.max(0.3);
        }

        // No control adjacent to any target asset: nothing defends the
        // target directly, so a reachable goal scores at least 0.8.
        let controls_on_target = self
            .graph_index()
            .controls()
            .filter(|ctrl| {
                self.graph_index()
                    .children(&ctrl.id)
                    .iter()
                    .any(|child| goal.target_assets.iter().any(|t| t == child))
            })
            .count();
        if controls_on_target == 0 && base.status.is_sat() {
            score = score.max(0.8);
        }

        let score = round_to(score, 2);
        debug!(
            goal = %goal.id,
            score,
            entry_points = identities.len(),
            achievable,
            "inevitability computed"
        );

        let mut result = InevitabilityResult::new(goal, score, score >= goal.threshold);
        result.witness_path = base
            .witness
            .as_ref()
            .map(|w| self.extract_attack_path(w, goal));
        result.solver_result = Some(base);
        result
    }

    /// Names of witness-true nodes reachable backward from the goal
    /// targets, parents before children.
    fn extract_attack_path(&self, witness: &Witness, goal: &GoalPredicate) -> Vec<String> {
        let mut path = Vec::new();
        let mut visited = FxHashSet::default();
        for target in &goal.target_assets {
            self.trace_path(target, witness, &mut path, &mut visited);
        }
        path
    }

    fn trace_path<'a>(
        &'a self,
        id: &'a str,
        witness: &Witness,
        path: &mut Vec<String>,
        visited: &mut FxHashSet<&'a str>,
    ) {
        if !visited.insert(id) {
            return;
        }
        if !witness.get(id).copied().unwrap_or(false) {
            return;
        }
        for &parent in self.graph_index().parents(id) {
            if witness.get(parent).copied().unwrap_or(false) {
                self.trace_path(parent, witness, path, visited);
            }
        }
        if let Some(node) = self.graph_index().node(id) {
            path.push(node.name.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CausalGraph, InfraEdge, InfraNode};
    use crate::scm::{Scm, ScmBuilder};
    use crate::types::{ControlState, EdgeKind};

    fn unguarded_chain() -> Scm {
        let graph = CausalGraph::new()
            .add_node(InfraNode::identity("attacker", "Attacker"))
            .add_node(InfraNode::asset("web", "Web Server"))
            .add_node(InfraNode::asset("db", "Database"))
            .add_edge(InfraEdge::new("attacker", "web", EdgeKind::Access))
            .add_edge(InfraEdge::new("web", "db", EdgeKind::Lateral));
        ScmBuilder::new(graph).build().unwrap()
    }

    #[test]
    fn single_identity_reachable_goal_scores_one() {
        let scm = unguarded_chain();
        let solver = CausalSolver::new(&scm);
        let goal = GoalPredicate::new("g", "G").with_target("db");
        let result = solver.compute_inevitability(&goal, None);
        assert_eq!(result.score, 1.0);
        assert!(result.is_inevitable);
        assert_eq!(
            result.witness_path.as_deref(),
            Some(&["Attacker".to_string(), "Web Server".into(), "Database".into()][..])
        );
    }

    #[test]
    fn unsat_scores_zero() {
        let graph = CausalGraph::new()
            .add_node(InfraNode::identity("attacker", "Attacker"))
            .add_node(InfraNode::asset("db", "Database"))
            .add_node(InfraNode::control("fw", "Firewall", ControlState::Active))
            .add_edge(InfraEdge::new("attacker", "db", EdgeKind::Access))
            .add_edge(InfraEdge::new("fw", "db", EdgeKind::Control));
        let scm = ScmBuilder::new(graph).build().unwrap();
        let solver = CausalSolver::new(&scm);
        let goal = GoalPredicate::new("g", "G").with_target("db");
        let result = solver.compute_inevitability(&goal, None);
        assert_eq!(result.score, 0.0);
        assert!(!result.is_inevitable);
        assert!(result.witness_path.is_none());
    }

    #[test]
    fn split_identities_score_half() {
        let graph = CausalGraph::new()
            .add_node(InfraNode::identity("insider", "Insider"))
            .add_node(InfraNode::identity("visitor", "Visitor"))
            .add_node(InfraNode::asset("db", "Database"))
            .add_node(InfraNode::asset("lobby", "Lobby Kiosk"))
            .add_edge(InfraEdge::new("insider", "db", EdgeKind::Access))
            .add_edge(InfraEdge::new("visitor", "lobby", EdgeKind::Access));
        let scm = ScmBuilder::new(graph).build().unwrap();
        let solver = CausalSolver::new(&scm);
        let goal = GoalPredicate::new("g", "G").with_target("db");
        let result = solver.compute_inevitability(&goal, None);
        assert_eq!(result.score, 0.5);
        assert!(!result.is_inevitable);
    }

    #[test]
    fn no_identities_and_sat_scores_one() {
        let graph = CausalGraph::new()
            .add_node(InfraNode::asset("s3", "Bucket"))
            .add_node(InfraNode::asset("data", "Data"))
            .add_edge(InfraEdge::new("s3", "data", EdgeKind::Access));
        let scm = ScmBuilder::new(graph).build().unwrap();
        let solver = CausalSolver::new(&scm);
        let goal = GoalPredicate::new("g", "G").with_target("data");
        let result = solver.compute_inevitability(&goal, None);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn naked_target_boost_applies() {
        // Two identities, only one reaches the target: the raw ratio is
        // 0.5 but the target has no adjacent control, so 0.8 wins.
        let graph = CausalGraph::new()
            .add_node(InfraNode::identity("a", "A"))
            .add_node(InfraNode::identity("b", "B"))
            .add_node(InfraNode::asset("t", "T"))
            .add_node(InfraNode::asset("other", "Other"))
            .add_edge(InfraEdge::new("a", "t", EdgeKind::Access))
            .add_edge(InfraEdge::new("b", "other", EdgeKind::Access));
        let scm = ScmBuilder::new(graph).build().unwrap();
        let solver = CausalSolver::new(&scm);
        let goal = GoalPredicate::new("g", "G").with_target("t");
        let result = solver.compute_inevitability(&goal, None);
        assert_eq!(result.score, 0.8);
    }

    #[test]
    fn guarded_target_keeps_raw_ratio() {
        // Same shape but a control sits on the target, so the 0.8 boost
        // does not fire and the 0.5 ratio survives (0.3 floor is lower).
        let graph = CausalGraph::new()
            .add_node(InfraNode::identity("a", "A"))
            .add_node(InfraNode::identity("b", "B"))
            .add_node(InfraNode::asset("t", "T"))
            .add_node(InfraNode::asset("other", "Other"))
            .add_node(InfraNode::control("c", "C", ControlState::Inactive))
            .add_edge(InfraEdge::new("a", "t", EdgeKind::Access))
            .add_edge(InfraEdge::new("b", "other", EdgeKind::Access))
            .add_edge(InfraEdge::new("c", "t", EdgeKind::Control));
        let scm = ScmBuilder::new(graph).build().unwrap();
        let solver = CausalSolver::new(&scm);
        let goal = GoalPredicate::new("g", "G").with_target("t");
        let result = solver.compute_inevitability(&goal, None);
        assert_eq!(result.score, 0.5);
    }

    #[test]
    fn idempotent_for_identical_interventions() {
        let scm = unguarded_chain();
        let solver = CausalSolver::new(&scm);
        let goal = GoalPredicate::new("g", "G").with_target("db");
        let mut iv = Interventions::default();
        iv.insert("web".to_string(), false);
        let first = solver.compute_inevitability(&goal, Some(&iv));
        let second = solver.compute_inevitability(&goal, Some(&iv));
        assert_eq!(first.score, second.score);
        assert_eq!(first.is_inevitable, second.is_inevitable);
    }
}
