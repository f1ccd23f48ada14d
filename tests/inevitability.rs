mod common;

use common::*;
use inevitability::model::{CausalGraph, GoalPredicate, InfraEdge, InfraNode};
use inevitability::scm::ScmBuilder;
use inevitability::solver::CausalSolver;
use inevitability::types::{ControlState, EdgeKind};

#[test]
fn open_trivial_chain_is_fully_inevitable() {
    let (graph, goal) = trivial_chain(ControlState::Inactive);
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);

    let result = solver.compute_inevitability(&goal, None);
    assert_eq!(result.score, 1.0);
    assert!(result.is_inevitable);
    assert_eq!(
        result.witness_path.as_deref(),
        Some(
            &[
                "Attacker".to_string(),
                "Web Server".to_string(),
                "Customer Database".to_string()
            ][..]
        )
    );
}

#[test]
fn guarded_trivial_chain_is_defended() {
    let (graph, goal) = trivial_chain(ControlState::Active);
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);

    let result = solver.compute_inevitability(&goal, None);
    assert_eq!(result.score, 0.0);
    assert!(!result.is_inevitable);
}

#[test]
fn two_identity_split_scores_half() {
    let (graph, goal) = two_identity_split();
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);

    let result = solver.compute_inevitability(&goal, None);
    assert_eq!(result.score, 0.5);
    assert!(!result.is_inevitable);
}

#[test]
fn no_controls_on_target_boosts_to_at_least_point_eight() {
    // Identities and assets only; the reachable half would score 0.5 but
    // the undefended target raises it to 0.8.
    let graph = CausalGraph::new()
        .add_node(InfraNode::identity("a", "A"))
        .add_node(InfraNode::identity("b", "B"))
        .add_node(InfraNode::asset("t", "Target"))
        .add_node(InfraNode::asset("other", "Other"))
        .add_edge(InfraEdge::new("a", "t", EdgeKind::Access))
        .add_edge(InfraEdge::new("b", "other", EdgeKind::Access));
    let goal = GoalPredicate::new("g", "G").with_target("t");
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);

    let result = solver.compute_inevitability(&goal, None);
    assert!(result.score >= 0.8);
}

#[test]
fn empty_identity_set_with_sat_base_scores_one() {
    let graph = CausalGraph::new()
        .add_node(InfraNode::asset("bucket", "Bucket"))
        .add_node(InfraNode::asset("data", "Data"))
        .add_edge(InfraEdge::new("bucket", "data", EdgeKind::Access));
    let goal = GoalPredicate::new("g", "G").with_target("data");
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);

    let result = solver.compute_inevitability(&goal, None);
    assert_eq!(result.score, 1.0);
    assert!(result.is_inevitable);
}

#[test]
fn threshold_one_needs_full_reachability() {
    let (graph, goal) = two_identity_split();
    let goal = goal.with_threshold(1.0);
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);

    // 0.5 < 1.0: not inevitable at the strictest threshold.
    let result = solver.compute_inevitability(&goal, None);
    assert!(!result.is_inevitable);

    // A fully reachable goal still crosses it.
    let (graph, goal) = trivial_chain(ControlState::Inactive);
    let goal = goal.with_threshold(1.0);
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);
    let result = solver.compute_inevitability(&goal, None);
    assert_eq!(result.score, 1.0);
    assert!(result.is_inevitable);
}

#[test]
fn score_always_within_unit_interval_and_consistent_with_flag() {
    for state in [
        ControlState::Active,
        ControlState::Inactive,
        ControlState::Partial,
        ControlState::Unknown,
    ] {
        let (graph, goal) = trivial_chain(state);
        let scm = ScmBuilder::new(graph).build().unwrap();
        let solver = CausalSolver::new(&scm);
        let result = solver.compute_inevitability(&goal, None);
        assert!((0.0..=1.0).contains(&result.score));
        assert_eq!(result.is_inevitable, result.score >= goal.threshold);
    }
}
