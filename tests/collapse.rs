mod common;

use common::*;
use inevitability::analysis::CollapseEngine;
use inevitability::model::{CausalGraph, GoalPredicate, InfraEdge, InfraNode};
use inevitability::scm::ScmBuilder;
use inevitability::solver::CausalSolver;
use inevitability::types::{ControlState, EdgeKind, FragilityGrade, GoalStatus};

/// Trivial chain with the firewall active, plus an island-guarding IDS.
fn guarded_scenario() -> (CausalGraph, GoalPredicate) {
    let (graph, goal) = trivial_chain(ControlState::Active);
    let graph = graph
        .add_node(InfraNode::control("ids", "IDS", ControlState::Active).with_annual_cost(35_000.0))
        .add_node(InfraNode::asset("island", "Isolated Host"))
        .add_edge(InfraEdge::new("ids", "island", EdgeKind::Control));
    (graph, goal)
}

#[test]
fn firewall_failure_collapses_the_goal() {
    let (graph, goal) = guarded_scenario();
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);
    let engine = CollapseEngine::new(&solver);

    let fw = engine.compute_collapse_radius("fw", std::slice::from_ref(&goal)).unwrap();
    assert_eq!(fw.collapse_radius, 1);
    assert_eq!(fw.total_inevitability_increase, 1.0);
    assert_eq!(fw.single_point_of_failure_count, 1);
    assert_eq!(fw.criticality_rank, 110.0);

    let ids = engine.compute_collapse_radius("ids", std::slice::from_ref(&goal)).unwrap();
    assert_eq!(ids.collapse_radius, 0);
    assert_eq!(ids.total_inevitability_increase, 0.0);
}

#[test]
fn unknown_or_non_control_ids_yield_none() {
    let (graph, goal) = guarded_scenario();
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);
    let engine = CollapseEngine::new(&solver);

    assert!(engine.compute_collapse_radius("ghost", std::slice::from_ref(&goal)).is_none());
    assert!(engine.compute_collapse_radius("web", std::slice::from_ref(&goal)).is_none());
}

#[test]
fn ranking_orders_by_criticality() {
    let (graph, goal) = guarded_scenario();
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);
    let engine = CollapseEngine::new(&solver);

    let metrics = engine.compute_all_collapse_metrics(std::slice::from_ref(&goal));
    assert_eq!(metrics.len(), 2);
    assert_eq!(metrics[0].control_id, "fw");
    assert_eq!(metrics[1].control_id, "ids");
    assert!(metrics[0].criticality_rank > metrics[1].criticality_rank);
}

#[test]
fn fragility_profile_matches_hand_computation() {
    let (graph, goal) = guarded_scenario();
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);
    let engine = CollapseEngine::new(&solver);

    // Radii are [1, 0] over 2 controls and 1 goal: AFI = 0.5, grade D,
    // one SPOF, brittleness 0.5.
    let profile = engine.compute_fragility(std::slice::from_ref(&goal));
    assert_eq!(profile.afi, 0.5);
    assert_eq!(profile.grade, FragilityGrade::D);
    assert_eq!(profile.spof_count, 1);
    assert_eq!(profile.high_collapse_controls, 1);
    assert_eq!(profile.structural_brittleness, 0.5);

    // SPOF_COLLAPSE fires for the firewall (radius 1 ≥ 0.7·1 goals) and
    // the mean radius 0.5 > 0.3 flags the architecture as fragile.
    let names: Vec<&str> = profile.anti_patterns.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["SPOF_COLLAPSE", "HIGH_AVERAGE_COLLAPSE"]);
}

#[test]
fn empty_inputs_give_default_profile() {
    let (graph, goal) = guarded_scenario();
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);
    let engine = CollapseEngine::new(&solver);

    let profile = engine.compute_fragility(&[]);
    assert_eq!(profile.afi, 0.0);
    assert_eq!(profile.grade, FragilityGrade::C);
    let _ = goal;
}

#[test]
fn simulation_walks_from_defended_to_inevitable() {
    let (graph, goal) = guarded_scenario();
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);
    let engine = CollapseEngine::new(&solver);

    let frames = engine.simulate_collapse(std::slice::from_ref(&goal));
    assert_eq!(frames.len(), 2);

    let baseline = &frames[0];
    assert_eq!(baseline.step, 0);
    assert!(baseline.control_disabled.is_none());
    let g0 = &baseline.goal_states["exfil"];
    assert_eq!(g0.score, 0.0);
    assert_eq!(g0.status, GoalStatus::Defended);
    assert!(!g0.newly_inevitable);

    let first = &frames[1];
    assert_eq!(first.step, 1);
    assert_eq!(first.control_disabled.as_deref(), Some("Firewall"));
    let g1 = &first.goal_states["exfil"];
    assert_eq!(g1.score, 1.0);
    assert_eq!(g1.status, GoalStatus::Inevitable);
    assert!(g1.newly_inevitable);
    assert!(first.narration.contains("Data Exfiltration"));

    // The target node turns red and pulses once the goal is inevitable.
    let db0 = &baseline.node_states["db"];
    assert_eq!(db0.color, "#22c55e");
    let db1 = &first.node_states["db"];
    assert_eq!(db1.color, "#ef4444");
    assert!(db1.pulse);
}

#[test]
fn each_simulation_step_disables_a_distinct_control() {
    let (graph, goal) = parallel_paths_five_controls();
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);
    let engine = CollapseEngine::new(&solver);

    let frames = engine.simulate_collapse(std::slice::from_ref(&goal));
    let disabled: Vec<&str> = frames
        .iter()
        .filter_map(|f| f.control_disabled.as_deref())
        .collect();
    let unique: std::collections::BTreeSet<&str> = disabled.iter().copied().collect();
    assert_eq!(disabled.len(), unique.len(), "controls must not repeat");

    // Steps are consecutive: the disabled set grows by one per frame.
    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame.step, i);
    }
}
