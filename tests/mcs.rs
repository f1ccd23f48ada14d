mod common;

use common::*;
use inevitability::analysis::{Feasibility, McsAlgorithm, McsExtractor};
use inevitability::model::{CausalGraph, GoalPredicate, InfraNode};
use inevitability::scm::ScmBuilder;
use inevitability::solver::{CausalSolver, Interventions};
use inevitability::types::ControlState;

#[test]
fn greedy_finds_the_firewall_singleton() {
    let (graph, goal) = trivial_chain(ControlState::Inactive);
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);

    let result = McsExtractor::new(&solver).extract(&goal, 5, McsAlgorithm::Greedy);
    assert_eq!(result.algorithm, McsAlgorithm::Greedy);
    assert_eq!(result.mcs_sets.len(), 1);

    let set = &result.mcs_sets[0];
    assert_eq!(set.control_ids(), ["fw"]);
    assert_eq!(set.cardinality, 1);
    assert_eq!(set.total_cost, 50_000.0);
    assert_eq!(set.feasibility, Feasibility::Budgeted);
    assert!(set.validated);
    assert_eq!(set.elements[0].remediation_action, "Enforce Firewall");
}

#[test]
fn exact_emits_both_two_element_sets_and_greedy_one() {
    let (graph, goal) = parallel_paths_five_controls();
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);
    let extractor = McsExtractor::new(&solver);

    let exact = extractor.extract(&goal, 5, McsAlgorithm::Exact);
    let sets: Vec<Vec<&str>> = exact.mcs_sets.iter().map(|s| s.control_ids()).collect();
    assert_eq!(sets, vec![vec!["c1", "c3"], vec!["c2", "c3"]]);

    let greedy = extractor.extract(&goal, 5, McsAlgorithm::Greedy);
    assert_eq!(greedy.mcs_sets.len(), 1);
    assert_eq!(greedy.mcs_sets[0].control_ids(), ["c1", "c2", "c3"]);
}

#[test]
fn exact_sets_satisfy_blocking_and_minimality() {
    let (graph, goal) = parallel_paths_five_controls();
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);
    let extractor = McsExtractor::new(&solver);

    let exact = extractor.extract(&goal, 5, McsAlgorithm::Exact);
    assert!(!exact.mcs_sets.is_empty());

    for set in &exact.mcs_sets {
        // Forcing the whole set blocks the goal.
        let forced: Interventions = set
            .elements
            .iter()
            .map(|e| (e.control_id.clone(), true))
            .collect();
        assert!(
            solver
                .check_satisfiability(&goal, Some(&forced))
                .status
                .is_unsat()
        );

        // Dropping any single member lets the attacker back in.
        for dropped in &set.elements {
            let subset: Interventions = set
                .elements
                .iter()
                .filter(|e| e.control_id != dropped.control_id)
                .map(|e| (e.control_id.clone(), true))
                .collect();
            assert!(
                solver
                    .check_satisfiability(&goal, Some(&subset))
                    .status
                    .is_sat()
            );
        }
    }
}

#[test]
fn proof_artifact_records_blocking_and_minimality() {
    let (graph, goal) = parallel_paths_five_controls();
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);
    let extractor = McsExtractor::new(&solver);

    let exact = extractor.extract(&goal, 5, McsAlgorithm::Exact);
    let proof = extractor.generate_proof(&goal, &exact.mcs_sets[0]);

    assert_eq!(proof.proof_type, "mcs_blocking");
    assert!(proof.claim.contains("C1"));
    assert_eq!(proof.evidence["blocking_verified"], serde_json::json!(true));
    assert_eq!(proof.evidence["all_subsets_sat"], serde_json::json!(true));
    let checks = proof.evidence["minimality_checks"].as_object().unwrap();
    assert_eq!(checks.len(), 2);
    assert!(checks.values().all(|v| v.as_str() == Some("sat")));
}

#[test]
fn no_controls_means_no_mcs() {
    let graph = CausalGraph::new()
        .add_node(InfraNode::identity("i", "I"))
        .add_node(InfraNode::asset("t", "T"))
        .add_edge(inevitability::model::InfraEdge::new(
            "i",
            "t",
            inevitability::types::EdgeKind::Access,
        ));
    let goal = GoalPredicate::new("g", "G").with_target("t");
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);

    let result = McsExtractor::new(&solver).extract(&goal, 5, McsAlgorithm::Greedy);
    assert!(result.mcs_sets.is_empty());
}

#[test]
fn defense_impossible_emits_nothing() {
    // The only control guards an island; no subset can block the goal.
    let (graph, goal) = two_identity_split();
    // Remove the badge's influence by targeting the unguarded lobby.
    let goal = GoalPredicate::new(goal.id, goal.name).with_target("lobby");
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);

    let greedy = McsExtractor::new(&solver).extract(&goal, 5, McsAlgorithm::Greedy);
    assert!(greedy.mcs_sets.is_empty());
    let exact = McsExtractor::new(&solver).extract(&goal, 5, McsAlgorithm::Exact);
    assert!(exact.mcs_sets.is_empty());
}

#[test]
fn cardinality_bound_is_respected() {
    let (graph, goal) = parallel_paths_five_controls();
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);

    // Bound 1: no single control blocks both paths, so exact finds none.
    let exact = McsExtractor::new(&solver).extract(&goal, 1, McsAlgorithm::Exact);
    assert!(exact.mcs_sets.is_empty());
}
