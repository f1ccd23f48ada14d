mod common;

use common::*;
use inevitability::engine::{AnalysisOptions, counterfactual, run_analysis, toggle_assumption};
use inevitability::error::EngineError;
use inevitability::model::GoalPredicate;
use inevitability::scm::ScmBuilder;
use inevitability::solver::{CausalSolver, Interventions};
use inevitability::types::{ControlState, DefenseClass};

fn fast_options() -> AnalysisOptions {
    AnalysisOptions {
        monte_carlo_trials: 2_000,
        monte_carlo_seed: Some(42),
        ..AnalysisOptions::default()
    }
}

#[test]
fn full_pipeline_on_the_open_trivial_chain() {
    let (graph, goal) = trivial_chain(ControlState::Inactive);
    let graph = graph.with_metadata("name", serde_json::json!("Trivial Chain"));

    let result = run_analysis(graph, vec![goal], fast_options()).unwrap();

    assert_eq!(result.scenario_name, "Trivial Chain");
    assert!(!result.analysis_id.is_empty());

    // Inevitability: single identity, reachable goal.
    let inevitability = &result.inevitability_results[0];
    assert_eq!(inevitability.score, 1.0);
    assert!(inevitability.is_inevitable);

    // Greedy MCS: the firewall alone.
    assert_eq!(result.mcs_results[0].mcs_sets[0].control_ids(), ["fw"]);
    assert_eq!(result.proof_artifacts.len(), 1);

    // Theater: the MCS member classifies critical.
    let fw = result.theater_reports[0]
        .classifications
        .iter()
        .find(|c| c.control_id == "fw")
        .unwrap();
    assert_eq!(fw.classification, DefenseClass::Critical);

    // Downstream stages all produced output.
    assert_eq!(result.explanations.len(), 1);
    assert!(result.explanations[0].finding.contains("INEVITABLE"));
    assert!(!result.collapse_ranking.is_empty());
    assert_eq!(result.fragility_profile.mean_mcs_cardinality, 1.0);
    assert_eq!(result.certification.goals_analyzed, 1);
    assert_eq!(result.forecast.forecast_horizon_months, 12);
    assert!(result.goal_collisions.is_empty());
    assert_eq!(result.probability.goal_risks.len(), 1);
    assert!(result.computation_time_ms >= 0.0);

    // The probability layer wrote back into the inevitability result.
    assert!(inevitability.probabilistic_score.is_some());
    assert!(inevitability.risk_distribution.is_some());
}

#[test]
fn theater_counts_always_partition_controls() {
    let (graph, goal) = theater_scenario();
    let result = run_analysis(graph, vec![goal], fast_options()).unwrap();

    for report in &result.theater_reports {
        assert_eq!(
            report.critical_count
                + report.necessary_count
                + report.partial_count
                + report.irrelevant_count,
            report.total_controls
        );
    }
    assert_eq!(result.economic_report.wasted_spend, 35_000.0);
    assert_eq!(result.economic_report.total_security_spend, 85_000.0);
}

#[test]
fn cyclic_input_fails_before_any_solving() {
    let (graph, goal) = cyclic_graph();
    match run_analysis(graph, vec![goal], AnalysisOptions::default()) {
        Err(EngineError::CycleDetected { cycles }) => {
            assert_eq!(cycles[0], vec!["a", "b", "a"]);
        }
        other => panic!("expected CycleDetected, got {other:?}"),
    }
}

#[test]
fn multi_goal_run_produces_collisions() {
    let (graph, goal) = theater_scenario();
    let second = GoalPredicate::new("deface", "Web Defacement")
        .with_target("web")
        .with_threshold(0.7);

    let result = run_analysis(graph, vec![goal, second], fast_options()).unwrap();
    assert_eq!(result.inevitability_results.len(), 2);
    assert_eq!(result.goal_collisions.len(), 1);

    // Both goals are cut by the firewall: shared control, synergy.
    let collision = &result.goal_collisions[0];
    assert_eq!(collision.shared_controls, ["fw"]);
}

#[test]
fn exact_algorithm_flows_through_options() {
    let (graph, goal) = parallel_paths_five_controls();
    let options = AnalysisOptions {
        algorithm: inevitability::analysis::McsAlgorithm::Exact,
        ..fast_options()
    };
    let result = run_analysis(graph, vec![goal], options).unwrap();
    assert_eq!(result.mcs_results[0].mcs_sets.len(), 2);
    assert_eq!(result.proof_artifacts.len(), 2);
}

#[test]
fn follow_up_counterfactual_matches_fresh_baseline() {
    let (graph, goal) = trivial_chain(ControlState::Active);
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);
    let goals = vec![goal];

    // An empty what-if reproduces the baseline for every goal.
    let outcomes = counterfactual(&solver, &goals, &Interventions::default(), None);
    let baseline = solver.compute_inevitability(&goals[0], None);
    assert_eq!(outcomes["exfil"].before, baseline.score);
    assert_eq!(outcomes["exfil"].delta, 0.0);

    // Narrowing to an unknown goal id yields an empty map.
    let none = counterfactual(&solver, &goals, &Interventions::default(), Some("nope"));
    assert!(none.is_empty());
}

#[test]
fn follow_up_toggle_uses_assumption_bindings() {
    let (graph, goal) = trivial_chain(ControlState::Active);
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);
    let goals = vec![goal];

    let outcomes = toggle_assumption(&solver, &goals, "Firewall_is_active", false, Some("exfil"));
    assert_eq!(outcomes.len(), 1);
    let what_if = &outcomes["exfil"];
    assert_eq!(what_if.after, 1.0);
    assert!(what_if.crossed_threshold);
}
