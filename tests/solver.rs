mod common;

use std::time::Duration;

use common::*;
use inevitability::scm::ScmBuilder;
use inevitability::solver::{CausalSolver, Interventions};
use inevitability::types::{ControlState, SolverStatus};

#[test]
fn active_blocker_makes_goal_unsat() {
    let (graph, goal) = trivial_chain(ControlState::Active);
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);
    let result = solver.check_satisfiability(&goal, None);
    assert_eq!(result.status, SolverStatus::Unsat);
    assert!(result.witness.is_none());
}

#[test]
fn inactive_blocker_leaves_goal_sat_with_full_witness() {
    let (graph, goal) = trivial_chain(ControlState::Inactive);
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);
    let result = solver.check_satisfiability(&goal, None);
    assert_eq!(result.status, SolverStatus::Sat);

    let witness = result.witness.unwrap();
    assert_eq!(witness.len(), scm.graph.node_count());
    assert_eq!(witness.get("attacker"), Some(&true));
    assert_eq!(witness.get("fw"), Some(&false));
    assert_eq!(witness.get("web"), Some(&true));
    assert_eq!(witness.get("db"), Some(&true));
}

#[test]
fn partial_and_unknown_states_do_not_block() {
    for state in [ControlState::Partial, ControlState::Unknown] {
        let (graph, goal) = trivial_chain(state);
        let scm = ScmBuilder::new(graph).build().unwrap();
        let solver = CausalSolver::new(&scm);
        assert_eq!(
            solver.check_satisfiability(&goal, None).status,
            SolverStatus::Sat,
            "state {state:?} should not block"
        );
    }
}

#[test]
fn do_operator_severs_equations_both_ways() {
    let (graph, goal) = trivial_chain(ControlState::Active);
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);

    // Forcing the firewall off re-opens the chain.
    let mut off = Interventions::default();
    off.insert("fw".to_string(), false);
    assert_eq!(
        solver.check_satisfiability(&goal, Some(&off)).status,
        SolverStatus::Sat
    );

    // Pinning the target off beats everything upstream.
    let mut db_off = Interventions::default();
    db_off.insert("db".to_string(), false);
    assert_eq!(
        solver.check_satisfiability(&goal, Some(&db_off)).status,
        SolverStatus::Unsat
    );

    // Pinning the target on satisfies the goal even when blocked.
    let mut db_on = Interventions::default();
    db_on.insert("db".to_string(), true);
    assert_eq!(
        solver.check_satisfiability(&goal, Some(&db_on)).status,
        SolverStatus::Sat
    );
}

#[test]
fn intervened_identity_off_closes_the_entry_point() {
    let (graph, goal) = trivial_chain(ControlState::Inactive);
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);

    let mut iv = Interventions::default();
    iv.insert("attacker".to_string(), false);
    assert_eq!(
        solver.check_satisfiability(&goal, Some(&iv)).status,
        SolverStatus::Unsat
    );
}

#[test]
fn zero_timeout_reports_timeout_not_error() {
    let (graph, goal) = trivial_chain(ControlState::Inactive);
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::with_timeout(&scm, Duration::ZERO);
    let result = solver.check_satisfiability(&goal, None);
    assert_eq!(result.status, SolverStatus::Timeout);

    // Timeouts score conservatively: 1.0, flagged inevitable.
    let inevitability = solver.compute_inevitability(&goal, None);
    assert_eq!(inevitability.score, 1.0);
    assert!(inevitability.is_inevitable);
    assert_eq!(
        inevitability.solver_result.unwrap().status,
        SolverStatus::Timeout
    );
}

#[test]
fn repeated_checks_are_bit_identical() {
    let (graph, goal) = trivial_chain(ControlState::Inactive);
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);

    let mut iv = Interventions::default();
    iv.insert("web".to_string(), true);
    let first = solver.check_satisfiability(&goal, Some(&iv));
    let second = solver.check_satisfiability(&goal, Some(&iv));
    assert_eq!(first.status, second.status);
    assert_eq!(first.witness, second.witness);
}
