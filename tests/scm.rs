mod common;

use common::*;
use inevitability::error::EngineError;
use inevitability::scm::{AssumptionCategory, ScmBuilder};
use inevitability::types::{ControlState, NodeClass};

#[test]
fn trivial_chain_equations() {
    let (graph, _goal) = trivial_chain(ControlState::Active);
    let scm = ScmBuilder::new(graph).build().unwrap();

    // attacker and fw are roots; web and db get equations.
    assert_eq!(scm.equations.len(), 2);

    let web = scm.equation_for("web").unwrap();
    assert_eq!(web.parent_variables, ["attacker"]);
    assert_eq!(web.negated_parents, ["fw"]);

    let db = scm.equation_for("db").unwrap();
    assert_eq!(db.parent_variables, ["web"]);
    assert!(db.negated_parents.is_empty());

    assert!(scm.is_exogenous("attacker"));
    assert!(scm.is_exogenous("fw"));
    assert!(!scm.is_exogenous("db"));
}

#[test]
fn control_state_assumptions_are_bound() {
    let (graph, _goal) = theater_scenario();
    let scm = ScmBuilder::new(graph).build().unwrap();

    let fw = scm.assumption("Firewall_is_inactive").unwrap();
    assert_eq!(fw.category, AssumptionCategory::Config);
    assert_eq!(fw.binding.as_deref(), Some("fw"));

    let ids = scm.assumption("IDS_is_active").unwrap();
    assert_eq!(ids.binding.as_deref(), Some("ids"));

    assert_eq!(scm.assumption_binding("ctrl_assumption_fw"), Some("fw"));
    assert!(scm.assumption("nonexistent").is_none());
}

#[test]
fn exogenous_table_defaults() {
    let (graph, _goal) = trivial_chain(ControlState::Active);
    let scm = ScmBuilder::new(graph).build().unwrap();

    let ids: Vec<_> = scm.exogenous.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["attacker", "fw"]);

    let attacker = &scm.exogenous[0];
    assert_eq!(attacker.class, NodeClass::Identity);
    assert_eq!(attacker.range, "boolean");
    assert_eq!(attacker.default, Some(true));

    let fw = &scm.exogenous[1];
    assert_eq!(fw.class, NodeClass::Control);
    assert_eq!(fw.default, None);
}

#[test]
fn cycle_is_rejected_with_witness() {
    let (graph, _goal) = cyclic_graph();
    match ScmBuilder::new(graph).build() {
        Err(EngineError::CycleDetected { cycles }) => {
            assert_eq!(cycles[0], vec!["a", "b", "a"]);
            assert!(cycles.len() <= 3);
        }
        other => panic!("expected CycleDetected, got {other:?}"),
    }
}

#[test]
fn topological_order_and_backward_slice() {
    let (graph, _goal) = trivial_chain(ControlState::Active);
    let scm = ScmBuilder::new(graph).build().unwrap();

    let order = scm.topological_order();
    let pos = |id: &str| order.iter().position(|n| n == id).unwrap();
    assert!(pos("attacker") < pos("web"));
    assert!(pos("web") < pos("db"));
    assert!(pos("fw") < pos("web"));

    let slice = scm.backward_slice("db");
    assert!(slice.contains(&"db".to_string()));
    assert!(slice.contains(&"attacker".to_string()));
    assert!(slice.contains(&"fw".to_string()));
}

#[test]
fn scm_is_reusable_across_reads() {
    let (graph, _goal) = trivial_chain(ControlState::Active);
    let scm = ScmBuilder::new(graph).build().unwrap();
    // Lookups do not consume or mutate anything.
    for _ in 0..3 {
        assert!(scm.node("web").is_some());
        assert!(scm.equation_for("web").is_some());
        assert_eq!(scm.topological_order().len(), 4);
    }
}
