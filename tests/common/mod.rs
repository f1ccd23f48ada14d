//! Shared scenario builders for the integration tests.
//!
//! Each builder returns a small, hand-checkable infrastructure graph with
//! its goal(s). The trivial chain is the reference scenario used across
//! most suites; the others exercise one analyzer family each.

#![allow(dead_code)]

use inevitability::model::{CausalGraph, GoalPredicate, InfraEdge, InfraNode};
use inevitability::types::{ControlState, Criticality, EdgeKind};

/// `attacker → web → db` with a firewall control edge onto `web`.
///
/// With the firewall inactive the goal is fully reachable (score 1.0)
/// and `{fw}` is the unique greedy MCS; with it active the chain is
/// structurally defended.
pub fn trivial_chain(firewall: ControlState) -> (CausalGraph, GoalPredicate) {
    let graph = CausalGraph::new()
        .add_node(InfraNode::identity("attacker", "Attacker"))
        .add_node(InfraNode::asset("web", "Web Server"))
        .add_node(
            InfraNode::asset("db", "Customer Database").with_criticality(Criticality::Critical),
        )
        .add_node(
            InfraNode::control("fw", "Firewall", firewall)
                .with_annual_cost(50_000.0)
                .with_bypass_probability(0.3)
                .with_effectiveness(0.7),
        )
        .add_edge(InfraEdge::new("attacker", "web", EdgeKind::Access).with_exploit_probability(0.8))
        .add_edge(InfraEdge::new("web", "db", EdgeKind::Lateral).with_exploit_probability(0.9))
        .add_edge(InfraEdge::new("fw", "web", EdgeKind::Control).with_exploit_probability(0.5));

    let goal = GoalPredicate::new("exfil", "Data Exfiltration")
        .with_target("db")
        .with_threshold(0.7);
    (graph, goal)
}

/// The trivial chain plus an IDS whose control edge points at an island
/// node no goal cares about: pure security theater.
pub fn theater_scenario() -> (CausalGraph, GoalPredicate) {
    let (graph, goal) = trivial_chain(ControlState::Inactive);
    let graph = graph
        .add_node(
            InfraNode::control("ids", "IDS", ControlState::Active).with_annual_cost(35_000.0),
        )
        .add_node(InfraNode::asset("island", "Isolated Host"))
        .add_edge(InfraEdge::new("ids", "island", EdgeKind::Control));
    (graph, goal)
}

/// Two identities where only the insider reaches the database.
pub fn two_identity_split() -> (CausalGraph, GoalPredicate) {
    let graph = CausalGraph::new()
        .add_node(InfraNode::identity("insider", "Insider"))
        .add_node(InfraNode::identity("visitor", "Visitor"))
        .add_node(InfraNode::asset("db", "Database"))
        .add_node(InfraNode::asset("lobby", "Lobby Kiosk"))
        .add_node(InfraNode::control("badge", "Badge Reader", ControlState::Inactive))
        .add_edge(InfraEdge::new("insider", "db", EdgeKind::Access))
        .add_edge(InfraEdge::new("visitor", "lobby", EdgeKind::Access))
        .add_edge(InfraEdge::new("badge", "db", EdgeKind::Control));

    let goal = GoalPredicate::new("exfil", "Exfiltration")
        .with_target("db")
        .with_threshold(0.7);
    (graph, goal)
}

/// Two parallel paths to the database; path A is cut by either `c1` or
/// `c2`, path B by `c3`, and `c4`/`c5` guard an irrelevant island. The
/// exact algorithm finds the two 2-element MCSs `{c1, c3}` and
/// `{c2, c3}`; greedy commits `{c1, c2, c3}`.
pub fn parallel_paths_five_controls() -> (CausalGraph, GoalPredicate) {
    let mut graph = CausalGraph::new()
        .add_node(InfraNode::identity("attacker", "Attacker"))
        .add_node(InfraNode::asset("a1", "Path A Host"))
        .add_node(InfraNode::asset("b1", "Path B Host"))
        .add_node(InfraNode::asset("db", "Database"))
        .add_node(InfraNode::asset("island", "Island"));
    for id in ["c1", "c2", "c3", "c4", "c5"] {
        graph = graph.add_node(InfraNode::control(
            id,
            id.to_uppercase(),
            ControlState::Inactive,
        ));
    }
    let graph = graph
        .add_edge(InfraEdge::new("attacker", "a1", EdgeKind::Access))
        .add_edge(InfraEdge::new("attacker", "b1", EdgeKind::Access))
        .add_edge(InfraEdge::new("a1", "db", EdgeKind::Lateral))
        .add_edge(InfraEdge::new("b1", "db", EdgeKind::Lateral))
        .add_edge(InfraEdge::new("c1", "a1", EdgeKind::Control))
        .add_edge(InfraEdge::new("c2", "a1", EdgeKind::Control))
        .add_edge(InfraEdge::new("c3", "b1", EdgeKind::Control))
        .add_edge(InfraEdge::new("c4", "island", EdgeKind::Control))
        .add_edge(InfraEdge::new("c5", "island", EdgeKind::Control));

    let goal = GoalPredicate::new("exfil", "Exfiltration")
        .with_target("db")
        .with_threshold(0.7);
    (graph, goal)
}

/// A two-node cycle, for rejection tests.
pub fn cyclic_graph() -> (CausalGraph, GoalPredicate) {
    let graph = CausalGraph::new()
        .add_node(InfraNode::asset("a", "A"))
        .add_node(InfraNode::asset("b", "B"))
        .add_edge(InfraEdge::new("a", "b", EdgeKind::Access))
        .add_edge(InfraEdge::new("b", "a", EdgeKind::Access));
    let goal = GoalPredicate::new("g", "G").with_target("a");
    (graph, goal)
}
