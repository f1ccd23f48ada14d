//! Solver hot-path benchmarks: SCM construction and satisfiability
//! checks over a layered synthetic infrastructure.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use inevitability::model::{CausalGraph, GoalPredicate, InfraEdge, InfraNode};
use inevitability::scm::ScmBuilder;
use inevitability::solver::CausalSolver;
use inevitability::types::{ControlState, EdgeKind};

/// A layered graph: `identities` roots, `layers` of `width` assets with
/// full forward wiring, one inactive control per layer.
fn layered_graph(identities: usize, layers: usize, width: usize) -> (CausalGraph, GoalPredicate) {
    let mut graph = CausalGraph::new();

    for i in 0..identities {
        graph = graph.add_node(InfraNode::identity(format!("id{i}"), format!("Identity {i}")));
    }
    for l in 0..layers {
        for w in 0..width {
            graph = graph.add_node(InfraNode::asset(
                format!("n{l}_{w}"),
                format!("Node {l}/{w}"),
            ));
        }
        graph = graph.add_node(InfraNode::control(
            format!("c{l}"),
            format!("Control {l}"),
            ControlState::Inactive,
        ));
    }

    for i in 0..identities {
        for w in 0..width {
            graph = graph.add_edge(InfraEdge::new(
                format!("id{i}"),
                format!("n0_{w}"),
                EdgeKind::Access,
            ));
        }
    }
    for l in 1..layers {
        for from in 0..width {
            for to in 0..width {
                graph = graph.add_edge(InfraEdge::new(
                    format!("n{}_{from}", l - 1),
                    format!("n{l}_{to}"),
                    EdgeKind::Lateral,
                ));
            }
        }
    }
    for l in 0..layers {
        for w in 0..width {
            graph = graph.add_edge(InfraEdge::new(
                format!("c{l}"),
                format!("n{l}_{w}"),
                EdgeKind::Control,
            ));
        }
    }

    let goal = GoalPredicate::new("goal", "Deep Target")
        .with_target(format!("n{}_0", layers - 1));
    (graph, goal)
}

fn bench_scm_build(c: &mut Criterion) {
    let (graph, _goal) = layered_graph(4, 8, 5);
    c.bench_function("scm_build_layered_4x8x5", |b| {
        b.iter(|| {
            let scm = ScmBuilder::new(black_box(graph.clone())).build().unwrap();
            black_box(scm)
        });
    });
}

fn bench_satisfiability(c: &mut Criterion) {
    let (graph, goal) = layered_graph(4, 8, 5);
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);
    c.bench_function("check_satisfiability_layered_4x8x5", |b| {
        b.iter(|| black_box(solver.check_satisfiability(black_box(&goal), None)));
    });
}

fn bench_inevitability(c: &mut Criterion) {
    let (graph, goal) = layered_graph(4, 8, 5);
    let scm = ScmBuilder::new(graph).build().unwrap();
    let solver = CausalSolver::new(&scm);
    c.bench_function("compute_inevitability_layered_4x8x5", |b| {
        b.iter(|| black_box(solver.compute_inevitability(black_box(&goal), None)));
    });
}

criterion_group!(
    benches,
    bench_scm_build,
    bench_satisfiability,
    bench_inevitability
);
criterion_main!(benches);
