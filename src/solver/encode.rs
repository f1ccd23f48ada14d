//! Boolean encoding and satisfiability search.
//!
//! The SCM fragment is a conjunction of equivalences: every endogenous
//! variable equals `any enabler ∧ no active blocker` over its parents,
//! interventions sever equations by pinning variables, and exogenous
//! variables are pinned by class or left free. Because the graph is a DAG,
//! every non-free variable is a function of the free ones, so
//! satisfiability reduces to a deterministic search over the free
//! variables with a single topological evaluation per candidate.

use std::time::Instant;

use rustc_hash::FxHashMap;

use crate::model::GoalPredicate;
use crate::scm::Scm;
use crate::solver::Interventions;
use crate::types::NodeClass;

/// A reference to a constant or another variable, resolved at encode time.
#[derive(Clone, Copy, Debug)]
pub(super) enum Operand {
    Const(bool),
    Var(usize),
}

/// How one variable gets its value.
#[derive(Clone, Debug)]
pub(super) enum VarPlan {
    /// Fixed by an intervention or an exogenous default.
    Pinned(bool),
    /// Computed from its structural equation.
    Defined {
        enablers: Vec<Operand>,
        blockers: Vec<Operand>,
    },
    /// Chosen by the search.
    Free,
}

/// A fully lowered satisfiability instance.
#[derive(Debug)]
pub(super) struct Encoding {
    /// Variable ids in declaration order: graph nodes first, then any goal
    /// ids that do not name a node (those stay free, mirroring on-demand
    /// variable creation in SMT front ends).
    pub(super) var_ids: Vec<String>,
    plan: Vec<VarPlan>,
    /// Indices of `Defined` variables in topological order.
    eval_order: Vec<usize>,
    /// Indices of `Free` variables in declaration order.
    free: Vec<usize>,
    /// Goal literal indices; all must evaluate true.
    goal_lits: Vec<usize>,
    /// An empty goal predicate is unsatisfiable by definition.
    trivially_unsat: bool,
}

/// Search outcome; `Sat` carries the full assignment in declaration order.
#[derive(Debug)]
pub(super) enum SolveOutcome {
    Sat(Vec<bool>),
    Unsat,
    Timeout,
}

impl Encoding {
    /// Lowers an SCM, a goal, and an intervention map into a search
    /// instance.
    pub(super) fn lower(scm: &Scm, goal: &GoalPredicate, interventions: &Interventions) -> Self {
        let mut var_ids: Vec<String> = scm.graph.nodes.iter().map(|n| n.id.clone()).collect();
        let mut var_index: FxHashMap<String, usize> = var_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        // Goal ids outside the node set become fresh free variables.
        for id in goal.target_assets.iter().chain(&goal.required_conditions) {
            if !var_index.contains_key(id) {
                var_index.insert(id.clone(), var_ids.len());
                var_ids.push(id.clone());
            }
        }

        let operand = |id: &str, var_index: &FxHashMap<String, usize>| -> Operand {
            match interventions.get(id) {
                Some(&v) => Operand::Const(v),
                None => Operand::Var(var_index[id]),
            }
        };

        let mut plan: Vec<VarPlan> = Vec::with_capacity(var_ids.len());
        for node in &scm.graph.nodes {
            if let Some(&value) = interventions.get(&node.id) {
                plan.push(VarPlan::Pinned(value));
            } else if let Some(eq) = scm.equation_for(&node.id) {
                plan.push(VarPlan::Defined {
                    enablers: eq
                        .parent_variables
                        .iter()
                        .map(|p| operand(p, &var_index))
                        .collect(),
                    blockers: eq
                        .negated_parents
                        .iter()
                        .map(|p| operand(p, &var_index))
                        .collect(),
                });
            } else {
                plan.push(match node.class() {
                    NodeClass::Control => VarPlan::Pinned(
                        node.control_profile().is_some_and(|profile| profile.state.is_active()),
                    ),
                    NodeClass::Identity => VarPlan::Pinned(true),
                    _ => VarPlan::Free,
                });
            }
        }
        // Synthetic goal variables are always free.
        plan.resize(var_ids.len(), VarPlan::Free);

        let eval_order: Vec<usize> = scm
            .topological_order()
            .iter()
            .filter_map(|id| {
                let idx = var_index[id.as_str()];
                matches!(plan[idx], VarPlan::Defined { .. }).then_some(idx)
            })
            .collect();

        let free: Vec<usize> = plan
            .iter()
            .enumerate()
            .filter_map(|(idx, p)| matches!(p, VarPlan::Free).then_some(idx))
            .collect();

        let mut goal_lits: Vec<usize> = Vec::new();
        for id in goal.target_assets.iter().chain(&goal.required_conditions) {
            goal_lits.push(var_index[id]);
        }
        let trivially_unsat = goal_lits.is_empty();

        Self {
            var_ids,
            plan,
            eval_order,
            free,
            goal_lits,
            trivially_unsat,
        }
    }

    /// Deterministic search: free variables are branched in declaration
    /// order, `true` first, and every candidate gets one topological
    /// evaluation. Returns `Timeout` when the deadline passes.
    pub(super) fn solve(&self, started: Instant, timeout_ms: u64) -> SolveOutcome {
        if self.trivially_unsat {
            return SolveOutcome::Unsat;
        }

        let mut values = vec![false; self.plan.len()];
        for (idx, p) in self.plan.iter().enumerate() {
            if let VarPlan::Pinned(v) = p {
                values[idx] = *v;
            }
        }

        let mut choice = vec![true; self.free.len()];
        loop {
            if started.elapsed().as_millis() as u64 > timeout_ms {
                return SolveOutcome::Timeout;
            }

            for (slot, &idx) in self.free.iter().enumerate() {
                values[idx] = choice[slot];
            }
            if self.evaluate(&mut values) {
                return SolveOutcome::Sat(values);
            }

            // Advance to the next candidate: true-first order means
            // flipping from true to false carries, like binary counting.
            let mut slot = self.free.len();
            loop {
                if slot == 0 {
                    return SolveOutcome::Unsat;
                }
                slot -= 1;
                if choice[slot] {
                    choice[slot] = false;
                    for later in choice.iter_mut().skip(slot + 1) {
                        *later = true;
                    }
                    break;
                }
            }
        }
    }

    /// One pass over the defined variables, then the goal conjunction.
    fn evaluate(&self, values: &mut [bool]) -> bool {
        let read = |op: &Operand, values: &[bool]| -> bool {
            match op {
                Operand::Const(v) => *v,
                Operand::Var(idx) => values[*idx],
            }
        };

        for &idx in &self.eval_order {
            if let VarPlan::Defined { enablers, blockers } = &self.plan[idx] {
                let enabled = enablers.iter().any(|op| read(op, values));
                let blocked = blockers.iter().any(|op| read(op, values));
                values[idx] = match (enablers.is_empty(), blockers.is_empty()) {
                    (false, false) => enabled && !blocked,
                    (false, true) => enabled,
                    (true, false) => !blocked,
                    (true, true) => values[idx],
                };
            }
        }

        self.goal_lits.iter().all(|&idx| values[idx])
    }

    /// Number of free variables (used for diagnostics).
    pub(super) fn free_count(&self) -> usize {
        self.free.len()
    }
}
