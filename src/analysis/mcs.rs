//! Minimal Causal Set extraction.
//!
//! An MCS for a goal is a minimal set of controls such that forcing every
//! member active makes the goal unsatisfiable, while dropping any single
//! member lets the attacker back in. Two search strategies are offered:
//! a fast greedy accumulation that emits at most one set, and an
//! exhaustive cardinality-ascending enumeration that emits every minimal
//! set up to a size bound. Claims can be re-verified into
//! [`ProofArtifact`]s.

use std::time::Instant;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;
use uuid::Uuid;

use crate::model::{GoalPredicate, InfraNode};
use crate::solver::{CausalSolver, Interventions};
use crate::utils::round_to;

/// Search strategy for MCS extraction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum McsAlgorithm {
    /// Impact-ranked accumulation; fast, emits at most one set.
    #[default]
    Greedy,
    /// Exhaustive subset search; emits every minimal set up to the bound.
    Exact,
}

/// Deployment feasibility of an MCS.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feasibility {
    /// Every member costs nothing; configuration changes only.
    Immediate,
    /// At least one member carries an annual cost.
    Budgeted,
}

/// One control inside an MCS.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct McsElement {
    pub control_id: String,
    pub control_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_type: Option<String>,
    /// Action a defender takes to realize this element.
    pub remediation_action: String,
    /// Annual cost of the control; 0 when unknown.
    pub estimated_cost: f64,
}

impl McsElement {
    fn from_control(node: &InfraNode) -> Self {
        Self {
            control_id: node.id.clone(),
            control_name: node.name.clone(),
            control_type: node
                .control_profile()
                .and_then(|profile| profile.control_type.clone()),
            remediation_action: format!("Enforce {}", node.name),
            estimated_cost: node.annual_cost(),
        }
    }
}

/// One minimal causal set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct McsSet {
    /// Generated identifier.
    pub mcs_id: String,
    /// Member controls, in the order the search committed them.
    pub elements: Vec<McsElement>,
    pub cardinality: usize,
    pub total_cost: f64,
    pub feasibility: Feasibility,
    /// `true` when the blocking property was checked at emission time.
    pub validated: bool,
}

impl McsSet {
    fn from_controls(controls: &[&InfraNode]) -> Self {
        let elements: Vec<McsElement> = controls
            .iter()
            .map(|&node| McsElement::from_control(node))
            .collect();
        let total_cost = elements.iter().map(|e| e.estimated_cost).sum();
        let feasibility = if elements.iter().all(|e| e.estimated_cost == 0.0) {
            Feasibility::Immediate
        } else {
            Feasibility::Budgeted
        };
        Self {
            mcs_id: Uuid::new_v4().to_string(),
            cardinality: elements.len(),
            total_cost,
            feasibility,
            elements,
            validated: true,
        }
    }

    /// Member control ids, in set order.
    #[must_use]
    pub fn control_ids(&self) -> Vec<&str> {
        self.elements.iter().map(|e| e.control_id.as_str()).collect()
    }
}

/// All MCS findings for one goal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct McsResult {
    pub goal_id: String,
    pub goal_name: String,
    /// Emitted sets; empty means defense is impossible with the current
    /// control inventory (or the goal is already blocked).
    pub mcs_sets: Vec<McsSet>,
    pub computation_time_ms: f64,
    pub algorithm: McsAlgorithm,
}

/// A re-verified formal claim with its evidence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProofArtifact {
    pub proof_id: String,
    /// Kind of claim, e.g. `mcs_blocking`.
    pub proof_type: String,
    /// Human-readable claim statement.
    pub claim: String,
    pub goal_id: String,
    /// Structured evidence backing the claim.
    pub evidence: Map<String, Value>,
    pub solver_used: String,
    pub verification_time_ms: f64,
}

/// Extracts Minimal Causal Sets from the solver's model.
pub struct McsExtractor<'a, 's> {
    solver: &'a CausalSolver<'s>,
}

impl<'a, 's> McsExtractor<'a, 's> {
    /// Wraps a solver.
    #[must_use]
    pub fn new(solver: &'a CausalSolver<'s>) -> Self {
        Self { solver }
    }

    /// Extracts MCS sets for `goal` with the chosen algorithm and size
    /// bound.
    pub fn extract(
        &self,
        goal: &GoalPredicate,
        max_cardinality: usize,
        algorithm: McsAlgorithm,
    ) -> McsResult {
        let started = Instant::now();
        let controls: Vec<&InfraNode> = self.solver.scm().graph.controls().collect();

        let mcs_sets = if controls.is_empty() {
            Vec::new()
        } else {
            match algorithm {
                McsAlgorithm::Greedy => self.greedy(goal, &controls, max_cardinality),
                McsAlgorithm::Exact => self.exact(goal, &controls, max_cardinality),
            }
        };

        debug!(
            goal = %goal.id,
            sets = mcs_sets.len(),
            ?algorithm,
            "MCS extraction finished"
        );

        McsResult {
            goal_id: goal.id.clone(),
            goal_name: goal.name.clone(),
            mcs_sets,
            computation_time_ms: round_to(started.elapsed().as_secs_f64() * 1000.0, 2),
            algorithm,
        }
    }

    /// Greedy accumulation: rank controls by marginal impact
    /// (`score(disabled) − score(enabled)`, descending, ties broken by
    /// id), force them active one at a time, and emit the first
    /// accumulated set that blocks the goal. If the whole inventory
    /// cannot block it, nothing is emitted — defense is impossible.
    fn greedy(
        &self,
        goal: &GoalPredicate,
        controls: &[&'s InfraNode],
        max_cardinality: usize,
    ) -> Vec<McsSet> {
        let mut impacts: Vec<(&InfraNode, f64)> = controls
            .iter()
            .map(|&ctrl| {
                let enabled = self.single_intervention(&ctrl.id, true);
                let with = self.solver.compute_inevitability(goal, Some(&enabled));
                let disabled = self.single_intervention(&ctrl.id, false);
                let without = self.solver.compute_inevitability(goal, Some(&disabled));
                (ctrl, without.score - with.score)
            })
            .collect();
        impacts.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.id.cmp(&b.0.id)));

        let mut candidate: Vec<&InfraNode> = Vec::new();
        let mut forced = Interventions::default();
        for (ctrl, _impact) in impacts {
            if candidate.len() >= max_cardinality {
                break;
            }
            candidate.push(ctrl);
            forced.insert(ctrl.id.clone(), true);

            if self
                .solver
                .check_satisfiability(goal, Some(&forced))
                .status
                .is_unsat()
            {
                return vec![McsSet::from_controls(&candidate)];
            }
        }
        Vec::new()
    }

    /// Exhaustive search: enumerate control subsets in ascending
    /// cardinality, prune supersets of already-emitted sets, and keep
    /// every subset that blocks the goal and stays satisfiable under
    /// every single-member removal.
    fn exact(
        &self,
        goal: &GoalPredicate,
        controls: &[&'s InfraNode],
        max_cardinality: usize,
    ) -> Vec<McsSet> {
        let mut mcs_sets: Vec<McsSet> = Vec::new();
        let mut known: Vec<FxHashSet<&str>> = Vec::new();
        let n = controls.len();

        for size in 1..=max_cardinality.min(n) {
            let mut combo: Vec<usize> = (0..size).collect();
            loop {
                let members: Vec<&InfraNode> = combo.iter().map(|&i| controls[i]).collect();
                let member_ids: FxHashSet<&str> =
                    members.iter().map(|m| m.id.as_str()).collect();

                let pruned = known.iter().any(|k| k.is_subset(&member_ids));
                if !pruned {
                    let forced: Interventions = members
                        .iter()
                        .map(|m| (m.id.clone(), true))
                        .collect();
                    if self
                        .solver
                        .check_satisfiability(goal, Some(&forced))
                        .status
                        .is_unsat()
                        && self.is_minimal(goal, &members)
                    {
                        known.push(member_ids);
                        mcs_sets.push(McsSet::from_controls(&members));
                    }
                }

                if !next_combination(&mut combo, n) {
                    break;
                }
            }
        }

        mcs_sets
    }

    /// Minimality: every single-member removal must let the goal back in.
    fn is_minimal(&self, goal: &GoalPredicate, members: &[&InfraNode]) -> bool {
        for dropped in members {
            let subset: Interventions = members
                .iter()
                .filter(|m| m.id != dropped.id)
                .map(|m| (m.id.clone(), true))
                .collect();
            if self
                .solver
                .check_satisfiability(goal, Some(&subset))
                .status
                .is_unsat()
            {
                return false;
            }
        }
        true
    }

    /// Re-verifies an MCS claim: the full set blocks, and every proper
    /// subset obtained by removing one member does not. All outcomes are
    /// recorded whether or not they confirm the claim.
    pub fn generate_proof(&self, goal: &GoalPredicate, mcs: &McsSet) -> ProofArtifact {
        let forced: Interventions = mcs
            .elements
            .iter()
            .map(|e| (e.control_id.clone(), true))
            .collect();
        let blocking = self.solver.check_satisfiability(goal, Some(&forced));

        let mut minimality = Map::new();
        for element in &mcs.elements {
            let subset: Interventions = mcs
                .elements
                .iter()
                .filter(|e| e.control_id != element.control_id)
                .map(|e| (e.control_id.clone(), true))
                .collect();
            let sub = self.solver.check_satisfiability(goal, Some(&subset));
            minimality.insert(element.control_name.clone(), json!(sub.status.to_string()));
        }
        let all_subsets_sat = minimality.values().all(|v| v.as_str() == Some("sat"));

        let names: Vec<&str> = mcs.elements.iter().map(|e| e.control_name.as_str()).collect();
        let mut evidence = Map::new();
        evidence.insert(
            "blocking_verified".to_string(),
            json!(blocking.status.is_unsat()),
        );
        evidence.insert("minimality_checks".to_string(), Value::Object(minimality));
        evidence.insert("all_subsets_sat".to_string(), json!(all_subsets_sat));

        ProofArtifact {
            proof_id: Uuid::new_v4().to_string(),
            proof_type: "mcs_blocking".to_string(),
            claim: format!(
                "Controls {{{}}} form an MCS for goal '{}'",
                names.join(", "),
                goal.name
            ),
            goal_id: goal.id.clone(),
            evidence,
            solver_used: blocking.solver_used.clone(),
            verification_time_ms: blocking.solve_time_ms,
        }
    }

    fn single_intervention(&self, id: &str, value: bool) -> Interventions {
        let mut iv = Interventions::default();
        iv.insert(id.to_string(), value);
        iv
    }
}

/// Advances `combo` to the next lexicographic combination of `n` items.
pub(crate) fn next_combination(combo: &mut [usize], n: usize) -> bool {
    let k = combo.len();
    let mut i = k;
    while i > 0 {
        i -= 1;
        if combo[i] != i + n - k {
            combo[i] += 1;
            for j in i + 1..k {
                combo[j] = combo[j - 1] + 1;
            }
            return true;
        }
    }
    false
}
