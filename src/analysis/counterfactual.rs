//! Counterfactual reasoning: what-if queries, assumption toggling, and
//! sensitivity analysis.
//!
//! Every hypothetical is a do-operator map layered over an optional
//! baseline; the engine recomputes inevitability before and after and
//! reports the signed movement. Assumption toggling resolves through the
//! builder-time bindings on the SCM's assumption ledger, so a caller can
//! name either a control node or one of its synthetic assumptions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::GoalPredicate;
use crate::solver::{CausalSolver, Interventions};
use crate::types::NodeClass;
use crate::utils::round_to;

/// Deltas below this magnitude read as causal independence.
const NOISE_EPSILON: f64 = 0.01;

/// Direction of an inevitability movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increased,
    Decreased,
    Unchanged,
}

/// Impact band of a sensitivity entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactBand {
    /// `|Δ| > 0.2`
    High,
    /// `|Δ| > 0.1`
    Medium,
    /// Everything else above the noise floor.
    Low,
}

impl ImpactBand {
    fn from_delta(delta: f64) -> Self {
        if delta.abs() > 0.2 {
            Self::High
        } else if delta.abs() > 0.1 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Result of one what-if query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WhatIf {
    pub goal_id: String,
    pub goal_name: String,
    pub before: f64,
    pub after: f64,
    /// `after − before`, rounded to three decimals.
    pub delta: f64,
    pub direction: Direction,
    pub is_inevitable_before: bool,
    pub is_inevitable_after: bool,
    /// `true` when the intervention moved the goal across its threshold
    /// in either direction.
    pub crossed_threshold: bool,
    /// The applied interventions, ordered by id.
    pub interventions_applied: BTreeMap<String, bool>,
    /// Deterministic narration of the movement.
    pub explanation: String,
}

/// One row of a sensitivity analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensitivityEntry {
    pub variable: String,
    pub variable_id: String,
    pub variable_class: NodeClass,
    /// The value the variable was pinned to.
    pub set_to: bool,
    /// Signed score movement, rounded to three decimals.
    pub delta: f64,
    pub new_score: f64,
    pub impact: ImpactBand,
}

/// Counterfactual engine over a borrowed solver.
pub struct CounterfactualEngine<'a, 's> {
    solver: &'a CausalSolver<'s>,
}

impl<'a, 's> CounterfactualEngine<'a, 's> {
    /// Wraps a solver.
    #[must_use]
    pub fn new(solver: &'a CausalSolver<'s>) -> Self {
        Self { solver }
    }

    /// Compares inevitability under `baseline` against `baseline` merged
    /// with `interventions`.
    ///
    /// `what_if(goal, {}, None)` reproduces the plain baseline score with
    /// a zero delta.
    pub fn what_if(
        &self,
        goal: &GoalPredicate,
        interventions: &Interventions,
        baseline: Option<&Interventions>,
    ) -> WhatIf {
        let before = self.solver.compute_inevitability(goal, baseline);

        let mut merged: Interventions = baseline.cloned().unwrap_or_default();
        for (id, &value) in interventions {
            merged.insert(id.clone(), value);
        }
        let after = self.solver.compute_inevitability(goal, Some(&merged));

        let delta = after.score - before.score;
        let direction = if delta > 0.0 {
            Direction::Increased
        } else if delta < 0.0 {
            Direction::Decreased
        } else {
            Direction::Unchanged
        };

        let applied: BTreeMap<String, bool> = interventions
            .iter()
            .map(|(id, &value)| (id.clone(), value))
            .collect();
        let explanation = self.explain_delta(goal, &applied, before.score, after.score);

        WhatIf {
            goal_id: goal.id.clone(),
            goal_name: goal.name.clone(),
            before: before.score,
            after: after.score,
            delta: round_to(delta, 3),
            direction,
            is_inevitable_before: before.is_inevitable,
            is_inevitable_after: after.is_inevitable,
            crossed_threshold: before.is_inevitable != after.is_inevitable,
            interventions_applied: applied,
            explanation,
        }
    }

    /// Toggles a control by node id or by any assumption bound to it,
    /// then delegates to [`what_if`](Self::what_if) with a single-entry
    /// map. Unresolvable keys fall back to the key itself so the query
    /// still runs (and reads as causally independent).
    pub fn toggle_assumption(
        &self,
        goal: &GoalPredicate,
        key: &str,
        new_value: bool,
        baseline: Option<&Interventions>,
    ) -> WhatIf {
        let scm = self.solver.scm();
        let target = if scm.node(key).is_some() {
            key.to_string()
        } else {
            scm.assumption_binding(key).unwrap_or(key).to_string()
        };

        let mut interventions = Interventions::default();
        interventions.insert(target, new_value);
        self.what_if(goal, &interventions, baseline)
    }

    /// Pins every node to `true` and to `false` independently and records
    /// the movements whose magnitude clears the noise floor, largest
    /// first.
    pub fn sensitivity_analysis(
        &self,
        goal: &GoalPredicate,
        baseline: Option<&Interventions>,
    ) -> Vec<SensitivityEntry> {
        let base = self.solver.compute_inevitability(goal, baseline);
        let mut entries = Vec::new();

        for node in &self.solver.scm().graph.nodes {
            for value in [true, false] {
                let mut iv: Interventions = baseline.cloned().unwrap_or_default();
                iv.insert(node.id.clone(), value);
                let after = self.solver.compute_inevitability(goal, Some(&iv));
                let delta = after.score - base.score;
                if delta.abs() > NOISE_EPSILON {
                    entries.push(SensitivityEntry {
                        variable: node.name.clone(),
                        variable_id: node.id.clone(),
                        variable_class: node.class(),
                        set_to: value,
                        delta: round_to(delta, 3),
                        new_score: after.score,
                        impact: ImpactBand::from_delta(delta),
                    });
                }
            }
        }

        // Stable sort keeps node insertion order among equal magnitudes.
        entries.sort_by(|a, b| b.delta.abs().total_cmp(&a.delta.abs()));
        entries
    }

    fn explain_delta(
        &self,
        goal: &GoalPredicate,
        applied: &BTreeMap<String, bool>,
        before: f64,
        after: f64,
    ) -> String {
        let scm = self.solver.scm();
        let parts: Vec<String> = applied
            .iter()
            .map(|(id, &value)| {
                let name = scm.node(id).map_or(id.as_str(), |n| n.name.as_str());
                let action = if value { "enabled" } else { "disabled" };
                format!("{name} {action}")
            })
            .collect();
        let toggled = parts.join(", ");
        let delta = after - before;

        if delta.abs() < NOISE_EPSILON {
            format!(
                "Toggling {toggled} has no measurable effect on '{}'. This suggests causal \
                 independence.",
                goal.name
            )
        } else if delta > 0.0 {
            format!(
                "Toggling {toggled} INCREASED inevitability of '{}' by {delta:.2} (from \
                 {before:.2} to {after:.2}).",
                goal.name
            )
        } else {
            format!(
                "Toggling {toggled} DECREASED inevitability of '{}' by {:.2} (from {before:.2} \
                 to {after:.2}).",
                goal.name,
                delta.abs()
            )
        }
    }
}
