//! Security theater detection.
//!
//! A control is theater when its activation state has no measurable effect
//! on a goal's inevitability. Each control is tested with a forced-on and
//! a forced-off intervention; the absolute score difference drives the
//! classification, with MCS membership promoting measurable controls to
//! critical.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{GoalPredicate, InfraNode};
use crate::solver::{CausalSolver, Interventions};
use crate::types::DefenseClass;
use crate::utils::round_to;

/// Score delta below which a control counts as causally irrelevant.
const IRRELEVANCE_EPSILON: f64 = 0.01;
/// Score delta at which a non-MCS control still counts as necessary.
const NECESSARY_DELTA: f64 = 0.20;

/// Causal relevance verdict for one control against one goal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlClassification {
    pub control_id: String,
    pub control_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_type: Option<String>,
    pub classification: DefenseClass,
    /// `|score(off) − score(on)|`, rounded to three decimals.
    pub causal_contribution_score: f64,
    pub annual_cost: f64,
    pub reason: String,
    pub recommendation: String,
}

/// Per-goal theater report over every control.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TheaterReport {
    pub goal_id: String,
    pub goal_name: String,
    /// One classification per control, in control insertion order.
    pub classifications: Vec<ControlClassification>,
    pub total_controls: usize,
    pub critical_count: usize,
    pub necessary_count: usize,
    pub partial_count: usize,
    pub irrelevant_count: usize,
    /// Sum of annual cost over irrelevant controls.
    pub total_waste: f64,
    /// `total_waste / total_spend`, rounded to three decimals.
    pub waste_ratio: f64,
}

/// Detects security theater by causal independence testing.
pub struct TheaterDetector<'a, 's> {
    solver: &'a CausalSolver<'s>,
}

impl<'a, 's> TheaterDetector<'a, 's> {
    /// Wraps a solver.
    #[must_use]
    pub fn new(solver: &'a CausalSolver<'s>) -> Self {
        Self { solver }
    }

    /// Classifies every control against one goal.
    ///
    /// `mcs_control_ids` carries the union of MCS memberships computed
    /// beforehand; members with a measurable delta classify as critical.
    pub fn classify_controls(
        &self,
        goal: &GoalPredicate,
        mcs_control_ids: &FxHashSet<String>,
    ) -> TheaterReport {
        let mut classifications = Vec::new();

        for ctrl in self.solver.scm().graph.controls() {
            classifications.push(self.classify_one(goal, ctrl, mcs_control_ids));
        }

        let count = |class: DefenseClass| {
            classifications
                .iter()
                .filter(|c| c.classification == class)
                .count()
        };
        let critical_count = count(DefenseClass::Critical);
        let necessary_count = count(DefenseClass::Necessary);
        let partial_count = count(DefenseClass::Partial);
        let irrelevant_count = count(DefenseClass::Irrelevant);

        let total_waste: f64 = classifications
            .iter()
            .filter(|c| c.classification == DefenseClass::Irrelevant)
            .map(|c| c.annual_cost)
            .sum();
        let total_spend: f64 = classifications.iter().map(|c| c.annual_cost).sum();
        let waste_ratio = if total_spend > 0.0 {
            round_to(total_waste / total_spend, 3)
        } else {
            0.0
        };

        debug!(
            goal = %goal.id,
            irrelevant = irrelevant_count,
            waste = total_waste,
            "theater classification finished"
        );

        TheaterReport {
            goal_id: goal.id.clone(),
            goal_name: goal.name.clone(),
            total_controls: classifications.len(),
            critical_count,
            necessary_count,
            partial_count,
            irrelevant_count,
            total_waste,
            waste_ratio,
            classifications,
        }
    }

    fn classify_one(
        &self,
        goal: &GoalPredicate,
        ctrl: &InfraNode,
        mcs_control_ids: &FxHashSet<String>,
    ) -> ControlClassification {
        let mut on = Interventions::default();
        on.insert(ctrl.id.clone(), true);
        let enabled = self.solver.compute_inevitability(goal, Some(&on));

        let mut off = Interventions::default();
        off.insert(ctrl.id.clone(), false);
        let disabled = self.solver.compute_inevitability(goal, Some(&off));

        let delta = (disabled.score - enabled.score).abs();
        let annual_cost = ctrl.annual_cost();

        let (classification, reason, recommendation) = if delta < IRRELEVANCE_EPSILON {
            (
                DefenseClass::Irrelevant,
                format!(
                    "{} has no causal effect on '{}'. Inevitability is {:.2} whether this \
                     control is active or not.",
                    ctrl.name, goal.name, disabled.score
                ),
                format!(
                    "Consider reallocating ${annual_cost:.0}/year budget to causally relevant \
                     controls."
                ),
            )
        } else if mcs_control_ids.contains(&ctrl.id) {
            (
                DefenseClass::Critical,
                format!(
                    "{} is part of a Minimal Causal Set. Disabling it increases inevitability \
                     from {:.2} to {:.2}.",
                    ctrl.name, enabled.score, disabled.score
                ),
                format!("CRITICAL: Ensure {} is always enforced and monitored.", ctrl.name),
            )
        } else if delta >= NECESSARY_DELTA {
            (
                DefenseClass::Necessary,
                format!(
                    "{} significantly affects inevitability (Δ = {delta:.2}). Contributes to \
                     defense but not in the MCS.",
                    ctrl.name
                ),
                format!("Maintain {} as a defense-in-depth measure.", ctrl.name),
            )
        } else {
            (
                DefenseClass::Partial,
                format!("{} has minor causal contribution (Δ = {delta:.2}).", ctrl.name),
                format!("Review cost-effectiveness of {}.", ctrl.name),
            )
        };

        ControlClassification {
            control_id: ctrl.id.clone(),
            control_name: ctrl.name.clone(),
            control_type: ctrl
                .control_profile()
                .and_then(|profile| profile.control_type.clone()),
            classification,
            causal_contribution_score: round_to(delta, 3),
            annual_cost,
            reason,
            recommendation,
        }
    }

    /// Classifies controls for every goal, without MCS context.
    pub fn classify_all_goals(&self, goals: &[GoalPredicate]) -> Vec<TheaterReport> {
        let empty = FxHashSet::default();
        goals
            .iter()
            .map(|goal| self.classify_controls(goal, &empty))
            .collect()
    }

    /// Controls that are irrelevant under every goal: universal theater.
    pub fn find_universal_theater(&self, goals: &[GoalPredicate]) -> Vec<ControlClassification> {
        let reports = self.classify_all_goals(goals);
        let mut universal = Vec::new();

        for ctrl in self.solver.scm().graph.controls() {
            let theater_everywhere = reports.iter().all(|report| {
                report
                    .classifications
                    .iter()
                    .find(|c| c.control_id == ctrl.id)
                    .is_none_or(|c| c.classification == DefenseClass::Irrelevant)
            });
            if theater_everywhere {
                let annual_cost = ctrl.annual_cost();
                universal.push(ControlClassification {
                    control_id: ctrl.id.clone(),
                    control_name: ctrl.name.clone(),
                    control_type: ctrl
                        .control_profile()
                        .and_then(|profile| profile.control_type.clone()),
                    classification: DefenseClass::Irrelevant,
                    causal_contribution_score: 0.0,
                    annual_cost,
                    reason: format!(
                        "{} is causally irrelevant to ALL {} defense goals. Universal security \
                         theater.",
                        ctrl.name,
                        goals.len()
                    ),
                    recommendation: format!(
                        "ELIMINATE: {} provides zero causal defense value. Reallocate entire \
                         ${annual_cost:.0}/year budget.",
                        ctrl.name
                    ),
                });
            }
        }

        universal
    }
}
