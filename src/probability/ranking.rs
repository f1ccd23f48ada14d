//! Control impact ranking and naked-asset detection.

use serde::{Deserialize, Serialize};

use crate::model::GoalPredicate;
use crate::solver::InevitabilityResult;
use crate::types::{ControlState, Criticality, NodeClass};
use crate::utils::round_to;

use super::{ProbabilityEngine, StateOverrides};

/// Marginal reduction above which a control is risk-critical.
const CRITICAL_REDUCTION: f64 = 0.05;
/// Marginal reduction below which a costed control is redundant.
const REDUNDANT_REDUCTION: f64 = 0.001;

/// Risk impact of one control.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlImpact {
    pub control_id: String,
    pub control_name: String,
    pub control_type: String,
    pub annual_cost: f64,
    pub effectiveness: f64,
    /// Total combined-risk increase across goals when this control is
    /// assumed inactive; floored at zero.
    pub marginal_risk_reduction: f64,
    pub risk_reduction_percent: f64,
    /// Reduction per currency unit, scaled by 100; `None` for a free
    /// control with positive reduction (unbounded return).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_effectiveness_score: Option<f64>,
    pub is_critical: bool,
    pub is_redundant: bool,
}

/// A high-criticality asset with no active protective control.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NakedAsset {
    pub asset_id: String,
    pub asset_name: String,
    pub criticality: Criticality,
    pub data_classification: Vec<String>,
    pub warning: String,
}

impl ProbabilityEngine<'_> {
    /// Ranks every control by its marginal risk reduction.
    ///
    /// The hypothetical "this control is inactive" is carried by an
    /// override map scoped to each loop iteration; the SCM is never
    /// written, so state restoration holds on every exit path including
    /// mid-loop failures.
    #[must_use]
    pub fn rank_control_impact(
        &self,
        goals: &[GoalPredicate],
        results: &[InevitabilityResult],
    ) -> Vec<ControlImpact> {
        let no_overrides = StateOverrides::default();
        let baseline: Vec<f64> = goals
            .iter()
            .zip(results)
            .map(|(goal, inev)| self.goal_risk_with(goal, inev, &no_overrides).combined_risk)
            .collect();

        let mut rankings: Vec<ControlImpact> = self
            .scm()
            .graph
            .controls()
            .map(|ctrl| {
                let mut overrides = StateOverrides::default();
                overrides.insert(ctrl.id.clone(), ControlState::Inactive);

                let mut risk_increase = 0.0;
                for ((goal, inev), &base) in goals.iter().zip(results).zip(&baseline) {
                    let without = self.goal_risk_with(goal, inev, &overrides).combined_risk;
                    risk_increase += without - base;
                }

                let profile = ctrl.control_profile();
                let cost = ctrl.annual_cost();
                let marginal = risk_increase.max(0.0);
                let cost_effectiveness = if cost > 0.0 {
                    Some(round_to(marginal / cost * 100.0, 2))
                } else if marginal > 0.0 {
                    None
                } else {
                    Some(0.0)
                };

                ControlImpact {
                    control_id: ctrl.id.clone(),
                    control_name: ctrl.name.clone(),
                    control_type: profile
                        .and_then(|p| p.control_type.clone())
                        .unwrap_or_else(|| "unknown".to_string()),
                    annual_cost: cost,
                    effectiveness: profile.map_or(0.0, |p| p.effectiveness),
                    marginal_risk_reduction: round_to(marginal, 4),
                    risk_reduction_percent: round_to(marginal * 100.0, 1),
                    cost_effectiveness_score: cost_effectiveness,
                    is_critical: marginal > CRITICAL_REDUCTION,
                    is_redundant: marginal < REDUNDANT_REDUCTION && cost > 0.0,
                }
            })
            .collect();

        rankings.sort_by(|a, b| b.marginal_risk_reduction.total_cmp(&a.marginal_risk_reduction));
        rankings
    }

    /// Critical or high assets with no equation naming an active control
    /// as a blocker.
    #[must_use]
    pub fn detect_naked_critical_assets(&self) -> Vec<NakedAsset> {
        let mut naked = Vec::new();

        for node in &self.scm().graph.nodes {
            if node.class() != NodeClass::Asset {
                continue;
            }
            let Some(criticality) = node.asset_profile().and_then(|p| p.criticality) else {
                continue;
            };
            if !matches!(criticality, Criticality::Critical | Criticality::High) {
                continue;
            }

            let has_active_control = self
                .scm()
                .equation_for(&node.id)
                .is_some_and(|eq| {
                    eq.negated_parents.iter().any(|ctrl_id| {
                        self.scm()
                            .node(ctrl_id)
                            .and_then(|n| n.control_state())
                            .is_some_and(|state| state.is_active())
                    })
                });

            if !has_active_control {
                naked.push(NakedAsset {
                    asset_id: node.id.clone(),
                    asset_name: node.name.clone(),
                    criticality,
                    data_classification: node
                        .asset_profile()
                        .map(|p| p.data_classification.clone())
                        .unwrap_or_default(),
                    warning: format!(
                        "CRITICAL: {} has no active protective control",
                        node.name
                    ),
                });
            }
        }

        naked
    }
}
