//! Quantitative risk layer.
//!
//! The symbolic solver proves structural necessity; this layer computes
//! risk magnitude under uncertainty on the same SCM. Edge exploit
//! probabilities and control bypass rates combine into per-path and
//! per-goal risk, a seeded Monte Carlo simulation validates the analytic
//! numbers, and control impact ranking measures each control's marginal
//! risk reduction.
//!
//! Hypothetical control states are expressed through an override map
//! handed down the call tree — the SCM and its nodes are never mutated,
//! so "state restoration" holds on every exit path by construction,
//! including solver failures mid-ranking.

mod monte_carlo;
mod paths;
mod ranking;

pub use monte_carlo::{ConfidenceInterval, MonteCarloReport};
pub use paths::{GoalRiskReport, PathRisk};
pub use ranking::{ControlImpact, NakedAsset};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::GoalPredicate;
use crate::scm::Scm;
use crate::solver::{InevitabilityResult, RiskDistribution};
use crate::topology::GraphIndex;
use crate::types::ControlState;
use crate::utils::round_to;

/// Hypothetical control states for marginal-impact computation; maps
/// control id → assumed state. Dropping the map is the restoration.
pub type StateOverrides = FxHashMap<String, ControlState>;

/// Attacker capability profile overlaid on the probability layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdversaryProfile {
    /// Lookup key, e.g. `apt`.
    pub key: String,
    pub name: String,
    /// Multiplier on edge exploit probabilities.
    pub skill_multiplier: f64,
    /// Additive bonus on control bypass probabilities.
    pub bypass_bonus: f64,
    /// Detectability of the adversary's activity; informational.
    pub noise_level: f64,
    pub description: String,
}

impl AdversaryProfile {
    /// Advanced Persistent Threat: high stealth, high sophistication.
    #[must_use]
    pub fn apt() -> Self {
        Self {
            key: "apt".to_string(),
            name: "Advanced Persistent Threat (APT)".to_string(),
            skill_multiplier: 1.3,
            bypass_bonus: 0.15,
            noise_level: 0.1,
            description: "Nation-state or elite group — high stealth, high sophistication"
                .to_string(),
        }
    }

    /// Financially motivated group: moderate skill, moderate noise.
    #[must_use]
    pub fn organized_crime() -> Self {
        Self {
            key: "organized_crime".to_string(),
            name: "Organized Crime".to_string(),
            skill_multiplier: 1.0,
            bypass_bonus: 0.0,
            noise_level: 0.4,
            description: "Financially motivated group — moderate skill, moderate noise"
                .to_string(),
        }
    }

    /// Low-sophistication attacker using off-the-shelf tooling.
    #[must_use]
    pub fn script_kiddie() -> Self {
        Self {
            key: "script_kiddie".to_string(),
            name: "Script Kiddie".to_string(),
            skill_multiplier: 0.6,
            bypass_bonus: -0.15,
            noise_level: 0.8,
            description: "Low sophistication — uses off-the-shelf tools, easily detected"
                .to_string(),
        }
    }

    /// Resolves a profile by key, defaulting to APT for unknown keys.
    #[must_use]
    pub fn by_key(key: &str) -> Self {
        match key {
            "organized_crime" => Self::organized_crime(),
            "script_kiddie" => Self::script_kiddie(),
            _ => Self::apt(),
        }
    }
}

/// Aggregate numbers over one probabilistic analysis.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbabilitySummary {
    pub max_risk: f64,
    pub avg_risk: f64,
    pub critical_controls: usize,
    pub redundant_controls: usize,
    pub naked_assets: usize,
}

/// Full output of the probability layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityReport {
    pub adversary_profile: AdversaryProfile,
    pub goal_risks: Vec<GoalRiskReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monte_carlo: Option<Vec<MonteCarloReport>>,
    pub control_rankings: Vec<ControlImpact>,
    pub naked_critical_assets: Vec<NakedAsset>,
    pub summary: ProbabilitySummary,
}

/// Quantitative risk engine over a borrowed SCM.
pub struct ProbabilityEngine<'s> {
    scm: &'s Scm,
    index: GraphIndex<'s>,
    profile: AdversaryProfile,
}

impl<'s> ProbabilityEngine<'s> {
    /// Wraps an SCM under an adversary profile.
    #[must_use]
    pub fn new(scm: &'s Scm, profile: AdversaryProfile) -> Self {
        Self {
            scm,
            index: scm.index(),
            profile,
        }
    }

    /// The active adversary profile.
    #[must_use]
    pub fn profile(&self) -> &AdversaryProfile {
        &self.profile
    }

    pub(crate) fn scm(&self) -> &'s Scm {
        self.scm
    }

    pub(crate) fn index(&self) -> &GraphIndex<'s> {
        &self.index
    }

    /// The state a control is treated as having, honoring overrides.
    pub(crate) fn effective_state(
        &self,
        control_id: &str,
        overrides: &StateOverrides,
    ) -> Option<ControlState> {
        if let Some(&state) = overrides.get(control_id) {
            return Some(state);
        }
        self.scm.node(control_id).and_then(|n| n.control_state())
    }

    /// Runs the complete probabilistic analysis and attaches the
    /// quantitative fields to each goal's inevitability result.
    ///
    /// Dead ends (no paths, no witness) produce empty well-typed entries,
    /// never failures.
    pub fn run_full_analysis(
        &self,
        goals: &[GoalPredicate],
        results: &mut [InevitabilityResult],
        run_monte_carlo: bool,
        mc_trials: usize,
        mc_seed: Option<u64>,
    ) -> ProbabilityReport {
        let mut goal_risks = Vec::new();
        let mut mc_reports = Vec::new();

        for (goal, result) in goals.iter().zip(results.iter_mut()) {
            let risk = self.compute_goal_risk(goal, result);
            result.probabilistic_score = Some(risk.probabilistic_score);
            result.adversary_profile = Some(self.profile.name.clone());

            if run_monte_carlo {
                let mc = self.monte_carlo_simulate(goal, result, mc_trials, mc_seed);
                result.risk_distribution = Some(RiskDistribution {
                    mean: mc.probability,
                    ci_lower: mc.confidence_interval.lower,
                    ci_upper: mc.confidence_interval.upper,
                });
                mc_reports.push(mc);
            }

            goal_risks.push(risk);
        }

        let control_rankings = self.rank_control_impact(goals, results);
        let naked = self.detect_naked_critical_assets();

        let max_risk = goal_risks
            .iter()
            .map(|r| r.combined_risk)
            .fold(0.0f64, f64::max);
        let avg_risk = if goal_risks.is_empty() {
            0.0
        } else {
            goal_risks.iter().map(|r| r.combined_risk).sum::<f64>() / goal_risks.len() as f64
        };

        debug!(
            profile = %self.profile.key,
            goals = goals.len(),
            max_risk,
            "probability analysis finished"
        );

        ProbabilityReport {
            adversary_profile: self.profile.clone(),
            summary: ProbabilitySummary {
                max_risk,
                avg_risk: round_to(avg_risk, 4),
                critical_controls: control_rankings.iter().filter(|c| c.is_critical).count(),
                redundant_controls: control_rankings.iter().filter(|c| c.is_redundant).count(),
                naked_assets: naked.len(),
            },
            goal_risks,
            monte_carlo: run_monte_carlo.then_some(mc_reports),
            control_rankings,
            naked_critical_assets: naked,
        }
    }
}
