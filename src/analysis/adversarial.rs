//! Adversarial defense testing.
//!
//! Simulates the optimal attacker move: for each active control, what
//! happens to every goal if exactly that control fails? The resulting
//! vectors are ranked by worst-case impact, surfacing the single control
//! whose bypass is most devastating.

use serde::{Deserialize, Serialize};

use crate::model::GoalPredicate;
use crate::solver::{CausalSolver, Interventions};
use crate::types::ControlState;
use crate::utils::round_to;

/// Per-goal score movement under one control failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalDelta {
    pub goal: String,
    pub before: f64,
    pub after: f64,
    pub delta: f64,
}

/// One single-control attack vector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttackVector {
    pub control_to_bypass: String,
    pub control_id: String,
    /// The control's annual cost, as a proxy for bypass effort.
    pub bypass_cost_estimate: f64,
    /// Largest per-goal score increase, rounded to three decimals.
    pub max_impact: f64,
    pub goal_impacts: Vec<GoalDelta>,
    /// `CRITICAL` (> 0.5), `HIGH` (> 0.2), `MEDIUM` (> 0.05), or `LOW`.
    pub severity: String,
}

/// Red-team report over every active control.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdversarialReport {
    pub total_controls_tested: usize,
    pub critical_vectors: usize,
    pub high_vectors: usize,
    /// Vectors ranked by impact, most devastating first.
    pub attack_vectors: Vec<AttackVector>,
    /// The top vector, when any control was tested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimal_attack: Option<AttackVector>,
    pub recommendation: String,
}

/// Single-control-failure red teaming.
pub struct AdversarialTester<'a, 's> {
    solver: &'a CausalSolver<'s>,
}

impl<'a, 's> AdversarialTester<'a, 's> {
    /// Wraps a solver.
    #[must_use]
    pub fn new(solver: &'a CausalSolver<'s>) -> Self {
        Self { solver }
    }

    /// Tests the failure of every active control against every goal.
    #[must_use]
    pub fn run(&self, goals: &[GoalPredicate]) -> AdversarialReport {
        let active: Vec<(String, String, f64)> = self
            .solver
            .scm()
            .graph
            .controls()
            .filter(|node| node.control_state() == Some(ControlState::Active))
            .map(|node| (node.id.clone(), node.name.clone(), node.annual_cost()))
            .collect();

        let baselines: Vec<f64> = goals
            .iter()
            .map(|goal| self.solver.compute_inevitability(goal, None).score)
            .collect();

        let mut vectors: Vec<AttackVector> = active
            .iter()
            .map(|(id, name, cost)| {
                let mut failed = Interventions::default();
                failed.insert(id.clone(), false);

                let mut max_impact = 0.0f64;
                let mut impacts = Vec::new();
                for (goal, &baseline) in goals.iter().zip(&baselines) {
                    let after = self
                        .solver
                        .compute_inevitability(goal, Some(&failed))
                        .score;
                    let delta = after - baseline;
                    max_impact = max_impact.max(delta);
                    impacts.push(GoalDelta {
                        goal: goal.name.clone(),
                        before: round_to(baseline, 3),
                        after: round_to(after, 3),
                        delta: round_to(delta, 3),
                    });
                }

                let severity = if max_impact > 0.5 {
                    "CRITICAL"
                } else if max_impact > 0.2 {
                    "HIGH"
                } else if max_impact > 0.05 {
                    "MEDIUM"
                } else {
                    "LOW"
                };

                AttackVector {
                    control_to_bypass: name.clone(),
                    control_id: id.clone(),
                    bypass_cost_estimate: *cost,
                    max_impact: round_to(max_impact, 3),
                    goal_impacts: impacts,
                    severity: severity.to_string(),
                }
            })
            .collect();

        vectors.sort_by(|a, b| b.max_impact.total_cmp(&a.max_impact));

        let critical = vectors.iter().filter(|v| v.severity == "CRITICAL").count();
        let high = vectors.iter().filter(|v| v.severity == "HIGH").count();
        let recommendation = Self::summarize(&vectors);

        AdversarialReport {
            total_controls_tested: active.len(),
            critical_vectors: critical,
            high_vectors: high,
            optimal_attack: vectors.first().cloned(),
            attack_vectors: vectors,
            recommendation,
        }
    }

    fn summarize(vectors: &[AttackVector]) -> String {
        if vectors.is_empty() {
            return "No active controls to test.".to_string();
        }
        let critical: Vec<&AttackVector> =
            vectors.iter().filter(|v| v.severity == "CRITICAL").collect();
        if let Some(worst) = critical.first() {
            format!(
                "ALERT: {} critical single-point-of-failure controls identified. Bypassing '{}' \
                 causes maximum damage.",
                critical.len(),
                worst.control_to_bypass
            )
        } else {
            "No critical single-point-of-failure controls found. Defense posture is reasonably \
             resilient to individual control bypass."
                .to_string()
        }
    }
}
