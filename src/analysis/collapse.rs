//! Collapse and fragility analysis.
//!
//! Answers "how badly does the architecture degrade when controls fail":
//! per-control collapse radius (goals pushed from defended to inevitable),
//! an aggregate fragility grade, and a frame-by-frame cascading failure
//! simulation where each step disables the currently most critical
//! remaining control.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::GoalPredicate;
use crate::solver::{CausalSolver, Interventions};
use crate::types::GoalStatus;
use crate::utils::round_to;

/// Node color above this max-goal score.
const RED_SCORE: f64 = 0.7;
/// Node color above this max-goal score (below red).
const YELLOW_SCORE: f64 = 0.4;
/// Nodes pulse in the visualization above this score.
const PULSE_SCORE: f64 = 0.8;

/// Collapse metrics for one control.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollapseMetrics {
    pub control_id: String,
    pub control_name: String,
    /// Goals pushed from below threshold to at-or-above by this control's
    /// failure.
    pub collapse_radius: usize,
    /// Sum of positive score increases across goals, rounded to three
    /// decimals.
    pub total_inevitability_increase: f64,
    /// Goals that flip from defended to inevitable.
    pub single_point_of_failure_count: usize,
    /// `100·radius + 10·increase`; orders the cascade.
    pub criticality_rank: f64,
}

/// Visual state of one node in a simulation frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    pub name: String,
    /// Hex color bucket: red ≥ 0.7, yellow ≥ 0.4, green otherwise.
    pub color: String,
    pub score: f64,
    pub status: GoalStatus,
    /// Highlight flag for scores above 0.8.
    pub pulse: bool,
}

/// State of one goal in a simulation frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalState {
    pub name: String,
    pub score: f64,
    pub status: GoalStatus,
    /// `true` the first frame this goal crosses into inevitable.
    pub newly_inevitable: bool,
}

/// One frame of the cascading collapse simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollapseFrame {
    pub step: usize,
    /// Name of the control disabled this step; `None` for the baseline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_disabled: Option<String>,
    pub label: String,
    /// Per-node visual state, keyed by node id.
    pub node_states: BTreeMap<String, NodeState>,
    /// Per-goal state, keyed by goal id.
    pub goal_states: BTreeMap<String, GoalState>,
    pub narration: String,
}

/// Architectural anti-pattern detected from collapse metrics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AntiPattern {
    /// Pattern tag, e.g. `SPOF_COLLAPSE`.
    pub name: String,
    pub severity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control: Option<String>,
    pub description: String,
    pub fix: String,
}

/// Aggregate fragility profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FragilityProfile {
    /// Architectural Fragility Index: mean collapse radius normalized by
    /// goal count.
    pub afi: f64,
    pub grade: crate::types::FragilityGrade,
    /// Controls whose failure collapses every goal.
    pub spof_count: usize,
    /// Controls whose radius exceeds half the goals.
    pub high_collapse_controls: usize,
    /// Mean cardinality of the primary MCS per goal; filled by the
    /// orchestrator once MCS extraction has run.
    pub mean_mcs_cardinality: f64,
    /// `spof_count / controls`.
    pub structural_brittleness: f64,
    pub anti_patterns: Vec<AntiPattern>,
}

/// Collapse analyzer over a borrowed solver.
pub struct CollapseEngine<'a, 's> {
    solver: &'a CausalSolver<'s>,
}

impl<'a, 's> CollapseEngine<'a, 's> {
    /// Wraps a solver.
    #[must_use]
    pub fn new(solver: &'a CausalSolver<'s>) -> Self {
        Self { solver }
    }

    /// Collapse metrics for one control against a goal set.
    ///
    /// Returns `None` when the id does not name a known control; callers
    /// iterating the whole inventory skip and continue.
    #[must_use]
    pub fn compute_collapse_radius(
        &self,
        control_id: &str,
        goals: &[GoalPredicate],
    ) -> Option<CollapseMetrics> {
        let ctrl = self.solver.scm().node(control_id)?;
        if !ctrl.is_control() {
            return None;
        }

        let mut collapsed = 0usize;
        let mut total_increase = 0.0;
        let mut spof = 0usize;

        for goal in goals {
            let mut on = Interventions::default();
            on.insert(control_id.to_string(), true);
            let before = self.solver.compute_inevitability(goal, Some(&on));

            let mut off = Interventions::default();
            off.insert(control_id.to_string(), false);
            let after = self.solver.compute_inevitability(goal, Some(&off));

            if before.score < goal.threshold && after.score >= goal.threshold {
                collapsed += 1;
            }
            total_increase += (after.score - before.score).max(0.0);
            if after.is_inevitable && !before.is_inevitable {
                spof += 1;
            }
        }

        Some(CollapseMetrics {
            control_id: control_id.to_string(),
            control_name: ctrl.name.clone(),
            collapse_radius: collapsed,
            total_inevitability_increase: round_to(total_increase, 3),
            single_point_of_failure_count: spof,
            criticality_rank: collapsed as f64 * 100.0 + total_increase * 10.0,
        })
    }

    /// Metrics for every control, ranked by criticality (stable order for
    /// equal ranks).
    #[must_use]
    pub fn compute_all_collapse_metrics(&self, goals: &[GoalPredicate]) -> Vec<CollapseMetrics> {
        let control_ids: Vec<String> = self
            .solver
            .scm()
            .graph
            .controls()
            .map(|c| c.id.clone())
            .collect();
        let mut metrics: Vec<CollapseMetrics> = control_ids
            .iter()
            .filter_map(|id| self.compute_collapse_radius(id, goals))
            .collect();
        metrics.sort_by(|a, b| b.criticality_rank.total_cmp(&a.criticality_rank));
        metrics
    }

    /// The Architectural Fragility Index and its grade.
    ///
    /// `mean_mcs_cardinality` is left at zero here; the orchestrator
    /// fills it from the MCS results.
    #[must_use]
    pub fn compute_fragility(&self, goals: &[GoalPredicate]) -> FragilityProfile {
        let total_controls = self.solver.scm().graph.controls().count();
        if total_controls == 0 || goals.is_empty() {
            return FragilityProfile::default();
        }

        let metrics = self.compute_all_collapse_metrics(goals);
        let total_goals = goals.len();

        let radius_sum: usize = metrics.iter().map(|m| m.collapse_radius).sum();
        let avg_collapse = radius_sum as f64 / total_controls as f64;
        let afi = avg_collapse / total_goals as f64;

        let spof_count = metrics
            .iter()
            .filter(|m| m.collapse_radius == total_goals)
            .count();
        let high_collapse = metrics
            .iter()
            .filter(|m| m.collapse_radius as f64 > total_goals as f64 / 2.0)
            .count();

        FragilityProfile {
            afi: round_to(afi, 3),
            grade: crate::types::FragilityGrade::from_afi(afi),
            spof_count,
            high_collapse_controls: high_collapse,
            mean_mcs_cardinality: 0.0,
            structural_brittleness: round_to(spof_count as f64 / total_controls as f64, 3),
            anti_patterns: Self::detect_anti_patterns(&metrics, total_goals),
        }
    }

    /// Frame-by-frame cascading collapse.
    ///
    /// Frame 0 is the untouched baseline. Each following step re-ranks
    /// the not-yet-disabled controls under the interventions accumulated
    /// so far, disables the highest-ranked one, and snapshots node and
    /// goal states. The cascade stops when no remaining control moves any
    /// goal, or when the inventory is exhausted.
    #[must_use]
    pub fn simulate_collapse(&self, goals: &[GoalPredicate]) -> Vec<CollapseFrame> {
        let mut frames = Vec::new();
        let mut disabled = Interventions::default();

        let baseline_scores = self.goal_scores(goals, &disabled);
        let mut prev_status: BTreeMap<String, GoalStatus> = BTreeMap::new();
        let mut goal_states = BTreeMap::new();
        for (goal, &score) in goals.iter().zip(&baseline_scores) {
            let status = GoalStatus::classify(score, goal.threshold);
            prev_status.insert(goal.id.clone(), status);
            goal_states.insert(
                goal.id.clone(),
                GoalState {
                    name: goal.name.clone(),
                    score,
                    status,
                    newly_inevitable: false,
                },
            );
        }

        frames.push(CollapseFrame {
            step: 0,
            control_disabled: None,
            label: "Current Architecture — All Controls Active".to_string(),
            node_states: self.node_states(goals, &baseline_scores),
            goal_states,
            narration: "Baseline state with all security controls active.".to_string(),
        });

        let all_controls: Vec<(String, String)> = self
            .solver
            .scm()
            .graph
            .controls()
            .map(|c| (c.id.clone(), c.name.clone()))
            .collect();
        let max_steps = all_controls.len();
        let mut step = 0usize;

        while step < max_steps {
            let best = self.rank_remaining(goals, &all_controls, &disabled);
            let Some(best) = best else { break };
            if best.collapse_radius == 0 && best.total_inevitability_increase <= 0.0 {
                break;
            }

            step += 1;
            disabled.insert(best.control_id.clone(), false);

            let scores = self.goal_scores(goals, &disabled);
            let mut goal_states = BTreeMap::new();
            let mut newly_inevitable: Vec<&str> = Vec::new();
            for (goal, &score) in goals.iter().zip(&scores) {
                let status = GoalStatus::classify(score, goal.threshold);
                let newly = status == GoalStatus::Inevitable
                    && prev_status.get(&goal.id) != Some(&GoalStatus::Inevitable);
                if newly {
                    newly_inevitable.push(goal.name.as_str());
                }
                goal_states.insert(
                    goal.id.clone(),
                    GoalState {
                        name: goal.name.clone(),
                        score,
                        status,
                        newly_inevitable: newly,
                    },
                );
                prev_status.insert(goal.id.clone(), status);
            }

            let narration = if newly_inevitable.is_empty() {
                format!(
                    "Disabling {} increases risk but no goals crossed threshold yet.",
                    best.control_name
                )
            } else {
                format!(
                    "Disabling {} causes {} goal(s) to become inevitable: {}",
                    best.control_name,
                    newly_inevitable.len(),
                    newly_inevitable.join(", ")
                )
            };

            debug!(step, control = %best.control_name, "collapse step");

            frames.push(CollapseFrame {
                step,
                control_disabled: Some(best.control_name.clone()),
                label: format!("{} Failure", best.control_name),
                node_states: self.node_states(goals, &scores),
                goal_states,
                narration,
            });
        }

        frames
    }

    /// State-aware criticality ranking of the remaining controls; the
    /// first control with the strictly highest rank wins, keeping the
    /// cascade deterministic.
    fn rank_remaining(
        &self,
        goals: &[GoalPredicate],
        all_controls: &[(String, String)],
        disabled: &Interventions,
    ) -> Option<CollapseMetrics> {
        let mut best: Option<CollapseMetrics> = None;

        for (id, name) in all_controls {
            if disabled.contains_key(id) {
                continue;
            }

            let mut on = disabled.clone();
            on.insert(id.clone(), true);
            let mut off = disabled.clone();
            off.insert(id.clone(), false);

            let mut collapsed = 0usize;
            let mut total_increase = 0.0;
            for goal in goals {
                let with = self.solver.compute_inevitability(goal, Some(&on));
                let without = self.solver.compute_inevitability(goal, Some(&off));
                if with.score < goal.threshold && without.score >= goal.threshold {
                    collapsed += 1;
                }
                total_increase += (without.score - with.score).max(0.0);
            }

            let rank = collapsed as f64 * 100.0 + total_increase * 10.0;
            if best.as_ref().is_none_or(|b| rank > b.criticality_rank) {
                best = Some(CollapseMetrics {
                    control_id: id.clone(),
                    control_name: name.clone(),
                    collapse_radius: collapsed,
                    total_inevitability_increase: round_to(total_increase, 3),
                    single_point_of_failure_count: 0,
                    criticality_rank: rank,
                });
            }
        }

        best
    }

    /// One inevitability score per goal under the given interventions.
    fn goal_scores(&self, goals: &[GoalPredicate], interventions: &Interventions) -> Vec<f64> {
        goals
            .iter()
            .map(|goal| {
                self.solver
                    .compute_inevitability(goal, Some(interventions))
                    .score
            })
            .collect()
    }

    /// Color-bucketed node states: each node takes the maximum score of
    /// the goals that reference it.
    fn node_states(
        &self,
        goals: &[GoalPredicate],
        scores: &[f64],
    ) -> BTreeMap<String, NodeState> {
        let mut states = BTreeMap::new();
        for node in &self.solver.scm().graph.nodes {
            let mut max_score = 0.0f64;
            for (goal, &score) in goals.iter().zip(scores) {
                let references = goal.target_assets.iter().any(|t| t == &node.id)
                    || goal.required_conditions.iter().any(|c| c == &node.id);
                if references {
                    max_score = max_score.max(score);
                }
            }

            let (color, status) = if max_score >= RED_SCORE {
                ("#ef4444", GoalStatus::Inevitable)
            } else if max_score >= YELLOW_SCORE {
                ("#eab308", GoalStatus::AtRisk)
            } else {
                ("#22c55e", GoalStatus::Defended)
            };

            states.insert(
                node.id.clone(),
                NodeState {
                    name: node.name.clone(),
                    color: color.to_string(),
                    score: round_to(max_score, 2),
                    status,
                    pulse: max_score > PULSE_SCORE,
                },
            );
        }
        states
    }

    fn detect_anti_patterns(metrics: &[CollapseMetrics], total_goals: usize) -> Vec<AntiPattern> {
        let mut patterns = Vec::new();

        for m in metrics {
            if m.collapse_radius as f64 >= total_goals as f64 * 0.7 {
                patterns.push(AntiPattern {
                    name: "SPOF_COLLAPSE".to_string(),
                    severity: "CRITICAL".to_string(),
                    control: Some(m.control_name.clone()),
                    description: format!(
                        "Single control failure collapses {}/{} goals",
                        m.collapse_radius, total_goals
                    ),
                    fix: format!(
                        "Add redundant controls to reduce dependence on {}",
                        m.control_name
                    ),
                });
            }
        }

        if !metrics.is_empty() {
            let avg: f64 = metrics.iter().map(|m| m.collapse_radius as f64).sum::<f64>()
                / metrics.len() as f64;
            if avg > total_goals as f64 * 0.3 {
                patterns.push(AntiPattern {
                    name: "HIGH_AVERAGE_COLLAPSE".to_string(),
                    severity: "HIGH".to_string(),
                    control: None,
                    description: format!(
                        "Average collapse radius is {avg:.1}/{total_goals} — architecture is \
                         fragile"
                    ),
                    fix: "Implement defense-in-depth with independent control layers".to_string(),
                });
            }
        }

        patterns
    }
}
