//! Multi-goal strategic optimization.
//!
//! Searches combinations of the currently weak controls (inactive or
//! partial) for the sets that buy the largest inevitability reduction
//! across every goal per currency unit, within an optional budget.

use serde::{Deserialize, Serialize};

use crate::model::GoalPredicate;
use crate::solver::{CausalSolver, Interventions};
use crate::types::ControlState;
use crate::utils::round_to;

/// Combination sizes beyond this explode combinatorially for no
/// practical gain.
const MAX_COMBO_SIZE: usize = 4;

/// Per-goal effect of one strategy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalImpact {
    pub goal_id: String,
    pub goal_name: String,
    pub before: f64,
    pub after: f64,
    /// Positive part of the reduction, rounded to three decimals.
    pub reduction: f64,
}

/// One candidate defense strategy: a set of controls to enable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DefenseStrategy {
    /// Control display names, in combination order.
    pub controls: Vec<String>,
    pub control_ids: Vec<String>,
    pub total_cost: f64,
    /// Summed positive reductions across all goals.
    pub total_reduction: f64,
    /// Reduction per 100k of cost (scaled); free strategies rank by
    /// reduction alone.
    pub roi_score: f64,
    pub goal_impacts: Vec<GoalImpact>,
    pub description: String,
    /// 1-based position after ranking.
    pub rank: usize,
    pub recommended: bool,
}

/// Pareto-style strategy search over a borrowed solver.
pub struct MultiGoalOptimizer<'a, 's> {
    solver: &'a CausalSolver<'s>,
}

impl<'a, 's> MultiGoalOptimizer<'a, 's> {
    /// Wraps a solver.
    #[must_use]
    pub fn new(solver: &'a CausalSolver<'s>) -> Self {
        Self { solver }
    }

    /// Top strategies ranked by return on investment.
    ///
    /// Only inactive and partial controls are candidates — enabling an
    /// already-active control buys nothing. Combinations are capped at
    /// four members and pruned by `budget_limit`.
    #[must_use]
    pub fn compute_optimal_strategies(
        &self,
        goals: &[GoalPredicate],
        budget_limit: f64,
        max_strategies: usize,
    ) -> Vec<DefenseStrategy> {
        let fixable: Vec<(String, String, f64)> = self
            .solver
            .scm()
            .graph
            .controls()
            .filter(|node| {
                matches!(
                    node.control_state(),
                    Some(ControlState::Inactive | ControlState::Partial)
                )
            })
            .map(|node| (node.id.clone(), node.name.clone(), node.annual_cost()))
            .collect();

        let baselines: Vec<f64> = goals
            .iter()
            .map(|goal| self.solver.compute_inevitability(goal, None).score)
            .collect();

        let mut strategies: Vec<DefenseStrategy> = Vec::new();
        let n = fixable.len();
        for size in 1..=MAX_COMBO_SIZE.min(n) {
            let mut combo: Vec<usize> = (0..size).collect();
            loop {
                let members: Vec<&(String, String, f64)> =
                    combo.iter().map(|&i| &fixable[i]).collect();
                let total_cost: f64 = members.iter().map(|(_, _, cost)| cost).sum();

                if total_cost <= budget_limit {
                    let interventions: Interventions = members
                        .iter()
                        .map(|(id, _, _)| (id.clone(), true))
                        .collect();

                    let mut total_reduction = 0.0;
                    let mut goal_impacts = Vec::new();
                    for (goal, &baseline) in goals.iter().zip(&baselines) {
                        let after = self
                            .solver
                            .compute_inevitability(goal, Some(&interventions))
                            .score;
                        let reduction = (baseline - after).max(0.0);
                        total_reduction += reduction;
                        goal_impacts.push(GoalImpact {
                            goal_id: goal.id.clone(),
                            goal_name: goal.name.clone(),
                            before: round_to(baseline, 3),
                            after: round_to(after, 3),
                            reduction: round_to(reduction, 3),
                        });
                    }

                    let roi = if total_cost > 0.0 {
                        total_reduction / (total_cost / 100_000.0)
                    } else {
                        total_reduction * 1000.0
                    };

                    strategies.push(DefenseStrategy {
                        controls: members.iter().map(|(_, name, _)| name.clone()).collect(),
                        control_ids: members.iter().map(|(id, _, _)| id.clone()).collect(),
                        total_cost,
                        total_reduction: round_to(total_reduction, 3),
                        roi_score: round_to(roi, 2),
                        description: Self::describe(&members, &goal_impacts),
                        goal_impacts,
                        rank: 0,
                        recommended: false,
                    });
                }

                if !super::mcs::next_combination(&mut combo, n) {
                    break;
                }
            }
        }

        strategies.sort_by(|a, b| b.roi_score.total_cmp(&a.roi_score));
        strategies.truncate(max_strategies);
        for (i, strategy) in strategies.iter_mut().enumerate() {
            strategy.rank = i + 1;
            strategy.recommended = i == 0;
        }
        strategies
    }

    fn describe(members: &[&(String, String, f64)], impacts: &[GoalImpact]) -> String {
        let names: Vec<&str> = members.iter().map(|(_, name, _)| name.as_str()).collect();
        let best = impacts
            .iter()
            .filter(|i| i.reduction > 0.0)
            .max_by(|a, b| a.reduction.total_cmp(&b.reduction));
        match best {
            Some(best) => format!(
                "Enable {} — reduces {} by {:.0}%",
                names.join(", "),
                best.goal_name,
                best.reduction * 100.0
            ),
            None => format!(
                "Enable {} — minimal impact on current goals",
                names.join(", ")
            ),
        }
    }
}
