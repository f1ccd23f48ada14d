//! Goal collision analysis.
//!
//! Two goals interact through the controls their attack surfaces share:
//! hardening a shared control may defend both (synergy), defend one at
//! the other's expense (conflict), or matter to neither. Relevant
//! controls are read off the backward slice of each goal's targets.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::GoalPredicate;
use crate::solver::{CausalSolver, Interventions};
use crate::utils::round_to;

/// Reduction that counts as "helps this goal".
const HELPS_DELTA: f64 = 0.1;
/// Increase that counts as "hurts this goal".
const HURTS_DELTA: f64 = 0.05;

/// Kind of pairwise goal interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollisionKind {
    /// Hardening shared controls reduces both goals.
    Synergy,
    /// Hardening one goal's controls worsens the other.
    Conflict,
    /// Shared controls with mixed impact.
    PartialOverlap,
    /// No shared controls at all.
    Independent,
}

/// One side of a collision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalRef {
    pub id: String,
    pub name: String,
    pub score: f64,
}

/// Interaction between one pair of goals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalCollision {
    pub goal_1: GoalRef,
    pub goal_2: GoalRef,
    pub collision_type: CollisionKind,
    pub description: String,
    /// Shared structurally relevant control ids, sorted.
    pub shared_controls: Vec<String>,
    pub shared_control_count: usize,
    pub unique_to_goal_1: usize,
    pub unique_to_goal_2: usize,
}

/// Pairwise goal interaction analyzer.
pub struct GoalCollisionAnalyzer<'a, 's> {
    solver: &'a CausalSolver<'s>,
}

impl<'a, 's> GoalCollisionAnalyzer<'a, 's> {
    /// Wraps a solver.
    #[must_use]
    pub fn new(solver: &'a CausalSolver<'s>) -> Self {
        Self { solver }
    }

    /// Analyzes every unordered goal pair, in goal order.
    #[must_use]
    pub fn analyze_collisions(&self, goals: &[GoalPredicate]) -> Vec<GoalCollision> {
        let mut collisions = Vec::new();
        for (i, g1) in goals.iter().enumerate() {
            for g2 in &goals[i + 1..] {
                collisions.push(self.analyze_pair(g1, g2));
            }
        }
        collisions
    }

    fn analyze_pair(&self, g1: &GoalPredicate, g2: &GoalPredicate) -> GoalCollision {
        let r1 = self.solver.compute_inevitability(g1, None);
        let r2 = self.solver.compute_inevitability(g2, None);

        let controls_1 = self.relevant_controls(g1);
        let controls_2 = self.relevant_controls(g2);

        let shared: Vec<String> = controls_1.intersection(&controls_2).cloned().collect();
        let unique_1 = controls_1.difference(&controls_2).count();
        let unique_2 = controls_2.difference(&controls_1).count();

        let (kind, description) = if shared.is_empty() {
            (
                CollisionKind::Independent,
                "Goals use completely independent control sets".to_string(),
            )
        } else {
            let forced: Interventions = shared.iter().map(|id| (id.clone(), true)).collect();
            let new_r1 = self.solver.compute_inevitability(g1, Some(&forced));
            let new_r2 = self.solver.compute_inevitability(g2, Some(&forced));
            let d1 = r1.score - new_r1.score;
            let d2 = r2.score - new_r2.score;

            if d1 > HELPS_DELTA && d2 > HELPS_DELTA {
                (
                    CollisionKind::Synergy,
                    "Fixing shared controls reduces both goals significantly".to_string(),
                )
            } else if (d1 > HELPS_DELTA && d2 < -HURTS_DELTA)
                || (d2 > HELPS_DELTA && d1 < -HURTS_DELTA)
            {
                (
                    CollisionKind::Conflict,
                    "Fixing one goal's controls worsens the other".to_string(),
                )
            } else {
                (
                    CollisionKind::PartialOverlap,
                    format!("Goals share {} controls with mixed impact", shared.len()),
                )
            }
        };

        GoalCollision {
            goal_1: GoalRef {
                id: g1.id.clone(),
                name: g1.name.clone(),
                score: round_to(r1.score, 3),
            },
            goal_2: GoalRef {
                id: g2.id.clone(),
                name: g2.name.clone(),
                score: round_to(r2.score, 3),
            },
            collision_type: kind,
            description,
            shared_control_count: shared.len(),
            shared_controls: shared,
            unique_to_goal_1: unique_1,
            unique_to_goal_2: unique_2,
        }
    }

    /// Controls structurally relevant to a goal: every negated parent of
    /// an equation whose target lies in the backward slice of the goal's
    /// target assets. Sorted set, so pair analysis is deterministic.
    fn relevant_controls(&self, goal: &GoalPredicate) -> BTreeSet<String> {
        let scm = self.solver.scm();
        let mut slice: BTreeSet<String> = BTreeSet::new();
        for target in &goal.target_assets {
            slice.extend(scm.backward_slice(target));
        }

        let mut controls = BTreeSet::new();
        for eq in &scm.equations {
            if slice.contains(&eq.target) {
                controls.extend(eq.negated_parents.iter().cloned());
            }
        }
        controls
    }
}
