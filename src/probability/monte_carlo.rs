//! Seeded Monte Carlo validation of the analytic risk numbers.

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::model::GoalPredicate;
use crate::solver::InevitabilityResult;
use crate::types::ControlState;
use crate::utils::{clamp_prob, round_to};

use super::{ProbabilityEngine, StateOverrides};

/// 95% z-score for the normal-approximation interval.
const Z_95: f64 = 1.96;
/// Below this many trials the normal approximation is not reported.
const MIN_TRIALS_FOR_CI: usize = 30;

/// Normal-approximation confidence interval.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    /// Always `95%`.
    pub level: String,
}

/// Result of one Monte Carlo run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloReport {
    pub goal_id: String,
    pub goal_name: String,
    pub simulations: usize,
    pub successes: usize,
    pub probability: f64,
    pub probability_percent: f64,
    pub confidence_interval: ConfidenceInterval,
    pub adversary_profile: String,
    /// The seed actually used; replaying with it reproduces the run
    /// byte for byte.
    pub seed: u64,
}

impl MonteCarloReport {
    fn empty(goal: &GoalPredicate, profile_name: &str, seed: u64) -> Self {
        Self {
            goal_id: goal.id.clone(),
            goal_name: goal.name.clone(),
            simulations: 0,
            successes: 0,
            probability: 0.0,
            probability_percent: 0.0,
            confidence_interval: ConfidenceInterval {
                lower: 0.0,
                upper: 0.0,
                level: "95%".to_string(),
            },
            adversary_profile: profile_name.to_string(),
            seed,
        }
    }
}

/// FNV-1a fold over the simulation inputs; the default seed is a pure
/// function of goal id, adversary key, and trial count.
#[must_use]
pub(super) fn derive_seed(goal_id: &str, profile_key: &str, trials: usize) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET;
    for byte in goal_id
        .as_bytes()
        .iter()
        .chain(profile_key.as_bytes())
        .chain(&trials.to_le_bytes())
    {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

impl ProbabilityEngine<'_> {
    /// Simulates `trials` independent attack attempts against the goal's
    /// enumerated paths.
    ///
    /// Per trial, every hop rolls its edge exploit and every protecting
    /// control rolls its bypass; the attack succeeds if any path is
    /// clean end to end. The run is deterministic for a given seed; when
    /// `seed` is `None` one is derived from the inputs.
    #[must_use]
    pub fn monte_carlo_simulate(
        &self,
        goal: &GoalPredicate,
        inevitability: &InevitabilityResult,
        trials: usize,
        seed: Option<u64>,
    ) -> MonteCarloReport {
        let seed =
            seed.unwrap_or_else(|| derive_seed(&goal.id, &self.profile().key, trials));

        let (mut paths, _capped) = self.enumerate_attack_paths(goal);
        if paths.is_empty() {
            match &inevitability.witness_path {
                Some(witness) if !witness.is_empty() => paths.push(witness.clone()),
                _ => return MonteCarloReport::empty(goal, &self.profile().name, seed),
            }
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let overrides = StateOverrides::default();
        let mut successes = 0usize;
        for _ in 0..trials {
            let succeeded = paths
                .iter()
                .any(|path| self.simulate_path(path, &overrides, &mut rng));
            if succeeded {
                successes += 1;
            }
        }

        let probability = if trials == 0 {
            0.0
        } else {
            successes as f64 / trials as f64
        };

        let (lower, upper) = if trials > MIN_TRIALS_FOR_CI {
            let se = (probability * (1.0 - probability) / trials as f64).sqrt();
            (
                (probability - Z_95 * se).max(0.0),
                (probability + Z_95 * se).min(1.0),
            )
        } else {
            (probability, probability)
        };

        MonteCarloReport {
            goal_id: goal.id.clone(),
            goal_name: goal.name.clone(),
            simulations: trials,
            successes,
            probability: round_to(probability, 4),
            probability_percent: round_to(probability * 100.0, 1),
            confidence_interval: ConfidenceInterval {
                lower: round_to(lower, 4),
                upper: round_to(upper, 4),
                level: "95%".to_string(),
            },
            adversary_profile: self.profile().name.clone(),
            seed,
        }
    }

    /// One attempt along one path: every hop must win its edge roll and
    /// bypass every active or partial control protecting the hop target.
    fn simulate_path(&self, path: &[String], overrides: &StateOverrides, rng: &mut StdRng) -> bool {
        let bonus = self.profile().bypass_bonus;

        for hop in path.windows(2) {
            let edge_prob = self.edge_probability(&hop[0], &hop[1]);
            let effective = (edge_prob * self.profile().skill_multiplier).min(1.0);
            if rng.random::<f64>() > effective {
                return false;
            }

            let Some(eq) = self.scm().equation_for(&hop[1]) else {
                continue;
            };
            for ctrl_id in &eq.negated_parents {
                let Some(profile) = self.scm().node(ctrl_id).and_then(|n| n.control_profile()) else {
                    continue;
                };
                let bypass = match self.effective_state(ctrl_id, overrides) {
                    Some(ControlState::Active) => {
                        clamp_prob(profile.bypass_probability + bonus, 0.01, 1.0)
                    }
                    Some(ControlState::Partial) => {
                        clamp_prob(1.5 * profile.bypass_probability + bonus, 0.01, 1.0)
                    }
                    _ => continue,
                };
                if rng.random::<f64>() > bypass {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_derivation_is_stable_and_input_sensitive() {
        let a = derive_seed("goal", "apt", 10_000);
        let b = derive_seed("goal", "apt", 10_000);
        assert_eq!(a, b);
        assert_ne!(a, derive_seed("goal", "apt", 10_001));
        assert_ne!(a, derive_seed("goal", "script_kiddie", 10_000));
        assert_ne!(a, derive_seed("other", "apt", 10_000));
    }
}
