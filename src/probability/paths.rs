//! Attack path enumeration and analytic risk.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::model::GoalPredicate;
use crate::solver::InevitabilityResult;
use crate::types::ControlState;
use crate::utils::{clamp_prob, round_to};

use super::{ProbabilityEngine, StateOverrides};

/// Total paths analyzed per goal.
const MAX_PATHS: usize = 20;
/// Paths kept per (identity, target) pair.
const MAX_PATHS_PER_PAIR: usize = 5;
/// BFS depth bound in nodes.
const MAX_DEPTH: usize = 10;
/// Default exploit probability for hops without a modeled edge.
const DEFAULT_EDGE_PROBABILITY: f64 = 0.5;

/// One scored attack path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathRisk {
    pub path: Vec<String>,
    pub risk: f64,
    pub path_length: usize,
}

/// Quantitative risk for one goal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalRiskReport {
    pub goal_id: String,
    pub goal_name: String,
    /// Same value as `combined_risk`; the goal's headline number.
    pub probabilistic_score: f64,
    /// Top five riskiest paths.
    pub path_risks: Vec<PathRisk>,
    /// `1 − Π (1 − path_risk)` over every analyzed path.
    pub combined_risk: f64,
    pub adversary_profile: String,
    /// Mean active controls per path hop.
    pub defense_depth_factor: f64,
    pub total_paths_analyzed: usize,
    /// `true` when enumeration hit the path cap; larger graphs may have
    /// uncounted paths beyond the bound.
    pub paths_capped: bool,
}

impl GoalRiskReport {
    fn empty(goal: &GoalPredicate, profile_name: &str) -> Self {
        Self {
            goal_id: goal.id.clone(),
            goal_name: goal.name.clone(),
            probabilistic_score: 0.0,
            path_risks: Vec::new(),
            combined_risk: 0.0,
            adversary_profile: profile_name.to_string(),
            defense_depth_factor: 1.0,
            total_paths_analyzed: 0,
            paths_capped: false,
        }
    }
}

impl ProbabilityEngine<'_> {
    /// Probability that one specific path succeeds end to end:
    /// `Π (effective_edge · control_residual)` over each hop.
    #[must_use]
    pub fn compute_path_risk(&self, path: &[String]) -> f64 {
        self.path_risk_with(path, &StateOverrides::default())
    }

    pub(super) fn path_risk_with(&self, path: &[String], overrides: &StateOverrides) -> f64 {
        if path.len() < 2 {
            return 0.0;
        }

        let mut risk = 1.0;
        for hop in path.windows(2) {
            let edge_prob = self.edge_probability(&hop[0], &hop[1]);
            let residual = self.control_residual(&hop[1], overrides);
            let effective = (edge_prob * self.profile().skill_multiplier).min(1.0);
            risk *= effective * residual;
        }
        round_to(risk, 6)
    }

    /// Exploit probability of the first modeled edge between two nodes,
    /// falling back to 0.5 for unmodeled hops.
    pub(super) fn edge_probability(&self, source: &str, target: &str) -> f64 {
        self.index()
            .edges_from(source)
            .find(|edge| edge.target == target)
            .map_or(DEFAULT_EDGE_PROBABILITY, |edge| edge.exploit_probability)
    }

    /// Residual risk after the controls protecting a node, honoring
    /// overrides. Defense-in-depth stacks multiplicatively: an active
    /// control passes `clamp(bypass + bonus, 0.01, 1)`, a partial one
    /// passes `clamp(1.5·bypass + bonus, 0.01, 1)` (the 1.5 factor can
    /// saturate the clamp), and inactive or unknown controls pass
    /// everything.
    pub(super) fn control_residual(&self, target_id: &str, overrides: &StateOverrides) -> f64 {
        let Some(eq) = self.scm().equation_for(target_id) else {
            return 1.0;
        };

        let bonus = self.profile().bypass_bonus;
        let mut residual = 1.0;
        for ctrl_id in &eq.negated_parents {
            let Some(node) = self.scm().node(ctrl_id) else {
                continue;
            };
            let Some(profile) = node.control_profile() else {
                continue;
            };
            match self.effective_state(ctrl_id, overrides) {
                Some(ControlState::Active) => {
                    residual *= clamp_prob(profile.bypass_probability + bonus, 0.01, 1.0);
                }
                Some(ControlState::Partial) => {
                    residual *= clamp_prob(1.5 * profile.bypass_probability + bonus, 0.01, 1.0);
                }
                _ => {}
            }
        }
        residual
    }

    /// Quantitative risk for a goal over its enumerated attack paths,
    /// with the solver witness path as a fallback when enumeration finds
    /// nothing.
    #[must_use]
    pub fn compute_goal_risk(
        &self,
        goal: &GoalPredicate,
        inevitability: &InevitabilityResult,
    ) -> GoalRiskReport {
        self.goal_risk_with(goal, inevitability, &StateOverrides::default())
    }

    pub(super) fn goal_risk_with(
        &self,
        goal: &GoalPredicate,
        inevitability: &InevitabilityResult,
        overrides: &StateOverrides,
    ) -> GoalRiskReport {
        let (mut paths, capped) = self.enumerate_attack_paths(goal);
        if paths.is_empty() {
            match &inevitability.witness_path {
                Some(witness) if !witness.is_empty() => paths.push(witness.clone()),
                _ => return GoalRiskReport::empty(goal, &self.profile().name),
            }
        }

        let mut path_risks: Vec<PathRisk> = paths
            .iter()
            .map(|path| PathRisk {
                risk: self.path_risk_with(path, overrides),
                path_length: path.len(),
                path: path.clone(),
            })
            .collect();

        let mut survival = 1.0;
        for pr in &path_risks {
            survival *= 1.0 - pr.risk;
        }
        let combined = round_to(1.0 - survival, 4);

        path_risks.sort_by(|a, b| b.risk.total_cmp(&a.risk));

        let depth = self.defense_depth(&paths, overrides);

        GoalRiskReport {
            goal_id: goal.id.clone(),
            goal_name: goal.name.clone(),
            probabilistic_score: combined,
            combined_risk: combined,
            adversary_profile: self.profile().name.clone(),
            defense_depth_factor: round_to(depth, 2),
            total_paths_analyzed: paths.len(),
            paths_capped: capped,
            path_risks: {
                path_risks.truncate(5);
                path_risks
            },
        }
    }

    /// Simple paths from every identity to every target asset: BFS with
    /// a depth bound, at most five paths per pair, capped at twenty
    /// total. Returns the paths and whether the cap was hit.
    pub(super) fn enumerate_attack_paths(&self, goal: &GoalPredicate) -> (Vec<Vec<String>>, bool) {
        let identities: Vec<&str> = self
            .scm()
            .graph
            .identities()
            .map(|n| n.id.as_str())
            .collect();

        let mut all_paths: Vec<Vec<String>> = Vec::new();
        for identity in &identities {
            for target in &goal.target_assets {
                self.paths_between(identity, target, &mut all_paths);
            }
        }

        let capped = all_paths.len() > MAX_PATHS;
        all_paths.truncate(MAX_PATHS);
        (all_paths, capped)
    }

    fn paths_between(&self, start: &str, end: &str, out: &mut Vec<Vec<String>>) {
        let mut found = 0usize;
        let mut queue: VecDeque<Vec<String>> = VecDeque::new();
        queue.push_back(vec![start.to_string()]);

        while let Some(path) = queue.pop_front() {
            if found >= MAX_PATHS_PER_PAIR {
                break;
            }
            if path.len() > MAX_DEPTH {
                continue;
            }
            let last = path.last().map(String::as_str).unwrap_or(start);
            if last == end {
                out.push(path);
                found += 1;
                continue;
            }
            for &child in self.index().children(last) {
                if !path.iter().any(|p| p == child) {
                    let mut extended = path.clone();
                    extended.push(child.to_string());
                    queue.push_back(extended);
                }
            }
        }
    }

    /// Mean number of active controls per path hop.
    fn defense_depth(&self, paths: &[Vec<String>], overrides: &StateOverrides) -> f64 {
        let mut controls = 0usize;
        let mut hops = 0usize;
        for path in paths {
            for node_id in path {
                if let Some(eq) = self.scm().equation_for(node_id) {
                    controls += eq
                        .negated_parents
                        .iter()
                        .filter(|id| {
                            self.effective_state(id.as_str(), overrides)
                                == Some(ControlState::Active)
                        })
                        .count();
                }
                hops += 1;
            }
        }
        controls as f64 / hops.max(1) as f64
    }
}
