//! Economic impact of security spend versus causal relevance.
//!
//! Folds per-goal theater reports into an organization-wide accounting:
//! what is spent, what is provably wasted, and which remediation
//! strategies return the most per currency unit.

use serde::{Deserialize, Serialize};

use crate::types::DefenseClass;
use crate::utils::round_to;

use super::theater::{ControlClassification, TheaterReport};

/// One modeled remediation strategy with its projected return.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoiProjection {
    pub strategy: String,
    pub description: String,
    pub annual_savings: f64,
    /// Narrative risk consequence of the strategy.
    pub risk_note: String,
    pub roi_percentage: f64,
    /// Rollout horizon, e.g. `immediate` or `90 days`.
    pub implementation: String,
    pub recommendation: String,
}

/// One prioritized remediation recommendation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: u32,
    pub action: String,
    pub detail: String,
    pub savings: f64,
    pub risk: String,
}

/// Organization-wide economic report.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EconomicReport {
    pub total_security_spend: f64,
    /// Spend on controls with demonstrated causal value.
    pub effective_spend: f64,
    /// Spend on causally irrelevant controls.
    pub wasted_spend: f64,
    /// Half-weighted spend on partially relevant controls.
    pub partial_waste: f64,
    pub waste_ratio: f64,
    pub efficiency_ratio: f64,
    /// Most expensive irrelevant controls, top five.
    pub top_waste_controls: Vec<ControlClassification>,
    pub remediation_recommendations: Vec<Recommendation>,
    pub roi_projections: Vec<RoiProjection>,
}

/// Folds theater reports into an [`EconomicReport`].
#[derive(Debug, Default)]
pub struct EconomicAnalyzer;

impl EconomicAnalyzer {
    /// Creates the analyzer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Computes the economic impact from per-goal theater classifications.
    ///
    /// Controls appearing under several goals are counted once, keeping
    /// the classification from the first report that names them.
    #[must_use]
    pub fn analyze(&self, reports: &[TheaterReport]) -> EconomicReport {
        let mut seen = rustc_hash::FxHashSet::default();
        let mut all: Vec<&ControlClassification> = Vec::new();
        for report in reports {
            for classification in &report.classifications {
                if seen.insert(classification.control_id.as_str()) {
                    all.push(classification);
                }
            }
        }

        let total_spend: f64 = all.iter().map(|c| c.annual_cost).sum();
        let wasted: f64 = all
            .iter()
            .filter(|c| c.classification == DefenseClass::Irrelevant)
            .map(|c| c.annual_cost)
            .sum();
        let partial_waste: f64 = all
            .iter()
            .filter(|c| c.classification == DefenseClass::Partial)
            .map(|c| c.annual_cost * 0.5)
            .sum();
        let effective = total_spend - wasted - partial_waste;

        let mut waste_controls: Vec<&ControlClassification> = all
            .iter()
            .copied()
            .filter(|c| c.classification == DefenseClass::Irrelevant)
            .collect();
        waste_controls.sort_by(|a, b| b.annual_cost.total_cmp(&a.annual_cost));

        EconomicReport {
            total_security_spend: total_spend,
            effective_spend: round_to(effective, 2),
            wasted_spend: round_to(wasted, 2),
            partial_waste: round_to(partial_waste, 2),
            waste_ratio: if total_spend > 0.0 {
                round_to(wasted / total_spend, 3)
            } else {
                0.0
            },
            efficiency_ratio: if total_spend > 0.0 {
                round_to(effective / total_spend, 3)
            } else {
                0.0
            },
            top_waste_controls: waste_controls.into_iter().take(5).cloned().collect(),
            remediation_recommendations: Self::recommendations(&all, wasted),
            roi_projections: Self::roi_projections(&all, total_spend),
        }
    }

    fn roi_projections(all: &[&ControlClassification], total_spend: f64) -> Vec<RoiProjection> {
        let mut projections = Vec::new();

        let theater_savings: f64 = all
            .iter()
            .filter(|c| c.classification == DefenseClass::Irrelevant)
            .map(|c| c.annual_cost)
            .sum();
        if theater_savings > 0.0 {
            projections.push(RoiProjection {
                strategy: "Eliminate Security Theater".to_string(),
                description: "Remove all causally irrelevant controls".to_string(),
                annual_savings: theater_savings,
                risk_note: "none".to_string(),
                roi_percentage: if total_spend > 0.0 {
                    round_to(theater_savings / total_spend * 100.0, 1)
                } else {
                    0.0
                },
                implementation: "immediate".to_string(),
                recommendation: "No risk increase — these controls have zero causal effect"
                    .to_string(),
            });
        }

        let critical_budget: f64 = all
            .iter()
            .filter(|c| c.classification == DefenseClass::Critical)
            .map(|c| c.annual_cost)
            .sum();
        if theater_savings > 0.0 && critical_budget > 0.0 {
            let uplift = round_to(theater_savings / critical_budget * 100.0, 1);
            projections.push(RoiProjection {
                strategy: "Reallocate Theater Budget to Critical Controls".to_string(),
                description: format!(
                    "Redirect ${theater_savings:.0} theater spend to strengthen MCS controls"
                ),
                annual_savings: 0.0,
                risk_note: "significant reduction".to_string(),
                roi_percentage: uplift,
                implementation: "30 days".to_string(),
                recommendation: format!("Would increase critical control budget by {uplift}%"),
            });
        }

        let mcs_cost: f64 = all
            .iter()
            .filter(|c| {
                matches!(
                    c.classification,
                    DefenseClass::Critical | DefenseClass::Necessary
                )
            })
            .map(|c| c.annual_cost)
            .sum();
        if mcs_cost < total_spend {
            projections.push(RoiProjection {
                strategy: "MCS-Only Defense Posture".to_string(),
                description: "Fund only controls that appear in at least one Minimal Causal Set"
                    .to_string(),
                annual_savings: total_spend - mcs_cost,
                risk_note: "none".to_string(),
                roi_percentage: if total_spend > 0.0 {
                    round_to((total_spend - mcs_cost) / total_spend * 100.0, 1)
                } else {
                    0.0
                },
                implementation: "90 days".to_string(),
                recommendation: "Mathematically proven: same defense, lower cost".to_string(),
            });
        }

        projections
    }

    fn recommendations(all: &[&ControlClassification], wasted: f64) -> Vec<Recommendation> {
        let mut recs = Vec::new();

        if wasted > 0.0 {
            recs.push(Recommendation {
                priority: 1,
                action: "Eliminate Security Theater".to_string(),
                detail: format!(
                    "${wasted:.0}/year is spent on controls with ZERO causal effect on any \
                     defense goal"
                ),
                savings: wasted,
                risk: "none".to_string(),
            });
        }

        let critical_unfunded = all
            .iter()
            .filter(|c| c.classification == DefenseClass::Critical && c.annual_cost == 0.0)
            .count();
        if critical_unfunded > 0 {
            recs.push(Recommendation {
                priority: 2,
                action: "Fund Critical Controls".to_string(),
                detail: format!(
                    "{critical_unfunded} MCS controls have $0 budget — these are configuration \
                     changes"
                ),
                savings: 0.0,
                risk: "high reduction".to_string(),
            });
        }

        recs
    }
}
