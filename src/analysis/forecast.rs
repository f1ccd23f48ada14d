//! Failure forecasting: inevitability drift over time.
//!
//! Projects each goal's score forward under a degradation model where the
//! architecture drifts toward inevitability at a combined monthly rate
//! (`s + (1 − s)·(1 − e^(−r·m))`). The drift rates are modeling
//! constants, not learned parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::GoalPredicate;
use crate::solver::InevitabilityResult;
use crate::utils::round_to;

/// Default monthly drift rates by degradation pattern.
#[must_use]
pub fn default_drift_rates() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("privilege_creep".to_string(), 0.08),
        ("identity_growth".to_string(), 0.05),
        ("patch_decay".to_string(), 0.03),
        ("config_drift".to_string(), 0.04),
        ("control_degradation".to_string(), 0.02),
    ])
}

/// One projected month.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthProjection {
    pub month: u32,
    pub projected_score: f64,
    /// `INEVITABLE`, `AT_RISK` (≥ 0.5), or `DEFENDED`.
    pub status: String,
}

/// Forecast for one goal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalForecast {
    pub goal_id: String,
    pub goal_name: String,
    pub current_score: f64,
    pub threshold: f64,
    pub projections: Vec<MonthProjection>,
    /// First month the projection crosses the threshold, when the goal is
    /// not already inevitable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crossing_month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months_to_inevitable: Option<u32>,
    /// `ACCELERATING`, `DRIFTING`, or `STABLE`.
    pub risk_trajectory: String,
    /// Drift pattern with the highest rate.
    pub primary_driver: String,
}

/// Full forecast report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub forecast_horizon_months: u32,
    pub drift_rates: BTreeMap<String, f64>,
    pub goal_forecasts: Vec<GoalForecast>,
    /// Earliest crossing month over all goals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earliest_inevitable: Option<u32>,
    /// `CRITICAL` (≤ 3 months), `HIGH` (≤ 6), `MODERATE`, or `LOW`.
    pub overall_risk: String,
    pub recommendation: String,
}

/// Projects inevitability drift; pure arithmetic over existing results.
#[derive(Debug, Default)]
pub struct FailureForecaster;

impl FailureForecaster {
    /// Creates the forecaster.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Projects every goal `months_ahead` months forward.
    #[must_use]
    pub fn forecast(
        &self,
        goals: &[GoalPredicate],
        results: &[InevitabilityResult],
        months_ahead: u32,
        drift_rates: Option<BTreeMap<String, f64>>,
    ) -> ForecastReport {
        let rates = drift_rates.unwrap_or_else(default_drift_rates);
        let combined_drift = if rates.is_empty() {
            0.04
        } else {
            rates.values().sum::<f64>() / rates.len() as f64
        };
        let primary_driver = rates
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map_or_else(|| "unknown".to_string(), |(k, _)| k.clone());

        let goal_forecasts: Vec<GoalForecast> = goals
            .iter()
            .zip(results)
            .map(|(goal, result)| {
                let current = result.score;
                let projections: Vec<MonthProjection> = (0..=months_ahead)
                    .map(|month| {
                        let drifted = current
                            + (1.0 - current) * (1.0 - (-combined_drift * f64::from(month)).exp());
                        let projected = drifted.min(1.0);
                        MonthProjection {
                            month,
                            projected_score: round_to(projected, 4),
                            status: if projected >= goal.threshold {
                                "INEVITABLE".to_string()
                            } else if projected >= 0.5 {
                                "AT_RISK".to_string()
                            } else {
                                "DEFENDED".to_string()
                            },
                        }
                    })
                    .collect();

                let crossing_month = if current < goal.threshold {
                    projections
                        .iter()
                        .find(|p| p.projected_score >= goal.threshold)
                        .map(|p| p.month)
                } else {
                    None
                };

                let risk_trajectory = if current > 0.3 {
                    "ACCELERATING"
                } else if current < 0.1 {
                    "STABLE"
                } else {
                    "DRIFTING"
                };

                GoalForecast {
                    goal_id: goal.id.clone(),
                    goal_name: goal.name.clone(),
                    current_score: round_to(current, 4),
                    threshold: goal.threshold,
                    projections,
                    crossing_month,
                    months_to_inevitable: crossing_month,
                    risk_trajectory: risk_trajectory.to_string(),
                    primary_driver: primary_driver.clone(),
                }
            })
            .collect();

        let earliest = goal_forecasts
            .iter()
            .filter_map(|f| f.crossing_month)
            .min();

        let overall_risk = match earliest {
            Some(month) if month <= 3 => "CRITICAL",
            Some(month) if month <= 6 => "HIGH",
            Some(_) => "MODERATE",
            None => "LOW",
        };

        ForecastReport {
            forecast_horizon_months: months_ahead,
            drift_rates: rates,
            goal_forecasts,
            earliest_inevitable: earliest,
            overall_risk: overall_risk.to_string(),
            recommendation: Self::recommendation(earliest),
        }
    }

    fn recommendation(earliest: Option<u32>) -> String {
        match earliest {
            None => "Current posture is stable. Continue monitoring for drift.".to_string(),
            Some(month) if month <= 3 => format!(
                "URGENT: Without intervention, a goal becomes inevitable within {month} months. \
                 Immediate remediation required."
            ),
            Some(month) if month <= 6 => format!(
                "WARNING: Structural degradation will reach inevitability in ~{month} months. \
                 Schedule remediation sprint."
            ),
            Some(month) => format!(
                "Architecture projected to degrade to inevitability in ~{month} months. Plan \
                 proactive review."
            ),
        }
    }
}
