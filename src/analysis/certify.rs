//! Formal certification reports.
//!
//! Rolls the per-goal inevitability verdicts and the control inventory
//! into an audit-shaped report: a 0–100 posture score, a letter grade,
//! per-goal PASS/FAIL assessments, and severity-tagged findings. Every
//! number is traceable to a solver verdict.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::GoalPredicate;
use crate::solver::InevitabilityResult;
use crate::scm::Scm;
use crate::types::ControlState;
use crate::utils::round_to;

/// Per-goal certification verdict.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalAssessment {
    pub goal_id: String,
    pub goal_name: String,
    pub inevitability_score: f64,
    /// `INEVITABLE` or `DEFENDED`.
    pub status: String,
    /// `PASS` when the goal is defended, `FAIL` otherwise.
    pub verdict: String,
    pub attack_path_length: usize,
}

/// One severity-tagged certification finding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CertFinding {
    pub severity: String,
    pub finding: String,
    pub recommendation: String,
}

/// The certification report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CertificationReport {
    pub certification_id: String,
    pub timestamp: DateTime<Utc>,
    pub organization: String,
    pub engine_version: String,
    /// `100 · (1 − mean inevitability)`, clamped to 0–100.
    pub posture_score: u32,
    /// Letter grade on the 90/75/60/40 scale.
    pub grade: String,
    pub total_controls: usize,
    pub active_controls: usize,
    pub inactive_controls: usize,
    pub partial_controls: usize,
    pub goals_analyzed: usize,
    pub goals_defended: usize,
    pub goals_inevitable: usize,
    pub goal_assessments: Vec<GoalAssessment>,
    pub findings: Vec<CertFinding>,
    /// Number of structural equations in the certified model.
    pub scm_equations: usize,
    pub methodology: String,
    pub formal_guarantee: String,
}

/// Builds certification reports from analysis results.
pub struct CertificationEngine<'s> {
    scm: &'s Scm,
}

impl<'s> CertificationEngine<'s> {
    /// Wraps a built SCM.
    #[must_use]
    pub fn new(scm: &'s Scm) -> Self {
        Self { scm }
    }

    /// Generates a certification report for one analysis run.
    #[must_use]
    pub fn generate(
        &self,
        goals: &[GoalPredicate],
        results: &[InevitabilityResult],
        organization: &str,
    ) -> CertificationReport {
        let now = Utc::now();

        let mut active = 0usize;
        let mut inactive = 0usize;
        let mut partial = 0usize;
        let mut total = 0usize;
        for ctrl in self.scm.graph.controls() {
            total += 1;
            match ctrl.control_state() {
                Some(ControlState::Active) => active += 1,
                Some(ControlState::Inactive) => inactive += 1,
                Some(ControlState::Partial) => partial += 1,
                _ => {}
            }
        }

        let avg_inevitability = if results.is_empty() {
            0.0
        } else {
            results.iter().map(|r| r.score).sum::<f64>() / results.len() as f64
        };
        let posture_score = (((1.0 - avg_inevitability) * 100.0) as i64).clamp(0, 100) as u32;
        let grade = match posture_score {
            90..=100 => "A",
            75..=89 => "B",
            60..=74 => "C",
            40..=59 => "D",
            _ => "F",
        };

        let goal_assessments: Vec<GoalAssessment> = goals
            .iter()
            .zip(results)
            .map(|(goal, result)| GoalAssessment {
                goal_id: goal.id.clone(),
                goal_name: goal.name.clone(),
                inevitability_score: round_to(result.score, 4),
                status: if result.is_inevitable {
                    "INEVITABLE".to_string()
                } else {
                    "DEFENDED".to_string()
                },
                verdict: if result.is_inevitable {
                    "FAIL".to_string()
                } else {
                    "PASS".to_string()
                },
                attack_path_length: result.witness_path.as_ref().map_or(0, Vec::len),
            })
            .collect();

        let failing = goal_assessments.iter().filter(|g| g.verdict == "FAIL").count();

        let mut findings = Vec::new();
        if failing > 0 {
            findings.push(CertFinding {
                severity: "CRITICAL".to_string(),
                finding: format!(
                    "{failing} of {} attack goals are structurally inevitable",
                    goals.len()
                ),
                recommendation: "Address controls identified in MCS analysis immediately"
                    .to_string(),
            });
        }
        if inactive > 0 {
            findings.push(CertFinding {
                severity: "HIGH".to_string(),
                finding: format!("{inactive} security controls are INACTIVE"),
                recommendation: "Enable or properly configure inactive controls".to_string(),
            });
        }
        if partial > 0 {
            findings.push(CertFinding {
                severity: "MEDIUM".to_string(),
                finding: format!("{partial} security controls are only PARTIALLY effective"),
                recommendation: "Review partial controls for configuration gaps".to_string(),
            });
        }
        if failing == 0 {
            findings.push(CertFinding {
                severity: "INFO".to_string(),
                finding: "All analyzed attack goals are structurally defended".to_string(),
                recommendation:
                    "Maintain current control configuration and implement periodic review"
                        .to_string(),
            });
        }

        CertificationReport {
            certification_id: format!("INEV-CERT-{}", now.timestamp()),
            timestamp: now,
            organization: organization.to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            posture_score,
            grade: grade.to_string(),
            total_controls: total,
            active_controls: active,
            inactive_controls: inactive,
            partial_controls: partial,
            goals_analyzed: goals.len(),
            goals_defended: goals.len() - failing,
            goals_inevitable: failing,
            goal_assessments,
            findings,
            scm_equations: self.scm.equations.len(),
            methodology: "Structural Causal Model + Boolean satisfiability search".to_string(),
            formal_guarantee:
                "Results are provably correct under the modeled infrastructure topology"
                    .to_string(),
        }
    }
}
