//! Core vocabulary types for the causal analysis engine.
//!
//! This module defines the small closed enums shared across the whole
//! crate: node and edge classifications, control states, solver verdicts,
//! and grading scales. These are the domain concepts every analyzer agrees
//! on; the richer payload-carrying types live in [`crate::model`].
//!
//! All of these serialize with `snake_case` wire names so that results are
//! stable across versions and directly consumable by external tooling.
//!
//! # Examples
//!
//! ```rust
//! use inevitability::types::{ControlState, NodeClass, SolverStatus};
//!
//! let state = ControlState::Partial;
//! assert!(!state.is_active());
//! assert_eq!(state.to_string(), "partial");
//!
//! assert_eq!(NodeClass::TrustBoundary.to_string(), "trust_boundary");
//! assert!(SolverStatus::Sat.is_sat());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of an infrastructure node.
///
/// This is the payload-free discriminant of [`crate::model::NodeKind`];
/// it is what the SCM builder and the exogenous-constraint table record
/// when the per-variant payload is irrelevant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeClass {
    /// A system, data store, or service an attacker may target.
    Asset,
    /// A human or machine principal; the attacker entry points.
    Identity,
    /// A grant or role that can be acquired.
    Privilege,
    /// A defensive mechanism that can block causal edges.
    Control,
    /// A network or communication path.
    Channel,
    /// A boundary between trust domains.
    TrustBoundary,
}

impl fmt::Display for NodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asset => write!(f, "asset"),
            Self::Identity => write!(f, "identity"),
            Self::Privilege => write!(f, "privilege"),
            Self::Control => write!(f, "control"),
            Self::Channel => write!(f, "channel"),
            Self::TrustBoundary => write!(f, "trust_boundary"),
        }
    }
}

/// Classification of a directed causal edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Source can reach or authenticate to target.
    Access,
    /// Source grants a privilege held at target.
    Privilege,
    /// Source allows escalating to target.
    Escalation,
    /// Lateral movement between peers.
    Lateral,
    /// Source is a control protecting target; the only blocking kind.
    Control,
    /// Target trusts source.
    Trust,
    /// Target depends on source.
    Dependency,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Privilege => write!(f, "privilege"),
            Self::Escalation => write!(f, "escalation"),
            Self::Lateral => write!(f, "lateral"),
            Self::Control => write!(f, "control"),
            Self::Trust => write!(f, "trust"),
            Self::Dependency => write!(f, "dependency"),
        }
    }
}

/// How confident the modeler is in an edge's existence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// The relationship always holds.
    #[default]
    Deterministic,
    /// The relationship holds under named assumptions.
    Conditional,
    /// The relationship was inferred rather than observed.
    Inferred,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deterministic => write!(f, "deterministic"),
            Self::Conditional => write!(f, "conditional"),
            Self::Inferred => write!(f, "inferred"),
        }
    }
}

/// Operational state of a security control.
///
/// Only [`Active`](Self::Active) controls block in the symbolic layer; the
/// probability layer additionally lets [`Partial`](Self::Partial) controls
/// resist with a weakened bypass factor.
///
/// # Examples
///
/// ```rust
/// use inevitability::types::ControlState;
///
/// assert!(ControlState::Active.is_active());
/// assert!(!ControlState::Unknown.is_active());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlState {
    /// Deployed and enforced.
    Active,
    /// Deployed but not enforced, or absent.
    Inactive,
    /// Enforced with known gaps.
    Partial,
    /// State could not be determined; treated as not blocking.
    #[default]
    Unknown,
}

impl ControlState {
    /// Returns `true` only for [`Active`](Self::Active).
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
            Self::Partial => write!(f, "partial"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Business criticality of an asset (or priority of a goal).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criticality {
    Critical,
    High,
    Medium,
    Low,
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Well-known attacker goal templates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalTemplate {
    DataExfiltration,
    DomainAdmin,
    Ransomware,
    SupplyChain,
    PersistentBackdoor,
    #[default]
    Custom,
}

impl fmt::Display for GoalTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataExfiltration => write!(f, "data_exfiltration"),
            Self::DomainAdmin => write!(f, "domain_admin"),
            Self::Ransomware => write!(f, "ransomware"),
            Self::SupplyChain => write!(f, "supply_chain"),
            Self::PersistentBackdoor => write!(f, "persistent_backdoor"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Verdict of one satisfiability check.
///
/// `Sat` means the attacker goal CAN be realized under the encoded model
/// (the attacker wins); `Unsat` means it cannot (the defender wins).
/// `Timeout` is recoverable and is scored conservatively by callers so a
/// timed-out check never reads as "safe".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStatus {
    Sat,
    Unsat,
    Timeout,
    Unknown,
}

impl SolverStatus {
    /// Returns `true` if the goal was shown reachable.
    #[must_use]
    pub fn is_sat(self) -> bool {
        matches!(self, Self::Sat)
    }

    /// Returns `true` if the goal was shown unreachable.
    #[must_use]
    pub fn is_unsat(self) -> bool {
        matches!(self, Self::Unsat)
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sat => write!(f, "sat"),
            Self::Unsat => write!(f, "unsat"),
            Self::Timeout => write!(f, "timeout"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Causal relevance class assigned to a control for one goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseClass {
    /// Member of a Minimal Causal Set; disabling it alone matters.
    Critical,
    /// Large causal contribution outside any MCS.
    Necessary,
    /// Minor but measurable causal contribution.
    Partial,
    /// No measurable causal effect; security theater.
    Irrelevant,
}

impl fmt::Display for DefenseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::Necessary => write!(f, "necessary"),
            Self::Partial => write!(f, "partial"),
            Self::Irrelevant => write!(f, "irrelevant"),
        }
    }
}

/// Letter grade for the Architectural Fragility Index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FragilityGrade {
    A,
    B,
    #[default]
    C,
    D,
    F,
}

impl FragilityGrade {
    /// Grades an AFI value on the fixed A–F scale.
    #[must_use]
    pub fn from_afi(afi: f64) -> Self {
        if afi <= 0.10 {
            Self::A
        } else if afi <= 0.25 {
            Self::B
        } else if afi <= 0.45 {
            Self::C
        } else if afi <= 0.70 {
            Self::D
        } else {
            Self::F
        }
    }
}

impl fmt::Display for FragilityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
            Self::C => write!(f, "C"),
            Self::D => write!(f, "D"),
            Self::F => write!(f, "F"),
        }
    }
}

/// Defense posture of a goal relative to its inevitability threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    /// Score at or above the goal threshold.
    Inevitable,
    /// Score within 60% of the threshold.
    AtRisk,
    /// Score comfortably below the threshold.
    Defended,
}

impl GoalStatus {
    /// Buckets a score against a goal threshold.
    ///
    /// `at_risk` starts at 60% of the threshold, so a goal with threshold
    /// 0.7 reads `defended` below 0.42.
    #[must_use]
    pub fn classify(score: f64, threshold: f64) -> Self {
        if score >= threshold {
            Self::Inevitable
        } else if score >= threshold * 0.6 {
            Self::AtRisk
        } else {
            Self::Defended
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inevitable => write!(f, "inevitable"),
            Self::AtRisk => write!(f, "at_risk"),
            Self::Defended => write!(f, "defended"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_state_activity() {
        assert!(ControlState::Active.is_active());
        for s in [
            ControlState::Inactive,
            ControlState::Partial,
            ControlState::Unknown,
        ] {
            assert!(!s.is_active());
        }
    }

    #[test]
    fn fragility_grade_boundaries() {
        assert_eq!(FragilityGrade::from_afi(0.0), FragilityGrade::A);
        assert_eq!(FragilityGrade::from_afi(0.10), FragilityGrade::A);
        assert_eq!(FragilityGrade::from_afi(0.25), FragilityGrade::B);
        assert_eq!(FragilityGrade::from_afi(0.45), FragilityGrade::C);
        assert_eq!(FragilityGrade::from_afi(0.70), FragilityGrade::D);
        assert_eq!(FragilityGrade::from_afi(0.71), FragilityGrade::F);
    }

    #[test]
    fn goal_status_buckets() {
        assert_eq!(GoalStatus::classify(0.7, 0.7), GoalStatus::Inevitable);
        assert_eq!(GoalStatus::classify(0.5, 0.7), GoalStatus::AtRisk);
        assert_eq!(GoalStatus::classify(0.41, 0.7), GoalStatus::Defended);
    }

    #[test]
    fn wire_names_are_snake_case() {
        let v = serde_json::to_value(NodeClass::TrustBoundary).unwrap();
        assert_eq!(v, serde_json::json!("trust_boundary"));
        let v = serde_json::to_value(SolverStatus::Unsat).unwrap();
        assert_eq!(v, serde_json::json!("unsat"));
    }
}
