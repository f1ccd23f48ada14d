//! Directed causal edges.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{ConstraintKind, EdgeKind};

/// Epistemic qualifier of an edge: how the relationship is known to hold
/// and which named assumptions it rests on.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeConstraint {
    /// Deterministic, conditional, or inferred.
    #[serde(default)]
    pub kind: ConstraintKind,
    /// Named assumptions backing the edge; harvested into the SCM's
    /// assumption ledger at build time.
    #[serde(default)]
    pub assumptions: Vec<String>,
}

/// One directed edge of the infrastructure graph.
///
/// An edge from a control node with [`EdgeKind::Control`] blocks its
/// target; every other combination enables it.
///
/// # Examples
///
/// ```rust
/// use inevitability::model::InfraEdge;
/// use inevitability::types::EdgeKind;
///
/// let edge = InfraEdge::new("web", "db", EdgeKind::Lateral)
///     .with_label("Flat network segment")
///     .with_exploit_probability(0.9)
///     .with_assumption("no_egress_filtering");
/// assert_eq!(edge.exploit_probability, 0.9);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InfraEdge {
    /// Stable identifier.
    pub id: String,
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Edge classification.
    pub kind: EdgeKind,
    /// Optional human-readable label used in explanations.
    #[serde(default)]
    pub label: String,
    /// Probability the hop succeeds when attempted, in `[0, 1]`.
    #[serde(default = "default_exploit_probability")]
    pub exploit_probability: f64,
    /// Epistemic qualifier and named assumptions.
    #[serde(default)]
    pub constraint: EdgeConstraint,
}

fn default_exploit_probability() -> f64 {
    0.5
}

impl InfraEdge {
    /// Creates an edge with a generated id and default probability 0.5.
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source: source.into(),
            target: target.into(),
            kind,
            label: String::new(),
            exploit_probability: 0.5,
            constraint: EdgeConstraint::default(),
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the exploit probability, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_exploit_probability(mut self, probability: f64) -> Self {
        self.exploit_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Sets the constraint kind.
    #[must_use]
    pub fn with_constraint_kind(mut self, kind: ConstraintKind) -> Self {
        self.constraint.kind = kind;
        self
    }

    /// Adds one named assumption.
    #[must_use]
    pub fn with_assumption(mut self, assumption: impl Into<String>) -> Self {
        self.constraint.assumptions.push(assumption.into());
        self
    }

    /// Returns `true` if this edge is of the blocking kind.
    #[must_use]
    pub fn is_control_edge(&self) -> bool {
        matches!(self.kind, EdgeKind::Control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exploit_probability_is_clamped() {
        let edge = InfraEdge::new("a", "b", EdgeKind::Access).with_exploit_probability(2.0);
        assert_eq!(edge.exploit_probability, 1.0);
    }

    #[test]
    fn default_probability_is_half() {
        let edge = InfraEdge::new("a", "b", EdgeKind::Trust);
        assert_eq!(edge.exploit_probability, 0.5);
        assert!(edge.constraint.assumptions.is_empty());
    }
}
