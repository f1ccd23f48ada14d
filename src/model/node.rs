//! Typed infrastructure nodes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{ControlState, Criticality, NodeClass};

/// Per-class payload of an infrastructure node.
///
/// The variant tag is the node's classification; three of the classes carry
/// structured payloads and the rest are plain markers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum NodeKind {
    /// A target: system, data store, or service.
    Asset(AssetProfile),
    /// A principal; identities are the attacker entry points.
    Identity(IdentityProfile),
    /// An acquirable grant or role.
    Privilege,
    /// A defensive mechanism.
    Control(ControlProfile),
    /// A network or communication path.
    Channel,
    /// A boundary between trust domains.
    TrustBoundary,
}

impl NodeKind {
    /// The payload-free classification of this variant.
    #[must_use]
    pub fn class(&self) -> NodeClass {
        match self {
            Self::Asset(_) => NodeClass::Asset,
            Self::Identity(_) => NodeClass::Identity,
            Self::Privilege => NodeClass::Privilege,
            Self::Control(_) => NodeClass::Control,
            Self::Channel => NodeClass::Channel,
            Self::TrustBoundary => NodeClass::TrustBoundary,
        }
    }
}

/// Asset-specific attributes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetProfile {
    /// Business criticality; drives naked-asset detection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criticality: Option<Criticality>,
    /// Free-form data classification tags (e.g. `pii`, `phi`).
    #[serde(default)]
    pub data_classification: Vec<String>,
}

/// Identity-specific attributes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityProfile {
    /// Free-form privilege tier (e.g. `user`, `domain_admin`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privilege_level: Option<String>,
    /// Whether MFA is enforced for this identity, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfa_enabled: Option<bool>,
}

/// Control-specific attributes.
///
/// `effectiveness` and `bypass_probability` are nominally complementary
/// (`effectiveness + bypass_probability ≈ 1`) but are accepted as
/// independent inputs; only `bypass_probability` feeds the probability
/// layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlProfile {
    /// Operational state; only `Active` blocks in the symbolic layer.
    #[serde(default)]
    pub state: ControlState,
    /// Free-form control category tag (e.g. `detection`, `segmentation`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_type: Option<String>,
    /// Annual operating cost in currency units; non-negative.
    #[serde(default)]
    pub annual_cost: f64,
    /// Fraction of attempts the control stops, in `[0, 1]`.
    #[serde(default = "default_half")]
    pub effectiveness: f64,
    /// Fraction of attempts that get through, in `[0, 1]`.
    #[serde(default = "default_half")]
    pub bypass_probability: f64,
}

fn default_half() -> f64 {
    0.5
}

impl Default for ControlProfile {
    fn default() -> Self {
        Self {
            state: ControlState::default(),
            control_type: None,
            annual_cost: 0.0,
            effectiveness: 0.5,
            bypass_probability: 0.5,
        }
    }
}

/// One node of the infrastructure graph.
///
/// The header fields are shared by every class; the [`kind`](Self::kind)
/// variant carries what is specific to assets, identities, and controls.
///
/// # Examples
///
/// ```rust
/// use inevitability::model::InfraNode;
/// use inevitability::types::{ControlState, Criticality, NodeClass};
///
/// let db = InfraNode::asset("db", "Customer Database").with_criticality(Criticality::Critical);
/// assert_eq!(db.class(), NodeClass::Asset);
///
/// let fw = InfraNode::control("fw", "Firewall", ControlState::Active)
///     .with_annual_cost(50_000.0)
///     .with_bypass_probability(0.3);
/// assert!(fw.control_profile().unwrap().state.is_active());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InfraNode {
    /// Stable identifier, referenced by edges and goals.
    pub id: String,
    /// Human-readable name used in reports and narrations.
    pub name: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: String,
    /// Modeling confidence in `[0, 1]`.
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// Per-class payload.
    #[serde(flatten)]
    pub kind: NodeKind,
}

fn default_confidence() -> f64 {
    1.0
}

impl InfraNode {
    fn with_kind(id: impl Into<String>, name: impl Into<String>, kind: NodeKind) -> Self {
        let id = id.into();
        let id = if id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            id
        };
        Self {
            id,
            name: name.into(),
            description: String::new(),
            confidence: 1.0,
            kind,
        }
    }

    /// Creates an asset node with an empty profile.
    pub fn asset(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_kind(id, name, NodeKind::Asset(AssetProfile::default()))
    }

    /// Creates an identity node with an empty profile.
    pub fn identity(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_kind(id, name, NodeKind::Identity(IdentityProfile::default()))
    }

    /// Creates a privilege node.
    pub fn privilege(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_kind(id, name, NodeKind::Privilege)
    }

    /// Creates a control node in the given state.
    pub fn control(id: impl Into<String>, name: impl Into<String>, state: ControlState) -> Self {
        Self::with_kind(
            id,
            name,
            NodeKind::Control(ControlProfile {
                state,
                ..ControlProfile::default()
            }),
        )
    }

    /// Creates a channel node.
    pub fn channel(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_kind(id, name, NodeKind::Channel)
    }

    /// Creates a trust-boundary node.
    pub fn trust_boundary(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_kind(id, name, NodeKind::TrustBoundary)
    }

    /// Sets the free-form description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the asset criticality; ignored for non-asset nodes.
    #[must_use]
    pub fn with_criticality(mut self, criticality: Criticality) -> Self {
        if let NodeKind::Asset(profile) = &mut self.kind {
            profile.criticality = Some(criticality);
        }
        self
    }

    /// Adds a data-classification tag; ignored for non-asset nodes.
    #[must_use]
    pub fn with_data_classification(mut self, tag: impl Into<String>) -> Self {
        if let NodeKind::Asset(profile) = &mut self.kind {
            profile.data_classification.push(tag.into());
        }
        self
    }

    /// Sets the identity privilege level; ignored for non-identity nodes.
    #[must_use]
    pub fn with_privilege_level(mut self, level: impl Into<String>) -> Self {
        if let NodeKind::Identity(profile) = &mut self.kind {
            profile.privilege_level = Some(level.into());
        }
        self
    }

    /// Sets the identity MFA flag; ignored for non-identity nodes.
    #[must_use]
    pub fn with_mfa_enabled(mut self, enabled: bool) -> Self {
        if let NodeKind::Identity(profile) = &mut self.kind {
            profile.mfa_enabled = Some(enabled);
        }
        self
    }

    /// Sets the control category tag; ignored for non-control nodes.
    #[must_use]
    pub fn with_control_type(mut self, control_type: impl Into<String>) -> Self {
        if let NodeKind::Control(profile) = &mut self.kind {
            profile.control_type = Some(control_type.into());
        }
        self
    }

    /// Sets the control annual cost; ignored for non-control nodes.
    #[must_use]
    pub fn with_annual_cost(mut self, cost: f64) -> Self {
        if let NodeKind::Control(profile) = &mut self.kind {
            profile.annual_cost = cost.max(0.0);
        }
        self
    }

    /// Sets the control effectiveness; ignored for non-control nodes.
    #[must_use]
    pub fn with_effectiveness(mut self, effectiveness: f64) -> Self {
        if let NodeKind::Control(profile) = &mut self.kind {
            profile.effectiveness = effectiveness.clamp(0.0, 1.0);
        }
        self
    }

    /// Sets the control bypass probability; ignored for non-control nodes.
    #[must_use]
    pub fn with_bypass_probability(mut self, bypass: f64) -> Self {
        if let NodeKind::Control(profile) = &mut self.kind {
            profile.bypass_probability = bypass.clamp(0.0, 1.0);
        }
        self
    }

    /// The payload-free classification of this node.
    #[must_use]
    pub fn class(&self) -> NodeClass {
        self.kind.class()
    }

    /// Returns `true` for control nodes.
    #[must_use]
    pub fn is_control(&self) -> bool {
        matches!(self.kind, NodeKind::Control(_))
    }

    /// Returns `true` for identity nodes.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        matches!(self.kind, NodeKind::Identity(_))
    }

    /// The control payload, if this is a control node.
    #[must_use]
    pub fn control_profile(&self) -> Option<&ControlProfile> {
        match &self.kind {
            NodeKind::Control(profile) => Some(profile),
            _ => None,
        }
    }

    /// The identity payload, if this is an identity node.
    #[must_use]
    pub fn identity_profile(&self) -> Option<&IdentityProfile> {
        match &self.kind {
            NodeKind::Identity(profile) => Some(profile),
            _ => None,
        }
    }

    /// The asset payload, if this is an asset node.
    #[must_use]
    pub fn asset_profile(&self) -> Option<&AssetProfile> {
        match &self.kind {
            NodeKind::Asset(profile) => Some(profile),
            _ => None,
        }
    }

    /// The control state, if this is a control node.
    #[must_use]
    pub fn control_state(&self) -> Option<ControlState> {
        self.control_profile().map(|profile| profile.state)
    }

    /// The annual cost of a control node; `0.0` otherwise.
    #[must_use]
    pub fn annual_cost(&self) -> f64 {
        self.control_profile().map_or(0.0, |profile| profile.annual_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_only_touch_matching_variants() {
        let asset = InfraNode::asset("a", "A").with_annual_cost(10.0);
        assert_eq!(asset.annual_cost(), 0.0);

        let ctrl = InfraNode::control("c", "C", ControlState::Active).with_criticality(
            crate::types::Criticality::High,
        );
        assert!(ctrl.asset_profile().is_none());
        assert!(ctrl.control_state().unwrap().is_active());
    }

    #[test]
    fn empty_id_is_generated() {
        let node = InfraNode::asset("", "Anonymous");
        assert!(!node.id.is_empty());
    }

    #[test]
    fn probabilities_are_clamped() {
        let ctrl = InfraNode::control("c", "C", ControlState::Partial)
            .with_bypass_probability(1.7)
            .with_effectiveness(-0.5);
        let profile = ctrl.control_profile().unwrap();
        assert_eq!(profile.bypass_probability, 1.0);
        assert_eq!(profile.effectiveness, 0.0);
    }
}
