//! Attacker goal predicates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Criticality, GoalTemplate};

/// One attacker goal: a conjunction of target assets and required
/// conditions, plus the inevitability threshold above which the goal is
/// considered structurally inevitable.
///
/// # Examples
///
/// ```rust
/// use inevitability::model::GoalPredicate;
/// use inevitability::types::GoalTemplate;
///
/// let goal = GoalPredicate::new("exfil", "Customer Data Exfiltration")
///     .with_template(GoalTemplate::DataExfiltration)
///     .with_target("db")
///     .with_condition("s3_creds")
///     .with_threshold(0.8);
/// assert_eq!(goal.target_assets, vec!["db"]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalPredicate {
    /// Stable identifier.
    pub id: String,
    /// Human-readable name used in reports.
    pub name: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: String,
    /// Goal template tag.
    #[serde(default)]
    pub template: GoalTemplate,
    /// Asset node ids that must all be compromised.
    #[serde(default)]
    pub target_assets: Vec<String>,
    /// Additional node ids that must all hold.
    #[serde(default)]
    pub required_conditions: Vec<String>,
    /// Business priority of defending against this goal.
    #[serde(default = "default_priority")]
    pub priority: Criticality,
    /// Inevitability threshold in `[0, 1]`; scores at or above it read as
    /// inevitable.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_priority() -> Criticality {
    Criticality::High
}

fn default_threshold() -> f64 {
    0.7
}

impl GoalPredicate {
    /// Creates a goal with default template, priority, and threshold 0.7.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
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
            template: GoalTemplate::default(),
            target_assets: Vec::new(),
            required_conditions: Vec::new(),
            priority: Criticality::High,
            threshold: 0.7,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the template tag.
    #[must_use]
    pub fn with_template(mut self, template: GoalTemplate) -> Self {
        self.template = template;
        self
    }

    /// Adds one target asset id.
    #[must_use]
    pub fn with_target(mut self, asset_id: impl Into<String>) -> Self {
        self.target_assets.push(asset_id.into());
        self
    }

    /// Adds one required condition id.
    #[must_use]
    pub fn with_condition(mut self, node_id: impl Into<String>) -> Self {
        self.required_conditions.push(node_id.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Criticality) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the inevitability threshold, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }
}
