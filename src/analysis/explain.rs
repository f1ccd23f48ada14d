//! Deterministic explanation trees.
//!
//! Every claim in an explanation maps back to graph structure or to a
//! solver witness; there is no generative model anywhere. The causal
//! chain walks the witness backward from the goal targets so each step
//! names the edge that carried the compromise.

use serde::{Deserialize, Serialize};

use crate::model::{GoalPredicate, InfraEdge, InfraNode};
use crate::scm::Scm;
use crate::solver::{InevitabilityResult, Witness};
use crate::topology::GraphIndex;
use crate::types::{DefenseClass, NodeClass};

use super::mcs::McsResult;
use super::theater::TheaterReport;

/// One step of a causal chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExplanationStep {
    pub step_number: usize,
    pub statement: String,
    /// Edge kind or label backing the step.
    #[serde(default)]
    pub evidence_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_node: Option<String>,
}

/// Full explanation for one goal's analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExplanationTree {
    pub goal_name: String,
    /// Headline finding with the score embedded.
    pub finding: String,
    pub inevitability_score: f64,
    pub causal_chain: Vec<ExplanationStep>,
    /// One-line minimum-defense summary; empty when no MCS exists.
    #[serde(default)]
    pub mcs_explanation: String,
    /// One line per irrelevant control.
    #[serde(default)]
    pub theater_summary: Vec<String>,
}

/// Generates explanations from structural analysis results.
pub struct Explainer<'s> {
    scm: &'s Scm,
    index: GraphIndex<'s>,
}

impl<'s> Explainer<'s> {
    /// Wraps a built SCM.
    #[must_use]
    pub fn new(scm: &'s Scm) -> Self {
        Self {
            scm,
            index: scm.index(),
        }
    }

    /// Builds the explanation tree for one goal.
    #[must_use]
    pub fn generate(
        &self,
        goal: &GoalPredicate,
        inevitability: &InevitabilityResult,
        mcs: Option<&McsResult>,
        theater: Option<&TheaterReport>,
    ) -> ExplanationTree {
        let finding = if inevitability.is_inevitable {
            format!("STRUCTURALLY INEVITABLE (score: {:.2})", inevitability.score)
        } else if inevitability.score > 0.4 {
            format!("AT RISK (score: {:.2})", inevitability.score)
        } else {
            format!("DEFENDED (score: {:.2})", inevitability.score)
        };

        let causal_chain = match inevitability
            .solver_result
            .as_ref()
            .and_then(|r| r.witness.as_ref())
        {
            Some(witness) => self.trace_causal_chain(goal, witness),
            None => self.structural_chain(goal),
        };

        let mcs_explanation = mcs
            .and_then(|result| result.mcs_sets.first())
            .map(|best| {
                let controls: Vec<&str> = best
                    .elements
                    .iter()
                    .map(|e| e.control_name.as_str())
                    .collect();
                format!(
                    "MINIMUM DEFENSE (MCS): Implement [{}] (cost: ${:.0}) to block this goal.",
                    controls.join(", "),
                    best.total_cost
                )
            })
            .unwrap_or_default();

        let theater_summary = theater
            .map(|report| {
                report
                    .classifications
                    .iter()
                    .filter(|c| c.classification == DefenseClass::Irrelevant)
                    .map(|c| format!("✗ {} — {}", c.control_name, c.reason))
                    .collect()
            })
            .unwrap_or_default();

        ExplanationTree {
            goal_name: goal.name.clone(),
            finding,
            inevitability_score: inevitability.score,
            causal_chain,
            mcs_explanation,
            theater_summary,
        }
    }

    /// Renders an explanation as a plain-text report.
    #[must_use]
    pub fn format_text_report(explanation: &ExplanationTree) -> String {
        let mut lines = vec![
            format!("INEVITABILITY ANALYSIS: {}", explanation.goal_name),
            String::new(),
            format!("FINDING: {}", explanation.finding),
            String::new(),
            "CAUSAL CHAIN:".to_string(),
        ];

        for step in &explanation.causal_chain {
            lines.push(format!("  {}. {}", step.step_number, step.statement));
        }

        if !explanation.mcs_explanation.is_empty() {
            lines.push(String::new());
            lines.push(explanation.mcs_explanation.clone());
        }

        if !explanation.theater_summary.is_empty() {
            lines.push(String::new());
            lines.push("SECURITY THEATER (controls that DO NOT MATTER for this goal):".to_string());
            for item in &explanation.theater_summary {
                lines.push(format!("  {item}"));
            }
        }

        lines.join("\n")
    }

    /// Walks the witness backward from every goal target, root causes
    /// first, numbering the steps once the full chain is known.
    fn trace_causal_chain(&self, goal: &GoalPredicate, witness: &Witness) -> Vec<ExplanationStep> {
        let mut steps = Vec::new();
        let mut visited = rustc_hash::FxHashSet::default();
        for target in &goal.target_assets {
            self.backward_trace(target, witness, &mut steps, &mut visited);
        }
        for (i, step) in steps.iter_mut().enumerate() {
            step.step_number = i + 1;
        }
        steps
    }

    fn backward_trace<'g>(
        &'g self,
        id: &'g str,
        witness: &Witness,
        steps: &mut Vec<ExplanationStep>,
        visited: &mut rustc_hash::FxHashSet<&'g str>,
    ) {
        if !visited.insert(id) {
            return;
        }
        let Some(node) = self.index.node(id) else {
            return;
        };

        let contributing: Vec<(&InfraNode, &InfraEdge)> = self
            .index
            .edges_to(id)
            .filter_map(|edge| {
                let source = self.index.node(&edge.source)?;
                witness
                    .get(&edge.source)
                    .copied()
                    .unwrap_or(false)
                    .then_some((source, edge))
            })
            .collect();

        for (parent, _edge) in &contributing {
            self.backward_trace(&parent.id, witness, steps, visited);
        }

        if !contributing.is_empty() {
            let evidence = {
                let (_, edge) = contributing[0];
                if edge.label.is_empty() {
                    edge.kind.to_string()
                } else {
                    edge.label.clone()
                }
            };
            steps.push(ExplanationStep {
                step_number: 0,
                statement: Self::format_step(node, &contributing),
                evidence_type: evidence,
                source_node: Some(contributing[0].0.id.clone()),
                target_node: Some(id.to_string()),
            });
        }
    }

    fn format_step(node: &InfraNode, parents: &[(&InfraNode, &InfraEdge)]) -> String {
        match node.class() {
            NodeClass::Asset => {
                let causes: Vec<String> = parents
                    .iter()
                    .map(|(p, e)| {
                        let via = if e.label.is_empty() { "direct" } else { &e.label };
                        format!("'{}' provides {} via '{}'", p.name, e.kind, via)
                    })
                    .collect();
                format!("BECAUSE {}, '{}' is compromised", causes.join(" AND "), node.name)
            }
            NodeClass::Privilege => match parents.first() {
                Some((p, e)) => format!("BECAUSE '{}' has {} to '{}'", p.name, e.kind, node.name),
                None => format!("'{}' privilege is available", node.name),
            },
            NodeClass::Channel => match parents.first() {
                Some((p, _)) => {
                    format!("BECAUSE '{}' enables network path to '{}'", p.name, node.name)
                }
                None => format!("'{}' channel is open", node.name),
            },
            _ => match parents.first() {
                Some((p, e)) => {
                    format!("BECAUSE '{}' enables '{}' via {}", p.name, node.name, e.kind)
                }
                None => format!("'{}' is active", node.name),
            },
        }
    }

    /// Fallback chain from graph structure alone, walking each target
    /// back through its first parent.
    fn structural_chain(&self, goal: &GoalPredicate) -> Vec<ExplanationStep> {
        let mut steps = Vec::new();
        let mut step_number = 1usize;

        for target in &goal.target_assets {
            if self.scm.node(target).is_none() {
                continue;
            }

            let mut chain: Vec<&InfraNode> = Vec::new();
            let mut visited = rustc_hash::FxHashSet::default();
            let mut current = Some(target.as_str());
            while let Some(id) = current {
                if !visited.insert(id) {
                    break;
                }
                if let Some(node) = self.index.node(id) {
                    chain.push(node);
                }
                current = self.index.parents(id).first().copied();
            }
            chain.reverse();

            for (i, node) in chain.iter().enumerate() {
                let statement = if i == 0 {
                    format!("STARTING FROM '{}' ({})", node.name, node.class())
                } else if i == chain.len() - 1 {
                    format!("THEREFORE '{}' is achievable", node.name)
                } else {
                    format!("THROUGH '{}' ({})", node.name, node.class())
                };
                steps.push(ExplanationStep {
                    step_number,
                    statement,
                    evidence_type: String::new(),
                    source_node: (i > 0).then(|| chain[i - 1].id.clone()),
                    target_node: Some(node.id.clone()),
                });
                step_number += 1;
            }
        }

        steps
    }
}
