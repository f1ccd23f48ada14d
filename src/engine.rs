//! Analysis orchestration and the engine's external entry points.
//!
//! [`run_analysis`] is the one-shot batch entry: it validates the input,
//! builds the SCM, and runs every analyzer in a fixed order —
//! inevitability → MCS → theater → explanation → economic → fragility →
//! collapse simulation → collapse ranking → optimizer → certifier →
//! forecaster → collision → adversarial → probability — so later stages
//! can rely on earlier results. [`counterfactual`] and
//! [`toggle_assumption`] serve follow-up queries against a session's
//! retained solver; the session cache itself lives outside the engine.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::{
    AdversarialReport, AdversarialTester, CertificationEngine, CertificationReport,
    CollapseEngine, CollapseFrame, CollapseMetrics, CounterfactualEngine, DefenseStrategy,
    EconomicAnalyzer, EconomicReport, ExplanationTree, Explainer, FailureForecaster,
    ForecastReport, FragilityProfile, GoalCollision, GoalCollisionAnalyzer, McsAlgorithm,
    McsExtractor, McsResult, MultiGoalOptimizer, ProofArtifact, TheaterDetector, TheaterReport,
    WhatIf,
};
use crate::error::{EngineError, EngineResult};
use crate::model::{CausalGraph, GoalPredicate};
use crate::probability::{AdversaryProfile, ProbabilityEngine, ProbabilityReport};
use crate::scm::ScmBuilder;
use crate::solver::{CausalSolver, DEFAULT_TIMEOUT, InevitabilityResult, Interventions};

/// Forecast horizon used by the orchestrator.
const FORECAST_MONTHS: u32 = 12;
/// Strategy count kept by the optimizer stage.
const MAX_STRATEGIES: usize = 5;

/// Tuning knobs for one analysis run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// MCS search strategy.
    pub algorithm: McsAlgorithm,
    /// MCS size bound.
    pub max_mcs_cardinality: usize,
    /// Organization tag stamped into the certification report.
    pub organization: String,
    /// Adversary profile key for the probability layer (`apt`,
    /// `organized_crime`, `script_kiddie`).
    pub adversary_profile: String,
    /// Whether to run the Monte Carlo stage.
    pub run_monte_carlo: bool,
    /// Monte Carlo trial count.
    pub monte_carlo_trials: usize,
    /// Explicit Monte Carlo seed; derived from the inputs when absent.
    pub monte_carlo_seed: Option<u64>,
    /// Per-call solver deadline.
    #[serde(skip, default = "default_solver_timeout")]
    pub solver_timeout: Duration,
}

fn default_solver_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            algorithm: McsAlgorithm::Greedy,
            max_mcs_cardinality: 5,
            organization: "Unknown".to_string(),
            adversary_profile: "apt".to_string(),
            run_monte_carlo: true,
            monte_carlo_trials: 10_000,
            monte_carlo_seed: None,
            solver_timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Everything one analysis run produces.
#[derive(Clone, Debug, Serialize)]
pub struct AnalysisResult {
    /// Generated identifier for session caching.
    pub analysis_id: String,
    /// Scenario name, taken from graph metadata when present.
    pub scenario_name: String,
    pub inevitability_results: Vec<InevitabilityResult>,
    pub mcs_results: Vec<McsResult>,
    pub theater_reports: Vec<TheaterReport>,
    pub explanations: Vec<ExplanationTree>,
    pub proof_artifacts: Vec<ProofArtifact>,
    pub economic_report: EconomicReport,
    pub fragility_profile: FragilityProfile,
    pub collapse_frames: Vec<CollapseFrame>,
    pub collapse_ranking: Vec<CollapseMetrics>,
    pub optimization_strategies: Vec<DefenseStrategy>,
    pub certification: CertificationReport,
    pub forecast: ForecastReport,
    pub goal_collisions: Vec<GoalCollision>,
    pub adversarial_report: AdversarialReport,
    pub probability: ProbabilityReport,
    pub computation_time_ms: f64,
}

/// Validates input and runs the full analysis pipeline.
///
/// # Errors
///
/// [`EngineError::InvalidGraph`] when the node list or goal list is empty
/// or an edge endpoint / goal target does not resolve;
/// [`EngineError::CycleDetected`] when the graph is not a DAG. Per-goal
/// solver timeouts do not fail the run — they surface as conservative
/// scores in the per-goal results.
pub fn run_analysis(
    graph: CausalGraph,
    goals: Vec<GoalPredicate>,
    options: AnalysisOptions,
) -> EngineResult<AnalysisResult> {
    let started = Instant::now();
    validate_input(&graph, &goals)?;

    let scenario_name = graph
        .metadata
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let scm = ScmBuilder::new(graph).build()?;
    let solver = CausalSolver::with_timeout(&scm, options.solver_timeout);

    let mcs_extractor = McsExtractor::new(&solver);
    let theater = TheaterDetector::new(&solver);
    let explainer = Explainer::new(&scm);
    let collapse = CollapseEngine::new(&solver);

    let mut inevitability_results = Vec::new();
    let mut mcs_results = Vec::new();
    let mut theater_reports = Vec::new();
    let mut explanations = Vec::new();
    let mut proof_artifacts = Vec::new();

    for goal in &goals {
        let inevitability = solver.compute_inevitability(goal, None);

        let mcs = mcs_extractor.extract(goal, options.max_mcs_cardinality, options.algorithm);

        let mcs_ids: FxHashSet<String> = mcs
            .mcs_sets
            .iter()
            .flat_map(|set| set.elements.iter().map(|e| e.control_id.clone()))
            .collect();
        let theater_report = theater.classify_controls(goal, &mcs_ids);

        explanations.push(explainer.generate(
            goal,
            &inevitability,
            Some(&mcs),
            Some(&theater_report),
        ));
        for set in &mcs.mcs_sets {
            proof_artifacts.push(mcs_extractor.generate_proof(goal, set));
        }

        inevitability_results.push(inevitability);
        theater_reports.push(theater_report);
        mcs_results.push(mcs);
    }

    let economic_report = EconomicAnalyzer::new().analyze(&theater_reports);

    let mut fragility_profile = collapse.compute_fragility(&goals);
    fragility_profile.mean_mcs_cardinality = mean_mcs_cardinality(&mcs_results);

    let collapse_frames = collapse.simulate_collapse(&goals);
    let collapse_ranking = collapse.compute_all_collapse_metrics(&goals);

    let optimization_strategies = MultiGoalOptimizer::new(&solver).compute_optimal_strategies(
        &goals,
        f64::INFINITY,
        MAX_STRATEGIES,
    );
    let certification = CertificationEngine::new(&scm).generate(
        &goals,
        &inevitability_results,
        &options.organization,
    );
    let forecast =
        FailureForecaster::new().forecast(&goals, &inevitability_results, FORECAST_MONTHS, None);
    let goal_collisions = GoalCollisionAnalyzer::new(&solver).analyze_collisions(&goals);
    let adversarial_report = AdversarialTester::new(&solver).run(&goals);

    let probability = ProbabilityEngine::new(
        &scm,
        AdversaryProfile::by_key(&options.adversary_profile),
    )
    .run_full_analysis(
        &goals,
        &mut inevitability_results,
        options.run_monte_carlo,
        options.monte_carlo_trials,
        options.monte_carlo_seed,
    );

    let computation_time_ms = started.elapsed().as_secs_f64() * 1000.0;
    info!(
        goals = goals.len(),
        elapsed_ms = computation_time_ms,
        "analysis finished"
    );

    Ok(AnalysisResult {
        analysis_id: Uuid::new_v4().to_string(),
        scenario_name,
        inevitability_results,
        mcs_results,
        theater_reports,
        explanations,
        proof_artifacts,
        economic_report,
        fragility_profile,
        collapse_frames,
        collapse_ranking,
        optimization_strategies,
        certification,
        forecast,
        goal_collisions,
        adversarial_report,
        probability,
        computation_time_ms,
    })
}

/// Follow-up what-if over a retained solver: one [`WhatIf`] per goal,
/// keyed by goal id, optionally narrowed to a single goal.
#[must_use]
pub fn counterfactual(
    solver: &CausalSolver<'_>,
    goals: &[GoalPredicate],
    interventions: &Interventions,
    goal_id: Option<&str>,
) -> BTreeMap<String, WhatIf> {
    let engine = CounterfactualEngine::new(solver);
    goals
        .iter()
        .filter(|goal| goal_id.is_none_or(|id| goal.id == id))
        .map(|goal| {
            (
                goal.id.clone(),
                engine.what_if(goal, interventions, None),
            )
        })
        .collect()
}

/// Follow-up assumption toggle: equivalent to [`counterfactual`] with a
/// single-entry map, resolving assumption ids through their builder-time
/// bindings.
#[must_use]
pub fn toggle_assumption(
    solver: &CausalSolver<'_>,
    goals: &[GoalPredicate],
    control_id: &str,
    new_value: bool,
    goal_id: Option<&str>,
) -> BTreeMap<String, WhatIf> {
    let engine = CounterfactualEngine::new(solver);
    goals
        .iter()
        .filter(|goal| goal_id.is_none_or(|id| goal.id == id))
        .map(|goal| {
            (
                goal.id.clone(),
                engine.toggle_assumption(goal, control_id, new_value, None),
            )
        })
        .collect()
}

/// Mean cardinality of each goal's primary MCS, over the goals that have
/// one.
fn mean_mcs_cardinality(results: &[McsResult]) -> f64 {
    let cardinalities: Vec<usize> = results
        .iter()
        .filter_map(|r| r.mcs_sets.first().map(|set| set.cardinality))
        .collect();
    if cardinalities.is_empty() {
        0.0
    } else {
        cardinalities.iter().sum::<usize>() as f64 / cardinalities.len() as f64
    }
}

/// Structural validation ahead of SCM construction.
fn validate_input(graph: &CausalGraph, goals: &[GoalPredicate]) -> EngineResult<()> {
    if graph.nodes.is_empty() {
        return Err(EngineError::invalid_graph("empty node list"));
    }
    if goals.is_empty() {
        return Err(EngineError::invalid_graph("empty goal list"));
    }

    for edge in &graph.edges {
        if !graph.contains_node(&edge.source) {
            return Err(EngineError::invalid_graph(format!(
                "edge {} references missing source node '{}'",
                edge.id, edge.source
            )));
        }
        if !graph.contains_node(&edge.target) {
            return Err(EngineError::invalid_graph(format!(
                "edge {} references missing target node '{}'",
                edge.id, edge.target
            )));
        }
    }

    for goal in goals {
        for target in &goal.target_assets {
            if !graph.contains_node(target) {
                return Err(EngineError::invalid_graph(format!(
                    "goal '{}' targets missing node '{target}'",
                    goal.id
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InfraEdge, InfraNode};
    use crate::types::EdgeKind;

    #[test]
    fn empty_inputs_are_rejected() {
        let graph = CausalGraph::new().add_node(InfraNode::asset("a", "A"));
        let err = run_analysis(CausalGraph::new(), vec![], AnalysisOptions::default());
        assert!(matches!(err, Err(EngineError::InvalidGraph { .. })));

        let err = run_analysis(graph, vec![], AnalysisOptions::default());
        assert!(matches!(err, Err(EngineError::InvalidGraph { .. })));
    }

    #[test]
    fn dangling_edge_is_rejected() {
        let graph = CausalGraph::new()
            .add_node(InfraNode::asset("a", "A"))
            .add_edge(InfraEdge::new("a", "ghost", EdgeKind::Access));
        let goal = GoalPredicate::new("g", "G").with_target("a");
        let err = run_analysis(graph, vec![goal], AnalysisOptions::default());
        match err {
            Err(EngineError::InvalidGraph { reason }) => assert!(reason.contains("ghost")),
            other => panic!("expected InvalidGraph, got {other:?}"),
        }
    }

    #[test]
    fn missing_goal_target_is_rejected() {
        let graph = CausalGraph::new().add_node(InfraNode::asset("a", "A"));
        let goal = GoalPredicate::new("g", "G").with_target("missing");
        let err = run_analysis(graph, vec![goal], AnalysisOptions::default());
        assert!(matches!(err, Err(EngineError::InvalidGraph { .. })));
    }
}
