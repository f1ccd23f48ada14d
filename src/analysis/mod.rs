//! Analyzers built on the symbolic solver.
//!
//! Every analyzer in this module borrows a [`CausalSolver`](crate::solver::CausalSolver)
//! (and through it the read-only SCM) and emits a typed result. They share
//! one semantics of interventions: a hypothetical is always expressed as a
//! do-operator map handed to the solver, never as a mutation of the model.
//!
//! - [`mcs`] — minimal causal sets (greedy and exact) with proof artifacts
//! - [`theater`] — per-control causal relevance classification
//! - [`counterfactual`] — what-if queries and sensitivity analysis
//! - [`collapse`] — collapse radius, fragility grading, cascade simulation
//! - [`explain`] — deterministic explanation trees
//! - [`economic`] — spend-vs-relevance accounting and ROI projections
//! - [`optimizer`] — multi-goal defense strategy search
//! - [`certify`] — formal posture certification reports
//! - [`forecast`] — inevitability drift projection
//! - [`collision`] — pairwise goal interaction analysis
//! - [`adversarial`] — single-control-failure red teaming

pub mod adversarial;
pub mod certify;
pub mod collapse;
pub mod collision;
pub mod counterfactual;
pub mod economic;
pub mod explain;
pub mod forecast;
pub mod mcs;
pub mod optimizer;
pub mod theater;

pub use adversarial::{AdversarialReport, AdversarialTester, AttackVector, GoalDelta};
pub use certify::{CertFinding, CertificationEngine, CertificationReport, GoalAssessment};
pub use collapse::{
    AntiPattern, CollapseEngine, CollapseFrame, CollapseMetrics, FragilityProfile, GoalState,
    NodeState,
};
pub use collision::{CollisionKind, GoalCollision, GoalCollisionAnalyzer, GoalRef};
pub use counterfactual::{
    CounterfactualEngine, Direction, ImpactBand, SensitivityEntry, WhatIf,
};
pub use economic::{EconomicAnalyzer, EconomicReport, Recommendation, RoiProjection};
pub use explain::{ExplanationStep, ExplanationTree, Explainer};
pub use forecast::{FailureForecaster, ForecastReport, GoalForecast, MonthProjection};
pub use mcs::{
    Feasibility, McsAlgorithm, McsElement, McsExtractor, McsResult, McsSet, ProofArtifact,
};
pub use optimizer::{DefenseStrategy, GoalImpact, MultiGoalOptimizer};
pub use theater::{ControlClassification, TheaterDetector, TheaterReport};
