//! Engine boundary errors.
//!
//! Every failure the engine can surface to a caller is an [`EngineError`].
//! Validation and cycle errors abort an analysis at the boundary; solver
//! timeouts are recoverable and are reported through result statuses rather
//! than through this type (see [`crate::solver`]), so `SolverTimeout` here
//! only appears when a caller explicitly promotes a timeout to a failure.

use miette::Diagnostic;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type EngineResult<T> = Result<T, EngineError>;

/// Failures at the engine boundary.
#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    /// The input graph or goal set failed structural validation.
    #[error("invalid graph: {reason}")]
    #[diagnostic(
        code(inevitability::graph::invalid),
        help("Check that every edge endpoint and goal target references an existing node id.")
    )]
    InvalidGraph { reason: String },

    /// The input graph contains at least one directed cycle.
    ///
    /// Carries up to three cycle witnesses, each as the node-id sequence of
    /// one simple cycle (first id repeated at the end for readability).
    #[error("causal graph contains cycles; an SCM requires a DAG ({} witness{} recorded)",
        cycles.len(), if cycles.len() == 1 { "" } else { "es" })]
    #[diagnostic(
        code(inevitability::graph::cycle_detected),
        help("Break the reported cycles; causal edges must form a directed acyclic graph.")
    )]
    CycleDetected { cycles: Vec<Vec<String>> },

    /// A solver call exceeded its deadline and the caller chose to fail.
    #[error("solver timed out after {elapsed_ms:.0} ms")]
    #[diagnostic(
        code(inevitability::solver::timeout),
        help("Raise the solver timeout or reduce the number of free variables in the model.")
    )]
    SolverTimeout { elapsed_ms: f64 },

    /// A named scenario could not be resolved by an external loader.
    #[error("unknown scenario: {scenario}")]
    #[diagnostic(code(inevitability::scenario::unknown))]
    UnknownScenario { scenario: String },

    /// An internal invariant was violated.
    #[error("internal error: {context}")]
    #[diagnostic(
        code(inevitability::internal),
        help("This is a bug in the engine; the context string identifies the violated invariant.")
    )]
    Internal { context: String },
}

impl EngineError {
    /// Builds an [`InvalidGraph`](Self::InvalidGraph) error.
    pub fn invalid_graph(reason: impl Into<String>) -> Self {
        Self::InvalidGraph {
            reason: reason.into(),
        }
    }

    /// Builds an [`Internal`](Self::Internal) error.
    pub fn internal(context: impl Into<String>) -> Self {
        Self::Internal {
            context: context.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_error_counts_witnesses() {
        let err = EngineError::CycleDetected {
            cycles: vec![vec!["a".into(), "b".into(), "a".into()]],
        };
        assert!(err.to_string().contains("1 witness"));
    }

    #[test]
    fn invalid_graph_formats_reason() {
        let err = EngineError::invalid_graph("empty node list");
        assert_eq!(err.to_string(), "invalid graph: empty node list");
    }
}
