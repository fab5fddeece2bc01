//! Error types for the dual engine.

use thiserror::Error;

/// Errors that can occur while driving the dual solver.
#[derive(Error, Debug)]
pub enum DualError {
    /// Problem definition is inconsistent with the relaxation
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    /// The mixed-integer subsolver reported an internal failure
    #[error("Subsolver failed: {0}")]
    Subsolver(String),

    /// Infeasibility repair could not restore a solvable relaxation
    #[error("Infeasibility repair failed: {0}")]
    RepairFailed(String),

    /// Internal engine error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for dual-engine operations.
pub type DualResult<T> = Result<T, DualError>;
