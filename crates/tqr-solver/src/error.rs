//! Error types for tqr-solver

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SolverError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Malformed or inconsistent tridiagonal / simulation input. Nothing is built.
    #[error("Invalid specification: {0}")]
    InvalidSpec(String),

    #[error("Invalid matrix: {0}")]
    InvalidMatrix(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Only raised when the caller set an iteration cap.
    #[error(
        "Sub-diagonal entry of block {block} did not converge within {iterations} iterations"
    )]
    NonConvergence { block: usize, iterations: usize },

    #[error("Degenerate rotation: alpha = {alpha}, beta = {beta}")]
    DegenerateRotation { alpha: f64, beta: f64 },
}
