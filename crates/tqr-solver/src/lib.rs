//! Shifted QR eigen-solver for real symmetric tridiagonal matrices.
//!
//! This crate provides:
//! - **Givens rotations** with a stable cosine/sine computation and in-place
//!   two-row updates
//! - **One-sweep QR factorization** of a tridiagonal matrix
//! - **Wilkinson shifts** and a **deflating QR iteration** that returns the
//!   full eigen-decomposition `(V, Λ, k)`
//! - **Tridiagonal builders** (scalar or explicit bands) and validators
//! - **Modal simulation** of fixed-fixed spring-mass chains
//! - A **convergence study** of shifted versus unshifted iteration against the
//!   analytic second-difference spectrum
//!
//! # Example
//! ```
//! use tqr_solver::{build_tridiagonal, solve};
//!
//! let a = build_tridiagonal(2.0, -1.0, Some(5)).unwrap();
//! let result = solve(&a, 1e-6, true).unwrap();
//! assert!(result.orthogonality_error() < 1e-10);
//! ```

pub mod eigen;
pub mod error;
pub mod givens;
pub mod modal;
pub mod qr_step;
pub mod report;
pub mod shift;
pub mod study;
pub mod tridiagonal;

pub use eigen::{
    DEFAULT_EPSILON, EigenDecomposition, QrIteration, SolverConfig, Sweep, solve,
    solve_with_config,
};
pub use error::{Result, SolverError};
pub use givens::{GivensRotation, cosine_sine, rotation_operator};
pub use modal::{
    DEFAULT_MASS, InitialCondition, MAX_TIME_SAMPLES, ModalResults, ModalSimulator,
    RULE_A_DISPLACEMENTS, RULE_B_DISPLACEMENTS, SimulationConfig, StiffnessRule, TimeGrid, clamp_epsilon, simulate,
    stiffness_matrix,
};
pub use qr_step::{QrFactors, qr_step};
pub use shift::{ShiftStrategy, sign, wilkinson_shift};
pub use study::{ConvergenceStudy, DEFAULT_SIZES, StudyRecord, StudyReport};
pub use tridiagonal::{
    Entries, STRUCTURE_TOLERANCE, TridiagonalSpec, build_tridiagonal,
    check_symmetric_tridiagonal, is_symmetric_tridiagonal, second_difference_eigenpairs,
};
