//! QR eigen-solver with Wilkinson shifts and deflation.
//!
//! The driver works on a private copy `A` of the input and the accumulated
//! eigenvector matrix `V` (initially `I`). For the active block `0..=m`:
//!
//! 1. pick a shift `mu` (zero on the first sweep of each block, or always
//!    when unshifted)
//! 2. factor `A - mu·I = Q·R` with one Givens sweep
//! 3. `A ← R·Q + mu·I`, `V ← V·Q`
//! 4. once `|A[m, m-1]| < ε`, zero the coupling and shrink the block
//!
//! Sweeps only touch the active block: the deflated trailing rows hold
//! converged eigenvalues and a shift taken from the active block would
//! otherwise disturb them. `V` is updated across all rows.
//!
//! ```
//! use tqr_solver::{build_tridiagonal, solve};
//!
//! let a = build_tridiagonal(2.0, -1.0, Some(4)).unwrap();
//! let result = solve(&a, 1e-10, true).unwrap();
//! assert!(result.reconstruction_error(&a) < 1e-8);
//! ```

use log::{debug, info, trace};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};
use crate::qr_step::triangularize;
use crate::shift::ShiftStrategy;
use crate::tridiagonal::{STRUCTURE_TOLERANCE, check_symmetric_tridiagonal};

/// Default convergence threshold on the trailing sub-diagonal entry.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Eigen-solver settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Deflation threshold on `|A[m, m-1]|`
    pub epsilon: f64,
    /// Use the Wilkinson shift
    pub shifted: bool,
    /// Total sweep budget; `None` runs until convergence
    pub max_iterations: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            shifted: true,
            max_iterations: None,
        }
    }
}

impl SolverConfig {
    pub fn new(epsilon: f64, shifted: bool) -> Self {
        Self {
            epsilon,
            shifted,
            max_iterations: None,
        }
    }

    pub fn unshifted() -> Self {
        Self {
            shifted: false,
            ..Self::default()
        }
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn strategy(&self) -> ShiftStrategy {
        ShiftStrategy::from_flag(self.shifted)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(SolverError::InvalidConfig(format!(
                "epsilon must be finite and positive, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Record of one QR sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    /// Total sweeps performed so far, this one included
    pub iteration: usize,
    /// Last row of the active block during the sweep
    pub block: usize,
    pub shift: f64,
    /// `A[block, block-1]` after the sweep, before deflation
    pub subdiagonal: f64,
}

/// Step-by-step QR iteration.
///
/// Each call to [`Iterator::next`] performs one sweep followed by any
/// deflations it enables; iteration ends when every sub-diagonal entry has
/// been deflated. Call [`QrIteration::finish`] to collect the result.
///
/// ```
/// use tqr_solver::{QrIteration, SolverConfig, build_tridiagonal};
///
/// let a = build_tridiagonal(2.0, -1.0, Some(3)).unwrap();
/// let mut iteration = QrIteration::new(&a, &SolverConfig::default()).unwrap();
/// let sweeps = iteration.by_ref().count();
/// assert!(iteration.is_converged());
/// assert_eq!(iteration.finish().iterations(), sweeps);
/// ```
#[derive(Debug, Clone)]
pub struct QrIteration {
    a: DMatrix<f64>,
    v: DMatrix<f64>,
    epsilon: f64,
    strategy: ShiftStrategy,
    /// Last row of the active block
    m: usize,
    iterations: usize,
    block_iterations: usize,
}

impl QrIteration {
    /// Validate `a0` and `config` and start iterating on a copy of `a0`.
    pub fn new(a0: &DMatrix<f64>, config: &SolverConfig) -> Result<Self> {
        config.validate()?;
        check_symmetric_tridiagonal(a0, STRUCTURE_TOLERANCE)?;

        let n = a0.nrows();
        let mut iteration = Self {
            a: a0.clone(),
            v: DMatrix::identity(n, n),
            epsilon: config.epsilon,
            strategy: config.strategy(),
            m: n - 1,
            iterations: 0,
            block_iterations: 0,
        };
        iteration.deflate();
        Ok(iteration)
    }

    pub fn is_converged(&self) -> bool {
        self.m == 0
    }

    /// Current iterate `A`.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.a
    }

    /// Accumulated orthogonal transform `V`.
    pub fn eigenvectors(&self) -> &DMatrix<f64> {
        &self.v
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Last row of the active block (`0` once converged).
    pub fn active_block(&self) -> usize {
        self.m
    }

    /// Perform one sweep on the active block. Returns `None` once converged.
    pub fn sweep(&mut self) -> Option<Sweep> {
        if self.is_converged() {
            return None;
        }

        let m = self.m;
        let mu = self.strategy.shift(&self.a, m, self.block_iterations == 0);

        for i in 0..=m {
            self.a[(i, i)] -= mu;
        }
        let rotations = triangularize(&mut self.a, m + 1);
        for rotation in &rotations {
            rotation.apply_right_transpose_on_rows(&mut self.a, 0, m + 1);
            rotation.apply_right_transpose(&mut self.v);
        }
        for i in 0..=m {
            self.a[(i, i)] += mu;
        }

        self.iterations += 1;
        self.block_iterations += 1;

        let subdiagonal = self.a[(m, m - 1)];
        trace!(
            "sweep {}: block {}, shift {:.6e}, |A[m,m-1]| = {:.3e}",
            self.iterations,
            m,
            mu,
            subdiagonal.abs()
        );

        self.deflate();
        Some(Sweep {
            iteration: self.iterations,
            block: m,
            shift: mu,
            subdiagonal,
        })
    }

    fn deflate(&mut self) {
        while self.m > 0 && self.a[(self.m, self.m - 1)].abs() < self.epsilon {
            let m = self.m;
            self.a[(m, m - 1)] = 0.0;
            self.a[(m - 1, m)] = 0.0;
            debug!(
                "deflated row {} after {} sweeps (eigenvalue {:.10})",
                m, self.block_iterations, self.a[(m, m)]
            );
            self.m -= 1;
            self.block_iterations = 0;
        }
    }

    /// Collect the current state. Off-diagonal entries of blocks that have
    /// not been deflated yet are kept as they are.
    pub fn finish(self) -> EigenDecomposition {
        EigenDecomposition {
            eigenvalues: self.a.diagonal(),
            lambda: self.a,
            eigenvectors: self.v,
            iterations: self.iterations,
        }
    }
}

impl Iterator for QrIteration {
    type Item = Sweep;

    fn next(&mut self) -> Option<Sweep> {
        self.sweep()
    }
}

/// Result `(V, Λ, k)` of a converged QR iteration.
///
/// Eigenvalues stay in deflation order; column `j` of `V` belongs to
/// eigenvalue `j`.
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    eigenvalues: DVector<f64>,
    lambda: DMatrix<f64>,
    eigenvectors: DMatrix<f64>,
    iterations: usize,
}

impl EigenDecomposition {
    pub fn dimension(&self) -> usize {
        self.eigenvalues.len()
    }

    pub fn eigenvalues(&self) -> &DVector<f64> {
        &self.eigenvalues
    }

    /// Orthogonal matrix whose columns are the unit eigenvectors.
    pub fn eigenvectors(&self) -> &DMatrix<f64> {
        &self.eigenvectors
    }

    pub fn eigenvector(&self, j: usize) -> Option<DVector<f64>> {
        if j >= self.dimension() {
            return None;
        }
        Some(self.eigenvectors.column(j).into())
    }

    /// Final iterate `Λ`: the eigenvalues on the diagonal, deflated couplings zeroed.
    pub fn lambda(&self) -> &DMatrix<f64> {
        &self.lambda
    }

    /// Total number of QR sweeps.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Eigenpairs sorted by ascending eigenvalue.
    pub fn sorted_pairs(&self) -> Vec<(f64, DVector<f64>)> {
        let mut pairs: Vec<(f64, DVector<f64>)> = self
            .eigenvalues
            .iter()
            .enumerate()
            .map(|(j, &value)| (value, self.eigenvectors.column(j).into()))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        pairs
    }

    /// `V·Λ·Vᵗ`
    pub fn reconstruct(&self) -> DMatrix<f64> {
        &self.eigenvectors * &self.lambda * self.eigenvectors.transpose()
    }

    /// `‖VᵗV − I‖_F`
    pub fn orthogonality_error(&self) -> f64 {
        let n = self.dimension();
        (self.eigenvectors.transpose() * &self.eigenvectors - DMatrix::<f64>::identity(n, n))
            .norm()
    }

    /// `‖V·Λ·Vᵗ − a0‖_F`
    pub fn reconstruction_error(&self, a0: &DMatrix<f64>) -> f64 {
        (self.reconstruct() - a0).norm()
    }

    /// `(V, Λ, k)`
    pub fn into_parts(self) -> (DMatrix<f64>, DMatrix<f64>, usize) {
        (self.eigenvectors, self.lambda, self.iterations)
    }
}

/// Diagonalize the symmetric tridiagonal `a0` without an iteration cap.
pub fn solve(a0: &DMatrix<f64>, epsilon: f64, shifted: bool) -> Result<EigenDecomposition> {
    solve_with_config(a0, &SolverConfig::new(epsilon, shifted))
}

pub fn solve_with_config(a0: &DMatrix<f64>, config: &SolverConfig) -> Result<EigenDecomposition> {
    let mut iteration = QrIteration::new(a0, config)?;

    while !iteration.is_converged() {
        if let Some(cap) = config.max_iterations
            && iteration.iterations() >= cap
        {
            return Err(SolverError::NonConvergence {
                block: iteration.active_block(),
                iterations: iteration.iterations(),
            });
        }
        iteration.sweep();
    }

    let result = iteration.finish();
    info!(
        "QR iteration converged: n = {}, {} sweeps ({})",
        result.dimension(),
        result.iterations(),
        if config.shifted { "shifted" } else { "unshifted" }
    );
    Ok(result)
}
