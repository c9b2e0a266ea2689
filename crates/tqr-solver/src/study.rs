//! Shifted versus unshifted convergence study.
//!
//! Solves the second-difference matrix (diagonal 2, off-diagonal −1) for a
//! range of sizes and compares each result with the closed-form eigenpairs
//! from [`second_difference_eigenpairs`].

use log::info;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::eigen::{DEFAULT_EPSILON, SolverConfig, solve_with_config};
use crate::error::{Result, SolverError};
use crate::tridiagonal::{build_tridiagonal, second_difference_eigenpairs};

pub const DEFAULT_SIZES: [usize; 6] = [2, 4, 8, 16, 32, 64];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvergenceStudy {
    pub epsilon: f64,
    pub sizes: Vec<usize>,
}

impl Default for ConvergenceStudy {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            sizes: DEFAULT_SIZES.to_vec(),
        }
    }
}

/// One solve of the study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyRecord {
    pub test_id: usize,
    pub shifted: bool,
    pub dimension: usize,
    pub iterations: usize,
    pub eigenvalue_error: f64,
    pub eigenvector_error: f64,
    /// Computed eigenvalues, ascending
    pub eigenvalues: Vec<f64>,
    /// Closed-form eigenvalues, ascending
    pub analytic_eigenvalues: Vec<f64>,
}

impl StudyRecord {
    /// `(computed, analytic)` eigenvalue pairs in ascending order.
    pub fn eigenvalue_comparison(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.eigenvalues
            .iter()
            .copied()
            .zip(self.analytic_eigenvalues.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyReport {
    pub epsilon: f64,
    pub records: Vec<StudyRecord>,
}

impl StudyReport {
    /// `(n, iterations)` for every run with the given shift setting, in run order.
    pub fn iterations(&self, shifted: bool) -> Vec<(usize, usize)> {
        self.records
            .iter()
            .filter(|r| r.shifted == shifted)
            .map(|r| (r.dimension, r.iterations))
            .collect()
    }

    pub fn record(&self, dimension: usize, shifted: bool) -> Option<&StudyRecord> {
        self.records
            .iter()
            .find(|r| r.dimension == dimension && r.shifted == shifted)
    }
}

impl ConvergenceStudy {
    pub fn new(epsilon: f64, sizes: Vec<usize>) -> Self {
        Self { epsilon, sizes }
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.sizes = sizes;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sizes.is_empty() {
            return Err(SolverError::InvalidConfig(
                "convergence study needs at least one size".to_string(),
            ));
        }
        if self.sizes.contains(&0) {
            return Err(SolverError::InvalidConfig(
                "matrix sizes must be at least 1".to_string(),
            ));
        }
        SolverConfig::new(self.epsilon, true).validate()
    }

    /// Run every size shifted, then every size unshifted.
    pub fn run(&self) -> Result<StudyReport> {
        self.validate()?;

        let mut records = Vec::with_capacity(2 * self.sizes.len());
        for shifted in [true, false] {
            let config = SolverConfig::new(self.epsilon, shifted);
            for &n in &self.sizes {
                let a = build_tridiagonal(2.0, -1.0, Some(n))?;
                let result = solve_with_config(&a, &config)?;
                let pairs = result.sorted_pairs();
                let (analytic_eigenvalues, analytic_vectors) = second_difference_eigenpairs(n);
                let (eigenvalue_error, eigenvector_error) =
                    analytic_deviation(&pairs, &analytic_eigenvalues, &analytic_vectors);

                records.push(StudyRecord {
                    test_id: records.len(),
                    shifted,
                    dimension: n,
                    iterations: result.iterations(),
                    eigenvalue_error,
                    eigenvector_error,
                    eigenvalues: pairs.iter().map(|(value, _)| *value).collect(),
                    analytic_eigenvalues,
                });
            }
        }

        info!(
            "convergence study finished: {} runs, epsilon = {:e}",
            records.len(),
            self.epsilon
        );
        Ok(StudyReport {
            epsilon: self.epsilon,
            records,
        })
    }
}

/// Largest eigenvalue and eigenvector deviation from the analytic pairs.
///
/// Each computed pair is matched with the analytic pair of nearest
/// eigenvalue; eigenvector sign is ignored.
fn analytic_deviation(
    pairs: &[(f64, DVector<f64>)],
    values: &[f64],
    vectors: &DMatrix<f64>,
) -> (f64, f64) {
    let mut value_error: f64 = 0.0;
    let mut vector_error: f64 = 0.0;

    for (value, vector) in pairs {
        let Some(nearest) = (0..values.len()).min_by(|&i, &j| {
            (values[i] - value)
                .abs()
                .total_cmp(&(values[j] - value).abs())
        }) else {
            continue;
        };

        let exact = vectors.column(nearest);
        value_error = value_error.max((values[nearest] - value).abs());
        let same = (vector - exact).amax();
        let flipped = (vector + exact).amax();
        vector_error = vector_error.max(same.min(flipped));
    }
    (value_error, vector_error)
}
