//! Construction and validation of symmetric tridiagonal matrices.
//!
//! Two construction modes are supported:
//! - **scalar**: one diagonal value, one off-diagonal value and the dimension `n`
//! - **vector**: an explicit diagonal of length `n` and off-diagonal of length `n - 1`
//!
//! Mixing the two (one scalar, one vector) is rejected with
//! [`SolverError::InvalidSpec`] and no matrix is produced.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// Relative tolerance for the symmetry / band checks on solver input.
pub const STRUCTURE_TOLERANCE: f64 = 1e-12;

/// Diagonal or off-diagonal entries given either as one repeated value or explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entries {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl From<f64> for Entries {
    fn from(value: f64) -> Self {
        Entries::Scalar(value)
    }
}

impl From<Vec<f64>> for Entries {
    fn from(values: Vec<f64>) -> Self {
        Entries::Vector(values)
    }
}

impl From<&[f64]> for Entries {
    fn from(values: &[f64]) -> Self {
        Entries::Vector(values.to_vec())
    }
}

/// Validated description of a symmetric tridiagonal matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TridiagonalSpec {
    Constant {
        diagonal: f64,
        off_diagonal: f64,
        dimension: usize,
    },
    Explicit {
        diagonal: Vec<f64>,
        off_diagonal: Vec<f64>,
    },
}

impl TridiagonalSpec {
    /// Classify and validate a builder request.
    pub fn from_entries(
        diagonal: Entries,
        off_diagonal: Entries,
        dimension: Option<usize>,
    ) -> Result<Self> {
        let spec = match (diagonal, off_diagonal) {
            (Entries::Scalar(diagonal), Entries::Scalar(off_diagonal)) => {
                let dimension = dimension.ok_or_else(|| {
                    SolverError::InvalidSpec(
                        "scalar diagonal and off-diagonal need a dimension".to_string(),
                    )
                })?;
                TridiagonalSpec::Constant {
                    diagonal,
                    off_diagonal,
                    dimension,
                }
            }
            (Entries::Vector(diagonal), Entries::Vector(off_diagonal)) => {
                if let Some(n) = dimension
                    && n != diagonal.len()
                {
                    return Err(SolverError::InvalidSpec(format!(
                        "dimension {} does not match diagonal of length {}",
                        n,
                        diagonal.len()
                    )));
                }
                TridiagonalSpec::Explicit {
                    diagonal,
                    off_diagonal,
                }
            }
            (Entries::Scalar(_), Entries::Vector(_)) => {
                return Err(SolverError::InvalidSpec(
                    "scalar diagonal cannot be combined with a vector off-diagonal".to_string(),
                ));
            }
            (Entries::Vector(_), Entries::Scalar(_)) => {
                return Err(SolverError::InvalidSpec(
                    "vector diagonal cannot be combined with a scalar off-diagonal".to_string(),
                ));
            }
        };

        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            TridiagonalSpec::Constant {
                diagonal,
                off_diagonal,
                dimension,
            } => {
                if *dimension == 0 {
                    return Err(SolverError::InvalidSpec(
                        "dimension must be at least 1".to_string(),
                    ));
                }
                if !diagonal.is_finite() || !off_diagonal.is_finite() {
                    return Err(SolverError::InvalidSpec(
                        "entries must be finite".to_string(),
                    ));
                }
            }
            TridiagonalSpec::Explicit {
                diagonal,
                off_diagonal,
            } => {
                if diagonal.is_empty() {
                    return Err(SolverError::InvalidSpec(
                        "diagonal must not be empty".to_string(),
                    ));
                }
                if off_diagonal.len() + 1 != diagonal.len() {
                    return Err(SolverError::InvalidSpec(format!(
                        "off-diagonal has {} entries, expected {} for a diagonal of length {}",
                        off_diagonal.len(),
                        diagonal.len() - 1,
                        diagonal.len()
                    )));
                }
                if diagonal.iter().chain(off_diagonal).any(|v| !v.is_finite()) {
                    return Err(SolverError::InvalidSpec(
                        "entries must be finite".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn dimension(&self) -> usize {
        match self {
            TridiagonalSpec::Constant { dimension, .. } => *dimension,
            TridiagonalSpec::Explicit { diagonal, .. } => diagonal.len(),
        }
    }

    pub fn build(&self) -> Result<DMatrix<f64>> {
        self.validate()?;
        let matrix = match self {
            TridiagonalSpec::Constant {
                diagonal,
                off_diagonal,
                dimension,
            } => from_bands(&vec![*diagonal; *dimension], &vec![*off_diagonal; dimension - 1]),
            TridiagonalSpec::Explicit {
                diagonal,
                off_diagonal,
            } => from_bands(diagonal, off_diagonal),
        };
        Ok(matrix)
    }
}

/// Build a symmetric tridiagonal matrix in scalar or vector mode.
///
/// # Examples
/// ```
/// use tqr_solver::build_tridiagonal;
///
/// let a = build_tridiagonal(2.0, -1.0, Some(3)).unwrap();
/// assert_eq!(a[(1, 1)], 2.0);
/// assert_eq!(a[(1, 2)], -1.0);
///
/// let b = build_tridiagonal(vec![1.0, 2.0], vec![0.5], None).unwrap();
/// assert_eq!(b[(1, 0)], 0.5);
///
/// assert!(build_tridiagonal(2.0, vec![-1.0], Some(2)).is_err());
/// ```
pub fn build_tridiagonal(
    diagonal: impl Into<Entries>,
    off_diagonal: impl Into<Entries>,
    dimension: Option<usize>,
) -> Result<DMatrix<f64>> {
    TridiagonalSpec::from_entries(diagonal.into(), off_diagonal.into(), dimension)?.build()
}

fn from_bands(diagonal: &[f64], off_diagonal: &[f64]) -> DMatrix<f64> {
    let n = diagonal.len();
    let mut m = DMatrix::zeros(n, n);
    for (i, &d) in diagonal.iter().enumerate() {
        m[(i, i)] = d;
    }
    for (i, &e) in off_diagonal.iter().enumerate() {
        m[(i + 1, i)] = e;
        m[(i, i + 1)] = e;
    }
    m
}

/// Check that `m` is square, non-empty, symmetric and zero outside the three central bands.
///
/// `tolerance` is relative to the largest entry magnitude (floored at 1).
pub fn check_symmetric_tridiagonal(m: &DMatrix<f64>, tolerance: f64) -> Result<()> {
    if m.is_empty() {
        return Err(SolverError::InvalidMatrix("matrix is empty".to_string()));
    }
    if !m.is_square() {
        return Err(SolverError::InvalidMatrix(format!(
            "matrix must be square, got {}×{}",
            m.nrows(),
            m.ncols()
        )));
    }
    if m.iter().any(|v| !v.is_finite()) {
        return Err(SolverError::InvalidMatrix(
            "matrix has non-finite entries".to_string(),
        ));
    }

    let scale = m.amax().max(1.0) * tolerance;
    let n = m.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            if j > i + 1 {
                if m[(i, j)].abs() > scale || m[(j, i)].abs() > scale {
                    return Err(SolverError::InvalidMatrix(format!(
                        "entry ({i}, {j}) lies outside the tridiagonal band"
                    )));
                }
            } else if (m[(i, j)] - m[(j, i)]).abs() > scale {
                return Err(SolverError::InvalidMatrix(format!(
                    "matrix is not symmetric at ({i}, {j}): {} vs {}",
                    m[(i, j)],
                    m[(j, i)]
                )));
            }
        }
    }
    Ok(())
}

pub fn is_symmetric_tridiagonal(m: &DMatrix<f64>, tolerance: f64) -> bool {
    check_symmetric_tridiagonal(m, tolerance).is_ok()
}

/// Analytic eigenpairs of the n×n matrix with diagonal 2 and off-diagonal −1.
///
/// `λ_j = 2(1 − cos(jπ/(n+1)))` and `v_j(i) = sin(ijπ/(n+1))`, normalised,
/// for `j = 1..=n`. Eigenvalues come back in ascending order with the
/// eigenvectors as matching columns.
pub fn second_difference_eigenpairs(n: usize) -> (Vec<f64>, DMatrix<f64>) {
    let h = std::f64::consts::PI / (n as f64 + 1.0);
    let eigenvalues = (1..=n)
        .map(|j| 2.0 * (1.0 - (j as f64 * h).cos()))
        .collect();

    let mut eigenvectors = DMatrix::zeros(n, n);
    for j in 1..=n {
        let column = DVector::from_fn(n, |i, _| ((i + 1) as f64 * j as f64 * h).sin());
        let norm = column.norm();
        eigenvectors.set_column(j - 1, &(column / norm));
    }
    (eigenvalues, eigenvectors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_mode_builds_constant_bands() {
        let m = build_tridiagonal(2.0, -1.0, Some(4)).unwrap();
        assert_eq!(m.nrows(), 4);
        for i in 0..4 {
            assert_eq!(m[(i, i)], 2.0);
        }
        for i in 0..3 {
            assert_eq!(m[(i + 1, i)], -1.0);
            assert_eq!(m[(i, i + 1)], -1.0);
        }
        assert_eq!(m[(0, 2)], 0.0);
        assert_eq!(m[(3, 0)], 0.0);
    }

    #[test]
    fn vector_mode_places_entries() {
        let m = build_tridiagonal(vec![1.0, 2.0, 3.0], vec![-4.0, -5.0], None).unwrap();
        assert_eq!(m[(2, 2)], 3.0);
        assert_eq!(m[(1, 0)], -4.0);
        assert_eq!(m[(1, 2)], -5.0);
        assert!(is_symmetric_tridiagonal(&m, STRUCTURE_TOLERANCE));
    }

    #[test]
    fn single_entry_has_no_off_diagonal() {
        let m = build_tridiagonal(5.0, 1.0, Some(1)).unwrap();
        assert_eq!(m, DMatrix::from_element(1, 1, 5.0));
        let m = build_tridiagonal(vec![5.0], Vec::<f64>::new(), None).unwrap();
        assert_eq!(m, DMatrix::from_element(1, 1, 5.0));
    }

    #[test]
    fn mixed_kinds_are_rejected() {
        let err = build_tridiagonal(2.0, vec![-1.0, -1.0], Some(3)).unwrap_err();
        assert!(matches!(err, SolverError::InvalidSpec(_)));
        let err = build_tridiagonal(vec![2.0, 2.0], -1.0, None).unwrap_err();
        assert!(matches!(err, SolverError::InvalidSpec(_)));
    }

    #[test]
    fn length_invariant_is_enforced() {
        let err = build_tridiagonal(vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0], None).unwrap_err();
        assert!(matches!(err, SolverError::InvalidSpec(_)));
        let err = build_tridiagonal(vec![1.0, 2.0, 3.0], vec![1.0], None).unwrap_err();
        assert!(matches!(err, SolverError::InvalidSpec(_)));
    }

    #[test]
    fn dimension_rules() {
        assert!(build_tridiagonal(2.0, -1.0, None).is_err());
        assert!(build_tridiagonal(2.0, -1.0, Some(0)).is_err());
        assert!(build_tridiagonal(vec![1.0, 2.0], vec![0.5], Some(3)).is_err());
        assert!(build_tridiagonal(vec![1.0, 2.0], vec![0.5], Some(2)).is_ok());
    }

    #[test]
    fn spec_reports_dimension() {
        let spec = TridiagonalSpec::from_entries(Entries::Scalar(1.0), Entries::Scalar(0.0), Some(7))
            .unwrap();
        assert_eq!(spec.dimension(), 7);
    }

    #[test]
    fn structure_check_flags_asymmetry_and_fill() {
        let mut m = build_tridiagonal(2.0, -1.0, Some(4)).unwrap();
        m[(0, 1)] = -0.5;
        assert!(matches!(
            check_symmetric_tridiagonal(&m, STRUCTURE_TOLERANCE),
            Err(SolverError::InvalidMatrix(_))
        ));

        let mut m = build_tridiagonal(2.0, -1.0, Some(4)).unwrap();
        m[(3, 0)] = 1.0;
        assert!(!is_symmetric_tridiagonal(&m, STRUCTURE_TOLERANCE));

        assert!(!is_symmetric_tridiagonal(&DMatrix::zeros(2, 3), STRUCTURE_TOLERANCE));
        assert!(!is_symmetric_tridiagonal(&DMatrix::zeros(0, 0), STRUCTURE_TOLERANCE));
    }

    #[test]
    fn analytic_pairs_satisfy_eigen_equation() {
        let n = 6;
        let a = build_tridiagonal(2.0, -1.0, Some(n)).unwrap();
        let (values, vectors) = second_difference_eigenpairs(n);
        for j in 0..n {
            let v = vectors.column(j);
            let residual = &a * v - v * values[j];
            assert!(residual.norm() < 1e-12);
            assert!((v.norm() - 1.0).abs() < 1e-12);
        }
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }
}
