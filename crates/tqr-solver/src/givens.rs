//! Givens plane rotations on adjacent rows.
//!
//! A rotation on rows `(i, i+1)` is the identity except for the block
//!
//! ```text
//! | c  -s |
//! | s   c |
//! ```
//!
//! chosen so that applying it to `(alpha, beta)` zeroes `beta`. The QR step
//! applies rotations in place through [`GivensRotation::apply_left`] and
//! [`GivensRotation::apply_right_transpose`], which touch two rows (or two
//! columns) only; [`rotation_operator`] builds the equivalent dense matrix.

use nalgebra::DMatrix;

use crate::error::{Result, SolverError};

/// Cosine and sine of the rotation that maps `(alpha, beta)` to `(r, 0)`.
///
/// The ratio is always taken with the larger magnitude in the denominator so
/// that neither branch overflows. Fails only when both inputs are exactly zero.
pub fn cosine_sine(alpha: f64, beta: f64) -> Result<(f64, f64)> {
    if alpha == 0.0 && beta == 0.0 {
        return Err(SolverError::DegenerateRotation { alpha, beta });
    }

    if alpha.abs() > beta.abs() {
        let tau = -beta / alpha;
        let c = 1.0 / (1.0 + tau * tau).sqrt();
        Ok((c, c * tau))
    } else {
        let tau = -alpha / beta;
        let s = 1.0 / (1.0 + tau * tau).sqrt();
        Ok((s * tau, s))
    }
}

/// Dense n×n rotation acting on rows/columns `i` and `i+1`.
///
/// # Panics
/// Panics if `i + 1 >= n`.
pub fn rotation_operator(n: usize, i: usize, c: f64, s: f64) -> DMatrix<f64> {
    assert!(i + 1 < n, "rotation rows ({i}, {}) out of range for n = {n}", i + 1);

    let mut g = DMatrix::identity(n, n);
    g[(i, i)] = c;
    g[(i + 1, i + 1)] = c;
    g[(i, i + 1)] = -s;
    g[(i + 1, i)] = s;
    g
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GivensRotation {
    /// First of the two rotated rows
    pub row: usize,
    pub cos: f64,
    pub sin: f64,
}

impl GivensRotation {
    pub fn new(row: usize, cos: f64, sin: f64) -> Self {
        Self { row, cos, sin }
    }

    pub fn identity(row: usize) -> Self {
        Self::new(row, 1.0, 0.0)
    }

    /// Rotation on rows `(row, row+1)` that annihilates `beta` below the pivot `alpha`.
    ///
    /// When both values are exactly zero there is nothing to rotate and the
    /// identity rotation is returned.
    pub fn annihilating(row: usize, alpha: f64, beta: f64) -> Self {
        match cosine_sine(alpha, beta) {
            Ok((c, s)) => Self::new(row, c, s),
            Err(_) => Self::identity(row),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.cos == 1.0 && self.sin == 0.0
    }

    pub fn to_operator(&self, n: usize) -> DMatrix<f64> {
        rotation_operator(n, self.row, self.cos, self.sin)
    }

    /// `m ← G·m`, touching rows `row` and `row+1` only.
    pub fn apply_left(&self, m: &mut DMatrix<f64>) {
        self.apply_left_on_columns(m, 0, m.ncols());
    }

    /// `m ← G·m` restricted to columns `start..end`; the remaining columns of
    /// the two rows must already be zero for the result to equal the full product.
    pub(crate) fn apply_left_on_columns(&self, m: &mut DMatrix<f64>, start: usize, end: usize) {
        let (i, j) = (self.row, self.row + 1);
        for col in start..end {
            let a = m[(i, col)];
            let b = m[(j, col)];
            m[(i, col)] = self.cos * a - self.sin * b;
            m[(j, col)] = self.sin * a + self.cos * b;
        }
    }

    /// `m ← m·Gᵗ`, touching columns `row` and `row+1` only.
    pub fn apply_right_transpose(&self, m: &mut DMatrix<f64>) {
        self.apply_right_transpose_on_rows(m, 0, m.nrows());
    }

    pub(crate) fn apply_right_transpose_on_rows(
        &self,
        m: &mut DMatrix<f64>,
        start: usize,
        end: usize,
    ) {
        let (i, j) = (self.row, self.row + 1);
        for r in start..end {
            let a = m[(r, i)];
            let b = m[(r, j)];
            m[(r, i)] = self.cos * a - self.sin * b;
            m[(r, j)] = self.sin * a + self.cos * b;
        }
    }
}
