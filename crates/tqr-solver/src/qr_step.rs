//! One Givens-based QR factorization sweep of a tridiagonal matrix.
//!
//! Rotations `G_0 … G_{n-2}` are applied down the diagonal, each zeroing the
//! sub-diagonal entry under the current pivot:
//!
//! ```text
//! R = G_{n-2} ⋯ G_1 G_0 A        (upper triangular, bandwidth 2)
//! Q = G_0ᵗ G_1ᵗ ⋯ G_{n-2}ᵗ       (orthogonal, A = Q R)
//! ```

use nalgebra::DMatrix;

use crate::error::{Result, SolverError};
use crate::givens::GivensRotation;

/// Factors produced by [`qr_step`].
#[derive(Debug, Clone)]
pub struct QrFactors {
    pub q: DMatrix<f64>,
    pub r: DMatrix<f64>,
    /// Rotations in application order; `Q` is the product of their transposes
    pub rotations: Vec<GivensRotation>,
}

/// Factor the tridiagonal matrix `a` as `Q·R` with one sweep of Givens rotations.
///
/// This is a single sweep; the eigen-solver calls it repeatedly.
pub fn qr_step(a: &DMatrix<f64>) -> Result<QrFactors> {
    if !a.is_square() {
        return Err(SolverError::InvalidMatrix(format!(
            "QR step needs a square matrix, got {}×{}",
            a.nrows(),
            a.ncols()
        )));
    }

    let n = a.nrows();
    let mut r = a.clone();
    let rotations = triangularize(&mut r, n);

    let mut q = DMatrix::identity(n, n);
    for rotation in &rotations {
        rotation.apply_right_transpose(&mut q);
    }

    Ok(QrFactors { q, r, rotations })
}

/// Reduce the leading `size`×`size` block of the tridiagonal `r` to upper
/// triangular form in place and return the rotations used.
///
/// Entries outside the block are left untouched. Columns left of the pivot are
/// already zero in both rows, so each rotation costs O(size).
pub(crate) fn triangularize(r: &mut DMatrix<f64>, size: usize) -> Vec<GivensRotation> {
    let mut rotations = Vec::with_capacity(size.saturating_sub(1));
    for i in 0..size.saturating_sub(1) {
        let rotation = GivensRotation::annihilating(i, r[(i, i)], r[(i + 1, i)]);
        rotation.apply_left_on_columns(r, i, size);
        // The annihilated entry is exactly zero by construction.
        r[(i + 1, i)] = 0.0;
        rotations.push(rotation);
    }
    rotations
}
