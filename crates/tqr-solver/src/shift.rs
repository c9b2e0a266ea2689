//! Wilkinson shift heuristic.
//!
//! For the trailing 2×2 block
//!
//! ```text
//! | alpha  beta       |
//! | beta   alpha_last |
//! ```
//!
//! the shift is the eigenvalue of the block closest to `alpha_last`:
//! `d = (alpha - alpha_last)/2`, `mu = alpha_last + d - sign(d)·√(d² + beta²)`.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Sign with `sign(0) = +1`.
pub fn sign(x: f64) -> f64 {
    if x >= 0.0 { 1.0 } else { -1.0 }
}

pub fn wilkinson_shift(alpha: f64, beta: f64, alpha_last: f64) -> f64 {
    let d = (alpha - alpha_last) / 2.0;
    alpha_last + d - sign(d) * d.hypot(beta)
}

/// How the deflation driver picks the spectral shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStrategy {
    /// Wilkinson shift, skipped on the first sweep of every deflation block
    #[default]
    Wilkinson,
    /// Plain QR iteration (mu = 0 always)
    Unshifted,
}

impl ShiftStrategy {
    pub fn from_flag(shifted: bool) -> Self {
        if shifted {
            ShiftStrategy::Wilkinson
        } else {
            ShiftStrategy::Unshifted
        }
    }

    pub fn is_shifted(self) -> bool {
        self == ShiftStrategy::Wilkinson
    }

    /// Shift for the active block whose last row is `m` (requires `m >= 1`).
    pub fn shift(self, a: &DMatrix<f64>, m: usize, first_in_block: bool) -> f64 {
        match self {
            ShiftStrategy::Unshifted => 0.0,
            ShiftStrategy::Wilkinson if first_in_block => 0.0,
            ShiftStrategy::Wilkinson => {
                wilkinson_shift(a[(m - 1, m - 1)], a[(m, m - 1)], a[(m, m)])
            }
        }
    }
}
