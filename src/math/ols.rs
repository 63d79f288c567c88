//! Least squares solver.
//!
//! Used for the descriptive price/units fit line:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - SVD handles tall design matrices (many weeks, two columns) directly.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - Rank-deficient designs (every week at the same price) are rejected rather
//!   than returning an arbitrary minimum-norm solution.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() < x.ncols() || x.nrows() != y.len() {
        return None;
    }

    let svd = x.clone().svd(true, true);

    let max_sv = svd.singular_values.max();
    let min_sv = svd.singular_values.min();
    if !(max_sv.is_finite() && max_sv > 0.0) || min_sv / max_sv < 1e-12 {
        return None;
    }

    let beta = svd.solve(y, 1e-12).ok()?;
    if beta.iter().all(|v| v.is_finite()) {
        Some(beta)
    } else {
        None
    }
}

/// Fit `y = a + b x`, returning `(a, b)`.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len();
    let x = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { xs[i] });
    let y = DVector::from_column_slice(ys);
    let beta = solve_least_squares(&x, &y)?;
    Some((beta[0], beta[1]))
}
