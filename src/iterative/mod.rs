//! Krylov-subspace solvers for large or sparse square systems.
//!
//! Every solver works through [`LinearOperator`] only, so a
//! [`CsrMatrix`](crate::CsrMatrix) is never densified. Requires
//! [`FloatScalar`] (real-valued only).
//!
//! - [`conjugate_gradient`]: symmetric positive-definite systems
//! - [`bicgstab`]: general non-symmetric systems
//! - [`gmres`]: restarted GMRES(m), general systems
//!
//! All three start from `x = 0`, return the zero vector immediately for a
//! zero right-hand side, and stop once `||b - A*x|| <= tolerance * ||b||`.
//! Running out of iterations yields [`LinalgError::ConvergenceFailure`]; a
//! vanishing denominator yields [`LinalgError::Breakdown`].

mod bicgstab;
mod cg;
mod gmres;

#[cfg(test)]
mod tests;

pub use bicgstab::bicgstab;
pub use cg::conjugate_gradient;
pub use gmres::gmres;

use crate::dynmatrix::DynVector;
use crate::linalg::{ensure_len, ensure_square, LinalgError, Result};
use crate::traits::{FloatScalar, LinearOperator};

/// Settings shared by the iterative solvers.
#[derive(Debug, Clone, Copy)]
pub struct IterativeSettings<T> {
    /// Relative residual tolerance: stop when `||r|| <= tolerance * ||b||`.
    pub tolerance: T,
    /// Maximum number of iterations (matrix-vector products for GMRES).
    pub max_iter: usize,
    /// Krylov subspace dimension before GMRES restarts.
    pub restart: usize,
}

impl Default for IterativeSettings<f64> {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iter: 1000,
            restart: 30,
        }
    }
}

impl Default for IterativeSettings<f32> {
    fn default() -> Self {
        Self {
            tolerance: 1e-5,
            max_iter: 1000,
            restart: 30,
        }
    }
}

/// Result of an iterative solve.
#[derive(Debug, Clone)]
pub struct IterativeResult<T> {
    /// Approximate solution.
    pub x: DynVector<T>,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Final residual norm `||b - A*x||`.
    pub residual_norm: T,
}

// ── Slice kernels ───────────────────────────────────────────────────

#[inline]
pub(crate) fn dot<T: FloatScalar>(a: &[T], b: &[T]) -> T {
    a.iter().zip(b).fold(T::zero(), |acc, (&x, &y)| acc + x * y)
}

#[inline]
pub(crate) fn norm<T: FloatScalar>(a: &[T]) -> T {
    dot(a, a).sqrt()
}

/// `y += alpha * x`
#[inline]
pub(crate) fn axpy<T: FloatScalar>(alpha: T, x: &[T], y: &mut [T]) {
    for (yi, &xi) in y.iter_mut().zip(x) {
        *yi = *yi + alpha * xi;
    }
}

/// Check shapes and handle the trivial right-hand side.
///
/// Returns `Ok(Some(result))` when `b` is zero, `Ok(None)` otherwise.
pub(crate) fn prepare<T: FloatScalar>(
    a: &impl LinearOperator<T>,
    b: &DynVector<T>,
) -> Result<Option<IterativeResult<T>>> {
    ensure_square(a)?;
    ensure_len(a.nrows(), b.len())?;
    if norm(b.as_slice()) == T::zero() {
        return Ok(Some(IterativeResult {
            x: DynVector::zeros(b.len(), T::zero()),
            iterations: 0,
            residual_norm: T::zero(),
        }));
    }
    Ok(None)
}

pub(crate) fn not_converged<T: FloatScalar>(iterations: usize, residual: T) -> LinalgError {
    LinalgError::ConvergenceFailure {
        iterations,
        residual: residual.as_f64(),
    }
}
