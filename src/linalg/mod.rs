//! Dense matrix decompositions.
//!
//! | Decomposition | Type                       | Factorization             |
//! |---------------|----------------------------|---------------------------|
//! | Cholesky      | [`CholeskyDecomposition`]  | `A = L·Lᵀ`                |
//! | LU            | [`LuDecomposition`]        | `P·A = L·U`               |
//! | QR            | [`QrDecomposition`]        | `A = Q·R` (Gram–Schmidt)  |
//! | Eigen         | [`EigenDecomposition`]     | `A·vᵢ ≈ λᵢ·vᵢ`            |
//! | SVD           | [`SvdDecomposition`]       | `A ≈ U·diag(σ)·Vᵀ`        |
//!
//! Every decomposition reads its input and builds fresh factor matrices once;
//! the resulting objects are immutable and can be shared across threads for
//! repeated solves. SVD is built on the eigen decomposition of `AᵀA`, which in
//! turn is built on repeated QR factorization.

pub(crate) mod cholesky;
pub(crate) mod eigen;
pub(crate) mod lu;
pub(crate) mod qr;
pub(crate) mod svd;

pub use cholesky::{back_substitute_lt, forward_substitute, CholeskyDecomposition};
pub use eigen::{
    qr_iteration, shifted_power_iteration, EigenAlgorithm, EigenDecomposition, CLUSTER_TOLERANCE,
    MAX_QR_ITERATIONS, POWER_ITERATIONS, SCHUR_TOLERANCE,
};
pub use lu::{lu_in_place, lu_solve, LuDecomposition};
pub use qr::QrDecomposition;
pub use svd::{SvdAlgorithm, SvdDecomposition};

use crate::traits::{FloatScalar, MatrixRef};

/// Numerical tolerance shared by every algorithm in the crate.
///
/// Used for symmetry checks, the positive-definiteness heuristic, detection
/// of linearly dependent QR columns, and zero singular values.
pub const EPSILON: f64 = 1e-10;

/// [`EPSILON`] converted to the working scalar type.
#[inline]
pub fn epsilon<T: FloatScalar>() -> T {
    T::from_f64(EPSILON)
}

/// Errors from decompositions, iterative solvers and the strategy dispatcher.
///
/// ```
/// use matsolve::DynMatrix;
/// use matsolve::linalg::{CholeskyDecomposition, LinalgError};
///
/// let not_pd = DynMatrix::from_rows(2, 2, &[1.0_f64, 5.0, 5.0, 1.0]);
/// assert_eq!(
///     CholeskyDecomposition::new(&not_pd).unwrap_err(),
///     LinalgError::NotPositiveDefinite { index: 1 },
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum LinalgError {
    /// A square matrix was required.
    #[error("matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    /// The matrix shape is not accepted by the algorithm.
    #[error("invalid {rows}x{cols} matrix: {reason}")]
    InvalidShape {
        rows: usize,
        cols: usize,
        reason: &'static str,
    },

    /// Right-hand side length does not match the number of rows.
    #[error("dimension mismatch: expected length {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A sparse coordinate lies outside the matrix.
    #[error("index ({row}, {col}) out of bounds for {nrows}x{ncols} matrix")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    },

    /// Cholesky found a non-positive pivot at diagonal `index`.
    #[error("matrix is not positive definite (non-positive pivot at diagonal {index})")]
    NotPositiveDefinite { index: usize },

    /// Matrix is singular or nearly singular.
    #[error("matrix is singular")]
    Singular,

    /// The requested algorithm variant exists but is not implemented.
    #[error("unsupported algorithm: {algorithm}")]
    Unsupported { algorithm: &'static str },

    /// Iterative algorithm did not converge within the iteration budget.
    #[error("did not converge after {iterations} iterations (residual {residual:.3e})")]
    ConvergenceFailure { iterations: usize, residual: f64 },

    /// An iterative method hit a division by (numerically) zero.
    #[error("{method} breakdown")]
    Breakdown { method: &'static str },
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, LinalgError>;

/// Fail with [`LinalgError::NotSquare`] unless `a` is square.
#[inline]
pub(crate) fn ensure_square<T>(a: &impl MatrixRef<T>) -> Result<()> {
    if a.nrows() != a.ncols() {
        return Err(LinalgError::NotSquare {
            rows: a.nrows(),
            cols: a.ncols(),
        });
    }
    Ok(())
}

/// Fail with [`LinalgError::DimensionMismatch`] unless `got == expected`.
#[inline]
pub(crate) fn ensure_len(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(LinalgError::DimensionMismatch { expected, got });
    }
    Ok(())
}
