use core::fmt::Debug;
use num_traits::{Float, Num, One, Zero};

/// Trait for types that can be used as matrix elements.
///
/// Blanket-implemented for all types satisfying the bounds.
/// Covers `f32`, `f64`, and all integer types.
pub trait Scalar: Copy + PartialEq + Debug + Zero + One + Num {}

impl<T: Copy + PartialEq + Debug + Zero + One + Num> Scalar for T {}

/// Trait for real floating-point matrix elements.
///
/// Required by everything that needs `sqrt`, `abs`, ordering or an infinity
/// sentinel: the decompositions, norms, and the iterative solvers.
/// Blanket-implemented for `f32` and `f64`.
pub trait FloatScalar: Scalar + Float {
    /// Convert an `f64` constant into `Self`.
    ///
    /// Used for tolerances such as [`crate::linalg::EPSILON`]. Every finite
    /// `f64` is representable (possibly rounded) in `f32` and `f64`.
    #[inline]
    fn from_f64(x: f64) -> Self {
        <Self as num_traits::NumCast>::from(x).unwrap_or_else(Self::nan)
    }

    /// Lossy conversion to `f64`, used when reporting values in errors.
    #[inline]
    fn as_f64(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

impl<T: Scalar + Float> FloatScalar for T {}

/// Read-only access to a matrix-like type.
///
/// Algorithms that only inspect entries (symmetry checks, strategy
/// recommendation, densification) are written against this trait so that
/// both [`DynMatrix`](crate::DynMatrix) and [`CsrMatrix`](crate::CsrMatrix)
/// work without conversion.
pub trait MatrixRef<T> {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn get(&self, row: usize, col: usize) -> &T;

    /// Number of explicitly stored entries, for sparse storage.
    ///
    /// Dense containers return `None`; the solver then never treats the
    /// matrix as sparse.
    #[inline]
    fn nnz(&self) -> Option<usize> {
        None
    }
}

/// Mutable access to a matrix-like type.
///
/// Extends `MatrixRef` with mutable element access, enabling
/// in-place algorithms (Cholesky, LU) to work generically.
pub trait MatrixMut<T>: MatrixRef<T> {
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T;
}

/// A matrix that can be applied to a vector: `y = A·x`.
///
/// This is the only capability the Krylov solvers in [`crate::iterative`]
/// need, so sparse matrices never have to be densified for them.
pub trait LinearOperator<T>: MatrixRef<T> {
    /// Compute `y = A·x`.
    ///
    /// `x.len()` must equal `ncols()` and `y.len()` must equal `nrows()`.
    fn apply(&self, x: &[T], y: &mut [T]);
}
