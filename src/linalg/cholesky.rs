use crate::dynmatrix::{DynMatrix, DynVector};
use crate::linalg::{ensure_len, ensure_square, LinalgError, Result};
use crate::traits::{FloatScalar, MatrixRef};

// ---------------------------------------------------------------------------
// Triangular solves (shared with the dispatcher and the tests)
// ---------------------------------------------------------------------------

/// Solve L*x = b by forward substitution, where L is lower triangular.
#[inline]
pub fn forward_substitute<T: FloatScalar>(l: &impl MatrixRef<T>, b: &[T], x: &mut [T]) {
    let n = l.nrows();
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum = sum - *l.get(i, j) * x[j];
        }
        x[i] = sum / *l.get(i, i);
    }
}

/// Solve L^T * x = b by back substitution, where L is lower triangular.
#[inline]
pub fn back_substitute_lt<T: FloatScalar>(l: &impl MatrixRef<T>, b: &[T], x: &mut [T]) {
    let n = l.nrows();
    for i in (0..n).rev() {
        let mut sum = b[i];
        for j in (i + 1)..n {
            sum = sum - *l.get(j, i) * x[j];
        }
        x[i] = sum / *l.get(i, i);
    }
}

/// Cholesky–Banachiewicz factorization, row by row.
///
/// Returns the full lower-triangular factor (zeros above the diagonal).
fn banachiewicz<T: FloatScalar>(a: &impl MatrixRef<T>) -> Result<DynMatrix<T>> {
    let n = a.nrows();
    let mut l = DynMatrix::zeros(n, n, T::zero());

    for i in 0..n {
        for j in 0..=i {
            let mut sum = T::zero();
            for k in 0..j {
                sum = sum + l[(i, k)] * l[(j, k)];
            }

            if i == j {
                let pivot = *a.get(j, j) - sum;
                // `!(pivot > 0)` also rejects NaN
                if !(pivot > T::zero()) {
                    return Err(LinalgError::NotPositiveDefinite { index: j });
                }
                l[(j, j)] = pivot.sqrt();
            } else {
                l[(i, j)] = (*a.get(i, j) - sum) / l[(j, j)];
            }
        }
    }

    Ok(l)
}

// ---------------------------------------------------------------------------
// CholeskyDecomposition
// ---------------------------------------------------------------------------

/// Cholesky decomposition of a symmetric positive-definite matrix.
///
/// Stores the lower triangular factor L where `A = L * L^T`. Only the lower
/// triangle of `A` is read.
///
/// # Example
///
/// ```
/// use matsolve::{DynMatrix, DynVector};
/// use matsolve::linalg::CholeskyDecomposition;
///
/// let a = DynMatrix::from_rows(2, 2, &[4.0_f64, 2.0, 2.0, 3.0]);
/// let chol = CholeskyDecomposition::new(&a).unwrap();
///
/// let b = DynVector::from_slice(&[8.0, 7.0]);
/// let x = chol.solve(&b).unwrap();
/// assert!((x[0] - 1.25).abs() < 1e-12);
/// assert!((x[1] - 1.5).abs() < 1e-12);
/// assert!((chol.det() - 8.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct CholeskyDecomposition<T> {
    l: DynMatrix<T>,
}

impl<T: FloatScalar> CholeskyDecomposition<T> {
    /// Decompose a symmetric positive-definite matrix.
    ///
    /// Fails with [`LinalgError::NotSquare`] for rectangular input and
    /// [`LinalgError::NotPositiveDefinite`] (carrying the offending diagonal
    /// index) when a pivot is not strictly positive.
    pub fn new(a: &impl MatrixRef<T>) -> Result<Self> {
        ensure_square(a)?;
        let l = banachiewicz(a)?;
        log::trace!("cholesky: factored {}x{} matrix", l.nrows(), l.ncols());
        Ok(Self { l })
    }

    /// The lower triangular factor L (zeros above the diagonal).
    #[inline]
    pub fn l(&self) -> &DynMatrix<T> {
        &self.l
    }

    /// The upper triangular factor L^T.
    pub fn lt(&self) -> DynMatrix<T> {
        self.l.transpose()
    }

    /// Solve A*x = b for x, where A = L*L^T. O(n²).
    pub fn solve(&self, b: &DynVector<T>) -> Result<DynVector<T>> {
        let n = self.l.nrows();
        ensure_len(n, b.len())?;
        let mut y = vec![T::zero(); n];
        forward_substitute(&self.l, b.as_slice(), &mut y);
        let mut x = vec![T::zero(); n];
        back_substitute_lt(&self.l, &y, &mut x);
        Ok(DynVector::from_vec(x))
    }

    /// Determinant: det(A) = product(L\[i\]\[i\])^2.
    pub fn det(&self) -> T {
        let n = self.l.nrows();
        let mut prod = T::one();
        for i in 0..n {
            prod = prod * self.l[(i, i)];
        }
        prod * prod
    }

    /// Log-determinant: ln(det(A)) = 2 * sum(ln(L\[i\]\[i\])).
    ///
    /// Does not overflow for large matrices where `det()` would.
    pub fn ln_det(&self) -> T {
        let n = self.l.nrows();
        let mut sum = T::zero();
        for i in 0..n {
            sum = sum + self.l[(i, i)].ln();
        }
        sum + sum
    }

    /// Matrix inverse: solves for each unit vector and assembles the columns.
    pub fn inverse(&self) -> DynMatrix<T> {
        let n = self.l.nrows();
        let mut inv = DynMatrix::zeros(n, n, T::zero());
        let mut e = vec![T::zero(); n];
        let mut y = vec![T::zero(); n];
        let mut x = vec![T::zero(); n];

        for col in 0..n {
            if col > 0 {
                e[col - 1] = T::zero();
            }
            e[col] = T::one();

            forward_substitute(&self.l, &e, &mut y);
            back_substitute_lt(&self.l, &y, &mut x);

            // A x = e_col gives column `col` of A^{-1}
            inv.set_col(col, &x);
        }

        inv
    }
}
