use crate::dynmatrix::{DynMatrix, DynVector};
use crate::linalg::{ensure_len, epsilon, LinalgError, Result};
use crate::traits::{FloatScalar, MatrixRef};

/// Thin QR decomposition by classical Gram–Schmidt.
///
/// For an `m x n` input with `m >= n`, stores `Q` (`m x n`) and `R`
/// (`n x n`, upper triangular) with `A = Q * R`.
///
/// A column whose residual after projecting out the earlier columns has norm
/// below [`EPSILON`](crate::linalg::EPSILON) is treated as linearly
/// dependent: its `Q` column is left zero and `R[j][j] = 0`. This is not an
/// error; [`is_full_rank`](Self::is_full_rank) reports it, and
/// [`solve_least_squares`](Self::solve_least_squares) refuses to divide by
/// the zero diagonal.
///
/// # Example
///
/// ```
/// use matsolve::{DynMatrix, DynVector};
/// use matsolve::linalg::QrDecomposition;
///
/// // Fit y = c0 + c1*t through (0,1), (1,3), (2,5)
/// let a = DynMatrix::from_rows(3, 2, &[1.0_f64, 0.0, 1.0, 1.0, 1.0, 2.0]);
/// let b = DynVector::from_slice(&[1.0, 3.0, 5.0]);
/// let x = QrDecomposition::new(&a).unwrap().solve_least_squares(&b).unwrap();
/// assert!((x[0] - 1.0).abs() < 1e-10);
/// assert!((x[1] - 2.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct QrDecomposition<T> {
    q: DynMatrix<T>,
    r: DynMatrix<T>,
}

impl<T: FloatScalar> QrDecomposition<T> {
    /// Decompose an `m x n` matrix. Fails with [`LinalgError::InvalidShape`]
    /// when `m < n`.
    pub fn new(a: &impl MatrixRef<T>) -> Result<Self> {
        let m = a.nrows();
        let n = a.ncols();
        if m < n {
            return Err(LinalgError::InvalidShape {
                rows: m,
                cols: n,
                reason: "QR requires at least as many rows as columns",
            });
        }

        let eps = epsilon::<T>();
        let mut q = DynMatrix::zeros(m, n, T::zero());
        let mut r = DynMatrix::zeros(n, n, T::zero());
        let mut v = vec![T::zero(); m];

        for j in 0..n {
            for (i, vi) in v.iter_mut().enumerate() {
                *vi = *a.get(i, j);
            }

            // Classical Gram–Schmidt: project the original column, not the residual
            for i in 0..j {
                let qi = q.col_slice(i);
                let rij = (0..m).fold(T::zero(), |acc, k| acc + qi[k] * *a.get(k, j));
                r[(i, j)] = rij;
                for (vk, &qk) in v.iter_mut().zip(qi) {
                    *vk = *vk - rij * qk;
                }
            }

            let norm = v.iter().fold(T::zero(), |acc, &x| acc + x * x).sqrt();
            if norm < eps {
                // dependent column: Q column stays zero, R[j][j] = 0
                continue;
            }
            r[(j, j)] = norm;
            for i in 0..m {
                q[(i, j)] = v[i] / norm;
            }
        }

        Ok(Self { q, r })
    }

    /// The `m x n` factor with orthonormal (or zero) columns.
    #[inline]
    pub fn q(&self) -> &DynMatrix<T> {
        &self.q
    }

    /// The `n x n` upper triangular factor.
    #[inline]
    pub fn r(&self) -> &DynMatrix<T> {
        &self.r
    }

    /// Whether every column was linearly independent (`R[j][j] != 0`).
    pub fn is_full_rank(&self) -> bool {
        (0..self.r.nrows()).all(|j| self.r[(j, j)] != T::zero())
    }

    /// Least-squares solution minimizing `||A*x - b||`.
    ///
    /// Computes `Q^T * b`, then back-substitutes through `R`. Fails with
    /// [`LinalgError::Singular`] if a column was found to be dependent.
    pub fn solve_least_squares(&self, b: &DynVector<T>) -> Result<DynVector<T>> {
        let m = self.q.nrows();
        let n = self.q.ncols();
        ensure_len(m, b.len())?;

        let mut x: Vec<T> = (0..n)
            .map(|j| {
                self.q
                    .col_slice(j)
                    .iter()
                    .zip(b.iter())
                    .fold(T::zero(), |acc, (&qi, &bi)| acc + qi * bi)
            })
            .collect();

        for i in (0..n).rev() {
            let rii = self.r[(i, i)];
            if rii == T::zero() {
                return Err(LinalgError::Singular);
            }
            let mut sum = x[i];
            for j in (i + 1)..n {
                sum = sum - self.r[(i, j)] * x[j];
            }
            x[i] = sum / rii;
        }

        Ok(DynVector::from_vec(x))
    }
}
