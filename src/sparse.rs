//! Compressed sparse row (CSR) storage.
//!
//! [`CsrMatrix`] is the sparse counterpart of [`DynMatrix`]. It reports its
//! stored entry count through [`MatrixRef::nnz`], which is what lets the
//! solver route large, sparse systems to the Krylov methods, and it
//! implements [`LinearOperator`] so those methods never densify it.

use crate::dynmatrix::{DynMatrix, DynVector};
use crate::linalg::LinalgError;
use crate::traits::{LinearOperator, MatrixRef, Scalar};

/// Sparse matrix in CSR format.
///
/// Row `i` owns the entries `values[row_ptr[i]..row_ptr[i + 1]]`, whose
/// column indices in `col_idx` are strictly increasing. Explicit zeros are
/// never stored.
///
/// ```
/// use matsolve::CsrMatrix;
/// use matsolve::traits::MatrixRef;
///
/// let a = CsrMatrix::from_triplets(3, 3, &[(0, 0, 2.0_f64), (1, 1, 3.0), (2, 0, 1.0)]).unwrap();
/// assert_eq!(a.nnz(), Some(3));
/// assert_eq!(*a.get(2, 0), 1.0);
/// assert_eq!(*a.get(0, 2), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix<T> {
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<T>,
    nrows: usize,
    ncols: usize,
    zero: T,
}

impl<T: Scalar> CsrMatrix<T> {
    /// Build from `(row, col, value)` triplets.
    ///
    /// Duplicate coordinates are summed; entries that end up exactly zero are
    /// dropped. Fails with [`LinalgError::IndexOutOfBounds`] if a coordinate
    /// lies outside `nrows x ncols`.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        triplets: &[(usize, usize, T)],
    ) -> Result<Self, LinalgError> {
        if let Some(&(row, col, _)) = triplets.iter().find(|&&(r, c, _)| r >= nrows || c >= ncols) {
            return Err(LinalgError::IndexOutOfBounds {
                row,
                col,
                nrows,
                ncols,
            });
        }

        let mut sorted = triplets.to_vec();
        sorted.sort_by_key(|&(r, c, _)| (r, c));

        let mut row_ptr = vec![0usize; nrows + 1];
        let mut col_idx = Vec::with_capacity(sorted.len());
        let mut values: Vec<T> = Vec::with_capacity(sorted.len());
        let mut last: Option<(usize, usize)> = None;

        for (r, c, v) in sorted {
            if last == Some((r, c)) {
                // Duplicate coordinate: accumulate into the previous entry
                if let Some(prev) = values.last_mut() {
                    *prev = *prev + v;
                }
                continue;
            }
            col_idx.push(c);
            values.push(v);
            row_ptr[r + 1] += 1;
            last = Some((r, c));
        }

        for i in 1..=nrows {
            row_ptr[i] += row_ptr[i - 1];
        }

        let mut csr = Self {
            row_ptr,
            col_idx,
            values,
            nrows,
            ncols,
            zero: T::zero(),
        };
        csr.drop_zeros();
        Ok(csr)
    }

    /// Convert a dense matrix, keeping only its non-zero entries.
    pub fn from_dense(a: &DynMatrix<T>) -> Self {
        let mut row_ptr = Vec::with_capacity(a.nrows() + 1);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);
        for i in 0..a.nrows() {
            for j in 0..a.ncols() {
                let v = a[(i, j)];
                if v != T::zero() {
                    col_idx.push(j);
                    values.push(v);
                }
            }
            row_ptr.push(values.len());
        }
        Self {
            row_ptr,
            col_idx,
            values,
            nrows: a.nrows(),
            ncols: a.ncols(),
            zero: T::zero(),
        }
    }

    /// Fraction of entries that are stored: `nnz / (nrows * ncols)`.
    ///
    /// An empty matrix has density `0`.
    pub fn density(&self) -> f64 {
        let total = self.nrows * self.ncols;
        if total == 0 {
            return 0.0;
        }
        self.values.len() as f64 / total as f64
    }

    /// Sparse matrix-vector product `A·x`.
    pub fn mul_vec(&self, x: &DynVector<T>) -> DynVector<T> {
        let mut y = vec![T::zero(); self.nrows];
        self.apply(x.as_slice(), &mut y);
        DynVector::from_vec(y)
    }

    /// Expand into dense storage.
    pub fn to_dense(&self) -> DynMatrix<T> {
        let mut out = DynMatrix::zeros(self.nrows, self.ncols, T::zero());
        for i in 0..self.nrows {
            for k in self.row_ptr[i]..self.row_ptr[i + 1] {
                out[(i, self.col_idx[k])] = self.values[k];
            }
        }
        out
    }

    fn drop_zeros(&mut self) {
        let mut write = 0;
        let mut start = 0;
        for i in 0..self.nrows {
            let end = self.row_ptr[i + 1];
            for k in start..end {
                if self.values[k] != T::zero() {
                    self.col_idx[write] = self.col_idx[k];
                    self.values[write] = self.values[k];
                    write += 1;
                }
            }
            start = end;
            self.row_ptr[i + 1] = write;
        }
        self.col_idx.truncate(write);
        self.values.truncate(write);
    }
}

impl<T> MatrixRef<T> for CsrMatrix<T> {
    #[inline]
    fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.ncols
    }

    fn get(&self, row: usize, col: usize) -> &T {
        assert!(
            row < self.nrows && col < self.ncols,
            "index ({}, {}) out of bounds for {}x{} matrix",
            row,
            col,
            self.nrows,
            self.ncols
        );
        let range = self.row_ptr[row]..self.row_ptr[row + 1];
        match self.col_idx[range.clone()].binary_search(&col) {
            Ok(k) => &self.values[range.start + k],
            Err(_) => &self.zero,
        }
    }

    #[inline]
    fn nnz(&self) -> Option<usize> {
        Some(self.values.len())
    }
}

impl<T: Scalar> LinearOperator<T> for CsrMatrix<T> {
    fn apply(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.ncols, "operand length mismatch");
        assert_eq!(y.len(), self.nrows, "output length mismatch");
        for (i, yi) in y.iter_mut().enumerate() {
            let mut sum = T::zero();
            for k in self.row_ptr[i]..self.row_ptr[i + 1] {
                sum = sum + self.values[k] * x[self.col_idx[k]];
            }
            *yi = sum;
        }
    }
}
