use crate::traits::Scalar;

use super::vector::DynVector;
use super::DynMatrix;

impl<T: Scalar> DynMatrix<T> {
    /// Sum of diagonal elements.
    ///
    /// ```
    /// use matsolve::DynMatrix;
    /// let m = DynMatrix::from_rows(2, 2, &[1.0, 2.0, 3.0, 4.0]);
    /// assert_eq!(m.trace(), 5.0);
    /// ```
    pub fn trace(&self) -> T {
        let n = self.nrows.min(self.ncols);
        let mut sum = T::zero();
        for i in 0..n {
            sum = sum + self[(i, i)];
        }
        sum
    }

    /// Extract the diagonal as a `DynVector`.
    pub fn diag(&self) -> DynVector<T> {
        let n = self.nrows.min(self.ncols);
        DynVector::from_vec((0..n).map(|i| self[(i, i)]).collect())
    }

    /// Create a square diagonal matrix from a slice.
    ///
    /// ```
    /// use matsolve::DynMatrix;
    /// let m = DynMatrix::from_diag(&[2.0, 3.0]);
    /// assert_eq!(m[(0, 0)], 2.0);
    /// assert_eq!(m[(1, 1)], 3.0);
    /// assert_eq!(m[(0, 1)], 0.0);
    /// ```
    pub fn from_diag(values: &[T]) -> Self {
        let n = values.len();
        let mut m = Self::zeros(n, n, T::zero());
        for (i, &v) in values.iter().enumerate() {
            m[(i, i)] = v;
        }
        m
    }
}
