use crate::traits::{FloatScalar, Scalar};

use super::vector::DynVector;
use super::DynMatrix;

// ── Vector norms ────────────────────────────────────────────────────

impl<T: Scalar> DynVector<T> {
    /// Squared L2 norm (dot product with self).
    ///
    /// ```
    /// use matsolve::DynVector;
    /// let v = DynVector::from_slice(&[3.0, 4.0]);
    /// assert_eq!(v.norm_squared(), 25.0);
    /// ```
    pub fn norm_squared(&self) -> T {
        self.dot(self)
    }
}

impl<T: FloatScalar> DynVector<T> {
    /// L2 (Euclidean) norm.
    ///
    /// ```
    /// use matsolve::DynVector;
    /// let v = DynVector::from_slice(&[3.0_f64, 4.0]);
    /// assert!((v.norm() - 5.0).abs() < 1e-12);
    /// ```
    pub fn norm(&self) -> T {
        self.norm_squared().sqrt()
    }

    /// Return a unit vector in the same direction.
    ///
    /// A zero vector is returned unchanged.
    pub fn normalize(&self) -> Self {
        let n = self.norm();
        if n == T::zero() {
            return self.clone();
        }
        DynVector::from_vec(self.iter().map(|&x| x / n).collect())
    }
}

// ── Matrix norms ────────────────────────────────────────────────────

impl<T: FloatScalar> DynMatrix<T> {
    /// Frobenius norm (square root of the sum of squared entries).
    ///
    /// ```
    /// use matsolve::DynMatrix;
    /// let m = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
    /// assert!((m.frobenius_norm() - 30.0_f64.sqrt()).abs() < 1e-12);
    /// ```
    pub fn frobenius_norm(&self) -> T {
        self.data
            .iter()
            .fold(T::zero(), |acc, &x| acc + x * x)
            .sqrt()
    }

    /// Largest absolute entry-wise difference to another matrix of the
    /// same shape.
    ///
    /// Panics on shape mismatch.
    pub fn max_abs_diff(&self, other: &Self) -> T {
        assert_eq!(
            (self.nrows, self.ncols),
            (other.nrows, other.ncols),
            "dimension mismatch: {}x{} vs {}x{}",
            self.nrows,
            self.ncols,
            other.nrows,
            other.ncols,
        );
        self.data
            .iter()
            .zip(&other.data)
            .fold(T::zero(), |acc, (&a, &b)| acc.max((a - b).abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_norm() {
        let v = DynVector::from_slice(&[3.0_f64, 4.0]);
        assert_eq!(v.norm_squared(), 25.0);
        assert!((v.norm() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn normalize() {
        let v = DynVector::from_slice(&[3.0_f64, 4.0]);
        let u = v.normalize();
        assert!((u.norm() - 1.0).abs() < 1e-12);
        assert!((u[0] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn normalize_zero_is_identity() {
        let v = DynVector::zeros(3, 0.0_f64);
        assert_eq!(v.normalize(), v);
    }

    #[test]
    fn max_abs_diff() {
        let a = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
        let b = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.5, 2.0, 4.0]);
        assert_eq!(a.max_abs_diff(&b), 1.0);
        assert_eq!(a.max_abs_diff(&a), 0.0);
    }
}
