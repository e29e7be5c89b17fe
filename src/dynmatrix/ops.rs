use core::ops::{Add, Mul, Neg, Sub};

use crate::traits::{LinearOperator, Scalar};

use super::vector::DynVector;
use super::DynMatrix;

// ── Element-wise addition / subtraction ─────────────────────────────

macro_rules! impl_elementwise {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<T: Scalar> $trait<&DynMatrix<T>> for &DynMatrix<T> {
            type Output = DynMatrix<T>;

            fn $method(self, rhs: &DynMatrix<T>) -> DynMatrix<T> {
                assert_eq!(
                    (self.nrows, self.ncols),
                    (rhs.nrows, rhs.ncols),
                    "dimension mismatch: {}x{} {} {}x{}",
                    self.nrows,
                    self.ncols,
                    stringify!($op),
                    rhs.nrows,
                    rhs.ncols,
                );
                let data = self
                    .data
                    .iter()
                    .zip(rhs.data.iter())
                    .map(|(&a, &b)| a $op b)
                    .collect();
                DynMatrix {
                    data,
                    nrows: self.nrows,
                    ncols: self.ncols,
                }
            }
        }

        impl<T: Scalar> $trait for DynMatrix<T> {
            type Output = DynMatrix<T>;
            fn $method(self, rhs: DynMatrix<T>) -> DynMatrix<T> {
                &self $op &rhs
            }
        }

        impl<T: Scalar> $trait<&DynMatrix<T>> for DynMatrix<T> {
            type Output = DynMatrix<T>;
            fn $method(self, rhs: &DynMatrix<T>) -> DynMatrix<T> {
                &self $op rhs
            }
        }
    };
}

impl_elementwise!(Add, add, +);
impl_elementwise!(Sub, sub, -);

// ── Negation ────────────────────────────────────────────────────────

impl<T: Scalar + Neg<Output = T>> Neg for &DynMatrix<T> {
    type Output = DynMatrix<T>;

    fn neg(self) -> DynMatrix<T> {
        DynMatrix {
            data: self.data.iter().map(|&x| -x).collect(),
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

// ── Matrix multiplication: (M×N) * (N×P) → (M×P) ──────────────────

impl<T: Scalar> Mul<&DynMatrix<T>> for &DynMatrix<T> {
    type Output = DynMatrix<T>;

    fn mul(self, rhs: &DynMatrix<T>) -> DynMatrix<T> {
        assert_eq!(
            self.ncols, rhs.nrows,
            "dimension mismatch: {}x{} * {}x{}",
            self.nrows, self.ncols, rhs.nrows, rhs.ncols,
        );
        let m = self.nrows;
        let n = self.ncols;
        let p = rhs.ncols;
        let mut data = vec![T::zero(); m * p];
        // Column j of the product is A * rhs[:, j]; accumulate column-wise
        for j in 0..p {
            let out = &mut data[j * m..(j + 1) * m];
            for k in 0..n {
                let b_kj = rhs.data[j * n + k];
                if b_kj == T::zero() {
                    continue;
                }
                for (o, &a_ik) in out.iter_mut().zip(self.col_slice(k)) {
                    *o = *o + a_ik * b_kj;
                }
            }
        }
        DynMatrix {
            data,
            nrows: m,
            ncols: p,
        }
    }
}

impl<T: Scalar> Mul for DynMatrix<T> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        &self * &rhs
    }
}

impl<T: Scalar> Mul<&DynMatrix<T>> for DynMatrix<T> {
    type Output = DynMatrix<T>;
    fn mul(self, rhs: &DynMatrix<T>) -> DynMatrix<T> {
        &self * rhs
    }
}

// ── Scalar multiplication: matrix * scalar ──────────────────────────

impl<T: Scalar> Mul<T> for &DynMatrix<T> {
    type Output = DynMatrix<T>;

    fn mul(self, rhs: T) -> DynMatrix<T> {
        DynMatrix {
            data: self.data.iter().map(|&x| x * rhs).collect(),
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

impl<T: Scalar> Mul<T> for DynMatrix<T> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        &self * rhs
    }
}

impl<T: Scalar> DynMatrix<T> {
    /// Transpose: (M×N) → (N×M).
    ///
    /// ```
    /// use matsolve::DynMatrix;
    /// let a = DynMatrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// let t = a.transpose();
    /// assert_eq!(t.nrows(), 3);
    /// assert_eq!(t.ncols(), 2);
    /// assert_eq!(t[(1, 0)], 2.0);
    /// ```
    pub fn transpose(&self) -> Self {
        DynMatrix::from_fn(self.ncols, self.nrows, |i, j| self[(j, i)])
    }

    /// Matrix-vector product `A·x`.
    ///
    /// Panics if `x.len() != ncols`.
    pub fn mul_vec(&self, x: &DynVector<T>) -> DynVector<T> {
        let mut y = vec![T::zero(); self.nrows];
        self.apply(x.as_slice(), &mut y);
        DynVector::from_vec(y)
    }

    /// Gram matrix `Aᵀ·A` (N×N), computed without forming the transpose.
    pub fn gram(&self) -> Self {
        let n = self.ncols;
        let mut g = DynMatrix::zeros(n, n, T::zero());
        for i in 0..n {
            for j in i..n {
                let v = self
                    .col_slice(i)
                    .iter()
                    .zip(self.col_slice(j))
                    .fold(T::zero(), |acc, (&a, &b)| acc + a * b);
                g[(i, j)] = v;
                g[(j, i)] = v;
            }
        }
        g
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub() {
        let a = DynMatrix::from_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let b = DynMatrix::from_slice(2, 2, &[5.0, 6.0, 7.0, 8.0]);

        let c = &a + &b;
        assert_eq!(c[(0, 0)], 6.0);
        assert_eq!(c[(1, 1)], 12.0);

        let d = b - &a;
        assert_eq!(d[(0, 0)], 4.0);
        assert_eq!(d[(1, 1)], 4.0);
    }

    #[test]
    #[should_panic(expected = "dimension mismatch")]
    fn add_mismatch() {
        let a = DynMatrix::zeros(2, 2, 0.0_f64);
        let b = DynMatrix::zeros(2, 3, 0.0_f64);
        let _ = &a + &b;
    }

    #[test]
    fn neg() {
        let a = DynMatrix::from_rows(1, 2, &[1.0, -2.0]);
        let n = -&a;
        assert_eq!(n[(0, 0)], -1.0);
        assert_eq!(n[(0, 1)], 2.0);
    }

    #[test]
    fn mul_rectangular() {
        let a = DynMatrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = DynMatrix::from_rows(3, 2, &[7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
        let c = &a * &b;
        assert_eq!(c.nrows(), 2);
        assert_eq!(c.ncols(), 2);
        assert_eq!(c[(0, 0)], 58.0);
        assert_eq!(c[(0, 1)], 64.0);
        assert_eq!(c[(1, 0)], 139.0);
        assert_eq!(c[(1, 1)], 154.0);
    }

    #[test]
    fn mul_identity() {
        let a = DynMatrix::from_rows(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let id = DynMatrix::eye(2, 0.0);
        assert_eq!(&a * &id, a);
        assert_eq!(id * &a, a);
    }

    #[test]
    fn scalar_mul() {
        let a = DynMatrix::from_rows(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let b = &a * 2.0;
        assert_eq!(b[(1, 0)], 6.0);
    }

    #[test]
    fn transpose_rectangular() {
        let a = DynMatrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let t = a.transpose();
        assert_eq!(t.nrows(), 3);
        assert_eq!(t.ncols(), 2);
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(a[(i, j)], t[(j, i)]);
            }
        }
    }

    #[test]
    fn mul_vec() {
        let a = DynMatrix::from_rows(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let x = DynVector::from_slice(&[1.0, 2.0]);
        let y = a.mul_vec(&x);
        assert_eq!(y.as_slice(), &[6.0, 7.0]);
    }

    #[test]
    fn gram_matches_explicit_product() {
        let a = DynMatrix::from_rows(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let g = a.gram();
        let explicit = &a.transpose() * &a;
        assert_eq!(g, explicit);
    }
}
