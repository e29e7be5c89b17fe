use core::ops::{Index, IndexMut};

use crate::traits::{MatrixMut, MatrixRef, Scalar};

use super::DynMatrix;

/// Dynamically-sized vector (wraps a 1×N `DynMatrix`).
///
/// Used for right-hand sides and solutions. Provides single-index access
/// `v[i]`.
///
/// # Examples
///
/// ```
/// use matsolve::DynVector;
///
/// let v = DynVector::from_slice(&[1.0_f64, 2.0, 3.0]);
/// assert_eq!(v[0], 1.0);
/// assert_eq!(v.len(), 3);
/// assert!((v.dot(&v) - 14.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DynVector<T> {
    pub(crate) inner: DynMatrix<T>,
}

impl<T: Scalar> DynVector<T> {
    /// Create a vector from a flat slice.
    pub fn from_slice(data: &[T]) -> Self {
        Self {
            inner: DynMatrix::from_slice(1, data.len(), data),
        }
    }

    /// Create a vector from an owned `Vec`.
    ///
    /// ```
    /// use matsolve::DynVector;
    /// let v = DynVector::from_vec(vec![1.0, 2.0, 3.0]);
    /// assert_eq!(v[2], 3.0);
    /// ```
    pub fn from_vec(data: Vec<T>) -> Self {
        let n = data.len();
        Self {
            inner: DynMatrix::from_vec(1, n, data),
        }
    }

    /// Create a zero vector of length `n`.
    pub fn zeros(n: usize, _zero: T) -> Self {
        Self {
            inner: DynMatrix::zeros(1, n, T::zero()),
        }
    }

    /// Unit vector `e_i` of length `n`.
    pub fn unit(n: usize, i: usize) -> Self {
        let mut v = Self::zeros(n, T::zero());
        v[i] = T::one();
        v
    }

    /// Dot product.
    ///
    /// ```
    /// use matsolve::DynVector;
    /// let a = DynVector::from_slice(&[1.0, 2.0, 3.0]);
    /// let b = DynVector::from_slice(&[4.0, 5.0, 6.0]);
    /// assert_eq!(a.dot(&b), 32.0);
    /// ```
    pub fn dot(&self, rhs: &Self) -> T {
        assert_eq!(self.len(), rhs.len(), "vector length mismatch");
        self.as_slice()
            .iter()
            .zip(rhs.as_slice())
            .fold(T::zero(), |acc, (&a, &b)| acc + a * b)
    }

    /// Convert into the owned element vector.
    pub fn into_vec(self) -> Vec<T> {
        self.inner.data
    }
}

impl<T> DynVector<T> {
    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.ncols()
    }

    /// Whether the vector is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// View the vector data as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.inner.as_slice()
    }

    /// View the vector data as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.inner.as_mut_slice()
    }

    /// Iterate over the elements.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

// ── Index ───────────────────────────────────────────────────────────

impl<T> Index<usize> for DynVector<T> {
    type Output = T;

    #[inline]
    fn index(&self, i: usize) -> &T {
        &self.inner[(0, i)]
    }
}

impl<T> IndexMut<usize> for DynVector<T> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.inner[(0, i)]
    }
}

// ── MatrixRef / MatrixMut ───────────────────────────────────────────

impl<T> MatrixRef<T> for DynVector<T> {
    #[inline]
    fn nrows(&self) -> usize {
        1
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.inner.ncols()
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> &T {
        self.inner.get(row, col)
    }
}

impl<T> MatrixMut<T> for DynVector<T> {
    #[inline]
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T {
        self.inner.get_mut(row, col)
    }
}

// ── Conversions ─────────────────────────────────────────────────────

impl<T: Scalar> From<Vec<T>> for DynVector<T> {
    fn from(v: Vec<T>) -> Self {
        Self::from_vec(v)
    }
}

impl<T: Scalar> From<&[T]> for DynVector<T> {
    fn from(v: &[T]) -> Self {
        Self::from_slice(v)
    }
}

impl<T: Scalar> From<DynVector<T>> for DynMatrix<T> {
    fn from(v: DynVector<T>) -> Self {
        v.inner
    }
}
