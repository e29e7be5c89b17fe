use rand::Rng;

use crate::dynmatrix::{DynMatrix, DynVector};
use crate::linalg::{ensure_len, epsilon, EigenDecomposition, LinalgError, Result};
use crate::traits::{FloatScalar, MatrixRef};

/// SVD algorithm variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SvdAlgorithm {
    /// Eigen decomposition of `A^T * A`.
    #[default]
    AtaApproximation,
    /// Bidiagonalization with implicit-shift QR. Not implemented.
    GolubReinsch,
}

impl SvdAlgorithm {
    /// Whether this variant can be run.
    pub fn is_supported(self) -> bool {
        matches!(self, SvdAlgorithm::AtaApproximation)
    }

    fn name(self) -> &'static str {
        match self {
            SvdAlgorithm::AtaApproximation => "svd/ata-approximation",
            SvdAlgorithm::GolubReinsch => "svd/golub-reinsch",
        }
    }
}

/// Singular value decomposition `A ≈ U * diag(σ) * V^T`.
///
/// Built from the eigen decomposition of `A^T * A`: `V` holds its
/// eigenvectors (`n x n`), `σ_i = sqrt(max(λ_i, 0))` for the first
/// `k = min(m, n)` eigenvalues, and column `i` of `U` (`m x k`) is
/// `A * v_i / σ_i`. Columns of `U` for `σ_i` below
/// [`EPSILON`](crate::linalg::EPSILON) are left zero.
///
/// Squaring the matrix squares its condition number, so small singular
/// values lose roughly half their significant digits.
///
/// # Example
///
/// ```
/// use matsolve::DynMatrix;
/// use matsolve::linalg::SvdDecomposition;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let a = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 2.0, 4.0]);
/// let svd = SvdDecomposition::with_rng(&a, &mut StdRng::seed_from_u64(1)).unwrap();
/// assert!((svd.singular_values()[0] - 5.0).abs() < 1e-9);
/// assert_eq!(svd.rank(1e-6), 1);
/// assert!(svd.condition_number().is_infinite());
/// ```
#[derive(Debug, Clone)]
pub struct SvdDecomposition<T> {
    u: DynMatrix<T>,
    sigma: Vec<T>,
    v: DynMatrix<T>,
}

impl<T: FloatScalar> SvdDecomposition<T> {
    /// Decompose using the thread-local generator for the eigen step.
    pub fn new(a: &impl MatrixRef<T>) -> Result<Self> {
        Self::with_rng(a, &mut rand::rng())
    }

    /// Decompose drawing eigenvector start vectors from `rng`.
    pub fn with_rng<R: Rng>(a: &impl MatrixRef<T>, rng: &mut R) -> Result<Self> {
        Self::with_algorithm(a, SvdAlgorithm::AtaApproximation, rng)
    }

    /// Decompose with an explicit algorithm variant.
    ///
    /// Unsupported variants fail with [`LinalgError::Unsupported`] before any
    /// work is done.
    pub fn with_algorithm<R: Rng>(
        a: &impl MatrixRef<T>,
        algorithm: SvdAlgorithm,
        rng: &mut R,
    ) -> Result<Self> {
        if !algorithm.is_supported() {
            return Err(LinalgError::Unsupported {
                algorithm: algorithm.name(),
            });
        }

        let a = DynMatrix::from_matrix_ref(a);
        let m = a.nrows();
        let k = m.min(a.ncols());

        let eig = EigenDecomposition::with_rng(&a.gram(), rng)?;
        let v = eig.eigenvectors().clone();
        let sigma: Vec<T> = eig.eigenvalues()[..k]
            .iter()
            .map(|&l| l.max(T::zero()).sqrt())
            .collect();

        let eps = epsilon::<T>();
        let mut u = DynMatrix::zeros(m, k, T::zero());
        for (i, &s) in sigma.iter().enumerate() {
            if s < eps {
                continue;
            }
            let av = a.mul_vec(&v.col(i));
            let col: Vec<T> = av.iter().map(|&x| x / s).collect();
            u.set_col(i, &col);
        }

        log::trace!("svd: {}x{} matrix, {} singular values", m, a.ncols(), k);
        Ok(Self { u, sigma, v })
    }

    /// Left singular vectors (`m x k`).
    #[inline]
    pub fn u(&self) -> &DynMatrix<T> {
        &self.u
    }

    /// Singular values, descending and non-negative.
    #[inline]
    pub fn singular_values(&self) -> &[T] {
        &self.sigma
    }

    /// Right singular vectors (`n x n`).
    #[inline]
    pub fn v(&self) -> &DynMatrix<T> {
        &self.v
    }

    /// Number of singular values strictly greater than `tol`.
    pub fn rank(&self, tol: T) -> usize {
        self.sigma.iter().filter(|&&s| s > tol).count()
    }

    /// `σ_max / σ_min`; infinite when `σ_min` is below
    /// [`EPSILON`](crate::linalg::EPSILON) or there are no singular values.
    pub fn condition_number(&self) -> T {
        match (self.sigma.first(), self.sigma.last()) {
            (Some(&max), Some(&min)) if min >= epsilon::<T>() => max / min,
            _ => T::infinity(),
        }
    }

    /// Moore–Penrose pseudo-inverse `V * Σ⁺ * U^T` (`n x m`), inverting only
    /// singular values greater than `tol`.
    pub fn pseudo_inverse(&self, tol: T) -> DynMatrix<T> {
        let m = self.u.nrows();
        let n = self.v.nrows();
        let mut pinv = DynMatrix::zeros(n, m, T::zero());
        for (i, &s) in self.sigma.iter().enumerate() {
            if !(s > tol) {
                continue;
            }
            let inv = T::one() / s;
            let vi = self.v.col_slice(i);
            let ui = self.u.col_slice(i);
            for c in 0..m {
                let w = ui[c] * inv;
                for r in 0..n {
                    pinv[(r, c)] = pinv[(r, c)] + vi[r] * w;
                }
            }
        }
        pinv
    }

    /// Minimum-norm least-squares solution `x = A⁺ * b`.
    pub fn solve(&self, b: &DynVector<T>) -> Result<DynVector<T>> {
        let m = self.u.nrows();
        let n = self.v.nrows();
        ensure_len(m, b.len())?;

        let eps = epsilon::<T>();
        let mut x = vec![T::zero(); n];
        for (i, &s) in self.sigma.iter().enumerate() {
            if !(s > eps) {
                continue;
            }
            let coeff = self
                .u
                .col_slice(i)
                .iter()
                .zip(b.iter())
                .fold(T::zero(), |acc, (&u, &bi)| acc + u * bi)
                / s;
            for (xr, &vr) in x.iter_mut().zip(self.v.col_slice(i)) {
                *xr = *xr + coeff * vr;
            }
        }
        Ok(DynVector::from_vec(x))
    }
}
