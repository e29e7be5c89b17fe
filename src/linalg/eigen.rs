use core::cmp::Ordering;

use rand::Rng;

use crate::dynmatrix::{DynMatrix, DynVector};
use crate::linalg::{ensure_square, LinalgError, LuDecomposition, QrDecomposition, Result};
use crate::traits::{FloatScalar, MatrixRef};

/// Iteration cap for the unshifted QR algorithm.
pub const MAX_QR_ITERATIONS: usize = 100;

/// QR iteration stops once the sum of `|a_ij|` below the diagonal falls
/// under this value.
///
/// Only the strictly lower triangle is summed: the iterates converge to an
/// upper-triangular Schur form, so the upper triangle need not vanish for
/// nonsymmetric input. For symmetric input this stops at roughly half the
/// full off-diagonal magnitude.
pub const SCHUR_TOLERANCE: f64 = 1e-10;

/// Fixed number of power-iteration steps per eigenvector.
pub const POWER_ITERATIONS: usize = 100;

/// Attempts at shifting away from an eigenvalue before giving up.
const MAX_SHIFT_ATTEMPTS: usize = 4;

/// Eigenvalues closer than this (relative to `max(|λ|, 1)`) share an
/// eigenspace, and their eigenvectors are orthogonalized against each other.
pub const CLUSTER_TOLERANCE: f64 = 1e-8;

/// Eigenvector algorithm variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EigenAlgorithm {
    /// QR iteration for the eigenvalues, shifted power iteration per
    /// eigenvector.
    #[default]
    SimplifiedPowerIteration,
    /// Rayleigh-quotient inverse iteration. Not implemented.
    InverseIteration,
}

impl EigenAlgorithm {
    /// Whether this variant can be run.
    pub fn is_supported(self) -> bool {
        matches!(self, EigenAlgorithm::SimplifiedPowerIteration)
    }

    fn name(self) -> &'static str {
        match self {
            EigenAlgorithm::SimplifiedPowerIteration => "eigen/simplified-power-iteration",
            EigenAlgorithm::InverseIteration => "eigen/inverse-iteration",
        }
    }
}

fn lower_off_diagonal<T: FloatScalar>(a: &DynMatrix<T>) -> T {
    let n = a.nrows();
    let mut sum = T::zero();
    for j in 0..n {
        for i in (j + 1)..n {
            sum = sum + a[(i, j)].abs();
        }
    }
    sum
}

/// Eigenvalues by unshifted QR iteration, sorted descending.
///
/// Repeats `A_{k+1} = R_k * Q_k` until the strictly lower triangle sums to
/// less than [`SCHUR_TOLERANCE`] (checked before every step) or
/// [`MAX_QR_ITERATIONS`] is reached; the diagonal is then returned as is.
///
/// Real eigenvalues are assumed. For inputs with complex-conjugate pairs the
/// iteration hits the cap and the diagonal is only an approximation.
///
/// ```
/// use matsolve::DynMatrix;
/// use matsolve::linalg::qr_iteration;
///
/// let a = DynMatrix::from_rows(2, 2, &[2.0_f64, 1.0, 1.0, 2.0]);
/// let values = qr_iteration(&a).unwrap();
/// assert!((values[0] - 3.0).abs() < 1e-9);
/// assert!((values[1] - 1.0).abs() < 1e-9);
/// ```
pub fn qr_iteration<T: FloatScalar>(a: &impl MatrixRef<T>) -> Result<Vec<T>> {
    ensure_square(a)?;
    let tol = T::from_f64(SCHUR_TOLERANCE);
    let mut ak = DynMatrix::from_matrix_ref(a);

    let mut iterations = 0;
    let mut off = lower_off_diagonal(&ak);
    while !(off < tol) && iterations < MAX_QR_ITERATIONS {
        let qr = QrDecomposition::new(&ak)?;
        ak = qr.r() * qr.q();
        iterations += 1;
        off = lower_off_diagonal(&ak);
    }

    if off < tol {
        log::debug!("qr iteration converged after {} iterations", iterations);
    } else {
        log::warn!(
            "qr iteration stopped at the {}-iteration cap (off-diagonal {:e})",
            MAX_QR_ITERATIONS,
            off.as_f64()
        );
    }

    let mut values: Vec<T> = (0..ak.nrows()).map(|i| ak[(i, i)]).collect();
    values.sort_by(|x, y| y.partial_cmp(x).unwrap_or(Ordering::Equal));
    Ok(values)
}

/// Subtract from `v` its components along the orthonormal vectors `basis`.
fn project_out<T: FloatScalar>(v: &mut DynVector<T>, basis: &[DynVector<T>]) {
    for u in basis {
        let c = u.dot(v);
        for (x, &y) in v.as_mut_slice().iter_mut().zip(u.iter()) {
            *x = *x - c * y;
        }
    }
}

/// Unit start vector orthogonal to `basis`.
///
/// Tries the random draw first, then whichever coordinate axis keeps the most
/// of its length after projection.
fn start_vector<T: FloatScalar, R: Rng>(
    n: usize,
    basis: &[DynVector<T>],
    rng: &mut R,
) -> DynVector<T> {
    let floor = T::epsilon().sqrt();
    let mut v = DynVector::from_vec(
        (0..n)
            .map(|_| T::from_f64(rng.random_range(-1.0..1.0)))
            .collect(),
    );
    project_out(&mut v, basis);
    if v.norm() > floor {
        return v.normalize();
    }

    let mut best = DynVector::unit(n, 0);
    let mut best_norm = T::zero();
    for k in 0..n {
        let mut e = DynVector::unit(n, k);
        project_out(&mut e, basis);
        let norm = e.norm();
        if norm > best_norm {
            best = e;
            best_norm = norm;
        }
    }
    best.normalize()
}

/// Eigenvector for `eigenvalue` by power iteration on the shifted inverse
/// `(A - mu*I)^-1`, with `mu` a small offset from the eigenvalue.
///
/// Plain power iteration on `A - λI` would converge to the eigenvalue
/// farthest from `λ`; the resolvent instead makes the eigenvalue nearest `mu`
/// dominant.
///
/// Starts from a random vector drawn from `rng`, runs [`POWER_ITERATIONS`]
/// steps with renormalization, and fixes the sign so the largest-magnitude
/// component is positive. The offset is widened tenfold whenever the
/// shifted matrix is numerically singular.
///
/// Every iterate is kept orthogonal to the unit vectors in `found`, the
/// eigenvectors already computed for the same eigenvalue. For a repeated
/// eigenvalue of a symmetric matrix this yields an orthonormal basis of the
/// eigenspace. `found` must be orthonormal.
pub fn shifted_power_iteration<T: FloatScalar, R: Rng>(
    a: &DynMatrix<T>,
    eigenvalue: T,
    found: &[DynVector<T>],
    rng: &mut R,
) -> Result<DynVector<T>> {
    ensure_square(a)?;
    let n = a.nrows();
    if n == 0 {
        return Ok(DynVector::from_vec(Vec::new()));
    }
    if let Some(u) = found.iter().find(|u| u.len() != n) {
        return Err(LinalgError::DimensionMismatch {
            expected: n,
            got: u.len(),
        });
    }

    let mut v = start_vector(n, found, rng);

    let scale = a.frobenius_norm().max(eigenvalue.abs()).max(T::one());
    let ten = T::from_f64(10.0);
    let mut delta = scale * T::epsilon().sqrt();

    let mut lu = None;
    for _ in 0..MAX_SHIFT_ATTEMPTS {
        let mu = eigenvalue + delta;
        let mut shifted = a.clone();
        for i in 0..n {
            shifted[(i, i)] = shifted[(i, i)] - mu;
        }
        match LuDecomposition::new(&shifted) {
            Ok(f) => {
                lu = Some(f);
                break;
            }
            Err(LinalgError::Singular) => delta = delta * ten,
            Err(e) => return Err(e),
        }
    }

    let Some(lu) = lu else {
        log::warn!(
            "shifted matrix singular near eigenvalue {:e}, returning start vector",
            eigenvalue.as_f64()
        );
        return Ok(fix_sign(v));
    };

    for _ in 0..POWER_ITERATIONS {
        let mut w = lu.solve(&v)?;
        project_out(&mut w, found);
        let w = w.normalize();
        if w.norm() == T::zero() || w.iter().any(|x| !x.is_finite()) {
            break;
        }
        v = w;
    }

    Ok(fix_sign(v))
}

/// Flip `v` so its largest-magnitude component is positive.
fn fix_sign<T: FloatScalar>(mut v: DynVector<T>) -> DynVector<T> {
    let mut pivot = T::zero();
    for &x in v.iter() {
        if x.abs() > pivot.abs() {
            pivot = x;
        }
    }
    if pivot < T::zero() {
        for x in v.as_mut_slice() {
            *x = -*x;
        }
    }
    v
}

/// Eigen decomposition of a square matrix with real eigenvalues.
///
/// Eigenvalues come from [`qr_iteration`] (sorted descending); column `i` of
/// [`eigenvectors`](Self::eigenvectors) is the unit eigenvector paired with
/// eigenvalue `i`, computed by [`shifted_power_iteration`].
/// Eigenvectors of eigenvalues within [`CLUSTER_TOLERANCE`] of each other are
/// orthogonalized, so a symmetric matrix with a repeated eigenvalue gets an
/// orthonormal eigenbasis. A defective matrix has no such basis; the extra
/// vectors then only complete the span.
///
/// The start vectors are random: use [`with_rng`](Self::with_rng) with a
/// seeded generator for reproducible eigenvector signs and rounding.
///
/// # Example
///
/// ```
/// use matsolve::DynMatrix;
/// use matsolve::linalg::EigenDecomposition;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let a = DynMatrix::from_rows(2, 2, &[2.0_f64, 1.0, 1.0, 2.0]);
/// let mut rng = StdRng::seed_from_u64(7);
/// let eig = EigenDecomposition::with_rng(&a, &mut rng).unwrap();
///
/// assert!((eig.eigenvalues()[0] - 3.0).abs() < 1e-9);
/// let v = eig.eigenvector(0);
/// let s = 1.0 / 2.0_f64.sqrt();
/// assert!((v[0] - s).abs() < 1e-9 && (v[1] - s).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct EigenDecomposition<T> {
    values: Vec<T>,
    vectors: DynMatrix<T>,
}

impl<T: FloatScalar> EigenDecomposition<T> {
    /// Decompose using the thread-local generator for start vectors.
    pub fn new(a: &impl MatrixRef<T>) -> Result<Self> {
        Self::with_rng(a, &mut rand::rng())
    }

    /// Decompose drawing start vectors from `rng`.
    pub fn with_rng<R: Rng>(a: &impl MatrixRef<T>, rng: &mut R) -> Result<Self> {
        Self::with_algorithm(a, EigenAlgorithm::SimplifiedPowerIteration, rng)
    }

    /// Decompose with an explicit algorithm variant.
    ///
    /// Unsupported variants fail with [`LinalgError::Unsupported`] before the
    /// input is inspected.
    pub fn with_algorithm<R: Rng>(
        a: &impl MatrixRef<T>,
        algorithm: EigenAlgorithm,
        rng: &mut R,
    ) -> Result<Self> {
        if !algorithm.is_supported() {
            return Err(LinalgError::Unsupported {
                algorithm: algorithm.name(),
            });
        }
        ensure_square(a)?;

        let a = DynMatrix::from_matrix_ref(a);
        let n = a.nrows();
        let values = qr_iteration(&a)?;

        let tol = T::from_f64(CLUSTER_TOLERANCE);
        let mut vectors = DynMatrix::zeros(n, n, T::zero());
        let mut computed: Vec<DynVector<T>> = Vec::with_capacity(n);
        for (i, &lambda) in values.iter().enumerate() {
            let radius = tol * lambda.abs().max(T::one());
            let cluster: Vec<DynVector<T>> = values[..i]
                .iter()
                .zip(computed.iter())
                .filter(|(mu, _)| (**mu - lambda).abs() <= radius)
                .map(|(_, u)| u.clone())
                .collect();
            let v = shifted_power_iteration(&a, lambda, &cluster, rng)?;
            vectors.set_col(i, v.as_slice());
            computed.push(v);
        }

        Ok(Self { values, vectors })
    }

    /// Eigenvalues, sorted descending.
    #[inline]
    pub fn eigenvalues(&self) -> &[T] {
        &self.values
    }

    /// Eigenvectors as columns, in eigenvalue order.
    #[inline]
    pub fn eigenvectors(&self) -> &DynMatrix<T> {
        &self.vectors
    }

    /// The `i`-th eigenvector. Panics if `i` is out of range.
    pub fn eigenvector(&self, i: usize) -> DynVector<T> {
        self.vectors.col(i)
    }

    /// Largest eigenvalue magnitude, `max |λ_i|` (zero for an empty matrix).
    pub fn spectral_radius(&self) -> T {
        self.values
            .iter()
            .fold(T::zero(), |acc, &l| if l.abs() > acc { l.abs() } else { acc })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn check_pairs(a: &DynMatrix<f64>, eig: &EigenDecomposition<f64>, tol: f64) {
        for (i, &lambda) in eig.eigenvalues().iter().enumerate() {
            let v = eig.eigenvector(i);
            assert!((v.norm() - 1.0).abs() < 1e-12, "eigenvector {} not unit", i);
            let av = a.mul_vec(&v);
            for k in 0..v.len() {
                assert!(
                    (av[k] - lambda * v[k]).abs() < tol,
                    "A v != λ v for pair {} component {}: {} vs {}",
                    i,
                    k,
                    av[k],
                    lambda * v[k]
                );
            }
        }
    }

    #[test]
    fn diagonal_is_exact() {
        let a = DynMatrix::from_diag(&[3.0_f64, 1.0, 2.0]);
        let eig = EigenDecomposition::with_rng(&a, &mut rng()).unwrap();
        assert_eq!(eig.eigenvalues(), &[3.0, 2.0, 1.0]);

        // eigenvector i points along the axis holding eigenvalue i
        let axes = [0, 2, 1];
        for (i, &axis) in axes.iter().enumerate() {
            let v = eig.eigenvector(i);
            assert!((v[axis] - 1.0).abs() < 1e-9, "eigenvector {} = {:?}", i, v);
        }
    }

    #[test]
    fn symmetric_3x3_pairs() {
        let a = DynMatrix::from_rows(3, 3, &[4.0, 1.0, 0.5, 1.0, 3.0, 0.2, 0.5, 0.2, 1.0]);
        let eig = EigenDecomposition::with_rng(&a, &mut rng()).unwrap();

        let values = eig.eigenvalues();
        assert!(values.windows(2).all(|w| w[0] >= w[1]));
        let sum: f64 = values.iter().sum();
        assert!((sum - a.trace()).abs() < 1e-9);

        check_pairs(&a, &eig, 1e-8);
    }

    #[test]
    fn nonsymmetric_real_spectrum() {
        // upper triangular: eigenvalues on the diagonal
        let a = DynMatrix::from_rows(3, 3, &[5.0, 2.0, 1.0, 0.0, 3.0, 4.0, 0.0, 0.0, -1.0]);
        let eig = EigenDecomposition::with_rng(&a, &mut rng()).unwrap();
        assert_eq!(eig.eigenvalues(), &[5.0, 3.0, -1.0]);
        check_pairs(&a, &eig, 1e-8);
        assert_eq!(eig.spectral_radius(), 5.0);
    }

    #[test]
    fn singular_matrix_zero_eigenvalue() {
        let a = DynMatrix::from_rows(2, 2, &[5.0_f64, 10.0, 10.0, 20.0]);
        let eig = EigenDecomposition::with_rng(&a, &mut rng()).unwrap();
        assert!((eig.eigenvalues()[0] - 25.0).abs() < 1e-9);
        assert!(eig.eigenvalues()[1].abs() < 1e-9);
        check_pairs(&a, &eig, 1e-7);
    }

    #[test]
    fn sign_convention() {
        let a = DynMatrix::from_rows(2, 2, &[2.0_f64, -1.0, -1.0, 2.0]);
        let eig = EigenDecomposition::with_rng(&a, &mut rng()).unwrap();
        for i in 0..2 {
            let v = eig.eigenvector(i);
            let largest = v
                .iter()
                .copied()
                .fold(0.0_f64, |acc, x| if x.abs() > acc.abs() { x } else { acc });
            assert!(largest > 0.0);
        }
    }

    #[test]
    fn same_seed_same_result() {
        let a = DynMatrix::from_rows(3, 3, &[2.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 2.0]);
        let first = EigenDecomposition::with_rng(&a, &mut rng()).unwrap();
        let second = EigenDecomposition::with_rng(&a, &mut rng()).unwrap();
        assert_eq!(first.eigenvalues(), second.eigenvalues());
        assert_eq!(first.eigenvectors(), second.eigenvectors());
    }

    #[test]
    fn unsupported_variant_fails_first() {
        // rectangular input: the variant check comes before the shape check
        let a = DynMatrix::zeros(2, 3, 0.0_f64);
        assert!(!EigenAlgorithm::InverseIteration.is_supported());
        assert!(matches!(
            EigenDecomposition::with_algorithm(&a, EigenAlgorithm::InverseIteration, &mut rng()),
            Err(LinalgError::Unsupported { .. })
        ));
    }

    #[test]
    fn rejects_rectangular() {
        let a = DynMatrix::zeros(2, 3, 0.0_f64);
        assert_eq!(
            EigenDecomposition::with_rng(&a, &mut rng()).unwrap_err(),
            LinalgError::NotSquare { rows: 2, cols: 3 }
        );
    }

    #[test]
    fn empty_matrix() {
        let a = DynMatrix::zeros(0, 0, 0.0_f64);
        let eig = EigenDecomposition::with_rng(&a, &mut rng()).unwrap();
        assert!(eig.eigenvalues().is_empty());
        assert_eq!(eig.spectral_radius(), 0.0);
    }

    fn assert_orthonormal(m: &DynMatrix<f64>, tol: f64) {
        let gram = m.transpose() * m;
        let id = DynMatrix::eye(m.ncols(), 0.0);
        assert!(
            gram.max_abs_diff(&id) < tol,
            "columns not orthonormal:\n{}",
            gram
        );
    }

    #[test]
    fn repeated_eigenvalue_identity() {
        let a = DynMatrix::<f64>::eye(3, 0.0);
        let eig = EigenDecomposition::with_rng(&a, &mut rng()).unwrap();
        assert_eq!(eig.eigenvalues(), &[1.0, 1.0, 1.0]);
        assert_orthonormal(eig.eigenvectors(), 1e-10);
    }

    #[test]
    fn repeated_eigenvalue_symmetric() {
        // eigenvalues 4, 4, 1: the 4-eigenspace is the plane orthogonal to (1, 1, 1)
        let a = DynMatrix::from_rows(3, 3, &[3.0_f64, -1.0, -1.0, -1.0, 3.0, -1.0, -1.0, -1.0, 3.0]);
        let eig = EigenDecomposition::with_rng(&a, &mut rng()).unwrap();
        let values = eig.eigenvalues();
        assert!((values[0] - 4.0).abs() < 1e-9 && (values[1] - 4.0).abs() < 1e-9);
        assert!((values[2] - 1.0).abs() < 1e-9);
        check_pairs(&a, &eig, 1e-7);
        assert_orthonormal(eig.eigenvectors(), 1e-8);
    }

    #[test]
    fn power_iteration_respects_found_vectors() {
        let a = DynMatrix::<f64>::eye(2, 0.0);
        let e0 = DynVector::unit(2, 0);
        let v = shifted_power_iteration(&a, 1.0, &[e0], &mut rng()).unwrap();
        assert!(v[0].abs() < 1e-12);
        assert!((v[1] - 1.0).abs() < 1e-12);

        let short = DynVector::unit(3, 0);
        assert_eq!(
            shifted_power_iteration(&a, 1.0, &[short], &mut rng()).unwrap_err(),
            LinalgError::DimensionMismatch { expected: 2, got: 3 }
        );
    }

    #[test]
    fn default_rng_entry_point() {
        let a = DynMatrix::from_diag(&[1.0_f64, 4.0]);
        let eig = EigenDecomposition::new(&a).unwrap();
        assert_eq!(eig.eigenvalues(), &[4.0, 1.0]);
    }
}
