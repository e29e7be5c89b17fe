use crate::dynmatrix::DynVector;
use crate::linalg::{LinalgError, Result};
use crate::traits::{FloatScalar, LinearOperator};

use super::{axpy, dot, norm, not_converged, prepare, IterativeResult, IterativeSettings};

/// `r = b - A*x`, returning `||r||`.
fn residual<T: FloatScalar>(a: &impl LinearOperator<T>, b: &[T], x: &[T], r: &mut [T]) -> T {
    a.apply(x, r);
    for (ri, &bi) in r.iter_mut().zip(b) {
        *ri = bi - *ri;
    }
    norm(r)
}

/// Solve `A*x = b` by restarted GMRES(m), `m = settings.restart`.
///
/// Each cycle builds an orthonormal Krylov basis by Arnoldi with modified
/// Gram–Schmidt and reduces the Hessenberg least-squares problem with Givens
/// rotations. `settings.max_iter` bounds the total number of inner steps
/// across all restarts.
///
/// # Example
///
/// ```
/// use matsolve::{DynMatrix, DynVector};
/// use matsolve::iterative::{gmres, IterativeSettings};
///
/// let a = DynMatrix::from_rows(3, 3, &[2.0_f64, 1.0, 0.0, 0.0, 3.0, 1.0, 1.0, 0.0, 4.0]);
/// let b = DynVector::from_slice(&[3.0, 4.0, 5.0]);
/// let res = gmres(&a, &b, &IterativeSettings::default()).unwrap();
/// for &xi in res.x.iter() {
///     assert!((xi - 1.0).abs() < 1e-8);
/// }
/// ```
pub fn gmres<T: FloatScalar>(
    a: &impl LinearOperator<T>,
    b: &DynVector<T>,
    settings: &IterativeSettings<T>,
) -> Result<IterativeResult<T>> {
    if let Some(trivial) = prepare(a, b)? {
        return Ok(trivial);
    }

    let n = b.len();
    let m = settings.restart.clamp(1, n.max(1));
    let b = b.as_slice();
    let threshold = settings.tolerance * norm(b);

    let mut x = vec![T::zero(); n];
    let mut r = vec![T::zero(); n];
    let mut w = vec![T::zero(); n];
    let mut total = 0usize;

    let mut beta = residual(a, b, &x, &mut r);

    while total < settings.max_iter {
        let mut basis: Vec<Vec<T>> = Vec::with_capacity(m + 1);
        basis.push(r.iter().map(|&ri| ri / beta).collect());

        let mut h = vec![vec![T::zero(); m]; m + 1];
        let mut cs = vec![T::zero(); m];
        let mut sn = vec![T::zero(); m];
        let mut g = vec![T::zero(); m + 1];
        g[0] = beta;

        let mut k = 0;
        for j in 0..m {
            if total >= settings.max_iter {
                break;
            }
            a.apply(&basis[j], &mut w);
            total += 1;

            // Arnoldi, modified Gram–Schmidt
            for (i, vi) in basis.iter().enumerate() {
                let hij = dot(&w, vi);
                h[i][j] = hij;
                axpy(-hij, vi, &mut w);
            }
            let wnorm = norm(&w);
            h[j + 1][j] = wnorm;

            for i in 0..j {
                let t = cs[i] * h[i][j] + sn[i] * h[i + 1][j];
                h[i + 1][j] = -sn[i] * h[i][j] + cs[i] * h[i + 1][j];
                h[i][j] = t;
            }

            let d = h[j][j].hypot(h[j + 1][j]);
            if d == T::zero() {
                return Err(LinalgError::Breakdown { method: "gmres" });
            }
            cs[j] = h[j][j] / d;
            sn[j] = h[j + 1][j] / d;
            h[j][j] = d;
            h[j + 1][j] = T::zero();
            g[j + 1] = -sn[j] * g[j];
            g[j] = cs[j] * g[j];

            k = j + 1;
            let estimate = g[j + 1].abs();
            log::trace!("gmres step {}: residual estimate {:e}", total, estimate.as_f64());

            // Happy breakdown: the Krylov space is invariant, the solution is exact
            if estimate <= threshold || wnorm == T::zero() {
                break;
            }
            basis.push(w.iter().map(|&wi| wi / wnorm).collect());
        }

        // Back-substitute the k x k triangular system H y = g
        let mut y = vec![T::zero(); k];
        for i in (0..k).rev() {
            let mut sum = g[i];
            for l in (i + 1)..k {
                sum = sum - h[i][l] * y[l];
            }
            y[i] = sum / h[i][i];
        }
        for (yi, vi) in y.iter().zip(&basis) {
            axpy(*yi, vi, &mut x);
        }

        beta = residual(a, b, &x, &mut r);
        if beta <= threshold {
            log::debug!("gmres converged in {} steps", total);
            return Ok(IterativeResult {
                x: DynVector::from_vec(x),
                iterations: total,
                residual_norm: beta,
            });
        }
        log::trace!("gmres restart after {} steps, residual {:e}", total, beta.as_f64());
    }

    Err(not_converged(total, beta))
}
