use crate::dynmatrix::DynVector;
use crate::linalg::{LinalgError, Result};
use crate::traits::{FloatScalar, LinearOperator};

use super::{axpy, dot, norm, not_converged, prepare, IterativeResult, IterativeSettings};

fn breakdown() -> LinalgError {
    LinalgError::Breakdown { method: "bicgstab" }
}

/// Solve `A*x = b` by the stabilized biconjugate gradient method.
///
/// Suitable for general (non-symmetric) square systems. The shadow residual
/// is fixed to the initial residual `b`. Fails with
/// [`LinalgError::Breakdown`] when `rho`, `r_hat^T*v` or `t^T*t` vanish.
///
/// # Example
///
/// ```
/// use matsolve::{DynMatrix, DynVector};
/// use matsolve::iterative::{bicgstab, IterativeSettings};
///
/// let a = DynMatrix::from_rows(2, 2, &[3.0_f64, 1.0, -1.0, 2.0]);
/// let b = DynVector::from_slice(&[5.0, 3.0]);
/// let res = bicgstab(&a, &b, &IterativeSettings::default()).unwrap();
/// assert!((res.x[0] - 1.0).abs() < 1e-8);
/// assert!((res.x[1] - 2.0).abs() < 1e-8);
/// ```
pub fn bicgstab<T: FloatScalar>(
    a: &impl LinearOperator<T>,
    b: &DynVector<T>,
    settings: &IterativeSettings<T>,
) -> Result<IterativeResult<T>> {
    if let Some(trivial) = prepare(a, b)? {
        return Ok(trivial);
    }

    let n = b.len();
    let bnorm = norm(b.as_slice());
    let threshold = settings.tolerance * bnorm;

    let mut x = vec![T::zero(); n];
    let mut r = b.as_slice().to_vec();
    let r_hat = r.clone();
    let mut p = vec![T::zero(); n];
    let mut v = vec![T::zero(); n];
    let mut s = vec![T::zero(); n];
    let mut t = vec![T::zero(); n];

    let mut rho = T::one();
    let mut alpha = T::one();
    let mut omega = T::one();
    let mut res = bnorm;

    for iter in 0..settings.max_iter {
        let rho_new = dot(&r_hat, &r);
        if rho_new == T::zero() || !rho_new.is_finite() {
            return Err(breakdown());
        }

        if iter == 0 {
            p.copy_from_slice(&r);
        } else {
            let beta = (rho_new / rho) * (alpha / omega);
            for i in 0..n {
                p[i] = r[i] + beta * (p[i] - omega * v[i]);
            }
        }
        rho = rho_new;

        a.apply(&p, &mut v);
        let rv = dot(&r_hat, &v);
        if rv == T::zero() {
            return Err(breakdown());
        }
        alpha = rho / rv;

        for i in 0..n {
            s[i] = r[i] - alpha * v[i];
        }
        let snorm = norm(&s);
        if snorm <= threshold {
            axpy(alpha, &p, &mut x);
            log::debug!("bicgstab converged in {} iterations (half step)", iter + 1);
            return Ok(IterativeResult {
                x: DynVector::from_vec(x),
                iterations: iter + 1,
                residual_norm: snorm,
            });
        }

        a.apply(&s, &mut t);
        let tt = dot(&t, &t);
        if tt == T::zero() {
            return Err(breakdown());
        }
        omega = dot(&t, &s) / tt;

        axpy(alpha, &p, &mut x);
        axpy(omega, &s, &mut x);
        for i in 0..n {
            r[i] = s[i] - omega * t[i];
        }

        res = norm(&r);
        log::trace!("bicgstab iteration {}: residual {:e}", iter + 1, res.as_f64());
        if res <= threshold {
            log::debug!("bicgstab converged in {} iterations", iter + 1);
            return Ok(IterativeResult {
                x: DynVector::from_vec(x),
                iterations: iter + 1,
                residual_norm: res,
            });
        }
        if omega == T::zero() {
            return Err(breakdown());
        }
    }

    Err(not_converged(settings.max_iter, res))
}
