use crate::dynmatrix::DynVector;
use crate::linalg::{LinalgError, Result};
use crate::traits::{FloatScalar, LinearOperator};

use super::{axpy, dot, norm, not_converged, prepare, IterativeResult, IterativeSettings};

/// Solve `A*x = b` by the conjugate gradient method.
///
/// `A` must be symmetric positive definite; this is not checked, but a
/// search direction with `p^T*A*p <= 0` aborts with
/// [`LinalgError::Breakdown`].
///
/// # Example
///
/// ```
/// use matsolve::{DynMatrix, DynVector};
/// use matsolve::iterative::{conjugate_gradient, IterativeSettings};
///
/// let a = DynMatrix::from_rows(2, 2, &[4.0_f64, 1.0, 1.0, 3.0]);
/// let b = DynVector::from_slice(&[1.0, 2.0]);
/// let res = conjugate_gradient(&a, &b, &IterativeSettings::default()).unwrap();
/// assert!((res.x[0] - 1.0 / 11.0).abs() < 1e-9);
/// assert!((res.x[1] - 7.0 / 11.0).abs() < 1e-9);
/// assert!(res.iterations <= 2);
/// ```
pub fn conjugate_gradient<T: FloatScalar>(
    a: &impl LinearOperator<T>,
    b: &DynVector<T>,
    settings: &IterativeSettings<T>,
) -> Result<IterativeResult<T>> {
    if let Some(trivial) = prepare(a, b)? {
        return Ok(trivial);
    }

    let n = b.len();
    let threshold = settings.tolerance * norm(b.as_slice());

    let mut x = vec![T::zero(); n];
    let mut r = b.as_slice().to_vec();
    let mut p = r.clone();
    let mut ap = vec![T::zero(); n];
    let mut rr = dot(&r, &r);

    for iter in 0..settings.max_iter {
        a.apply(&p, &mut ap);
        let pap = dot(&p, &ap);
        if !(pap > T::zero()) {
            return Err(LinalgError::Breakdown {
                method: "conjugate gradient",
            });
        }

        let alpha = rr / pap;
        axpy(alpha, &p, &mut x);
        axpy(-alpha, &ap, &mut r);

        let rr_new = dot(&r, &r);
        let res = rr_new.sqrt();
        log::trace!("cg iteration {}: residual {:e}", iter + 1, res.as_f64());
        if res <= threshold {
            log::debug!("cg converged in {} iterations", iter + 1);
            return Ok(IterativeResult {
                x: DynVector::from_vec(x),
                iterations: iter + 1,
                residual_norm: res,
            });
        }

        let beta = rr_new / rr;
        for (pi, &ri) in p.iter_mut().zip(&r) {
            *pi = ri + beta * *pi;
        }
        rr = rr_new;
    }

    Err(not_converged(settings.max_iter, rr.sqrt()))
}
