//! Strategy selection and dispatch.
//!
//! [`MatrixSolver`] inspects a coefficient matrix, picks a [`Strategy`]
//! (or takes one from the caller), runs it, and returns `x` with `A*x ≈ b`.
//!
//! # Recommendation
//!
//! [`recommend`] evaluates, in order:
//!
//! 1. more than `1_000_000` elements, sparse storage and density below `0.1`:
//!    [`Strategy::ConjugateGradient`] if symmetric, else [`Strategy::Bicgstab`]
//! 2. non-square: [`Strategy::Qr`] if `rows > cols`, else [`Strategy::Svd`]
//! 3. symmetric within [`EPSILON`](crate::linalg::EPSILON): [`Strategy::Cholesky`]
//! 4. otherwise [`Strategy::Lu`]
//!
//! # Fallback
//!
//! Symmetry does not imply positive definiteness. When the Cholesky strategy
//! fails with [`LinalgError::NotPositiveDefinite`] the solver re-runs the
//! system through LU, logs a warning, and records the switch in
//! [`Solution::fallback`]. No other strategy falls back.
//!
//! ```
//! use matsolve::{DynMatrix, DynVector, MatrixSolver, Strategy};
//!
//! let a = DynMatrix::from_nested(&[[0.0_f64, 1.0], [1.0, 0.0]]);
//! let b = DynVector::from_slice(&[1.0, 1.0]);
//!
//! let solver = MatrixSolver::<f64>::new();
//! assert_eq!(solver.recommend(&a), Strategy::Cholesky);
//!
//! let sol = solver.solve_detailed(&a, &b, Strategy::Auto).unwrap();
//! assert_eq!(sol.strategy, Strategy::Lu);
//! assert!(sol.fallback.is_some());
//! assert!((sol.x[0] - 1.0).abs() < 1e-12 && (sol.x[1] - 1.0).abs() < 1e-12);
//! ```


use core::fmt;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::dynmatrix::DynVector;
use crate::iterative::{bicgstab, conjugate_gradient, gmres, IterativeSettings};
use crate::linalg::{
    ensure_len, epsilon, CholeskyDecomposition, LinalgError, LuDecomposition, QrDecomposition,
    Result, SvdDecomposition,
};
use crate::traits::{FloatScalar, LinearOperator, MatrixRef};

/// Solution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Pick one with [`recommend`].
    #[default]
    Auto,
    /// LU with partial pivoting.
    Lu,
    /// Cholesky, falling back to LU when not positive definite.
    Cholesky,
    /// Least squares via Gram–Schmidt QR.
    Qr,
    /// Minimum-norm least squares via SVD.
    Svd,
    /// Conjugate gradient (symmetric positive definite).
    ConjugateGradient,
    /// Stabilized biconjugate gradient.
    Bicgstab,
    /// Restarted GMRES.
    Gmres,
}

impl Strategy {
    /// Whether this is one of the Krylov methods.
    pub fn is_iterative(self) -> bool {
        matches!(
            self,
            Strategy::ConjugateGradient | Strategy::Bicgstab | Strategy::Gmres
        )
    }

    fn name(self) -> &'static str {
        match self {
            Strategy::Auto => "auto",
            Strategy::Lu => "lu",
            Strategy::Cholesky => "cholesky",
            Strategy::Qr => "qr",
            Strategy::Svd => "svd",
            Strategy::ConjugateGradient => "conjugate-gradient",
            Strategy::Bicgstab => "bicgstab",
            Strategy::Gmres => "gmres",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A strategy switch made by the solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fallback {
    /// Strategy that failed.
    pub from: Strategy,
    /// Strategy that produced the solution.
    pub to: Strategy,
    /// Error raised by `from`.
    pub cause: LinalgError,
}

/// Solution with dispatch diagnostics.
#[derive(Debug, Clone)]
pub struct Solution<T> {
    /// Solution vector.
    pub x: DynVector<T>,
    /// Strategy passed by the caller (possibly [`Strategy::Auto`]).
    pub requested: Strategy,
    /// Strategy that produced `x`.
    pub strategy: Strategy,
    /// Set when the solver had to switch strategy.
    pub fallback: Option<Fallback>,
    /// Iteration count for the Krylov strategies.
    pub iterations: Option<usize>,
}

/// Settings for [`MatrixSolver`].
#[derive(Debug, Clone, Copy)]
pub struct SolverSettings<T> {
    /// Settings passed to the Krylov solvers.
    pub iterative: IterativeSettings<T>,
    /// Element count (`rows * cols`) above which a sparse matrix is "large".
    pub large_matrix_elements: usize,
    /// Density (`nnz / (rows * cols)`) below which a large matrix is routed
    /// to a Krylov method.
    pub sparse_density: f64,
    /// Seed for the SVD strategy's eigenvector start vectors; `None` draws
    /// from the thread-local generator.
    pub seed: Option<u64>,
}

impl<T> Default for SolverSettings<T>
where
    IterativeSettings<T>: Default,
{
    fn default() -> Self {
        Self {
            iterative: IterativeSettings::default(),
            large_matrix_elements: 1_000_000,
            sparse_density: 0.1,
            seed: None,
        }
    }
}

// ── Diagnostics ─────────────────────────────────────────────────────

/// Whether `a` is square and `|a_ij - a_ji| <= EPSILON` for all `i < j`.
pub fn is_symmetric<T: FloatScalar>(a: &impl MatrixRef<T>) -> bool {
    let n = a.nrows();
    if n != a.ncols() {
        return false;
    }
    let eps = epsilon::<T>();
    for i in 0..n {
        for j in (i + 1)..n {
            if !((*a.get(i, j) - *a.get(j, i)).abs() <= eps) {
                return false;
            }
        }
    }
    true
}

/// Symmetric with a strictly positive diagonal.
///
/// A cheap necessary condition, not a proof: `[[1, 2], [2, 1]]` passes but is
/// indefinite. Never consulted by [`recommend`].
pub fn is_likely_positive_definite<T: FloatScalar>(a: &impl MatrixRef<T>) -> bool {
    is_symmetric(a) && (0..a.nrows()).all(|i| *a.get(i, i) > T::zero())
}

/// Recommend a strategy using the default thresholds.
///
/// ```
/// use matsolve::DynMatrix;
/// use matsolve::solver::recommend;
/// use matsolve::Strategy;
///
/// let tall = DynMatrix::zeros(3, 2, 0.0_f64);
/// assert_eq!(recommend(&tall), Strategy::Qr);
/// let general = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
/// assert_eq!(recommend(&general), Strategy::Lu);
/// ```
pub fn recommend<T: FloatScalar>(a: &impl MatrixRef<T>) -> Strategy {
    let defaults = SolverSettings::<f64>::default();
    recommend_with(a, defaults.large_matrix_elements, defaults.sparse_density)
}

fn recommend_with<T: FloatScalar>(
    a: &impl MatrixRef<T>,
    large_matrix_elements: usize,
    sparse_density: f64,
) -> Strategy {
    let rows = a.nrows();
    let cols = a.ncols();
    let elements = rows.saturating_mul(cols);

    if elements > large_matrix_elements {
        if let Some(nnz) = a.nnz() {
            let density = nnz as f64 / elements as f64;
            if density < sparse_density {
                return if is_symmetric(a) {
                    Strategy::ConjugateGradient
                } else {
                    Strategy::Bicgstab
                };
            }
        }
    }

    if rows != cols {
        return if rows > cols { Strategy::Qr } else { Strategy::Svd };
    }

    if is_symmetric(a) {
        Strategy::Cholesky
    } else {
        Strategy::Lu
    }
}

// ── MatrixSolver ────────────────────────────────────────────────────

/// Adaptive solver for `A*x = b`.
///
/// Holds only immutable settings; one instance can serve any number of
/// systems, from any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct MatrixSolver<T> {
    settings: SolverSettings<T>,
}

impl<T> Default for MatrixSolver<T>
where
    SolverSettings<T>: Default,
{
    fn default() -> Self {
        Self {
            settings: SolverSettings::default(),
        }
    }
}

impl<T: FloatScalar> MatrixSolver<T>
where
    SolverSettings<T>: Default,
{
    /// Solver with default settings.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: FloatScalar> MatrixSolver<T> {
    /// Solver with explicit settings.
    pub fn with_settings(settings: SolverSettings<T>) -> Self {
        Self { settings }
    }

    /// The active settings.
    pub fn settings(&self) -> &SolverSettings<T> {
        &self.settings
    }

    /// Recommend a strategy using this solver's thresholds.
    pub fn recommend(&self, a: &impl MatrixRef<T>) -> Strategy {
        recommend_with(
            a,
            self.settings.large_matrix_elements,
            self.settings.sparse_density,
        )
    }

    /// Solve with an automatically chosen strategy.
    pub fn solve<A: LinearOperator<T>>(&self, a: &A, b: &DynVector<T>) -> Result<DynVector<T>> {
        self.solve_with(a, b, Strategy::Auto)
    }

    /// Solve with the given strategy.
    pub fn solve_with<A: LinearOperator<T>>(
        &self,
        a: &A,
        b: &DynVector<T>,
        strategy: Strategy,
    ) -> Result<DynVector<T>> {
        self.solve_detailed(a, b, strategy).map(|sol| sol.x)
    }

    /// Solve with the given strategy and report what was actually run.
    ///
    /// Fails with [`LinalgError::DimensionMismatch`] before dispatch when
    /// `b.len() != a.nrows()`.
    pub fn solve_detailed<A: LinearOperator<T>>(
        &self,
        a: &A,
        b: &DynVector<T>,
        strategy: Strategy,
    ) -> Result<Solution<T>> {
        ensure_len(a.nrows(), b.len())?;

        let resolved = match strategy {
            Strategy::Auto => {
                let s = self.recommend(a);
                log::debug!(
                    "recommended {} for {}x{} matrix (nnz {:?})",
                    s,
                    a.nrows(),
                    a.ncols(),
                    a.nnz()
                );
                s
            }
            s => s,
        };
        log::debug!("dispatching {}", resolved);

        let mut solution = Solution {
            x: DynVector::zeros(0, T::zero()),
            requested: strategy,
            strategy: resolved,
            fallback: None,
            iterations: None,
        };

        match resolved {
            Strategy::Cholesky => match self.run(a, b, Strategy::Cholesky) {
                Ok((x, _)) => solution.x = x,
                Err(cause @ LinalgError::NotPositiveDefinite { .. }) => {
                    log::warn!("cholesky failed ({}), falling back to lu", cause);
                    let (x, _) = self.run(a, b, Strategy::Lu)?;
                    solution.x = x;
                    solution.strategy = Strategy::Lu;
                    solution.fallback = Some(Fallback {
                        from: Strategy::Cholesky,
                        to: Strategy::Lu,
                        cause,
                    });
                }
                Err(e) => return Err(e),
            },
            s => {
                let (x, iterations) = self.run(a, b, s)?;
                solution.x = x;
                solution.iterations = iterations;
            }
        }

        Ok(solution)
    }

    /// Run one concrete strategy, without any fallback.
    fn run<A: LinearOperator<T>>(
        &self,
        a: &A,
        b: &DynVector<T>,
        strategy: Strategy,
    ) -> Result<(DynVector<T>, Option<usize>)> {
        let iterative = &self.settings.iterative;
        match strategy {
            Strategy::Lu => Ok((LuDecomposition::new(a)?.solve(b)?, None)),
            Strategy::Cholesky => Ok((CholeskyDecomposition::new(a)?.solve(b)?, None)),
            Strategy::Qr => Ok((QrDecomposition::new(a)?.solve_least_squares(b)?, None)),
            Strategy::Svd => {
                let svd = match self.settings.seed {
                    Some(seed) => SvdDecomposition::with_rng(a, &mut StdRng::seed_from_u64(seed))?,
                    None => SvdDecomposition::new(a)?,
                };
                Ok((svd.solve(b)?, None))
            }
            Strategy::ConjugateGradient => {
                let res = conjugate_gradient(a, b, iterative)?;
                Ok((res.x, Some(res.iterations)))
            }
            Strategy::Bicgstab => {
                let res = bicgstab(a, b, iterative)?;
                Ok((res.x, Some(res.iterations)))
            }
            Strategy::Gmres => {
                let res = gmres(a, b, iterative)?;
                Ok((res.x, Some(res.iterations)))
            }
            // `solve_detailed` resolves Auto before calling `run`
            Strategy::Auto => self.run(a, b, self.recommend(a)),
        }
    }
}
