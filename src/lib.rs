//! # matsolve
//!
//! Adaptive dense linear-algebra solver. Inspects a coefficient matrix, picks
//! a decomposition (or a Krylov method for large sparse systems), and solves
//! `A*x = b`, falling back from Cholesky to LU when a symmetric matrix turns
//! out not to be positive definite.
//!
//! ## Quick start
//!
//! ```
//! use matsolve::{DynMatrix, DynVector, MatrixSolver, Strategy};
//!
//! let a = DynMatrix::from_nested(&[[4.0_f64, 1.0], [1.0, 3.0]]);
//! let b = DynVector::from_slice(&[1.0, 2.0]);
//!
//! let solver = MatrixSolver::<f64>::new();
//! assert_eq!(solver.recommend(&a), Strategy::Cholesky);
//!
//! let x = solver.solve(&a, &b).unwrap(); // x = [1/11, 7/11]
//! assert!((x[0] - 0.0909).abs() < 1e-4);
//! assert!((x[1] - 0.6364).abs() < 1e-4);
//! ```
//!
//! ## Modules
//!
//! - [`dynmatrix`]: Heap-allocated `DynMatrix<T>` with runtime dimensions,
//!   column-major `Vec<T>` storage. Implements [`MatrixRef`], [`MatrixMut`]
//!   and [`LinearOperator`], so every algorithm accepts it directly.
//!   [`DynVector<T>`] newtype for single-index vector access.
//!
//! - [`sparse`]: [`CsrMatrix<T>`] in compressed sparse row format. Reports
//!   its stored entry count, which routes large sparse systems to the Krylov
//!   solvers.
//!
//! - [`linalg`]: Cholesky (`A = LL^T`), LU (partial pivoting), QR
//!   (Gram–Schmidt), eigen decomposition (QR iteration and shifted power
//!   iteration) and SVD (through the eigen decomposition of `A^T A`). Shared
//!   [`LinalgError`] and the [`EPSILON`](linalg::EPSILON) tolerance.
//!
//! - [`iterative`]: Conjugate gradient, BiCGSTAB and restarted GMRES over
//!   any [`LinearOperator`].
//!
//! - [`solver`]: [`MatrixSolver`]: strategy recommendation, dispatch and the
//!   Cholesky-to-LU fallback.
//!
//! - [`traits`]: Element trait hierarchy:
//!   - [`Scalar`]: all matrix elements (`Copy + PartialEq + Debug + Zero + One + Num`)
//!   - [`FloatScalar`]: real floats (`Scalar + Float`), used by every algorithm
//!   - [`MatrixRef`] / [`MatrixMut`]: generic read/write access for algorithms
//!   - [`LinearOperator`]: `y = A*x`, all the Krylov solvers need
//!
//! ## Randomness
//!
//! Eigenvectors (and therefore SVD) start power iteration from random
//! vectors. The plain constructors draw from `rand::rng()`; the `with_rng`
//! constructors and [`SolverSettings::seed`](solver::SolverSettings::seed)
//! take a seedable generator for reproducible results.
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`] facade: strategy choices and
//! convergence at `debug`, the Cholesky-to-LU fallback and capped eigenvalue
//! iteration at `warn`, per-iteration residuals at `trace`. Install any
//! `log`-compatible logger to see them.

pub mod dynmatrix;
pub mod iterative;
pub mod linalg;
pub mod solver;
pub mod sparse;
pub mod traits;

pub use dynmatrix::{DynMatrix, DynVector};
pub use linalg::{
    CholeskyDecomposition, EigenDecomposition, LinalgError, LuDecomposition, QrDecomposition,
    SvdDecomposition,
};
pub use solver::{MatrixSolver, Solution, SolverSettings, Strategy};
pub use sparse::CsrMatrix;
pub use traits::{FloatScalar, LinearOperator, MatrixMut, MatrixRef, Scalar};
