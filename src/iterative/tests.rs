use super::*;
use crate::{CsrMatrix, DynMatrix};

/// 1-D Poisson matrix: tridiag(-1, 2, -1), SPD.
fn laplacian(n: usize) -> CsrMatrix<f64> {
    let mut triplets = Vec::new();
    for i in 0..n {
        triplets.push((i, i, 2.0));
        if i > 0 {
            triplets.push((i, i - 1, -1.0));
        }
        if i + 1 < n {
            triplets.push((i, i + 1, -1.0));
        }
    }
    CsrMatrix::from_triplets(n, n, &triplets).unwrap()
}

/// Non-symmetric tridiag(-1, 4, -2) with a positive-definite symmetric part.
fn convection(n: usize) -> CsrMatrix<f64> {
    let mut triplets = Vec::new();
    for i in 0..n {
        triplets.push((i, i, 4.0));
        if i > 0 {
            triplets.push((i, i - 1, -1.0));
        }
        if i + 1 < n {
            triplets.push((i, i + 1, -2.0));
        }
    }
    CsrMatrix::from_triplets(n, n, &triplets).unwrap()
}

fn ones(n: usize) -> DynVector<f64> {
    DynVector::from_vec(vec![1.0; n])
}

fn assert_residual(a: &impl LinearOperator<f64>, x: &DynVector<f64>, b: &DynVector<f64>, tol: f64) {
    let mut ax = vec![0.0; b.len()];
    a.apply(x.as_slice(), &mut ax);
    let r: Vec<f64> = ax.iter().zip(b.iter()).map(|(p, q)| p - q).collect();
    let rel = norm(&r) / norm(b.as_slice());
    assert!(rel < tol, "relative residual {:e}", rel);
}

// ── Conjugate gradient ──────────────────────────────────────────────

#[test]
fn cg_laplacian() {
    let a = laplacian(50);
    let b = ones(50);
    let res = conjugate_gradient(&a, &b, &IterativeSettings::default()).unwrap();
    assert!(res.iterations <= 60, "took {} iterations", res.iterations);
    assert!(res.residual_norm <= 1e-10 * norm(b.as_slice()));
    assert_residual(&a, &res.x, &b, 1e-9);

    // Exact solution of the discrete Poisson problem: x_i = (i+1)(n-i)/2
    for i in 0..50 {
        let expected = ((i + 1) * (50 - i)) as f64 / 2.0;
        assert!((res.x[i] - expected).abs() < 1e-6, "x[{}] = {}", i, res.x[i]);
    }
}

#[test]
fn cg_dense_matches_sparse() {
    let sparse = laplacian(10);
    let dense = sparse.to_dense();
    let b = ones(10);
    let s = conjugate_gradient(&sparse, &b, &IterativeSettings::default()).unwrap();
    let d = conjugate_gradient(&dense, &b, &IterativeSettings::default()).unwrap();
    assert_eq!(s.iterations, d.iterations);
    for i in 0..10 {
        assert!((s.x[i] - d.x[i]).abs() < 1e-12);
    }
}

#[test]
fn cg_indefinite_breaks_down() {
    let a = DynMatrix::from_diag(&[1.0_f64, -1.0]);
    let err = conjugate_gradient(&a, &ones(2), &IterativeSettings::default()).unwrap_err();
    assert!(matches!(err, LinalgError::Breakdown { .. }));
}

#[test]
fn cg_iteration_cap() {
    let settings = IterativeSettings {
        max_iter: 3,
        ..IterativeSettings::default()
    };
    let err = conjugate_gradient(&laplacian(50), &ones(50), &settings).unwrap_err();
    match err {
        LinalgError::ConvergenceFailure { iterations, residual } => {
            assert_eq!(iterations, 3);
            assert!(residual > 0.0);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

// ── BiCGSTAB ────────────────────────────────────────────────────────

#[test]
fn bicgstab_nonsymmetric() {
    let a = convection(40);
    let b = ones(40);
    let res = bicgstab(&a, &b, &IterativeSettings::default()).unwrap();
    assert!(res.iterations < 100);
    assert_residual(&a, &res.x, &b, 1e-9);
}

#[test]
fn bicgstab_iteration_cap() {
    let settings = IterativeSettings {
        max_iter: 1,
        ..IterativeSettings::default()
    };
    let err = bicgstab(&laplacian(50), &ones(50), &settings).unwrap_err();
    assert!(matches!(err, LinalgError::ConvergenceFailure { iterations: 1, .. }));
}

// ── GMRES ───────────────────────────────────────────────────────────

#[test]
fn gmres_nonsymmetric() {
    let a = convection(40);
    let b = ones(40);
    let res = gmres(&a, &b, &IterativeSettings::default()).unwrap();
    assert_residual(&a, &res.x, &b, 1e-9);
}

#[test]
fn gmres_small_restart() {
    let a = convection(40);
    let b = ones(40);
    let settings = IterativeSettings {
        restart: 5,
        ..IterativeSettings::default()
    };
    let res = gmres(&a, &b, &settings).unwrap();
    assert!(res.iterations > 5, "expected at least one restart");
    assert_residual(&a, &res.x, &b, 1e-9);
}

#[test]
fn gmres_exact_in_n_steps() {
    let a = DynMatrix::from_rows(3, 3, &[1.0_f64, 2.0, 0.0, 0.0, 1.0, 2.0, 3.0, 0.0, 1.0]);
    let b = DynVector::from_slice(&[3.0, 3.0, 4.0]);
    let res = gmres(&a, &b, &IterativeSettings::default()).unwrap();
    assert!(res.iterations <= 3);
    for i in 0..3 {
        assert!((res.x[i] - 1.0).abs() < 1e-10);
    }
}

#[test]
fn gmres_iteration_cap() {
    let settings = IterativeSettings {
        max_iter: 2,
        restart: 2,
        ..IterativeSettings::default()
    };
    let err = gmres(&laplacian(50), &ones(50), &settings).unwrap_err();
    assert!(matches!(err, LinalgError::ConvergenceFailure { iterations: 2, .. }));
}

// ── Shared behavior ─────────────────────────────────────────────────

#[test]
fn zero_rhs_returns_zero() {
    let a = laplacian(5);
    let b = DynVector::zeros(5, 0.0_f64);
    let settings = IterativeSettings::default();
    for res in [
        conjugate_gradient(&a, &b, &settings).unwrap(),
        bicgstab(&a, &b, &settings).unwrap(),
        gmres(&a, &b, &settings).unwrap(),
    ] {
        assert_eq!(res.iterations, 0);
        assert_eq!(res.residual_norm, 0.0);
        assert!(res.x.iter().all(|&v| v == 0.0));
    }
}

#[test]
fn shape_errors() {
    let settings = IterativeSettings::default();
    let rect = DynMatrix::zeros(2, 3, 0.0_f64);
    assert_eq!(
        gmres(&rect, &ones(2), &settings).unwrap_err(),
        LinalgError::NotSquare { rows: 2, cols: 3 }
    );
    assert_eq!(
        bicgstab(&laplacian(3), &ones(2), &settings).unwrap_err(),
        LinalgError::DimensionMismatch { expected: 3, got: 2 }
    );
}

#[test]
fn f32_defaults() {
    let a = DynMatrix::from_rows(2, 2, &[4.0_f32, 1.0, 1.0, 3.0]);
    let b = DynVector::from_slice(&[1.0_f32, 2.0]);
    let res = conjugate_gradient(&a, &b, &IterativeSettings::default()).unwrap();
    assert!((res.x[0] - 1.0 / 11.0).abs() < 1e-4);
    assert!((res.x[1] - 7.0 / 11.0).abs() < 1e-4);
}
