use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use matsolve::{
    CholeskyDecomposition, CsrMatrix, DynMatrix, DynVector, EigenDecomposition, LuDecomposition,
    MatrixSolver, QrDecomposition, Strategy, SvdDecomposition,
};

// ---------------------------------------------------------------------------
// Helpers: deterministic test matrices
// ---------------------------------------------------------------------------

fn spd(n: usize) -> DynMatrix<f64> {
    let a = DynMatrix::from_fn(n, n, |i, j| {
        let shift = if i == j { 10.0 } else { 0.0 };
        ((i + 1) * (j + 1)) as f64 / (n * n) as f64 + shift
    });
    &a * &a.transpose()
}

fn general(n: usize) -> DynMatrix<f64> {
    DynMatrix::from_fn(n, n, |i, j| {
        if i == j {
            (n + 1) as f64
        } else {
            ((i * 7 + j * 3) % 5) as f64 - 2.0
        }
    })
}

fn rhs(n: usize) -> DynVector<f64> {
    DynVector::from_vec((0..n).map(|i| (i % 3) as f64 + 1.0).collect())
}

fn tridiagonal(n: usize) -> CsrMatrix<f64> {
    let mut t = Vec::with_capacity(3 * n);
    for i in 0..n {
        t.push((i, i, 4.0));
        if i > 0 {
            t.push((i, i - 1, -1.0));
        }
        if i + 1 < n {
            t.push((i, i + 1, -1.0));
        }
    }
    // triplets are in bounds by construction
    CsrMatrix::from_triplets(n, n, &t).unwrap()
}

// ---------------------------------------------------------------------------
// Decompositions
// ---------------------------------------------------------------------------

fn cholesky(c: &mut Criterion) {
    let mut g = c.benchmark_group("cholesky");
    for n in [8, 32, 64] {
        let a = spd(n);
        g.bench_with_input(BenchmarkId::from_parameter(n), &a, |b, a| {
            b.iter(|| CholeskyDecomposition::new(std::hint::black_box(a)).unwrap())
        });
    }
    g.finish();
}

fn lu(c: &mut Criterion) {
    let mut g = c.benchmark_group("lu");
    for n in [8, 32, 64] {
        let a = general(n);
        g.bench_with_input(BenchmarkId::from_parameter(n), &a, |b, a| {
            b.iter(|| LuDecomposition::new(std::hint::black_box(a)).unwrap())
        });
    }
    g.finish();
}

fn qr(c: &mut Criterion) {
    let mut g = c.benchmark_group("qr");
    for n in [8, 32, 64] {
        let a = general(n);
        g.bench_with_input(BenchmarkId::from_parameter(n), &a, |b, a| {
            b.iter(|| QrDecomposition::new(std::hint::black_box(a)).unwrap())
        });
    }
    g.finish();
}

fn eigen_and_svd(c: &mut Criterion) {
    let mut g = c.benchmark_group("eigen_svd");
    let a = DynMatrix::from_diag(&[8.0, 5.0, 3.0, 2.0, 1.0]) + DynMatrix::fill(5, 5, 0.05);
    g.bench_function("eigen_5", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(0);
            EigenDecomposition::with_rng(std::hint::black_box(&a), &mut rng).unwrap()
        })
    });
    g.bench_function("svd_5", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(0);
            SvdDecomposition::with_rng(std::hint::black_box(&a), &mut rng).unwrap()
        })
    });
    g.finish();
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

fn dispatch(c: &mut Criterion) {
    let mut g = c.benchmark_group("solver");
    let solver = MatrixSolver::<f64>::new();

    let a = spd(32);
    let b = rhs(32);
    g.bench_function("auto_spd_32", |bench| {
        bench.iter(|| solver.solve(std::hint::black_box(&a), &b).unwrap())
    });

    let s = tridiagonal(2000);
    let bs = rhs(2000);
    g.bench_function("cg_tridiagonal_2000", |bench| {
        bench.iter(|| {
            solver
                .solve_with(std::hint::black_box(&s), &bs, Strategy::ConjugateGradient)
                .unwrap()
        })
    });
    g.finish();
}

criterion_group!(benches, cholesky, lu, qr, eigen_and_svd, dispatch);
criterion_main!(benches);
