use crate::dynmatrix::{DynMatrix, DynVector};
use crate::linalg::{ensure_len, ensure_square, LinalgError, Result};
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};

/// Perform LU decomposition with partial pivoting, in place.
///
/// On return, `a` contains both L and U packed together:
/// - Upper triangle (including diagonal): U
/// - Lower triangle (excluding diagonal): L (diagonal of L is implicitly 1)
///
/// `perm` is filled with the row permutation indices.
/// Returns `true` if the number of row swaps was even.
pub fn lu_in_place<T: FloatScalar>(a: &mut impl MatrixMut<T>, perm: &mut [usize]) -> Result<bool> {
    let n = a.nrows();
    ensure_square(a)?;
    ensure_len(n, perm.len())?;

    for (i, p) in perm.iter_mut().enumerate() {
        *p = i;
    }

    let mut even = true;

    for col in 0..n {
        // Partial pivoting: largest magnitude in this column
        let mut max_row = col;
        let mut max_val = a.get(col, col).abs();
        for row in (col + 1)..n {
            let val = a.get(row, col).abs();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }

        // `!(x >= eps)` also catches NaN
        if !(max_val >= T::epsilon()) {
            return Err(LinalgError::Singular);
        }

        if max_row != col {
            perm.swap(col, max_row);
            for j in 0..n {
                let tmp = *a.get(col, j);
                *a.get_mut(col, j) = *a.get(max_row, j);
                *a.get_mut(max_row, j) = tmp;
            }
            even = !even;
        }

        let inv_pivot = T::one() / *a.get(col, col);

        for row in (col + 1)..n {
            let factor = *a.get(row, col) * inv_pivot;
            *a.get_mut(row, col) = factor;
            if factor == T::zero() {
                continue;
            }
            for j in (col + 1)..n {
                let u = *a.get(col, j);
                let v = a.get_mut(row, j);
                *v = *v - factor * u;
            }
        }
    }

    Ok(even)
}

/// Solve Ax = b given the packed LU decomposition and permutation.
///
/// `lu` is the packed L/U matrix from `lu_in_place`.
/// `perm` is the row permutation from `lu_in_place`.
/// `b` (input) and `x` (output) are separate slices of length n.
pub fn lu_solve<T: FloatScalar>(lu: &impl MatrixRef<T>, perm: &[usize], b: &[T], x: &mut [T]) {
    let n = lu.nrows();

    // Apply permutation and forward substitution (solve Ly = Pb)
    for i in 0..n {
        let mut sum = b[perm[i]];
        for j in 0..i {
            sum = sum - *lu.get(i, j) * x[j];
        }
        x[i] = sum;
    }

    // Back substitution (solve Ux = y)
    for i in (0..n).rev() {
        let mut sum = x[i];
        for j in (i + 1)..n {
            sum = sum - *lu.get(i, j) * x[j];
        }
        x[i] = sum / *lu.get(i, i);
    }
}

/// LU decomposition with partial pivoting.
///
/// The general-purpose fallback of the solver: it handles any non-singular
/// square matrix, including the indefinite ones Cholesky rejects.
///
/// # Example
///
/// ```
/// use matsolve::{DynMatrix, DynVector};
/// use matsolve::linalg::LuDecomposition;
///
/// let a = DynMatrix::from_rows(2, 2, &[0.0_f64, 1.0, 1.0, 0.0]);
/// let lu = LuDecomposition::new(&a).unwrap();
/// let x = lu.solve(&DynVector::from_slice(&[1.0, 1.0])).unwrap();
/// assert!((x[0] - 1.0).abs() < 1e-12);
/// assert!((x[1] - 1.0).abs() < 1e-12);
/// assert!((lu.det() + 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct LuDecomposition<T> {
    lu: DynMatrix<T>,
    perm: Vec<usize>,
    even: bool,
}

impl<T: FloatScalar> LuDecomposition<T> {
    /// Decompose a square matrix. Fails with [`LinalgError::Singular`] when a
    /// pivot column is numerically zero.
    pub fn new(a: &impl MatrixRef<T>) -> Result<Self> {
        ensure_square(a)?;
        let mut lu = DynMatrix::from_matrix_ref(a);
        let mut perm = vec![0usize; lu.nrows()];
        let even = lu_in_place(&mut lu, &mut perm)?;
        Ok(Self { lu, perm, even })
    }

    /// Solve Ax = b.
    pub fn solve(&self, b: &DynVector<T>) -> Result<DynVector<T>> {
        let n = self.lu.nrows();
        ensure_len(n, b.len())?;
        let mut x = vec![T::zero(); n];
        lu_solve(&self.lu, &self.perm, b.as_slice(), &mut x);
        Ok(DynVector::from_vec(x))
    }

    /// Row permutation: row `i` of `P·A` is row `perm()[i]` of `A`.
    pub fn perm(&self) -> &[usize] {
        &self.perm
    }

    /// Determinant: product of U's diagonal, negated for an odd permutation.
    pub fn det(&self) -> T {
        let n = self.lu.nrows();
        let mut d = if self.even { T::one() } else { -T::one() };
        for i in 0..n {
            d = d * self.lu[(i, i)];
        }
        d
    }

    /// Matrix inverse by solving against each unit vector.
    pub fn inverse(&self) -> DynMatrix<T> {
        let n = self.lu.nrows();
        let mut inv = DynMatrix::zeros(n, n, T::zero());
        let mut e = vec![T::zero(); n];
        let mut x = vec![T::zero(); n];

        for col in 0..n {
            if col > 0 {
                e[col - 1] = T::zero();
            }
            e[col] = T::one();
            lu_solve(&self.lu, &self.perm, &e, &mut x);
            inv.set_col(col, &x);
        }

        inv
    }
}
