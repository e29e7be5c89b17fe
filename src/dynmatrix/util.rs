use core::fmt::{self, Write as _};

use crate::traits::Scalar;

use super::vector::DynVector;
use super::DynMatrix;

// ── Row / Column access ─────────────────────────────────────────────

impl<T: Scalar> DynMatrix<T> {
    /// Extract row `i` as a `DynVector`.
    pub fn row(&self, i: usize) -> DynVector<T> {
        DynVector::from_vec((0..self.ncols).map(|j| self[(i, j)]).collect())
    }

    /// Extract column `j` as a `DynVector`.
    ///
    /// ```
    /// use matsolve::DynMatrix;
    /// let m = DynMatrix::from_rows(2, 2, &[1.0, 2.0, 3.0, 4.0]);
    /// let c = m.col(1);
    /// assert_eq!(c[0], 2.0);
    /// assert_eq!(c[1], 4.0);
    /// ```
    pub fn col(&self, j: usize) -> DynVector<T> {
        DynVector::from_slice(self.col_slice(j))
    }

    /// Set column `j` from a slice.
    pub fn set_col(&mut self, j: usize, v: &[T]) {
        assert_eq!(v.len(), self.nrows, "vector length mismatch");
        let start = j * self.nrows;
        self.data[start..start + self.nrows].copy_from_slice(v);
    }

    /// Swap two columns in place.
    pub fn swap_cols(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for i in 0..self.nrows {
            self.data.swap(a * self.nrows + i, b * self.nrows + i);
        }
    }
}

// ── Display ─────────────────────────────────────────────────────────

impl<T: fmt::Display> fmt::Display for DynMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.nrows;
        let n = self.ncols;

        // Measure column widths
        let mut widths: Vec<usize> = vec![0; n];
        for j in 0..n {
            for i in 0..m {
                let w = WriteCounting::count(|wc| write!(wc, "{}", self[(i, j)]));
                if w > widths[j] {
                    widths[j] = w;
                }
            }
        }

        for i in 0..m {
            write!(f, "│")?;
            for j in 0..n {
                if j > 0 {
                    write!(f, "  ")?;
                }
                write!(f, "{:>width$}", self[(i, j)], width = widths[j])?;
            }
            write!(f, "│")?;
            if i < m - 1 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

struct WriteCounting {
    count: usize,
}

impl WriteCounting {
    fn count(f: impl FnOnce(&mut Self) -> fmt::Result) -> usize {
        let mut wc = WriteCounting { count: 0 };
        let _ = f(&mut wc);
        wc.count
    }
}

impl fmt::Write for WriteCounting {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.count += s.chars().count();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_and_col() {
        let m = DynMatrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.row(1).as_slice(), &[4.0, 5.0, 6.0]);
        assert_eq!(m.col(2).as_slice(), &[3.0, 6.0]);
    }

    #[test]
    fn set_and_swap_cols() {
        let mut m = DynMatrix::zeros(2, 2, 0.0_f64);
        m.set_col(0, &[1.0, 2.0]);
        m.swap_cols(0, 1);
        assert_eq!(m.col(1).as_slice(), &[1.0, 2.0]);
        assert_eq!(m.col(0).as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn display_aligns_columns() {
        let m = DynMatrix::from_rows(2, 2, &[1.0, 20.0, 300.0, 4.0]);
        let s = format!("{}", m);
        assert_eq!(s, "│  1  20│\n│300   4│");
    }
}
