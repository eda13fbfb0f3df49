//! Dense row-major matrix engine.
//!
//! Matrices are plain values: `multiply`, `transpose` and `invert` always
//! allocate a new matrix and never touch their inputs.

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::config::PivotStrategy;
use crate::error::MatrixError;

/// Dense real matrix with fixed dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// All-zero matrix.
    pub fn zero(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Square identity matrix.
    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, |r, c| if r == c { 1.0 } else { 0.0 })
    }

    /// Build a matrix by evaluating `f(row, col)` for every entry.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    /// Build a matrix from fixed-width rows.
    pub fn from_rows<const C: usize>(rows: &[[f64; C]]) -> Self {
        Self {
            rows: rows.len(),
            cols: C,
            data: rows.iter().flatten().copied().collect(),
        }
    }

    /// Column vector (`n x 1`).
    pub fn column(values: &[f64]) -> Self {
        Self {
            rows: values.len(),
            cols: 1,
            data: values.to_vec(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Entry at (row, col). Panics when out of range, like slice indexing.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self[(row, col)]
    }

    /// Row-major entries.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Matrix product `self * other`.
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix, MatrixError> {
        if self.cols != other.rows {
            return Err(MatrixError::DimensionMismatch {
                left: (self.rows, self.cols),
                right: (other.rows, other.cols),
            });
        }

        Ok(Matrix::from_fn(self.rows, other.cols, |r, c| {
            (0..self.cols).map(|k| self[(r, k)] * other[(k, c)]).sum()
        }))
    }

    pub fn transpose(&self) -> Matrix {
        Matrix::from_fn(self.cols, self.rows, |r, c| self[(c, r)])
    }

    /// Inverse using first-nonzero pivoting.
    ///
    /// Non-square matrices get the Moore-Penrose pseudo-inverse instead.
    pub fn invert(&self) -> Result<Matrix, MatrixError> {
        self.invert_with(PivotStrategy::default())
    }

    /// Inverse with an explicit pivot strategy.
    pub fn invert_with(&self, pivot: PivotStrategy) -> Result<Matrix, MatrixError> {
        if self.is_square() {
            self.gauss_jordan(pivot)
        } else {
            self.pseudo_inverse_with(pivot)
        }
    }

    /// Pseudo-inverse `(AᵗA)⁻¹Aᵗ`, the least-squares solver for tall systems.
    pub fn pseudo_inverse(&self) -> Result<Matrix, MatrixError> {
        self.pseudo_inverse_with(PivotStrategy::default())
    }

    pub fn pseudo_inverse_with(&self, pivot: PivotStrategy) -> Result<Matrix, MatrixError> {
        let transposed = self.transpose();
        transposed
            .multiply(self)?
            .invert_with(pivot)?
            .multiply(&transposed)
    }

    /// Entry-wise comparison within `tolerance`. Shapes must match.
    pub fn approx_eq(&self, other: &Matrix, tolerance: f64) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }

    /// Gauss-Jordan elimination of `[A | I]`.
    ///
    /// A column with no usable pivot is skipped rather than aborting; the
    /// matrix is reported singular only if some column never got a pivot.
    fn gauss_jordan(&self, pivot: PivotStrategy) -> Result<Matrix, MatrixError> {
        let n = self.rows;
        let mut work = self.clone();
        let mut inverse = Matrix::identity(n);
        let mut pivots = 0;

        for i in 0..n {
            let Some(p) = work.find_pivot(i, pivot) else {
                continue;
            };
            if p != i {
                work.swap_rows(i, p);
                inverse.swap_rows(i, p);
            }

            let scale = work[(i, i)];
            for k in 0..n {
                work[(i, k)] /= scale;
                inverse[(i, k)] /= scale;
            }

            for j in 0..n {
                if j == i {
                    continue;
                }
                let factor = work[(j, i)];
                for k in 0..n {
                    let w = work[(i, k)] * factor;
                    let v = inverse[(i, k)] * factor;
                    work[(j, k)] -= w;
                    inverse[(j, k)] -= v;
                }
            }
            pivots += 1;
        }

        if pivots < n {
            return Err(MatrixError::SingularMatrix);
        }
        Ok(inverse)
    }

    /// Pivot row for column `col`, searching rows `col..n`.
    fn find_pivot(&self, col: usize, pivot: PivotStrategy) -> Option<usize> {
        let mut candidates = (col..self.rows).filter(|&r| self[(r, col)] != 0.0);
        match pivot {
            PivotStrategy::FirstNonZero => candidates.next(),
            PivotStrategy::LargestMagnitude => {
                candidates.max_by(|&a, &b| self[(a, col)].abs().total_cmp(&self[(b, col)].abs()))
            }
        }
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        for k in 0..self.cols {
            self.data.swap(a * self.cols + k, b * self.cols + k);
        }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(row < self.rows && col < self.cols, "matrix index out of range");
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(row < self.rows && col < self.cols, "matrix index out of range");
        &mut self.data[row * self.cols + col]
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[Matrix:{}x{}] =", self.rows, self.cols)?;
        for r in 0..self.rows {
            let row: Vec<String> = (0..self.cols)
                .map(|c| format_significant(self[(r, c)], 4))
                .collect();
            writeln!(f, "|{}|", row.join(" "))?;
        }
        Ok(())
    }
}

/// Format with `digits` significant digits, switching to exponent
/// notation for very large or very small magnitudes.
fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    let exponent = value.abs().log10().floor() as i32;
    if exponent < -5 || exponent >= digits as i32 {
        let formatted = format!("{:.*e}", digits.saturating_sub(1), value);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) => format!("{}e{}", trim_zeros(mantissa), exp),
            None => formatted,
        };
    }

    let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
    trim_zeros(&format!("{:.*}", decimals, value)).to_string()
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
