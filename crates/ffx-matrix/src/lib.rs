#![forbid(unsafe_code)]

//! Square matrix model and the seeded matrix-family builders used to
//! produce LU/determinant fixtures.
//!
//! ## Module layout
//!
//! | Module    | Contents                                                  |
//! |-----------|-----------------------------------------------------------|
//! | (root)    | [`Matrix`], [`Vector`], [`MatrixError`]                   |
//! | `factory` | one builder per matrix family, conditioning bounds        |

pub mod factory;

pub use factory::{
    DOMINANT_ENTRY_BOUND, TriangularKind, diagonal, diagonally_dominant,
    diagonally_dominant_condition_bound, fixed, identity, ill_conditioned, known_solution,
    mat_vec, near_singular, near_singular_rhs, random_uniform, random_vector, rotation,
    spd_condition_bound, symmetric_positive_definite, triangular,
};

use nalgebra::DMatrix;

/// Smallest dimension a fixture matrix may have.
pub const MIN_DIMENSION: usize = 2;

/// Right-hand sides and solutions are plain `f64` sequences.
pub type Vector = Vec<f64>;

#[derive(Debug, Clone, PartialEq)]
pub enum MatrixError {
    RaggedMatrix,
    ExpectedSquareMatrix {
        rows: usize,
        cols: usize,
    },
    DimensionTooSmall {
        n: usize,
    },
    LengthMismatch {
        expected: usize,
        actual: usize,
    },
    InvalidRange {
        low: f64,
        high: f64,
    },
    NonPositiveParameter {
        name: &'static str,
        value: f64,
    },
    ZeroEigenvalue {
        index: usize,
    },
    NonFiniteInput,
}

impl std::fmt::Display for MatrixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RaggedMatrix => write!(f, "matrix rows must all have equal length"),
            Self::ExpectedSquareMatrix { rows, cols } => {
                write!(f, "expected square matrix, got {rows}x{cols}")
            }
            Self::DimensionTooSmall { n } => write!(
                f,
                "matrix dimension must be at least {MIN_DIMENSION}, got {n}"
            ),
            Self::LengthMismatch { expected, actual } => {
                write!(f, "length mismatch: expected {expected}, got {actual}")
            }
            Self::InvalidRange { low, high } => {
                write!(f, "invalid sampling range: low={low} must be below high={high}")
            }
            Self::NonPositiveParameter { name, value } => {
                write!(f, "`{name}` must be strictly positive, got {value}")
            }
            Self::ZeroEigenvalue { index } => {
                write!(f, "eigenvalue at index {index} must be non-zero")
            }
            Self::NonFiniteInput => write!(f, "array must not contain infs or NaNs"),
        }
    }
}

impl std::error::Error for MatrixError {}

/// Square, row-major matrix of dimension `n >= 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    n: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Build from nested rows, rejecting ragged, non-square and too-small input.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, MatrixError> {
        let (n, cols) = matrix_shape(rows)?;
        if n != cols {
            return Err(MatrixError::ExpectedSquareMatrix { rows: n, cols });
        }
        let mut data = Vec::with_capacity(n * n);
        for row in rows {
            data.extend_from_slice(row);
        }
        Self::from_row_major(n, data)
    }

    pub fn from_row_major(n: usize, data: Vec<f64>) -> Result<Self, MatrixError> {
        if n < MIN_DIMENSION {
            return Err(MatrixError::DimensionTooSmall { n });
        }
        if data.len() != n * n {
            return Err(MatrixError::LengthMismatch {
                expected: n * n,
                actual: data.len(),
            });
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(MatrixError::NonFiniteInput);
        }
        Ok(Self { n, data })
    }

    pub fn from_dmatrix(m: &DMatrix<f64>) -> Result<Self, MatrixError> {
        if m.nrows() != m.ncols() {
            return Err(MatrixError::ExpectedSquareMatrix {
                rows: m.nrows(),
                cols: m.ncols(),
            });
        }
        let n = m.nrows();
        let mut data = Vec::with_capacity(n * n);
        for r in 0..n {
            for c in 0..n {
                data.push(m[(r, c)]);
            }
        }
        Self::from_row_major(n, data)
    }

    #[must_use]
    pub fn to_dmatrix(&self) -> DMatrix<f64> {
        DMatrix::from_row_slice(self.n, self.n, &self.data)
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.n
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.n + col]
    }

    #[must_use]
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.n..(row + 1) * self.n]
    }

    pub fn rows(&self) -> std::slice::ChunksExact<'_, f64> {
        self.data.chunks_exact(self.n)
    }

    #[must_use]
    pub fn as_row_major(&self) -> &[f64] {
        &self.data
    }

    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }

    #[must_use]
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.n).map(|i| self.get(i, i)).collect()
    }

    #[must_use]
    pub fn transpose(&self) -> Self {
        let n = self.n;
        let mut data = vec![0.0; n * n];
        for (r, row) in self.rows().enumerate() {
            for (c, value) in row.iter().enumerate() {
                data[c * n + r] = *value;
            }
        }
        Self { n, data }
    }

    pub(crate) fn from_parts(n: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), n * n);
        Self { n, data }
    }
}

impl std::ops::Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[row * self.n + col]
    }
}

fn matrix_shape(a: &[Vec<f64>]) -> Result<(usize, usize), MatrixError> {
    if a.is_empty() {
        return Err(MatrixError::DimensionTooSmall { n: 0 });
    }
    let cols = a[0].len();
    if a.iter().any(|row| row.len() != cols) {
        return Err(MatrixError::RaggedMatrix);
    }
    Ok((a.len(), cols))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_round_trips_nested_layout() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let m = Matrix::from_rows(&rows).expect("square input");
        assert_eq!(m.dimension(), 2);
        assert_eq!(m.as_row_major(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(m.to_rows(), rows);
        assert_eq!(m[(1, 0)], 3.0);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).expect_err("ragged");
        assert_eq!(err, MatrixError::RaggedMatrix);
    }

    #[test]
    fn non_square_is_rejected() {
        let err = Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])
            .expect_err("non-square");
        assert_eq!(err, MatrixError::ExpectedSquareMatrix { rows: 2, cols: 3 });
    }

    #[test]
    fn one_by_one_is_too_small() {
        let err = Matrix::from_rows(&[vec![1.0]]).expect_err("1x1");
        assert_eq!(err, MatrixError::DimensionTooSmall { n: 1 });
    }

    #[test]
    fn non_finite_entries_are_rejected() {
        let err = Matrix::from_row_major(2, vec![1.0, f64::NAN, 0.0, 1.0]).expect_err("nan");
        assert_eq!(err, MatrixError::NonFiniteInput);
    }

    #[test]
    fn dmatrix_conversion_preserves_row_major_order() {
        let m = Matrix::from_row_major(2, vec![1.0, 2.0, 3.0, 4.0]).expect("valid");
        let d = m.to_dmatrix();
        assert_eq!(d[(0, 1)], 2.0);
        assert_eq!(d[(1, 0)], 3.0);
        assert_eq!(Matrix::from_dmatrix(&d).expect("square"), m);
    }

    #[test]
    fn transpose_swaps_off_diagonal() {
        let m = Matrix::from_row_major(2, vec![1.0, 2.0, 3.0, 4.0]).expect("valid");
        assert_eq!(m.transpose().as_row_major(), &[1.0, 3.0, 2.0, 4.0]);
        assert_eq!(m.diagonal(), vec![1.0, 4.0]);
    }
}
