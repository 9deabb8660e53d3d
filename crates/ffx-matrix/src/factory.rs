//! Matrix-family builders.
//!
//! Every randomized builder takes its seed explicitly and owns a fresh
//! `ChaCha8Rng` for the duration of the call, so the order in which
//! builders run never changes the matrix a given seed produces.

use nalgebra::{DMatrix, DVector};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{MIN_DIMENSION, Matrix, MatrixError, Vector};

/// Entries of the random base of [`diagonally_dominant`] lie in
/// `[-DOMINANT_ENTRY_BOUND, DOMINANT_ENTRY_BOUND)`.
pub const DOMINANT_ENTRY_BOUND: f64 = 5.0;

/// Margin used by [`known_solution`] when it builds its dominant matrix.
const KNOWN_SOLUTION_MARGIN: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangularKind {
    Upper,
    Lower,
}

// ═══════════════════════════════════════════════════════════════════
// Closed-form families
// ═══════════════════════════════════════════════════════════════════

/// Literal matrix, no randomness.
pub fn fixed(rows: &[Vec<f64>]) -> Result<Matrix, MatrixError> {
    Matrix::from_rows(rows)
}

pub fn identity(n: usize) -> Result<Matrix, MatrixError> {
    diagonal(&vec![1.0; n])
}

/// Diagonal matrix; its determinant is the product of `values`.
pub fn diagonal(values: &[f64]) -> Result<Matrix, MatrixError> {
    let n = values.len();
    check_dimension(n)?;
    let mut data = vec![0.0; n * n];
    for (i, value) in values.iter().enumerate() {
        data[i * n + i] = *value;
    }
    Matrix::from_row_major(n, data)
}

/// Keeps the `kind` triangle of `rows` (diagonal included) and zeroes the rest.
pub fn triangular(kind: TriangularKind, rows: &[Vec<f64>]) -> Result<Matrix, MatrixError> {
    let full = Matrix::from_rows(rows)?;
    let n = full.dimension();
    let mut data = full.as_row_major().to_vec();
    for r in 0..n {
        for c in 0..n {
            let keep = match kind {
                TriangularKind::Upper => c >= r,
                TriangularKind::Lower => c <= r,
            };
            if !keep {
                data[r * n + c] = 0.0;
            }
        }
    }
    Ok(Matrix::from_parts(n, data))
}

/// 2x2 rotation by `theta` radians; determinant 1.
#[must_use]
pub fn rotation(theta: f64) -> Matrix {
    let (sin, cos) = theta.sin_cos();
    Matrix::from_parts(2, vec![cos, -sin, sin, cos])
}

// ═══════════════════════════════════════════════════════════════════
// Seeded families
// ═══════════════════════════════════════════════════════════════════

/// Entries drawn uniformly from `[low, high)`.
pub fn random_uniform(n: usize, low: f64, high: f64, seed: u64) -> Result<Matrix, MatrixError> {
    check_dimension(n)?;
    let mut rng = seeded_rng(seed);
    let data = uniform_entries(&mut rng, n * n, low, high)?;
    Matrix::from_row_major(n, data)
}

pub fn random_vector(n: usize, low: f64, high: f64, seed: u64) -> Result<Vector, MatrixError> {
    check_dimension(n)?;
    let mut rng = seeded_rng(seed);
    uniform_entries(&mut rng, n, low, high)
}

/// Random base in `[-5, 5)` whose diagonal is replaced by the absolute row
/// sum plus `margin`, so every row is strictly dominant by at least `margin`.
pub fn diagonally_dominant(n: usize, seed: u64, margin: f64) -> Result<Matrix, MatrixError> {
    check_positive("margin", margin)?;
    let base = random_uniform(n, -DOMINANT_ENTRY_BOUND, DOMINANT_ENTRY_BOUND, seed)?;
    let mut data = base.as_row_major().to_vec();
    for i in 0..n {
        let row_sum: f64 = base.row(i).iter().map(|v| v.abs()).sum();
        data[i * n + i] = row_sum + margin;
    }
    Matrix::from_row_major(n, data)
}

/// `BᵀB + regularization·I` for B uniform in `[0, 1)`.
pub fn symmetric_positive_definite(
    n: usize,
    seed: u64,
    regularization: f64,
) -> Result<Matrix, MatrixError> {
    check_positive("regularization", regularization)?;
    let b = random_uniform(n, 0.0, 1.0, seed)?.to_dmatrix();
    let spd = b.transpose() * &b + DMatrix::<f64>::identity(n, n) * regularization;
    Matrix::from_dmatrix(&spd)
}

/// `Q·diag(eigenvalues)·Qᵀ` with Q the orthogonal factor of a random matrix.
/// The 2-norm condition number equals `max|λ| / min|λ|` regardless of Q.
pub fn ill_conditioned(eigenvalues: &[f64], seed: u64) -> Result<Matrix, MatrixError> {
    let n = eigenvalues.len();
    check_dimension(n)?;
    if eigenvalues.iter().any(|v| !v.is_finite()) {
        return Err(MatrixError::NonFiniteInput);
    }
    if let Some(index) = eigenvalues.iter().position(|v| *v == 0.0) {
        return Err(MatrixError::ZeroEigenvalue { index });
    }
    let basis = random_uniform(n, 0.0, 1.0, seed)?.to_dmatrix();
    let q = basis.qr().q();
    let lambda = DMatrix::from_diagonal(&DVector::from_column_slice(eigenvalues));
    let a = &q * lambda * q.transpose();
    Matrix::from_dmatrix(&a)
}

/// All-ones matrix (every row a duplicate of the first) with `perturbation`
/// added to diagonal entries `1..n`.
pub fn near_singular(n: usize, perturbation: f64) -> Result<Matrix, MatrixError> {
    check_dimension(n)?;
    check_positive("perturbation", perturbation)?;
    let mut data = vec![1.0; n * n];
    for i in 1..n {
        data[i * n + i] += perturbation;
    }
    Matrix::from_row_major(n, data)
}

/// Right-hand side whose exact solution for [`near_singular`] is all ones.
pub fn near_singular_rhs(n: usize, perturbation: f64) -> Result<Vector, MatrixError> {
    check_dimension(n)?;
    check_positive("perturbation", perturbation)?;
    let total = n as f64;
    Ok((0..n)
        .map(|i| if i == 0 { total } else { total + perturbation })
        .collect())
}

/// Diagonally dominant `A` with `b = A·x_true`, so `x_true` is the exact
/// expected solution rather than the output of a second solve.
pub fn known_solution(
    n: usize,
    seed: u64,
    x_true: &[f64],
) -> Result<(Matrix, Vector), MatrixError> {
    if x_true.len() != n {
        return Err(MatrixError::LengthMismatch {
            expected: n,
            actual: x_true.len(),
        });
    }
    let a = diagonally_dominant(n, seed, KNOWN_SOLUTION_MARGIN)?;
    let b = mat_vec(&a, x_true)?;
    Ok((a, b))
}

pub fn mat_vec(a: &Matrix, x: &[f64]) -> Result<Vector, MatrixError> {
    if x.len() != a.dimension() {
        return Err(MatrixError::LengthMismatch {
            expected: a.dimension(),
            actual: x.len(),
        });
    }
    Ok(a
        .rows()
        .map(|row| row.iter().zip(x).map(|(a_ij, x_j)| a_ij * x_j).sum())
        .collect())
}

// ═══════════════════════════════════════════════════════════════════
// Conditioning bounds
// ═══════════════════════════════════════════════════════════════════

/// Upper bound on the 2-norm condition number of any
/// [`diagonally_dominant`] output.
///
/// Dominance by `margin` gives `‖A⁻¹‖∞ ≤ 1/margin`; entries bounded by 5
/// give `‖A‖∞ < 10n + margin`; the 2-norm costs at most a factor `n`.
#[must_use]
pub fn diagonally_dominant_condition_bound(n: usize, margin: f64) -> f64 {
    let n = n as f64;
    n * (2.0 * DOMINANT_ENTRY_BOUND * n + margin) / margin
}

/// Upper bound on the condition number of any
/// [`symmetric_positive_definite`] output: `λmin ≥ r`, `λmax < n² + r`.
#[must_use]
pub fn spd_condition_bound(n: usize, regularization: f64) -> f64 {
    let n = n as f64;
    (n * n + regularization) / regularization
}

fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

fn uniform_entries(
    rng: &mut ChaCha8Rng,
    count: usize,
    low: f64,
    high: f64,
) -> Result<Vec<f64>, MatrixError> {
    if !(low < high && (high - low).is_finite()) {
        return Err(MatrixError::InvalidRange { low, high });
    }
    Ok((0..count).map(|_| rng.gen_range(low..high)).collect())
}

fn check_dimension(n: usize) -> Result<(), MatrixError> {
    if n < MIN_DIMENSION {
        return Err(MatrixError::DimensionTooSmall { n });
    }
    Ok(())
}

fn check_positive(name: &'static str, value: f64) -> Result<(), MatrixError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(MatrixError::NonPositiveParameter { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close_slice(actual: &[f64], expected: &[f64], atol: f64) {
        assert_eq!(actual.len(), expected.len());
        for (idx, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
            assert!((a - e).abs() <= atol, "index={idx} expected={e} actual={a}");
        }
    }

    #[test]
    fn same_seed_reproduces_identical_bits() {
        let first = random_uniform(5, -1.0, 1.0, 42).expect("valid");
        let _other = random_uniform(5, -1.0, 1.0, 7).expect("valid");
        let second = random_uniform(5, -1.0, 1.0, 42).expect("valid");
        let bits = |m: &Matrix| m.as_row_major().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first), bits(&second));
    }

    #[test]
    fn different_seeds_differ() {
        let a = random_uniform(4, -1.0, 1.0, 1).expect("valid");
        let b = random_uniform(4, -1.0, 1.0, 2).expect("valid");
        assert_ne!(a, b);
    }

    #[test]
    fn uniform_entries_respect_range() {
        let m = random_uniform(6, -1.0, 1.0, 999).expect("valid");
        assert!(m.as_row_major().iter().all(|v| (-1.0..1.0).contains(v)));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = random_uniform(3, 1.0, -1.0, 0).expect_err("inverted");
        assert_eq!(err, MatrixError::InvalidRange { low: 1.0, high: -1.0 });
        assert!(random_vector(3, -f64::MAX, f64::MAX, 0).is_err());
        assert!(random_vector(3, f64::NAN, 1.0, 0).is_err());
    }

    #[test]
    fn diagonal_places_values_on_diagonal() {
        let m = diagonal(&[2.0, 3.0, 4.0, 5.0]).expect("valid");
        assert_eq!(m.diagonal(), vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(m[(0, 1)], 0.0);
        assert_eq!(m[(3, 2)], 0.0);
    }

    #[test]
    fn triangular_zeroes_opposite_triangle() {
        let rows = vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 9.0],
        ];
        let upper = triangular(TriangularKind::Upper, &rows).expect("valid");
        assert_eq!(upper.as_row_major(), &[1.0, 2.0, 3.0, 0.0, 5.0, 6.0, 0.0, 0.0, 9.0]);
        let lower = triangular(TriangularKind::Lower, &rows).expect("valid");
        assert_eq!(lower.as_row_major(), &[1.0, 0.0, 0.0, 4.0, 5.0, 0.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn rotation_is_orthonormal() {
        let r = rotation(std::f64::consts::FRAC_PI_4);
        let d = r.to_dmatrix();
        let gram = d.transpose() * &d;
        assert!((gram[(0, 0)] - 1.0).abs() < 1e-15);
        assert!(gram[(0, 1)].abs() < 1e-15);
    }

    #[test]
    fn diagonally_dominant_rows_are_strictly_dominant() {
        let m = diagonally_dominant(5, 42, 1.0).expect("valid");
        for (i, row) in m.rows().enumerate() {
            let off: f64 = row
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, v)| v.abs())
                .sum();
            assert!(row[i] >= off + 1.0, "row {i} not dominant");
        }
    }

    #[test]
    fn non_positive_margin_is_rejected() {
        let err = diagonally_dominant(3, 0, 0.0).expect_err("zero margin");
        assert_eq!(
            err,
            MatrixError::NonPositiveParameter {
                name: "margin",
                value: 0.0
            }
        );
    }

    #[test]
    fn spd_is_symmetric_with_positive_cholesky() {
        let m = symmetric_positive_definite(4, 200, 0.1).expect("valid");
        let d = m.to_dmatrix();
        assert!((d.clone() - d.transpose()).amax() < 1e-14);
        assert!(d.cholesky().is_some());
    }

    #[test]
    fn ill_conditioned_rejects_zero_eigenvalue() {
        let err = ill_conditioned(&[1.0, 0.0, 2.0], 5).expect_err("zero");
        assert_eq!(err, MatrixError::ZeroEigenvalue { index: 1 });
    }

    #[test]
    fn ill_conditioned_preserves_trace() {
        let eigs = [1e-6, 0.01, 0.1, 1.0];
        let m = ill_conditioned(&eigs, 501).expect("valid");
        let trace: f64 = m.diagonal().iter().sum();
        assert!((trace - eigs.iter().sum::<f64>()).abs() < 1e-12);
    }

    #[test]
    fn near_singular_has_duplicated_structure() {
        let m = near_singular(3, 1e-10).expect("valid");
        assert_eq!(m.row(0), &[1.0, 1.0, 1.0]);
        assert_eq!(m[(1, 1)], 1.0 + 1e-10);
        assert_eq!(m[(2, 2)], 1.0 + 1e-10);
        let rhs = near_singular_rhs(3, 1e-10).expect("valid");
        assert_eq!(rhs, vec![3.0, 3.0 + 1e-10, 3.0 + 1e-10]);
    }

    #[test]
    fn known_solution_rhs_is_product() {
        let x = [1.0, 2.0, 3.0];
        let (a, b) = known_solution(3, 300, &x).expect("valid");
        let expected = mat_vec(&a, &x).expect("shapes");
        assert_close_slice(&b, &expected, 0.0);
    }

    #[test]
    fn known_solution_length_mismatch() {
        let err = known_solution(3, 300, &[1.0, 2.0]).expect_err("mismatch");
        assert_eq!(
            err,
            MatrixError::LengthMismatch {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn condition_bounds_grow_with_dimension() {
        assert!(diagonally_dominant_condition_bound(5, 1.0) > diagonally_dominant_condition_bound(3, 1.0));
        assert!(spd_condition_bound(3, 1.0) < spd_condition_bound(3, 0.1));
    }
}
