#![forbid(unsafe_code)]

//! Reference oracle for fixture generation.
//!
//! Ground truth comes from `nalgebra`'s partial-pivot LU, SVD and real
//! Schur decompositions, never from the library the fixtures will test.
//! Condition numbers feed the tolerance table in [`tolerance`].

pub mod tolerance;

pub use tolerance::{
    ConditionBand, Tolerance, ToleranceError, ToleranceSelector, ToleranceSource, ToleranceTable,
};

use ffx_matrix::{Matrix, Vector};
use nalgebra::{Complex, DMatrix, DVector, Dyn, LU, linalg::SVD};

#[derive(Debug, Clone, PartialEq)]
pub enum OracleError {
    IncompatibleShapes { n: usize, b_len: usize },
    SingularMatrix,
}

impl std::fmt::Display for OracleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IncompatibleShapes { n, b_len } => {
                write!(f, "incompatible shapes: a_shape=({n}, {n}), b_len={b_len}")
            }
            Self::SingularMatrix => write!(f, "singular matrix"),
        }
    }
}

impl std::error::Error for OracleError {}

/// Conditioning diagnostics recorded in every fixture header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagnostics {
    pub dimension: usize,
    pub determinant: f64,
    pub condition_number: f64,
    pub min_eigenvalue_magnitude: f64,
    pub max_eigenvalue_magnitude: f64,
}

impl Diagnostics {
    /// `max|λ| / min|λ|`; infinite when some eigenvalue is exactly zero.
    #[must_use]
    pub fn eigenvalue_ratio(&self) -> f64 {
        if self.min_eigenvalue_magnitude == 0.0 {
            f64::INFINITY
        } else {
            self.max_eigenvalue_magnitude / self.min_eigenvalue_magnitude
        }
    }
}

#[must_use]
pub fn determinant(a: &Matrix) -> f64 {
    a.to_dmatrix().lu().determinant()
}

/// Reference solve of `A·x = b`.
///
/// Only meaningful for matrices whose builder guarantees nonsingularity;
/// an LU diagonal ratio below machine epsilon is reported as singular.
pub fn solve(a: &Matrix, b: &[f64]) -> Result<Vector, OracleError> {
    let n = a.dimension();
    if b.len() != n {
        return Err(OracleError::IncompatibleShapes { n, b_len: b.len() });
    }
    let matrix = a.to_dmatrix();
    let rhs = DVector::from_column_slice(b);
    let lu: LU<f64, Dyn, Dyn> = matrix.clone().lu();
    let rcond = rcond_from_lu(&lu, n);
    if rcond < f64::EPSILON {
        tracing::warn!(target: "ffx.oracle", n, rcond, "solve refused near-singular matrix");
        return Err(OracleError::SingularMatrix);
    }
    let x = lu.solve(&rhs).ok_or(OracleError::SingularMatrix)?;
    tracing::debug!(
        target: "ffx.oracle",
        n,
        rcond,
        backward_error = backward_error(&matrix, &x, &rhs),
        "reference solve"
    );
    Ok(x.iter().copied().collect())
}

/// Ratio of the extreme singular values; `INFINITY` when the smallest is zero.
#[must_use]
pub fn condition_number(a: &Matrix) -> f64 {
    let svd = SVD::new(a.to_dmatrix(), false, false);
    let max_s = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let min_s = svd
        .singular_values
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);
    if min_s == 0.0 {
        f64::INFINITY
    } else {
        max_s / min_s
    }
}

/// Complex eigenvalues from the real Schur form. Diagnostic only.
#[must_use]
pub fn eigenvalues(a: &Matrix) -> Vec<Complex<f64>> {
    a.to_dmatrix().complex_eigenvalues().iter().copied().collect()
}

/// `(min |λ|, max |λ|)` over the spectrum.
#[must_use]
pub fn eigenvalue_magnitudes(a: &Matrix) -> (f64, f64) {
    eigenvalues(a)
        .iter()
        .map(|lambda| lambda.norm())
        .fold((f64::INFINITY, 0.0_f64), |(lo, hi), m| (lo.min(m), hi.max(m)))
}

#[must_use]
pub fn diagnose(a: &Matrix) -> Diagnostics {
    let (min_eigenvalue_magnitude, max_eigenvalue_magnitude) = eigenvalue_magnitudes(a);
    Diagnostics {
        dimension: a.dimension(),
        determinant: determinant(a),
        condition_number: condition_number(a),
        min_eigenvalue_magnitude,
        max_eigenvalue_magnitude,
    }
}

/// `‖Ax - b‖ / (‖A‖ × ‖x‖ + ‖b‖)`, or 0.0 when the denominator vanishes.
pub fn relative_residual(a: &Matrix, x: &[f64], b: &[f64]) -> Result<f64, OracleError> {
    let n = a.dimension();
    if x.len() != n || b.len() != n {
        return Err(OracleError::IncompatibleShapes {
            n,
            b_len: b.len().max(x.len()),
        });
    }
    Ok(backward_error(
        &a.to_dmatrix(),
        &DVector::from_column_slice(x),
        &DVector::from_column_slice(b),
    ))
}

fn backward_error(matrix: &DMatrix<f64>, x: &DVector<f64>, rhs: &DVector<f64>) -> f64 {
    let residual = matrix * x - rhs;
    let denom = matrix.norm() * x.norm() + rhs.norm();
    if denom > 0.0 {
        residual.norm() / denom
    } else {
        0.0
    }
}

/// O(n) reciprocal-condition estimate from the U diagonal of the LU factors.
fn rcond_from_lu(lu: &LU<f64, Dyn, Dyn>, n: usize) -> f64 {
    let u = lu.u();
    let mut max_diag: f64 = 0.0;
    let mut min_diag = f64::INFINITY;
    for i in 0..n {
        let d = u[(i, i)].abs();
        max_diag = max_diag.max(d);
        min_diag = min_diag.min(d);
    }
    if max_diag == 0.0 {
        return 0.0;
    }
    min_diag / max_diag
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffx_matrix::{diagonal, fixed, ill_conditioned, rotation};

    fn assert_close_slice(actual: &[f64], expected: &[f64], atol: f64, rtol: f64) {
        assert_eq!(actual.len(), expected.len());
        for (idx, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
            let tol = atol + rtol * e.abs();
            assert!(
                (a - e).abs() <= tol,
                "index={idx} expected={e} actual={a} tol={tol}"
            );
        }
    }

    #[test]
    fn determinant_of_simple_two_by_two() {
        let a = fixed(&[vec![1.0, 2.0], vec![3.0, 4.0]]).expect("valid");
        assert!((determinant(&a) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn determinant_of_diagonal_is_product() {
        let a = diagonal(&[2.0, 3.0, 4.0, 5.0]).expect("valid");
        assert!((determinant(&a) - 120.0).abs() < 1e-12);
    }

    #[test]
    fn determinant_of_dependent_rows_is_zero() {
        let a = fixed(&[
            vec![1.0, 2.0, 3.0, 4.0],
            vec![2.0, 4.0, 6.0, 8.0],
            vec![1.0, 1.0, 1.0, 1.0],
            vec![0.0, 1.0, 2.0, 3.0],
        ])
        .expect("valid");
        assert!(determinant(&a).abs() < 1e-12);
    }

    #[test]
    fn solve_two_by_two() {
        let a = fixed(&[vec![2.0, 1.0], vec![1.0, 3.0]]).expect("valid");
        let x = solve(&a, &[5.0, 6.0]).expect("nonsingular");
        assert_close_slice(&x, &[1.8, 1.4], 1e-14, 1e-14);
    }

    #[test]
    fn solve_diagonal_stiff_is_exact() {
        let a = diagonal(&[1e-5, 1.0, 100.0]).expect("valid");
        let x = solve(&a, &[1e-5, 1.0, 100.0]).expect("nonsingular");
        assert_eq!(x, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn solve_rejects_singular_matrix() {
        let a = fixed(&[vec![1.0, 2.0], vec![2.0, 4.0]]).expect("valid");
        assert_eq!(solve(&a, &[1.0, 2.0]), Err(OracleError::SingularMatrix));
    }

    #[test]
    fn solve_rejects_wrong_rhs_length() {
        let a = diagonal(&[1.0, 2.0]).expect("valid");
        assert_eq!(
            solve(&a, &[1.0, 2.0, 3.0]),
            Err(OracleError::IncompatibleShapes { n: 2, b_len: 3 })
        );
    }

    #[test]
    fn condition_number_of_diagonal_is_extreme_ratio() {
        let a = diagonal(&[1e-5, 1.0, 100.0]).expect("valid");
        let cond = condition_number(&a);
        assert!((cond / 1e7 - 1.0).abs() < 1e-10, "cond={cond}");
    }

    #[test]
    fn condition_number_of_singular_is_numerically_singular() {
        let a = fixed(&[vec![1.0, 2.0, 3.0], vec![0.0, 0.0, 0.0], vec![4.0, 5.0, 6.0]])
            .expect("valid");
        let cond = condition_number(&a);
        assert_eq!(ConditionBand::classify(cond), ConditionBand::Singular, "cond={cond}");
    }

    #[test]
    fn rotation_eigenvalues_lie_on_unit_circle() {
        let (lo, hi) = eigenvalue_magnitudes(&rotation(std::f64::consts::FRAC_PI_4));
        assert!((lo - 1.0).abs() < 1e-12);
        assert!((hi - 1.0).abs() < 1e-12);
    }

    #[test]
    fn diagnose_matches_constructed_spectrum() {
        let a = ill_conditioned(&[1e-5, 1.0, 1.0], 500).expect("valid");
        let d = diagnose(&a);
        assert_eq!(d.dimension, 3);
        assert!((d.min_eigenvalue_magnitude - 1e-5).abs() < 1e-12);
        assert!((d.max_eigenvalue_magnitude - 1.0).abs() < 1e-12);
        assert!((d.eigenvalue_ratio() / 1e5 - 1.0).abs() < 1e-6);
        assert!((d.determinant - 1e-5).abs() < 1e-15);
    }

    #[test]
    fn relative_residual_is_tiny_for_reference_solution() {
        let a = fixed(&[vec![3.0, 2.0], vec![1.0, 2.0]]).expect("valid");
        let b = [5.0, 5.0];
        let x = solve(&a, &b).expect("nonsingular");
        assert!(relative_residual(&a, &x, &b).expect("shapes") < 1e-15);
    }
}
