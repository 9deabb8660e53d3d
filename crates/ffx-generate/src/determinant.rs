//! Determinant fixture catalog.

use std::f64::consts::FRAC_PI_4;

use ffx_matrix::{
    TriangularKind, diagonal, fixed, ill_conditioned, random_uniform, rotation, triangular,
};
use ffx_oracle::ToleranceSelector;

use crate::GenerateError;
use crate::cases::{CaseBuilder, Section};

pub const TITLE: &str = "Determinant fixtures (det)";

/// Closing curation notes written after the last determinant section.
pub const USAGE_NOTES: &[&str] = &[
    "Copy relevant matrices to hd_determinant_test.cpp",
    "",
    "Notes:",
    "- Reference determinants come from nalgebra's partial-pivot LU",
    "- Nonsingular checks are relative: Approx(det_expected).epsilon(eps).scale(0)",
    "- Singular checks keep Approx's absolute floor around zero",
];

pub fn sections(selector: &ToleranceSelector) -> Result<Vec<Section>, GenerateError> {
    let b = CaseBuilder::new(selector);
    Ok(vec![
        two_by_two(&b)?,
        three_by_three(&b)?,
        four_by_four(&b)?,
        random(&b, "5x5 Matrices", &[
            ("Random 5x5 matrix with entries in [-1, 1]", 5, 42),
            ("Another random 5x5 matrix", 5, 123),
        ])?,
        random(&b, "6x6 Matrices", &[("Random 6x6 matrix with entries in [-1, 1]", 6, 999)])?,
        special(&b)?,
        ill_conditioned_section(&b)?,
        singular(&b)?,
    ])
}

fn two_by_two(b: &CaseBuilder<'_>) -> Result<Section, GenerateError> {
    let mut section = Section::new("2x2 Matrices");
    section.cases.push(b.determinant(
        "Simple 2x2 matrix",
        fixed(&[vec![1.0, 2.0], vec![3.0, 4.0]])?,
    )?);
    section.cases.push(b.determinant(
        "Integer 2x2 matrix",
        fixed(&[vec![2.0, 3.0], vec![1.0, 4.0]])?,
    )?);
    Ok(section)
}

fn three_by_three(b: &CaseBuilder<'_>) -> Result<Section, GenerateError> {
    let mut section = Section::new("3x3 Matrices");
    section.cases.push(b.determinant(
        "Simple 3x3 matrix",
        fixed(&[vec![1.0, 2.0, 3.0], vec![0.0, 1.0, 4.0], vec![5.0, 6.0, 0.0]])?,
    )?);
    section.cases.push(b.determinant(
        "User example 3x3 matrix",
        fixed(&[vec![0.0, 2.0, 6.0], vec![1.0, 8.0, 4.0], vec![5.0, 2.0, 7.0]])?,
    )?);
    Ok(section)
}

fn four_by_four(b: &CaseBuilder<'_>) -> Result<Section, GenerateError> {
    let mut section = Section::new("4x4 Matrices");
    section.cases.push(b.determinant(
        "General 4x4 matrix",
        fixed(&[
            vec![1.0, 2.0, 0.0, 1.0],
            vec![3.0, 1.0, 2.0, 0.0],
            vec![0.0, 1.0, 1.0, 2.0],
            vec![2.0, 0.0, 1.0, 1.0],
        ])?,
    )?);
    section
        .cases
        .push(b.determinant("Diagonal 4x4 matrix", diagonal(&[2.0, 3.0, 4.0, 5.0])?)?);
    Ok(section)
}

/// Uniform entries in `[-1, 1)`, one seed per case.
fn random(
    b: &CaseBuilder<'_>,
    title: &'static str,
    cases: &[(&str, usize, u64)],
) -> Result<Section, GenerateError> {
    let mut section = Section::new(title);
    for &(name, n, seed) in cases {
        section
            .cases
            .push(b.determinant(name, random_uniform(n, -1.0, 1.0, seed)?)?);
    }
    Ok(section)
}

fn special(b: &CaseBuilder<'_>) -> Result<Section, GenerateError> {
    let mut section = Section::new("Special Matrices");
    section.cases.push(b.determinant(
        "Upper triangular 4x4 (det = product of diagonal)",
        triangular(
            TriangularKind::Upper,
            &[
                vec![1.0, 2.0, 3.0, 4.0],
                vec![0.0, 1.0, 2.0, 3.0],
                vec![0.0, 0.0, 1.0, 2.0],
                vec![0.0, 0.0, 0.0, 1.0],
            ],
        )?,
    )?);
    section.cases.push(b.determinant(
        "Lower triangular 3x3 (det = product of diagonal)",
        triangular(
            TriangularKind::Lower,
            &[vec![2.0, 0.0, 0.0], vec![1.0, 3.0, 0.0], vec![4.0, 5.0, 6.0]],
        )?,
    )?);
    section
        .cases
        .push(b.determinant("Rotation matrix (det = 1)", rotation(FRAC_PI_4))?);
    Ok(section)
}

/// Spectra chosen so the condition number lands in the moderate and
/// severe bands; the determinant is the product of the eigenvalues.
fn ill_conditioned_section(b: &CaseBuilder<'_>) -> Result<Section, GenerateError> {
    let mut section = Section::new("Ill-Conditioned Matrices");
    section.cases.push(b.determinant(
        "Ill-conditioned 3x3 (eigenvalue ratio = 1e5)",
        ill_conditioned(&[1e-5, 1.0, 1.0], 600)?,
    )?);
    section.cases.push(b.determinant(
        "Ill-conditioned 4x4 (eigenvalue ratio = 1e8)",
        ill_conditioned(&[1e-8, 1e-3, 0.1, 1.0], 601)?,
    )?);
    Ok(section)
}

fn singular(b: &CaseBuilder<'_>) -> Result<Section, GenerateError> {
    let mut section = Section::new("Singular Matrices (det = 0)");
    section.cases.push(b.determinant(
        "3x3 with row of zeros",
        fixed(&[vec![1.0, 2.0, 3.0], vec![0.0, 0.0, 0.0], vec![4.0, 5.0, 6.0]])?,
    )?);
    section.cases.push(b.determinant(
        "4x4 with linearly dependent rows",
        fixed(&[
            vec![1.0, 2.0, 3.0, 4.0],
            vec![2.0, 4.0, 6.0, 8.0],
            vec![1.0, 1.0, 1.0, 1.0],
            vec![0.0, 1.0, 2.0, 3.0],
        ])?,
    )?);
    Ok(section)
}
