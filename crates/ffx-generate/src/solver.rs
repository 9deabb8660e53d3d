//! LU solver fixture catalog.
//!
//! Every matrix here comes from a builder that guarantees
//! nonsingularity, so the reference solve is never asked to handle a
//! singular system. Explicit epsilons are kept where the band table would
//! be too tight for the target's forward error or too loose for an
//! exactly representable solution.

use ffx_matrix::{
    TriangularKind, diagonal, diagonally_dominant, fixed, identity, ill_conditioned,
    known_solution, near_singular, near_singular_rhs, random_vector, symmetric_positive_definite,
    triangular,
};
use ffx_oracle::ToleranceSelector;

use crate::GenerateError;
use crate::cases::{CaseBuilder, Section};

pub const TITLE: &str = "LU solver fixtures (lu_decomp + lu_backsubs)";

/// Closing curation notes written after the last solver section.
pub const USAGE_NOTES: &[&str] = &[
    "To use these test cases:",
    "",
    "1. Run the generator:",
    "   generate_fixtures --suite solver > new_test_cases.txt",
    "2. Copy the relevant test subcases into hd_solver_test.cpp",
    "3. Organize them into TEST_CASE sections, such as:",
    "   - TEST_CASE(\"LU solver: basic systems\")",
    "   - TEST_CASE(\"LU solver: identity and diagonal\")",
    "   - TEST_CASE(\"LU solver: symmetric positive definite\")",
    "   - TEST_CASE(\"LU solver: stiff systems\")",
    "   - TEST_CASE(\"LU solver: numerically challenging\")",
    "   - TEST_CASE(\"LU solver: known solutions\")",
    "4. Build and run the tests:",
    "   cd build && cmake .. && make hd_solver_test && ./hd_solver_test",
    "",
    "Notes:",
    "- Reference solutions come from nalgebra's partial-pivot LU",
    "- Epsilon follows each matrix's condition-number band",
    "- Errors are checked against eps * (1 + max|x_expected|)",
    "- Stiff systems span condition numbers from 1e5 to 1e7",
];

/// Perturbation of the near-singular system.
pub const NEAR_SINGULAR_PERTURBATION: f64 = 1e-10;

pub fn sections(selector: &ToleranceSelector) -> Result<Vec<Section>, GenerateError> {
    let b = CaseBuilder::new(selector);
    Ok(vec![
        basic(&b)?,
        identity_and_diagonal(&b)?,
        symmetric_positive_definite_section(&b)?,
        known_solutions(&b)?,
        stiff(&b)?,
        numerically_challenging(&b)?,
    ])
}

fn basic(b: &CaseBuilder<'_>) -> Result<Section, GenerateError> {
    let mut section = Section::new("Basic Test Cases");
    section.cases.push(b.solver(
        "Simple 2x2 system",
        fixed(&[vec![2.0, 1.0], vec![1.0, 3.0]])?,
        vec![5.0, 6.0],
        None,
    )?);
    section.cases.push(b.solver(
        "Upper triangular 3x3 system",
        triangular(
            TriangularKind::Upper,
            &[vec![1.0, 2.0, 3.0], vec![0.0, 4.0, 1.0], vec![0.0, 0.0, 1.0]],
        )?,
        vec![1.0, 1.0, 1.0],
        None,
    )?);
    section.cases.push(b.solver(
        "General 4x4 system",
        fixed(&[
            vec![2.0, 1.0, 1.0, 0.0],
            vec![4.0, 3.0, 3.0, 1.0],
            vec![8.0, 7.0, 9.0, 5.0],
            vec![6.0, 7.0, 9.0, 8.0],
        ])?,
        vec![1.0, 2.0, 3.0, 4.0],
        None,
    )?);
    section.cases.push(b.solver(
        "Random 5x5 diagonally dominant system",
        diagonally_dominant(5, 42, 1.0)?,
        random_vector(5, -10.0, 10.0, 43)?,
        Some(1e-10),
    )?);
    Ok(section)
}

fn identity_and_diagonal(b: &CaseBuilder<'_>) -> Result<Section, GenerateError> {
    let mut section = Section::new("Identity and Diagonal Matrix Tests");
    section
        .cases
        .push(b.solver("Identity 3x3", identity(3)?, vec![1.0, 2.0, 3.0], None)?);
    section.cases.push(b.solver(
        "Diagonal 4x4",
        diagonal(&[2.0, 3.0, 4.0, 5.0])?,
        vec![2.0, 6.0, 12.0, 20.0],
        None,
    )?);
    Ok(section)
}

fn symmetric_positive_definite_section(b: &CaseBuilder<'_>) -> Result<Section, GenerateError> {
    let mut section = Section::new("Symmetric Positive Definite Systems");
    section.cases.push(b.solver(
        "Symmetric positive definite 3x3",
        symmetric_positive_definite(3, 100, 1.0)?,
        vec![1.0, 2.0, 3.0],
        None,
    )?);
    section.cases.push(b.solver(
        "Symmetric positive definite 4x4",
        symmetric_positive_definite(4, 200, 0.1)?,
        vec![1.0; 4],
        None,
    )?);
    Ok(section)
}

/// `b = A·x_true`, so the fixture asserts against `x_true` itself.
fn known_solutions(b: &CaseBuilder<'_>) -> Result<Section, GenerateError> {
    let mut section = Section::new("Known Solution Tests (x = [1, 2, 3, ...])");
    for (name, seed, x_true) in [
        ("Known solution [1, 2, 3]", 300, vec![1.0, 2.0, 3.0]),
        ("Known solution [1, 2, 3, 4, 5]", 301, vec![1.0, 2.0, 3.0, 4.0, 5.0]),
    ] {
        let (a, rhs) = known_solution(x_true.len(), seed, &x_true)?;
        section
            .cases
            .push(b.known_solution(name, a, rhs, &x_true, None)?);
    }
    Ok(section)
}

fn stiff(b: &CaseBuilder<'_>) -> Result<Section, GenerateError> {
    let mut section = Section::new("Stiff System Tests (High Condition Number)");
    section.cases.push(b.solver(
        "Stiff 3x3 system (condition ~ 1e5)",
        ill_conditioned(&[1e-5, 1.0, 1.0], 500)?,
        vec![1.0, 2.0, 3.0],
        None,
    )?);
    // κ lands within rounding of the 1e6 band edge; pin the ill-conditioned epsilon.
    section.cases.push(b.solver(
        "Stiff 4x4 system (condition ~ 1e6)",
        ill_conditioned(&[1e-6, 0.01, 0.1, 1.0], 501)?,
        vec![1.0; 4],
        Some(1e-6),
    )?);
    section.cases.push(b.solver(
        "Extremely stiff 5x5 system (condition ~ 1e7)",
        ill_conditioned(&[1e-7, 0.001, 0.01, 0.1, 1.0], 502)?,
        vec![1.0, 2.0, 3.0, 4.0, 5.0],
        None,
    )?);
    // Solution is exactly [1, 1, 1].
    section.cases.push(b.solver(
        "Diagonal stiff 3x3 (eigenvalue ratio = 1e7)",
        diagonal(&[1e-5, 1.0, 100.0])?,
        vec![1e-5, 1.0, 100.0],
        Some(1e-10),
    )?);
    Ok(section)
}

fn numerically_challenging(b: &CaseBuilder<'_>) -> Result<Section, GenerateError> {
    let mut section = Section::new("Numerically Challenging Systems");
    section.cases.push(b.solver(
        "Nearly singular 3x3",
        near_singular(3, NEAR_SINGULAR_PERTURBATION)?,
        near_singular_rhs(3, NEAR_SINGULAR_PERTURBATION)?,
        Some(1e-6),
    )?);
    section.cases.push(b.solver(
        "Mixed scales 3x3",
        fixed(&[
            vec![1e6, 1.0, 1.0],
            vec![1.0, 1e-6, 1.0],
            vec![1.0, 1.0, 1.0],
        ])?,
        vec![1e6 + 2.0, 1.0 + 1e-6 + 1.0, 3.0],
        Some(1e-6),
    )?);
    Ok(section)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffx_emit::{Expected, TestCase};
    use ffx_oracle::{ConditionBand, ToleranceSource};

    fn all_cases() -> Vec<TestCase> {
        sections(&ToleranceSelector::default())
            .expect("catalog builds")
            .into_iter()
            .flat_map(|s| s.cases)
            .collect()
    }

    fn case(name: &str) -> TestCase {
        all_cases()
            .into_iter()
            .find(|c| c.name() == name)
            .unwrap_or_else(|| panic!("missing case {name}"))
    }

    fn solution(case: &TestCase) -> &[f64] {
        match case.expected() {
            Expected::Solution(x) => x,
            Expected::Determinant(_) => panic!("{} is not a solver case", case.name()),
        }
    }

    #[test]
    fn six_sections_in_catalog_order() {
        let titles: Vec<&str> = sections(&ToleranceSelector::default())
            .expect("catalog builds")
            .iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles.len(), 6);
        assert_eq!(titles[0], "Basic Test Cases");
        assert_eq!(titles[5], "Numerically Challenging Systems");
    }

    #[test]
    fn simple_two_by_two_solution() {
        let c = case("Simple 2x2 system");
        let x = solution(&c);
        assert!((x[0] - 1.8).abs() < 1e-14);
        assert!((x[1] - 1.4).abs() < 1e-14);
        assert_eq!(c.tolerance().epsilon, 1e-12);
    }

    #[test]
    fn diagonal_stiff_is_exact() {
        let c = case("Diagonal stiff 3x3 (eigenvalue ratio = 1e7)");
        assert_eq!(solution(&c), &[1.0, 1.0, 1.0]);
        assert_eq!(c.tolerance().source, ToleranceSource::Override);
    }

    #[test]
    fn known_solutions_are_exact_vectors() {
        assert_eq!(solution(&case("Known solution [1, 2, 3]")), &[1.0, 2.0, 3.0]);
        assert_eq!(
            solution(&case("Known solution [1, 2, 3, 4, 5]")),
            &[1.0, 2.0, 3.0, 4.0, 5.0]
        );
    }

    #[test]
    fn stiff_cases_use_table_bands() {
        let c = case("Stiff 3x3 system (condition ~ 1e5)");
        assert_eq!(c.tolerance().band, ConditionBand::Moderate);
        assert_eq!(c.tolerance().source, ToleranceSource::Table);
        assert!(c.tolerance().epsilon > 1e-12 && c.tolerance().epsilon <= 1e-8);
    }

    #[test]
    fn stiff_four_by_four_epsilon_does_not_hinge_on_band_edge() {
        let c = case("Stiff 4x4 system (condition ~ 1e6)");
        assert_eq!(c.tolerance().epsilon, 1e-6);
        assert_eq!(c.tolerance().source, ToleranceSource::Override);
        let cond = c.diagnostics().condition_number;
        assert!((cond / 1e6 - 1.0).abs() < 1e-6, "cond={cond}");
    }

    #[test]
    fn near_singular_solution_is_close_to_ones() {
        let c = case("Nearly singular 3x3");
        for value in solution(&c) {
            assert!((value - 1.0).abs() < 1e-4, "x={value}");
        }
        assert_eq!(c.tolerance().epsilon, 1e-6);
    }
}
