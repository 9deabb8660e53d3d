//! Assembly of single test cases: oracle, then tolerance, then validation.

use ffx_emit::TestCase;
use ffx_matrix::{Matrix, Vector};
use ffx_oracle::{ToleranceSelector, diagnose, relative_residual, solve};

use crate::GenerateError;

/// A titled group of cases, written under one banner.
#[derive(Debug, Clone)]
pub struct Section {
    pub title: &'static str,
    pub cases: Vec<TestCase>,
}

impl Section {
    #[must_use]
    pub fn new(title: &'static str) -> Self {
        Self {
            title,
            cases: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CaseBuilder<'a> {
    selector: &'a ToleranceSelector,
}

impl<'a> CaseBuilder<'a> {
    #[must_use]
    pub const fn new(selector: &'a ToleranceSelector) -> Self {
        Self { selector }
    }

    /// Determinant case with the table epsilon for the matrix's band.
    pub fn determinant(&self, name: &str, matrix: Matrix) -> Result<TestCase, GenerateError> {
        self.determinant_with(name, matrix, None)
    }

    pub fn determinant_with(
        &self,
        name: &str,
        matrix: Matrix,
        override_epsilon: Option<f64>,
    ) -> Result<TestCase, GenerateError> {
        let diagnostics = diagnose(&matrix);
        let tolerance = self
            .selector
            .select(diagnostics.condition_number, override_epsilon)?;
        tracing::debug!(
            target: "ffx.generate",
            case = name,
            determinant = diagnostics.determinant,
            condition_number = diagnostics.condition_number,
            band = tolerance.band.label(),
            epsilon = tolerance.epsilon,
            "determinant case"
        );
        let case = TestCase::determinant(
            name,
            matrix,
            diagnostics.determinant,
            tolerance,
            diagnostics,
        )?;
        Ok(case)
    }

    /// Solver case whose expected solution comes from the reference solve.
    pub fn solver(
        &self,
        name: &str,
        matrix: Matrix,
        rhs: Vector,
        override_epsilon: Option<f64>,
    ) -> Result<TestCase, GenerateError> {
        let solution = solve(&matrix, &rhs).map_err(|source| GenerateError::Solve {
            case: name.to_owned(),
            source,
        })?;
        self.solver_with_solution(name, matrix, rhs, solution, override_epsilon)
    }

    /// Solver case whose expected solution is known by construction.
    pub fn known_solution(
        &self,
        name: &str,
        matrix: Matrix,
        rhs: Vector,
        x_true: &[f64],
        override_epsilon: Option<f64>,
    ) -> Result<TestCase, GenerateError> {
        self.solver_with_solution(name, matrix, rhs, x_true.to_vec(), override_epsilon)
    }

    fn solver_with_solution(
        &self,
        name: &str,
        matrix: Matrix,
        rhs: Vector,
        solution: Vector,
        override_epsilon: Option<f64>,
    ) -> Result<TestCase, GenerateError> {
        let diagnostics = diagnose(&matrix);
        let tolerance = self
            .selector
            .select(diagnostics.condition_number, override_epsilon)?;
        let residual = relative_residual(&matrix, &solution, &rhs).map_err(|source| {
            GenerateError::Solve {
                case: name.to_owned(),
                source,
            }
        })?;
        tracing::debug!(
            target: "ffx.generate",
            case = name,
            condition_number = diagnostics.condition_number,
            band = tolerance.band.label(),
            epsilon = tolerance.epsilon,
            residual,
            "solver case"
        );
        let case = TestCase::solver(name, matrix, rhs, solution, tolerance, diagnostics)?;
        Ok(case)
    }
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use ffx_emit::Expected;
    use ffx_matrix::known_solution;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn known_solution_cases_are_consistent(
            seed in any::<u64>(),
            x_true in prop::collection::vec(-100.0f64..100.0, 2..7),
        ) {
            let selector = ToleranceSelector::default();
            let (a, b) = known_solution(x_true.len(), seed, &x_true).expect("valid parameters");
            let case = CaseBuilder::new(&selector)
                .known_solution("known", a, b, &x_true, None)
                .expect("case");
            prop_assert_eq!(case.expected(), &Expected::Solution(x_true.clone()));
            let oracle = solve(case.matrix(), case.rhs().unwrap_or_default()).expect("dominant");
            for (x, e) in oracle.iter().zip(&x_true) {
                prop_assert!((x - e).abs() <= case.tolerance().epsilon.max(1e-10) * (1.0 + e.abs()));
            }
        }
    }
}
