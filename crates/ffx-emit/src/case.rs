use ffx_matrix::{Matrix, Vector};
use ffx_oracle::{ConditionBand, Diagnostics, Tolerance};

/// Reference output recorded in a fixture.
#[derive(Debug, Clone, PartialEq)]
pub enum Expected {
    Determinant(f64),
    Solution(Vector),
}

impl Expected {
    #[must_use]
    pub const fn kind(&self) -> CaseKind {
        match self {
            Self::Determinant(_) => CaseKind::Determinant,
            Self::Solution(_) => CaseKind::Solver,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseKind {
    Determinant,
    Solver,
}

impl CaseKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Determinant => "determinant",
            Self::Solver => "solver",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaseError {
    EmptyName,
    RhsLengthMismatch { n: usize, len: usize },
    SolutionLengthMismatch { n: usize, len: usize },
    InvalidEpsilon { value: f64 },
    NonFiniteExpected,
}

impl std::fmt::Display for CaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "test case name must not be empty"),
            Self::RhsLengthMismatch { n, len } => {
                write!(f, "rhs has length {len}, matrix dimension is {n}")
            }
            Self::SolutionLengthMismatch { n, len } => {
                write!(f, "expected solution has length {len}, matrix dimension is {n}")
            }
            Self::InvalidEpsilon { value } => {
                write!(f, "tolerance epsilon must be finite and positive, got {value}")
            }
            Self::NonFiniteExpected => write!(f, "expected output must be finite"),
        }
    }
}

impl std::error::Error for CaseError {}

/// One generated fixture: inputs, reference output, epsilon, diagnostics.
///
/// Determinant cases carry no rhs; solver cases carry an rhs and a
/// solution of the matrix's dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    name: String,
    matrix: Matrix,
    rhs: Option<Vector>,
    expected: Expected,
    tolerance: Tolerance,
    diagnostics: Diagnostics,
}

impl TestCase {
    pub fn determinant(
        name: impl Into<String>,
        matrix: Matrix,
        determinant: f64,
        tolerance: Tolerance,
        diagnostics: Diagnostics,
    ) -> Result<Self, CaseError> {
        let name = checked_name(name)?;
        check_epsilon(&tolerance)?;
        if !determinant.is_finite() {
            return Err(CaseError::NonFiniteExpected);
        }
        Ok(Self {
            name,
            matrix,
            rhs: None,
            expected: Expected::Determinant(determinant),
            tolerance,
            diagnostics,
        })
    }

    pub fn solver(
        name: impl Into<String>,
        matrix: Matrix,
        rhs: Vector,
        solution: Vector,
        tolerance: Tolerance,
        diagnostics: Diagnostics,
    ) -> Result<Self, CaseError> {
        let name = checked_name(name)?;
        check_epsilon(&tolerance)?;
        let n = matrix.dimension();
        if rhs.len() != n {
            return Err(CaseError::RhsLengthMismatch { n, len: rhs.len() });
        }
        if solution.len() != n {
            return Err(CaseError::SolutionLengthMismatch {
                n,
                len: solution.len(),
            });
        }
        if rhs.iter().chain(&solution).any(|v| !v.is_finite()) {
            return Err(CaseError::NonFiniteExpected);
        }
        Ok(Self {
            name,
            matrix,
            rhs: Some(rhs),
            expected: Expected::Solution(solution),
            tolerance,
            diagnostics,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    #[must_use]
    pub fn rhs(&self) -> Option<&[f64]> {
        self.rhs.as_deref()
    }

    #[must_use]
    pub const fn expected(&self) -> &Expected {
        &self.expected
    }

    #[must_use]
    pub const fn kind(&self) -> CaseKind {
        self.expected.kind()
    }

    #[must_use]
    pub const fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// doctest `Approx` scale for a determinant check.
    ///
    /// `Approx` accepts `|a - e| < eps * (scale + max(|a|, |e|))`. With the
    /// default scale of 1 any expected value far below `eps` also accepts
    /// zero, so nonsingular cases compare purely relatively (scale 0) and
    /// only the singular band keeps the absolute floor around zero.
    #[must_use]
    pub fn approx_scale(&self) -> f64 {
        if self.tolerance.band == ConditionBand::Singular {
            1.0
        } else {
            0.0
        }
    }

    /// `1 + max|x_expected|` for solver cases.
    #[must_use]
    pub fn solution_scale(&self) -> Option<f64> {
        match &self.expected {
            Expected::Solution(x) => {
                Some(1.0 + x.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())))
            }
            Expected::Determinant(_) => None,
        }
    }

    /// Largest per-component error a solver fixture accepts:
    /// `eps * (1 + max|x_expected|)`.
    #[must_use]
    pub fn acceptance_bound(&self) -> Option<f64> {
        self.solution_scale().map(|scale| self.tolerance.epsilon * scale)
    }
}

fn checked_name(name: impl Into<String>) -> Result<String, CaseError> {
    let name = name.into();
    if name.trim().is_empty() {
        return Err(CaseError::EmptyName);
    }
    Ok(name)
}

fn check_epsilon(tolerance: &Tolerance) -> Result<(), CaseError> {
    let value = tolerance.epsilon;
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CaseError::InvalidEpsilon { value })
    }
}
