use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ffx_emit::{Layout, TargetConfig};
use ffx_oracle::ToleranceTable;
use serde::{Deserialize, Serialize};

use crate::GenerateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suite {
    Determinant,
    Solver,
}

impl Suite {
    pub const ALL: [Self; 2] = [Self::Determinant, Self::Solver];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Determinant => "determinant",
            Self::Solver => "solver",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteSelection {
    Determinant,
    Solver,
    #[default]
    All,
}

impl SuiteSelection {
    #[must_use]
    pub fn suites(self) -> Vec<Suite> {
        match self {
            Self::Determinant => vec![Suite::Determinant],
            Self::Solver => vec![Suite::Solver],
            Self::All => Suite::ALL.to_vec(),
        }
    }
}

impl FromStr for SuiteSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "determinant" | "det" => Ok(Self::Determinant),
            "solver" | "solve" => Ok(Self::Solver),
            "all" => Ok(Self::All),
            other => Err(format!(
                "unknown suite `{other}` (expected determinant|solver|all)"
            )),
        }
    }
}

/// Everything a generation run reads besides the hard-coded case catalog.
///
/// The default reproduces the stock fixture files: determinant cases in
/// nested-row form, solver cases behind `mdspan` views, the built-in
/// tolerance table, and no manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub suites: SuiteSelection,
    pub determinant_target: TargetConfig,
    pub solver_target: TargetConfig,
    pub tolerance: ToleranceTable,
    pub manifest_path: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            suites: SuiteSelection::All,
            determinant_target: TargetConfig::default().with_layout(Layout::NestedRows),
            solver_target: TargetConfig::default().with_layout(Layout::FlatRowMajor),
            tolerance: ToleranceTable::default(),
            manifest_path: None,
        }
    }
}

impl GeneratorConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, GenerateError> {
        let raw = fs::read_to_string(path).map_err(|source| GenerateError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| GenerateError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    #[must_use]
    pub fn target_for(&self, suite: Suite) -> &TargetConfig {
        match suite {
            Suite::Determinant => &self.determinant_target,
            Suite::Solver => &self.solver_target,
        }
    }

    /// Force one layout on every suite.
    pub fn set_layout(&mut self, layout: Layout) {
        self.determinant_target.layout = layout;
        self.solver_target.layout = layout;
    }
}
