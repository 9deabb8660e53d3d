#![forbid(unsafe_code)]

//! Determinant and LU-solver fixture generation.
//!
//! Each suite is a fixed catalog of named cases grouped into sections.
//! A run builds the selected suites, renders every case through the
//! suite's [`FixtureEmitter`] target, closes each suite with curation
//! notes, writes the text to one output stream, and returns a
//! [`Manifest`] describing what was written.
//!
//! Catalog construction is pure: the same configuration always yields
//! byte-identical fixture text and manifest.

pub mod cases;
pub mod config;
pub mod determinant;
pub mod manifest;
pub mod solver;

pub use cases::{CaseBuilder, Section};
pub use config::{GeneratorConfig, Suite, SuiteSelection};
pub use manifest::{MANIFEST_SCHEMA_VERSION, Manifest, ManifestEntry};

use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::PathBuf;

use ffx_emit::{CaseError, FixtureEmitter, TestCase};
use ffx_matrix::MatrixError;
use ffx_oracle::{OracleError, ToleranceError, ToleranceSelector};
use thiserror::Error;

/// Second line of every suite preamble.
pub const REFERENCE_NOTE: &str =
    "Reference: nalgebra (partial-pivot LU, SVD condition number, real Schur eigenvalues)";

/// Banner title of the curation notes closing each suite.
pub const USAGE_TITLE: &str = "Usage Instructions";

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("config load failed for {path}: {source}")]
    ConfigIo { path: PathBuf, source: io::Error },
    #[error("config parse failed for {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("manifest write failed for {path}: {source}")]
    ManifestIo { path: PathBuf, source: io::Error },
    #[error("manifest encoding failed: {0}")]
    ManifestEncode(#[source] serde_json::Error),
    #[error("fixture output failed: {0}")]
    Output(#[source] io::Error),
    #[error("matrix construction failed: {0}")]
    Matrix(#[from] MatrixError),
    #[error("reference solve failed for `{case}`: {source}")]
    Solve { case: String, source: OracleError },
    #[error("tolerance selection failed: {0}")]
    Tolerance(#[from] ToleranceError),
    #[error("invalid test case: {0}")]
    Case(#[from] CaseError),
    #[error("duplicate test case name `{name}`")]
    DuplicateCase { name: String },
}

#[must_use]
pub const fn suite_title(suite: Suite) -> &'static str {
    match suite {
        Suite::Determinant => determinant::TITLE,
        Suite::Solver => solver::TITLE,
    }
}

#[must_use]
pub const fn suite_notes(suite: Suite) -> &'static [&'static str] {
    match suite {
        Suite::Determinant => determinant::USAGE_NOTES,
        Suite::Solver => solver::USAGE_NOTES,
    }
}

pub fn suite_sections(
    suite: Suite,
    selector: &ToleranceSelector,
) -> Result<Vec<Section>, GenerateError> {
    match suite {
        Suite::Determinant => determinant::sections(selector),
        Suite::Solver => solver::sections(selector),
    }
}

/// Generate the configured suites into `out`, then write the manifest
/// file when `config.manifest_path` is set.
pub fn run<W: Write>(config: &GeneratorConfig, out: &mut W) -> Result<Manifest, GenerateError> {
    let manifest = generate(config, out)?;
    if let Some(path) = &config.manifest_path {
        manifest.write_json(path)?;
        tracing::info!(
            target: "ffx.generate",
            path = %path.display(),
            cases = manifest.case_count,
            "manifest written"
        );
    }
    Ok(manifest)
}

/// Generate the configured suites into `out` without touching the filesystem.
pub fn generate<W: Write>(
    config: &GeneratorConfig,
    out: &mut W,
) -> Result<Manifest, GenerateError> {
    let selector = ToleranceSelector::new(config.tolerance)?;
    let suites = config.suites.suites();
    let mut session = Session::new(out);

    for &suite in &suites {
        let emitter = FixtureEmitter::new(config.target_for(suite).clone());
        let sections = suite_sections(suite, &selector)?;
        tracing::info!(
            target: "ffx.generate",
            suite = suite.as_str(),
            layout = emitter.target().layout.as_str(),
            sections = sections.len(),
            "generating suite"
        );
        session.write(&emitter.preamble(&[suite_title(suite), REFERENCE_NOTE]))?;
        for section in &sections {
            session.write(&emitter.section_banner(section.title))?;
            for case in &section.cases {
                session.case(suite, section.title, case, &emitter.render(case))?;
            }
        }
        session.write(&emitter.closing_notes(USAGE_TITLE, suite_notes(suite)))?;
    }

    let manifest = session.finish(suites)?;
    tracing::info!(
        target: "ffx.generate",
        cases = manifest.case_count,
        output_blake3 = %manifest.output_blake3,
        "generation complete"
    );
    Ok(manifest)
}

/// Output sink for one run: hashes everything written and rejects
/// duplicate case names across suites.
struct Session<'w, W: Write> {
    out: &'w mut W,
    hasher: blake3::Hasher,
    names: BTreeSet<String>,
    entries: Vec<ManifestEntry>,
}

impl<'w, W: Write> Session<'w, W> {
    fn new(out: &'w mut W) -> Self {
        Self {
            out,
            hasher: blake3::Hasher::new(),
            names: BTreeSet::new(),
            entries: Vec::new(),
        }
    }

    fn write(&mut self, text: &str) -> Result<(), GenerateError> {
        self.hasher.update(text.as_bytes());
        self.out
            .write_all(text.as_bytes())
            .map_err(GenerateError::Output)
    }

    fn case(
        &mut self,
        suite: Suite,
        section: &str,
        case: &TestCase,
        rendered: &str,
    ) -> Result<(), GenerateError> {
        if !self.names.insert(case.name().to_owned()) {
            return Err(GenerateError::DuplicateCase {
                name: case.name().to_owned(),
            });
        }
        self.write(rendered)?;
        self.entries
            .push(ManifestEntry::new(suite, section, case, rendered));
        Ok(())
    }

    fn finish(self, suites: Vec<Suite>) -> Result<Manifest, GenerateError> {
        self.out.flush().map_err(GenerateError::Output)?;
        Ok(Manifest {
            schema_version: MANIFEST_SCHEMA_VERSION,
            suites,
            case_count: self.entries.len(),
            output_blake3: self.hasher.finalize().to_hex().to_string(),
            entries: self.entries,
        })
    }
}
