//! Run manifest: one entry per emitted case plus digests of the output.
//!
//! Two runs with the same configuration must produce byte-identical
//! manifests, so nothing time- or host-dependent is recorded.

use std::fs;
use std::path::Path;

use ffx_emit::TestCase;
use ffx_oracle::{ConditionBand, ToleranceSource};
use serde::{Deserialize, Serialize};

use crate::GenerateError;
use crate::config::Suite;

pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub suite: Suite,
    pub section: String,
    pub name: String,
    pub kind: String,
    pub dimension: usize,
    pub band: ConditionBand,
    pub tolerance_source: ToleranceSource,
    pub epsilon: f64,
    /// `None` when the condition number is infinite.
    pub condition_number: Option<f64>,
    pub blake3: String,
}

impl ManifestEntry {
    #[must_use]
    pub fn new(suite: Suite, section: &str, case: &TestCase, rendered: &str) -> Self {
        let condition_number = case.diagnostics().condition_number;
        Self {
            suite,
            section: section.to_owned(),
            name: case.name().to_owned(),
            kind: case.kind().as_str().to_owned(),
            dimension: case.matrix().dimension(),
            band: case.tolerance().band,
            tolerance_source: case.tolerance().source,
            epsilon: case.tolerance().epsilon,
            condition_number: condition_number.is_finite().then_some(condition_number),
            blake3: blake3::hash(rendered.as_bytes()).to_hex().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub schema_version: u32,
    pub suites: Vec<Suite>,
    pub case_count: usize,
    /// Digest of the complete fixture text written by the run.
    pub output_blake3: String,
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn write_json(&self, path: &Path) -> Result<(), GenerateError> {
        let json = serde_json::to_string_pretty(self).map_err(GenerateError::ManifestEncode)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| GenerateError::ManifestIo {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| GenerateError::ManifestIo {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn read_json(path: &Path) -> Result<Self, GenerateError> {
        let raw = fs::read_to_string(path).map_err(|source| GenerateError::ManifestIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(GenerateError::ManifestEncode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffx_matrix::fixed;
    use ffx_oracle::{Tolerance, diagnose};

    fn sample_case() -> TestCase {
        let a = fixed(&[vec![1.0, 2.0], vec![2.0, 4.0]]).expect("valid");
        let d = diagnose(&a);
        TestCase::determinant(
            "Rank one",
            a,
            0.0,
            Tolerance {
                epsilon: 1e-10,
                band: ConditionBand::Singular,
                source: ToleranceSource::Table,
            },
            d,
        )
        .expect("valid case")
    }

    #[test]
    fn entry_digest_tracks_rendered_text() {
        let case = sample_case();
        let a = ManifestEntry::new(Suite::Determinant, "Singular", &case, "block");
        let b = ManifestEntry::new(Suite::Determinant, "Singular", &case, "block");
        let c = ManifestEntry::new(Suite::Determinant, "Singular", &case, "block ");
        assert_eq!(a.blake3, b.blake3);
        assert_ne!(a.blake3, c.blake3);
        assert_eq!(a.blake3.len(), 64);
        assert_eq!(a.kind, "determinant");
    }

    #[test]
    fn json_round_trip_through_file() {
        let case = sample_case();
        let manifest = Manifest {
            schema_version: MANIFEST_SCHEMA_VERSION,
            suites: vec![Suite::Determinant],
            case_count: 1,
            output_blake3: blake3::hash(b"text").to_hex().to_string(),
            entries: vec![ManifestEntry::new(Suite::Determinant, "Singular", &case, "x")],
        };
        let dir = std::env::temp_dir().join(format!("ffx-manifest-{}", std::process::id()));
        let path = dir.join("nested").join("manifest.json");
        manifest.write_json(&path).expect("write manifest");
        let loaded = Manifest::read_json(&path).expect("read manifest");
        assert_eq!(loaded, manifest);
        assert!(loaded.entry("Rank one").is_some());
        let _ = fs::remove_dir_all(&dir);
    }
}
