//! File-backed output of an encoded match.
//!
//! Layout inside the output directory:
//! ```text
//! match.json               - structured encoding
//! match.cbor               - compact encoding (match.cbor.zst when compressed)
//! manifest.json            - schema version, counts, artifact hashes
//! ```

use crate::codec::{from_compact, from_json, to_compact, to_json, zstd_compress, zstd_decompress};
use crate::error::PersistError;
use framedelta_kernel::EncodedMatch;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Current manifest schema version.
const MANIFEST_SCHEMA_VERSION: u32 = 1;
const MANIFEST_FILE: &str = "manifest.json";

/// How an encoded match is written to disk.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Wrap the compact encoding in zstd.
    pub compress: bool,
    /// zstd compression level, used only when `compress` is set.
    pub zstd_level: i32,
    /// Indent the JSON encoding.
    pub pretty_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            compress: false,
            zstd_level: 3,
            pretty_json: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFormat {
    Json,
    Cbor,
    CborZstd,
}

impl ArtifactFormat {
    fn filename(self) -> &'static str {
        match self {
            Self::Json => "match.json",
            Self::Cbor => "match.cbor",
            Self::CborZstd => "match.cbor.zst",
        }
    }
}

/// One written file and its hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub filename: String,
    pub format: ArtifactFormat,
    pub bytes: u64,
    pub sha256: String,
}

/// Contents of manifest.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub schema_version: u32,
    pub steps: usize,
    pub players: usize,
    pub equipment_kinds: usize,
    pub artifacts: Vec<ArtifactEntry>,
}

/// A directory holding both encodings of one match plus its manifest.
pub struct OutputStore {
    root: PathBuf,
    manifest: Manifest,
}

impl OutputStore {
    /// Write both encodings and the manifest, creating the directory if needed.
    pub fn write(
        path: impl AsRef<Path>,
        encoded: &EncodedMatch,
        config: &OutputConfig,
    ) -> Result<Self, PersistError> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;

        let json = to_json(encoded, config.pretty_json)?;
        let compact = to_compact(encoded)?;
        let (compact, compact_format) = if config.compress {
            (zstd_compress(&compact, config.zstd_level)?, ArtifactFormat::CborZstd)
        } else {
            (compact, ArtifactFormat::Cbor)
        };

        let mut artifacts = Vec::with_capacity(2);
        for (format, data) in [(ArtifactFormat::Json, &json), (compact_format, &compact)] {
            let filename = format.filename();
            std::fs::write(root.join(filename), data)?;
            tracing::info!(file = filename, bytes = data.len(), "wrote artifact");
            artifacts.push(ArtifactEntry {
                filename: filename.to_owned(),
                format,
                bytes: data.len() as u64,
                sha256: sha256_hex(data),
            });
        }

        let manifest = Manifest {
            schema_version: MANIFEST_SCHEMA_VERSION,
            steps: encoded.frames.len(),
            players: encoded.players.len(),
            equipment_kinds: encoded.equipment.len(),
            artifacts,
        };
        serde_json::to_writer_pretty(std::fs::File::create(root.join(MANIFEST_FILE))?, &manifest)?;

        Ok(Self { root, manifest })
    }

    /// Open a previously written directory. Fails on an unknown schema version.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let root = path.as_ref().to_path_buf();
        let manifest: Manifest =
            serde_json::from_reader(std::fs::File::open(root.join(MANIFEST_FILE))?)?;
        if manifest.schema_version != MANIFEST_SCHEMA_VERSION {
            return Err(PersistError::SchemaMismatch {
                file_version: manifest.schema_version,
                expected_version: MANIFEST_SCHEMA_VERSION,
            });
        }
        Ok(Self { root, manifest })
    }

    /// Verify every artifact listed in the manifest against its recorded hash.
    pub fn verify_integrity(&self) -> Result<(), PersistError> {
        for entry in &self.manifest.artifacts {
            self.read_verified(entry)?;
        }
        Ok(())
    }

    /// Load the match from the compact artifact.
    pub fn load(&self) -> Result<EncodedMatch, PersistError> {
        let entry = self
            .artifact(|f| matches!(f, ArtifactFormat::Cbor | ArtifactFormat::CborZstd))
            .ok_or(PersistError::MissingArtifact("compact"))?;
        let data = self.read_verified(entry)?;
        let data = match entry.format {
            ArtifactFormat::CborZstd => zstd_decompress(&data)?,
            _ => data,
        };
        from_compact(&data)
    }

    /// Load the match from the JSON artifact.
    pub fn load_json(&self) -> Result<EncodedMatch, PersistError> {
        let entry = self
            .artifact(|f| f == ArtifactFormat::Json)
            .ok_or(PersistError::MissingArtifact("json"))?;
        from_json(&self.read_verified(entry)?)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    fn artifact(&self, wanted: impl Fn(ArtifactFormat) -> bool) -> Option<&ArtifactEntry> {
        self.manifest.artifacts.iter().find(|e| wanted(e.format))
    }

    fn read_verified(&self, entry: &ArtifactEntry) -> Result<Vec<u8>, PersistError> {
        let data = std::fs::read(self.root.join(&entry.filename))?;
        let actual = sha256_hex(&data);
        if actual != entry.sha256 {
            return Err(PersistError::IntegrityMismatch {
                artifact: entry.filename.clone(),
                expected: entry.sha256.clone(),
                actual,
            });
        }
        Ok(data)
    }
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use framedelta_kernel::{IterSource, Observation, Timeline};
    use glam::DVec3;

    fn sample() -> EncodedMatch {
        Timeline::run(IterSource::from_steps(vec![
            vec![
                Observation::new(11, "a", DVec3::new(0.25, 0.0, 8.0), ["knife", "glock"]),
                Observation::new(12, "b", DVec3::new(-3.0, 1.0, 0.0), ["knife"]),
            ],
            vec![Observation::new(12, "b", DVec3::new(-3.5, 1.0, 0.0), ["knife", "deagle"])],
        ]))
        .unwrap()
    }

    #[test]
    fn write_then_load_both_encodings() {
        let tmp = tempfile::tempdir().unwrap();
        let encoded = sample();
        OutputStore::write(tmp.path().join("out"), &encoded, &OutputConfig::default()).unwrap();

        let store = OutputStore::open(tmp.path().join("out")).unwrap();
        assert_eq!(store.manifest().steps, 2);
        assert_eq!(store.manifest().players, 2);
        assert_eq!(store.manifest().equipment_kinds, 3);
        assert_eq!(store.load().unwrap(), encoded);
        assert_eq!(store.load_json().unwrap(), encoded);
        assert!(store.root().join("match.cbor").is_file());
    }

    #[test]
    fn compressed_output_loads() {
        let tmp = tempfile::tempdir().unwrap();
        let encoded = sample();
        let config = OutputConfig {
            compress: true,
            zstd_level: 9,
            pretty_json: true,
        };
        let store = OutputStore::write(tmp.path(), &encoded, &config).unwrap();
        assert_eq!(store.manifest().artifacts[1].format, ArtifactFormat::CborZstd);
        assert!(tmp.path().join("match.cbor.zst").is_file());
        assert_eq!(store.load().unwrap(), encoded);
    }

    #[test]
    fn integrity_passes_on_fresh_output() {
        let tmp = tempfile::tempdir().unwrap();
        let store = OutputStore::write(tmp.path(), &sample(), &OutputConfig::default()).unwrap();
        store.verify_integrity().unwrap();
    }

    #[test]
    fn integrity_fail_closed_on_corruption() {
        let tmp = tempfile::tempdir().unwrap();
        OutputStore::write(tmp.path(), &sample(), &OutputConfig::default()).unwrap();

        let path = tmp.path().join("match.cbor");
        let mut data = std::fs::read(&path).unwrap();
        if let Some(byte) = data.last_mut() {
            *byte ^= 0xff;
        }
        std::fs::write(&path, &data).unwrap();

        let store = OutputStore::open(tmp.path()).unwrap();
        assert!(store.verify_integrity().is_err());
        match store.load() {
            Err(PersistError::IntegrityMismatch { artifact, .. }) => {
                assert_eq!(artifact, "match.cbor")
            }
            Err(e) => panic!("expected IntegrityMismatch, got: {e}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
        // the untouched artifact is still readable
        assert!(store.load_json().is_ok());
    }

    #[test]
    fn schema_mismatch_fail_closed() {
        let tmp = tempfile::tempdir().unwrap();
        OutputStore::write(tmp.path(), &sample(), &OutputConfig::default()).unwrap();

        let manifest_path = tmp.path().join(MANIFEST_FILE);
        let mut manifest: Manifest =
            serde_json::from_reader(std::fs::File::open(&manifest_path).unwrap()).unwrap();
        manifest.schema_version = 999;
        serde_json::to_writer_pretty(std::fs::File::create(&manifest_path).unwrap(), &manifest)
            .unwrap();

        match OutputStore::open(tmp.path()) {
            Err(PersistError::SchemaMismatch {
                file_version,
                expected_version,
            }) => {
                assert_eq!(file_version, 999);
                assert_eq!(expected_version, MANIFEST_SCHEMA_VERSION);
            }
            Err(e) => panic!("expected SchemaMismatch, got: {e}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn unreadable_json_is_never_written() {
        let tmp = tempfile::tempdir().unwrap();
        let encoded = Timeline::run(IterSource::from_steps(vec![vec![Observation::new(
            3,
            "c",
            DVec3::new(0.0, f64::INFINITY, 0.0),
            ["knife"],
        )]]))
        .unwrap();

        let result = OutputStore::write(tmp.path(), &encoded, &OutputConfig::default());
        assert!(matches!(result, Err(PersistError::NonFinitePosition { step: 0, .. })));
        assert!(!tmp.path().join("match.json").exists());
        assert!(!tmp.path().join(MANIFEST_FILE).exists());
    }

    #[test]
    fn identical_input_gives_identical_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let a = OutputStore::write(tmp.path().join("a"), &sample(), &OutputConfig::default()).unwrap();
        let b = OutputStore::write(tmp.path().join("b"), &sample(), &OutputConfig::default()).unwrap();
        for (x, y) in a.manifest().artifacts.iter().zip(&b.manifest().artifacts) {
            assert_eq!(x.sha256, y.sha256);
        }
    }
}
