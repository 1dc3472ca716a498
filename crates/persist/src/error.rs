use framedelta_common::ParticipantId;
use framedelta_kernel::{TableError, ValidationError};

/// Errors from reading snapshot streams and reading or writing encoded matches.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CBOR serialization error: {0}")]
    CborEncode(String),
    #[error("CBOR deserialization error: {0}")]
    CborDecode(String),
    #[error("malformed step {step} on line {line}: {source}")]
    MalformedStep {
        step: usize,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("step {step}: position of {id} is not finite and has no JSON form")]
    NonFinitePosition { step: usize, id: ParticipantId },
    #[error("unsupported compact format version {0}")]
    UnsupportedCompactVersion(u32),
    #[error("table error: {0}")]
    Table(#[from] TableError),
    #[error("decoded match is inconsistent: {0}")]
    Invalid(#[from] ValidationError),
    #[error("integrity check failed for {artifact}: expected {expected}, got {actual}")]
    IntegrityMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },
    #[error("schema version mismatch: file has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
    #[error("manifest lists no {0} artifact")]
    MissingArtifact(&'static str),
}
