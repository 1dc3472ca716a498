//! Collaborators around the delta kernel: where snapshots come from and where
//! encoded matches go.
//!
//! # Invariants
//! - Both encodings are lossless: decoding yields an aggregate equal to the one encoded.
//! - Decoded aggregates are validated before being handed out.
//! - Artifacts on disk are verified against the manifest hash before decoding.

pub mod baseline;
pub mod codec;
pub mod error;
pub mod jsonl;
pub mod store;

pub use baseline::{SizeReport, naive_json};
pub use codec::{from_compact, from_json, to_compact, to_json};
pub use error::PersistError;
pub use jsonl::{JsonLinesSource, write_step};
pub use store::{ArtifactEntry, ArtifactFormat, Manifest, OutputConfig, OutputStore};
