//! Delta kernel: identity interning, snapshot diffing, and the timeline fold.
//!
//! # Invariants
//! - Surrogate ids are dense per namespace, start at 1, and are never reused.
//! - Every id referenced by a frame delta exists in its table.
//! - A spawn always carries the participant's full state.
//! - The fold is single-pass and deterministic for a fixed input order.

pub mod delta;
pub mod error;
pub mod interner;
pub mod snapshot;
pub mod source;
pub mod timeline;

pub use delta::{FrameDelta, diff};
pub use error::{EncodeError, SurrogateExhausted, TableError, ValidationError};
pub use interner::{EquipmentRecord, EquipmentTable, Interner, PlayerRecord, PlayerTable};
pub use snapshot::{FrameState, Observation, ParticipantState};
pub use source::{IterSource, SnapshotSource};
pub use timeline::{EncodedMatch, MatchStats, Timeline};
