use framedelta_common::{EquipmentId, ParticipantId, StableKey};

/// Fatal errors raised while folding a snapshot stream into a timeline.
///
/// Every variant carries the index of the step being encoded when it occurred.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("snapshot source failed at step {step}: {source}")]
    Source {
        step: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("step {step}: stable key {key} observed more than once")]
    DuplicateParticipant { step: usize, key: StableKey },
    #[error("step {step}: {namespace} surrogate ids exhausted")]
    SurrogateExhausted {
        step: usize,
        namespace: &'static str,
    },
}

/// The 32-bit surrogate counter of a namespace ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{namespace} surrogate ids exhausted")]
pub struct SurrogateExhausted {
    pub namespace: &'static str,
}

/// Errors rebuilding a surrogate table from serialized records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("{namespace} table is not dense: record {position} has id {found}")]
    NotDense {
        namespace: &'static str,
        position: usize,
        found: u32,
    },
    #[error("{namespace} table maps key {key} twice")]
    DuplicateKey { namespace: &'static str, key: String },
}

/// Referential or completeness violations found by [`EncodedMatch::validate`].
///
/// [`EncodedMatch::validate`]: crate::EncodedMatch::validate
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("frame {step}: participant {id} is not in the player table")]
    UnknownParticipant { step: usize, id: ParticipantId },
    #[error("frame {step}: equipment {id} is not in the equipment table")]
    UnknownEquipment { step: usize, id: EquipmentId },
    #[error("frame {step}: spawn of {id} lacks its full state")]
    IncompleteSpawn { step: usize, id: ParticipantId },
    #[error("frame {step}: {id} both spawned and despawned")]
    SpawnDespawnOverlap { step: usize, id: ParticipantId },
}
