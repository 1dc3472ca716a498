use framedelta_common::{EquipmentId, ParticipantId, Position, StableKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One active entity as reported by the recording for a single step.
///
/// This is the raw, un-interned form consumed by the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub stable_key: StableKey,
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub equipment: Vec<String>,
}

impl Observation {
    pub fn new(
        stable_key: u64,
        name: impl Into<String>,
        position: Position,
        equipment: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            stable_key: StableKey(stable_key),
            name: name.into(),
            position,
            equipment: equipment.into_iter().map(Into::into).collect(),
        }
    }
}

/// Interned state of one participant at one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticipantState {
    pub position: Position,
    pub equipment: BTreeSet<EquipmentId>,
}

/// Surrogate-keyed state of every active participant at one step.
///
/// BTreeMap keeps iteration, and therefore delta output, in id order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameState {
    participants: BTreeMap<ParticipantId, ParticipantState>,
}

impl FrameState {
    /// The state before the first step: nobody is present.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a participant. Returns the rejected state if the id is already present.
    pub fn insert(
        &mut self,
        id: ParticipantId,
        state: ParticipantState,
    ) -> Result<(), ParticipantState> {
        if self.participants.contains_key(&id) {
            return Err(state);
        }
        self.participants.insert(id, state);
        Ok(())
    }

    pub fn get(&self, id: ParticipantId) -> Option<&ParticipantState> {
        self.participants.get(&id)
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.participants.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.participants.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParticipantId, &ParticipantState)> {
        self.participants.iter().map(|(id, s)| (*id, s))
    }
}
