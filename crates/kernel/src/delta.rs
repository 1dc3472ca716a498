//! Sparse per-step deltas and the differ that produces them.

use crate::snapshot::FrameState;
use framedelta_common::types::same_position;
use framedelta_common::{EquipmentId, ParticipantId, Position};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Difference between two consecutive [`FrameState`]s.
///
/// `equipment_changes` lists, per participant, every equipment id present in
/// exactly one of the two steps. Additions and removals are not distinguished;
/// a reader holding the previous set recovers the current one by toggling
/// each listed id. For a spawn the list is the full current set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameDelta {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub spawned: BTreeSet<ParticipantId>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub despawned: BTreeSet<ParticipantId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub position_changes: BTreeMap<ParticipantId, Position>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub equipment_changes: BTreeMap<ParticipantId, Vec<EquipmentId>>,
}

impl FrameDelta {
    /// True when nothing changed between the two steps.
    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty()
            && self.despawned.is_empty()
            && self.position_changes.is_empty()
            && self.equipment_changes.is_empty()
    }

    /// Every participant id mentioned anywhere in this delta.
    pub fn participants(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.spawned
            .iter()
            .chain(&self.despawned)
            .chain(self.position_changes.keys())
            .chain(self.equipment_changes.keys())
            .copied()
    }

    /// Every equipment id mentioned anywhere in this delta.
    pub fn equipment(&self) -> impl Iterator<Item = EquipmentId> + '_ {
        self.equipment_changes.values().flatten().copied()
    }
}

/// Compute the delta that turns `previous` into `current`.
///
/// Pure and infallible: ids in `current` are unique by construction of
/// [`FrameState`].
pub fn diff(previous: &FrameState, current: &FrameState) -> FrameDelta {
    let mut delta = FrameDelta::default();

    delta
        .despawned
        .extend(previous.ids().filter(|id| !current.contains(*id)));

    for (id, state) in current.iter() {
        let Some(prev) = previous.get(id) else {
            delta.spawned.insert(id);
            delta.position_changes.insert(id, state.position);
            delta
                .equipment_changes
                .insert(id, state.equipment.iter().copied().collect());
            continue;
        };

        if !same_position(prev.position, state.position) {
            delta.position_changes.insert(id, state.position);
        }

        let changed: Vec<EquipmentId> = prev
            .equipment
            .symmetric_difference(&state.equipment)
            .copied()
            .collect();
        if !changed.is_empty() {
            delta.equipment_changes.insert(id, changed);
        }
    }

    delta
}
