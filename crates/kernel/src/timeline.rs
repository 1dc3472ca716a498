use crate::delta::{FrameDelta, diff};
use crate::error::{EncodeError, SurrogateExhausted, ValidationError};
use crate::interner::{EquipmentTable, Interner, PlayerTable};
use crate::snapshot::{FrameState, Observation, ParticipantState};
use crate::source::SnapshotSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The encoded form of one recorded match.
///
/// `frames[i]` is the delta produced for input step `i`; every id it refers to
/// resolves in `players` or `equipment`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedMatch {
    pub players: PlayerTable,
    pub equipment: EquipmentTable,
    pub frames: Vec<FrameDelta>,
}

impl EncodedMatch {
    /// Check that every referenced id exists and every spawn carries full state.
    ///
    /// Table density is enforced when the tables are built, so only frame
    /// contents are inspected here.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (step, frame) in self.frames.iter().enumerate() {
            if let Some(id) = frame.participants().find(|id| !self.players.contains(*id)) {
                return Err(ValidationError::UnknownParticipant { step, id });
            }
            if let Some(id) = frame.equipment().find(|id| !self.equipment.contains(*id)) {
                return Err(ValidationError::UnknownEquipment { step, id });
            }
            for &id in &frame.spawned {
                if frame.despawned.contains(&id) {
                    return Err(ValidationError::SpawnDespawnOverlap { step, id });
                }
                if !frame.position_changes.contains_key(&id)
                    || !frame.equipment_changes.contains_key(&id)
                {
                    return Err(ValidationError::IncompleteSpawn { step, id });
                }
            }
        }
        Ok(())
    }

    /// Summarize the encoded match.
    pub fn stats(&self) -> MatchStats {
        let mut stats = MatchStats {
            steps: self.frames.len(),
            players: self.players.len(),
            equipment_kinds: self.equipment.len(),
            ..MatchStats::default()
        };
        for frame in &self.frames {
            stats.spawns += frame.spawned.len();
            stats.despawns += frame.despawned.len();
            stats.position_changes += frame.position_changes.len();
            stats.equipment_changes += frame.equipment_changes.len();
            if frame.is_empty() {
                stats.empty_frames += 1;
            }
        }
        stats
    }
}

/// Counts describing an [`EncodedMatch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub steps: usize,
    pub players: usize,
    pub equipment_kinds: usize,
    pub spawns: usize,
    pub despawns: usize,
    pub position_changes: usize,
    pub equipment_changes: usize,
    pub empty_frames: usize,
}

impl fmt::Display for MatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Match: steps={} players={} equipment_kinds={} spawns={} despawns={} \
             position_changes={} equipment_changes={} empty_frames={}",
            self.steps,
            self.players,
            self.equipment_kinds,
            self.spawns,
            self.despawns,
            self.position_changes,
            self.equipment_changes,
            self.empty_frames
        )
    }
}

/// Accumulates frame deltas one input step at a time.
///
/// Owns the interning tables and the previous step's state. After a
/// [`push_step`](Self::push_step) error the timeline is no longer consistent
/// and must be dropped.
#[derive(Debug, Default)]
pub struct Timeline {
    interner: Interner,
    previous: FrameState,
    frames: Vec<FrameDelta>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of steps encoded so far.
    pub fn step_count(&self) -> usize {
        self.frames.len()
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// State of the most recently encoded step.
    pub fn current(&self) -> &FrameState {
        &self.previous
    }

    /// Intern one step's observations, diff against the previous step, and
    /// append the resulting delta.
    pub fn push_step(&mut self, observations: &[Observation]) -> Result<&FrameDelta, EncodeError> {
        let step = self.frames.len();
        let _span = tracing::debug_span!("encode_step", step).entered();

        let exhausted = |e: SurrogateExhausted| EncodeError::SurrogateExhausted {
            step,
            namespace: e.namespace,
        };

        let mut current = FrameState::empty();
        for obs in observations {
            let (id, fresh) = self
                .interner
                .resolve_participant(obs.stable_key, &obs.name)
                .map_err(exhausted)?;
            if fresh {
                tracing::debug!(%id, key = %obs.stable_key, name = %obs.name, "new participant");
            }

            let mut equipment = BTreeSet::new();
            for item in &obs.equipment {
                let (eq, fresh) = self.interner.resolve_equipment(item).map_err(exhausted)?;
                if fresh {
                    tracing::debug!(id = %eq, item = %item, "new equipment kind");
                }
                equipment.insert(eq);
            }

            let state = ParticipantState {
                position: obs.position,
                equipment,
            };
            if current.insert(id, state).is_err() {
                return Err(EncodeError::DuplicateParticipant {
                    step,
                    key: obs.stable_key,
                });
            }
        }

        let delta = diff(&self.previous, &current);
        tracing::trace!(
            spawned = delta.spawned.len(),
            despawned = delta.despawned.len(),
            moved = delta.position_changes.len(),
            "step encoded"
        );
        self.previous = current;
        self.frames.push(delta);
        Ok(&self.frames[step])
    }

    /// Hand over the tables and the accumulated timeline.
    pub fn finish(self) -> EncodedMatch {
        let (players, equipment) = self.interner.into_tables();
        EncodedMatch {
            players,
            equipment,
            frames: self.frames,
        }
    }

    /// Fold an entire source into an [`EncodedMatch`].
    ///
    /// A source error aborts the run; no partial result is returned.
    pub fn run<S: SnapshotSource>(mut source: S) -> Result<EncodedMatch, EncodeError> {
        let _span = tracing::info_span!("encode_timeline").entered();
        let mut timeline = Self::new();
        loop {
            let step = timeline.step_count();
            let observations = source.next_step().map_err(|e| EncodeError::Source {
                step,
                source: Box::new(e),
            })?;
            let Some(observations) = observations else {
                break;
            };
            timeline.push_step(&observations)?;
        }
        let encoded = timeline.finish();
        tracing::info!(
            steps = encoded.frames.len(),
            players = encoded.players.len(),
            equipment_kinds = encoded.equipment.len(),
            "timeline encoded"
        );
        Ok(encoded)
    }
}
