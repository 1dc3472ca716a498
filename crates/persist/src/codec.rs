//! The two encodings of an [`EncodedMatch`].
//!
//! - JSON: self-describing, field names preserved, empty delta fields omitted.
//! - Compact: CBOR of positional tuples. Surrogate ids are implicit in table
//!   order, so the tables carry only keys and names, and empty frames are
//!   omitted (each stored frame carries its step index).

use crate::error::PersistError;
use framedelta_common::{EquipmentId, ParticipantId, Position, StableKey};
use framedelta_kernel::{
    EncodedMatch, EquipmentRecord, EquipmentTable, FrameDelta, PlayerRecord, PlayerTable,
};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Version tag written as the first element of the compact form.
pub const COMPACT_VERSION: u32 = 1;

/// Longest timeline the compact decoder accepts. Empty frames cost nothing on
/// disk, so the stored step count is checked against this before allocating.
pub const MAX_COMPACT_STEPS: usize = 1 << 24;

/// `(spawned, despawned, position_changes, equipment_changes)`
type CompactFrame = (Vec<u32>, Vec<u32>, Vec<(u32, [f64; 3])>, Vec<(u32, Vec<u32>)>);

/// `(version, step count, players as (stable_key, name), equipment names,
/// non-empty frames as (step, frame))`
#[derive(Serialize, Deserialize)]
struct CompactMatch(
    u32,
    u64,
    Vec<(u64, String)>,
    Vec<String>,
    Vec<(u64, CompactFrame)>,
);

/// Encode as JSON.
///
/// JSON has no representation for NaN or infinity, so a match holding a
/// non-finite position is rejected rather than written as `null`.
pub fn to_json(encoded: &EncodedMatch, pretty: bool) -> Result<Vec<u8>, PersistError> {
    for (step, frame) in encoded.frames.iter().enumerate() {
        if let Some((&id, _)) = frame.position_changes.iter().find(|(_, p)| !p.is_finite()) {
            return Err(PersistError::NonFinitePosition { step, id });
        }
    }
    let bytes = if pretty {
        serde_json::to_vec_pretty(encoded)?
    } else {
        serde_json::to_vec(encoded)?
    };
    Ok(bytes)
}

/// Decode JSON and validate the result.
pub fn from_json(data: &[u8]) -> Result<EncodedMatch, PersistError> {
    let encoded: EncodedMatch = serde_json::from_slice(data)?;
    encoded.validate()?;
    Ok(encoded)
}

/// Encode as compact CBOR.
pub fn to_compact(encoded: &EncodedMatch) -> Result<Vec<u8>, PersistError> {
    if encoded.frames.len() > MAX_COMPACT_STEPS {
        return Err(PersistError::CborEncode(format!(
            "{} steps exceed the limit of {MAX_COMPACT_STEPS}",
            encoded.frames.len()
        )));
    }
    let players = encoded
        .players
        .records()
        .map(|r| (r.stable_key.0, r.name))
        .collect();
    let equipment = encoded.equipment.records().map(|r| r.name).collect();
    let frames = encoded
        .frames
        .iter()
        .enumerate()
        .filter(|(_, frame)| !frame.is_empty())
        .map(|(step, frame)| (step as u64, compact_frame(frame)))
        .collect();
    cbor_serialize(&CompactMatch(
        COMPACT_VERSION,
        encoded.frames.len() as u64,
        players,
        equipment,
        frames,
    ))
}

/// Decode compact CBOR and validate the result.
pub fn from_compact(data: &[u8]) -> Result<EncodedMatch, PersistError> {
    let CompactMatch(version, steps, players, equipment, stored) = cbor_deserialize(data)?;
    if version != COMPACT_VERSION {
        return Err(PersistError::UnsupportedCompactVersion(version));
    }

    let players = PlayerTable::from_records(
        players
            .into_iter()
            .zip(1..)
            .map(|((key, name), raw)| PlayerRecord {
                stable_key: StableKey(key),
                id: ParticipantId(raw),
                name,
            })
            .collect(),
    )?;
    let equipment = EquipmentTable::from_records(
        equipment
            .into_iter()
            .zip(1..)
            .map(|(name, raw)| EquipmentRecord {
                id: EquipmentId(raw),
                name,
            })
            .collect(),
    )?;
    let steps = usize::try_from(steps)
        .ok()
        .filter(|&n| n <= MAX_COMPACT_STEPS)
        .ok_or_else(|| {
            PersistError::CborDecode(format!(
                "step count {steps} exceeds the limit of {MAX_COMPACT_STEPS}"
            ))
        })?;
    let mut frames = Vec::new();
    frames
        .try_reserve_exact(steps)
        .map_err(|e| PersistError::CborDecode(format!("cannot hold {steps} frames: {e}")))?;
    for (step, frame) in stored {
        let step = usize::try_from(step).unwrap_or(usize::MAX);
        if step < frames.len() || step >= steps {
            return Err(PersistError::CborDecode(format!(
                "frame index {step} out of order or beyond {steps} steps"
            )));
        }
        frames.resize_with(step, FrameDelta::default);
        frames.push(expand_frame(frame));
    }
    frames.resize_with(steps, FrameDelta::default);

    let encoded = EncodedMatch {
        players,
        equipment,
        frames,
    };
    encoded.validate()?;
    Ok(encoded)
}

fn compact_frame(frame: &FrameDelta) -> CompactFrame {
    (
        frame.spawned.iter().map(|id| id.0).collect(),
        frame.despawned.iter().map(|id| id.0).collect(),
        frame
            .position_changes
            .iter()
            .map(|(id, p)| (id.0, p.to_array()))
            .collect(),
        frame
            .equipment_changes
            .iter()
            .map(|(id, items)| (id.0, items.iter().map(|e| e.0).collect()))
            .collect(),
    )
}

fn expand_frame((spawned, despawned, positions, equipment): CompactFrame) -> FrameDelta {
    FrameDelta {
        spawned: spawned.into_iter().map(ParticipantId).collect(),
        despawned: despawned.into_iter().map(ParticipantId).collect(),
        position_changes: positions
            .into_iter()
            .map(|(id, p)| (ParticipantId(id), Position::from_array(p)))
            .collect(),
        equipment_changes: equipment
            .into_iter()
            .map(|(id, items)| {
                (
                    ParticipantId(id),
                    items.into_iter().map(EquipmentId).collect(),
                )
            })
            .collect(),
    }
}

pub(crate) fn cbor_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, PersistError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| PersistError::CborEncode(e.to_string()))?;
    Ok(buf)
}

fn cbor_deserialize<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, PersistError> {
    ciborium::from_reader(data).map_err(|e| PersistError::CborDecode(e.to_string()))
}

pub fn zstd_compress(data: &[u8], level: i32) -> Result<Vec<u8>, PersistError> {
    let mut encoder = zstd::Encoder::new(Vec::new(), level)?;
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

pub fn zstd_decompress(data: &[u8]) -> Result<Vec<u8>, PersistError> {
    let mut decoder = zstd::Decoder::new(data)?;
    let mut buf = Vec::new();
    decoder.read_to_end(&mut buf)?;
    Ok(buf)
}
