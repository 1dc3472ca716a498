use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// World-space position of a participant (three f64 coordinates).
pub type Position = DVec3;

/// Raw, persistent identity of a participant as reported by the recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StableKey(pub u64);

impl fmt::Display for StableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Small sequential integer standing in for a [`StableKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub u32);

/// Small sequential integer standing in for an equipment name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EquipmentId(pub u32);

/// A dense surrogate key: the n-th distinct key of a namespace gets value n.
pub trait Surrogate: Copy + Ord + fmt::Debug {
    /// Human-readable namespace name, used in logs and errors.
    const NAMESPACE: &'static str;
    /// Largest raw value the namespace may hand out.
    const MAX: u32 = u32::MAX;

    fn from_raw(raw: u32) -> Self;
    fn raw(self) -> u32;
}

impl Surrogate for ParticipantId {
    const NAMESPACE: &'static str = "participant";

    fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    fn raw(self) -> u32 {
        self.0
    }
}

impl Surrogate for EquipmentId {
    const NAMESPACE: &'static str = "equipment";

    fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

impl fmt::Display for EquipmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Bit-exact position equality. `-0.0` and `0.0` differ; equal NaN payloads match.
pub fn same_position(a: Position, b: Position) -> bool {
    a.x.to_bits() == b.x.to_bits() && a.y.to_bits() == b.y.to_bits() && a.z.to_bits() == b.z.to_bits()
}
