//! Shared types for the framedelta workspace.
//!
//! Identifier newtypes keep the two surrogate namespaces apart at compile time:
//! a [`ParticipantId`] can never be passed where an [`EquipmentId`] is expected.

pub mod types;

pub use types::{EquipmentId, ParticipantId, Position, StableKey, Surrogate, same_position};
