//! Naive full-snapshot recording, kept only to measure what delta encoding saves.

use crate::codec::{cbor_serialize, to_compact, to_json, zstd_compress};
use crate::error::PersistError;
use framedelta_kernel::{EncodedMatch, Observation};
use serde::Serialize;
use std::fmt;

#[derive(Serialize)]
struct NaiveFrame<'a> {
    players: &'a [Observation],
}

#[derive(Serialize)]
struct NaiveGame<'a> {
    frames: Vec<NaiveFrame<'a>>,
}

fn naive_game(steps: &[Vec<Observation>]) -> NaiveGame<'_> {
    NaiveGame {
        frames: steps.iter().map(|s| NaiveFrame { players: s }).collect(),
    }
}

/// Every step, every entity, names and item strings inline, as JSON.
pub fn naive_json(steps: &[Vec<Observation>]) -> Result<Vec<u8>, PersistError> {
    Ok(serde_json::to_vec(&naive_game(steps))?)
}

/// Byte sizes of the naive and delta encodings of the same match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeReport {
    pub naive_json: usize,
    pub naive_cbor: usize,
    pub delta_json: usize,
    pub delta_cbor: usize,
    pub delta_cbor_zstd: usize,
}

impl SizeReport {
    pub fn measure(
        steps: &[Vec<Observation>],
        encoded: &EncodedMatch,
        zstd_level: i32,
    ) -> Result<Self, PersistError> {
        let compact = to_compact(encoded)?;
        Ok(Self {
            naive_json: naive_json(steps)?.len(),
            naive_cbor: cbor_serialize(&naive_game(steps))?.len(),
            delta_json: to_json(encoded, false)?.len(),
            delta_cbor_zstd: zstd_compress(&compact, zstd_level)?.len(),
            delta_cbor: compact.len(),
        })
    }

    /// Naive JSON size divided by compressed compact size.
    pub fn best_ratio(&self) -> f64 {
        self.naive_json as f64 / self.delta_cbor_zstd.max(1) as f64
    }
}

impl fmt::Display for SizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = |n: usize| 100.0 * n as f64 / self.naive_json.max(1) as f64;
        writeln!(f, "naive json       {:>12} bytes", self.naive_json)?;
        writeln!(
            f,
            "naive cbor       {:>12} bytes ({:5.1}%)",
            self.naive_cbor,
            pct(self.naive_cbor)
        )?;
        writeln!(
            f,
            "delta json       {:>12} bytes ({:5.1}%)",
            self.delta_json,
            pct(self.delta_json)
        )?;
        writeln!(
            f,
            "delta cbor       {:>12} bytes ({:5.1}%)",
            self.delta_cbor,
            pct(self.delta_cbor)
        )?;
        write!(
            f,
            "delta cbor+zstd  {:>12} bytes ({:5.1}%, {:.1}x smaller)",
            self.delta_cbor_zstd,
            pct(self.delta_cbor_zstd),
            self.best_ratio()
        )
    }
}
