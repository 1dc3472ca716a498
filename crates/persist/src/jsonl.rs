//! JSON-lines snapshot streams.
//!
//! Each non-blank line holds one step: a JSON array of observations, e.g.
//! ```text
//! [{"stable_key":100,"name":"x","position":[0.0,0.0,0.0],"equipment":["ak47"]}]
//! []
//! ```

use crate::error::PersistError;
use framedelta_kernel::{Observation, SnapshotSource};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Write};
use std::path::Path;

/// Reads one step per line from any buffered reader.
pub struct JsonLinesSource<R> {
    lines: Lines<R>,
    line: usize,
    step: usize,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
            step: 0,
        }
    }

    /// Number of steps yielded so far.
    pub fn steps_read(&self) -> usize {
        self.step
    }
}

impl JsonLinesSource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> SnapshotSource for JsonLinesSource<R> {
    type Error = PersistError;

    fn next_step(&mut self) -> Result<Option<Vec<Observation>>, PersistError> {
        for text in self.lines.by_ref() {
            let text = text?;
            self.line += 1;
            if text.trim().is_empty() {
                continue;
            }
            let step: Vec<Observation> =
                serde_json::from_str(&text).map_err(|source| PersistError::MalformedStep {
                    step: self.step,
                    line: self.line,
                    source,
                })?;
            self.step += 1;
            return Ok(Some(step));
        }
        Ok(None)
    }
}

/// Append one step as a single line.
pub fn write_step<W: Write>(writer: &mut W, step: &[Observation]) -> Result<(), PersistError> {
    serde_json::to_writer(&mut *writer, step)?;
    writer.write_all(b"\n")?;
    Ok(())
}
