//! Recorded playback events read back from JSON Lines.
//!
//! One [`PlaybackEvent`] per line, blank lines ignored. This is how the CLI
//! feeds a session without a live playback API.

use crate::ingest::types::PlaybackEvent;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Errors while reading recorded events.
#[derive(Debug)]
pub enum ReplayError {
    IoError(String),
    /// A line that is not a valid event
    Parse { line: usize, message: String },
}

impl std::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplayError::IoError(e) => write!(f, "IO error: {e}"),
            ReplayError::Parse { line, message } => {
                write!(f, "Parse error on line {line}: {message}")
            }
        }
    }
}

impl std::error::Error for ReplayError {}

/// Iterator over recorded events.
pub struct ReplaySource<R> {
    reader: R,
    line_number: usize,
    buffer: String,
}

impl ReplaySource<BufReader<File>> {
    /// Open a JSON Lines file.
    pub fn open(path: &Path) -> Result<Self, ReplayError> {
        let file = File::open(path).map_err(|e| ReplayError::IoError(e.to_string()))?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplaySource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buffer: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for ReplaySource<R> {
    type Item = Result<PlaybackEvent, ReplayError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buffer.clear();
            match self.reader.read_line(&mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;
                    let line = self.buffer.trim();
                    if line.is_empty() {
                        continue;
                    }
                    return Some(serde_json::from_str(line).map_err(|e| ReplayError::Parse {
                        line: self.line_number,
                        message: e.to_string(),
                    }));
                }
                Err(e) => return Some(Err(ReplayError::IoError(e.to_string()))),
            }
        }
    }
}
