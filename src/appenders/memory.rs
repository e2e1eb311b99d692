//! In-memory appender
//!
//! Captures records for tests and examples. Records written through the
//! leveled path also remember the level they were routed at.

use crate::core::{Appender, LogLevel, Result};
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct Captured {
    bytes: Vec<u8>,
    levels: Vec<LogLevel>,
    writes: usize,
}

#[derive(Debug, Default)]
pub struct MemoryAppender {
    captured: Mutex<Captured>,
}

impl MemoryAppender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, as text
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.captured.lock().bytes).into_owned()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.captured.lock().bytes.clone()
    }

    /// Records without their trailing newline
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Level each leveled write was routed at, in write order
    pub fn levels(&self) -> Vec<LogLevel> {
        self.captured.lock().levels.clone()
    }

    /// Number of append calls
    pub fn write_count(&self) -> usize {
        self.captured.lock().writes
    }

    pub fn clear(&self) {
        let mut captured = self.captured.lock();
        captured.bytes.clear();
        captured.levels.clear();
        captured.writes = 0;
    }
}

impl Appender for MemoryAppender {
    fn append(&self, record: &[u8]) -> Result<()> {
        let mut captured = self.captured.lock();
        captured.bytes.extend_from_slice(record);
        captured.writes += 1;
        Ok(())
    }

    fn append_level(&self, level: LogLevel, record: &[u8]) -> Result<()> {
        let mut captured = self.captured.lock();
        captured.bytes.extend_from_slice(record);
        captured.levels.push(level);
        captured.writes += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
