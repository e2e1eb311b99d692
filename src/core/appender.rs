//! Appender trait for record destinations
//!
//! An appender receives one complete, newline-terminated JSON record per
//! call. It must be safe to call from many threads at once; implementations
//! serialize access internally.

use super::{error::Result, log_level::LogLevel};
use std::sync::Arc;

pub trait Appender: Send + Sync {
    fn append(&self, record: &[u8]) -> Result<()>;

    /// Leveled write. Sinks that route by severity override this; the default
    /// ignores the level.
    fn append_level(&self, level: LogLevel, record: &[u8]) -> Result<()> {
        let _ = level;
        self.append(record)
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

impl<A: Appender + ?Sized> Appender for Arc<A> {
    fn append(&self, record: &[u8]) -> Result<()> {
        (**self).append(record)
    }

    fn append_level(&self, level: LogLevel, record: &[u8]) -> Result<()> {
        (**self).append_level(level, record)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<A: Appender + ?Sized> Appender for Box<A> {
    fn append(&self, record: &[u8]) -> Result<()> {
        (**self).append(record)
    }

    fn append_level(&self, level: LogLevel, record: &[u8]) -> Result<()> {
        (**self).append_level(level, record)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
