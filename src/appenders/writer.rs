//! Appender over any `io::Write`

use crate::core::{Appender, LoggerError, Result};
use parking_lot::Mutex;
use std::io::Write;

/// Writes each record to a mutex-guarded writer in one `write_all` call
///
/// ```
/// use rust_event_logger::prelude::*;
///
/// let logger = Logger::new(WriterAppender::new(std::io::stdout()));
/// logger.info().str("target", "stdout").send();
/// ```
pub struct WriterAppender<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterAppender<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> Appender for WriterAppender<W> {
    fn append(&self, record: &[u8]) -> Result<()> {
        self.writer
            .lock()
            .write_all(record)
            .map_err(|e| LoggerError::io_operation("appending record", "writer rejected record", e))
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "writer"
    }
}
