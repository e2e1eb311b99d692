//! Context builder for derived loggers
//!
//! [`Logger::with`] returns a [`Context`] seeded with the parent's context
//! fields. Fields added to it are rendered once, and [`Context::logger`]
//! freezes them into the prefix of every event the new logger creates.
//!
//! ```
//! use rust_event_logger::prelude::*;
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemoryAppender::new());
//! let root = Logger::new(sink.clone());
//! let svc = root.with().str("service", "api").logger();
//! let req = svc.with().int("request_id", 7).logger();
//!
//! req.info().str("path", "/").msg("handled");
//! assert_eq!(
//!     sink.contents(),
//!     "{\"level\":\"info\",\"service\":\"api\",\"request_id\":7,\"path\":\"/\",\"message\":\"handled\"}\n"
//! );
//! ```

use super::config::LoggerConfig;
use super::fields::Fields;
use super::logger::Logger;
use std::fmt;
use std::sync::Arc;

/// Accumulates fields attached to every event of the logger it builds
pub struct Context {
    logger: Logger,
    buf: Vec<u8>,
}

impl Context {
    pub(crate) fn new(logger: Logger) -> Self {
        let mut buf = Vec::with_capacity(logger.context.len().max(1) + 64);
        if logger.context.is_empty() {
            buf.push(b'{');
        } else {
            buf.extend_from_slice(&logger.context);
        }
        Self { logger, buf }
    }

    /// Add the timestamp field to every event
    pub fn timestamp(mut self) -> Self {
        self.logger.timestamp = true;
        self
    }

    /// Add the call site to every event
    pub fn caller(mut self) -> Self {
        self.logger.caller = true;
        self
    }

    /// Write error source chains on every event
    pub fn stack(mut self) -> Self {
        self.logger.stack = true;
        self
    }

    /// Finish the context and return the derived logger
    pub fn logger(self) -> Logger {
        let mut logger = self.logger;
        logger.context = if self.buf.len() <= 1 {
            Arc::from(Vec::new())
        } else {
            Arc::from(self.buf)
        };
        logger
    }
}

impl Fields for Context {
    fn with_buffer<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Vec<u8>, &LoggerConfig),
    {
        let config: &LoggerConfig = &self.logger.config;
        f(&mut self.buf, config);
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("fields", &String::from_utf8_lossy(&self.buf))
            .finish()
    }
}
