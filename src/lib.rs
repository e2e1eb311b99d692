//! # Rust Event Logger
//!
//! A structured event logger that writes one JSON object per line with no
//! intermediate record type. Fields are encoded straight into a pooled
//! buffer as they are chained onto an event.
//!
//! ## Features
//!
//! - **Zero-copy Field Chaining**: `logger.info().str("k", "v").msg("...")`
//! - **Level Gating and Sampling**: disabled events skip all encoding work
//! - **Hooks**: add fields, escalate, or discard events before they are written
//! - **Context Loggers**: pre-rendered fields shared by every event of a child logger
//! - **Appenders**: writer, file, in-memory and colored console sinks
//!
//! ```
//! use rust_event_logger::prelude::*;
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemoryAppender::new());
//! let logger = Logger::new(sink.clone());
//!
//! logger.info().str("user", "alice").int("n", 3).msg("done");
//! assert_eq!(
//!     sink.contents(),
//!     "{\"level\":\"info\",\"user\":\"alice\",\"n\":3,\"message\":\"done\"}\n"
//! );
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    #[cfg(feature = "console")]
    pub use crate::appenders::ConsoleAppender;
    pub use crate::appenders::{FileAppender, MemoryAppender, WriterAppender};
    pub use crate::core::{
        hook_fn, Appender, Array, BasicSampler, BufferPool, BurstSampler, Context, Dict,
        DurationFormat, DurationUnit, Event, FieldValue, Fields, Hook, LevelHook, LevelSampler,
        LogArray, LogContext, LogLevel, LogObject, Logger, LoggerBuilder, LoggerConfig,
        LoggerError, LoggerMetrics, RandomSampler, RateSampler, Result, Sampler, SamplingConfig,
        TimestampFormat,
    };
}

#[cfg(feature = "console")]
pub use crate::appenders::ConsoleAppender;
pub use crate::appenders::{FileAppender, MemoryAppender, WriterAppender};
pub use crate::core::{
    hook_fn, Appender, Array, BasicSampler, BufferPool, BurstSampler, Context, Dict,
    DurationFormat, DurationUnit, Event, FieldValue, Fields, Hook, LevelHook, LevelSampler,
    LogArray, LogContext, LogLevel, LogObject, Logger, LoggerBuilder, LoggerConfig, LoggerError,
    LoggerMetrics, RandomSampler, RateSampler, Result, Sampler, SamplingConfig, TimestampFormat,
};
