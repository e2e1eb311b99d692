//! Formatting macros
//!
//! Shorthand for an event with no fields and a formatted message. Arguments
//! are only formatted when the event is enabled.
//!
//! ```
//! use rust_event_logger::prelude::*;
//! use rust_event_logger::info;
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemoryAppender::new());
//! let logger = Logger::new(sink.clone());
//!
//! let port = 8080;
//! info!(logger, "listening on port {}", port);
//! assert_eq!(
//!     sink.contents(),
//!     "{\"level\":\"info\",\"message\":\"listening on port 8080\"}\n"
//! );
//! ```

/// Log a formatted message at an explicit level
///
/// ```
/// # use rust_event_logger::prelude::*;
/// use rust_event_logger::log;
/// let logger = Logger::nop();
/// log!(logger, LogLevel::Error, "error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.with_level($level).msg_fmt(format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $logger.trace().msg_fmt(format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debug().msg_fmt(format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.info().msg_fmt(format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warn().msg_fmt(format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.error().msg_fmt(format_args!($($arg)+))
    };
}

/// Log at fatal level; exits the process unless the logger's config
/// disables `exit_on_fatal`
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatal().msg_fmt(format_args!($($arg)+))
    };
}
