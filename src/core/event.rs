//! In-flight log records
//!
//! An [`Event`] owns one pooled buffer from the moment it passes the level
//! and sampling gates until it is written, discarded or dropped. Field calls
//! append to that buffer; a terminal call ([`Event::msg`], [`Event::send`],
//! [`Event::try_msg`]) closes the JSON object, hands it to the appender in a
//! single call and returns the buffer to the pool.
//!
//! A gated-out event carries no buffer. Every method on it is a no-op, so a
//! suppressed `debug()` chain costs a few branches and nothing else.

use super::buffer_pool::Buffer;
use super::config::LoggerConfig;
use super::encoder::{append_display, append_key, append_string, append_time};
use super::error::Result;
use super::fields::Fields;
use super::log_level::LogLevel;
use super::logger::Logger;
use std::fmt;
use std::panic::Location;

type DoneFn<'a> = Box<dyn FnOnce(&str, &[u8]) + 'a>;

/// What happens after a record is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Terminal {
    Return,
    Exit,
    Panic,
}

/// One log record under construction
///
/// Created by the level methods on [`Logger`]. Add fields through the
/// [`Fields`] trait, then finish with a terminal call. An event that is
/// dropped without one returns its buffer to the pool and writes nothing.
#[must_use = "an event writes nothing until msg, send or try_msg is called"]
pub struct Event<'a> {
    logger: &'a Logger,
    buf: Option<Buffer>,
    level: LogLevel,
    write_level: LogLevel,
    done: Option<DoneFn<'a>>,
    stack: bool,
    terminal: Terminal,
    location: &'static Location<'static>,
}

impl<'a> Event<'a> {
    pub(crate) fn new(
        logger: &'a Logger,
        buf: Option<Buffer>,
        level: LogLevel,
        location: &'static Location<'static>,
    ) -> Self {
        Self {
            logger,
            buf,
            level,
            write_level: level,
            done: None,
            stack: logger.stack,
            terminal: Terminal::Return,
            location,
        }
    }

    pub(crate) fn with_terminal(mut self, terminal: Terminal) -> Self {
        if self.buf.is_some() {
            self.terminal = terminal;
        }
        self
    }

    /// Whether this event will be written
    pub fn enabled(&self) -> bool {
        self.buf.is_some()
    }

    /// Level chosen at gate time
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Add the timestamp field now, using the logger's clock
    pub fn timestamp(mut self) -> Self {
        let logger = self.logger;
        self.with_buffer(|buf, cfg| {
            append_key(buf, &cfg.timestamp_field, cfg.escape_html);
            append_time(buf, &(logger.clock)(), &cfg.timestamp_format, cfg.escape_html);
        });
        self
    }

    /// Add the `file:line` of this call
    #[track_caller]
    pub fn caller(self) -> Self {
        self.caller_at(Location::caller())
    }

    fn caller_at(mut self, location: &Location<'_>) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, &cfg.caller_field, cfg.escape_html);
            append_display(
                buf,
                &format_args!("{}:{}", location.file(), location.line()),
                cfg.escape_html,
            );
        });
        self
    }

    /// Make following `err` calls also write the error's source chain
    pub fn stack(mut self) -> Self {
        self.stack = true;
        self
    }

    /// Route the record to the appender at `level` instead of the gate level.
    ///
    /// Only raises the level; the level field already written is unchanged.
    /// A record without a level can be given any real level.
    pub fn escalate(mut self, level: LogLevel) -> Self {
        if level < LogLevel::NoLevel
            && (self.write_level == LogLevel::NoLevel || level > self.write_level)
        {
            self.write_level = level;
        }
        self
    }

    /// Set the callback run after the record is written, with the message and
    /// the final bytes. Replaces any previous callback.
    pub fn on_done(mut self, f: impl FnOnce(&str, &[u8]) + 'a) -> Self {
        if self.buf.is_some() {
            self.done = Some(Box::new(f));
        }
        self
    }

    /// Run `f` only when the event is enabled
    pub fn func(self, f: impl FnOnce(Self) -> Self) -> Self {
        if self.enabled() {
            f(self)
        } else {
            self
        }
    }

    /// Drop the record without writing it. The returned event is disabled.
    pub fn discard(mut self) -> Self {
        if let Some(buf) = self.buf.take() {
            self.logger.pool.release(buf);
            self.logger.metrics.record_discarded();
        }
        self.done = None;
        self.terminal = Terminal::Return;
        self
    }

    /// Write the record with `message`. Appender failures go to the logger's
    /// error handler.
    pub fn msg(self, message: &str) {
        let logger = self.logger;
        if let Err(err) = self.write(message) {
            (logger.error_handler)(&err);
        }
    }

    /// Like [`msg`](Self::msg); formatting is skipped for disabled events
    pub fn msg_fmt(self, args: fmt::Arguments<'_>) {
        if !self.enabled() {
            return;
        }
        match args.as_str() {
            Some(message) => self.msg(message),
            None => self.msg(&args.to_string()),
        }
    }

    /// Write the record without a message
    pub fn send(self) {
        self.msg("");
    }

    /// Write the record and return the appender's result
    pub fn try_msg(self, message: &str) -> Result<()> {
        self.write(message)
    }

    fn write(mut self, message: &str) -> Result<()> {
        if self.buf.is_none() {
            return Ok(());
        }
        let logger = self.logger;

        // Logger-level enrichment counts as a hook and is switched off with them
        if !logger.config.disable_hooks {
            if logger.timestamp {
                self = self.timestamp();
            }
            if logger.caller {
                let location = self.location;
                self = self.caller_at(location);
            }

            let level = self.level;
            for hook in logger.hooks.iter() {
                self = hook.run(self, level, message);
            }
        }

        let Some(mut buf) = self.buf.take() else {
            return Ok(());
        };

        let config = &logger.config;
        if !message.is_empty() && !config.message_field.is_empty() {
            append_key(&mut buf, &config.message_field, config.escape_html);
            append_string(&mut buf, message, config.escape_html);
        }
        buf.push(b'}');
        buf.push(b'\n');

        let result = logger.appender.append_level(self.write_level, &buf[..]);
        match result {
            Ok(()) => logger.metrics.record_written(),
            Err(_) => logger.metrics.record_write_failure(),
        };

        if let Some(done) = self.done.take() {
            done(message, &buf[..]);
        }
        logger.pool.release(buf);

        match self.terminal {
            Terminal::Return => result,
            Terminal::Exit => {
                if let Err(err) = &result {
                    (logger.error_handler)(err);
                }
                let _ = logger.appender.flush();
                std::process::exit(1);
            }
            Terminal::Panic => {
                if let Err(err) = &result {
                    (logger.error_handler)(err);
                }
                panic!("{}", message);
            }
        }
    }
}

impl Fields for Event<'_> {
    fn with_buffer<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Vec<u8>, &LoggerConfig),
    {
        let config: &LoggerConfig = &self.logger.config;
        if let Some(buf) = self.buf.as_mut() {
            f(&mut **buf, config);
        }
    }

    fn stack_enabled(&self) -> bool {
        self.stack
    }
}

impl Drop for Event<'_> {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.logger.pool.release(buf);
            self.logger.metrics.record_discarded();
        }
    }
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("level", &self.level)
            .field("write_level", &self.write_level)
            .field("enabled", &self.enabled())
            .field("buffered", &self.buf.as_ref().map_or(0, |b| b.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appenders::MemoryAppender;
    use crate::core::error::LoggerError;
    use crate::core::{Appender, LoggerConfig, TimestampFormat};
    use chrono::{TimeZone, Utc};
    use std::cell::RefCell;
    use std::io;
    use std::sync::Arc;

    fn setup() -> (Logger, Arc<MemoryAppender>) {
        let sink = Arc::new(MemoryAppender::new());
        (Logger::new(sink.clone()), sink)
    }

    struct FailingAppender;

    impl Appender for FailingAppender {
        fn append(&self, _record: &[u8]) -> Result<()> {
            Err(LoggerError::writer("sink closed"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[derive(Debug)]
    struct Outer(io::Error);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("query failed")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_basic_record() {
        let (logger, sink) = setup();
        logger.info().str("user", "alice").int("n", 3).msg("done");
        assert_eq!(
            sink.contents(),
            "{\"level\":\"info\",\"user\":\"alice\",\"n\":3,\"message\":\"done\"}\n"
        );
    }

    #[test]
    fn test_send_omits_message() {
        let (logger, sink) = setup();
        logger.warn().bool("ok", false).send();
        assert_eq!(sink.contents(), "{\"level\":\"warn\",\"ok\":false}\n");
    }

    #[test]
    fn test_msg_fmt() {
        let (logger, sink) = setup();
        logger.info().msg_fmt(format_args!("port {}", 8080));
        logger.info().msg_fmt(format_args!("static"));
        let lines = sink.lines();
        assert_eq!(lines[0], "{\"level\":\"info\",\"message\":\"port 8080\"}");
        assert_eq!(lines[1], "{\"level\":\"info\",\"message\":\"static\"}");
    }

    #[test]
    fn test_disabled_event_is_inert() {
        let (logger, sink) = setup();
        let pool_before = logger.pool().acquired();

        let event = logger.debug();
        assert!(!event.enabled());
        event
            .str("k", "v")
            .func(|_| panic!("func ran on disabled event"))
            .on_done(|_, _| panic!("done ran on disabled event"))
            .msg("hidden");

        assert_eq!(sink.write_count(), 0);
        assert_eq!(logger.pool().acquired(), pool_before);
    }

    #[test]
    fn test_discard_releases_without_writing() {
        let (logger, sink) = setup();
        let event = logger.info().str("k", "v").discard();
        assert!(!event.enabled());
        event.msg("never");

        assert_eq!(sink.write_count(), 0);
        assert_eq!(logger.pool().outstanding(), 0);
        assert_eq!(logger.metrics().discarded(), 1);
    }

    #[test]
    fn test_drop_without_terminal_releases_buffer() {
        let (logger, sink) = setup();
        {
            let _event = logger.info().str("k", "v");
        }
        assert_eq!(sink.write_count(), 0);
        assert_eq!(logger.pool().outstanding(), 0);
        assert_eq!(logger.pool().pooled(), 1);
    }

    #[test]
    fn test_done_receives_final_bytes() {
        let (logger, _sink) = setup();
        let seen = RefCell::new(None);
        logger
            .info()
            .int("n", 1)
            .on_done(|msg, bytes| {
                *seen.borrow_mut() = Some((msg.to_string(), bytes.to_vec()));
            })
            .msg("hi");

        let (msg, bytes) = seen.into_inner().expect("done was called");
        assert_eq!(msg, "hi");
        assert_eq!(bytes, b"{\"level\":\"info\",\"n\":1,\"message\":\"hi\"}\n".to_vec());
    }

    #[test]
    fn test_try_msg_reports_sink_error() {
        let logger = Logger::new(FailingAppender);
        let err = logger.info().try_msg("x").expect_err("sink rejects");
        assert!(matches!(err, LoggerError::WriterError(_)));
        assert_eq!(logger.metrics().write_failures(), 1);
        assert_eq!(logger.pool().outstanding(), 0);
    }

    #[test]
    fn test_msg_routes_error_to_handler() {
        let failures = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&failures);
        let logger = Logger::builder()
            .appender(FailingAppender)
            .error_handler(Arc::new(move |_err: &LoggerError| {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }))
            .build();

        logger.error().msg("lost");
        assert_eq!(failures.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_timestamp_uses_logger_clock() {
        let sink = Arc::new(MemoryAppender::new());
        let fixed = Utc
            .with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime");
        let logger = Logger::builder()
            .appender(sink.clone())
            .config(LoggerConfig::new().with_timestamp_format(TimestampFormat::Unix))
            .timestamp_fn(Arc::new(move || fixed))
            .build();

        logger.info().timestamp().msg("t");
        assert_eq!(
            sink.contents(),
            "{\"level\":\"info\",\"time\":1736332245,\"message\":\"t\"}\n"
        );
    }

    #[test]
    fn test_caller_points_at_call_site() {
        let (logger, sink) = setup();
        let line = line!() + 1;
        logger.info().caller().send();
        let expected = format!("\"caller\":\"{}:{}\"", file!(), line);
        assert!(sink.contents().contains(&expected), "got {}", sink.contents());
    }

    #[test]
    fn test_stack_writes_source_chain() {
        let (logger, sink) = setup();
        let err = Outer(io::Error::new(io::ErrorKind::Other, "connection reset"));

        logger.error().stack().err(&err).send();
        logger.error().err(&err).send();

        let lines = sink.lines();
        assert_eq!(
            lines[0],
            "{\"level\":\"error\",\"error\":\"query failed\",\"stack\":[\"connection reset\"]}"
        );
        assert_eq!(lines[1], "{\"level\":\"error\",\"error\":\"query failed\"}");
    }

    #[test]
    fn test_escalate_only_raises_write_level() {
        let (logger, sink) = setup();
        logger.warn().escalate(LogLevel::Error).msg("up");
        logger.warn().escalate(LogLevel::Debug).msg("down");

        assert_eq!(sink.levels(), vec![LogLevel::Error, LogLevel::Warn]);
        assert!(sink.contents().starts_with("{\"level\":\"warn\""));
    }

    #[test]
    fn test_escalate_routes_record_without_level() {
        let (logger, sink) = setup();
        logger.log().escalate(LogLevel::Error).msg("raw");
        logger.log().escalate(LogLevel::Disabled).msg("raw");

        assert_eq!(sink.levels(), vec![LogLevel::Error, LogLevel::NoLevel]);
        assert_eq!(sink.lines()[0], "{\"message\":\"raw\"}");
    }

    #[test]
    fn test_disable_hooks_skips_logger_enrichment() {
        let sink = Arc::new(MemoryAppender::new());
        let logger = Logger::builder()
            .appender(sink.clone())
            .config(LoggerConfig::new().with_disable_hooks(true))
            .with_caller()
            .build();
        let logger = logger.with().timestamp().logger();

        logger.info().msg("hello world");
        logger.info().timestamp().caller().msg("explicit");

        let lines = sink.lines();
        assert_eq!(lines[0], "{\"level\":\"info\",\"message\":\"hello world\"}");
        assert!(lines[1].contains("\"time\":"), "got {}", lines[1]);
        assert!(lines[1].contains("\"caller\":"), "got {}", lines[1]);
    }

    #[test]
    fn test_func_runs_when_enabled() {
        let (logger, sink) = setup();
        logger.info().func(|e| e.str("computed", "yes")).send();
        assert_eq!(sink.contents(), "{\"level\":\"info\",\"computed\":\"yes\"}\n");
    }

    #[test]
    fn test_panic_level_panics_after_write() {
        let (logger, sink) = setup();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            logger.panic().msg("unrecoverable");
        }));
        assert!(result.is_err());
        assert_eq!(
            sink.contents(),
            "{\"level\":\"panic\",\"message\":\"unrecoverable\"}\n"
        );
    }
}
