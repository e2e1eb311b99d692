//! Main logger implementation
//!
//! A [`Logger`] is an immutable, cheaply cloned snapshot of everything an
//! event needs: minimum level, appender, hooks, sampler, pre-rendered context
//! fields, configuration, buffer pool and clock. Deriving a logger
//! ([`Logger::level`], [`Logger::with`], [`Logger::hook`], ...) returns a new
//! value and never touches the parent, so loggers can be shared across
//! threads without locks.

use super::{
    appender::Appender,
    buffer_pool::BufferPool,
    config::LoggerConfig,
    context::Context,
    encoder::{append_key, append_object_data, append_string},
    error::{LoggerError, Result},
    event::{Event, Terminal},
    fields::Fields,
    hook::Hook,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    sampling::Sampler,
    timestamp::{system_clock, TimestampFn},
};
use crate::appenders::WriterAppender;
use std::error::Error;
use std::fmt;
use std::io;
use std::panic::Location;
use std::sync::Arc;

/// Callback receiving appender failures from [`Event::msg`]
pub type ErrorHandler = Arc<dyn Fn(&LoggerError) + Send + Sync>;

fn default_error_handler() -> ErrorHandler {
    Arc::new(|err: &LoggerError| {
        eprintln!("[LOGGER ERROR] Failed to write log record: {}", err);
    })
}

#[derive(Clone)]
pub struct Logger {
    pub(crate) appender: Arc<dyn Appender>,
    pub(crate) min_level: LogLevel,
    pub(crate) sampler: Option<Arc<dyn Sampler>>,
    pub(crate) hooks: Arc<[Arc<dyn Hook>]>,
    /// Context members rendered once, starting with `{`, or empty
    pub(crate) context: Arc<[u8]>,
    pub(crate) config: Arc<LoggerConfig>,
    pub(crate) pool: Arc<BufferPool>,
    pub(crate) clock: TimestampFn,
    pub(crate) timestamp: bool,
    pub(crate) caller: bool,
    pub(crate) stack: bool,
    pub(crate) count_filtered: bool,
    pub(crate) metrics: Arc<LoggerMetrics>,
    pub(crate) error_handler: ErrorHandler,
}

impl Logger {
    /// Logger at `Info` writing to `appender` with default configuration
    #[must_use]
    pub fn new<A: Appender + 'static>(appender: A) -> Self {
        Self::builder().appender(appender).build()
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Logger that never writes anything
    #[must_use]
    pub fn nop() -> Self {
        Self::builder()
            .appender(WriterAppender::new(io::sink()))
            .min_level(LogLevel::Disabled)
            .build()
    }

    #[track_caller]
    pub fn trace(&self) -> Event<'_> {
        self.new_event(LogLevel::Trace, Location::caller())
    }

    #[track_caller]
    pub fn debug(&self) -> Event<'_> {
        self.new_event(LogLevel::Debug, Location::caller())
    }

    #[track_caller]
    pub fn info(&self) -> Event<'_> {
        self.new_event(LogLevel::Info, Location::caller())
    }

    #[track_caller]
    pub fn warn(&self) -> Event<'_> {
        self.new_event(LogLevel::Warn, Location::caller())
    }

    #[track_caller]
    pub fn error(&self) -> Event<'_> {
        self.new_event(LogLevel::Error, Location::caller())
    }

    /// Fatal event; the process exits with status 1 once it is written,
    /// unless `exit_on_fatal` is off.
    #[track_caller]
    pub fn fatal(&self) -> Event<'_> {
        let event = self.new_event(LogLevel::Fatal, Location::caller());
        if self.config.exit_on_fatal {
            event.with_terminal(Terminal::Exit)
        } else {
            event
        }
    }

    /// Panic event; panics with the message once it is written
    #[track_caller]
    pub fn panic(&self) -> Event<'_> {
        self.new_event(LogLevel::Panic, Location::caller())
            .with_terminal(Terminal::Panic)
    }

    /// Event without a level field; passes any threshold except `Disabled`
    #[track_caller]
    pub fn log(&self) -> Event<'_> {
        self.new_event(LogLevel::NoLevel, Location::caller())
    }

    #[track_caller]
    pub fn with_level(&self, level: LogLevel) -> Event<'_> {
        match level {
            LogLevel::Fatal => self.fatal(),
            LogLevel::Panic => self.panic(),
            _ => self.new_event(level, Location::caller()),
        }
    }

    /// Error-level event carrying `err`, or an info-level event when there is
    /// no error
    #[track_caller]
    pub fn err<E: Error + ?Sized>(&self, err: Option<&E>) -> Event<'_> {
        match err {
            Some(err) => self.new_event(LogLevel::Error, Location::caller()).err(err),
            None => self.new_event(LogLevel::Info, Location::caller()),
        }
    }

    fn should(&self, level: LogLevel) -> bool {
        if level == LogLevel::Disabled || self.min_level == LogLevel::Disabled || level < self.min_level
        {
            if self.count_filtered {
                self.metrics.record_level_filtered();
            }
            return false;
        }
        if !self.config.disable_sampling {
            if let Some(sampler) = &self.sampler {
                if !sampler.sample(level) {
                    self.metrics.record_sampled_out();
                    return false;
                }
            }
        }
        true
    }

    fn new_event(&self, level: LogLevel, location: &'static Location<'static>) -> Event<'_> {
        if !self.should(level) {
            return Event::new(self, None, level, location);
        }

        let mut buf = self.pool.acquire();
        buf.push(b'{');
        let config = &self.config;
        if level != LogLevel::NoLevel && !config.level_field.is_empty() {
            append_key(&mut buf, &config.level_field, config.escape_html);
            let name = if config.level_uppercase {
                level.as_upper_str()
            } else {
                level.as_str()
            };
            append_string(&mut buf, name, config.escape_html);
        }
        append_object_data(&mut buf, &self.context);
        Event::new(self, Some(buf), level, location)
    }

    /// Child logger with a different minimum level
    #[must_use]
    pub fn level(&self, level: LogLevel) -> Logger {
        let mut child = self.clone();
        child.min_level = level;
        child
    }

    /// Start a context builder whose fields are attached to every event of
    /// the resulting logger
    pub fn with(&self) -> Context {
        Context::new(self.clone())
    }

    /// Child logger with `hook` appended to the hook chain
    #[must_use]
    pub fn hook(&self, hook: impl Hook + 'static) -> Logger {
        let mut hooks: Vec<Arc<dyn Hook>> = self.hooks.iter().cloned().collect();
        hooks.push(Arc::new(hook));
        let mut child = self.clone();
        child.hooks = hooks.into();
        child
    }

    /// Child logger using `sampler`
    #[must_use]
    pub fn sample(&self, sampler: impl Sampler + 'static) -> Logger {
        let mut child = self.clone();
        child.sampler = Some(Arc::new(sampler));
        child
    }

    /// Child logger writing to `appender`
    #[must_use]
    pub fn output(&self, appender: impl Appender + 'static) -> Logger {
        let mut child = self.clone();
        child.appender = Arc::new(appender);
        child
    }

    pub fn get_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    pub fn flush(&self) -> Result<()> {
        self.appender.flush()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("appender", &self.appender.name())
            .field("min_level", &self.min_level)
            .field("hooks", &self.hooks.len())
            .field("sampled", &self.sampler.is_some())
            .field("context", &String::from_utf8_lossy(&self.context))
            .finish()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_event_logger::prelude::*;
/// use std::sync::Arc;
///
/// let sink = Arc::new(MemoryAppender::new());
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .appender(sink.clone())
///     .config(LoggerConfig::new().with_message_field("msg"))
///     .sampler(BasicSampler::new(1))
///     .build();
///
/// logger.debug().msg("hello");
/// assert_eq!(sink.contents(), "{\"level\":\"debug\",\"msg\":\"hello\"}\n");
/// ```
pub struct LoggerBuilder {
    min_level: LogLevel,
    appender: Option<Arc<dyn Appender>>,
    config: LoggerConfig,
    hooks: Vec<Arc<dyn Hook>>,
    sampler: Option<Arc<dyn Sampler>>,
    pool: Option<Arc<BufferPool>>,
    clock: Option<TimestampFn>,
    error_handler: Option<ErrorHandler>,
    timestamp: bool,
    caller: bool,
    count_filtered: bool,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            appender: None,
            config: LoggerConfig::default(),
            hooks: Vec::new(),
            sampler: None,
            pool: None,
            clock: None,
            error_handler: None,
            timestamp: false,
            caller: false,
            count_filtered: false,
        }
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set the appender; defaults to stderr
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appender = Some(Arc::new(appender));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    /// Append a hook; hooks run in the order they are added
    #[must_use = "builder methods return a new value"]
    pub fn hook<H: Hook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sampler<S: Sampler + 'static>(mut self, sampler: S) -> Self {
        self.sampler = Some(Arc::new(sampler));
        self
    }

    /// Share a buffer pool between independently built loggers
    #[must_use = "builder methods return a new value"]
    pub fn pool(mut self, pool: Arc<BufferPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Clock used for the timestamp field; defaults to `Utc::now`
    #[must_use = "builder methods return a new value"]
    pub fn timestamp_fn(mut self, clock: TimestampFn) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Add the timestamp field to every record
    #[must_use = "builder methods return a new value"]
    pub fn with_timestamp(mut self) -> Self {
        self.timestamp = true;
        self
    }

    /// Add the call site to every record
    #[must_use = "builder methods return a new value"]
    pub fn with_caller(mut self) -> Self {
        self.caller = true;
        self
    }

    /// Count calls rejected by the level gate in [`LoggerMetrics::level_filtered`].
    ///
    /// Off by default: every disabled call then touches a shared counter.
    #[must_use = "builder methods return a new value"]
    pub fn count_filtered(mut self) -> Self {
        self.count_filtered = true;
        self
    }

    /// Receive appender failures; the default prints them to stderr
    #[must_use = "builder methods return a new value"]
    pub fn error_handler(mut self, handler: ErrorHandler) -> Self {
        self.error_handler = Some(handler);
        self
    }

    pub fn build(self) -> Logger {
        let appender = self
            .appender
            .unwrap_or_else(|| Arc::new(WriterAppender::new(io::stderr())));

        Logger {
            appender,
            min_level: self.min_level,
            sampler: self.sampler,
            hooks: self.hooks.into(),
            context: Arc::from(Vec::new()),
            config: Arc::new(self.config),
            pool: self.pool.unwrap_or_default(),
            clock: self.clock.unwrap_or_else(system_clock),
            timestamp: self.timestamp,
            caller: self.caller,
            stack: false,
            count_filtered: self.count_filtered,
            metrics: Arc::new(LoggerMetrics::new()),
            error_handler: self.error_handler.unwrap_or_else(default_error_handler),
        }
    }

    /// Validate the configuration, then build
    pub fn try_build(self) -> Result<Logger> {
        self.config.validate()?;
        Ok(self.build())
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
