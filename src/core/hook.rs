//! Event hooks
//!
//! Hooks run synchronously on the logging thread when an event is
//! finalized, in registration order, after enrichment and before the message
//! field is written. A hook receives the event by value and must hand it
//! back, so it can add fields, [`escalate`](Event::escalate) the write level
//! or [`discard`](Event::discard) the record, but it cannot finalize it.
//!
//! ```
//! use rust_event_logger::prelude::*;
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemoryAppender::new());
//! let logger = Logger::new(sink.clone())
//!     .hook(hook_fn(|e, level, _msg| {
//!         if level >= LogLevel::Warn {
//!             e.bool("alert", true)
//!         } else {
//!             e
//!         }
//!     }));
//!
//! logger.warn().msg("disk almost full");
//! assert_eq!(
//!     sink.contents(),
//!     "{\"level\":\"warn\",\"alert\":true,\"message\":\"disk almost full\"}\n"
//! );
//! ```

use super::event::Event;
use super::log_level::LogLevel;
use std::fmt;
use std::sync::Arc;

/// Interceptor run on every enabled event just before it is written
pub trait Hook: Send + Sync {
    fn run<'a>(&self, event: Event<'a>, level: LogLevel, message: &str) -> Event<'a>;
}

impl<H: Hook + ?Sized> Hook for Arc<H> {
    fn run<'a>(&self, event: Event<'a>, level: LogLevel, message: &str) -> Event<'a> {
        (**self).run(event, level, message)
    }
}

impl<H: Hook + ?Sized> Hook for Box<H> {
    fn run<'a>(&self, event: Event<'a>, level: LogLevel, message: &str) -> Event<'a> {
        (**self).run(event, level, message)
    }
}

/// Closure adapter returned by [`hook_fn`]
pub struct HookFn<F>(F);

/// Wrap a closure as a [`Hook`]
pub fn hook_fn<F>(f: F) -> HookFn<F>
where
    F: for<'a> Fn(Event<'a>, LogLevel, &str) -> Event<'a> + Send + Sync,
{
    HookFn(f)
}

impl<F> Hook for HookFn<F>
where
    F: for<'a> Fn(Event<'a>, LogLevel, &str) -> Event<'a> + Send + Sync,
{
    fn run<'a>(&self, event: Event<'a>, level: LogLevel, message: &str) -> Event<'a> {
        (self.0)(event, level, message)
    }
}

impl<F> fmt::Debug for HookFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HookFn")
    }
}

/// Dispatches to a different hook per level; levels without one pass through
#[derive(Default, Clone)]
pub struct LevelHook {
    hooks: [Option<Arc<dyn Hook>>; 9],
}

impl LevelHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hook run for events at `level`
    #[must_use]
    pub fn on(mut self, level: LogLevel, hook: impl Hook + 'static) -> Self {
        self.hooks[level as usize] = Some(Arc::new(hook));
        self
    }
}

impl Hook for LevelHook {
    fn run<'a>(&self, event: Event<'a>, level: LogLevel, message: &str) -> Event<'a> {
        match &self.hooks[level as usize] {
            Some(hook) => hook.run(event, level, message),
            None => event,
        }
    }
}

impl fmt::Debug for LevelHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let configured: Vec<usize> = self
            .hooks
            .iter()
            .enumerate()
            .filter_map(|(i, h)| h.as_ref().map(|_| i))
            .collect();
        f.debug_struct("LevelHook")
            .field("configured_levels", &configured)
            .finish()
    }
}
