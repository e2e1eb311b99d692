//! Core logger types and traits

pub mod appender;
pub mod buffer_pool;
pub mod config;
pub mod context;
pub mod encoder;
pub mod error;
pub mod event;
pub mod fields;
pub mod hook;
pub mod log_context;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod sampling;
pub mod timestamp;

pub use appender::Appender;
pub use buffer_pool::{Buffer, BufferPool, DEFAULT_BUFFER_CAPACITY, DEFAULT_MAX_POOLED};
pub use config::{DurationFormat, DurationUnit, LoggerConfig, ENV_NO_HOOKS, ENV_NO_SAMPLING};
pub use context::Context;
pub use error::{LoggerError, Result};
pub use event::Event;
pub use fields::{Array, Dict, Fields, LogArray, LogObject};
pub use hook::{hook_fn, Hook, HookFn, LevelHook};
pub use log_context::{FieldValue, LogContext};
pub use log_level::LogLevel;
pub use logger::{ErrorHandler, Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use sampling::{
    BasicSampler, BurstSampler, LevelSampler, RandomSampler, RateSampler, Sampler,
    SamplerMetrics, SamplingConfig,
};
pub use timestamp::{system_clock, TimestampFn, TimestampFormat};
