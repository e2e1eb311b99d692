//! Log sampling for high-volume scenarios
//!
//! A [`Sampler`] is consulted once per event, at gate time, after the level
//! check. Returning `false` turns the event into a no-op before any buffer is
//! acquired.
//!
//! # Samplers
//!
//! - [`BasicSampler`]: every Nth event, starting with the first
//! - [`RandomSampler`]: one in N at random
//! - [`BurstSampler`]: up to a burst per period, then delegate or drop
//! - [`LevelSampler`]: a different sampler per level
//! - [`RateSampler`]: probability rate with always-sampled levels and optional
//!   adaptive throttling
//!
//! # Example
//!
//! ```
//! use rust_event_logger::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let sink = Arc::new(MemoryAppender::new());
//! let logger = Logger::new(sink.clone()).sample(BurstSampler::new(
//!     5,
//!     Duration::from_secs(1),
//!     Some(Arc::new(BasicSampler::new(100))),
//! ));
//!
//! for i in 0..10 {
//!     logger.info().int("i", i).send();
//! }
//! // five from the burst, then the first of every hundred
//! assert_eq!(sink.write_count(), 6);
//! ```

use super::log_level::LogLevel;
use rand::Rng;
use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Decides whether an event at `level` is emitted
///
/// Samplers are shared across threads and keep their state in atomics.
pub trait Sampler: Send + Sync {
    fn sample(&self, level: LogLevel) -> bool;
}

impl<S: Sampler + ?Sized> Sampler for Arc<S> {
    fn sample(&self, level: LogLevel) -> bool {
        (**self).sample(level)
    }
}

impl<S: Sampler + ?Sized> Sampler for Box<S> {
    fn sample(&self, level: LogLevel) -> bool {
        (**self).sample(level)
    }
}

/// Lets every Nth event through, starting with the first
///
/// `n == 1` permits everything and `n == 0` permits nothing.
#[derive(Debug)]
pub struct BasicSampler {
    n: u32,
    counter: AtomicU32,
}

impl BasicSampler {
    pub fn new(n: u32) -> Self {
        Self {
            n,
            counter: AtomicU32::new(0),
        }
    }
}

impl Sampler for BasicSampler {
    fn sample(&self, _level: LogLevel) -> bool {
        match self.n {
            0 => false,
            1 => true,
            n => {
                let c = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
                c % n == 1
            }
        }
    }
}

/// Lets one in `n` events through, chosen at random
#[derive(Debug, Clone, Copy)]
pub struct RandomSampler {
    n: u32,
}

impl RandomSampler {
    pub fn new(n: u32) -> Self {
        Self { n }
    }
}

impl Sampler for RandomSampler {
    fn sample(&self, _level: LogLevel) -> bool {
        match self.n {
            0 => false,
            1 => true,
            n => rand::thread_rng().gen_range(0..n) == 0,
        }
    }
}

/// Lets up to `burst` events through per `period`; the rest go to `next`,
/// or are dropped when there is no next sampler.
pub struct BurstSampler {
    burst: u32,
    period: Duration,
    next: Option<Arc<dyn Sampler>>,
    counter: AtomicU32,
    /// Nanoseconds since `epoch` at which the current period ends
    reset_at: AtomicU64,
    epoch: Instant,
}

impl BurstSampler {
    pub fn new(burst: u32, period: Duration, next: Option<Arc<dyn Sampler>>) -> Self {
        Self {
            burst,
            period,
            next,
            counter: AtomicU32::new(0),
            reset_at: AtomicU64::new(0),
            epoch: Instant::now(),
        }
    }

    fn inc(&self) -> u32 {
        let now = self.epoch.elapsed().as_nanos() as u64;
        let reset_at = self.reset_at.load(Ordering::Acquire);
        if now < reset_at {
            return self.counter.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        }

        self.counter.store(1, Ordering::Release);
        let next_reset = now.saturating_add(self.period.as_nanos() as u64);
        match self
            .reset_at
            .compare_exchange(reset_at, next_reset, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => 1,
            // Another thread started the new period first
            Err(_) => self.counter.fetch_add(1, Ordering::AcqRel).wrapping_add(1),
        }
    }
}

impl Sampler for BurstSampler {
    fn sample(&self, level: LogLevel) -> bool {
        if self.burst > 0 && !self.period.is_zero() && self.inc() <= self.burst {
            return true;
        }
        match &self.next {
            Some(next) => next.sample(level),
            None => false,
        }
    }
}

impl fmt::Debug for BurstSampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BurstSampler")
            .field("burst", &self.burst)
            .field("period", &self.period)
            .field("has_next", &self.next.is_some())
            .finish()
    }
}

/// Applies a different sampler per level; levels without one always pass
#[derive(Default)]
pub struct LevelSampler {
    samplers: [Option<Arc<dyn Sampler>>; 9],
}

impl LevelSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sampler used for `level`
    #[must_use]
    pub fn with(mut self, level: LogLevel, sampler: impl Sampler + 'static) -> Self {
        self.samplers[level as usize] = Some(Arc::new(sampler));
        self
    }
}

impl Sampler for LevelSampler {
    fn sample(&self, level: LogLevel) -> bool {
        match &self.samplers[level as usize] {
            Some(sampler) => sampler.sample(level),
            None => true,
        }
    }
}

impl fmt::Debug for LevelSampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let configured: Vec<usize> = self
            .samplers
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|_| i))
            .collect();
        f.debug_struct("LevelSampler")
            .field("configured_levels", &configured)
            .finish()
    }
}

/// Configuration for [`RateSampler`]
///
/// # Example
///
/// ```
/// use rust_event_logger::prelude::*;
///
/// // Sample 10% of events, but always keep warnings and above
/// let config = SamplingConfig::new(0.1)
///     .with_always_sample(vec![LogLevel::Warn, LogLevel::Error, LogLevel::Fatal]);
/// ```
#[derive(Debug, Clone)]
pub struct SamplingConfig {
    /// Sample rate between 0.0 and 1.0
    ///
    /// - 1.0 = no sampling (log everything)
    /// - 0.1 = sample 10% of events
    /// - 0.0 = drop all events (except always_sample levels)
    pub rate: f64,

    /// Levels that are never sampled out
    pub always_sample: Vec<LogLevel>,

    /// Enable adaptive sampling based on throughput
    ///
    /// When enabled, the rate is reduced when throughput exceeds
    /// `adaptive_threshold`.
    pub adaptive: bool,

    /// Threshold (events per second) to trigger adaptive sampling
    pub adaptive_threshold: usize,

    /// The rate never goes below this value under load
    pub adaptive_min_rate: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            rate: 1.0,
            always_sample: vec![LogLevel::Error, LogLevel::Fatal, LogLevel::Panic],
            adaptive: false,
            adaptive_threshold: 10000,
            adaptive_min_rate: 0.01,
        }
    }
}

impl SamplingConfig {
    /// Create a config with the given rate, clamped to `0.0..=1.0`
    pub fn new(rate: f64) -> Self {
        Self {
            rate: rate.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    /// Set the levels that should always be logged
    #[must_use]
    pub fn with_always_sample(mut self, levels: Vec<LogLevel>) -> Self {
        self.always_sample = levels;
        self
    }

    /// Enable adaptive sampling
    #[must_use]
    pub fn with_adaptive(mut self, threshold: usize, min_rate: f64) -> Self {
        self.adaptive = true;
        self.adaptive_threshold = threshold;
        self.adaptive_min_rate = min_rate.clamp(0.0, 1.0);
        self
    }
}

/// Counters kept by a [`RateSampler`]
#[derive(Debug)]
pub struct SamplerMetrics {
    sampled_count: AtomicU64,
    dropped_count: AtomicU64,
    total_count: AtomicU64,
}

impl SamplerMetrics {
    pub const fn new() -> Self {
        Self {
            sampled_count: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
            total_count: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn sampled_count(&self) -> u64 {
        self.sampled_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn total_count(&self) -> u64 {
        self.total_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn record_sampled(&self) {
        self.sampled_count.fetch_add(1, Ordering::Relaxed);
        self.total_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_dropped(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
        self.total_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Observed sample rate; 1.0 before any event
    pub fn effective_sample_rate(&self) -> f64 {
        let sampled = self.sampled_count() as f64;
        let total = self.total_count() as f64;

        if total == 0.0 {
            1.0
        } else {
            sampled / total
        }
    }

    pub fn reset(&self) {
        self.sampled_count.store(0, Ordering::Relaxed);
        self.dropped_count.store(0, Ordering::Relaxed);
        self.total_count.store(0, Ordering::Relaxed);
    }
}

impl Default for SamplerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Events per second since the sampler was created
#[derive(Debug)]
struct RateTracker {
    window_start: Instant,
    window_count: AtomicUsize,
    last_rate: AtomicU64,
}

impl RateTracker {
    fn new() -> Self {
        Self {
            window_start: Instant::now(),
            window_count: AtomicUsize::new(0),
            last_rate: AtomicU64::new(0),
        }
    }

    fn record_and_get_rate(&self) -> f64 {
        let count = self.window_count.fetch_add(1, Ordering::Relaxed) + 1;
        let elapsed = self.window_start.elapsed().as_secs_f64();

        if elapsed > 0.0 {
            let rate = count as f64 / elapsed;
            self.last_rate.store(rate.to_bits(), Ordering::Relaxed);
            rate
        } else {
            0.0
        }
    }

    fn current_rate(&self) -> f64 {
        f64::from_bits(self.last_rate.load(Ordering::Relaxed))
    }
}

/// Probability sampler with always-sampled levels
///
/// ```
/// use rust_event_logger::prelude::*;
///
/// let sampler = RateSampler::new(SamplingConfig::new(0.0));
/// assert!(!sampler.sample(LogLevel::Info));
/// assert!(sampler.sample(LogLevel::Error));
/// assert_eq!(sampler.metrics().dropped_count(), 1);
/// ```
pub struct RateSampler {
    config: SamplingConfig,
    metrics: SamplerMetrics,
    rate_tracker: RateTracker,
}

impl RateSampler {
    pub fn new(config: SamplingConfig) -> Self {
        Self {
            config,
            metrics: SamplerMetrics::new(),
            rate_tracker: RateTracker::new(),
        }
    }

    fn effective_rate(&self) -> f64 {
        if self.config.adaptive {
            let current = self.rate_tracker.record_and_get_rate();
            let threshold = self.config.adaptive_threshold as f64;
            if current > threshold {
                let scale = threshold / current;
                return (self.config.rate * scale).max(self.config.adaptive_min_rate);
            }
        }
        self.config.rate
    }

    pub fn metrics(&self) -> &SamplerMetrics {
        &self.metrics
    }

    /// Events per second seen so far; only tracked when adaptive
    pub fn current_message_rate(&self) -> f64 {
        self.rate_tracker.current_rate()
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }
}

impl Sampler for RateSampler {
    fn sample(&self, level: LogLevel) -> bool {
        if self.config.always_sample.contains(&level) {
            self.metrics.record_sampled();
            return true;
        }

        let rate = self.effective_rate();
        let keep = if rate >= 1.0 {
            true
        } else if rate <= 0.0 {
            false
        } else {
            rand::thread_rng().gen::<f64>() < rate
        };

        if keep {
            self.metrics.record_sampled();
        } else {
            self.metrics.record_dropped();
        }
        keep
    }
}

impl fmt::Debug for RateSampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateSampler")
            .field("config", &self.config)
            .field("metrics", &self.metrics)
            .finish()
    }
}
