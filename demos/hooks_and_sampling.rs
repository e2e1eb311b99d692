//! Hooks, samplers and finalization callbacks
//!
//! Run with: cargo run --example hooks_and_sampling

use rust_event_logger::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Rust Event Logger - Hooks and Sampling Example ===\n");

    let sink = Arc::new(MemoryAppender::new());

    // Tag severe events and drop health checks
    let logger = Logger::new(sink.clone())
        .hook(hook_fn(|e, level, _msg| {
            if level >= LogLevel::Error {
                e.bool("page_oncall", true)
            } else {
                e
            }
        }))
        .hook(hook_fn(|e, _level, msg| {
            if msg == "health check" {
                e.discard()
            } else {
                e
            }
        }));

    println!("1. Hooks:");
    logger.info().msg("health check");
    logger.info().msg("user signed in");
    logger.error().str("db", "primary").msg("connection lost");

    println!("\n2. Burst sampling (5 per second, then 1 in 100):");
    let sampled = logger.sample(BurstSampler::new(
        5,
        Duration::from_secs(1),
        Some(Arc::new(BasicSampler::new(100))),
    ));
    for i in 0..200 {
        sampled.info().int("i", i).send();
    }

    println!("\n3. Per-level sampling:");
    let per_level = logger.sample(
        LevelSampler::new()
            .with(LogLevel::Debug, BasicSampler::new(10))
            .with(LogLevel::Info, RandomSampler::new(2)),
    );
    let per_level = per_level.level(LogLevel::Debug);
    for _ in 0..20 {
        per_level.debug().send();
        per_level.info().send();
        per_level.warn().send();
    }

    println!("\n4. Completion callback:");
    logger
        .warn()
        .str("disk", "/var")
        .on_done(|msg, record| {
            println!("   wrote {:?} in {} bytes", msg, record.len());
        })
        .msg("disk almost full");

    println!("\nCaptured {} records:", sink.write_count());
    for line in sink.lines().iter().take(8) {
        println!("   {}", line);
    }

    let metrics = logger.metrics();
    println!(
        "\nwritten={} sampled_out={} discarded={} pooled_buffers={}",
        metrics.written(),
        metrics.sampled_out(),
        metrics.discarded(),
        logger.pool().pooled()
    );

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
