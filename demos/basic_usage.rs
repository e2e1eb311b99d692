//! Basic event logger usage
//!
//! Demonstrates chained fields, levels, context loggers and the console
//! appender.
//!
//! Run with: cargo run --example basic_usage

use rust_event_logger::prelude::*;
use std::io;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Rust Event Logger - Basic Usage Example ===\n");

    // JSON lines on stdout
    let logger = Logger::builder()
        .appender(WriterAppender::new(io::stdout()))
        .min_level(LogLevel::Trace)
        .with_timestamp()
        .build();

    println!("1. Logging at different levels:");
    logger.trace().msg("This is a trace message");
    logger.debug().msg("This is a debug message");
    logger.info().msg("This is an info message");
    logger.warn().msg("This is a warning message");
    logger.error().msg("This is an error message");

    println!("\n2. Chained fields:");
    logger
        .info()
        .str("user", "alice")
        .int("items", 3)
        .float("total", 42.5)
        .dur("elapsed", Duration::from_millis(12))
        .ip("client", [127, 0, 0, 1])
        .dict("order", |d| d.str("id", "A-17").bool("express", true))
        .msg("order placed");

    println!("\n3. Context logger:");
    let request_logger = logger
        .with()
        .str("request_id", "9f2c")
        .str("route", "/checkout")
        .logger();
    request_logger.info().int("status", 200).msg("request complete");

    println!("\n4. Minimum level INFO - trace and debug won't show:");
    let quiet = logger.level(LogLevel::Info);
    quiet.trace().msg("Trace message (hidden)");
    quiet.debug().msg("Debug message (hidden)");
    quiet.info().msg("Info message (visible)");

    println!("\n5. Errors:");
    let err = io::Error::new(io::ErrorKind::NotFound, "config.toml missing");
    logger.error().err(&err).msg("startup check failed");

    #[cfg(feature = "console")]
    {
        println!("\n6. Console appender:");
        let console = logger.output(ConsoleAppender::new());
        console.info().str("user", "alice").msg("human readable output");
        console.warn().int("retries", 2).msg("slow upstream");
    }

    logger.flush()?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
