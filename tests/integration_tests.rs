//! Integration tests for the event logger
//!
//! These tests verify:
//! - Records are single-line, valid JSON with a stable key order
//! - File output and concurrent writers
//! - Level gating, samplers and hooks working together
//! - Timestamp, caller and error enrichment
//! - Appender failures reaching the error handler

use chrono::{DateTime, TimeZone, Utc};
use rust_event_logger::prelude::*;
use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn memory_logger() -> (Logger, Arc<MemoryAppender>) {
    let sink = Arc::new(MemoryAppender::new());
    (Logger::new(sink.clone()), sink)
}

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
        .single()
        .expect("valid date")
}

fn parse(line: &str) -> serde_json::Map<String, Value> {
    serde_json::from_str(line).unwrap_or_else(|e| panic!("invalid JSON {:?}: {}", line, e))
}

#[derive(Debug)]
struct QueryError {
    source: io::Error,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "query failed")
    }
}

impl Error for QueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

#[test]
fn test_log_injection_prevention() {
    let (logger, sink) = memory_logger();

    let malicious = "User login\n{\"level\":\"error\",\"message\":\"fake\"}\r\nINFO Continuation";
    logger.info().str("user", "eve\nadmin").msg(malicious);

    let lines = sink.lines();
    assert_eq!(lines.len(), 1, "record should be a single line");

    let record = parse(&lines[0]);
    assert_eq!(record["message"], malicious);
    assert_eq!(record["user"], "eve\nadmin");
}

#[test]
fn test_key_order_is_preserved() {
    let (logger, sink) = memory_logger();
    let logger = logger.with().str("service", "billing").logger();

    logger
        .info()
        .str("user", "alice")
        .int("n", 3)
        .float("ratio", 0.5)
        .bool("ok", true)
        .msg("done");

    let record = parse(&sink.lines()[0]);
    let keys: Vec<&str> = record.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["level", "service", "user", "n", "ratio", "ok", "message"]);
}

#[test]
fn test_file_appender_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("events.log");

    let appender = FileAppender::new(&log_file).expect("Failed to create appender");
    let logger = Logger::builder()
        .appender(appender)
        .min_level(LogLevel::Debug)
        .build();

    logger.debug().int("attempt", 1).msg("connecting");
    logger.info().str("host", "db-1").msg("connected");
    logger.trace().msg("filtered");
    logger.flush().expect("Failed to flush");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert_eq!(
        content,
        "{\"level\":\"debug\",\"attempt\":1,\"message\":\"connecting\"}\n\
         {\"level\":\"info\",\"host\":\"db-1\",\"message\":\"connected\"}\n"
    );
}

#[test]
fn test_concurrent_logging() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("concurrent.log");

    let appender = FileAppender::new(&log_file).expect("Failed to create appender");
    let logger = Logger::new(appender);

    let mut handles = vec![];
    for thread_id in 0..5 {
        let logger = logger.with().int("thread", thread_id).logger();
        handles.push(std::thread::spawn(move || {
            for i in 0..10 {
                logger.info().int("i", i).msg_fmt(format_args!("message {}", i));
            }
        }));
    }
    for handle in handles {
        handle.join().expect("Thread panicked");
    }
    logger.flush().expect("Failed to flush");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 50, "Should have 50 records from 5 threads * 10 messages");
    for line in lines {
        let record = parse(line);
        assert_eq!(record["message"], format!("message {}", record["i"]));
    }
    assert_eq!(logger.pool().outstanding(), 0);
}

#[test]
fn test_log_levels() {
    let sink = Arc::new(MemoryAppender::new());
    let logger = Logger::builder()
        .appender(sink.clone())
        .min_level(LogLevel::Warn)
        .count_filtered()
        .build();

    logger.trace().msg("trace");
    logger.debug().msg("debug");
    logger.info().msg("info");
    logger.warn().msg("warn");
    logger.error().msg("error");
    logger.log().msg("raw");

    let messages: Vec<String> = sink
        .lines()
        .iter()
        .map(|l| parse(l)["message"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(messages, vec!["warn", "error", "raw"]);
    assert_eq!(logger.metrics().level_filtered(), 3);
}

#[test]
fn test_disabled_logger_writes_nothing() {
    let (logger, sink) = memory_logger();
    let logger = logger.level(LogLevel::Disabled);
    logger.error().msg("nope");
    logger.log().msg("nope");
    assert_eq!(sink.write_count(), 0);

    let nop = Logger::nop();
    assert!(!nop.error().enabled());
}

#[test]
fn test_timestamp_format_iso8601() {
    let sink = Arc::new(MemoryAppender::new());
    let logger = Logger::builder()
        .appender(sink.clone())
        .timestamp_fn(Arc::new(fixed_time))
        .with_timestamp()
        .build();

    logger.info().msg("tick");
    assert_eq!(
        sink.contents(),
        "{\"level\":\"info\",\"time\":\"2024-01-02T03:04:05.000Z\",\"message\":\"tick\"}\n"
    );
}

#[test]
fn test_timestamp_format_unix_millis() {
    let sink = Arc::new(MemoryAppender::new());
    let logger = Logger::builder()
        .appender(sink.clone())
        .config(LoggerConfig::new().with_timestamp_format(TimestampFormat::UnixMillis))
        .timestamp_fn(Arc::new(fixed_time))
        .build();

    logger.info().timestamp().send();
    assert_eq!(
        sink.contents(),
        "{\"level\":\"info\",\"time\":1704164645000}\n"
    );
}

#[test]
fn test_timestamp_format_custom() {
    let sink = Arc::new(MemoryAppender::new());
    let logger = Logger::builder()
        .appender(sink.clone())
        .config(LoggerConfig::new().with_custom_timestamp("%d/%b/%Y:%H:%M:%S"))
        .timestamp_fn(Arc::new(fixed_time))
        .build();

    logger.info().timestamp().send();
    assert_eq!(
        sink.contents(),
        "{\"level\":\"info\",\"time\":\"02/Jan/2024:03:04:05\"}\n"
    );
}

#[test]
fn test_caller_points_at_call_site() {
    let sink = Arc::new(MemoryAppender::new());
    let logger = Logger::builder().appender(sink.clone()).with_caller().build();

    let line = line!() + 1;
    logger.info().msg("here");

    let record = parse(&sink.lines()[0]);
    let caller = record["caller"].as_str().expect("caller is a string");
    assert!(
        caller.ends_with(&format!("integration_tests.rs:{}", line)),
        "unexpected caller {}",
        caller
    );
}

#[test]
fn test_error_with_stack() {
    let (logger, sink) = memory_logger();
    let err = QueryError {
        source: io::Error::new(io::ErrorKind::TimedOut, "connection timed out"),
    };

    logger.error().stack().err(&err).msg("request failed");
    logger.error().err(&err).msg("no stack");
    logger.err(None::<&QueryError>).msg("fine");

    let lines = sink.lines();
    assert_eq!(
        lines[0],
        "{\"level\":\"error\",\"error\":\"query failed\",\"stack\":[\"connection timed out\"],\"message\":\"request failed\"}"
    );
    assert_eq!(
        lines[1],
        "{\"level\":\"error\",\"error\":\"query failed\",\"message\":\"no stack\"}"
    );
    assert_eq!(lines[2], "{\"level\":\"info\",\"message\":\"fine\"}");
}

#[test]
fn test_sampling_basic() {
    let (logger, sink) = memory_logger();
    let logger = logger.sample(BasicSampler::new(3));

    for i in 0..9 {
        logger.info().int("i", i).send();
    }

    let seen: Vec<i64> = sink
        .lines()
        .iter()
        .map(|l| parse(l)["i"].as_i64().unwrap_or(-1))
        .collect();
    assert_eq!(seen, vec![0, 3, 6]);
    assert_eq!(logger.metrics().sampled_out(), 6);
}

#[test]
fn test_sampling_per_level() {
    let (logger, sink) = memory_logger();
    let sampler = LevelSampler::new()
        .with(LogLevel::Info, BasicSampler::new(0))
        .with(LogLevel::Warn, BasicSampler::new(2));
    let logger = logger.sample(sampler);

    for _ in 0..4 {
        logger.info().send();
        logger.warn().send();
        logger.error().send();
    }

    let levels: Vec<String> = sink
        .lines()
        .iter()
        .map(|l| parse(l)["level"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(levels.iter().filter(|l| *l == "info").count(), 0);
    assert_eq!(levels.iter().filter(|l| *l == "warn").count(), 2);
    assert_eq!(levels.iter().filter(|l| *l == "error").count(), 4);
}

#[test]
fn test_sampling_disabled_by_config() {
    let sink = Arc::new(MemoryAppender::new());
    let logger = Logger::builder()
        .appender(sink.clone())
        .config(LoggerConfig::new().with_disable_sampling(true))
        .sampler(BasicSampler::new(0))
        .build();

    for _ in 0..5 {
        logger.info().send();
    }
    assert_eq!(sink.write_count(), 5);
}

#[test]
fn test_burst_sampler_limits_within_period() {
    let (logger, sink) = memory_logger();
    let logger = logger.sample(BurstSampler::new(3, Duration::from_secs(60), None));

    for _ in 0..10 {
        logger.info().send();
    }
    assert_eq!(sink.write_count(), 3);
}

#[test]
fn test_hook_escalation_routes_level() {
    let (logger, sink) = memory_logger();
    let logger = logger.hook(hook_fn(|e, _, msg| {
        if msg.contains("timeout") {
            e.escalate(LogLevel::Error)
        } else {
            e
        }
    }));

    logger.info().msg("timeout talking to upstream");
    logger.info().msg("ok");

    assert_eq!(sink.levels(), vec![LogLevel::Error, LogLevel::Info]);
    let first = parse(&sink.lines()[0]);
    assert_eq!(first["level"], "info");
}

#[test]
fn test_done_callback_sees_record() {
    let (logger, _sink) = memory_logger();
    let mut captured = String::new();

    logger
        .info()
        .str("k", "v")
        .on_done(|msg, record| {
            captured = format!("{}|{}", msg, String::from_utf8_lossy(record));
        })
        .msg("m");

    assert_eq!(
        captured,
        "m|{\"level\":\"info\",\"k\":\"v\",\"message\":\"m\"}\n"
    );
}

#[test]
fn test_appender_failures_reach_error_handler() {
    struct FailingAppender;

    impl Appender for FailingAppender {
        fn append(&self, _record: &[u8]) -> rust_event_logger::Result<()> {
            Err(LoggerError::writer("disk full"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    let reported = Arc::new(AtomicUsize::new(0));
    let counter = reported.clone();
    let logger = Logger::builder()
        .appender(FailingAppender)
        .error_handler(Arc::new(move |_err: &LoggerError| {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
        .build();

    logger.info().msg("first");
    logger.error().msg("second");
    assert_eq!(reported.load(Ordering::SeqCst), 2);

    let result = logger.info().try_msg("third");
    assert!(result.is_err());
    assert_eq!(reported.load(Ordering::SeqCst), 2);
    assert_eq!(logger.metrics().write_failures(), 3);
    assert_eq!(logger.pool().outstanding(), 0);
}

#[test]
fn test_custom_field_names_from_json() {
    let config = LoggerConfig::from_json(
        r#"{"level_field":"severity","message_field":"msg","error_field":"err","level_uppercase":true}"#,
    )
    .expect("valid config");

    let sink = Arc::new(MemoryAppender::new());
    let logger = Logger::builder().appender(sink.clone()).config(config).build();
    let err = io::Error::new(io::ErrorKind::Other, "boom");
    logger.warn().err(&err).msg("careful");

    assert_eq!(
        sink.contents(),
        "{\"severity\":\"WARN\",\"err\":\"boom\",\"msg\":\"careful\"}\n"
    );
}

#[test]
fn test_nested_structures() {
    #[derive(serde::Serialize)]
    struct Build {
        rev: &'static str,
        dirty: bool,
    }

    let (logger, sink) = memory_logger();
    logger
        .info()
        .dict("req", |d| d.str("method", "GET").int("status", 200))
        .array("tags", |a| a.str("a").int(1).null())
        .serialize("build", &Build { rev: "abc", dirty: false })
        .ip("peer", [10, 0, 0, 1])
        .dur("elapsed", Duration::from_millis(1500))
        .send();

    assert_eq!(
        sink.contents(),
        "{\"level\":\"info\",\"req\":{\"method\":\"GET\",\"status\":200},\"tags\":[\"a\",1,null],\
         \"build\":{\"rev\":\"abc\",\"dirty\":false},\"peer\":\"10.0.0.1\",\"elapsed\":1500}\n"
    );
}

#[test]
fn test_log_context_as_object() {
    let (logger, sink) = memory_logger();
    let context = LogContext::new()
        .with_field("user_id", 12345)
        .with_field("request_id", "abc-def");

    logger.info().object("ctx", &context).embed_object(&context).send();

    assert_eq!(
        sink.contents(),
        "{\"level\":\"info\",\"ctx\":{\"user_id\":12345,\"request_id\":\"abc-def\"},\
         \"user_id\":12345,\"request_id\":\"abc-def\"}\n"
    );
}

#[test]
fn test_fatal_without_exit() {
    let sink = Arc::new(MemoryAppender::new());
    let logger = Logger::builder()
        .appender(sink.clone())
        .config(LoggerConfig::new().with_exit_on_fatal(false))
        .build();

    logger.fatal().msg("still here");
    assert_eq!(
        sink.contents(),
        "{\"level\":\"fatal\",\"message\":\"still here\"}\n"
    );
}

#[test]
#[should_panic(expected = "unrecoverable state")]
fn test_panic_event_panics_after_write() {
    let (logger, _sink) = memory_logger();
    logger.panic().str("k", "v").msg("unrecoverable state");
}

#[test]
fn test_gated_panic_does_not_panic() {
    let (logger, sink) = memory_logger();
    let logger = logger.level(LogLevel::Disabled);
    logger.panic().msg("ignored");
    assert_eq!(sink.write_count(), 0);
}
