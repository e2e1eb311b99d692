//! Human-readable console appender
//!
//! Decodes each JSON record and prints it as
//! `TIME TAG message key=value ...`, with the level tag colored. Error and
//! above go to stderr, everything else to stdout.

use crate::core::{Appender, LogLevel, LoggerConfig, Result};
use colored::Colorize;
use serde_json::{Map, Value};
use std::io::Write;

pub struct ConsoleAppender {
    use_colors: bool,
    timestamp_field: String,
    level_field: String,
    message_field: String,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self::with_config(&LoggerConfig::default())
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            ..Self::new()
        }
    }

    /// Use the field names of a logger configured with `config`
    pub fn with_config(config: &LoggerConfig) -> Self {
        Self {
            use_colors: true,
            timestamp_field: config.timestamp_field.clone(),
            level_field: config.level_field.clone(),
            message_field: config.message_field.clone(),
        }
    }

    /// Render one record; `None` when it is not a JSON object
    pub fn format_record(&self, record: &[u8]) -> Option<(LogLevel, String)> {
        let mut fields: Map<String, Value> = serde_json::from_slice(record).ok()?;

        // shift_remove keeps the remaining members in record order
        let level = match fields.shift_remove(&self.level_field) {
            Some(Value::String(s)) => s.parse().unwrap_or(LogLevel::NoLevel),
            _ => LogLevel::NoLevel,
        };
        let time = fields.shift_remove(&self.timestamp_field);
        let message = fields.shift_remove(&self.message_field);

        let mut parts = Vec::with_capacity(fields.len() + 3);
        if let Some(time) = time {
            parts.push(plain(&time));
        }
        let tag = level.short_tag();
        parts.push(if self.use_colors {
            tag.color(level.color_code()).bold().to_string()
        } else {
            tag.to_string()
        });
        if let Some(message) = message {
            parts.push(plain(&message));
        }
        for (key, value) in &fields {
            let key = if self.use_colors {
                key.as_str().cyan().to_string()
            } else {
                key.clone()
            };
            parts.push(format!("{}={}", key, quoted(value)));
        }

        Some((level, parts.join(" ")))
    }

    fn print(&self, level: LogLevel, line: &str) {
        if level >= LogLevel::Error && level < LogLevel::NoLevel {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn quoted(value: &Value) -> String {
    match value {
        Value::String(s) if !s.is_empty() && !s.contains(char::is_whitespace) => s.clone(),
        other => other.to_string(),
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&self, record: &[u8]) -> Result<()> {
        match self.format_record(record) {
            Some((level, line)) => self.print(level, &line),
            None => {
                eprintln!("[LOGGER WARNING] console appender received a record that is not a JSON object");
                std::io::stdout().write_all(record)?;
            }
        }
        Ok(())
    }

    fn append_level(&self, level: LogLevel, record: &[u8]) -> Result<()> {
        match self.format_record(record) {
            Some((_, line)) => self.print(level, &line),
            None => self.append(record)?,
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
