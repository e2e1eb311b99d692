//! Logger configuration
//!
//! Process-wide knobs (field names, encodings, hook and sampling switches)
//! live in one explicit struct that is read once when a logger is built and
//! then shared by every derived logger. Nothing on the hot path consults the
//! environment.

use super::error::{LoggerError, Result};
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};

/// Environment variable that disables every hook when set to a truthy value
pub const ENV_NO_HOOKS: &str = "EVENTLOG_NO_HOOKS";

/// Environment variable that bypasses samplers when set to a truthy value
pub const ENV_NO_SAMPLING: &str = "EVENTLOG_NO_SAMPLING";

/// How duration values are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationFormat {
    /// Fractional count of [`DurationUnit`]: `1.5`
    #[default]
    Float,
    /// Truncated whole count of [`DurationUnit`]: `1`
    Integer,
    /// Unit-suffixed string: `"1.5s"`
    Text,
}

/// Unit used by the numeric duration formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    Nanos,
    Micros,
    #[default]
    Millis,
    Secs,
}

impl DurationUnit {
    pub fn as_nanos(&self) -> u128 {
        match self {
            DurationUnit::Nanos => 1,
            DurationUnit::Micros => 1_000,
            DurationUnit::Millis => 1_000_000,
            DurationUnit::Secs => 1_000_000_000,
        }
    }
}

/// Configuration shared by a logger and everything derived from it
///
/// # Example
///
/// ```
/// use rust_event_logger::core::{DurationFormat, LoggerConfig, TimestampFormat};
///
/// let config = LoggerConfig::new()
///     .with_timestamp_format(TimestampFormat::UnixMillis)
///     .with_duration_format(DurationFormat::Text)
///     .with_message_field("msg");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Key of the enrichment timestamp
    pub timestamp_field: String,
    /// Key of the level field
    pub level_field: String,
    /// Key of the message field
    pub message_field: String,
    /// Key used by `err`
    pub error_field: String,
    /// Key of the call-site field
    pub caller_field: String,
    /// Key of the error source chain
    pub stack_field: String,
    /// Format of the timestamp field and of `time` values
    pub timestamp_format: TimestampFormat,
    pub duration_format: DurationFormat,
    pub duration_unit: DurationUnit,
    /// Escape `<`, `>` and `&` in keys and strings
    pub escape_html: bool,
    /// Write `"INFO"` instead of `"info"`
    pub level_uppercase: bool,
    /// Skip every hook
    pub disable_hooks: bool,
    /// Bypass samplers; level gating still applies
    pub disable_sampling: bool,
    /// Exit the process after a fatal record is written
    pub exit_on_fatal: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            timestamp_field: "time".to_string(),
            level_field: "level".to_string(),
            message_field: "message".to_string(),
            error_field: "error".to_string(),
            caller_field: "caller".to_string(),
            stack_field: "stack".to_string(),
            timestamp_format: TimestampFormat::default(),
            duration_format: DurationFormat::default(),
            duration_unit: DurationUnit::default(),
            escape_html: true,
            level_uppercase: false,
            disable_hooks: false,
            disable_sampling: false,
            exit_on_fatal: true,
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

impl LoggerConfig {
    /// Create a configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by [`ENV_NO_HOOKS`] and [`ENV_NO_SAMPLING`].
    ///
    /// Call once at startup and hand the result to the logger builder.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Apply the environment switches on top of this configuration
    #[must_use]
    pub fn apply_env(mut self) -> Self {
        if env_flag(ENV_NO_HOOKS) {
            self.disable_hooks = true;
        }
        if env_flag(ENV_NO_SAMPLING) {
            self.disable_sampling = true;
        }
        self
    }

    /// Parse and validate a JSON configuration; missing keys take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LoggerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would produce ambiguous records
    pub fn validate(&self) -> Result<()> {
        if self.level_field.is_empty() {
            return Err(LoggerError::config("LoggerConfig", "level field must not be empty"));
        }
        if self.message_field.is_empty() {
            return Err(LoggerError::config("LoggerConfig", "message field must not be empty"));
        }

        let names = [
            &self.timestamp_field,
            &self.level_field,
            &self.message_field,
            &self.error_field,
            &self.caller_field,
            &self.stack_field,
        ];
        for (i, a) in names.iter().enumerate() {
            if names[i + 1..].contains(a) {
                return Err(LoggerError::config(
                    "LoggerConfig",
                    format!("field name '{}' is used twice", a),
                ));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn with_timestamp_field(mut self, name: impl Into<String>) -> Self {
        self.timestamp_field = name.into();
        self
    }

    #[must_use]
    pub fn with_level_field(mut self, name: impl Into<String>) -> Self {
        self.level_field = name.into();
        self
    }

    #[must_use]
    pub fn with_message_field(mut self, name: impl Into<String>) -> Self {
        self.message_field = name.into();
        self
    }

    #[must_use]
    pub fn with_error_field(mut self, name: impl Into<String>) -> Self {
        self.error_field = name.into();
        self
    }

    #[must_use]
    pub fn with_caller_field(mut self, name: impl Into<String>) -> Self {
        self.caller_field = name.into();
        self
    }

    #[must_use]
    pub fn with_stack_field(mut self, name: impl Into<String>) -> Self {
        self.stack_field = name.into();
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Create a custom timestamp format from a strftime-compatible string
    #[must_use]
    pub fn with_custom_timestamp(mut self, format_str: &str) -> Self {
        self.timestamp_format = TimestampFormat::Custom(format_str.to_string());
        self
    }

    #[must_use]
    pub fn with_duration_format(mut self, format: DurationFormat) -> Self {
        self.duration_format = format;
        self
    }

    #[must_use]
    pub fn with_duration_unit(mut self, unit: DurationUnit) -> Self {
        self.duration_unit = unit;
        self
    }

    #[must_use]
    pub fn with_escape_html(mut self, escape: bool) -> Self {
        self.escape_html = escape;
        self
    }

    #[must_use]
    pub fn with_level_uppercase(mut self, uppercase: bool) -> Self {
        self.level_uppercase = uppercase;
        self
    }

    #[must_use]
    pub fn with_disable_hooks(mut self, disable: bool) -> Self {
        self.disable_hooks = disable;
        self
    }

    #[must_use]
    pub fn with_disable_sampling(mut self, disable: bool) -> Self {
        self.disable_sampling = disable;
        self
    }

    #[must_use]
    pub fn with_exit_on_fatal(mut self, exit: bool) -> Self {
        self.exit_on_fatal = exit;
        self
    }
}
