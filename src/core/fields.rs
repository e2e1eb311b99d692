//! Chainable typed fields
//!
//! [`Fields`] is the one field API shared by events, context builders and
//! nested objects. Each call appends `"key":value` straight into the record
//! buffer, so a chain of field calls never builds an intermediate map.
//!
//! ```
//! use rust_event_logger::prelude::*;
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemoryAppender::new());
//! let logger = Logger::new(sink.clone());
//!
//! logger
//!     .info()
//!     .str("user", "alice")
//!     .dict("req", |d| d.str("path", "/login").int("status", 200))
//!     .array("tags", |a| a.str("auth").str("web"))
//!     .msg("done");
//!
//! assert_eq!(
//!     sink.contents(),
//!     "{\"level\":\"info\",\"user\":\"alice\",\"req\":{\"path\":\"/login\",\"status\":200},\"tags\":[\"auth\",\"web\"],\"message\":\"done\"}\n"
//! );
//! ```

use super::config::LoggerConfig;
use super::encoder::{
    append_array_delim, append_bool, append_bytes, append_display, append_duration, append_float,
    append_hex, append_int, append_key, append_null, append_serialized, append_string,
    append_time, Float, Integer,
};
use super::log_context::FieldValue;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

/// A value that renders its own members into an enclosing JSON object
///
/// ```
/// use rust_event_logger::core::{Dict, Fields, LogObject};
///
/// struct User {
///     name: String,
///     age: u32,
/// }
///
/// impl LogObject for User {
///     fn encode_object<'d>(&self, obj: Dict<'d>) -> Dict<'d> {
///         obj.str("name", &self.name).int("age", self.age)
///     }
/// }
/// ```
pub trait LogObject {
    fn encode_object<'d>(&self, obj: Dict<'d>) -> Dict<'d>;

    /// An absent object is written as `null` by `object` and skipped by
    /// `embed_object`.
    fn is_absent(&self) -> bool {
        false
    }
}

/// A value that renders its own elements into an enclosing JSON array
pub trait LogArray {
    fn encode_array<'d>(&self, arr: Array<'d>) -> Array<'d>;

    fn is_absent(&self) -> bool {
        false
    }
}

impl<T: LogObject> LogObject for Option<T> {
    fn encode_object<'d>(&self, obj: Dict<'d>) -> Dict<'d> {
        match self {
            Some(inner) => inner.encode_object(obj),
            None => obj,
        }
    }

    fn is_absent(&self) -> bool {
        self.as_ref().map_or(true, LogObject::is_absent)
    }
}

impl<T: LogObject + ?Sized> LogObject for &T {
    fn encode_object<'d>(&self, obj: Dict<'d>) -> Dict<'d> {
        (**self).encode_object(obj)
    }

    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }
}

impl<T: LogObject + ?Sized> LogObject for Box<T> {
    fn encode_object<'d>(&self, obj: Dict<'d>) -> Dict<'d> {
        (**self).encode_object(obj)
    }

    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }
}

impl<T: LogObject + ?Sized> LogObject for Arc<T> {
    fn encode_object<'d>(&self, obj: Dict<'d>) -> Dict<'d> {
        (**self).encode_object(obj)
    }

    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }
}

impl<T: LogObject> LogArray for [T] {
    fn encode_array<'d>(&self, arr: Array<'d>) -> Array<'d> {
        self.iter().fold(arr, |arr, item| arr.object(item))
    }
}

impl<T: LogObject> LogArray for Vec<T> {
    fn encode_array<'d>(&self, arr: Array<'d>) -> Array<'d> {
        self.as_slice().encode_array(arr)
    }
}

impl<A: LogArray> LogArray for Option<A> {
    fn encode_array<'d>(&self, arr: Array<'d>) -> Array<'d> {
        match self {
            Some(inner) => inner.encode_array(arr),
            None => arr,
        }
    }

    fn is_absent(&self) -> bool {
        self.as_ref().map_or(true, LogArray::is_absent)
    }
}

impl<A: LogArray + ?Sized> LogArray for &A {
    fn encode_array<'d>(&self, arr: Array<'d>) -> Array<'d> {
        (**self).encode_array(arr)
    }

    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }
}

/// Write `err` as a string; an empty rendering rolls the key back.
fn append_error_field<E: Error + ?Sized>(
    buf: &mut Vec<u8>,
    key: &str,
    err: &E,
    escape_html: bool,
) -> bool {
    let mark = buf.len();
    append_key(buf, key, escape_html);
    if append_display(buf, err, escape_html) {
        true
    } else {
        buf.truncate(mark);
        false
    }
}

/// Source chain of `err`, outermost cause first
fn append_error_chain<E: Error + ?Sized>(
    buf: &mut Vec<u8>,
    key: &str,
    err: &E,
    escape_html: bool,
) {
    let mut source = err.source();
    if source.is_none() {
        return;
    }
    append_key(buf, key, escape_html);
    buf.push(b'[');
    while let Some(cause) = source {
        append_array_delim(buf);
        append_display(buf, cause, escape_html);
        source = cause.source();
    }
    buf.push(b']');
}

fn append_nested_object<O: LogObject + ?Sized>(
    buf: &mut Vec<u8>,
    config: &LoggerConfig,
    value: &O,
) {
    if value.is_absent() {
        append_null(buf);
        return;
    }
    buf.push(b'{');
    let _ = value.encode_object(Dict::new(buf, config));
    buf.push(b'}');
}

fn append_nested_array<A: LogArray + ?Sized>(
    buf: &mut Vec<u8>,
    config: &LoggerConfig,
    value: &A,
) {
    if value.is_absent() {
        append_null(buf);
        return;
    }
    buf.push(b'[');
    let _ = value.encode_array(Array::new(buf, config));
    buf.push(b']');
}

/// Typed field methods shared by [`Event`](super::event::Event),
/// [`Context`](super::context::Context) and [`Dict`].
///
/// Every method consumes and returns `self`, and does nothing on a disabled
/// event.
pub trait Fields: Sized {
    /// Run `f` on the underlying buffer. Skipped when there is no buffer.
    #[doc(hidden)]
    fn with_buffer<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Vec<u8>, &LoggerConfig);

    /// Whether `err` also writes the error's source chain
    #[doc(hidden)]
    fn stack_enabled(&self) -> bool {
        false
    }

    fn str(mut self, key: &str, value: &str) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            append_string(buf, value, cfg.escape_html);
        });
        self
    }

    fn strs<S: AsRef<str>>(mut self, key: &str, values: &[S]) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            buf.push(b'[');
            for value in values {
                append_array_delim(buf);
                append_string(buf, value.as_ref(), cfg.escape_html);
            }
            buf.push(b']');
        });
        self
    }

    /// Stream a `Display` value into a string field
    fn display<T: fmt::Display + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            append_display(buf, value, cfg.escape_html);
        });
        self
    }

    /// Byte string; invalid UTF-8 becomes U+FFFD
    fn bytes(mut self, key: &str, value: &[u8]) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            append_bytes(buf, value, cfg.escape_html);
        });
        self
    }

    fn hex(mut self, key: &str, value: &[u8]) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            append_hex(buf, value);
        });
        self
    }

    /// Pre-encoded JSON, copied verbatim. Empty input is written as `null`.
    fn raw_json(mut self, key: &str, value: &[u8]) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            if value.is_empty() {
                append_null(buf);
            } else {
                buf.extend_from_slice(value);
            }
        });
        self
    }

    fn bool(mut self, key: &str, value: bool) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            append_bool(buf, value);
        });
        self
    }

    fn bools(mut self, key: &str, values: &[bool]) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            buf.push(b'[');
            for &value in values {
                append_array_delim(buf);
                append_bool(buf, value);
            }
            buf.push(b']');
        });
        self
    }

    fn int<I: Integer>(mut self, key: &str, value: I) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            append_int(buf, value);
        });
        self
    }

    fn ints<I: Integer>(mut self, key: &str, values: &[I]) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            buf.push(b'[');
            for &value in values {
                append_array_delim(buf);
                append_int(buf, value);
            }
            buf.push(b']');
        });
        self
    }

    fn float<F: Float>(mut self, key: &str, value: F) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            append_float(buf, value);
        });
        self
    }

    fn floats<F: Float>(mut self, key: &str, values: &[F]) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            buf.push(b'[');
            for &value in values {
                append_array_delim(buf);
                append_float(buf, value);
            }
            buf.push(b']');
        });
        self
    }

    /// Duration in the configured format and unit
    fn dur(mut self, key: &str, value: Duration) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            append_duration(buf, value, cfg.duration_format, cfg.duration_unit, cfg.escape_html);
        });
        self
    }

    fn durs(mut self, key: &str, values: &[Duration]) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            buf.push(b'[');
            for &value in values {
                append_array_delim(buf);
                append_duration(buf, value, cfg.duration_format, cfg.duration_unit, cfg.escape_html);
            }
            buf.push(b']');
        });
        self
    }

    /// Instant in the configured timestamp format
    fn time(mut self, key: &str, value: &DateTime<Utc>) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            append_time(buf, value, &cfg.timestamp_format, cfg.escape_html);
        });
        self
    }

    fn times(mut self, key: &str, values: &[DateTime<Utc>]) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            buf.push(b'[');
            for value in values {
                append_array_delim(buf);
                append_time(buf, value, &cfg.timestamp_format, cfg.escape_html);
            }
            buf.push(b']');
        });
        self
    }

    fn ip(self, key: &str, addr: impl Into<IpAddr>) -> Self {
        let addr: IpAddr = addr.into();
        self.display(key, &addr)
    }

    fn null(mut self, key: &str) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            append_null(buf);
        });
        self
    }

    /// Error under the configured error key.
    ///
    /// An error that renders as an empty string adds nothing. After
    /// [`Event::stack`](super::event::Event::stack) the source chain follows
    /// under the stack key.
    fn err<E: Error + ?Sized>(mut self, err: &E) -> Self {
        let stack = self.stack_enabled();
        self.with_buffer(|buf, cfg| {
            if append_error_field(buf, &cfg.error_field, err, cfg.escape_html) && stack {
                append_error_chain(buf, &cfg.stack_field, err, cfg.escape_html);
            }
        });
        self
    }

    /// Error under an explicit key; `None` adds nothing
    fn any_err<E: Error + ?Sized>(mut self, key: &str, err: Option<&E>) -> Self {
        if let Some(err) = err {
            self.with_buffer(|buf, cfg| {
                append_error_field(buf, key, err, cfg.escape_html);
            });
        }
        self
    }

    /// Array of errors; `None` entries are written as `null`
    fn errs<E: Error + ?Sized>(mut self, key: &str, errs: &[Option<&E>]) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            buf.push(b'[');
            for err in errs {
                append_array_delim(buf);
                match err {
                    Some(err) => {
                        append_display(buf, *err, cfg.escape_html);
                    }
                    None => append_null(buf),
                }
            }
            buf.push(b']');
        });
        self
    }

    /// Nested object; an absent value is written as `null`
    fn object<O: LogObject + ?Sized>(mut self, key: &str, value: &O) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            append_nested_object(buf, cfg, value);
        });
        self
    }

    /// Flatten an object's members into this one; an absent value adds nothing
    fn embed_object<O: LogObject + ?Sized>(mut self, value: &O) -> Self {
        if !value.is_absent() {
            self.with_buffer(|buf, cfg| {
                let _ = value.encode_object(Dict::new(buf, cfg));
            });
        }
        self
    }

    /// Nested object built inline
    fn dict<F>(mut self, key: &str, build: F) -> Self
    where
        F: for<'d> FnOnce(Dict<'d>) -> Dict<'d>,
    {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            buf.push(b'{');
            let _ = build(Dict::new(buf, cfg));
            buf.push(b'}');
        });
        self
    }

    /// Nested array built inline
    fn array<F>(mut self, key: &str, build: F) -> Self
    where
        F: for<'d> FnOnce(Array<'d>) -> Array<'d>,
    {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            buf.push(b'[');
            let _ = build(Array::new(buf, cfg));
            buf.push(b']');
        });
        self
    }

    /// Nested array from a [`LogArray`]; an absent value is written as `null`
    fn array_of<A: LogArray + ?Sized>(mut self, key: &str, value: &A) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            append_nested_array(buf, cfg, value);
        });
        self
    }

    /// Any `Serialize` value, encoded with serde_json
    fn serialize<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.with_buffer(|buf, cfg| {
            append_key(buf, key, cfg.escape_html);
            append_serialized(buf, value, cfg.escape_html);
        });
        self
    }

    /// Ordered key/value pairs
    fn fields<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        self.with_buffer(|buf, cfg| {
            for (key, value) in fields {
                append_key(buf, key.as_ref(), cfg.escape_html);
                let value: FieldValue = value.into();
                value.append_json(buf, cfg);
            }
        });
        self
    }
}

/// Members of a nested JSON object
pub struct Dict<'d> {
    buf: &'d mut Vec<u8>,
    config: &'d LoggerConfig,
}

impl<'d> Dict<'d> {
    pub(crate) fn new(buf: &'d mut Vec<u8>, config: &'d LoggerConfig) -> Self {
        Self { buf, config }
    }
}

impl Fields for Dict<'_> {
    fn with_buffer<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Vec<u8>, &LoggerConfig),
    {
        f(&mut *self.buf, self.config);
    }
}

/// Elements of a nested JSON array
pub struct Array<'d> {
    buf: &'d mut Vec<u8>,
    config: &'d LoggerConfig,
}

impl<'d> Array<'d> {
    pub(crate) fn new(buf: &'d mut Vec<u8>, config: &'d LoggerConfig) -> Self {
        Self { buf, config }
    }

    fn element(self, f: impl FnOnce(&mut Vec<u8>, &LoggerConfig)) -> Self {
        append_array_delim(self.buf);
        f(&mut *self.buf, self.config);
        self
    }

    pub fn str(self, value: &str) -> Self {
        self.element(|buf, cfg| append_string(buf, value, cfg.escape_html))
    }

    pub fn display<T: fmt::Display + ?Sized>(self, value: &T) -> Self {
        self.element(|buf, cfg| {
            append_display(buf, value, cfg.escape_html);
        })
    }

    pub fn bytes(self, value: &[u8]) -> Self {
        self.element(|buf, cfg| append_bytes(buf, value, cfg.escape_html))
    }

    pub fn hex(self, value: &[u8]) -> Self {
        self.element(|buf, _| append_hex(buf, value))
    }

    pub fn raw_json(self, value: &[u8]) -> Self {
        self.element(|buf, _| {
            if value.is_empty() {
                append_null(buf);
            } else {
                buf.extend_from_slice(value);
            }
        })
    }

    pub fn bool(self, value: bool) -> Self {
        self.element(|buf, _| append_bool(buf, value))
    }

    pub fn int<I: Integer>(self, value: I) -> Self {
        self.element(|buf, _| append_int(buf, value))
    }

    pub fn float<F: Float>(self, value: F) -> Self {
        self.element(|buf, _| append_float(buf, value))
    }

    pub fn dur(self, value: Duration) -> Self {
        self.element(|buf, cfg| {
            append_duration(buf, value, cfg.duration_format, cfg.duration_unit, cfg.escape_html)
        })
    }

    pub fn time(self, value: &DateTime<Utc>) -> Self {
        self.element(|buf, cfg| append_time(buf, value, &cfg.timestamp_format, cfg.escape_html))
    }

    pub fn ip(self, addr: impl Into<IpAddr>) -> Self {
        let addr: IpAddr = addr.into();
        self.display(&addr)
    }

    pub fn null(self) -> Self {
        self.element(|buf, _| append_null(buf))
    }

    /// Error as a string element; `None` is written as `null`
    pub fn err<E: Error + ?Sized>(self, err: Option<&E>) -> Self {
        self.element(|buf, cfg| match err {
            Some(err) => {
                append_display(buf, err, cfg.escape_html);
            }
            None => append_null(buf),
        })
    }

    /// Object element; an absent value is written as `null`
    pub fn object<O: LogObject + ?Sized>(self, value: &O) -> Self {
        self.element(|buf, cfg| append_nested_object(buf, cfg, value))
    }

    pub fn dict<F>(self, build: F) -> Self
    where
        F: for<'e> FnOnce(Dict<'e>) -> Dict<'e>,
    {
        self.element(|buf, cfg| {
            buf.push(b'{');
            let _ = build(Dict::new(buf, cfg));
            buf.push(b'}');
        })
    }

    pub fn array<F>(self, build: F) -> Self
    where
        F: for<'e> FnOnce(Array<'e>) -> Array<'e>,
    {
        self.element(|buf, cfg| {
            buf.push(b'[');
            let _ = build(Array::new(buf, cfg));
            buf.push(b']');
        })
    }

    pub fn serialize<T: Serialize + ?Sized>(self, value: &T) -> Self {
        self.element(|buf, cfg| append_serialized(buf, value, cfg.escape_html))
    }
}
