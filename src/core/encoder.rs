//! JSON field encoders
//!
//! Every function here appends one JSON token to a byte buffer. None of them
//! allocate for scalar values and none of them fail: a value that cannot be
//! rendered degrades to a best-effort string so the surrounding record can
//! always be closed.

use super::config::{DurationFormat, DurationUnit};
use super::timestamp::TimestampFormat;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::{self, Write as _};
use std::io::Write as _;
use std::time::Duration;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Integer types that can be written as a JSON number
pub trait Integer: Copy + fmt::Display + private::Sealed {}

/// Floating point types written in their own shortest round-trip form
pub trait Float: Copy + private::Sealed {
    #[doc(hidden)]
    fn append_json(self, dst: &mut Vec<u8>);
}

mod private {
    pub trait Sealed {}
}

macro_rules! impl_integer {
    ($($t:ty),*) => {
        $(
            impl private::Sealed for $t {}
            impl Integer for $t {}
        )*
    };
}

impl_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! impl_float {
    ($($t:ty),*) => {
        $(
            impl private::Sealed for $t {}
            impl Float for $t {
                fn append_json(self, dst: &mut Vec<u8>) {
                    if self.is_nan() {
                        dst.extend_from_slice(b"\"NaN\"");
                    } else if self.is_infinite() {
                        if self > 0.0 {
                            dst.extend_from_slice(b"\"+Inf\"");
                        } else {
                            dst.extend_from_slice(b"\"-Inf\"");
                        }
                    } else {
                        let abs = self.abs();
                        if abs != 0.0 && (abs < 1e-6 || abs >= 1e21) {
                            let _ = write!(dst, "{:e}", self);
                        } else {
                            let _ = write!(dst, "{}", self);
                        }
                    }
                }
            }
        )*
    };
}

impl_float!(f32, f64);

#[inline]
fn needs_escape(b: u8, escape_html: bool) -> bool {
    b < 0x20 || b == b'"' || b == b'\\' || (escape_html && matches!(b, b'<' | b'>' | b'&'))
}

/// Append `s` JSON-escaped, without surrounding quotes.
///
/// Multi-byte UTF-8 sequences never contain bytes below 0x80, so runs are
/// split only on ASCII boundaries.
pub fn append_escaped(dst: &mut Vec<u8>, s: &str, escape_html: bool) {
    let bytes = s.as_bytes();
    let mut start = 0;

    for (i, &b) in bytes.iter().enumerate() {
        if !needs_escape(b, escape_html) {
            continue;
        }
        dst.extend_from_slice(&bytes[start..i]);
        match b {
            b'"' => dst.extend_from_slice(b"\\\""),
            b'\\' => dst.extend_from_slice(b"\\\\"),
            b'\n' => dst.extend_from_slice(b"\\n"),
            b'\r' => dst.extend_from_slice(b"\\r"),
            b'\t' => dst.extend_from_slice(b"\\t"),
            0x08 => dst.extend_from_slice(b"\\b"),
            0x0c => dst.extend_from_slice(b"\\f"),
            _ => {
                dst.extend_from_slice(b"\\u00");
                dst.push(HEX[(b >> 4) as usize]);
                dst.push(HEX[(b & 0x0f) as usize]);
            }
        }
        start = i + 1;
    }

    dst.extend_from_slice(&bytes[start..]);
}

/// `fmt::Write` adapter that escapes everything written through it
pub(crate) struct EscapeWriter<'b> {
    dst: &'b mut Vec<u8>,
    escape_html: bool,
    written: usize,
}

impl<'b> EscapeWriter<'b> {
    pub(crate) fn new(dst: &'b mut Vec<u8>, escape_html: bool) -> Self {
        Self {
            dst,
            escape_html,
            written: 0,
        }
    }
}

impl fmt::Write for EscapeWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.written += s.len();
        append_escaped(self.dst, s, self.escape_html);
        Ok(())
    }
}

/// Append `"key":`, preceded by a comma unless this is the first member of
/// the enclosing object.
pub fn append_key(dst: &mut Vec<u8>, key: &str, escape_html: bool) {
    if let Some(&last) = dst.last() {
        if last != b'{' {
            dst.push(b',');
        }
    }
    append_string(dst, key, escape_html);
    dst.push(b':');
}

/// Append a comma unless this is the first element of the enclosing array
pub fn append_array_delim(dst: &mut Vec<u8>) {
    if let Some(&last) = dst.last() {
        if last != b'[' {
            dst.push(b',');
        }
    }
}

pub fn append_string(dst: &mut Vec<u8>, s: &str, escape_html: bool) {
    dst.push(b'"');
    append_escaped(dst, s, escape_html);
    dst.push(b'"');
}

/// Append a byte string; invalid UTF-8 sequences become U+FFFD
pub fn append_bytes(dst: &mut Vec<u8>, bytes: &[u8], escape_html: bool) {
    append_string(dst, &String::from_utf8_lossy(bytes), escape_html);
}

pub fn append_hex(dst: &mut Vec<u8>, bytes: &[u8]) {
    dst.push(b'"');
    for &b in bytes {
        dst.push(HEX[(b >> 4) as usize]);
        dst.push(HEX[(b & 0x0f) as usize]);
    }
    dst.push(b'"');
}

pub fn append_bool(dst: &mut Vec<u8>, value: bool) {
    dst.extend_from_slice(if value { b"true" } else { b"false" });
}

pub fn append_null(dst: &mut Vec<u8>) {
    dst.extend_from_slice(b"null");
}

pub fn append_int<I: Integer>(dst: &mut Vec<u8>, value: I) {
    let _ = write!(dst, "{}", value);
}

pub fn append_float<F: Float>(dst: &mut Vec<u8>, value: F) {
    value.append_json(dst);
}

/// Stream a `Display` value into a JSON string.
///
/// Returns `false` when the value rendered as an empty string. A `Display`
/// impl that reports an error keeps whatever it wrote before failing.
pub fn append_display<T: fmt::Display + ?Sized>(
    dst: &mut Vec<u8>,
    value: &T,
    escape_html: bool,
) -> bool {
    dst.push(b'"');
    let mut writer = EscapeWriter::new(dst, escape_html);
    let _ = write!(writer, "{}", value);
    let written = writer.written;
    dst.push(b'"');
    written > 0
}

pub fn append_duration(
    dst: &mut Vec<u8>,
    value: Duration,
    format: DurationFormat,
    unit: DurationUnit,
    escape_html: bool,
) {
    match format {
        DurationFormat::Text => {
            dst.push(b'"');
            let mut writer = EscapeWriter::new(dst, escape_html);
            let _ = write!(writer, "{:?}", value);
            dst.push(b'"');
        }
        DurationFormat::Integer => append_int(dst, value.as_nanos() / unit.as_nanos()),
        DurationFormat::Float => {
            append_float(dst, value.as_nanos() as f64 / unit.as_nanos() as f64)
        }
    }
}

/// Append a timestamp; numeric formats become JSON numbers.
///
/// A custom format that chrono refuses to render falls back to RFC 3339.
pub fn append_time(
    dst: &mut Vec<u8>,
    value: &DateTime<Utc>,
    format: &TimestampFormat,
    escape_html: bool,
) {
    match format {
        TimestampFormat::Unix => append_int(dst, value.timestamp()),
        TimestampFormat::UnixMillis => append_int(dst, value.timestamp_millis()),
        TimestampFormat::UnixMicros => append_int(dst, value.timestamp_micros()),
        _ => {
            dst.push(b'"');
            let mark = dst.len();
            let mut writer = EscapeWriter::new(dst, escape_html);
            if format.write_to(&mut writer, value).is_err() {
                dst.truncate(mark);
                let mut writer = EscapeWriter::new(dst, escape_html);
                let _ = TimestampFormat::Rfc3339.write_to(&mut writer, value);
            }
            dst.push(b'"');
        }
    }
}

/// Append any `Serialize` value with serde_json.
///
/// A failing serializer is replaced by a `"marshaling error: ..."` string.
pub fn append_serialized<T: Serialize + ?Sized>(dst: &mut Vec<u8>, value: &T, escape_html: bool) {
    let mark = dst.len();
    if let Err(err) = serde_json::to_writer(&mut *dst, value) {
        dst.truncate(mark);
        dst.push(b'"');
        let mut writer = EscapeWriter::new(dst, escape_html);
        let _ = write!(writer, "marshaling error: {}", err);
        dst.push(b'"');
    }
}

/// Merge pre-rendered object members into `dst`.
///
/// `src` is either a full object prefix starting with `{` (which is dropped)
/// or a bare run of members. A comma is inserted when `dst` already holds
/// members.
pub fn append_object_data(dst: &mut Vec<u8>, src: &[u8]) {
    let members = match src.first() {
        Some(b'{') => &src[1..],
        Some(_) => src,
        None => return,
    };
    if members.is_empty() {
        return;
    }
    if dst.len() > 1 {
        dst.push(b',');
    }
    dst.extend_from_slice(members);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn render(f: impl FnOnce(&mut Vec<u8>)) -> String {
        let mut buf = Vec::new();
        f(&mut buf);
        String::from_utf8(buf).expect("encoders emit UTF-8")
    }

    #[test]
    fn test_escape_control_and_quotes() {
        let out = render(|b| append_string(b, "a\"b\\c\nd\te\u{1}", false));
        assert_eq!(out, r#""a\"b\\c\nd\te\u0001""#);
    }

    #[test]
    fn test_escape_html_default_and_opt_out() {
        assert_eq!(
            render(|b| append_string(b, "<a&b>", true)),
            r#""\u003ca\u0026b\u003e""#
        );
        assert_eq!(render(|b| append_string(b, "<a&b>", false)), r#""<a&b>""#);
    }

    #[test]
    fn test_escape_keeps_multibyte() {
        assert_eq!(render(|b| append_string(b, "héllo ✓", true)), "\"héllo ✓\"");
    }

    #[test]
    fn test_invalid_utf8_bytes() {
        let out = render(|b| append_bytes(b, &[b'o', 0xff, b'k'], true));
        assert_eq!(out, "\"o\u{fffd}k\"");
    }

    #[test]
    fn test_key_commas() {
        let out = render(|b| {
            b.push(b'{');
            append_key(b, "a", true);
            append_int(b, 1);
            append_key(b, "b", true);
            append_bool(b, false);
            b.push(b'}');
        });
        assert_eq!(out, r#"{"a":1,"b":false}"#);
    }

    #[test]
    fn test_array_delims() {
        let out = render(|b| {
            b.push(b'[');
            for i in 0..3 {
                append_array_delim(b);
                append_int(b, i);
            }
            b.push(b']');
        });
        assert_eq!(out, "[0,1,2]");
    }

    #[test]
    fn test_floats() {
        assert_eq!(render(|b| append_float(b, 3.0f64)), "3");
        assert_eq!(render(|b| append_float(b, 0.1f64)), "0.1");
        assert_eq!(render(|b| append_float(b, 0.1f32)), "0.1");
        assert_eq!(render(|b| append_float(b, 1e21f64)), "1e21");
        assert_eq!(render(|b| append_float(b, 1.5e-7f64)), "1.5e-7");
        assert_eq!(render(|b| append_float(b, f64::NAN)), "\"NaN\"");
        assert_eq!(render(|b| append_float(b, f64::INFINITY)), "\"+Inf\"");
        assert_eq!(render(|b| append_float(b, f64::NEG_INFINITY)), "\"-Inf\"");
    }

    #[test]
    fn test_durations() {
        let d = Duration::from_millis(1500);
        assert_eq!(
            render(|b| append_duration(b, d, DurationFormat::Float, DurationUnit::Millis, true)),
            "1500"
        );
        assert_eq!(
            render(|b| append_duration(b, d, DurationFormat::Float, DurationUnit::Secs, true)),
            "1.5"
        );
        assert_eq!(
            render(|b| append_duration(b, d, DurationFormat::Integer, DurationUnit::Secs, true)),
            "1"
        );
        assert_eq!(
            render(|b| append_duration(b, d, DurationFormat::Text, DurationUnit::Millis, true)),
            "\"1.5s\""
        );
    }

    #[test]
    fn test_time_formats() {
        let dt = Utc
            .with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime");
        assert_eq!(
            render(|b| append_time(b, &dt, &TimestampFormat::Iso8601, true)),
            "\"2025-01-08T10:30:45.000Z\""
        );
        assert_eq!(
            render(|b| append_time(b, &dt, &TimestampFormat::Unix, true)),
            "1736332245"
        );
    }

    #[test]
    fn test_display_reports_empty() {
        let mut buf = Vec::new();
        assert!(!append_display(&mut buf, "", true));
        assert_eq!(buf, b"\"\"");

        let mut buf = Vec::new();
        assert!(append_display(&mut buf, &42, true));
        assert_eq!(buf, b"\"42\"");
    }

    #[test]
    fn test_serialized_fallback() {
        use std::collections::HashMap;

        let mut ok = HashMap::new();
        ok.insert("k", 1);
        assert_eq!(render(|b| append_serialized(b, &ok, true)), r#"{"k":1}"#);

        // Map keys must be strings in JSON
        let mut bad = HashMap::new();
        bad.insert((1, 2), 1);
        let out = render(|b| append_serialized(b, &bad, true));
        assert!(out.starts_with("\"marshaling error: "), "got {}", out);
    }

    #[test]
    fn test_object_data_merge() {
        let out = render(|b| {
            b.push(b'{');
            append_object_data(b, br#"{"svc":"api""#);
        });
        assert_eq!(out, r#"{"svc":"api""#);

        let out = render(|b| {
            b.extend_from_slice(br#"{"level":"info""#);
            append_object_data(b, br#"{"svc":"api""#);
        });
        assert_eq!(out, r#"{"level":"info","svc":"api""#);

        let out = render(|b| {
            b.push(b'{');
            append_object_data(b, b"{");
        });
        assert_eq!(out, "{");
    }
}
