//! Streaming JSON writer.
//!
//! [`Encoder`] appends one JSON fragment per call and decides on its own
//! whether a `,` is needed before it: if the last byte written is `{`, `[`,
//! `:` or `,` (or nothing was written yet) the value follows directly,
//! otherwise a separator is inserted. Call order is therefore the only thing
//! the caller has to get right.
//!
//! ```rust
//! use jsoncodec::Encoder;
//!
//! let mut enc = Encoder::new(64);
//! enc.append_object_begin();
//! enc.append_object_key("a");
//! enc.append_i32(1);
//! enc.append_object_key("b");
//! enc.append_bool(true);
//! enc.append_object_end();
//! assert_eq!(enc.finish(), br#"{"a":1,"b":true}"#);
//! ```
//!
//! Two departures from plain JSON: non-finite floats are
//! written as the quoted strings `"NaN"`, `"+Inf"` and `"-Inf"`, and keys are
//! written in call order with no sorting.

use std::{fmt, io};

use base64::{Engine, engine::general_purpose::STANDARD, write::EncoderWriter};

use crate::{error::MarshalError, options::EncoderOptions};

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Encoded base64 lengths up to this are encoded in one shot into the
/// buffer; longer ones stream through a base64 writer.
const BASE64_INLINE_LIMIT: usize = 1024;

/// A value that writes its own JSON representation.
///
/// Used by [`Encoder::append_interface`] for nested values whose shape is
/// only known at run time. Implementations append exactly one complete JSON
/// value to `out`.
pub trait MarshalJson {
    /// Appends the JSON form of `self` to `out`.
    ///
    /// # Errors
    ///
    /// Any failure aborts the surrounding encode; `out` may hold a partial
    /// value afterwards.
    fn marshal_json(&self, out: &mut Vec<u8>) -> Result<(), MarshalError>;
}

impl<T: MarshalJson + ?Sized> MarshalJson for &T {
    fn marshal_json(&self, out: &mut Vec<u8>) -> Result<(), MarshalError> {
        (**self).marshal_json(out)
    }
}

impl<T: MarshalJson + ?Sized> MarshalJson for Box<T> {
    fn marshal_json(&self, out: &mut Vec<u8>) -> Result<(), MarshalError> {
        (**self).marshal_json(out)
    }
}

/// Serializes the wrapped value structurally through `serde_json`.
///
/// The fallback for nested values that have no [`MarshalJson`] impl of their
/// own.
///
/// ```rust
/// use jsoncodec::{Encoder, Structural};
///
/// let mut enc = Encoder::new(0);
/// enc.append_array_begin();
/// enc.append_interface(Some(&Structural(vec![1, 2]))).unwrap();
/// enc.append_interface::<Structural<u8>>(None).unwrap();
/// enc.append_array_end();
/// assert_eq!(enc.finish(), b"[[1,2],null]");
/// ```
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Structural<T>(pub T);

#[cfg(feature = "serde")]
impl<T: serde::Serialize> MarshalJson for Structural<T> {
    fn marshal_json(&self, out: &mut Vec<u8>) -> Result<(), MarshalError> {
        serde_json::to_writer(out, &self.0)?;
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl MarshalJson for serde_json::Value {
    fn marshal_json(&self, out: &mut Vec<u8>) -> Result<(), MarshalError> {
        serde_json::to_writer(out, self)?;
        Ok(())
    }
}

/// Write-only JSON buffer.
///
/// One encoder produces one document; [`finish`](Self::finish) hands the
/// bytes over. After a failed [`append_interface`](Self::append_interface)
/// the buffer holds a partial value and must be discarded.
#[derive(Debug, Clone)]
pub struct Encoder {
    buf: Vec<u8>,
    escape_html: bool,
}

impl Encoder {
    /// An empty encoder with room for `capacity` bytes and default options.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_options(capacity, EncoderOptions::default())
    }

    /// An empty encoder with explicit options.
    #[must_use]
    pub fn with_options(capacity: usize, options: EncoderOptions) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            escape_html: options.escape_html,
        }
    }

    /// Consumes the encoder and returns what was written.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    /// The bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing was written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes `{`.
    pub fn append_object_begin(&mut self) {
        self.append_element_separator();
        self.buf.push(b'{');
    }

    /// Writes `}`.
    pub fn append_object_end(&mut self) {
        self.buf.push(b'}');
    }

    /// Writes `[`.
    pub fn append_array_begin(&mut self) {
        self.append_element_separator();
        self.buf.push(b'[');
    }

    /// Writes `]`.
    pub fn append_array_end(&mut self) {
        self.buf.push(b']');
    }

    /// Writes an escaped key followed by `:`.
    pub fn append_object_key(&mut self, key: &str) {
        self.append_element_separator();
        self.write_string(key);
        self.buf.push(b':');
    }

    /// Writes an escaped string.
    pub fn append_str(&mut self, v: &str) {
        self.append_element_separator();
        self.write_string(v);
    }

    /// Writes `v` as a standard, padded base64 string.
    ///
    /// Absent byte strings are written with [`append_null`](Self::append_null).
    pub fn append_bytes(&mut self, v: &[u8]) {
        self.append_element_separator();
        self.buf.push(b'"');
        if !v.is_empty() {
            match base64::encoded_len(v.len(), true) {
                Some(len) if len <= BASE64_INLINE_LIMIT => {
                    let start = self.buf.len();
                    self.buf.resize(start + len, 0);
                    let written = STANDARD.encode_slice(v, &mut self.buf[start..]).unwrap_or(0);
                    self.buf.truncate(start + written);
                }
                _ => {
                    tracing::trace!(len = v.len(), "streaming base64 encode");
                    let mut writer = EncoderWriter::new(&mut self.buf, &STANDARD);
                    // Writes into a Vec cannot fail.
                    let _ = io::Write::write_all(&mut writer, v);
                    let _ = writer.finish();
                }
            }
        }
        self.buf.push(b'"');
    }

    /// Writes `true` or `false`.
    pub fn append_bool(&mut self, v: bool) {
        self.append_element_separator();
        let lit: &[u8] = if v { b"true" } else { b"false" };
        self.buf.extend_from_slice(lit);
    }

    /// Writes a decimal integer.
    pub fn append_i32(&mut self, v: i32) {
        self.append_element_separator();
        self.write_display(v);
    }

    /// Writes a decimal integer.
    pub fn append_i64(&mut self, v: i64) {
        self.append_element_separator();
        self.write_display(v);
    }

    /// Writes a decimal integer.
    pub fn append_u32(&mut self, v: u32) {
        self.append_element_separator();
        self.write_display(v);
    }

    /// Writes a decimal integer.
    pub fn append_u64(&mut self, v: u64) {
        self.append_element_separator();
        self.write_display(v);
    }

    /// Writes the shortest decimal that reads back as the same `f32`, without
    /// an exponent. Non-finite values become `"NaN"`, `"+Inf"` or `"-Inf"`.
    pub fn append_f32(&mut self, v: f32) {
        self.append_element_separator();
        if !self.write_non_finite(f64::from(v)) {
            self.write_display(v);
        }
    }

    /// Writes the shortest decimal that reads back as the same `f64`, without
    /// an exponent. Non-finite values become `"NaN"`, `"+Inf"` or `"-Inf"`.
    pub fn append_f64(&mut self, v: f64) {
        self.append_element_separator();
        if !self.write_non_finite(v) {
            self.write_display(v);
        }
    }

    /// Writes `null`.
    pub fn append_null(&mut self) {
        self.append_element_separator();
        self.buf.extend_from_slice(b"null");
    }

    /// Writes a nested value through its own [`MarshalJson`] impl, or `null`
    /// for `None`.
    ///
    /// # Errors
    ///
    /// Returns the impl's error. The buffer then holds a partial value and
    /// the whole encode must be abandoned.
    pub fn append_interface<V: MarshalJson + ?Sized>(
        &mut self,
        v: Option<&V>,
    ) -> Result<(), MarshalError> {
        self.append_element_separator();
        let Some(v) = v else {
            self.buf.extend_from_slice(b"null");
            return Ok(());
        };
        v.marshal_json(&mut self.buf).inspect_err(|err| {
            tracing::debug!(%err, len = self.buf.len(), "nested marshal_json failed");
        })
    }

    /// Writes any `Serialize` value structurally.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error; see [`append_interface`](Self::append_interface).
    #[cfg(feature = "serde")]
    pub fn append_serialize<T: serde::Serialize + ?Sized>(
        &mut self,
        v: &T,
    ) -> Result<(), MarshalError> {
        self.append_element_separator();
        serde_json::to_writer(&mut self.buf, v).map_err(|err| {
            tracing::debug!(%err, "structural serialization failed");
            MarshalError::from(err)
        })
    }

    fn append_element_separator(&mut self) {
        match self.buf.last() {
            None | Some(b'{' | b'[' | b':' | b',') => {}
            Some(_) => self.buf.push(b','),
        }
    }

    fn write_display(&mut self, v: impl fmt::Display) {
        // Writes into a Vec cannot fail.
        let _ = io::Write::write_fmt(&mut self.buf, format_args!("{v}"));
    }

    fn write_non_finite(&mut self, v: f64) -> bool {
        let sentinel: &[u8] = if v.is_nan() {
            b"\"NaN\""
        } else if v == f64::INFINITY {
            b"\"+Inf\""
        } else if v == f64::NEG_INFINITY {
            b"\"-Inf\""
        } else {
            return false;
        };
        self.buf.extend_from_slice(sentinel);
        true
    }

    fn write_string(&mut self, s: &str) {
        let bytes = s.as_bytes();
        self.buf.push(b'"');
        let mut start = 0;
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            if b < 0x80 {
                if !self.needs_escape(b) {
                    i += 1;
                    continue;
                }
                self.buf.extend_from_slice(&bytes[start..i]);
                match b {
                    b'\\' | b'"' => self.buf.extend_from_slice(&[b'\\', b]),
                    b'\n' => self.buf.extend_from_slice(b"\\n"),
                    b'\r' => self.buf.extend_from_slice(b"\\r"),
                    b'\t' => self.buf.extend_from_slice(b"\\t"),
                    _ => self.buf.extend_from_slice(&[
                        b'\\',
                        b'u',
                        b'0',
                        b'0',
                        HEX[usize::from(b >> 4)],
                        HEX[usize::from(b & 0xF)],
                    ]),
                }
                i += 1;
                start = i;
                continue;
            }
            // U+2028 and U+2029 encode as E2 80 A8 and E2 80 A9.
            if self.escape_html
                && b == 0xE2
                && bytes.get(i + 1) == Some(&0x80)
                && matches!(bytes.get(i + 2), Some(0xA8 | 0xA9))
            {
                self.buf.extend_from_slice(&bytes[start..i]);
                self.buf.extend_from_slice(b"\\u202");
                self.buf.push(HEX[usize::from(bytes[i + 2] & 0xF)]);
                i += 3;
                start = i;
                continue;
            }
            i += 1;
        }
        self.buf.extend_from_slice(&bytes[start..]);
        self.buf.push(b'"');
    }

    fn needs_escape(&self, b: u8) -> bool {
        match b {
            0x00..=0x1F | b'"' | b'\\' => true,
            b'<' | b'>' | b'&' => self.escape_html,
            _ => false,
        }
    }
}

/// Raw bytes, written as given with no separator or escaping.
impl io::Write for Encoder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
