use std::fmt;

use bstr::BStr;
use thiserror::Error;

/// Malformed input detected by the scanner.
///
/// `offset` is the index of the offending byte, or the input length when the
/// input ended early.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at offset {offset}")]
pub struct SyntaxError {
    pub(crate) kind: SyntaxErrorKind,
    pub(crate) offset: usize,
}

impl SyntaxError {
    pub(crate) fn new(kind: SyntaxErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    /// What went wrong.
    #[must_use]
    pub fn kind(&self) -> &SyntaxErrorKind {
        &self.kind
    }

    /// Index of the offending byte, or the input length for truncated input.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// The specific failure behind a [`SyntaxError`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// A byte that is not legal at its position.
    #[error("invalid character {} {context}", quoted(.byte))]
    InvalidCharacter {
        /// The offending byte.
        byte: u8,
        /// Where the scanner was, e.g. `"after array element"`.
        context: &'static str,
    },
    /// An opening bracket beyond the nesting limit.
    #[error("invalid character {} exceeded max depth of {max_depth}", quoted(.byte))]
    NestingTooDeep {
        /// The `{` or `[` that went too deep.
        byte: u8,
        /// The configured limit.
        max_depth: usize,
    },
    /// A string literal holding bytes that are not UTF-8.
    #[error("invalid UTF-8 in string literal")]
    InvalidUtf8,
    /// Input ended inside a value, or held no value at all.
    #[error("unexpected end of JSON input")]
    UnexpectedEndOfInput,
}

/// A syntactically valid token that does not convert to the requested type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("json: cannot unmarshal {} into {target}", BStr::new(.raw))]
pub struct ValueError {
    raw: Vec<u8>,
    target: &'static str,
}

impl ValueError {
    /// Records that `raw` could not be converted to `target`.
    #[must_use]
    pub fn new(raw: &[u8], target: &'static str) -> Self {
        Self {
            raw: raw.to_vec(),
            target,
        }
    }

    /// The offending token bytes.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Name of the requested type.
    #[must_use]
    pub fn target(&self) -> &'static str {
        self.target
    }
}

/// Failure while serializing a nested dynamically-typed value.
///
/// The encoder buffer is left mid-value; callers must discard it.
#[derive(Error, Debug)]
pub enum MarshalError {
    /// Returned by a [`MarshalJson`](crate::MarshalJson) implementation.
    #[error("json: error calling marshal_json: {0}")]
    Custom(String),
    /// The structural serializer failed.
    #[cfg(feature = "serde")]
    #[error("json: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Every error this crate produces, for callers that want a single type.
#[derive(Error, Debug)]
pub enum Error {
    /// See [`SyntaxError`].
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    /// See [`ValueError`].
    #[error(transparent)]
    Value(#[from] ValueError),
    /// See [`MarshalError`].
    #[error(transparent)]
    Marshal(#[from] MarshalError),
}

/// Renders a byte the way it appears in error messages: `'x'`, `'\n'`,
/// `'\x01'`.
pub(crate) struct QuotedByte(pub(crate) u8);

fn quoted(byte: &u8) -> QuotedByte {
    QuotedByte(*byte)
}

impl fmt::Display for QuotedByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            b'\'' => f.write_str("'\\''"),
            b'"' => f.write_str("'\"'"),
            b'\\' => f.write_str("'\\\\'"),
            0x07 => f.write_str("'\\a'"),
            0x08 => f.write_str("'\\b'"),
            0x0C => f.write_str("'\\f'"),
            b'\n' => f.write_str("'\\n'"),
            b'\r' => f.write_str("'\\r'"),
            b'\t' => f.write_str("'\\t'"),
            0x0B => f.write_str("'\\v'"),
            c if c == b' ' || c.is_ascii_graphic() => write!(f, "'{}'", char::from(c)),
            c if c < 0x80 => write!(f, "'\\x{c:02x}'"),
            c => write!(f, "'\\u{:04x}'", u32::from(c)),
        }
    }
}
