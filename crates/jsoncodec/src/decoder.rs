//! Pull-style cursor for schema-driven decoding.
//!
//! A [`Decoder`] validates its whole input up front and then lets the caller
//! walk the token stream with a handful of calls. Because syntax errors are
//! ruled out before the first pull, literals are re-scanned with a cheap
//! boundary search instead of the full state machine.
//!
//! Driving an object looks like this:
//!
//! ```rust
//! use jsoncodec::{Decoder, OpCode, parse_i64};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut d = Decoder::new(br#"{"id": 7, "tags": ["a"], "extra": {"x": null}}"#)?;
//! let mut id = 0;
//! d.scan_while(OpCode::SkipSpace);
//! assert_eq!(d.op_code(), OpCode::BeginObject);
//! loop {
//!     if d.object_before_read_key() {
//!         break;
//!     }
//!     let key = d.read_object_key();
//!     d.object_before_read_value();
//!     match key.as_ref() {
//!         "id" => id = parse_i64(d.read_item())?,
//!         _ => {
//!             d.read_item();
//!         }
//!     }
//!     if d.object_after_read_value() {
//!         break;
//!     }
//! }
//! d.check()?;
//! assert_eq!(id, 7);
//! # Ok(())
//! # }
//! ```

use std::borrow::Cow;

use crate::{
    error::SyntaxError,
    literal::ExpectedLiteral,
    options::DecoderOptions,
    scanner::{OpCode, ParsePhase, Scanner, check_valid},
    unquote::unquote_str,
};

const OUT_OF_SYNC: &str = "JSON decoder out of sync: pull call does not match the token stream";

#[cold]
#[track_caller]
fn out_of_sync() -> ! {
    panic!("{OUT_OF_SYNC}")
}

/// Cursor over one validated JSON document.
///
/// All pull operations panic when called in an order the token stream does
/// not allow, for example reading an object key while positioned on a number.
/// That is a bug in the driving code; malformed input is rejected by
/// [`Decoder::new`] and never reaches them.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    data: &'a [u8],
    /// Next read offset; `data.len() + 1` once end of input was processed.
    off: usize,
    scan: Scanner,
    op: OpCode,
}

impl<'a> Decoder<'a> {
    /// Validates `data` and returns a cursor positioned before its first byte.
    ///
    /// # Errors
    ///
    /// Returns the first syntax error in `data`.
    pub fn new(data: &'a [u8]) -> Result<Self, SyntaxError> {
        Self::with_options(data, DecoderOptions::default())
    }

    /// Like [`new`](Self::new) with explicit options.
    ///
    /// # Errors
    ///
    /// Returns the first syntax error in `data`, including nesting beyond
    /// [`DecoderOptions::max_nesting_depth`].
    pub fn with_options(data: &'a [u8], options: DecoderOptions) -> Result<Self, SyntaxError> {
        let mut scan = Scanner::with_max_depth(options.max_nesting_depth);
        if let Err(err) = check_valid(data, &mut scan) {
            tracing::debug!(offset = err.offset(), len = data.len(), %err, "rejected JSON input");
            return Err(err);
        }
        scan.reset();
        Ok(Self {
            data,
            off: 0,
            scan,
            op: OpCode::Continue,
        })
    }

    /// The input this decoder walks.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The OpCode produced by the last scanned byte.
    #[must_use]
    pub fn op_code(&self) -> OpCode {
        self.op
    }

    /// Position of the last byte read, or `None` before the first read.
    #[must_use]
    pub fn read_index(&self) -> Option<usize> {
        self.off.checked_sub(1)
    }

    /// The error recorded by the decode-pass scanner, if any.
    ///
    /// Driving code checks this after each structural step.
    #[must_use]
    pub fn scan_error(&self) -> Option<&SyntaxError> {
        self.scan.error()
    }

    /// [`scan_error`](Self::scan_error) as a `Result`.
    ///
    /// # Errors
    ///
    /// Returns a clone of the recorded error.
    pub fn check(&self) -> Result<(), SyntaxError> {
        self.scan.error().map_or(Ok(()), |err| Err(err.clone()))
    }

    /// Returns the raw bytes of the value the cursor is positioned on and
    /// moves past it.
    ///
    /// For a literal the bytes are the token itself (quotes included for
    /// strings); for an object or array they span the whole nested value.
    /// Afterwards the cursor sits on the byte that follows the value.
    ///
    /// # Panics
    ///
    /// If the cursor is not at the start of a value.
    #[track_caller]
    pub fn read_item(&mut self) -> &'a [u8] {
        let Some(start) = self.off.checked_sub(1) else {
            out_of_sync()
        };
        match self.op {
            OpCode::BeginLiteral => self.rescan_literal(),
            OpCode::BeginArray | OpCode::BeginObject => {
                self.skip();
                self.scan_next();
            }
            _ => out_of_sync(),
        }
        let data = self.data;
        &data[start..self.off - 1]
    }

    /// Reads an object key and unescapes it.
    ///
    /// The result borrows from the input unless the key contained escapes.
    ///
    /// # Panics
    ///
    /// If the cursor is not on a string literal.
    #[track_caller]
    pub fn read_object_key(&mut self) -> Cow<'a, str> {
        if self.op != OpCode::BeginLiteral {
            out_of_sync()
        }
        let item = self.read_item();
        unquote_str(item).unwrap_or_else(|| out_of_sync())
    }

    /// Moves to the next key, returning `true` when the object closed instead.
    ///
    /// Call after `{` or after [`object_after_read_value`](Self::object_after_read_value)
    /// returned `false`.
    ///
    /// # Panics
    ///
    /// If the next token is neither a key nor `}`.
    #[track_caller]
    pub fn object_before_read_key(&mut self) -> bool {
        self.scan_while(OpCode::SkipSpace);
        match self.op {
            OpCode::EndObject => true,
            OpCode::BeginLiteral if self.scan.phase() == Some(ParsePhase::ObjectKey) => false,
            _ => out_of_sync(),
        }
    }

    /// Consumes the `:` after a key and moves to the start of the value.
    ///
    /// # Panics
    ///
    /// If the cursor is not right after an object key.
    #[track_caller]
    pub fn object_before_read_value(&mut self) {
        if self.op == OpCode::SkipSpace {
            self.scan_while(OpCode::SkipSpace);
        }
        if self.op != OpCode::ObjectKey {
            out_of_sync()
        }
        self.scan_while(OpCode::SkipSpace);
    }

    /// Consumes the `,` or `}` after a value, returning `true` on `}`.
    ///
    /// # Panics
    ///
    /// If the next token is neither `,` nor `}`.
    #[track_caller]
    pub fn object_after_read_value(&mut self) -> bool {
        if self.op == OpCode::SkipSpace {
            self.scan_while(OpCode::SkipSpace);
        }
        match self.op {
            OpCode::EndObject => true,
            OpCode::ObjectValue => false,
            _ => out_of_sync(),
        }
    }

    /// Moves to the next element, returning `true` when the array closed
    /// instead.
    ///
    /// # Panics
    ///
    /// If the next token is neither a value nor `]`.
    #[track_caller]
    pub fn array_before_read_value(&mut self) -> bool {
        self.scan_while(OpCode::SkipSpace);
        match self.op {
            OpCode::EndArray => true,
            OpCode::BeginLiteral | OpCode::BeginObject | OpCode::BeginArray => false,
            _ => out_of_sync(),
        }
    }

    /// Consumes the `,` or `]` after an element, returning `true` on `]`.
    ///
    /// # Panics
    ///
    /// If the next token is neither `,` nor `]`.
    #[track_caller]
    pub fn array_after_read_value(&mut self) -> bool {
        if self.op == OpCode::SkipSpace {
            self.scan_while(OpCode::SkipSpace);
        }
        match self.op {
            OpCode::EndArray => true,
            OpCode::ArrayValue => false,
            _ => out_of_sync(),
        }
    }

    /// Steps through bytes until one yields an OpCode other than `op`.
    ///
    /// Always consumes at least one byte. Running out of input processes end
    /// of input instead.
    pub fn scan_while(&mut self, op: OpCode) {
        while let Some(&c) = self.data.get(self.off) {
            let next = self.scan.step(c);
            self.off += 1;
            if next != op {
                self.op = next;
                return;
            }
        }
        self.scan_eof();
    }

    /// Steps exactly one byte, or processes end of input.
    pub fn scan_next(&mut self) {
        match self.data.get(self.off) {
            Some(&c) => {
                self.op = self.scan.step(c);
                self.off += 1;
            }
            None => self.scan_eof(),
        }
    }

    fn scan_eof(&mut self) {
        self.op = self.scan.eof();
        self.off = self.data.len() + 1;
    }

    /// Moves past the value the cursor is positioned on without
    /// interpreting it.
    ///
    /// A literal is delegated to [`rescan_literal`](Self::rescan_literal).
    /// An object or array is stepped through until its closing bracket,
    /// which leaves `op_code()` at `EndObject`/`EndArray`; follow with
    /// [`scan_next`](Self::scan_next) to reach the next token.
    ///
    /// # Panics
    ///
    /// If the cursor is not at the start of a value.
    #[track_caller]
    pub fn skip(&mut self) {
        match self.op {
            OpCode::BeginLiteral => self.rescan_literal(),
            OpCode::BeginObject | OpCode::BeginArray => {
                let depth = self.scan.depth();
                loop {
                    let Some(&c) = self.data.get(self.off) else {
                        out_of_sync()
                    };
                    let op = self.scan.step(c);
                    self.off += 1;
                    if self.scan.depth() < depth {
                        self.op = op;
                        return;
                    }
                }
            }
            _ => out_of_sync(),
        }
    }

    /// Finds the end of the literal whose first byte was just scanned.
    ///
    /// Only the first byte's class is inspected: strings run to the first
    /// unescaped quote, numbers over `0-9 . e E + -`, keywords by their fixed
    /// length. The byte after the literal is then fed to the scanner so the
    /// cursor ends up in the same place a full scan would leave it.
    ///
    /// # Panics
    ///
    /// If nothing has been scanned yet.
    #[track_caller]
    pub fn rescan_literal(&mut self) {
        let data = self.data;
        let Some(&first) = self.off.checked_sub(1).and_then(|i| data.get(i)) else {
            out_of_sync()
        };
        let mut i = self.off;
        match first {
            b'"' => loop {
                let rest = data.get(i..).unwrap_or_default();
                match memchr::memchr2(b'"', b'\\', rest) {
                    Some(p) if rest[p] == b'\\' => i += p + 2,
                    Some(p) => {
                        i += p + 1;
                        break;
                    }
                    None => {
                        i = data.len();
                        break;
                    }
                }
            },
            b'-' | b'0'..=b'9' => {
                while matches!(
                    data.get(i),
                    Some(b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-')
                ) {
                    i += 1;
                }
            }
            b't' | b'f' | b'n' => i += ExpectedLiteral::keyword_len(first) - 1,
            _ => out_of_sync(),
        }
        self.op = self.scan.end_literal(i, data.get(i).copied());
        self.off = i + 1;
    }
}
