//! Scanner: byte-at-a-time JSON validation state machine.
//!
//! Every call to [`Scanner::step`] consumes one byte and returns an
//! [`OpCode`] classifying it. The scanner keeps a stack of [`ParsePhase`]s,
//! one per open object or array, so it always knows which punctuation is
//! legal next.
//!
//! Invariants
//! - `OpCode::End` is reported *before* the byte that proves the top-level
//!   value finished (a number's end is only known at the next byte), so
//!   [`Scanner::eof`] flushes the machine with a synthetic space.
//! - Errors are sticky: once recorded, every step returns `OpCode::Error`.
//! - The phase stack never exceeds the configured maximum depth; the push that
//!   would exceed it records an error instead.
//!
//! Example
//! ```rust
//! use jsoncodec::{OpCode, Scanner};
//!
//! let mut scan = Scanner::new();
//! let ops: Vec<OpCode> = br#"[1]"#.iter().map(|&c| scan.step(c)).collect();
//! assert_eq!(
//!     ops,
//!     [OpCode::BeginArray, OpCode::BeginLiteral, OpCode::EndArray]
//! );
//! assert_eq!(scan.eof(), OpCode::End);
//! ```

use crate::{
    error::{SyntaxError, SyntaxErrorKind},
    literal::{self, ExpectedLiteral},
    options::DEFAULT_MAX_NESTING_DEPTH,
};

/// Classification of the byte just consumed by [`Scanner::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    /// Uninteresting byte, usually inside a literal.
    Continue,
    /// First byte of a string, number or keyword. The literal ends at the next
    /// result that is not `Continue`.
    BeginLiteral,
    /// `{`
    BeginObject,
    /// Just finished an object key (this byte is the `:`).
    ObjectKey,
    /// Just finished a non-last object value (this byte is the `,`).
    ObjectValue,
    /// `}`
    EndObject,
    /// `[`
    BeginArray,
    /// Just finished a non-last array element (this byte is the `,`).
    ArrayValue,
    /// `]`
    EndArray,
    /// Insignificant whitespace between tokens.
    SkipSpace,
    /// The top-level value ended *before* this byte.
    End,
    /// A syntax error was recorded; see [`Scanner::error`].
    Error,
}

/// What kind of composite value the scanner is inside of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePhase {
    /// Inside an object, before the colon.
    ObjectKey,
    /// Inside an object, after the colon.
    ObjectValue,
    /// Inside an array.
    ArrayValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeginValue,
    /// After `[`.
    BeginValueOrEmpty,
    /// After `{`.
    BeginStringOrEmpty,
    /// After `{"key": value,`.
    BeginString,
    EndValue,
    EndTop,
    InString,
    InStringEsc,
    /// After `\u`, with the number of hex digits still owed.
    InStringEscU(u8),
    /// After a leading `-`.
    Neg,
    /// After a leading `0`.
    Zero,
    /// After a non-zero integer digit run.
    Int,
    /// After the decimal point.
    Dot,
    DotDigits,
    /// After `e` or `E`.
    Exp,
    ExpSign,
    ExpDigits,
    Keyword(ExpectedLiteral),
    Error,
}

#[inline]
pub(crate) fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n')
}

/// A JSON scanning state machine.
///
/// Feed bytes one at a time with [`step`](Self::step) and finish with
/// [`eof`](Self::eof). The scanner never looks at more than the current byte.
#[derive(Debug, Clone)]
pub struct Scanner {
    state: State,
    /// Reached the end of the top-level value.
    end_top: bool,
    /// What we are in the middle of, outermost first.
    phases: Vec<ParsePhase>,
    err: Option<SyntaxError>,
    /// Bytes passed to `step` since the last reset.
    bytes: usize,
    max_depth: usize,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    /// A scanner with the default nesting limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_NESTING_DEPTH)
    }

    /// A scanner that rejects input nested deeper than `max_depth`.
    #[must_use]
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            state: State::BeginValue,
            end_top: false,
            phases: Vec::with_capacity(16),
            err: None,
            bytes: 0,
            max_depth,
        }
    }

    /// Returns the scanner to its initial state, keeping the stack allocation.
    pub fn reset(&mut self) {
        self.state = State::BeginValue;
        self.phases.clear();
        self.err = None;
        self.end_top = false;
        self.bytes = 0;
    }

    /// The recorded syntax error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&SyntaxError> {
        self.err.as_ref()
    }

    /// The innermost open composite value, or `None` at top level.
    #[must_use]
    pub fn phase(&self) -> Option<ParsePhase> {
        self.phases.last().copied()
    }

    /// Number of currently open objects and arrays.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.phases.len()
    }

    /// Bytes passed to [`step`](Self::step) since construction or reset.
    #[must_use]
    pub fn bytes_consumed(&self) -> usize {
        self.bytes
    }

    /// Consumes one byte and classifies it.
    pub fn step(&mut self, c: u8) -> OpCode {
        let op = self.transition(c);
        self.bytes += 1;
        op
    }

    /// Tells the scanner that the input has ended.
    ///
    /// Returns `OpCode::End` if exactly one complete top-level value was seen,
    /// `OpCode::Error` otherwise.
    pub fn eof(&mut self) -> OpCode {
        if self.err.is_some() {
            return OpCode::Error;
        }
        if self.end_top {
            return OpCode::End;
        }
        self.transition(b' ');
        if self.end_top {
            return OpCode::End;
        }
        if self.err.is_none() {
            self.state = State::Error;
            self.err = Some(SyntaxError::new(
                SyntaxErrorKind::UnexpectedEndOfInput,
                self.bytes,
            ));
        }
        OpCode::Error
    }

    #[inline]
    fn transition(&mut self, c: u8) -> OpCode {
        match self.state {
            State::BeginValue => self.begin_value(c),
            State::BeginValueOrEmpty => {
                if is_space(c) {
                    OpCode::SkipSpace
                } else if c == b']' {
                    self.end_value(c)
                } else {
                    self.begin_value(c)
                }
            }
            State::BeginStringOrEmpty => {
                if is_space(c) {
                    return OpCode::SkipSpace;
                }
                if c == b'}' {
                    if let Some(top) = self.phases.last_mut() {
                        *top = ParsePhase::ObjectValue;
                    }
                    return self.end_value(c);
                }
                self.begin_string(c)
            }
            State::BeginString => self.begin_string(c),
            State::EndValue => self.end_value(c),
            State::EndTop => self.end_top_step(c),
            State::InString => match c {
                b'"' => {
                    self.state = State::EndValue;
                    OpCode::Continue
                }
                b'\\' => {
                    self.state = State::InStringEsc;
                    OpCode::Continue
                }
                0x00..=0x1F => self.invalid(c, "in string literal"),
                _ => OpCode::Continue,
            },
            State::InStringEsc => match c {
                b'b' | b'f' | b'n' | b'r' | b't' | b'\\' | b'/' | b'"' => {
                    self.state = State::InString;
                    OpCode::Continue
                }
                b'u' => {
                    self.state = State::InStringEscU(4);
                    OpCode::Continue
                }
                _ => self.invalid(c, "in string escape code"),
            },
            State::InStringEscU(owed) => {
                if !c.is_ascii_hexdigit() {
                    return self.invalid(c, "in \\u hexadecimal character escape");
                }
                self.state = if owed > 1 {
                    State::InStringEscU(owed - 1)
                } else {
                    State::InString
                };
                OpCode::Continue
            }
            State::Neg => match c {
                b'0' => {
                    self.state = State::Zero;
                    OpCode::Continue
                }
                b'1'..=b'9' => {
                    self.state = State::Int;
                    OpCode::Continue
                }
                _ => self.invalid(c, "in numeric literal"),
            },
            State::Int => {
                if c.is_ascii_digit() {
                    OpCode::Continue
                } else {
                    self.zero(c)
                }
            }
            State::Zero => self.zero(c),
            State::Dot => {
                if c.is_ascii_digit() {
                    self.state = State::DotDigits;
                    OpCode::Continue
                } else {
                    self.invalid(c, "after decimal point in numeric literal")
                }
            }
            State::DotDigits => match c {
                b'0'..=b'9' => OpCode::Continue,
                b'e' | b'E' => {
                    self.state = State::Exp;
                    OpCode::Continue
                }
                _ => self.end_value(c),
            },
            State::Exp => {
                if c == b'+' || c == b'-' {
                    self.state = State::ExpSign;
                    OpCode::Continue
                } else {
                    self.exp_sign(c)
                }
            }
            State::ExpSign => self.exp_sign(c),
            State::ExpDigits => {
                if c.is_ascii_digit() {
                    OpCode::Continue
                } else {
                    self.end_value(c)
                }
            }
            State::Keyword(expected) => match expected.step(c) {
                literal::Step::NeedMore(next) => {
                    self.state = State::Keyword(next);
                    OpCode::Continue
                }
                literal::Step::Done => {
                    self.state = State::EndValue;
                    OpCode::Continue
                }
                literal::Step::Reject(context) => self.invalid(c, context),
            },
            State::Error => OpCode::Error,
        }
    }

    fn begin_value(&mut self, c: u8) -> OpCode {
        if is_space(c) {
            return OpCode::SkipSpace;
        }
        match c {
            b'{' => {
                self.state = State::BeginStringOrEmpty;
                self.push_phase(c, ParsePhase::ObjectKey, OpCode::BeginObject)
            }
            b'[' => {
                self.state = State::BeginValueOrEmpty;
                self.push_phase(c, ParsePhase::ArrayValue, OpCode::BeginArray)
            }
            b'"' => {
                self.state = State::InString;
                OpCode::BeginLiteral
            }
            b'-' => {
                self.state = State::Neg;
                OpCode::BeginLiteral
            }
            b'0' => {
                self.state = State::Zero;
                OpCode::BeginLiteral
            }
            b'1'..=b'9' => {
                self.state = State::Int;
                OpCode::BeginLiteral
            }
            _ => match ExpectedLiteral::new(c) {
                Some(expected) => {
                    self.state = State::Keyword(expected);
                    OpCode::BeginLiteral
                }
                None => self.invalid(c, "looking for beginning of value"),
            },
        }
    }

    fn begin_string(&mut self, c: u8) -> OpCode {
        if is_space(c) {
            return OpCode::SkipSpace;
        }
        if c == b'"' {
            self.state = State::InString;
            return OpCode::BeginLiteral;
        }
        self.invalid(c, "looking for beginning of object key string")
    }

    /// After a complete value such as `{}`, `true` or `["x"`.
    ///
    /// Also reached from inside number states once a byte that cannot extend
    /// the number shows up; that byte is then interpreted here.
    fn end_value(&mut self, c: u8) -> OpCode {
        let Some(&phase) = self.phases.last() else {
            // Completed the top-level value before the current byte.
            self.state = State::EndTop;
            self.end_top = true;
            return self.end_top_step(c);
        };
        if is_space(c) {
            self.state = State::EndValue;
            return OpCode::SkipSpace;
        }
        match phase {
            ParsePhase::ObjectKey => {
                if c == b':' {
                    self.set_top(ParsePhase::ObjectValue);
                    self.state = State::BeginValue;
                    return OpCode::ObjectKey;
                }
                self.invalid(c, "after object key")
            }
            ParsePhase::ObjectValue => match c {
                b',' => {
                    self.set_top(ParsePhase::ObjectKey);
                    self.state = State::BeginString;
                    OpCode::ObjectValue
                }
                b'}' => {
                    self.pop_phase();
                    OpCode::EndObject
                }
                _ => self.invalid(c, "after object key:value pair"),
            },
            ParsePhase::ArrayValue => match c {
                b',' => {
                    self.state = State::BeginValue;
                    OpCode::ArrayValue
                }
                b']' => {
                    self.pop_phase();
                    OpCode::EndArray
                }
                _ => self.invalid(c, "after array element"),
            },
        }
    }

    /// Resumes after a literal whose bytes were skipped without stepping.
    ///
    /// `offset` is the index of the byte following the literal and `next`
    /// that byte, or `None` when the literal ran to the end of the input.
    /// Leaves the scanner where stepping every byte would have.
    pub(crate) fn end_literal(&mut self, offset: usize, next: Option<u8>) -> OpCode {
        self.bytes = offset;
        let Some(c) = next else {
            self.state = State::EndTop;
            self.end_top = true;
            return OpCode::End;
        };
        let op = self.end_value(c);
        self.bytes += 1;
        op
    }

    /// Only whitespace may follow the top-level value.
    fn end_top_step(&mut self, c: u8) -> OpCode {
        if !is_space(c) {
            // Recorded now, reported by the next step or `eof`.
            self.invalid(c, "after top-level value");
        }
        OpCode::End
    }

    /// After `0` (or after a non-zero integer run that hit a non-digit).
    fn zero(&mut self, c: u8) -> OpCode {
        match c {
            b'.' => {
                self.state = State::Dot;
                OpCode::Continue
            }
            b'e' | b'E' => {
                self.state = State::Exp;
                OpCode::Continue
            }
            _ => self.end_value(c),
        }
    }

    fn exp_sign(&mut self, c: u8) -> OpCode {
        if c.is_ascii_digit() {
            self.state = State::ExpDigits;
            OpCode::Continue
        } else {
            self.invalid(c, "in exponent of numeric literal")
        }
    }

    fn set_top(&mut self, phase: ParsePhase) {
        if let Some(top) = self.phases.last_mut() {
            *top = phase;
        }
    }

    fn push_phase(&mut self, c: u8, phase: ParsePhase, success: OpCode) -> OpCode {
        self.phases.push(phase);
        if self.phases.len() <= self.max_depth {
            return success;
        }
        tracing::warn!(
            max_depth = self.max_depth,
            offset = self.bytes,
            "JSON nesting depth limit exceeded"
        );
        self.fail(SyntaxErrorKind::NestingTooDeep {
            byte: c,
            max_depth: self.max_depth,
        })
    }

    fn pop_phase(&mut self) {
        self.phases.pop();
        if self.phases.is_empty() {
            self.state = State::EndTop;
            self.end_top = true;
        } else {
            self.state = State::EndValue;
        }
    }

    fn invalid(&mut self, c: u8, context: &'static str) -> OpCode {
        self.fail(SyntaxErrorKind::InvalidCharacter { byte: c, context })
    }

    fn fail(&mut self, kind: SyntaxErrorKind) -> OpCode {
        self.state = State::Error;
        self.err = Some(SyntaxError::new(kind, self.bytes));
        OpCode::Error
    }

    #[cold]
    fn sticky_error(&self) -> SyntaxError {
        self.err.clone().unwrap_or(SyntaxError::new(
            SyntaxErrorKind::UnexpectedEndOfInput,
            self.bytes,
        ))
    }
}

/// Runs `scan` over all of `data` and reports the first syntax error.
///
/// The scanner does not look inside string bytes beyond escapes, so the
/// whole document is checked for UTF-8 once the grammar passes.
pub(crate) fn check_valid(data: &[u8], scan: &mut Scanner) -> Result<(), SyntaxError> {
    scan.reset();
    for &c in data {
        if scan.step(c) == OpCode::Error {
            return Err(scan.sticky_error());
        }
    }
    if scan.eof() == OpCode::Error {
        return Err(scan.sticky_error());
    }
    std::str::from_utf8(data)
        .map(drop)
        .map_err(|e| SyntaxError::new(SyntaxErrorKind::InvalidUtf8, e.valid_up_to()))
}

/// Reports whether `data` holds exactly one well-formed JSON value.
///
/// # Errors
///
/// Returns the first [`SyntaxError`] found.
///
/// ```rust
/// assert!(jsoncodec::validate(br#"{"a":[1,2]}"#).is_ok());
/// assert!(jsoncodec::validate(b"[1,]").is_err());
/// ```
pub fn validate(data: &[u8]) -> Result<(), SyntaxError> {
    check_valid(data, &mut Scanner::new())
}

#[cfg(test)]
mod tests;
