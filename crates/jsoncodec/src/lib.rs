//! A streaming JSON codec for schema-driven code.
//!
//! Decoding is two-phase: [`Decoder::new`] runs the [`Scanner`] over the whole
//! input once to reject malformed JSON, then hands out a pull-style cursor
//! that walks the tokens without building a document tree. The raw tokens it
//! returns are converted with the `parse_*` helpers.
//!
//! Encoding goes through [`Encoder`], which appends one typed value per call
//! and inserts separators itself.
//!
//! ```rust
//! use jsoncodec::{Decoder, Encoder, OpCode, parse_string};
//!
//! let mut enc = Encoder::new(32);
//! enc.append_array_begin();
//! enc.append_str("a\"b");
//! enc.append_str("c");
//! enc.append_array_end();
//! let json = enc.finish();
//! assert_eq!(json, br#"["a\"b","c"]"#);
//!
//! let mut d = Decoder::new(&json).unwrap();
//! d.scan_while(OpCode::SkipSpace);
//! let mut items = Vec::new();
//! loop {
//!     if d.array_before_read_value() {
//!         break;
//!     }
//!     items.push(parse_string(d.read_item()).unwrap());
//!     if d.array_after_read_value() {
//!         break;
//!     }
//! }
//! assert_eq!(items, ["a\"b", "c"]);
//! ```

mod decoder;
mod encoder;
mod error;
mod literal;
mod options;
mod parse;
mod scanner;
mod unquote;

#[cfg(test)]
mod tests;

pub use decoder::Decoder;
#[cfg(feature = "serde")]
pub use encoder::Structural;
pub use encoder::{Encoder, MarshalJson};
pub use error::{Error, MarshalError, SyntaxError, SyntaxErrorKind, ValueError};
pub use options::{DEFAULT_MAX_NESTING_DEPTH, DecoderOptions, EncoderOptions};
pub use parse::{
    is_null, parse_base64, parse_bool, parse_bytes, parse_f32, parse_f64, parse_i32, parse_i64,
    parse_string, parse_u32, parse_u64,
};
pub use scanner::{OpCode, ParsePhase, Scanner, validate};
pub use unquote::{unquote_bytes, unquote_str};
