//! Typed conversions of raw tokens returned by
//! [`Decoder::read_item`](crate::Decoder::read_item).
//!
//! The decoder has already validated the token's syntax; these helpers only
//! answer whether it converts to the requested type. A mismatch, such as a
//! string token requested as a number, is a [`ValueError`] naming the token.

use std::{borrow::Cow, str::FromStr};

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{
    error::ValueError,
    unquote::{unquote_bytes, unquote_str},
};

/// Whether the token is the `null` literal.
///
/// Only the first byte is consulted; the token must come from a validated
/// document.
#[must_use]
pub fn is_null(token: &[u8]) -> bool {
    token.first() == Some(&b'n')
}

/// Parses a number token with [`FromStr`], rejecting anything that does not
/// look like a JSON number up front.
fn parse_number<T: FromStr>(token: &[u8], target: &'static str) -> Result<T, ValueError> {
    match token.first() {
        Some(b'-' | b'0'..=b'9') => {}
        _ => return Err(ValueError::new(token, target)),
    }
    std::str::from_utf8(token)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ValueError::new(token, target))
}

macro_rules! int_parsers {
    ($($(#[$meta:meta])* $name:ident => $ty:ty;)*) => {$(
        $(#[$meta])*
        ///
        /// # Errors
        ///
        /// Fails on non-number tokens, fractions, exponents and out-of-range
        /// values.
        pub fn $name(token: &[u8]) -> Result<$ty, ValueError> {
            parse_number(token, stringify!($ty))
        }
    )*};
}

int_parsers! {
    /// Parses a number token as `i32`.
    parse_i32 => i32;
    /// Parses a number token as `i64`, using the full 64-bit range.
    parse_i64 => i64;
    /// Parses a number token as `u32`.
    parse_u32 => u32;
    /// Parses a number token as `u64`.
    parse_u64 => u64;
}

/// Parses a number token as `f64`.
///
/// The quoted sentinels the [`Encoder`](crate::Encoder) writes for non-finite
/// values are not accepted back.
///
/// # Errors
///
/// Fails on non-number tokens and on magnitudes that overflow to infinity.
pub fn parse_f64(token: &[u8]) -> Result<f64, ValueError> {
    let v: f64 = parse_number(token, "f64")?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ValueError::new(token, "f64"))
    }
}

/// Parses a number token as `f32`.
///
/// # Errors
///
/// Fails on non-number tokens and on magnitudes that overflow to infinity.
pub fn parse_f32(token: &[u8]) -> Result<f32, ValueError> {
    let v: f32 = parse_number(token, "f32")?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ValueError::new(token, "f32"))
    }
}

/// Parses `true` or `false`.
///
/// # Errors
///
/// Fails on every other token, `null` included.
pub fn parse_bool(token: &[u8]) -> Result<bool, ValueError> {
    match token {
        b"true" => Ok(true),
        b"false" => Ok(false),
        _ => Err(ValueError::new(token, "bool")),
    }
}

/// Unquotes a string token, borrowing from it when possible.
///
/// # Errors
///
/// See [`unquote_str`].
pub fn parse_string(token: &[u8]) -> Result<Cow<'_, str>, ValueError> {
    unquote_str(token).ok_or_else(|| ValueError::new(token, "string"))
}

/// Unquotes a string token into raw bytes.
///
/// # Errors
///
/// See [`unquote_bytes`].
pub fn parse_bytes(token: &[u8]) -> Result<Cow<'_, [u8]>, ValueError> {
    unquote_bytes(token).ok_or_else(|| ValueError::new(token, "bytes"))
}

/// Decodes a string token holding standard, padded base64, the form
/// [`Encoder::append_bytes`](crate::Encoder::append_bytes) writes.
///
/// # Errors
///
/// Fails when the token is not a string or its content is not valid base64.
pub fn parse_base64(token: &[u8]) -> Result<Vec<u8>, ValueError> {
    let text = parse_bytes(token)?;
    STANDARD
        .decode(text.as_ref())
        .map_err(|_| ValueError::new(token, "base64 bytes"))
}
