//! Unescaping of quoted string tokens.
//!
//! Both entry points take the raw token *including* its surrounding quotes,
//! exactly as [`Decoder::read_item`](crate::Decoder::read_item) returns it.
//! When the body contains no escape sequence the result borrows from the
//! token; otherwise a fresh buffer is built.
//!
//! A `None` result means the token is not a well-formed string: missing
//! quotes, a raw control byte, a stray quote, an unknown escape, or malformed
//! UTF-8. Callers that want a typed error go through
//! [`parse_string`](crate::parse_string).

use std::borrow::Cow;

const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;

/// Unquotes a string token into text.
///
/// ```rust
/// use std::borrow::Cow;
/// use jsoncodec::unquote_str;
///
/// assert!(matches!(unquote_str(br#""plain""#), Some(Cow::Borrowed("plain"))));
/// assert_eq!(unquote_str(br#""a\tb""#).as_deref(), Some("a\tb"));
/// assert_eq!(unquote_str(b"not quoted"), None);
/// ```
#[must_use]
pub fn unquote_str(token: &[u8]) -> Option<Cow<'_, str>> {
    let body = strip_quotes(token)?;

    let plain = body
        .iter()
        .position(|&c| c == b'\\' || c == b'"' || c < 0x20)
        .unwrap_or(body.len());
    if plain == body.len() {
        return std::str::from_utf8(body).ok().map(Cow::Borrowed);
    }

    let mut out = String::with_capacity(body.len() + 8);
    out.push_str(std::str::from_utf8(&body[..plain]).ok()?);
    let mut r = plain;
    while r < body.len() {
        let c = body[r];
        match c {
            b'\\' => {
                let esc = *body.get(r + 1)?;
                r += 2;
                match esc {
                    b'"' | b'\\' | b'/' | b'\'' => out.push(char::from(esc)),
                    b'b' => out.push('\u{8}'),
                    b'f' => out.push('\u{c}'),
                    b'n' => out.push('\n'),
                    b'r' => out.push('\r'),
                    b't' => out.push('\t'),
                    b'u' => {
                        let unit = hex4(body.get(r..r + 4)?)?;
                        r += 4;
                        out.push(decode_escape(unit, body, &mut r));
                    }
                    _ => return None,
                }
            }
            b'"' | 0x00..=0x1F => return None,
            0x20..=0x7F => {
                out.push(char::from(c));
                r += 1;
            }
            _ => {
                let (ch, size) = bstr::decode_utf8(&body[r..]);
                out.push(ch?);
                r += size;
            }
        }
    }
    Some(Cow::Owned(out))
}

/// Unquotes a string token into bytes.
///
/// Same rules as [`unquote_str`]; the decoded text is returned as its UTF-8
/// bytes.
#[must_use]
pub fn unquote_bytes(token: &[u8]) -> Option<Cow<'_, [u8]>> {
    Some(match unquote_str(token)? {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    })
}

fn strip_quotes(token: &[u8]) -> Option<&[u8]> {
    match token {
        [b'"', body @ .., b'"'] => Some(body),
        _ => None,
    }
}

/// Value of exactly four ASCII hex digits.
fn hex4(digits: &[u8]) -> Option<u16> {
    digits.iter().try_fold(0u16, |acc, &d| {
        let v = char::from(d).to_digit(16)?;
        Some((acc << 4) | u16::try_from(v).ok()?)
    })
}

/// Turns the code unit of a `\uXXXX` escape into a char.
///
/// A high surrogate followed directly by a `\uXXXX` low surrogate consumes
/// both; any other surrogate becomes U+FFFD and the following escape, if any,
/// is decoded on its own.
fn decode_escape(unit: u16, body: &[u8], r: &mut usize) -> char {
    if let Some(ch) = char::from_u32(u32::from(unit)) {
        return ch;
    }
    if (0xD800..0xDC00).contains(&unit) {
        let low = body
            .get(*r..*r + 6)
            .filter(|next| next.starts_with(b"\\u"))
            .and_then(|next| hex4(&next[2..]));
        if let Some(Ok(ch)) = low.and_then(|low| char::decode_utf16([unit, low]).next()) {
            *r += 6;
            return ch;
        }
    }
    REPLACEMENT
}
