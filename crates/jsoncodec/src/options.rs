/// Nesting limit applied when no other value is configured.
///
/// Permitted by RFC 7159 section 9; keeps adversarial input from growing the
/// parse-phase stack without bound.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 10_000;

/// Configuration for [`Decoder`](crate::Decoder) and
/// [`Scanner`](crate::Scanner).
///
/// # Examples
///
/// ```rust
/// use jsoncodec::{Decoder, DecoderOptions};
///
/// let options = DecoderOptions {
///     max_nesting_depth: 2,
///     ..Default::default()
/// };
/// assert!(Decoder::with_options(b"[[1]]", options).is_ok());
/// assert!(Decoder::with_options(b"[[[1]]]", options).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Maximum number of simultaneously open objects and arrays.
    ///
    /// Input nested deeper than this fails validation with
    /// [`SyntaxErrorKind::NestingTooDeep`](crate::SyntaxErrorKind::NestingTooDeep).
    ///
    /// # Default
    ///
    /// [`DEFAULT_MAX_NESTING_DEPTH`]
    pub max_nesting_depth: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// Configuration for [`Encoder`](crate::Encoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderOptions {
    /// Whether string output additionally escapes `<`, `>`, `&`, U+2028 and
    /// U+2029.
    ///
    /// Needed when the JSON may be embedded in HTML `<script>` blocks or
    /// evaluated as JavaScript. The result is still valid JSON either way.
    ///
    /// # Default
    ///
    /// `true`
    pub escape_html: bool,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self { escape_html: true }
    }
}
