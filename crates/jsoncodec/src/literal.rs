#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keyword {
    Null,
    True,
    False,
}

/// What happened after feeding one more byte into the keyword matcher?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Byte matched, but the keyword is not finished yet.
    NeedMore(ExpectedLiteral),
    /// Byte matched *and* it was the last byte of the keyword.
    Done,
    /// Byte did **not** match; carries the scanner error context.
    Reject(&'static str),
}

/// The bytes still owed by a keyword literal whose first byte (`n`, `t` or
/// `f`) has already been consumed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct ExpectedLiteral {
    rest: &'static [u8],
    keyword: Keyword,
}

impl ExpectedLiteral {
    /// Start matching after the *first* byte. Returns `None` for any byte that
    /// does not begin a keyword.
    pub(crate) fn new(first: u8) -> Option<Self> {
        let (rest, keyword): (&'static [u8], _) = match first {
            b'n' => (b"ull", Keyword::Null),
            b't' => (b"rue", Keyword::True),
            b'f' => (b"alse", Keyword::False),
            _ => return None,
        };
        Some(Self { rest, keyword })
    }

    pub(crate) fn step(self, c: u8) -> Step {
        match self.rest.split_first() {
            Some((&expected, rest)) if expected == c => {
                if rest.is_empty() {
                    Step::Done
                } else {
                    Step::NeedMore(Self {
                        rest,
                        keyword: self.keyword,
                    })
                }
            }
            _ => Step::Reject(self.context()),
        }
    }

    fn context(self) -> &'static str {
        match (self.keyword, self.rest) {
            (Keyword::True, b"rue") => "in literal true (expecting 'r')",
            (Keyword::True, b"ue") => "in literal true (expecting 'u')",
            (Keyword::True, _) => "in literal true (expecting 'e')",
            (Keyword::False, b"alse") => "in literal false (expecting 'a')",
            (Keyword::False, b"lse") => "in literal false (expecting 'l')",
            (Keyword::False, b"se") => "in literal false (expecting 's')",
            (Keyword::False, _) => "in literal false (expecting 'e')",
            (Keyword::Null, b"ull") => "in literal null (expecting 'u')",
            (Keyword::Null, _) => "in literal null (expecting 'l')",
        }
    }

    /// Length of the whole keyword, first byte included.
    pub(crate) fn keyword_len(first: u8) -> usize {
        match first {
            b'f' => 5,
            _ => 4,
        }
    }
}
