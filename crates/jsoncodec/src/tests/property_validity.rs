use quickcheck::QuickCheck;

use super::{arbitrary::Node, utils::encode_document};
use crate::validate;

/// Replacement bytes for mutations.
const ALPHABET: &[u8] = b"{}[]:,\"\\ \tnulltrufas-.x/";

/// Property: the scanner and `serde_json` agree on whether a document is
/// valid, including after random byte mutations.
#[test]
fn validity_agrees_with_serde_json_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(node: Node, mutations: Vec<(usize, usize)>) -> bool {
        let mut json = encode_document(&node);
        for (at, pick) in mutations.into_iter().take(4) {
            if json.is_empty() {
                break;
            }
            let at = at % json.len();
            json[at] = ALPHABET[pick % ALPHABET.len()];
        }
        let ours = validate(&json).is_ok();
        // `IgnoredAny` skips surrogate pairing and number range checks, which
        // are value-level; UTF-8 is checked separately.
        let oracle = serde_json::from_slice::<serde::de::IgnoredAny>(&json).is_ok()
            && std::str::from_utf8(&json).is_ok();
        ours == oracle
    }

    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;

    QuickCheck::new()
        .tests(tests)
        .quickcheck(prop as fn(Node, Vec<(usize, usize)>) -> bool);
}

#[quickcheck_macros::quickcheck]
fn arbitrary_bytes_never_panic(data: Vec<u8>) -> bool {
    let _ = validate(&data);
    crate::Decoder::new(&data).map_or(true, |d| d.check().is_ok())
}
