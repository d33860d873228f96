use quickcheck::QuickCheck;

use super::{
    arbitrary::Node,
    utils::{decode_document, encode_document, render_spaced, structural_ops},
};

const SPACES: [&str; 6] = ["", " ", "\n", "\t", "\r\n", "  \t "];

/// Property: inserting insignificant whitespace between tokens changes
/// neither the structural OpCode sequence nor the decoded tree.
#[test]
fn whitespace_is_transparent_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(node: Node, picks: Vec<u8>) -> bool {
        let compact = encode_document(&node);
        let mut picks = picks.into_iter().cycle();
        let mut ws = || SPACES[usize::from(picks.next().unwrap_or(0)) % SPACES.len()];
        let spaced = render_spaced(&node, &mut ws);

        structural_ops(&compact) == structural_ops(spaced.as_bytes())
            && decode_document(spaced.as_bytes()) == node
    }

    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;

    QuickCheck::new()
        .tests(tests)
        .quickcheck(prop as fn(Node, Vec<u8>) -> bool);
}
