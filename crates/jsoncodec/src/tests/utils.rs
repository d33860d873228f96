use std::fmt::Write as _;

use super::arbitrary::Node;
use crate::{Decoder, Encoder, OpCode, Scanner, parse_bool, parse_f64, parse_string};

/// Drives `d` over the value it is positioned on, the way schema-driven code
/// would, and rebuilds it as a [`Node`].
pub(crate) fn decode_node(d: &mut Decoder<'_>) -> Node {
    match d.op_code() {
        OpCode::BeginLiteral => literal_node(d.read_item()),
        OpCode::BeginArray => {
            let mut items = Vec::new();
            loop {
                if d.array_before_read_value() {
                    break;
                }
                items.push(decode_node(d));
                if d.array_after_read_value() {
                    break;
                }
            }
            d.scan_next();
            Node::Array(items)
        }
        OpCode::BeginObject => {
            let mut pairs = Vec::new();
            loop {
                if d.object_before_read_key() {
                    break;
                }
                let key = d.read_object_key().into_owned();
                d.object_before_read_value();
                pairs.push((key, decode_node(d)));
                if d.object_after_read_value() {
                    break;
                }
            }
            d.scan_next();
            Node::Object(pairs)
        }
        op => panic!("not at a value: {op:?}"),
    }
}

fn literal_node(token: &[u8]) -> Node {
    match token[0] {
        b'n' => Node::Null,
        b't' | b'f' => Node::Bool(parse_bool(token).unwrap()),
        b'"' => Node::Str(parse_string(token).unwrap().into_owned()),
        _ => Node::Number(parse_f64(token).unwrap()),
    }
}

/// Validates and decodes a whole document.
pub(crate) fn decode_document(data: &[u8]) -> Node {
    let mut d = Decoder::new(data).unwrap();
    d.scan_while(OpCode::SkipSpace);
    let node = decode_node(&mut d);
    assert_eq!(d.op_code(), OpCode::End);
    d.check().unwrap();
    node
}

pub(crate) fn encode_node(enc: &mut Encoder, node: &Node) {
    match node {
        Node::Null => enc.append_null(),
        Node::Bool(b) => enc.append_bool(*b),
        Node::Number(n) => enc.append_f64(*n),
        Node::Str(s) => enc.append_str(s),
        Node::Array(items) => {
            enc.append_array_begin();
            for item in items {
                encode_node(enc, item);
            }
            enc.append_array_end();
        }
        Node::Object(pairs) => {
            enc.append_object_begin();
            for (k, v) in pairs {
                enc.append_object_key(k);
                encode_node(enc, v);
            }
            enc.append_object_end();
        }
    }
}

pub(crate) fn encode_document(node: &Node) -> Vec<u8> {
    let mut enc = Encoder::new(64);
    encode_node(&mut enc, node);
    enc.finish()
}

/// Renders `node` with whitespace drawn from `ws` between every pair of
/// tokens.
pub(crate) fn render_spaced(node: &Node, ws: &mut impl FnMut() -> &'static str) -> String {
    fn go(out: &mut String, node: &Node, ws: &mut impl FnMut() -> &'static str) {
        out.push_str(ws());
        match node {
            Node::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    go(out, item, ws);
                }
                out.push_str(ws());
                out.push(']');
            }
            Node::Object(pairs) => {
                out.push('{');
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(ws());
                    out.push_str(&leaf(&Node::Str(k.clone())));
                    out.push_str(ws());
                    out.push(':');
                    go(out, v, ws);
                }
                out.push_str(ws());
                out.push('}');
            }
            leaf_node => out.push_str(&leaf(leaf_node)),
        }
        out.push_str(ws());
    }

    fn leaf(node: &Node) -> String {
        String::from_utf8(encode_document(node)).unwrap()
    }

    let mut out = String::new();
    go(&mut out, node, ws);
    out
}

/// The OpCodes a full scan produces, minus whitespace, literal bodies and
/// the repeated `End` reported for trailing whitespace.
pub(crate) fn structural_ops(data: &[u8]) -> Vec<OpCode> {
    let mut scan = Scanner::new();
    let mut ops: Vec<OpCode> = data
        .iter()
        .map(|&c| scan.step(c))
        .filter(|op| !matches!(op, OpCode::SkipSpace | OpCode::Continue | OpCode::End))
        .collect();
    ops.push(scan.eof());
    ops
}

/// Readable dump of OpCodes for snapshot tests.
pub(crate) fn dump_ops(data: &[u8]) -> String {
    let mut out = String::new();
    for op in structural_ops(data) {
        let _ = write!(out, "{op:?} ");
    }
    out.trim_end().to_string()
}
