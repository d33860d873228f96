use super::*;

fn ops(input: &[u8]) -> Vec<OpCode> {
    let mut scan = Scanner::new();
    let mut out: Vec<OpCode> = input.iter().map(|&c| scan.step(c)).collect();
    out.push(scan.eof());
    out
}

fn kind(input: &[u8]) -> SyntaxErrorKind {
    validate(input).unwrap_err().kind().clone()
}

fn invalid(byte: u8, context: &'static str) -> SyntaxErrorKind {
    SyntaxErrorKind::InvalidCharacter { byte, context }
}

#[test]
fn opcodes_for_small_object() {
    use OpCode::*;
    assert_eq!(
        ops(br#"{"a": [1, true]}"#),
        [
            BeginObject,
            BeginLiteral,
            Continue,
            Continue,
            ObjectKey,
            SkipSpace,
            BeginArray,
            BeginLiteral,
            ArrayValue,
            SkipSpace,
            BeginLiteral,
            Continue,
            Continue,
            Continue,
            EndArray,
            EndObject,
            End,
        ]
    );
}

#[test]
fn number_end_is_reported_at_eof() {
    let mut scan = Scanner::new();
    assert_eq!(scan.step(b'1'), OpCode::BeginLiteral);
    assert_eq!(scan.step(b'2'), OpCode::Continue);
    assert_eq!(scan.depth(), 0);
    assert_eq!(scan.eof(), OpCode::End);
    assert!(scan.error().is_none());
}

#[test]
fn accepts_valid_documents() {
    for doc in [
        &b"0"[..],
        b"-0",
        b"-0.5e-3",
        b"1E+2",
        b"\"\"",
        b"\"\\u00e9\\n\"",
        b"  null  ",
        b"[]",
        b"{}",
        b"[ ]",
        b"{ }",
        b"[[[]]]",
        br#"{"a":{"b":[false,null,"x"]}}"#,
        b"\t\r\n[1]\n",
    ] {
        assert!(validate(doc).is_ok(), "{}", String::from_utf8_lossy(doc));
    }
}

#[test]
fn leading_zero_followed_by_digit_is_rejected() {
    assert_eq!(kind(b"01"), invalid(b'1', "after top-level value"));
    assert_eq!(kind(b"-01"), invalid(b'1', "after top-level value"));
    assert_eq!(kind(b"[01]"), invalid(b'1', "after array element"));
}

#[test]
fn number_grammar() {
    assert_eq!(kind(b"-"), invalid(b' ', "in numeric literal"));
    assert_eq!(kind(b"1."), invalid(b' ', "after decimal point in numeric literal"));
    assert_eq!(kind(b"1.e5"), invalid(b'e', "after decimal point in numeric literal"));
    assert_eq!(kind(b"1e"), invalid(b' ', "in exponent of numeric literal"));
    assert_eq!(kind(b"1e+"), invalid(b' ', "in exponent of numeric literal"));
    assert_eq!(kind(b"+1"), invalid(b'+', "looking for beginning of value"));
    assert_eq!(kind(b".5"), invalid(b'.', "looking for beginning of value"));
}

#[test]
fn string_grammar() {
    assert_eq!(kind(b"\"a\x01\""), invalid(0x01, "in string literal"));
    assert_eq!(kind(b"\"\\x\""), invalid(b'x', "in string escape code"));
    assert_eq!(
        kind(b"\"\\u12g4\""),
        invalid(b'g', "in \\u hexadecimal character escape")
    );
    assert_eq!(kind(b"\"abc"), SyntaxErrorKind::UnexpectedEndOfInput);
}

#[test]
fn keyword_grammar() {
    assert_eq!(kind(b"tru"), invalid(b' ', "in literal true (expecting 'e')"));
    assert_eq!(kind(b"nil"), invalid(b'i', "in literal null (expecting 'u')"));
    assert_eq!(kind(b"fals3"), invalid(b'3', "in literal false (expecting 'e')"));
}

#[test]
fn structural_errors() {
    assert_eq!(kind(b"[1}"), invalid(b'}', "after array element"));
    assert_eq!(kind(br#"{"a" 1}"#), invalid(b'1', "after object key"));
    assert_eq!(kind(br#"{"a":1]"#), invalid(b']', "after object key:value pair"));
    assert_eq!(
        kind(b"{1:2}"),
        invalid(b'1', "looking for beginning of object key string")
    );
    assert_eq!(
        kind(br#"{"a":1,}"#),
        invalid(b'}', "looking for beginning of object key string")
    );
    assert_eq!(kind(b"[1,]"), invalid(b']', "looking for beginning of value"));
    assert_eq!(kind(b"[1] 2"), invalid(b'2', "after top-level value"));
}

#[test]
fn missing_value_is_positioned_at_offending_byte() {
    let err = validate(br#"{"a":}"#).unwrap_err();
    assert_eq!(err.offset(), 5);
    assert_eq!(
        err.to_string(),
        "invalid character '}' looking for beginning of value at offset 5"
    );
}

#[test]
fn truncated_input_reports_length() {
    for doc in [&b""[..], b"   ", b"[", b"[1,", br#"{"a""#, br#"{"a":"#] {
        let err = validate(doc).unwrap_err();
        assert_eq!(err.kind(), &SyntaxErrorKind::UnexpectedEndOfInput);
        assert_eq!(err.offset(), doc.len());
    }
}

#[test]
fn error_is_sticky() {
    let mut scan = Scanner::new();
    assert_eq!(scan.step(b'['), OpCode::BeginArray);
    assert_eq!(scan.step(b'}'), OpCode::Error);
    let first = scan.error().cloned();
    for &c in b"1, 2, 3]" {
        assert_eq!(scan.step(c), OpCode::Error);
    }
    assert_eq!(scan.eof(), OpCode::Error);
    assert_eq!(scan.error().cloned(), first);
}

#[test]
fn trailing_garbage_reports_end_then_error() {
    let mut scan = Scanner::new();
    assert_eq!(scan.step(b'1'), OpCode::BeginLiteral);
    assert_eq!(scan.step(b' '), OpCode::End);
    assert_eq!(scan.step(b'x'), OpCode::End);
    assert!(scan.error().is_some());
    assert_eq!(scan.step(b' '), OpCode::Error);
    assert_eq!(scan.eof(), OpCode::Error);
}

#[test]
fn depth_limit() {
    let max = 32;
    let nested = |depth: usize| {
        let mut doc = vec![b'['; depth];
        doc.extend(std::iter::repeat_n(b']', depth));
        doc
    };

    let mut scan = Scanner::with_max_depth(max);
    assert!(check_valid(&nested(max), &mut scan).is_ok());

    let err = check_valid(&nested(max + 1), &mut scan).unwrap_err();
    assert_eq!(
        err.kind(),
        &SyntaxErrorKind::NestingTooDeep {
            byte: b'[',
            max_depth: max
        }
    );
    assert_eq!(err.offset(), max);
}

#[test]
fn default_depth_limit() {
    let mut doc = vec![b'['; DEFAULT_MAX_NESTING_DEPTH];
    doc.extend(std::iter::repeat_n(b']', DEFAULT_MAX_NESTING_DEPTH));
    assert!(validate(&doc).is_ok());

    doc.insert(0, b'[');
    doc.push(b']');
    assert!(matches!(
        validate(&doc).unwrap_err().kind(),
        SyntaxErrorKind::NestingTooDeep { .. }
    ));
}

#[test]
fn reset_clears_everything() {
    let mut scan = Scanner::new();
    for &c in b"[{\"a\":" {
        scan.step(c);
    }
    assert_eq!(scan.depth(), 2);
    scan.step(b'}');
    assert!(scan.error().is_some());

    scan.reset();
    assert_eq!(scan.depth(), 0);
    assert_eq!(scan.bytes_consumed(), 0);
    assert!(scan.error().is_none());
    assert!(check_valid(b"true", &mut scan).is_ok());
}

#[test]
fn string_bytes_must_be_utf8() {
    assert!(validate("[\"caf\u{e9}\"]".as_bytes()).is_ok());
    let err = validate(b"[\"ab\xff\"]").unwrap_err();
    assert_eq!(err.kind(), &SyntaxErrorKind::InvalidUtf8);
    assert_eq!(err.offset(), 4);
    assert!(matches!(
        validate(b"\xff").unwrap_err().kind(),
        SyntaxErrorKind::InvalidCharacter { byte: 0xff, .. }
    ));
}
