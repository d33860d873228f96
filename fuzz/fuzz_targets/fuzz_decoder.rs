#![no_main]
use std::cell::RefCell;

use arbitrary::Arbitrary;
use jsoncodec::{
    Decoder, Encoder, OpCode, is_null, parse_bool, parse_f64, parse_string, validate,
};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value};

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_os_rng());
}

static WS_TABLE: &[&[u8]] = &[b" ", b"\t", b"\n", b"\r"];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

/// Mostly well-formed documents with random whitespace, so the fuzzer spends
/// time past the first syntax error.
fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size == 0 || seed.is_multiple_of(10) {
        let mut len = append_whitespace(data, max_size);
        len += append_value(&mut data[len..], size.max(16), max_size - len);
        len += append_whitespace(&mut data[len..], max_size - len);
        len
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

fn append_whitespace(buf: &mut [u8], limit: usize) -> usize {
    with_rng(|rng| {
        if limit == 0 {
            return 0;
        }
        let n = rng.random_range(1..=limit.min(8));
        let mut written = 0;
        for _ in 0..n {
            let w = WS_TABLE[rng.random_range(0..WS_TABLE.len())];
            if written + w.len() > limit {
                break;
            }
            buf[written..written + w.len()].copy_from_slice(w);
            written += w.len();
        }
        written
    })
}

fn append_value(data: &mut [u8], size: usize, limit: usize) -> usize {
    let value = loop {
        let s = with_rng(|rng| rng.random_range(size / 2..size * 2));
        let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
        if let Ok(value) = ArbitraryValue::arbitrary(&mut arbitrary::Unstructured::new(&bytes)) {
            break value;
        }
    };

    let mut enc = Encoder::new(size);
    encode(&mut enc, &value.0);
    let serialized = enc.finish();

    let len = serialized.len().min(limit);
    data[..len].copy_from_slice(&serialized[..len]);
    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug)]
struct ArbitraryValue(Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        let value = match u.choose_index(21)? {
            0 => Value::Null,
            1 => Value::Bool(u.arbitrary()?),
            2 => {
                let n: f64 = u.arbitrary()?;
                Value::Number(
                    serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?,
                )
            }
            3..=10 => Value::String(u.arbitrary()?),
            11..=15 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::Array(elems.into_iter().map(|v| v.0).collect())
            }
            16..=20 => {
                let m: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
                Value::Object(Map::from_iter(m.into_iter().map(|(k, v)| (k, v.0))))
            }
            _ => Err(arbitrary::Error::IncorrectFormat)?,
        };
        Ok(ArbitraryValue(value))
    }
}

fn encode(enc: &mut Encoder, value: &Value) {
    match value {
        Value::Null => enc.append_null(),
        Value::Bool(b) => enc.append_bool(*b),
        Value::Number(n) => enc.append_f64(n.as_f64().unwrap_or_default()),
        Value::String(s) => enc.append_str(s),
        Value::Array(items) => {
            enc.append_array_begin();
            for item in items {
                encode(enc, item);
            }
            enc.append_array_end();
        }
        Value::Object(map) => {
            enc.append_object_begin();
            for (k, v) in map {
                enc.append_object_key(k);
                encode(enc, v);
            }
            enc.append_object_end();
        }
    }
}

/// Rebuilds the value under the cursor. Keys keep their last occurrence,
/// matching `serde_json`.
fn decode(d: &mut Decoder<'_>) -> Value {
    match d.op_code() {
        OpCode::BeginLiteral => {
            let token = d.read_item();
            match token[0] {
                b'"' => Value::String(parse_string(token).unwrap().into_owned()),
                b't' | b'f' => Value::Bool(parse_bool(token).unwrap()),
                _ if is_null(token) => Value::Null,
                _ => Value::from(parse_f64(token).unwrap()),
            }
        }
        OpCode::BeginArray => {
            let mut items = Vec::new();
            loop {
                if d.array_before_read_value() {
                    break;
                }
                items.push(decode(d));
                if d.array_after_read_value() {
                    break;
                }
            }
            d.scan_next();
            Value::Array(items)
        }
        OpCode::BeginObject => {
            let mut map = Map::new();
            loop {
                if d.object_before_read_key() {
                    break;
                }
                let key = d.read_object_key().into_owned();
                d.object_before_read_value();
                let value = decode(d);
                map.insert(key, value);
                if d.object_after_read_value() {
                    break;
                }
            }
            d.scan_next();
            Value::Object(map)
        }
        op => panic!("decoder not positioned on a value: {op:?}"),
    }
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| same_value(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, v)| y.get(k).is_some_and(|w| same_value(v, w)))
        }
        _ => a == b,
    }
}

fn check(data: &[u8]) {
    let ours = validate(data);
    let oracle = serde_json::from_slice::<serde::de::IgnoredAny>(data).is_ok()
        && std::str::from_utf8(data).is_ok();
    assert_eq!(ours.is_ok(), oracle, "validity disagrees: {ours:?}");
    if ours.is_err() {
        return;
    }

    // Surrogate and range checks make serde_json stricter on values.
    let Ok(expected) = serde_json::from_slice::<Value>(data) else {
        return;
    };
    let mut d = Decoder::new(data).unwrap();
    d.scan_while(OpCode::SkipSpace);
    let actual = decode(&mut d);
    assert_eq!(d.op_code(), OpCode::End);
    assert!(d.check().is_ok());
    assert!(same_value(&actual, &expected), "{actual:?} != {expected:?}");

    let mut enc = Encoder::new(data.len());
    encode(&mut enc, &actual);
    let reencoded = enc.finish();
    let reparsed: Value = serde_json::from_slice(&reencoded).unwrap();
    assert!(same_value(&reparsed, &actual));
}

fuzz_target!(|data: &[u8]| check(data));
