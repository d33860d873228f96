//! Decodes a tool-call payload with hand-written, schema-driven code and
//! writes a reply with the encoder.
//!
//! The payload shape is fixed:
//!
//! ```text
//! {
//!   "moderation": { "decision": "allow" | "block", "reason": string | null },
//!   "filename":   string,
//!   "lines":      [number, ...]
//! }
//! ```
//!
//! Unknown fields are skipped without being interpreted, and decoding stops
//! early once the moderation decision is `"block"`.

use jsoncodec::{Decoder, Encoder, Error, OpCode, is_null, parse_string, parse_u32};

#[derive(Debug, Default)]
struct ToolCall {
    blocked: Option<Option<String>>,
    filename: String,
    lines: Vec<u32>,
}

fn decode_moderation(d: &mut Decoder<'_>) -> Result<Option<Option<String>>, Error> {
    let mut blocked = false;
    let mut reason = None;
    loop {
        if d.object_before_read_key() {
            break;
        }
        let key = d.read_object_key();
        d.object_before_read_value();
        match key.as_ref() {
            "decision" => blocked = parse_string(d.read_item())? == "block",
            "reason" => {
                let token = d.read_item();
                if !is_null(token) {
                    reason = Some(parse_string(token)?.into_owned());
                }
            }
            _ => {
                d.read_item();
            }
        }
        if d.object_after_read_value() {
            break;
        }
    }
    d.scan_next();
    Ok(blocked.then_some(reason))
}

fn decode(payload: &[u8]) -> Result<ToolCall, Error> {
    let mut call = ToolCall::default();
    let mut d = Decoder::new(payload)?;
    d.scan_while(OpCode::SkipSpace);
    loop {
        if d.object_before_read_key() {
            break;
        }
        let key = d.read_object_key();
        d.object_before_read_value();
        match key.as_ref() {
            "moderation" if d.op_code() == OpCode::BeginObject => {
                call.blocked = decode_moderation(&mut d)?;
                if call.blocked.is_some() {
                    return Ok(call);
                }
            }
            "filename" => call.filename = parse_string(d.read_item())?.into_owned(),
            "lines" if d.op_code() == OpCode::BeginArray => {
                loop {
                    if d.array_before_read_value() {
                        break;
                    }
                    call.lines.push(parse_u32(d.read_item())?);
                    if d.array_after_read_value() {
                        break;
                    }
                }
                d.scan_next();
            }
            _ => {
                d.read_item();
            }
        }
        if d.object_after_read_value() {
            break;
        }
    }
    d.check()?;
    Ok(call)
}

fn reply(call: &ToolCall) -> Vec<u8> {
    let mut enc = Encoder::new(64);
    enc.append_object_begin();
    match &call.blocked {
        Some(reason) => {
            enc.append_object_key("status");
            enc.append_str("blocked");
            enc.append_object_key("reason");
            match reason {
                Some(reason) => enc.append_str(reason),
                None => enc.append_null(),
            }
        }
        None => {
            enc.append_object_key("status");
            enc.append_str("ok");
            enc.append_object_key("file");
            enc.append_str(&call.filename);
            enc.append_object_key("line_count");
            enc.append_u32(u32::try_from(call.lines.len()).unwrap_or(u32::MAX));
        }
    }
    enc.append_object_end();
    enc.finish()
}

fn main() -> Result<(), Error> {
    let payloads: [&[u8]; 2] = [
        br#"{"moderation": {"decision": "allow", "reason": null},
            "model": {"name": "x", "temperature": 0.2},
            "filename": "main.rs", "lines": [1, 2, 3]}"#,
        br#"{"moderation": {"decision": "block", "reason": "unsafe code"},
            "filename": "exploit.rs", "lines": [1]}"#,
    ];
    for payload in payloads {
        let call = decode(payload)?;
        println!("{}", String::from_utf8_lossy(&reply(&call)));
    }
    Ok(())
}
