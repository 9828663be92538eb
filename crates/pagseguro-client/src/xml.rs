//! # Response Decoding
//!
//! The gateway answers in XML. Bodies are turned into a `serde_json::Value`
//! tree so the interpreter can walk them without caring about the wire
//! format:
//!
//! - element names become snake_case keys (`paymentMethod` → `payment_method`)
//! - text-only elements become strings, empty elements become `null`
//! - repeated sibling elements become an array, a lone one stays an object
//!
//! The last rule means a list of one and a single element look the same;
//! callers that expect lists use [`as_list`].

use pagseguro_core::PaymentError;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid XML: {0}")]
    Syntax(String),

    #[error("body is not an XML document")]
    NotXml,

    #[error("document ended inside <{0}>")]
    Unclosed(String),
}

impl From<DecodeError> for PaymentError {
    fn from(err: DecodeError) -> Self {
        PaymentError::MalformedResponse(err.to_string())
    }
}

struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Map::new(),
            text: String::new(),
        }
    }

    fn into_value(self) -> Value {
        if !self.children.is_empty() {
            Value::Object(self.children)
        } else if self.text.is_empty() {
            Value::Null
        } else {
            Value::String(self.text)
        }
    }
}

/// Decode an XML body into a normalized value tree.
///
/// The result is an object holding the root element under its (normalized)
/// name, e.g. `{"checkout": {"code": "...", "date": "..."}}`.
pub fn decode(body: &str) -> Result<Value, DecodeError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root = Map::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            DecodeError::Syntax(format!("{e} at byte {}", reader.buffer_position()))
        })?;

        match event {
            Event::Start(e) => {
                let name = underscore(&String::from_utf8_lossy(e.local_name().as_ref()));
                stack.push(Frame::new(name));
            }
            Event::Empty(e) => {
                let name = underscore(&String::from_utf8_lossy(e.local_name().as_ref()));
                let parent = stack.last_mut().map_or(&mut root, |f| &mut f.children);
                insert_child(parent, name, Value::Null);
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|err| DecodeError::Syntax(err.to_string()))?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(e) => {
                let raw = e.into_inner();
                push_text(&mut stack, &String::from_utf8_lossy(&raw))?;
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| DecodeError::Syntax("unbalanced closing tag".to_string()))?;
                let name = frame.name.clone();
                let value = frame.into_value();
                let parent = stack.last_mut().map_or(&mut root, |f| &mut f.children);
                insert_child(parent, name, value);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(DecodeError::Unclosed(open.name));
    }
    if root.is_empty() {
        return Err(DecodeError::NotXml);
    }

    Ok(Value::Object(root))
}

fn push_text(stack: &mut [Frame], text: &str) -> Result<(), DecodeError> {
    match stack.last_mut() {
        Some(frame) => {
            frame.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(DecodeError::NotXml),
    }
}

fn insert_child(map: &mut Map<String, Value>, key: String, value: Value) {
    match map.get_mut(&key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(key, value);
        }
    }
}

/// View a value that may be a single element or a list of them as a slice.
/// `null` and absent values give an empty slice.
pub fn as_list(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items.as_slice(),
        Value::Null => &[],
        other => std::slice::from_ref(other),
    }
}

/// `camelCase` / `PascalCase` / `kebab-case` → `snake_case`.
///
/// Runs of capitals are kept together, so `redirectURL` becomes
/// `redirect_url`.
pub fn underscore(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' {
            out.push('_');
            continue;
        }
        if !c.is_uppercase() {
            out.push(c);
            continue;
        }

        let prev = i.checked_sub(1).map(|j| chars[j]);
        let next = chars.get(i + 1).copied();
        let boundary = match prev {
            Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
            Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
            _ => false,
        };
        if boundary && !out.ends_with('_') {
            out.push('_');
        }
        out.extend(c.to_lowercase());
    }

    out
}
