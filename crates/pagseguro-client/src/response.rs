//! # Response Interpretation
//!
//! Turns a checkout response body into a [`Submission`]:
//!
//! ```text
//! body == "Unauthorized"        → base: ["Unauthorized"]
//! <checkout><code/><date/>      → checkout, no errors
//! <errors><error/>...</errors>  → one message per error, on its mapped field
//! anything else that parses     → base: [AMBIGUOUS_RESPONSE_MESSAGE]
//! ```

use crate::xml::{self, as_list};
use chrono::DateTime;
use pagseguro_core::{
    field_for_code_str, Checkout, OrderField, PaymentError, PaymentResult, Submission,
    ValidationErrors,
};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// Bare body the gateway sends for bad credentials
pub const UNAUTHORIZED_MARKER: &str = "Unauthorized";

/// Base message recorded when a response has neither a checkout nor errors
pub const AMBIGUOUS_RESPONSE_MESSAGE: &str =
    "Gateway response contained neither a checkout nor errors";

/// A body, classified before any field is read
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayReply {
    Unauthorized,
    Document(Value),
}

impl GatewayReply {
    /// Detect the unauthorized marker, otherwise decode the XML body
    pub fn parse(body: &str) -> PaymentResult<Self> {
        if is_unauthorized(body) {
            return Ok(GatewayReply::Unauthorized);
        }
        Ok(GatewayReply::Document(xml::decode(body)?))
    }
}

pub fn is_unauthorized(body: &str) -> bool {
    body.trim() == UNAUTHORIZED_MARKER
}

/// Interpret a checkout response body.
///
/// `messages` overrides the gateway's message text by error code. Only a body
/// that cannot be decoded, or a checkout without a usable code or date, is an
/// `Err`; everything else is a `Submission`.
pub fn interpret_checkout(body: &str, messages: &HashMap<u32, String>) -> PaymentResult<Submission> {
    let document = match GatewayReply::parse(body)? {
        GatewayReply::Unauthorized => {
            return Ok(Submission::rejected(
                ValidationErrors::single(OrderField::Base, UNAUTHORIZED_MARKER),
                body,
            ));
        }
        GatewayReply::Document(document) => document,
    };

    if let Some(checkout) = present(&document["checkout"]) {
        return Ok(Submission::created(parse_checkout(checkout)?, body));
    }

    if let Some(errors) = present(&document["errors"]) {
        let collected = collect_errors(errors, messages);
        if !collected.is_empty() {
            return Ok(Submission::rejected(collected, body));
        }
    }

    warn!("gateway response has neither checkout nor errors");
    Ok(Submission::rejected(
        ValidationErrors::single(OrderField::Base, AMBIGUOUS_RESPONSE_MESSAGE),
        body,
    ))
}

fn present(value: &Value) -> Option<&Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        other => Some(other),
    }
}

fn parse_checkout(checkout: &Value) -> PaymentResult<Checkout> {
    let code = checkout["code"]
        .as_str()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .ok_or_else(|| PaymentError::MalformedResponse("checkout has no code".to_string()))?;

    let raw_date = checkout["date"]
        .as_str()
        .ok_or_else(|| PaymentError::MalformedResponse("checkout has no date".to_string()))?;

    let date = DateTime::parse_from_rfc3339(raw_date.trim()).map_err(|e| {
        PaymentError::MalformedResponse(format!("invalid checkout date {raw_date:?}: {e}"))
    })?;

    Ok(Checkout {
        code: code.to_string(),
        date,
    })
}

/// Map `<errors>` onto order fields. `<error>` may be one element or many;
/// empty `<error/>` entries are skipped.
pub fn collect_errors(errors: &Value, messages: &HashMap<u32, String>) -> ValidationErrors {
    let mut collected = ValidationErrors::new();

    for error in as_list(&errors["error"]).iter().filter(|e| e.is_object()) {
        let code = error["code"].as_str().unwrap_or_default();
        let field = field_for_code_str(code);
        let localized = code
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(|code| messages.get(&code));

        let message = match localized {
            Some(message) => message.clone(),
            None => error["message"].as_str().unwrap_or_default().to_string(),
        };
        collected.add(field, message);
    }

    collected
}

/// `code: message` pairs of an `<errors>` document, for errors outside a
/// checkout (notification lookups).
pub fn describe_errors(errors: &Value) -> String {
    as_list(&errors["error"])
        .iter()
        .map(|error| {
            format!(
                "{}: {}",
                error["code"].as_str().unwrap_or("?"),
                error["message"].as_str().unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}
