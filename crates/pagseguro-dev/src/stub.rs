//! # Stub Gateway
//!
//! What the developer endpoints answer, kept apart from the HTTP layer:
//! form checks with the gateway's error codes, code generation, and the XML
//! documents the real gateway would send.

use crate::state::{PendingCheckout, StubItem, StubTransaction};
use chrono::{Local, SecondsFormat};
use pagseguro_client::format_amount;
use pagseguro_core::{TransactionStatus, CURRENCY};
use quick_xml::escape::escape;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use uuid::Uuid;

/// Body of every credential failure
pub const UNAUTHORIZED_BODY: &str = "Unauthorized";

/// Error code for a lookup of an unknown notification
pub const UNKNOWN_NOTIFICATION_CODE: u32 = 13001;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Checkout form as posted by the client
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm(HashMap<String, String>);

impl CheckoutForm {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self(pairs.into_iter().collect())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Posted items, numbered from 1 without gaps
    pub fn items(&self) -> Vec<StubItem> {
        (1..)
            .map_while(|n| {
                let id = self.get(&format!("itemId{n}"))?;
                Some(StubItem {
                    id: id.to_string(),
                    description: self
                        .get(&format!("itemDescription{n}"))
                        .unwrap_or_default()
                        .to_string(),
                    amount: self
                        .get(&format!("itemAmount{n}"))
                        .unwrap_or_default()
                        .to_string(),
                    quantity: self
                        .get(&format!("itemQuantity{n}"))
                        .and_then(|q| q.trim().parse().ok())
                        .unwrap_or(1),
                })
            })
            .collect()
    }

    /// Gateway errors for this form, in the order the gateway reports them
    pub fn errors(&self) -> Vec<(u32, String)> {
        let mut errors = Vec::new();

        match self.get("currency") {
            None | Some("") => errors.push((11004, "Currency is required.".to_string())),
            Some(currency) if currency != CURRENCY => {
                errors.push((11005, format!("Currency invalid value: {currency}")))
            }
            Some(_) => {}
        }

        let items = self.items();
        if items.is_empty() {
            errors.push((11024, "Items invalid quantity.".to_string()));
        }
        for item in &items {
            if !is_amount(&item.amount, false) {
                errors.push((
                    11029,
                    format!(
                        "Item amount invalid pattern: {}. Must fit the pattern: \\d+.\\d{{2}}",
                        item.amount
                    ),
                ));
            }
        }

        if let Some(extra) = self.get("extraAmount") {
            if !is_amount(extra, true) {
                errors.push((
                    11036,
                    format!(
                        "Extra amount invalid pattern: {extra}. Must fit the pattern: -?\\d+.\\d{{2}}"
                    ),
                ));
            }
        }

        errors
    }

    /// Record of an accepted form under `code`
    pub fn into_pending(self, code: String) -> PendingCheckout {
        let items = self.items();
        let owned = |key: &str| self.get(key).map(str::to_string);

        PendingCheckout {
            code,
            reference: owned("reference").unwrap_or_default(),
            items,
            extra_amount: owned("extraAmount"),
            sender_email: owned("senderEmail"),
            sender_name: owned("senderName"),
            redirect_url: owned("redirectURL"),
            created_at: now(),
        }
    }
}

/// `\d+\.\d{2}`, with an optional leading `-` when `signed`
pub fn is_amount(value: &str, signed: bool) -> bool {
    let digits = match value.strip_prefix('-') {
        Some(rest) if signed => rest,
        Some(_) => return false,
        None => value,
    };

    match digits.split_once('.') {
        Some((whole, cents)) => {
            !whole.is_empty()
                && whole.bytes().all(|b| b.is_ascii_digit())
                && cents.len() == 2
                && cents.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// 32 uppercase hex characters, unique per call
pub fn checkout_code(reference: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(reference.as_bytes());
    hasher.update(Uuid::new_v4().as_bytes());
    hex::encode_upper(&hasher.finalize()[..16])
}

/// Uppercase UUID, the shape of gateway transaction codes
pub fn transaction_code() -> String {
    Uuid::new_v4().to_string().to_uppercase()
}

/// Current local time in the gateway's date format
pub fn now() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Millis, false)
}

/// Settle a pending checkout as paid
pub fn pay(checkout: PendingCheckout) -> StubTransaction {
    let items_total: Decimal = checkout
        .items
        .iter()
        .map(|item| {
            item.amount.parse::<Decimal>().unwrap_or_default() * Decimal::from(item.quantity)
        })
        .sum();
    let extra = checkout
        .extra_amount
        .as_deref()
        .and_then(|a| a.parse::<Decimal>().ok())
        .unwrap_or_default();
    let date = now();

    StubTransaction {
        code: transaction_code(),
        notification_code: transaction_code(),
        reference: checkout.reference,
        status: TransactionStatus::Paid,
        gross_amount: format_amount(items_total + extra),
        items: checkout.items,
        sender_email: checkout.sender_email,
        sender_name: checkout.sender_name,
        last_event_date: date.clone(),
        date,
    }
}

pub fn checkout_xml(code: &str, date: &str) -> String {
    format!(
        "{XML_DECLARATION}<checkout><code>{}</code><date>{}</date></checkout>",
        escape(code),
        escape(date)
    )
}

pub fn errors_xml(errors: &[(u32, String)]) -> String {
    let body: String = errors
        .iter()
        .map(|(code, message)| {
            format!(
                "<error><code>{code}</code><message>{}</message></error>",
                escape(message.as_str())
            )
        })
        .collect();
    format!("{XML_DECLARATION}<errors>{body}</errors>")
}

pub fn transaction_xml(transaction: &StubTransaction) -> String {
    let items: String = transaction
        .items
        .iter()
        .map(|item| {
            format!(
                "<item><id>{}</id><description>{}</description><quantity>{}</quantity><amount>{}</amount></item>",
                escape(item.id.as_str()),
                escape(item.description.as_str()),
                item.quantity,
                escape(item.amount.as_str())
            )
        })
        .collect();

    let mut sender = String::new();
    if let Some(ref name) = transaction.sender_name {
        sender.push_str(&format!("<name>{}</name>", escape(name.as_str())));
    }
    if let Some(ref email) = transaction.sender_email {
        sender.push_str(&format!("<email>{}</email>", escape(email.as_str())));
    }

    format!(
        "{XML_DECLARATION}<transaction>\
         <date>{date}</date>\
         <lastEventDate>{last}</lastEventDate>\
         <code>{code}</code>\
         <reference>{reference}</reference>\
         <type>1</type>\
         <status>{status}</status>\
         <grossAmount>{gross}</grossAmount>\
         <items><itemCount>{count}</itemCount>{items}</items>\
         <sender>{sender}</sender>\
         </transaction>",
        date = transaction.date,
        last = transaction.last_event_date,
        code = transaction.code,
        reference = escape(transaction.reference.as_str()),
        status = transaction.status.code(),
        gross = transaction.gross_amount,
        count = transaction.items.len(),
    )
}
