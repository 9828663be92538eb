//! # Validation Errors
//!
//! Field → messages collection produced when the gateway rejects a checkout.

use crate::error_codes::OrderField;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Messages grouped by order attribute.
///
/// Messages for a field keep the order in which they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<OrderField, Vec<String>>);

/// Shared empty collection
pub(crate) static NO_ERRORS: ValidationErrors = ValidationErrors::new();

impl ValidationErrors {
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Collection holding a single message
    pub fn single(field: OrderField, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Append a message to a field
    pub fn add(&mut self, field: OrderField, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    /// Messages recorded for a field
    pub fn get(&self, field: OrderField) -> &[String] {
        self.0.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Messages that concern the order as a whole
    pub fn base(&self) -> &[String] {
        self.get(OrderField::Base)
    }

    pub fn contains(&self, field: OrderField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of messages across all fields
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn fields(&self) -> impl Iterator<Item = OrderField> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OrderField, &[String])> {
        self.0.iter().map(|(field, messages)| (*field, messages.as_slice()))
    }

    /// `field: message` lines, for logs
    pub fn full_messages(&self) -> Vec<String> {
        self.iter()
            .flat_map(|(field, messages)| {
                messages.iter().map(move |message| format!("{field}: {message}"))
            })
            .collect()
    }
}
