//! # Billing Information
//!
//! Buyer and shipping data sent along with a checkout. Each field has a fixed
//! gateway parameter name, listed in [`BILLING_MAPPING`].

use crate::error::{PaymentError, PaymentResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A billing attribute the gateway accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingField {
    Name,
    Email,
    PhoneAreaCode,
    PhoneNumber,
    AddressCountry,
    AddressState,
    AddressCity,
    AddressStreet,
    AddressPostalCode,
    AddressDistrict,
    AddressNumber,
    AddressComplement,
}

/// Billing field → gateway parameter name
pub const BILLING_MAPPING: &[(BillingField, &str)] = &[
    (BillingField::Name, "senderName"),
    (BillingField::Email, "senderEmail"),
    (BillingField::PhoneAreaCode, "senderAreaCode"),
    (BillingField::PhoneNumber, "senderPhone"),
    (BillingField::AddressCountry, "shippingAddressCountry"),
    (BillingField::AddressState, "shippingAddressState"),
    (BillingField::AddressCity, "shippingAddressCity"),
    (BillingField::AddressStreet, "shippingAddressStreet"),
    (BillingField::AddressPostalCode, "shippingAddressPostalCode"),
    (BillingField::AddressDistrict, "shippingAddressDistrict"),
    (BillingField::AddressNumber, "shippingAddressNumber"),
    (BillingField::AddressComplement, "shippingAddressComplement"),
];

impl BillingField {
    /// Every known billing field, in table order
    pub fn all() -> impl Iterator<Item = BillingField> {
        BILLING_MAPPING.iter().map(|(field, _)| *field)
    }

    /// Name used by callers (snake_case)
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingField::Name => "name",
            BillingField::Email => "email",
            BillingField::PhoneAreaCode => "phone_area_code",
            BillingField::PhoneNumber => "phone_number",
            BillingField::AddressCountry => "address_country",
            BillingField::AddressState => "address_state",
            BillingField::AddressCity => "address_city",
            BillingField::AddressStreet => "address_street",
            BillingField::AddressPostalCode => "address_postal_code",
            BillingField::AddressDistrict => "address_district",
            BillingField::AddressNumber => "address_number",
            BillingField::AddressComplement => "address_complement",
        }
    }

    /// Parameter name the gateway expects for this field
    pub fn gateway_name(&self) -> &'static str {
        BILLING_MAPPING
            .iter()
            .find(|(field, _)| field == self)
            .map(|(_, name)| *name)
            .unwrap_or_default()
    }
}

impl FromStr for BillingField {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BillingField::all()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| PaymentError::UnknownBillingField {
                field: s.to_string(),
            })
    }
}

impl fmt::Display for BillingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Billing values attached to an order.
///
/// Keys are typed, so a name outside the table is rejected when the map is
/// built (by [`Billing::insert_named`] or by deserialization) instead of being
/// dropped when the request is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Billing(BTreeMap<BillingField, String>);

impl Billing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field
    pub fn set(&mut self, field: BillingField, value: impl fmt::Display) {
        self.0.insert(field, value.to_string());
    }

    /// Builder: set a field
    pub fn with(mut self, field: BillingField, value: impl fmt::Display) -> Self {
        self.set(field, value);
        self
    }

    /// Set a field by its caller-facing name
    pub fn insert_named(&mut self, name: &str, value: impl fmt::Display) -> PaymentResult<()> {
        let field = name.parse::<BillingField>()?;
        self.set(field, value);
        Ok(())
    }

    /// Build from `(name, value)` pairs, failing on the first unknown name
    pub fn from_pairs<I, K, V>(pairs: I) -> PaymentResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: fmt::Display,
    {
        let mut billing = Billing::new();
        for (name, value) in pairs {
            billing.insert_named(name.as_ref(), value)?;
        }
        Ok(billing)
    }

    pub fn get(&self, field: BillingField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Set fields in table order
    pub fn iter(&self) -> impl Iterator<Item = (BillingField, &str)> {
        self.0.iter().map(|(field, value)| (*field, value.as_str()))
    }
}
