//! # Gateway Error Codes
//!
//! Maps the gateway's numeric checkout error codes onto the order attribute
//! they refer to. Codes missing from [`ERROR_MAPPING`] land on
//! [`OrderField::Base`].
//!
//! Reference: <https://pagseguro.uol.com.br/v2/guia-de-integracao/codigos-de-erro.html>

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order attribute a validation message is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderField {
    Email,
    Currency,
    RedirectUrl,
    Reference,
    SenderEmail,
    Name,
    PhoneAreaCode,
    PhoneNumber,
    ShippingType,
    AddressPostalCode,
    AddressStreet,
    AddressNumber,
    AddressComplement,
    AddressDistrict,
    AddressCity,
    AddressState,
    /// Errors that concern the order as a whole
    Base,
}

impl OrderField {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderField::Email => "email",
            OrderField::Currency => "currency",
            OrderField::RedirectUrl => "redirect_url",
            OrderField::Reference => "reference",
            OrderField::SenderEmail => "sender_email",
            OrderField::Name => "name",
            OrderField::PhoneAreaCode => "phone_area_code",
            OrderField::PhoneNumber => "phone_number",
            OrderField::ShippingType => "shipping_type",
            OrderField::AddressPostalCode => "address_postal_code",
            OrderField::AddressStreet => "address_street",
            OrderField::AddressNumber => "address_number",
            OrderField::AddressComplement => "address_complement",
            OrderField::AddressDistrict => "address_district",
            OrderField::AddressCity => "address_city",
            OrderField::AddressState => "address_state",
            OrderField::Base => "base",
        }
    }
}

impl fmt::Display for OrderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First and last code of the checkout error range
pub const CHECKOUT_ERROR_CODES: std::ops::RangeInclusive<u32> = 11001..=11057;

/// Gateway error code → order attribute
pub const ERROR_MAPPING: &[(u32, OrderField)] = &[
    (11001, OrderField::Email),             // receiverEmail is required.
    (11002, OrderField::Email),             // receiverEmail invalid length
    (11003, OrderField::Email),             // receiverEmail invalid value.
    (11004, OrderField::Currency),          // Currency is required.
    (11005, OrderField::Currency),          // Currency invalid value
    (11006, OrderField::RedirectUrl),       // redirectURL invalid length
    (11007, OrderField::RedirectUrl),       // redirectURL invalid value
    (11008, OrderField::Reference),         // reference invalid length
    (11009, OrderField::SenderEmail),       // senderEmail invalid length
    (11010, OrderField::SenderEmail),       // senderEmail invalid value
    (11011, OrderField::Name),              // senderName invalid length
    (11012, OrderField::Name),              // senderName invalid value
    (11013, OrderField::PhoneAreaCode),     // senderAreaCode invalid value
    (11014, OrderField::PhoneNumber),       // senderPhone invalid value
    (11015, OrderField::ShippingType),      // shippingType is required.
    (11016, OrderField::ShippingType),      // shippingType invalid type
    (11017, OrderField::AddressPostalCode), // shippingPostalCode invalid value
    (11018, OrderField::AddressStreet),     // shippingAddressStreet invalid length
    (11019, OrderField::AddressNumber),     // shippingAddressNumber invalid length
    (11020, OrderField::AddressComplement), // shippingAddressComplement invalid length
    (11021, OrderField::AddressDistrict),   // shippingAddressDistrict invalid length
    (11022, OrderField::AddressCity),       // shippingAddressCity invalid length
    (11023, OrderField::AddressState),      // shippingAddressState must fit \w{2}
    (11024, OrderField::Base),              // Items invalid quantity.
    (11025, OrderField::Base),              // Item id is required.
    (11026, OrderField::Base),              // Item quantity is required.
    (11027, OrderField::Base),              // Item quantity out of range
    (11028, OrderField::Base),              // Item amount is required.
    (11029, OrderField::Base),              // Item amount invalid pattern
    (11030, OrderField::Base),              // Item amount out of range
    (11031, OrderField::Base),              // Item shippingCost invalid pattern
    (11032, OrderField::Base),              // Item shippingCost out of range
    (11033, OrderField::Base),              // Item description is required.
    (11034, OrderField::Base),              // Item description invalid length
    (11035, OrderField::Base),              // Item weight invalid value
    (11036, OrderField::Base),              // Extra amount invalid pattern
    (11037, OrderField::Base),              // Extra amount out of range
    (11038, OrderField::Base),              // Invalid receiver for checkout
    (11039, OrderField::Base),              // Malformed request XML
    (11040, OrderField::Base),              // maxAge invalid pattern
    (11041, OrderField::Base),              // maxAge out of range
    (11042, OrderField::Base),              // maxUses invalid pattern
    (11043, OrderField::Base),              // maxUses out of range.
    (11044, OrderField::Base),              // initialDate is required.
    (11045, OrderField::Base),              // initialDate must be lower than allowed limit.
    (11046, OrderField::Base),              // initialDate must not be older than 6 months.
    (11047, OrderField::Base),              // initialDate must be lower than or equal finalDate.
    (11048, OrderField::Base),              // search interval must be lower than or equal 30 days.
    (11049, OrderField::Base),              // finalDate must be lower than allowed limit.
    (11050, OrderField::Base),              // initialDate invalid format
    (11051, OrderField::Base),              // finalDate invalid format
    (11052, OrderField::Base),              // page invalid value.
    (11053, OrderField::Base),              // maxPageResults invalid value
    (11054, OrderField::Base),              // abandonURL invalid length
    (11055, OrderField::Base),              // abandonURL invalid value
    (11056, OrderField::Base),              // sender address required
    (11057, OrderField::Base),              // sender address not required with address data filled
];

/// Order attribute for a gateway error code
pub fn field_for_code(code: u32) -> OrderField {
    ERROR_MAPPING
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, field)| *field)
        .unwrap_or(OrderField::Base)
}

/// Same as [`field_for_code`], for the textual code found in responses.
/// Anything that is not a number maps to `Base`.
pub fn field_for_code_str(code: &str) -> OrderField {
    code.trim()
        .parse::<u32>()
        .map(field_for_code)
        .unwrap_or(OrderField::Base)
}
