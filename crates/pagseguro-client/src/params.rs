//! # Checkout Parameters
//!
//! Flattens an [`Order`] into the gateway's form parameters.

use crate::config::GatewayConfig;
use pagseguro_core::{Order, PaymentResult, CURRENCY};
use rust_decimal::{Decimal, RoundingStrategy};

/// Form parameters, in the order they are sent
pub type FormParams = Vec<(String, String)>;

/// Render an amount with exactly two decimal places, sign preserved
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// Build the checkout form for `order`.
///
/// Email and token fall back to the configured account. The order is
/// validated first, so nothing is built for an order the gateway would
/// reject on range checks.
pub fn build_checkout_params(order: &Order, config: &GatewayConfig) -> PaymentResult<FormParams> {
    order.validate()?;

    let email = order.email.as_deref().unwrap_or(&config.email);
    let token = order.token.as_deref().unwrap_or(&config.token);

    let mut params: FormParams = vec![
        ("email".to_string(), email.to_string()),
        ("token".to_string(), token.to_string()),
        ("currency".to_string(), CURRENCY.to_string()),
        ("reference".to_string(), order.reference.clone()),
    ];

    if let Some(shipping_type) = order.shipping_type {
        params.push(("shippingType".to_string(), shipping_type.code().to_string()));
    }
    if let Some(ref url) = order.redirect_url {
        params.push(("redirectURL".to_string(), url.clone()));
    }
    if let Some(amount) = order.extra_amount {
        params.push(("extraAmount".to_string(), format_amount(amount)));
    }
    if let Some(max_uses) = order.max_uses {
        params.push(("maxUses".to_string(), max_uses.to_string()));
    }
    if let Some(max_age) = order.max_age {
        params.push(("maxAge".to_string(), max_age.to_string()));
    }

    for (i, item) in order.items.iter().enumerate() {
        let n = i + 1;
        params.push((format!("itemId{n}"), item.id.clone()));
        params.push((format!("itemDescription{n}"), item.description.clone()));
        params.push((format!("itemAmount{n}"), format_amount(item.amount)));
        params.push((format!("itemQuantity{n}"), item.quantity.to_string()));
        if let Some(cost) = item.shipping_cost {
            params.push((format!("itemShippingCost{n}"), format_amount(cost)));
        }
        if let Some(weight) = item.weight {
            params.push((format!("itemWeight{n}"), weight.to_string()));
        }
    }

    for (field, value) in order.billing.iter() {
        params.push((field.gateway_name().to_string(), value.to_string()));
    }

    Ok(params)
}
