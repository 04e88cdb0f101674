use rust_decimal::Decimal;

use crate::error::{Result, TradegateError};
use crate::types::{OrderIntent, OrderType, Symbol};

pub fn validate_symbol(symbol: &Symbol) -> Result<()> {
    if symbol.base.is_empty() {
        return Err(TradegateError::InvalidData(
            "Base asset cannot be empty".to_string(),
        ));
    }

    if symbol.quote.is_empty() {
        return Err(TradegateError::InvalidData(
            "Quote asset cannot be empty".to_string(),
        ));
    }

    if symbol.base == symbol.quote {
        return Err(TradegateError::InvalidData(
            "Base and quote assets cannot be the same".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_price(price: Decimal) -> Result<()> {
    if price <= Decimal::ZERO {
        return Err(TradegateError::InvalidData(
            "Price must be positive".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_quantity(quantity: Decimal) -> Result<()> {
    if quantity <= Decimal::ZERO {
        return Err(TradegateError::InvalidData(
            "Quantity must be positive".to_string(),
        ));
    }

    Ok(())
}

/// Sanity checks an intent before any parameters are built from it.
pub fn validate_intent(intent: &OrderIntent) -> Result<()> {
    validate_symbol(&intent.symbol)?;
    validate_quantity(intent.quantity)?;

    if let Some(price) = intent.price {
        validate_price(price)?;
    }

    if let Some(stop_price) = intent.stop_price {
        validate_price(stop_price)?;
    }

    if intent.order_type == OrderType::Limit && intent.price.is_none() {
        return Err(TradegateError::InvalidOrder(
            "Limit orders require a price".to_string(),
        ));
    }

    if intent.order_type.is_stop() && intent.stop_price.is_none() {
        return Err(TradegateError::InvalidOrder(
            "Stop orders require a stop price".to_string(),
        ));
    }

    if intent.leverage < 1.0 {
        return Err(TradegateError::InvalidOrder(format!(
            "Leverage must be >= 1, got {}",
            intent.leverage
        )));
    }

    Ok(())
}
