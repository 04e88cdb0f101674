use rust_decimal::Decimal;
use serde_json::Value;

use tradegate_core::prelude::*;
use tradegate_engine::prelude::*;

/// Parse a Bybit v5 position payload. Rows live under `result.list`; a
/// bare array is accepted too.
pub fn parse_positions(value: &Value) -> Result<Vec<Position>> {
    let rows = value
        .pointer("/result/list")
        .and_then(Value::as_array)
        .or_else(|| value.as_array())
        .ok_or_else(|| {
            TradegateError::InvalidData("position payload is not an array".to_string())
        })?;

    let mut positions = Vec::with_capacity(rows.len());
    for row in rows {
        positions.push(parse_position(row)?);
    }
    Ok(positions)
}

fn parse_position(row: &Value) -> Result<Position> {
    let symbol_str = row
        .get("symbol")
        .and_then(Value::as_str)
        .ok_or_else(|| TradegateError::InvalidData("position without symbol".to_string()))?;
    let symbol = parse_symbol_from_string(symbol_str)?;

    let side = match row.get("side").and_then(Value::as_str) {
        Some("Buy") => PositionSide::Long,
        Some("Sell") => PositionSide::Short,
        other => {
            return Err(TradegateError::InvalidData(format!(
                "unexpected side: {:?}",
                other
            )))
        }
    };

    let contracts = decimal_field(row, "size")?.unwrap_or(Decimal::ZERO);

    let mut position = Position::new(symbol, side, contracts);
    position.entry_price = decimal_field(row, "avgPrice")?;
    position.liquidation_price = decimal_field(row, "liqPrice")?;
    position.unrealized_pnl = decimal_field(row, "unrealisedPnl")?;
    position.leverage = row
        .get("leverage")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok());
    position.margin_mode = match row.get("tradeMode").and_then(Value::as_i64) {
        Some(0) => Some(MarginMode::Cross),
        Some(1) => Some(MarginMode::Isolated),
        _ => None,
    };

    Ok(position)
}

fn decimal_field(row: &Value, field: &str) -> Result<Option<Decimal>> {
    match row.get(field).and_then(Value::as_str) {
        None => Ok(None),
        Some("") => Ok(None),
        Some(s) => s.parse::<Decimal>().map(Some).map_err(|e| {
            TradegateError::InvalidData(format!("bad decimal in {}: {}", field, e))
        }),
    }
}
