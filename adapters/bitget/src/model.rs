use rust_decimal::Decimal;
use serde_json::Value;

use tradegate_core::prelude::*;
use tradegate_engine::prelude::*;

/// Parse a Bitget position payload into normalized records. The v2 API
/// wraps the rows in a `data` field; a bare array is accepted too.
pub fn parse_positions(value: &Value) -> Result<Vec<Position>> {
    let rows = value
        .get("data")
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

    let side = match row.get("holdSide").and_then(Value::as_str) {
        Some("long") => PositionSide::Long,
        Some("short") => PositionSide::Short,
        other => {
            return Err(TradegateError::InvalidData(format!(
                "unexpected holdSide: {:?}",
                other
            )))
        }
    };

    let contracts = decimal_field(row, "total")?.unwrap_or(Decimal::ZERO);

    let mut position = Position::new(symbol, side, contracts);
    position.entry_price = decimal_field(row, "averageOpenPrice")?;
    position.liquidation_price = decimal_field(row, "liquidationPrice")?;
    position.unrealized_pnl = decimal_field(row, "unrealizedPL")?;
    position.leverage = row
        .get("leverage")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok());
    position.margin_mode = match row.get("marginMode").and_then(Value::as_str) {
        Some("crossed") => Some(MarginMode::Cross),
        Some("fixed") => Some(MarginMode::Isolated),
        _ => None,
    };

    Ok(position)
}

/// Bitget sends numbers as strings; empty strings mean "not set".
fn decimal_field(row: &Value, field: &str) -> Result<Option<Decimal>> {
    match row.get(field).and_then(Value::as_str) {
        None => Ok(None),
        Some("") => Ok(None),
        Some(s) => s.parse::<Decimal>().map(Some).map_err(|e| {
            TradegateError::InvalidData(format!("bad decimal in {}: {}", field, e))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_row() -> Value {
        json!({
            "symbol": "BTCUSDT",
            "holdSide": "long",
            "total": "0.5",
            "averageOpenPrice": "50000.5",
            "liquidationPrice": "42000",
            "unrealizedPL": "12.5",
            "leverage": "10",
            "marginMode": "crossed"
        })
    }

    #[test]
    fn test_parse_position_row() {
        let positions = parse_positions(&json!([sample_row()])).unwrap();
        assert_eq!(positions.len(), 1);

        let position = &positions[0];
        assert_eq!(position.symbol, Symbol::new("BTC", "USDT"));
        assert_eq!(position.side, PositionSide::Long);
        assert_eq!(position.contracts, Decimal::new(5, 1));
        assert_eq!(position.entry_price, Some(Decimal::new(500005, 1)));
        assert_eq!(position.leverage, Some(10.0));
        assert_eq!(position.margin_mode, Some(MarginMode::Cross));
        assert!(position.is_open());
    }

    #[test]
    fn test_parse_wrapped_payload() {
        let payload = json!({"code": "00000", "data": [sample_row()]});
        let positions = parse_positions(&payload).unwrap();
        assert_eq!(positions.len(), 1);
    }

    #[test]
    fn test_empty_fields_are_none() {
        let mut row = sample_row();
        row["liquidationPrice"] = json!("");
        let positions = parse_positions(&json!([row])).unwrap();
        assert_eq!(positions[0].liquidation_price, None);
    }

    #[test]
    fn test_bad_side_rejected() {
        let mut row = sample_row();
        row["holdSide"] = json!("sideways");
        assert!(matches!(
            parse_positions(&json!([row])),
            Err(TradegateError::InvalidData(_))
        ));
    }

    #[test]
    fn test_non_array_payload_rejected() {
        assert!(parse_positions(&json!({"data": "nope"})).is_err());
    }
}
