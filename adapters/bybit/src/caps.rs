use std::collections::HashMap;

use tradegate_core::prelude::*;
use tradegate_engine::prelude::*;

/// Bybit capability tables.
pub fn capability_table(mode: TradingMode) -> CapabilityTable {
    let mut stoploss_order_types = HashMap::new();
    stoploss_order_types.insert("limit".to_string(), "Limit".to_string());
    stoploss_order_types.insert("market".to_string(), "Market".to_string());

    let mut stop_price_types = HashMap::new();
    stop_price_types.insert(PriceType::Last, "LastPrice".to_string());
    stop_price_types.insert(PriceType::Mark, "MarkPrice".to_string());
    stop_price_types.insert(PriceType::Index, "IndexPrice".to_string());

    CapabilityTable::builder()
        .base("ohlcv_has_history", true)
        .base(
            "order_time_in_force",
            CapabilityValue::StrList(vec![
                "GTC".to_string(),
                "FOK".to_string(),
                "IOC".to_string(),
                "PO".to_string(),
            ]),
        )
        .base("ws_enabled", true)
        .base("trades_has_history", true)
        .futures("mark_ohlcv_timeframe", "4h")
        .futures("funding_fee_timeframe", "8h")
        .futures("stoploss_on_exchange", true)
        .futures(
            "stoploss_order_types",
            CapabilityValue::StrMap(stoploss_order_types),
        )
        .futures("stop_price_prop", "triggerPrice")
        .futures("stop_price_type_field", "triggerBy")
        .futures(
            "stop_price_type_value_mapping",
            CapabilityValue::PriceTypeMap(stop_price_types),
        )
        // Setting an already-active margin mode errors on Bybit, so the
        // call is tolerated; leverage errors are real and surface.
        .futures("margin_mode_best_effort", true)
        .build(mode)
}
