use std::collections::HashMap;

use tradegate_core::prelude::*;
use tradegate_engine::prelude::*;

/// Bitget capability tables. The base table describes spot behavior, the
/// futures table overrides it for perpetual swap trading.
pub fn capability_table(mode: TradingMode) -> CapabilityTable {
    let mut stoploss_order_types = HashMap::new();
    stoploss_order_types.insert("limit".to_string(), "limit".to_string());
    stoploss_order_types.insert("market".to_string(), "market".to_string());

    let mut stop_price_types = HashMap::new();
    stop_price_types.insert(PriceType::Last, "latest_price".to_string());
    stop_price_types.insert(PriceType::Mark, "mark_price".to_string());
    stop_price_types.insert(PriceType::Index, "index_price".to_string());

    CapabilityTable::builder()
        .base("ohlcv_has_history", true)
        .base(
            "order_time_in_force",
            CapabilityValue::StrList(vec![
                "GTC".to_string(),
                "FOK".to_string(),
                "IOC".to_string(),
            ]),
        )
        .base("ws_enabled", true)
        .base("trades_has_history", false)
        .base("fetch_orders_limit_minutes", 7i64 * 1440) // 7 days
        .futures("mark_ohlcv_timeframe", "4h")
        .futures("funding_fee_timeframe", "8h")
        .futures("funding_fee_candle_limit", 200i64)
        .futures("stoploss_on_exchange", true)
        .futures(
            "stoploss_order_types",
            CapabilityValue::StrMap(stoploss_order_types),
        )
        .futures("stoploss_blocks_assets", false)
        .futures("stop_price_prop", "stopPx")
        .futures("stop_price_type_field", "triggerType")
        .futures(
            "stop_price_type_value_mapping",
            CapabilityValue::PriceTypeMap(stop_price_types),
        )
        // Bitget treats repeated margin-mode/leverage calls as no-ops, so
        // both are best-effort ahead of order placement.
        .futures("margin_mode_best_effort", true)
        .futures("set_leverage_best_effort", true)
        .build(mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_futures_features_invisible_in_spot() {
        let caps = capability_table(TradingMode::Spot);
        assert!(!caps.flag("stoploss_on_exchange"));
        assert!(!caps.has("stop_price_prop"));
        assert!(caps.flag("ws_enabled"));
    }

    #[test]
    fn test_futures_overrides_visible_in_futures() {
        let caps = capability_table(TradingMode::Futures);
        assert!(caps.get_bool("stoploss_on_exchange").unwrap());
        assert_eq!(caps.get_str("stop_price_prop").unwrap(), "stopPx");
        assert_eq!(caps.get_str("mark_ohlcv_timeframe").unwrap(), "4h");
        // Base entries still visible underneath the overrides.
        assert_eq!(caps.get_int("fetch_orders_limit_minutes").unwrap(), 10080);
    }

    #[test]
    fn test_stop_price_type_mapping_complete() {
        let caps = capability_table(TradingMode::Futures);
        let mapping = caps
            .get_price_type_map("stop_price_type_value_mapping")
            .unwrap();
        assert_eq!(mapping.get(&PriceType::Last).unwrap(), "latest_price");
        assert_eq!(mapping.get(&PriceType::Mark).unwrap(), "mark_price");
        assert_eq!(mapping.get(&PriceType::Index).unwrap(), "index_price");
    }
}
