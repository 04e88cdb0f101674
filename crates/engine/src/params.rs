use std::sync::Arc;

use tradegate_core::config::TradingConfig;
use tradegate_core::prelude::*;
use tradegate_core::utils::validate_intent;

use crate::capability::CapabilityTable;

/// Everything a shaper may consult while emitting exchange fields.
pub struct ShapeContext<'a> {
    pub trading_mode: TradingMode,
    pub margin_mode: Option<MarginMode>,
    pub position_mode: PositionMode,
    pub caps: &'a CapabilityTable,
}

/// Per-exchange strategy for the divergent slices of parameter
/// construction. Selected by exchange identifier at adapter construction;
/// the shared builder never branches on exchange identity itself.
///
/// The defaults cover the common shape: market orders carry no price
/// unless the capability table says otherwise, and no position index is
/// emitted.
pub trait ParamShaper: Send + Sync {
    fn order_needs_price(
        &self,
        _side: OrderSide,
        order_type: OrderType,
        caps: &CapabilityTable,
    ) -> bool {
        order_type != OrderType::Market || caps.flag("market_orders_require_price")
    }

    /// Position-direction index for derivatives orders. One-way accounts
    /// use a fixed index, hedge accounts a side-dependent one; exchanges
    /// without the concept return `None`.
    fn position_index(&self, _position_mode: PositionMode, _side: OrderSide) -> Option<i64> {
        None
    }

    /// Exchange quirks applied after the shared fields are in place.
    fn shape_order(
        &self,
        _params: &mut RequestParams,
        _intent: &OrderIntent,
        _ctx: &ShapeContext<'_>,
    ) -> Result<()> {
        Ok(())
    }

    fn shape_stop(
        &self,
        _params: &mut RequestParams,
        _stop: &StopIntent,
        _ctx: &ShapeContext<'_>,
    ) -> Result<()> {
        Ok(())
    }
}

/// Shaper for exchanges without quirks; also the fallback in tests.
#[derive(Debug, Default)]
pub struct DefaultShaper;

impl ParamShaper for DefaultShaper {}

/// Turns an [`OrderIntent`] into the exchange-specific request map.
/// Shared logic lives here; divergence goes through the [`ParamShaper`].
pub struct ParamBuilder {
    shaper: Arc<dyn ParamShaper>,
    caps: Arc<CapabilityTable>,
    trading_mode: TradingMode,
    margin_mode: Option<MarginMode>,
    position_mode: PositionMode,
    stop_price_type: PriceType,
}

impl ParamBuilder {
    pub fn new(
        shaper: Arc<dyn ParamShaper>,
        caps: Arc<CapabilityTable>,
        trading: &TradingConfig,
    ) -> Self {
        Self {
            shaper,
            caps,
            trading_mode: trading.trading_mode,
            margin_mode: trading.margin_mode,
            position_mode: trading.position_mode,
            stop_price_type: trading.stop_price_type,
        }
    }

    fn context(&self) -> ShapeContext<'_> {
        ShapeContext {
            trading_mode: self.trading_mode,
            margin_mode: self.margin_mode,
            position_mode: self.position_mode,
            caps: &self.caps,
        }
    }

    pub fn build_order(&self, intent: &OrderIntent) -> Result<RequestParams> {
        validate_intent(intent)?;
        self.validate_time_in_force(intent.time_in_force)?;

        let mut params = RequestParams::new();
        params.insert_str("side", intent.side.to_string());
        params.insert_str("type", intent.order_type.to_string());
        params.insert_decimal("quantity", intent.quantity);

        if intent.order_type != OrderType::Market {
            params.insert_str("timeInForce", intent.time_in_force.as_str());
        }

        if self
            .shaper
            .order_needs_price(intent.side, intent.order_type, &self.caps)
        {
            let price = intent.price.ok_or_else(|| {
                TradegateError::InvalidOrder(format!(
                    "{} order on {} requires a price",
                    intent.order_type, intent.symbol
                ))
            })?;
            params.insert_decimal("price", price);
        }

        if self.trading_mode.is_derivatives() {
            if intent.reduce_only {
                params.insert_bool("reduceOnly", true);
            }
            if self.trading_mode == TradingMode::Futures {
                params.insert_f64("leverage", intent.leverage);
            }
        }

        self.shaper.shape_order(&mut params, intent, &self.context())?;

        Ok(params)
    }

    pub fn build_stop(&self, stop: &StopIntent) -> Result<RequestParams> {
        if !self.caps.flag("stoploss_on_exchange") {
            return Err(TradegateError::UnsupportedFeature(
                "stoploss_on_exchange".to_string(),
            ));
        }

        let mut params = RequestParams::new();
        params.insert_str("side", stop.side.to_string());

        let logical_type = match stop.order_type {
            OrderType::StopLimit => "limit",
            _ => "market",
        };
        let order_types = self.caps.get_str_map("stoploss_order_types")?;
        let wire_type = order_types.get(logical_type).ok_or_else(|| {
            TradegateError::UnsupportedFeature(format!(
                "stoploss_order_types has no mapping for {}",
                logical_type
            ))
        })?;
        params.insert_str("type", wire_type.clone());

        let stop_price_prop = self.caps.get_str("stop_price_prop")?;
        params.insert_decimal(stop_price_prop.to_string(), stop.stop_price);

        if self.caps.has("stop_price_type_field") {
            let field = self.caps.get_str("stop_price_type_field")?.to_string();
            let mapping = self.caps.get_price_type_map("stop_price_type_value_mapping")?;
            let value = mapping.get(&stop.price_type).ok_or_else(|| {
                TradegateError::UnsupportedFeature(format!(
                    "no stop price type mapping for {}",
                    stop.price_type
                ))
            })?;
            params.insert_str(field, value.clone());
        }

        self.shaper.shape_stop(&mut params, stop, &self.context())?;

        Ok(params)
    }

    /// Stop intent helper using the configured trigger price type.
    pub fn stop_intent(
        &self,
        symbol: Symbol,
        side: OrderSide,
        order_type: OrderType,
        stop_price: Decimal,
    ) -> StopIntent {
        StopIntent {
            symbol,
            side,
            order_type,
            stop_price,
            price_type: self.stop_price_type,
        }
    }

    fn validate_time_in_force(&self, tif: TimeInForce) -> Result<()> {
        if !self.caps.has("order_time_in_force") {
            return Ok(());
        }
        let supported = self.caps.get_str_list("order_time_in_force")?;
        if supported.iter().any(|s| s.as_str() == tif.as_str()) {
            Ok(())
        } else {
            Err(TradegateError::InvalidOrder(format!(
                "time in force {} not supported, expected one of {:?}",
                tif, supported
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityValue;
    use std::collections::HashMap;

    fn btc_usdt() -> Symbol {
        Symbol::new("BTC", "USDT")
    }

    fn caps(mode: TradingMode) -> CapabilityTable {
        let mut stop_types = HashMap::new();
        stop_types.insert("limit".to_string(), "limit".to_string());
        stop_types.insert("market".to_string(), "market".to_string());

        let mut price_types = HashMap::new();
        price_types.insert(PriceType::Last, "latest_price".to_string());
        price_types.insert(PriceType::Mark, "mark_price".to_string());

        CapabilityTable::builder()
            .base(
                "order_time_in_force",
                CapabilityValue::StrList(vec![
                    "GTC".to_string(),
                    "FOK".to_string(),
                    "IOC".to_string(),
                ]),
            )
            .futures("stoploss_on_exchange", true)
            .futures("stoploss_order_types", CapabilityValue::StrMap(stop_types))
            .futures("stop_price_prop", "stopPx")
            .futures("stop_price_type_field", "triggerType")
            .futures(
                "stop_price_type_value_mapping",
                CapabilityValue::PriceTypeMap(price_types),
            )
            .build(mode)
    }

    fn trading(mode: TradingMode) -> TradingConfig {
        TradingConfig {
            trading_mode: mode,
            margin_mode: if mode.is_spot() {
                None
            } else {
                Some(MarginMode::Isolated)
            },
            position_mode: PositionMode::OneWay,
            stop_price_type: PriceType::Last,
            dry_run: true,
        }
    }

    fn builder(mode: TradingMode) -> ParamBuilder {
        ParamBuilder::new(
            Arc::new(DefaultShaper),
            Arc::new(caps(mode)),
            &trading(mode),
        )
    }

    #[test]
    fn test_market_order_has_no_price() {
        let builder = builder(TradingMode::Futures);
        let intent = OrderIntent::market(btc_usdt(), OrderSide::Buy, Decimal::ONE);
        let params = builder.build_order(&intent).unwrap();

        assert!(!params.contains_key("price"));
        assert_eq!(*params.get("side").unwrap(), "buy");
        assert_eq!(*params.get("type").unwrap(), "market");
        // Market orders have no resting time, so no time in force either.
        assert!(!params.contains_key("timeInForce"));
    }

    #[test]
    fn test_market_order_price_when_capability_demands() {
        let caps = CapabilityTable::builder()
            .base("market_orders_require_price", true)
            .build(TradingMode::Spot);
        let builder = ParamBuilder::new(
            Arc::new(DefaultShaper),
            Arc::new(caps),
            &trading(TradingMode::Spot),
        );

        let intent = OrderIntent::market(btc_usdt(), OrderSide::Buy, Decimal::ONE);
        assert!(matches!(
            builder.build_order(&intent),
            Err(TradegateError::InvalidOrder(_))
        ));

        let mut intent = OrderIntent::market(btc_usdt(), OrderSide::Buy, Decimal::ONE);
        intent.price = Some(Decimal::from(50_000));
        let params = builder.build_order(&intent).unwrap();
        assert!(params.contains_key("price"));
    }

    #[test]
    fn test_limit_order_carries_price_and_tif() {
        let builder = builder(TradingMode::Spot);
        let intent = OrderIntent::limit(
            btc_usdt(),
            OrderSide::Sell,
            Decimal::ONE,
            Decimal::from(52_000),
        );
        let params = builder.build_order(&intent).unwrap();

        assert_eq!(*params.get("price").unwrap(), "52000");
        assert_eq!(*params.get("timeInForce").unwrap(), "GTC");
    }

    #[test]
    fn test_unsupported_time_in_force_rejected() {
        let builder = builder(TradingMode::Spot);
        let intent = OrderIntent::limit(btc_usdt(), OrderSide::Buy, Decimal::ONE, Decimal::ONE)
            .with_time_in_force(TimeInForce::PostOnly);
        assert!(matches!(
            builder.build_order(&intent),
            Err(TradegateError::InvalidOrder(_))
        ));
    }

    #[test]
    fn test_reduce_only_and_leverage_only_in_derivatives() {
        let spot = builder(TradingMode::Spot);
        let intent = OrderIntent::market(btc_usdt(), OrderSide::Sell, Decimal::ONE).reduce_only();
        let params = spot.build_order(&intent).unwrap();
        assert!(!params.contains_key("reduceOnly"));
        assert!(!params.contains_key("leverage"));

        let futures = builder(TradingMode::Futures);
        let intent = OrderIntent::market(btc_usdt(), OrderSide::Sell, Decimal::ONE)
            .with_leverage(5.0)
            .reduce_only();
        let params = futures.build_order(&intent).unwrap();
        assert_eq!(*params.get("reduceOnly").unwrap(), true);
        assert_eq!(*params.get("leverage").unwrap(), 5.0);
    }

    #[test]
    fn test_stop_params_use_capability_fields() {
        let builder = builder(TradingMode::Futures);
        let stop = builder.stop_intent(
            btc_usdt(),
            OrderSide::Sell,
            OrderType::StopMarket,
            Decimal::from(48_000),
        );
        let params = builder.build_stop(&stop).unwrap();

        assert_eq!(*params.get("stopPx").unwrap(), "48000");
        assert_eq!(*params.get("triggerType").unwrap(), "latest_price");
        assert_eq!(*params.get("type").unwrap(), "market");
    }

    #[test]
    fn test_stop_rejected_without_exchange_support() {
        let builder = builder(TradingMode::Spot);
        let stop = builder.stop_intent(
            btc_usdt(),
            OrderSide::Sell,
            OrderType::StopMarket,
            Decimal::from(48_000),
        );
        assert!(matches!(
            builder.build_stop(&stop),
            Err(TradegateError::UnsupportedFeature(_))
        ));
    }

    #[test]
    fn test_shaper_hook_is_applied() {
        struct IndexedShaper;
        impl ParamShaper for IndexedShaper {
            fn position_index(&self, mode: PositionMode, side: OrderSide) -> Option<i64> {
                match (mode, side) {
                    (PositionMode::OneWay, _) => Some(0),
                    (PositionMode::Hedge, OrderSide::Buy) => Some(1),
                    (PositionMode::Hedge, OrderSide::Sell) => Some(2),
                }
            }

            fn shape_order(
                &self,
                params: &mut RequestParams,
                intent: &OrderIntent,
                ctx: &ShapeContext<'_>,
            ) -> Result<()> {
                if ctx.trading_mode == TradingMode::Futures {
                    if let Some(idx) = self.position_index(ctx.position_mode, intent.side) {
                        params.insert_i64("positionIdx", idx);
                    }
                }
                Ok(())
            }
        }

        let builder = ParamBuilder::new(
            Arc::new(IndexedShaper),
            Arc::new(caps(TradingMode::Futures)),
            &trading(TradingMode::Futures),
        );
        let intent = OrderIntent::market(btc_usdt(), OrderSide::Buy, Decimal::ONE);
        let params = builder.build_order(&intent).unwrap();
        assert_eq!(*params.get("positionIdx").unwrap(), 0);
    }
}
