//! Bitget Exchange Adapter
//!
//! Contains the adjustments needed for the adapter engine to work with
//! Bitget: capability tables, order-parameter quirks and position
//! fetching.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use tradegate_core::config::TradegateConfig;
use tradegate_core::prelude::*;
use tradegate_engine::prelude::*;
use tradegate_monitoring::LogContext;

pub mod caps;
pub mod model;

pub const BITGET_API_URL: &str = "https://api.bitget.com";

pub const SUPPORTED_MODE_PAIRS: &[(TradingMode, MarginMode)] = &[
    (TradingMode::Futures, MarginMode::Cross),
    (TradingMode::Futures, MarginMode::Isolated),
];

/// Request paths for the engine's outbound calls on Bitget.
pub fn endpoints() -> TransportEndpoints {
    TransportEndpoints {
        set_leverage: "/api/v2/mix/account/set-leverage".to_string(),
        set_margin_mode: "/api/v2/mix/account/set-margin-mode".to_string(),
        create_order: "/api/v2/mix/order/place-order".to_string(),
        positions: "/api/v2/mix/position/all-position".to_string(),
    }
}

/// Parameter quirks Bitget needs on top of the shared builder.
#[derive(Debug, Default)]
pub struct BitgetShaper;

impl ParamShaper for BitgetShaper {
    // Bitget never wants a price on market orders.
    fn order_needs_price(
        &self,
        _side: OrderSide,
        order_type: OrderType,
        _caps: &CapabilityTable,
    ) -> bool {
        order_type != OrderType::Market
    }

    fn position_index(&self, position_mode: PositionMode, side: OrderSide) -> Option<i64> {
        // 1 = one-way position; hedge mode addresses the legs separately.
        Some(match (position_mode, side) {
            (PositionMode::OneWay, _) => 1,
            (PositionMode::Hedge, OrderSide::Buy) => 1,
            (PositionMode::Hedge, OrderSide::Sell) => 2,
        })
    }

    fn shape_order(
        &self,
        params: &mut RequestParams,
        intent: &OrderIntent,
        ctx: &ShapeContext<'_>,
    ) -> Result<()> {
        if ctx.trading_mode == TradingMode::Futures && ctx.margin_mode.is_some() {
            if let Some(idx) = self.position_index(ctx.position_mode, intent.side) {
                params.insert_i64("positionIdx", idx);
            }
        }
        Ok(())
    }
}

pub struct BitgetAdapter {
    core: AdapterCore,
}

impl BitgetAdapter {
    pub fn new(
        config: &TradegateConfig,
        transport: Arc<dyn ExchangeTransport>,
        log: LogContext,
    ) -> Result<Self> {
        let caps = caps::capability_table(config.trading.trading_mode);
        let core = AdapterCore::new(
            ExchangeId::Bitget,
            caps,
            Arc::new(BitgetShaper),
            transport,
            config,
            SUPPORTED_MODE_PAIRS,
            SymbolFormat::Concatenated,
            log,
        )?;
        Ok(Self { core })
    }
}

#[async_trait]
impl ExchangeAdapter for BitgetAdapter {
    fn exchange_id(&self) -> ExchangeId {
        ExchangeId::Bitget
    }

    fn capabilities(&self) -> &CapabilityTable {
        self.core.capabilities()
    }

    fn supported_mode_pairs(&self) -> &[(TradingMode, MarginMode)] {
        SUPPORTED_MODE_PAIRS
    }

    // Bitget only trades perpetual swaps; dated futures are not offered.
    fn market_is_future(&self, market: &Market) -> bool {
        market.swap
    }

    fn build_order_params(&self, intent: &OrderIntent) -> Result<RequestParams> {
        self.core.build_order_params(intent)
    }

    fn build_stop_params(&self, stop: &StopIntent) -> Result<RequestParams> {
        self.core.build_stop_params(stop)
    }

    async fn prepare_leverage(
        &self,
        pair: &Symbol,
        leverage: f64,
        side: OrderSide,
        accept_fail: bool,
    ) -> Result<()> {
        self.core
            .prepare_leverage(pair, leverage, side, accept_fail)
            .await
    }

    async fn place_order(&self, intent: &OrderIntent) -> Result<Value> {
        self.core.place_order(intent).await
    }

    async fn fetch_positions(&self, pair: Option<&Symbol>) -> Result<Vec<Position>> {
        let payload = self.core.fetch_positions_raw(pair).await?;
        let positions = model::parse_positions(&payload)?;
        let pair_str = pair.map(|p| p.to_pair());
        self.core
            .log()
            .positions_fetched(positions.len(), pair_str.as_deref());
        Ok(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_index_per_mode() {
        let shaper = BitgetShaper;
        assert_eq!(
            shaper.position_index(PositionMode::OneWay, OrderSide::Buy),
            Some(1)
        );
        assert_eq!(
            shaper.position_index(PositionMode::OneWay, OrderSide::Sell),
            Some(1)
        );
        assert_eq!(
            shaper.position_index(PositionMode::Hedge, OrderSide::Buy),
            Some(1)
        );
        assert_eq!(
            shaper.position_index(PositionMode::Hedge, OrderSide::Sell),
            Some(2)
        );
    }

    #[test]
    fn test_market_order_never_needs_price() {
        let shaper = BitgetShaper;
        let caps = caps::capability_table(TradingMode::Futures);
        assert!(!shaper.order_needs_price(OrderSide::Buy, OrderType::Market, &caps));
        assert!(shaper.order_needs_price(OrderSide::Buy, OrderType::Limit, &caps));
    }

    #[test]
    fn test_only_swaps_are_futures() {
        let config = TradegateConfig::development();
        let transport = Arc::new(NoopTransport);
        let adapter = BitgetAdapter::new(
            &config,
            transport,
            LogContext::new("adapter", "bitget"),
        )
        .unwrap();

        let symbol = Symbol::new("BTC", "USDT");
        assert!(adapter.market_is_future(&Market::swap(symbol.clone(), "USDT")));
        assert!(!adapter.market_is_future(&Market::delivery_future(symbol.clone(), "USDT")));
        assert!(!adapter.market_is_future(&Market::spot(symbol)));
    }

    #[test]
    fn test_unsupported_margin_mode_pair_rejected() {
        let mut config = TradegateConfig::development();
        config.trading.trading_mode = TradingMode::Margin;
        config.trading.margin_mode = Some(MarginMode::Isolated);

        let err = match BitgetAdapter::new(
            &config,
            Arc::new(NoopTransport),
            LogContext::new("adapter", "bitget"),
        ) {
            Ok(_) => panic!("expected unsupported margin mode pair to be rejected"),
            Err(e) => e,
        };
        assert!(matches!(err, TradegateError::Permanent(_)));
    }

    struct NoopTransport;

    #[async_trait]
    impl ExchangeTransport for NoopTransport {
        async fn set_leverage(
            &self,
            _symbol: &str,
            _leverage: f64,
            _params: RequestParams,
        ) -> Result<Value> {
            Ok(serde_json::json!({}))
        }

        async fn set_margin_mode(
            &self,
            _symbol: &str,
            _margin_mode: MarginMode,
            _params: RequestParams,
        ) -> Result<Value> {
            Ok(serde_json::json!({}))
        }

        async fn create_order(&self, _symbol: &str, _params: RequestParams) -> Result<Value> {
            Ok(serde_json::json!({}))
        }

        async fn fetch_positions(&self, _symbols: Option<Vec<String>>) -> Result<Value> {
            Ok(serde_json::json!([]))
        }
    }
}
