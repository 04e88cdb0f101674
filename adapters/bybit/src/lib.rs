//! Bybit Exchange Adapter

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use tradegate_core::config::TradegateConfig;
use tradegate_core::prelude::*;
use tradegate_engine::prelude::*;
use tradegate_monitoring::LogContext;

pub mod caps;
pub mod model;

pub const BYBIT_API_URL: &str = "https://api.bybit.com";

pub const SUPPORTED_MODE_PAIRS: &[(TradingMode, MarginMode)] = &[
    (TradingMode::Futures, MarginMode::Cross),
    (TradingMode::Futures, MarginMode::Isolated),
];

pub fn endpoints() -> TransportEndpoints {
    TransportEndpoints {
        set_leverage: "/v5/position/set-leverage".to_string(),
        set_margin_mode: "/v5/position/switch-isolated".to_string(),
        create_order: "/v5/order/create".to_string(),
        positions: "/v5/position/list".to_string(),
    }
}

#[derive(Debug, Default)]
pub struct BybitShaper;

impl ParamShaper for BybitShaper {
    fn position_index(&self, position_mode: PositionMode, side: OrderSide) -> Option<i64> {
        // 0 = one-way; hedge mode splits into a buy leg (1) and sell leg (2).
        Some(match (position_mode, side) {
            (PositionMode::OneWay, _) => 0,
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
        if ctx.trading_mode == TradingMode::Futures {
            if let Some(idx) = self.position_index(ctx.position_mode, intent.side) {
                params.insert_i64("positionIdx", idx);
            }
        }
        Ok(())
    }
}

pub struct BybitAdapter {
    core: AdapterCore,
}

impl BybitAdapter {
    pub fn new(
        config: &TradegateConfig,
        transport: Arc<dyn ExchangeTransport>,
        log: LogContext,
    ) -> Result<Self> {
        let caps = caps::capability_table(config.trading.trading_mode);
        let core = AdapterCore::new(
            ExchangeId::Bybit,
            caps,
            Arc::new(BybitShaper),
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
impl ExchangeAdapter for BybitAdapter {
    fn exchange_id(&self) -> ExchangeId {
        ExchangeId::Bybit
    }

    fn capabilities(&self) -> &CapabilityTable {
        self.core.capabilities()
    }

    fn supported_mode_pairs(&self) -> &[(TradingMode, MarginMode)] {
        SUPPORTED_MODE_PAIRS
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

    /// Probe the position endpoint once so authentication and position
    /// mode problems surface at startup instead of on the first order.
    async fn additional_init(&self) -> Result<()> {
        if self.core.dry_run() || !self.capabilities().trading_mode().is_derivatives() {
            return Ok(());
        }
        self.core.fetch_positions_raw(None).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ProbeTransport {
        position_calls: AtomicU32,
    }

    #[async_trait]
    impl ExchangeTransport for ProbeTransport {
        async fn set_leverage(
            &self,
            _symbol: &str,
            _leverage: f64,
            _params: RequestParams,
        ) -> Result<Value> {
            Ok(json!({}))
        }

        async fn set_margin_mode(
            &self,
            _symbol: &str,
            _margin_mode: MarginMode,
            _params: RequestParams,
        ) -> Result<Value> {
            Ok(json!({}))
        }

        async fn create_order(&self, _symbol: &str, _params: RequestParams) -> Result<Value> {
            Ok(json!({}))
        }

        async fn fetch_positions(&self, _symbols: Option<Vec<String>>) -> Result<Value> {
            self.position_calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({"result": {"list": []}}))
        }
    }

    fn adapter(dry_run: bool) -> (BybitAdapter, Arc<ProbeTransport>) {
        let transport = Arc::new(ProbeTransport {
            position_calls: AtomicU32::new(0),
        });
        let mut config = TradegateConfig::development();
        config.exchange = "bybit".to_string();
        config.trading.dry_run = dry_run;
        let adapter = BybitAdapter::new(
            &config,
            transport.clone(),
            LogContext::new("adapter", "bybit"),
        )
        .unwrap();
        (adapter, transport)
    }

    #[test]
    fn test_one_way_index_is_zero() {
        let shaper = BybitShaper;
        assert_eq!(
            shaper.position_index(PositionMode::OneWay, OrderSide::Buy),
            Some(0)
        );
        assert_eq!(
            shaper.position_index(PositionMode::Hedge, OrderSide::Sell),
            Some(2)
        );
    }

    #[test]
    fn test_order_params_carry_index() {
        let (adapter, _) = adapter(true);
        let intent = OrderIntent::market(Symbol::new("BTC", "USDT"), OrderSide::Buy, Decimal::ONE);
        let params = adapter.build_order_params(&intent).unwrap();
        assert_eq!(*params.get("positionIdx").unwrap(), 0);
        assert!(!params.contains_key("price"));
    }

    #[test]
    fn test_post_only_accepted() {
        let (adapter, _) = adapter(true);
        let intent = OrderIntent::limit(
            Symbol::new("BTC", "USDT"),
            OrderSide::Sell,
            Decimal::ONE,
            Decimal::from(60_000),
        )
        .with_time_in_force(TimeInForce::PostOnly);
        let params = adapter.build_order_params(&intent).unwrap();
        assert_eq!(*params.get("timeInForce").unwrap(), "PO");
    }

    #[test]
    fn test_stop_params_use_bybit_trigger_fields() {
        let (adapter, _) = adapter(true);
        let stop = StopIntent {
            symbol: Symbol::new("BTC", "USDT"),
            side: OrderSide::Sell,
            order_type: OrderType::StopLimit,
            stop_price: Decimal::from(48_000),
            price_type: PriceType::Mark,
        };
        let params = adapter.build_stop_params(&stop).unwrap();
        assert_eq!(*params.get("triggerPrice").unwrap(), "48000");
        assert_eq!(*params.get("triggerBy").unwrap(), "MarkPrice");
        assert_eq!(*params.get("type").unwrap(), "Limit");
    }

    #[tokio::test]
    async fn test_init_probe_skipped_in_dry_run() {
        let (adapter, transport) = adapter(true);
        adapter.additional_init().await.unwrap();
        assert_eq!(transport.position_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_init_probe_runs_live() {
        let (adapter, transport) = adapter(false);
        adapter.additional_init().await.unwrap();
        assert_eq!(transport.position_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dated_futures_count_as_futures() {
        let (adapter, _) = adapter(true);
        let symbol = Symbol::new("BTC", "USDT");
        assert!(adapter.market_is_future(&Market::swap(symbol.clone(), "USDT")));
        assert!(adapter.market_is_future(&Market::delivery_future(symbol.clone(), "USDT")));
        assert!(!adapter.market_is_future(&Market::spot(symbol)));
    }
}
