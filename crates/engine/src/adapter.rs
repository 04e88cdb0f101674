use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use tradegate_core::config::{TradegateConfig, TradingConfig};
use tradegate_core::prelude::*;
use tradegate_core::utils::generate_client_order_id;
use tradegate_monitoring::LogContext;

use crate::capability::CapabilityTable;
use crate::leverage::LeveragePreparer;
use crate::normalizer::{format_symbol_for_exchange, SymbolFormat};
use crate::params::{ParamBuilder, ParamShaper};
use crate::retry::{with_retry, RetryPolicy};
use crate::transport::ExchangeTransport;

/// Hook surface exposed upward to the order-execution engine, which calls
/// these without knowledge of exchange identity. One adapter instance per
/// exchange; safe for concurrent use, all state is read-only after
/// construction.
#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
    fn exchange_id(&self) -> ExchangeId;

    fn capabilities(&self) -> &CapabilityTable;

    fn supported_mode_pairs(&self) -> &[(TradingMode, MarginMode)];

    /// Whether the market trades as a futures contract for this adapter.
    /// Adapters narrow this down (e.g. perpetual swaps only).
    fn market_is_future(&self, market: &Market) -> bool {
        market.swap || market.future
    }

    fn build_order_params(&self, intent: &OrderIntent) -> Result<RequestParams>;

    fn build_stop_params(&self, stop: &StopIntent) -> Result<RequestParams>;

    async fn prepare_leverage(
        &self,
        pair: &Symbol,
        leverage: f64,
        side: OrderSide,
        accept_fail: bool,
    ) -> Result<()>;

    async fn place_order(&self, intent: &OrderIntent) -> Result<Value>;

    async fn fetch_positions(&self, pair: Option<&Symbol>) -> Result<Vec<Position>>;

    /// Post-construction exchange setup. Most exchanges need none.
    async fn additional_init(&self) -> Result<()> {
        Ok(())
    }
}

/// Rejects `(trading mode, margin mode)` combinations the exchange does
/// not support. Spot is always allowed.
pub fn validate_mode_pair(
    trading: &TradingConfig,
    supported: &[(TradingMode, MarginMode)],
    exchange: &ExchangeId,
) -> Result<()> {
    if trading.trading_mode.is_spot() {
        return Ok(());
    }

    let margin_mode = trading.margin_mode_checked()?;
    if supported
        .iter()
        .any(|(t, m)| *t == trading.trading_mode && *m == margin_mode)
    {
        Ok(())
    } else {
        Err(TradegateError::Permanent(format!(
            "{} does not support {} trading with {} margin",
            exchange, trading.trading_mode, margin_mode
        )))
    }
}

/// Shared machinery behind every adapter: parameter building, leverage
/// preparation, retries and the transport handle. Adapters delegate here
/// and override only their divergent hooks.
pub struct AdapterCore {
    exchange_id: ExchangeId,
    transport: Arc<dyn ExchangeTransport>,
    caps: Arc<CapabilityTable>,
    builder: ParamBuilder,
    preparer: LeveragePreparer,
    policy: RetryPolicy,
    symbol_format: SymbolFormat,
    dry_run: bool,
    log: LogContext,
}

impl AdapterCore {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        exchange_id: ExchangeId,
        caps: CapabilityTable,
        shaper: Arc<dyn ParamShaper>,
        transport: Arc<dyn ExchangeTransport>,
        config: &TradegateConfig,
        supported_pairs: &[(TradingMode, MarginMode)],
        symbol_format: SymbolFormat,
        log: LogContext,
    ) -> Result<Self> {
        validate_mode_pair(&config.trading, supported_pairs, &exchange_id)?;

        let caps = Arc::new(caps);
        let policy = RetryPolicy::from_config(&config.retry);
        let builder = ParamBuilder::new(shaper, Arc::clone(&caps), &config.trading);
        let preparer = LeveragePreparer::new(
            Arc::clone(&transport),
            Arc::clone(&caps),
            &config.trading,
            policy.clone(),
            log.child("leverage"),
        );

        Ok(Self {
            exchange_id,
            transport,
            caps,
            builder,
            preparer,
            policy,
            symbol_format,
            dry_run: config.trading.dry_run,
            log,
        })
    }

    pub fn exchange_id(&self) -> &ExchangeId {
        &self.exchange_id
    }

    pub fn capabilities(&self) -> &CapabilityTable {
        &self.caps
    }

    pub fn log(&self) -> &LogContext {
        &self.log
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn exchange_symbol(&self, symbol: &Symbol) -> String {
        format_symbol_for_exchange(symbol, self.symbol_format)
    }

    pub fn build_order_params(&self, intent: &OrderIntent) -> Result<RequestParams> {
        let params = self.builder.build_order(intent)?;
        self.log.order_built(
            &intent.symbol.to_pair(),
            &intent.side.to_string(),
            &intent.order_type.to_string(),
        );
        Ok(params)
    }

    pub fn build_stop_params(&self, stop: &StopIntent) -> Result<RequestParams> {
        self.builder.build_stop(stop)
    }

    pub fn stop_intent(
        &self,
        symbol: Symbol,
        side: OrderSide,
        order_type: OrderType,
        stop_price: Decimal,
    ) -> StopIntent {
        self.builder.stop_intent(symbol, side, order_type, stop_price)
    }

    pub async fn prepare_leverage(
        &self,
        pair: &Symbol,
        leverage: f64,
        side: OrderSide,
        accept_fail: bool,
    ) -> Result<()> {
        let symbol = self.exchange_symbol(pair);
        self.preparer
            .prepare(&symbol, leverage, side, accept_fail)
            .await
    }

    /// Full order path: build parameters, prepare leverage, then the
    /// outbound call wrapped by the retry classifier. Dry-run mode stops
    /// short of the transport and returns a synthetic receipt.
    pub async fn place_order(&self, intent: &OrderIntent) -> Result<Value> {
        let params = self.build_order_params(intent)?;
        self.prepare_leverage(&intent.symbol, intent.leverage, intent.side, false)
            .await?;

        let symbol = self.exchange_symbol(&intent.symbol);

        if self.dry_run {
            self.log
                .order_placed(&intent.symbol.to_pair(), &intent.side.to_string(), true);
            let mut receipt = serde_json::Map::new();
            receipt.insert(
                "id".to_string(),
                Value::String(generate_client_order_id(&self.exchange_id.to_string())),
            );
            receipt.insert("symbol".to_string(), Value::String(symbol));
            receipt.insert("dryRun".to_string(), Value::Bool(true));
            receipt.insert("params".to_string(), Value::Object(params.into_inner()));
            return Ok(Value::Object(receipt));
        }

        let result = with_retry(&self.policy, &self.log, "create_order", || {
            self.transport.create_order(&symbol, params.clone())
        })
        .await?;

        self.log
            .order_placed(&intent.symbol.to_pair(), &intent.side.to_string(), false);
        Ok(result)
    }

    /// Position fetch with the symbol filter the caller asked for: no
    /// pair means all symbols, a pair means exactly that pair. Adapters
    /// parse the returned payload into [`Position`] records.
    pub async fn fetch_positions_raw(&self, pair: Option<&Symbol>) -> Result<Value> {
        let symbols = pair.map(|p| vec![self.exchange_symbol(p)]);
        with_retry(&self.policy, &self.log, "fetch_positions", || {
            self.transport.fetch_positions(symbols.clone())
        })
        .await
    }
}
