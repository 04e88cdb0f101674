use std::sync::Arc;

use tradegate_core::config::TradegateConfig;
use tradegate_core::prelude::*;
use tradegate_engine::prelude::*;
use tradegate_monitoring::LogContext;

use tradegate_bitget::{BitgetAdapter, BITGET_API_URL};
use tradegate_bybit::{BybitAdapter, BYBIT_API_URL};

/// Constructs the adapter variant for the configured exchange. This is
/// the single place where an exchange identifier is turned into concrete
/// behavior; everything downstream works through the
/// [`ExchangeAdapter`] trait.
pub struct AdapterRegistry;

impl AdapterRegistry {
    pub const KNOWN_EXCHANGES: &'static [ExchangeId] = &[ExchangeId::Bitget, ExchangeId::Bybit];

    /// Build the configured exchange's adapter over a REST transport.
    pub fn build(config: &TradegateConfig) -> Result<Arc<dyn ExchangeAdapter>> {
        let id = config.active_exchange();
        let settings = config.exchange_settings(&id)?;

        let (default_url, endpoints) = match &id {
            ExchangeId::Bitget => (BITGET_API_URL, tradegate_bitget::endpoints()),
            ExchangeId::Bybit => (BYBIT_API_URL, tradegate_bybit::endpoints()),
            ExchangeId::Custom(name) => {
                return Err(TradegateError::Permanent(format!(
                    "no adapter registered for exchange {}",
                    name
                )))
            }
        };

        let base_url = settings
            .base_url
            .clone()
            .unwrap_or_else(|| default_url.to_string());
        let transport = Arc::new(RestTransport::new(
            base_url,
            settings,
            config.trading.trading_mode,
            endpoints,
        )?);

        Self::build_with_transport(config, transport)
    }

    /// Same selection over a caller-supplied transport; used by tests and
    /// by hosts that bring their own client.
    pub fn build_with_transport(
        config: &TradegateConfig,
        transport: Arc<dyn ExchangeTransport>,
    ) -> Result<Arc<dyn ExchangeAdapter>> {
        let id = config.active_exchange();
        let log = LogContext::new("adapter", id.to_string());

        match id {
            ExchangeId::Bitget => Ok(Arc::new(BitgetAdapter::new(config, transport, log)?)),
            ExchangeId::Bybit => Ok(Arc::new(BybitAdapter::new(config, transport, log)?)),
            ExchangeId::Custom(name) => Err(TradegateError::Permanent(format!(
                "no adapter registered for exchange {}",
                name
            ))),
        }
    }
}
