use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Result, TradegateError};
use crate::types::{ExchangeCredentials, ExchangeId, MarginMode, PositionMode, PriceType, RateLimits, TradingMode};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradegateConfig {
    /// Identifier of the active exchange; resolved through the adapter
    /// registry at startup.
    pub exchange: String,
    pub exchanges: HashMap<String, ExchangeSettings>,
    pub trading: TradingConfig,
    pub retry: RetryConfig,
    pub monitoring: MonitoringSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeSettings {
    pub enabled: bool,
    pub base_url: Option<String>,
    pub credentials: Option<ExchangeCredentials>,
    pub rate_limits: RateLimits,
    pub request_timeout_ms: u64,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
            credentials: None,
            rate_limits: RateLimits::default(),
            request_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    pub trading_mode: TradingMode,
    /// Required outside spot mode; ignored in spot.
    pub margin_mode: Option<MarginMode>,
    pub position_mode: PositionMode,
    pub stop_price_type: PriceType,
    pub dry_run: bool,
}

impl TradingConfig {
    /// Margin mode must be configured whenever leverage preparation runs.
    pub fn margin_mode_checked(&self) -> Result<MarginMode> {
        if self.trading_mode.is_spot() {
            return Err(TradegateError::Internal(
                "margin mode requested in spot mode".to_string(),
            ));
        }
        self.margin_mode.ok_or_else(|| {
            TradegateError::Permanent(format!(
                "margin_mode must be configured for {} trading",
                self.trading_mode
            ))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringSettings {
    pub log_level: String,
    pub log_file: Option<String>,
    pub enable_json_logs: bool,
}

impl TradegateConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("TRADEGATE"))
            .build()?;

        settings.try_deserialize()
    }

    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        for path in paths {
            builder = builder.add_source(File::from(path.as_ref()).required(false));
        }

        let settings = builder
            .add_source(Environment::with_prefix("TRADEGATE"))
            .build()?;

        settings.try_deserialize()
    }

    pub fn development() -> Self {
        Self {
            exchange: "bitget".to_string(),
            exchanges: Self::default_exchanges(),
            trading: TradingConfig {
                trading_mode: TradingMode::Futures,
                margin_mode: Some(MarginMode::Isolated),
                position_mode: PositionMode::OneWay,
                stop_price_type: PriceType::Last,
                dry_run: true,
            },
            retry: RetryConfig::default(),
            monitoring: MonitoringSettings {
                log_level: "debug".to_string(),
                log_file: Some("logs/tradegate.log".to_string()),
                enable_json_logs: false,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            exchange: "bitget".to_string(),
            exchanges: Self::default_exchanges(),
            trading: TradingConfig {
                trading_mode: TradingMode::Futures,
                margin_mode: Some(MarginMode::Isolated),
                position_mode: PositionMode::OneWay,
                stop_price_type: PriceType::Mark,
                dry_run: false,
            },
            retry: RetryConfig {
                max_attempts: 5,
                base_delay_ms: 250,
                max_delay_ms: 5_000,
            },
            monitoring: MonitoringSettings {
                log_level: "info".to_string(),
                log_file: Some("logs/tradegate.log".to_string()),
                enable_json_logs: true,
            },
        }
    }

    fn default_exchanges() -> HashMap<String, ExchangeSettings> {
        let mut exchanges = HashMap::new();
        exchanges.insert("bitget".to_string(), ExchangeSettings::default());
        exchanges.insert("bybit".to_string(), ExchangeSettings::default());
        exchanges
    }

    pub fn active_exchange(&self) -> ExchangeId {
        ExchangeId::from(self.exchange.as_str())
    }

    pub fn exchange_settings(&self, id: &ExchangeId) -> Result<&ExchangeSettings> {
        self.exchanges.get(&id.to_string()).ok_or_else(|| {
            TradegateError::Permanent(format!("no configuration for exchange {}", id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_preset() {
        let config = TradegateConfig::development();
        assert!(config.trading.dry_run);
        assert_eq!(config.active_exchange(), ExchangeId::Bitget);
        assert!(config.exchange_settings(&ExchangeId::Bybit).is_ok());
    }

    #[test]
    fn test_missing_exchange_settings_is_permanent() {
        let config = TradegateConfig::development();
        let err = config
            .exchange_settings(&ExchangeId::Custom("kucoin".to_string()))
            .unwrap_err();
        assert!(matches!(err, TradegateError::Permanent(_)));
    }

    #[test]
    fn test_margin_mode_required_outside_spot() {
        let mut config = TradegateConfig::development();
        config.trading.margin_mode = None;
        let err = config.trading.margin_mode_checked().unwrap_err();
        assert!(matches!(err, TradegateError::Permanent(_)));

        config.trading.margin_mode = Some(MarginMode::Cross);
        assert_eq!(
            config.trading.margin_mode_checked().unwrap(),
            MarginMode::Cross
        );
    }
}
