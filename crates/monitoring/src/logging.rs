use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
};

use tradegate_core::config::MonitoringSettings;
use tradegate_core::prelude::*;

pub fn setup_logging(config: &MonitoringSettings) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let mut layers = Vec::new();

    // Console logging layer
    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if config.enable_json_logs {
        layers.push(console_layer.json().boxed());
    } else {
        layers.push(console_layer.boxed());
    }

    // File logging layer
    if let Some(log_file) = &config.log_file {
        let log_path = Path::new(log_file);

        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TradegateError::Internal(format!("Failed to create log directory: {}", e))
            })?;
        }

        let file_appender = rolling::daily(
            log_path.parent().unwrap_or_else(|| Path::new(".")),
            log_path
                .file_name()
                .unwrap_or_else(|| std::ffi::OsStr::new("tradegate.log")),
        );

        let (non_blocking_appender, guard) = non_blocking(file_appender);

        let file_layer = fmt::layer()
            .with_writer(non_blocking_appender)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        if config.enable_json_logs {
            layers.push(file_layer.json().boxed());
        } else {
            layers.push(file_layer.boxed());
        }

        // Keep the appender guard alive for the process lifetime
        std::mem::forget(guard);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .init();

    info!("Logging initialized with level: {}", config.log_level);

    Ok(())
}

/// Structured-logging handle injected into adapters at construction.
/// Every event it emits carries the component and exchange so permanent
/// failures can be traced back to the exchange and method that caused
/// them.
#[derive(Debug, Clone)]
pub struct LogContext {
    component: String,
    exchange: String,
}

impl LogContext {
    pub fn new(component: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            exchange: exchange.into(),
        }
    }

    /// Same exchange, different component.
    pub fn child(&self, component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            exchange: self.exchange.clone(),
        }
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn order_built(&self, symbol: &str, side: &str, order_type: &str) {
        debug!(
            component = %self.component,
            exchange = %self.exchange,
            event = "order_params_built",
            symbol = %symbol,
            side = %side,
            order_type = %order_type,
            "Order parameters built"
        );
    }

    pub fn order_placed(&self, symbol: &str, side: &str, dry_run: bool) {
        info!(
            component = %self.component,
            exchange = %self.exchange,
            event = "order_placed",
            symbol = %symbol,
            side = %side,
            dry_run = %dry_run,
            "Order placed"
        );
    }

    pub fn retrying(
        &self,
        method: &str,
        attempt: u32,
        max_attempts: u32,
        delay: std::time::Duration,
        error: &TradegateError,
    ) {
        warn!(
            component = %self.component,
            exchange = %self.exchange,
            event = "retrying",
            method = %method,
            attempt = %attempt,
            max_attempts = %max_attempts,
            delay_ms = %delay.as_millis(),
            error = %error,
            "Retryable failure, backing off"
        );
    }

    pub fn permanent_failure(&self, method: &str, error: &TradegateError) {
        error!(
            component = %self.component,
            exchange = %self.exchange,
            event = "permanent_failure",
            method = %method,
            error = %error,
            "Aborting action"
        );
    }

    pub fn best_effort_failure(&self, method: &str, error: &TradegateError) {
        warn!(
            component = %self.component,
            exchange = %self.exchange,
            event = "best_effort_failure",
            method = %method,
            error = %error,
            "Best-effort operation failed, continuing"
        );
    }

    pub fn positions_fetched(&self, count: usize, pair: Option<&str>) {
        debug!(
            component = %self.component,
            exchange = %self.exchange,
            event = "positions_fetched",
            count = %count,
            pair = ?pair,
            "Positions fetched"
        );
    }
}
