use std::sync::Arc;

use tradegate_core::config::TradingConfig;
use tradegate_core::prelude::*;
use tradegate_monitoring::LogContext;

use crate::capability::CapabilityTable;
use crate::retry::{with_retry, RetryPolicy};
use crate::transport::ExchangeTransport;

/// Sequences margin-mode and leverage setup ahead of order placement.
/// Inactive in spot mode. Each call is driven through the retry
/// classifier; a failure is swallowed when the capability table marks the
/// operation best-effort or the caller passes `accept_fail`.
pub struct LeveragePreparer {
    transport: Arc<dyn ExchangeTransport>,
    caps: Arc<CapabilityTable>,
    trading_mode: TradingMode,
    margin_mode: Option<MarginMode>,
    dry_run: bool,
    policy: RetryPolicy,
    log: LogContext,
}

impl LeveragePreparer {
    pub fn new(
        transport: Arc<dyn ExchangeTransport>,
        caps: Arc<CapabilityTable>,
        trading: &TradingConfig,
        policy: RetryPolicy,
        log: LogContext,
    ) -> Self {
        Self {
            transport,
            caps,
            trading_mode: trading.trading_mode,
            margin_mode: trading.margin_mode,
            dry_run: trading.dry_run,
            policy,
            log,
        }
    }

    pub async fn prepare(
        &self,
        symbol: &str,
        leverage: f64,
        _side: OrderSide,
        accept_fail: bool,
    ) -> Result<()> {
        if self.trading_mode.is_spot() || self.dry_run {
            return Ok(());
        }

        let margin_mode = self.margin_mode.ok_or_else(|| {
            TradegateError::Permanent(format!(
                "margin_mode must be configured for {} trading",
                self.trading_mode
            ))
        })?;

        // Margin-mode call carries the leverage too; some exchanges apply
        // both in one request and treat the second call as a no-op.
        let mut margin_params = RequestParams::new();
        margin_params.insert_f64("leverage", leverage);

        let result = with_retry(&self.policy, &self.log, "set_margin_mode", || {
            self.transport
                .set_margin_mode(symbol, margin_mode, margin_params.clone())
        })
        .await;
        self.settle(
            "set_margin_mode",
            result,
            accept_fail || self.caps.flag("margin_mode_best_effort"),
        )?;

        let result = with_retry(&self.policy, &self.log, "set_leverage", || {
            self.transport
                .set_leverage(symbol, leverage, RequestParams::new())
        })
        .await;
        self.settle(
            "set_leverage",
            result,
            accept_fail || self.caps.flag("set_leverage_best_effort"),
        )?;

        Ok(())
    }

    fn settle(
        &self,
        method: &str,
        result: Result<serde_json::Value>,
        best_effort: bool,
    ) -> Result<()> {
        match result {
            Ok(_) => Ok(()),
            Err(e) if best_effort => {
                self.log.best_effort_failure(method, &e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
