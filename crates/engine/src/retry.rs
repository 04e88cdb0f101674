use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use tradegate_core::config::RetryConfig;
use tradegate_core::prelude::*;
use tradegate_monitoring::LogContext;

/// Bounded retry with exponential backoff. State per call only; adapters
/// share the policy but never the attempt counter.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }

    /// Backoff before the given retry: base * 2^(attempt-1), capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << (attempt - 1).min(16);
        self.base_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500), Duration::from_secs(10))
    }
}

/// Outcome of a single attempt, after classification.
#[derive(Debug)]
enum AttemptOutcome<T> {
    Success(T),
    Retryable(TradegateError),
    Fatal(TradegateError),
}

fn classify<T>(result: Result<T>) -> AttemptOutcome<T> {
    match result {
        Ok(value) => AttemptOutcome::Success(value),
        Err(e) if e.is_retryable() => AttemptOutcome::Retryable(e),
        Err(e) => AttemptOutcome::Fatal(e),
    }
}

/// Drives an outbound call through the attempt state machine. Retryable
/// failures back off and retry up to `policy.max_attempts` total calls;
/// exhaustion escalates to `RetriesExhausted` carrying the last error.
/// Fatal failures surface immediately.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    log: &LogContext,
    method: &str,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error: Option<TradegateError> = None;

    for attempt in 1..=policy.max_attempts {
        match classify(op().await) {
            AttemptOutcome::Success(value) => return Ok(value),
            AttemptOutcome::Fatal(e) => {
                log.permanent_failure(method, &e);
                return Err(e);
            }
            AttemptOutcome::Retryable(e) => {
                if attempt < policy.max_attempts {
                    let delay = policy.delay_for(attempt);
                    log.retrying(method, attempt, policy.max_attempts, delay, &e);
                    sleep(delay).await;
                }
                last_error = Some(e);
            }
        }
    }

    let source = last_error
        .unwrap_or_else(|| TradegateError::Internal("retry loop without attempts".to_string()));
    let exhausted = TradegateError::RetriesExhausted {
        attempts: policy.max_attempts,
        source: Box::new(source),
    };
    log.permanent_failure(method, &exhausted);
    Err(exhausted)
}
