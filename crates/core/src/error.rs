use thiserror::Error;

pub type Result<T> = std::result::Result<T, TradegateError>;

/// Error taxonomy for the adapter engine.
///
/// Callers must be able to tell "retry later" from "fix configuration":
/// `RateLimited` and `Transient` are retryable, everything else is fatal.
/// Raw transport errors are re-classified at the adapter boundary; anything
/// that cannot be classified stays fatal.
#[derive(Error, Debug)]
pub enum TradegateError {
    #[error("Rate limited by exchange: {0}")]
    RateLimited(String),

    #[error("Temporary exchange failure: {0}")]
    Transient(String),

    #[error("Permanent failure: {0}")]
    Permanent(String),

    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("Retries exhausted after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<TradegateError>,
    },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TradegateError {
    /// Whether a bounded retry with backoff may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TradegateError::RateLimited(_) | TradegateError::Transient(_)
        )
    }

    /// Whether the triggering action must be aborted and surfaced.
    pub fn is_fatal(&self) -> bool {
        !self.is_retryable()
    }

    /// Classify an HTTP status into the taxonomy. 429 is rate limiting,
    /// 5xx is a temporary operational failure, anything else client-side
    /// is permanent.
    pub fn from_status(status: u16, context: impl Into<String>) -> Self {
        let context = context.into();
        match status {
            429 => TradegateError::RateLimited(context),
            500..=599 => TradegateError::Transient(format!("HTTP {}: {}", status, context)),
            _ => TradegateError::Permanent(format!("HTTP {}: {}", status, context)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(TradegateError::RateLimited("429".to_string()).is_retryable());
        assert!(TradegateError::Transient("down".to_string()).is_retryable());
        assert!(!TradegateError::Permanent("bad key".to_string()).is_retryable());
        assert!(!TradegateError::UnsupportedFeature("x".to_string()).is_retryable());
    }

    #[test]
    fn test_unclassified_is_fatal() {
        let err = TradegateError::Internal("unknown".to_string());
        assert!(err.is_fatal());

        let err = TradegateError::Json(serde_json::from_str::<serde_json::Value>("{").unwrap_err());
        assert!(err.is_fatal());
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            TradegateError::from_status(429, "slow down"),
            TradegateError::RateLimited(_)
        ));
        assert!(matches!(
            TradegateError::from_status(503, "maintenance"),
            TradegateError::Transient(_)
        ));
        assert!(matches!(
            TradegateError::from_status(400, "bad request"),
            TradegateError::Permanent(_)
        ));
        assert!(matches!(
            TradegateError::from_status(401, "unauthorized"),
            TradegateError::Permanent(_)
        ));
    }

    #[test]
    fn test_retries_exhausted_keeps_source() {
        let err = TradegateError::RetriesExhausted {
            attempts: 3,
            source: Box::new(TradegateError::RateLimited("429".to_string())),
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("3 attempts"));
        assert!(err.to_string().contains("Rate limited"));
    }
}
