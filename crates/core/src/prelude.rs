//! Prelude module - re-exports commonly used types for convenience

pub use crate::config::{
    ExchangeSettings, MonitoringSettings, RetryConfig, TradegateConfig, TradingConfig,
};
pub use crate::error::{Result, TradegateError};
pub use crate::types::{exchange::*, market::*, mode::*, order::*};

// Re-export commonly used external types
pub use chrono::{DateTime, Utc};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
