//! Prelude module for tradegate-engine
//!
//! Re-exports commonly used types and traits

pub use crate::adapter::{validate_mode_pair, AdapterCore, ExchangeAdapter};
pub use crate::capability::{CapabilityTable, CapabilityTableBuilder, CapabilityValue};
pub use crate::leverage::LeveragePreparer;
pub use crate::normalizer::{format_symbol_for_exchange, parse_symbol_from_string, SymbolFormat};
pub use crate::params::{DefaultShaper, ParamBuilder, ParamShaper, ShapeContext};
pub use crate::rate_limiter::{RateLimiter, TokenBucket};
pub use crate::retry::{with_retry, RetryPolicy};
pub use crate::transport::{
    classify_transport_error, default_market_type, ExchangeTransport, RestTransport,
    TransportEndpoints,
};

// Re-export common types from core
pub use tradegate_core::prelude::*;
