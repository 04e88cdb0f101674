use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExchangeId {
    Bitget,
    Bybit,
    Custom(String),
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeId::Bitget => write!(f, "bitget"),
            ExchangeId::Bybit => write!(f, "bybit"),
            ExchangeId::Custom(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for ExchangeId {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "bitget" => ExchangeId::Bitget,
            "bybit" => ExchangeId::Bybit,
            name => ExchangeId::Custom(name.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeCredentials {
    pub api_key: String,
    pub secret_key: String,
    pub passphrase: Option<String>,
    pub sandbox: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimits {
    pub requests_per_second: u32,
    pub orders_per_second: u32,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            orders_per_second: 5,
        }
    }
}
