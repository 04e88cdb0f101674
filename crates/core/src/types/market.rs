use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::mode::MarginMode;
use super::order::OrderSide;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    pub base: String,
    pub quote: String,
}

impl Symbol {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    pub fn from_pair(pair: &str) -> Option<Self> {
        let idx = pair.find('/')?;
        Some(Self::new(&pair[..idx], &pair[idx + 1..]))
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    pub fn to_pair(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// Market metadata as reported by an exchange. The contract flags mirror
/// what multi-exchange clients expose: `swap` is a perpetual contract,
/// `future` a dated delivery contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub symbol: Symbol,
    pub active: bool,
    pub spot: bool,
    pub swap: bool,
    pub future: bool,
    pub option: bool,
    /// Settlement currency for contracts (e.g. USDT), absent on spot.
    pub settle: Option<String>,
    pub contract_size: Option<Decimal>,
}

impl Market {
    pub fn spot(symbol: Symbol) -> Self {
        Self {
            symbol,
            active: true,
            spot: true,
            swap: false,
            future: false,
            option: false,
            settle: None,
            contract_size: None,
        }
    }

    pub fn swap(symbol: Symbol, settle: impl Into<String>) -> Self {
        Self {
            symbol,
            active: true,
            spot: false,
            swap: true,
            future: false,
            option: false,
            settle: Some(settle.into()),
            contract_size: Some(Decimal::ONE),
        }
    }

    pub fn delivery_future(symbol: Symbol, settle: impl Into<String>) -> Self {
        Self {
            symbol,
            active: true,
            spot: false,
            swap: false,
            future: true,
            option: false,
            settle: Some(settle.into()),
            contract_size: Some(Decimal::ONE),
        }
    }

    pub fn is_contract(&self) -> bool {
        self.swap || self.future || self.option
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

impl From<OrderSide> for PositionSide {
    fn from(side: OrderSide) -> Self {
        match side {
            OrderSide::Buy => PositionSide::Long,
            OrderSide::Sell => PositionSide::Short,
        }
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSide::Long => write!(f, "long"),
            PositionSide::Short => write!(f, "short"),
        }
    }
}

/// Normalized open-position record returned by position fetches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: Symbol,
    pub side: PositionSide,
    pub contracts: Decimal,
    pub entry_price: Option<Decimal>,
    pub liquidation_price: Option<Decimal>,
    pub leverage: Option<f64>,
    pub unrealized_pnl: Option<Decimal>,
    pub margin_mode: Option<MarginMode>,
    pub timestamp: DateTime<Utc>,
}

impl Position {
    pub fn new(symbol: Symbol, side: PositionSide, contracts: Decimal) -> Self {
        Self {
            symbol,
            side,
            contracts,
            entry_price: None,
            liquidation_price: None,
            leverage: None,
            unrealized_pnl: None,
            margin_mode: None,
            timestamp: Utc::now(),
        }
    }

    pub fn is_open(&self) -> bool {
        !self.contracts.is_zero()
    }
}
