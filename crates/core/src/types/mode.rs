use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradingMode {
    Spot,
    Margin,
    Futures,
}

impl TradingMode {
    pub fn is_spot(&self) -> bool {
        *self == TradingMode::Spot
    }

    /// Derivatives modes need leverage preparation and position handling.
    pub fn is_derivatives(&self) -> bool {
        !self.is_spot()
    }
}

impl fmt::Display for TradingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradingMode::Spot => write!(f, "spot"),
            TradingMode::Margin => write!(f, "margin"),
            TradingMode::Futures => write!(f, "futures"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginMode {
    Cross,
    Isolated,
}

impl fmt::Display for MarginMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginMode::Cross => write!(f, "cross"),
            MarginMode::Isolated => write!(f, "isolated"),
        }
    }
}

/// Position accounting on a derivatives exchange. One-way keeps a single
/// net position per symbol; hedge keeps separate long and short legs and
/// needs a side-dependent position index on orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionMode {
    OneWay,
    Hedge,
}

impl Default for PositionMode {
    fn default() -> Self {
        PositionMode::OneWay
    }
}

impl fmt::Display for PositionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionMode::OneWay => write!(f, "one_way"),
            PositionMode::Hedge => write!(f, "hedge"),
        }
    }
}

/// Which price feed a stop order triggers on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    Last,
    Mark,
    Index,
}

impl Default for PriceType {
    fn default() -> Self {
        PriceType::Last
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceType::Last => write!(f, "last"),
            PriceType::Mark => write!(f, "mark"),
            PriceType::Index => write!(f, "index"),
        }
    }
}
