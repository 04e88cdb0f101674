use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::market::Symbol;
use super::mode::PriceType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn opposite(&self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Market,
    Limit,
    StopMarket,
    StopLimit,
}

impl OrderType {
    pub fn is_stop(&self) -> bool {
        matches!(self, OrderType::StopMarket | OrderType::StopLimit)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => write!(f, "market"),
            OrderType::Limit => write!(f, "limit"),
            OrderType::StopMarket => write!(f, "stop_market"),
            OrderType::StopLimit => write!(f, "stop_limit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    GoodTillCanceled,
    ImmediateOrCancel,
    FillOrKill,
    PostOnly,
}

impl TimeInForce {
    /// Wire abbreviation shared by most exchanges.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::GoodTillCanceled => "GTC",
            TimeInForce::ImmediateOrCancel => "IOC",
            TimeInForce::FillOrKill => "FOK",
            TimeInForce::PostOnly => "PO",
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Logical description of a desired order, independent of any exchange
/// wire format. Built once per trading decision and discarded after the
/// request parameters are produced; constructors consume `self`, there
/// are no mutators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub symbol: Symbol,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub leverage: f64,
    pub reduce_only: bool,
    pub time_in_force: TimeInForce,
}

impl OrderIntent {
    pub fn market(symbol: Symbol, side: OrderSide, quantity: Decimal) -> Self {
        Self {
            symbol,
            side,
            order_type: OrderType::Market,
            quantity,
            price: None,
            stop_price: None,
            leverage: 1.0,
            reduce_only: false,
            time_in_force: TimeInForce::ImmediateOrCancel,
        }
    }

    pub fn limit(symbol: Symbol, side: OrderSide, quantity: Decimal, price: Decimal) -> Self {
        Self {
            symbol,
            side,
            order_type: OrderType::Limit,
            quantity,
            price: Some(price),
            stop_price: None,
            leverage: 1.0,
            reduce_only: false,
            time_in_force: TimeInForce::GoodTillCanceled,
        }
    }

    pub fn with_leverage(mut self, leverage: f64) -> Self {
        self.leverage = leverage;
        self
    }

    pub fn with_stop_price(mut self, stop_price: Decimal) -> Self {
        self.stop_price = Some(stop_price);
        self
    }

    pub fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = tif;
        self
    }

    pub fn reduce_only(mut self) -> Self {
        self.reduce_only = true;
        self
    }
}

/// Exchange-specific request fields produced from an [`OrderIntent`] and a
/// capability table. Keys carry no business semantics; the order-execution
/// engine passes the map through to the transport untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestParams(Map<String, Value>);

impl RequestParams {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn insert_str(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.insert(key, Value::String(value.into()));
    }

    pub fn insert_bool(&mut self, key: impl Into<String>, value: bool) {
        self.insert(key, Value::Bool(value));
    }

    pub fn insert_i64(&mut self, key: impl Into<String>, value: i64) {
        self.insert(key, Value::from(value));
    }

    pub fn insert_f64(&mut self, key: impl Into<String>, value: f64) {
        self.insert(key, Value::from(value));
    }

    /// Decimals go out as strings so the exchange never sees a rounded
    /// float.
    pub fn insert_decimal(&mut self, key: impl Into<String>, value: Decimal) {
        self.insert(key, Value::String(value.to_string()));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn merge(&mut self, other: RequestParams) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for RequestParams {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Stop order description handed to the stop-parameter builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopIntent {
    pub symbol: Symbol,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub stop_price: Decimal,
    pub price_type: PriceType,
}
