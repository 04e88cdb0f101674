use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use tradegate_core::prelude::*;

/// A single capability entry. Exchanges describe themselves with a mix of
/// flags, limits, wire field names and value mappings, so the table is
/// heterogeneous by design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CapabilityValue {
    Bool(bool),
    Int(i64),
    Str(String),
    StrList(Vec<String>),
    StrMap(HashMap<String, String>),
    PriceTypeMap(HashMap<PriceType, String>),
}

impl From<bool> for CapabilityValue {
    fn from(v: bool) -> Self {
        CapabilityValue::Bool(v)
    }
}

impl From<i64> for CapabilityValue {
    fn from(v: i64) -> Self {
        CapabilityValue::Int(v)
    }
}

impl From<&str> for CapabilityValue {
    fn from(v: &str) -> Self {
        CapabilityValue::Str(v.to_string())
    }
}

/// Per-exchange feature flags merged from a base (spot) table and a
/// trading-mode-specific override table. Built once at adapter
/// initialization and read-only afterwards; safe to share behind `Arc`.
///
/// Lookup rule: the mode-specific table wins on key collision when the
/// active mode matches; otherwise the base value is served.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityTable {
    base: HashMap<String, CapabilityValue>,
    futures: HashMap<String, CapabilityValue>,
    mode: TradingMode,
}

impl CapabilityTable {
    pub fn builder() -> CapabilityTableBuilder {
        CapabilityTableBuilder::default()
    }

    pub fn trading_mode(&self) -> TradingMode {
        self.mode
    }

    pub fn get(&self, feature: &str) -> Result<&CapabilityValue> {
        self.lookup(feature)
            .ok_or_else(|| TradegateError::UnsupportedFeature(feature.to_string()))
    }

    /// Like [`get`](Self::get) but with a caller-supplied default instead
    /// of an error.
    pub fn get_or<'a>(&'a self, feature: &str, default: &'a CapabilityValue) -> &'a CapabilityValue {
        self.lookup(feature).unwrap_or(default)
    }

    pub fn has(&self, feature: &str) -> bool {
        self.lookup(feature).is_some()
    }

    pub fn get_bool(&self, feature: &str) -> Result<bool> {
        match self.get(feature)? {
            CapabilityValue::Bool(v) => Ok(*v),
            _ => Err(self.type_mismatch(feature, "bool")),
        }
    }

    /// Boolean flag lookup where absence means "off".
    pub fn flag(&self, feature: &str) -> bool {
        matches!(self.lookup(feature), Some(CapabilityValue::Bool(true)))
    }

    pub fn get_int(&self, feature: &str) -> Result<i64> {
        match self.get(feature)? {
            CapabilityValue::Int(v) => Ok(*v),
            _ => Err(self.type_mismatch(feature, "int")),
        }
    }

    pub fn get_str(&self, feature: &str) -> Result<&str> {
        match self.get(feature)? {
            CapabilityValue::Str(v) => Ok(v.as_str()),
            _ => Err(self.type_mismatch(feature, "str")),
        }
    }

    pub fn get_str_list(&self, feature: &str) -> Result<&[String]> {
        match self.get(feature)? {
            CapabilityValue::StrList(v) => Ok(v.as_slice()),
            _ => Err(self.type_mismatch(feature, "str list")),
        }
    }

    pub fn get_str_map(&self, feature: &str) -> Result<&HashMap<String, String>> {
        match self.get(feature)? {
            CapabilityValue::StrMap(v) => Ok(v),
            _ => Err(self.type_mismatch(feature, "str map")),
        }
    }

    pub fn get_price_type_map(&self, feature: &str) -> Result<&HashMap<PriceType, String>> {
        match self.get(feature)? {
            CapabilityValue::PriceTypeMap(v) => Ok(v),
            _ => Err(self.type_mismatch(feature, "price type map")),
        }
    }

    fn lookup(&self, feature: &str) -> Option<&CapabilityValue> {
        if self.mode == TradingMode::Futures {
            if let Some(value) = self.futures.get(feature) {
                return Some(value);
            }
        }
        self.base.get(feature)
    }

    fn type_mismatch(&self, feature: &str, expected: &str) -> TradegateError {
        TradegateError::UnsupportedFeature(format!(
            "{} is not a {} capability",
            feature, expected
        ))
    }
}

#[derive(Debug, Default)]
pub struct CapabilityTableBuilder {
    base: HashMap<String, CapabilityValue>,
    futures: HashMap<String, CapabilityValue>,
}

impl CapabilityTableBuilder {
    pub fn base(mut self, feature: impl Into<String>, value: impl Into<CapabilityValue>) -> Self {
        self.base.insert(feature.into(), value.into());
        self
    }

    pub fn futures(
        mut self,
        feature: impl Into<String>,
        value: impl Into<CapabilityValue>,
    ) -> Self {
        self.futures.insert(feature.into(), value.into());
        self
    }

    pub fn base_table(mut self, table: HashMap<String, CapabilityValue>) -> Self {
        self.base.extend(table);
        self
    }

    pub fn futures_table(mut self, table: HashMap<String, CapabilityValue>) -> Self {
        self.futures.extend(table);
        self
    }

    pub fn build(self, mode: TradingMode) -> CapabilityTable {
        CapabilityTable {
            base: self.base,
            futures: self.futures,
            mode,
        }
    }
}
