use tradegate_core::prelude::*;

/// How an exchange spells a trading pair on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolFormat {
    Slash,
    Dash,
    Underscore,
    Concatenated,
}

pub fn format_symbol_for_exchange(symbol: &Symbol, format: SymbolFormat) -> String {
    match format {
        SymbolFormat::Slash => format!("{}/{}", symbol.base, symbol.quote),
        SymbolFormat::Dash => format!("{}-{}", symbol.base, symbol.quote),
        SymbolFormat::Underscore => format!("{}_{}", symbol.base, symbol.quote),
        SymbolFormat::Concatenated => format!("{}{}", symbol.base, symbol.quote),
    }
}

pub fn parse_symbol_from_string(symbol_str: &str) -> Result<Symbol> {
    for separator in &["/", "-", "_"] {
        if let Some(pos) = symbol_str.find(separator) {
            let base = &symbol_str[..pos];
            let quote = &symbol_str[pos + separator.len()..];
            return Ok(Symbol::new(base, quote));
        }
    }

    // Concatenated symbols: try common quote currencies
    for quote in &["USDT", "USDC", "USD", "BTC", "ETH"] {
        if symbol_str.ends_with(quote) && symbol_str.len() > quote.len() {
            let base = &symbol_str[..symbol_str.len() - quote.len()];
            return Ok(Symbol::new(base, *quote));
        }
    }

    Err(TradegateError::InvalidData(format!(
        "Unable to parse symbol: {}",
        symbol_str
    )))
}
