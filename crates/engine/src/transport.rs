use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

use tradegate_core::config::ExchangeSettings;
use tradegate_core::prelude::*;

use crate::rate_limiter::RateLimiter;

/// Raw outbound call surface of a multi-exchange client. The engine only
/// ever talks to an exchange through this seam, so tests and dry-run
/// environments can substitute it wholesale.
///
/// `fetch_positions` takes the symbol filter literally: `None` requests
/// positions for all symbols, `Some(symbols)` requests exactly those.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangeTransport: Send + Sync {
    async fn set_leverage(&self, symbol: &str, leverage: f64, params: RequestParams)
        -> Result<Value>;

    async fn set_margin_mode(
        &self,
        symbol: &str,
        margin_mode: MarginMode,
        params: RequestParams,
    ) -> Result<Value>;

    async fn create_order(&self, symbol: &str, params: RequestParams) -> Result<Value>;

    async fn fetch_positions(&self, symbols: Option<Vec<String>>) -> Result<Value>;
}

/// Request paths for the calls the engine issues. The concrete values are
/// exchange data and come from the adapter crates.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportEndpoints {
    pub set_leverage: String,
    pub set_margin_mode: String,
    pub create_order: String,
    pub positions: String,
}

impl Default for TransportEndpoints {
    fn default() -> Self {
        Self {
            set_leverage: "/account/leverage".to_string(),
            set_margin_mode: "/account/margin-mode".to_string(),
            create_order: "/trade/order".to_string(),
            positions: "/position/list".to_string(),
        }
    }
}

/// Default market type the underlying client is pointed at, derived from
/// the trading mode the adapter was constructed for.
pub fn default_market_type(mode: TradingMode) -> &'static str {
    match mode {
        TradingMode::Spot => "spot",
        TradingMode::Margin => "margin",
        TradingMode::Futures => "swap",
    }
}

/// Classify a raw reqwest error. Timeouts and connection failures are
/// worth retrying; everything else stays unclassified and therefore fatal.
pub fn classify_transport_error(e: reqwest::Error) -> TradegateError {
    if e.is_timeout() || e.is_connect() {
        TradegateError::Transient(format!("transport: {}", e))
    } else {
        TradegateError::Http(e)
    }
}

/// reqwest-backed transport with HMAC-SHA256 request signing and a
/// fixed-window rate limiter ahead of every call.
#[derive(Debug)]
pub struct RestTransport {
    client: Client,
    base_url: String,
    credentials: Option<ExchangeCredentials>,
    rate_limiter: RateLimiter,
    endpoints: TransportEndpoints,
    market_type: &'static str,
}

impl RestTransport {
    pub fn new(
        base_url: impl Into<String>,
        settings: &ExchangeSettings,
        trading_mode: TradingMode,
        endpoints: TransportEndpoints,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()
            .map_err(TradegateError::Http)?;

        let rate_limiter = RateLimiter::per_second(settings.rate_limits.requests_per_second);

        Ok(Self {
            client,
            base_url: base_url.into(),
            credentials: settings.credentials.clone(),
            rate_limiter,
            endpoints,
            market_type: default_market_type(trading_mode),
        })
    }

    pub fn market_type(&self) -> &'static str {
        self.market_type
    }

    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        query: Option<&[(String, String)]>,
        body: Option<&Value>,
    ) -> Result<Value> {
        self.rate_limiter.acquire().await;

        let url = self.build_url(endpoint, query)?;
        debug!("Making {} request to: {}", method, url);

        let mut request = self.client.request(method.clone(), &url);

        let timestamp = tradegate_core::utils::now_timestamp_ms();
        for (key, value) in self.auth_headers(&method, endpoint, body, timestamp)? {
            request = request.header(key.as_str(), value.as_str());
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(classify_transport_error)?;

        self.handle_response(response).await
    }

    fn build_url(&self, endpoint: &str, query: Option<&[(String, String)]>) -> Result<String> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint))
            .map_err(|e| TradegateError::InvalidData(format!("Invalid URL: {}", e)))?;

        if let Some(query) = query {
            for (key, value) in query {
                url.query_pairs_mut().append_pair(key, value);
            }
        }

        Ok(url.to_string())
    }

    fn auth_headers(
        &self,
        method: &Method,
        endpoint: &str,
        body: Option<&Value>,
        timestamp: u64,
    ) -> Result<Vec<(String, String)>> {
        let mut headers = Vec::new();

        let credentials = match &self.credentials {
            Some(credentials) => credentials,
            None => return Ok(headers),
        };

        headers.push(("X-API-KEY".to_string(), credentials.api_key.clone()));
        if let Some(passphrase) = &credentials.passphrase {
            headers.push(("X-PASSPHRASE".to_string(), passphrase.clone()));
        }
        headers.push(("X-TIMESTAMP".to_string(), timestamp.to_string()));

        let body_string = match body {
            Some(body) => serde_json::to_string(body).map_err(TradegateError::Json)?,
            None => String::new(),
        };

        let signature = self.sign_request(method.as_str(), endpoint, &body_string, timestamp)?;
        headers.push(("X-SIGNATURE".to_string(), signature));

        Ok(headers)
    }

    fn sign_request(
        &self,
        method: &str,
        endpoint: &str,
        payload: &str,
        timestamp: u64,
    ) -> Result<String> {
        use hmac::{Hmac, Mac};
        use sha2::Sha256;

        let credentials = self.credentials.as_ref().ok_or_else(|| {
            TradegateError::Authentication("Secret key not configured".to_string())
        })?;

        let string_to_sign = format!(
            "{}{}{}{}",
            timestamp,
            method.to_uppercase(),
            endpoint,
            payload
        );

        let mut mac = Hmac::<Sha256>::new_from_slice(credentials.secret_key.as_bytes())
            .map_err(|e| TradegateError::Authentication(format!("Invalid secret key: {}", e)))?;

        mac.update(string_to_sign.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(hex::encode(signature))
    }

    async fn handle_response(&self, response: Response) -> Result<Value> {
        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("HTTP error {}: {}", status, error_text);
            return Err(TradegateError::from_status(status.as_u16(), error_text));
        }

        let text = response.text().await.map_err(classify_transport_error)?;
        serde_json::from_str(&text).map_err(TradegateError::Json)
    }

    fn order_body(&self, symbol: &str, params: RequestParams) -> Value {
        let mut body = params.into_inner();
        body.insert("symbol".to_string(), Value::String(symbol.to_string()));
        body.insert(
            "marketType".to_string(),
            Value::String(self.market_type.to_string()),
        );
        Value::Object(body)
    }
}

#[async_trait]
impl ExchangeTransport for RestTransport {
    async fn set_leverage(
        &self,
        symbol: &str,
        leverage: f64,
        mut params: RequestParams,
    ) -> Result<Value> {
        params.insert_f64("leverage", leverage);
        let body = self.order_body(symbol, params);
        self.request(Method::POST, &self.endpoints.set_leverage, None, Some(&body))
            .await
    }

    async fn set_margin_mode(
        &self,
        symbol: &str,
        margin_mode: MarginMode,
        mut params: RequestParams,
    ) -> Result<Value> {
        params.insert_str("marginMode", margin_mode.to_string());
        let body = self.order_body(symbol, params);
        self.request(
            Method::POST,
            &self.endpoints.set_margin_mode,
            None,
            Some(&body),
        )
        .await
    }

    async fn create_order(&self, symbol: &str, params: RequestParams) -> Result<Value> {
        let body = self.order_body(symbol, params);
        self.request(Method::POST, &self.endpoints.create_order, None, Some(&body))
            .await
    }

    async fn fetch_positions(&self, symbols: Option<Vec<String>>) -> Result<Value> {
        let mut query = vec![(
            "marketType".to_string(),
            self.market_type.to_string(),
        )];
        if let Some(symbols) = symbols {
            query.push(("symbols".to_string(), symbols.join(",")));
        }
        self.request(
            Method::GET,
            &self.endpoints.positions,
            Some(&query),
            None,
        )
        .await
    }
}
