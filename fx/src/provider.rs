//! Price source trait and the Binance ticker implementation.

use async_trait::async_trait;
use ratecalc_common::Currency;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cache::SharedPriceCache;
use crate::error::{FxError, FxResult};

/// Asset every currency is priced against.
pub const BASE_ASSET: &str = "BTC";

/// Currency whose upstream pair is quoted in the USD stablecoin.
pub const STABLECOIN_CURRENCY: &str = "USD";

/// Suffix turning `BTCUSD` into the stablecoin pair `BTCUSDT`.
pub const STABLECOIN_SUFFIX: &str = "T";

/// Path of the ticker price endpoint.
pub const TICKER_PRICE_PATH: &str = "/api/v3/ticker/price";

/// Trait for sources of base-asset prices.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Get the source name.
    fn name(&self) -> &str;

    /// Price of one unit of the base asset in `currency`.
    async fn get_currency_price(&self, currency: &Currency) -> FxResult<f64>;
}

/// Configuration for the Binance price provider.
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    /// Base URL of the REST API.
    pub base_url: String,
    /// Timeout for a single ticker request.
    pub timeout: Duration,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Ticker symbol for a currency, e.g. `BTCGBP`, or `BTCUSDT` for USD.
pub fn ticker_symbol(currency: &Currency) -> String {
    if currency.code() == STABLECOIN_CURRENCY {
        format!("{BASE_ASSET}{currency}{STABLECOIN_SUFFIX}")
    } else {
        format!("{BASE_ASSET}{currency}")
    }
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: Option<PriceField>,
}

/// The ticker endpoint quotes prices as strings; plain numbers are accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceField {
    Text(String),
    Number(f64),
}

fn parse_price(currency: &Currency, body: &str) -> FxResult<f64> {
    let ticker: TickerPrice = serde_json::from_str(body)
        .map_err(|e| FxError::parse(currency, format!("malformed JSON: {e}")))?;

    let price = match ticker.price {
        Some(PriceField::Number(n)) => n,
        Some(PriceField::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| FxError::parse(currency, format!("price {s:?} is not a number")))?,
        None => return Err(FxError::parse(currency, "missing price field")),
    };

    if !price.is_finite() || price <= 0.0 {
        return Err(FxError::parse(
            currency,
            format!("price {price} is not a positive number"),
        ));
    }

    Ok(price)
}

/// Fetches prices from the Binance ticker endpoint, caching each one.
pub struct BinancePriceProvider {
    client: reqwest::Client,
    endpoint: String,
    cache: SharedPriceCache,
}

impl BinancePriceProvider {
    /// Create a provider with its own HTTP client.
    pub fn new(config: BinanceConfig, cache: SharedPriceCache) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(client, &config.base_url, cache))
    }

    /// Create a provider using an existing HTTP client.
    pub fn with_client(client: reqwest::Client, base_url: &str, cache: SharedPriceCache) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), TICKER_PRICE_PATH),
            cache,
        }
    }

    /// Full URL of the ticker endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch(&self, currency: &Currency) -> FxResult<f64> {
        let symbol = ticker_symbol(currency);
        info!(currency = %currency, symbol = %symbol, "Fetching currency price from upstream");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("symbol", symbol.as_str())])
            .send()
            .await
            .map_err(|e| {
                warn!(currency = %currency, error = %e, "Upstream request failed");
                FxError::upstream(currency, format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(currency = %currency, status = %status, "Upstream returned error status");
            return Err(FxError::upstream(
                currency,
                format!("upstream returned {status}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FxError::upstream(currency, format!("failed to read body: {e}")))?;

        parse_price(currency, &body)
    }
}

#[async_trait]
impl PriceSource for BinancePriceProvider {
    fn name(&self) -> &str {
        "BINANCE"
    }

    async fn get_currency_price(&self, currency: &Currency) -> FxResult<f64> {
        if let Some(cached) = self.cache.get(currency.code()) {
            debug!(currency = %currency, price = cached, "Using cached currency price");
            return Ok(cached);
        }

        let price = self.fetch(currency).await?;
        self.cache.set(currency.code(), price);

        info!(currency = %currency, price, "Currency price from upstream");
        Ok(price)
    }
}

/// Mock price source for testing.
///
/// Answers from a scripted table and records every requested currency in
/// call order.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockPriceSource {
    name: String,
    prices: dashmap::DashMap<Currency, f64>,
    failing: dashmap::DashMap<Currency, String>,
    calls: parking_lot::Mutex<Vec<Currency>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockPriceSource {
    /// Create a new mock source.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prices: dashmap::DashMap::new(),
            failing: dashmap::DashMap::new(),
            calls: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Set the price returned for a currency.
    pub fn set_price(&self, currency: impl Into<Currency>, price: f64) {
        self.prices.insert(currency.into(), price);
    }

    /// Make every request for a currency fail with an upstream error.
    pub fn fail_with(&self, currency: impl Into<Currency>, reason: impl Into<String>) {
        self.failing.insert(currency.into(), reason.into());
    }

    /// Currencies requested so far, in order.
    pub fn calls(&self) -> Vec<Currency> {
        self.calls.lock().clone()
    }

    /// Number of requests made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl PriceSource for MockPriceSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_currency_price(&self, currency: &Currency) -> FxResult<f64> {
        self.calls.lock().push(currency.clone());

        if let Some(reason) = self.failing.get(currency) {
            return Err(FxError::upstream(currency, reason.value().clone()));
        }

        self.prices
            .get(currency)
            .map(|p| *p)
            .ok_or_else(|| FxError::upstream(currency, "no price scripted"))
    }
}
