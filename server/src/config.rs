//! Server configuration.

use std::time::Duration;

use ratecalc_fx::BinanceConfig;

/// Longest accepted cache TTL (one year).
pub const MAX_CACHE_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Upstream price API configuration.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the price API.
    pub base_url: String,
    /// Timeout for a single price request.
    pub timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        let binance = BinanceConfig::default();
        Self {
            base_url: binance.base_url,
            timeout: binance.timeout,
        }
    }
}

impl From<&UpstreamConfig> for BinanceConfig {
    fn from(config: &UpstreamConfig) -> Self {
        BinanceConfig {
            base_url: config.base_url.clone(),
            timeout: config.timeout,
        }
    }
}

/// Main server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub listen_port: u16,
    /// Upstream configuration.
    pub upstream: UpstreamConfig,
    /// Price cache TTL in seconds.
    pub cache_ttl_seconds: u64,
    /// Log level used when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 8000,
            upstream: UpstreamConfig::default(),
            cache_ttl_seconds: 60,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// `BINANCE_BASE_URL` and `CACHE_TTL_SECONDS` are required.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.upstream.base_url =
            lookup("BINANCE_BASE_URL").ok_or("BINANCE_BASE_URL must be set")?;

        let ttl = lookup("CACHE_TTL_SECONDS").ok_or("CACHE_TTL_SECONDS must be set")?;
        config.cache_ttl_seconds = ttl
            .trim()
            .parse()
            .map_err(|_| format!("CACHE_TTL_SECONDS must be a non-negative integer, got {ttl:?}"))?;

        if let Some(addr) = lookup("LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Some(port) = lookup("LISTEN_PORT") {
            config.listen_port = port
                .parse()
                .map_err(|_| format!("LISTEN_PORT must be a port number, got {port:?}"))?;
        }

        if let Some(secs) = lookup("UPSTREAM_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| format!("UPSTREAM_TIMEOUT_SECS must be an integer, got {secs:?}"))?;
            config.upstream.timeout = Duration::from_secs(secs);
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level;
        }

        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_port == 0 {
            return Err("Listen port cannot be 0".to_string());
        }

        let url = self.upstream.base_url.trim();
        let host = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .ok_or_else(|| format!("Upstream base URL must be http(s), got {url:?}"))?;
        if host.trim_matches('/').is_empty() {
            return Err("Upstream base URL has no host".to_string());
        }

        if self.upstream.timeout.is_zero() {
            return Err("Upstream timeout cannot be 0".to_string());
        }

        if self.cache_ttl_seconds > MAX_CACHE_TTL_SECONDS {
            return Err(format!(
                "Cache TTL cannot exceed {MAX_CACHE_TTL_SECONDS} seconds"
            ));
        }

        Ok(())
    }

    /// Cache TTL as a chrono duration.
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_seconds.min(MAX_CACHE_TTL_SECONDS) as i64)
    }
}
