//! RateCalc Server
//!
//! HTTP front end for the FX rate engine: wires the price cache, upstream
//! provider and override store together and exposes them over REST.

pub mod config;
pub mod routes;

use std::sync::Arc;

use anyhow::Context;
use ratecalc_fx::{BinanceConfig, BinancePriceProvider, OverrideStore, PriceCache, RateEngine};
use tracing::info;

pub use config::ServerConfig;
pub use routes::{create_router, ApiError, AppState};

/// Build the engine and its collaborators from configuration.
pub fn build_state(config: &ServerConfig) -> anyhow::Result<Arc<AppState>> {
    let cache = Arc::new(PriceCache::new(config.cache_ttl()));
    info!(ttl_seconds = cache.ttl().num_seconds(), "Price cache ready");

    let provider = BinancePriceProvider::new(BinanceConfig::from(&config.upstream), cache)
        .context("failed to build upstream HTTP client")?;

    let engine = RateEngine::new(Arc::new(provider), Arc::new(OverrideStore::new()));

    Ok(Arc::new(AppState {
        engine: Arc::new(engine),
    }))
}
