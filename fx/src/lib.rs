//! RateCalc FX Engine
//!
//! Converts a quantity between two currencies by deriving a cross-rate from
//! two prices quoted against a common base asset, unless an operator has
//! pinned a fixed rate for the pair.
//!
//! # Features
//!
//! - Upstream price fetching with a TTL cache in front of it
//! - Operator overrides that take precedence over computed rates
//! - Quantity-preserving identity conversion
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use chrono::Duration;
//! use ratecalc_fx::{BinanceConfig, BinancePriceProvider, OverrideStore, PriceCache, RateEngine};
//!
//! let cache = Arc::new(PriceCache::new(Duration::seconds(60)));
//! let provider = BinancePriceProvider::new(BinanceConfig::default(), cache)?;
//! let engine = RateEngine::new(Arc::new(provider), Arc::new(OverrideStore::new()));
//!
//! let result = engine.get_rate("usd", "gbp", 1000).await?;
//! ```

pub mod cache;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod overrides;
pub mod provider;

pub use cache::{PriceCache, SharedPriceCache};
pub use conversion::{ConversionResult, OverrideAck};
pub use engine::RateEngine;
pub use error::{FxError, FxResult};
pub use overrides::OverrideStore;
pub use provider::{BinanceConfig, BinancePriceProvider, PriceSource};

#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockPriceSource;
