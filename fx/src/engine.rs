//! Main rate engine implementation.

use std::sync::Arc;

use ratecalc_common::{Currency, CurrencyPair, ValidationError};
use tracing::{debug, info, instrument};

use crate::conversion::{round_quantity, ConversionResult, OverrideAck, QUANTITY_DECIMAL_PLACES};
use crate::error::FxResult;
use crate::overrides::OverrideStore;
use crate::provider::PriceSource;

/// Converts quantities between currencies.
///
/// Precedence: same currency, then operator override, then the cross-rate
/// derived from two base-asset prices.
pub struct RateEngine {
    source: Arc<dyn PriceSource>,
    overrides: Arc<OverrideStore>,
}

impl RateEngine {
    /// Create a new engine over the given price source and override store.
    pub fn new(source: Arc<dyn PriceSource>, overrides: Arc<OverrideStore>) -> Self {
        Self { source, overrides }
    }

    /// Convert `quantity` units of `from` into `to`.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn get_rate(&self, from: &str, to: &str, quantity: u64) -> FxResult<ConversionResult> {
        info!("Fetching rate");
        let pair = CurrencyPair::new(Currency::new(from), Currency::new(to));
        let quantity = quantity as f64;

        if pair.is_identity() {
            debug!(currency = %pair.quote, "Same currency, returning quantity unchanged");
            return Ok(ConversionResult::new(pair.quote, quantity));
        }

        if let Some(rate) = self.overrides.get(&pair.key()) {
            info!(pair = %pair, rate, "Using fx rate override");
            return Ok(ConversionResult::new(pair.quote, rate * quantity));
        }

        let from_price = self.source.get_currency_price(&pair.base).await?;
        let to_price = self.source.get_currency_price(&pair.quote).await?;

        let converted = round_quantity((to_price / from_price) * quantity, QUANTITY_DECIMAL_PLACES);

        info!(
            pair = %pair,
            from_price,
            to_price,
            converted,
            "Conversion completed"
        );

        Ok(ConversionResult::new(pair.quote, converted))
    }

    /// Pin a fixed rate for a pair.
    #[instrument(skip(self, pair), fields(pair = %pair))]
    pub fn set_override(&self, pair: &CurrencyPair, rate: f64) -> FxResult<OverrideAck> {
        let key = pair.key();

        if !rate.is_finite() || rate <= 0.0 {
            return Err(ValidationError::InvalidRate { pair: key, rate }.into());
        }

        self.overrides.set(key.clone(), rate);
        Ok(OverrideAck::ok(format!("Fx rate for {key} set to {rate}")))
    }

    /// Remove the fixed rate for a pair, if one is set.
    #[instrument(skip(self, pair), fields(pair = %pair))]
    pub fn clear_override(&self, pair: &CurrencyPair) -> OverrideAck {
        let key = pair.key();
        self.overrides.clear(&key);
        OverrideAck::ok(format!("Fx rate set for {key} is cleared"))
    }

    /// Current override for a pair.
    pub fn override_for(&self, pair: &CurrencyPair) -> Option<f64> {
        self.overrides.get(&pair.key())
    }
}
