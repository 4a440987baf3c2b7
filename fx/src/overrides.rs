//! Operator-set fixed rates per currency pair.

use dashmap::DashMap;
use tracing::{debug, info};

/// Store of fixed rates keyed by pair key (`USDEUR`).
///
/// Keys are compared exactly as given. Callers are expected to pass the
/// uppercase key produced by [`ratecalc_common::CurrencyPair::key`].
/// Entries never expire.
#[derive(Debug, Default)]
pub struct OverrideStore {
    rates: DashMap<String, f64>,
}

impl OverrideStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace the rate for a pair key.
    pub fn set(&self, key: impl Into<String>, rate: f64) {
        let key = key.into();
        info!(pair = %key, rate, "Setting fx rate override");
        self.rates.insert(key, rate);
    }

    /// Get the override for a pair key.
    pub fn get(&self, key: &str) -> Option<f64> {
        let rate = self.rates.get(key).map(|r| *r);
        debug!(pair = key, found = rate.is_some(), "Looked up fx rate override");
        rate
    }

    /// Remove the override for a pair key. Absent keys are ignored.
    pub fn clear(&self, key: &str) {
        let removed = self.rates.remove(key).is_some();
        info!(pair = key, removed, "Cleared fx rate override");
    }

    /// Number of overrides currently set.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
