//! Currency codes and currency pairs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Length of an override key (two concatenated 3-letter codes).
pub const PAIR_KEY_LEN: usize = 6;

/// Currency code, always stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Common currencies
    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn eur() -> Self {
        Self::new("EUR")
    }

    pub fn gbp() -> Self {
        Self::new("GBP")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Currency {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A currency pair for FX operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Currency being converted from.
    pub base: Currency,
    /// Currency being converted to.
    pub quote: Currency,
}

impl CurrencyPair {
    /// Create a new currency pair.
    pub fn new(base: Currency, quote: Currency) -> Self {
        Self { base, quote }
    }

    /// Parse a pair from its key form.
    ///
    /// Accepts `USDEUR` as well as separated or lowercase variants such as
    /// `usd/eur`. After stripping `/` the key must be exactly six ASCII letters.
    pub fn from_key(raw: &str) -> Result<Self, ValidationError> {
        let key: String = raw.chars().filter(|c| *c != '/').collect::<String>().to_uppercase();

        if key.len() != PAIR_KEY_LEN || !key.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidPairKey(raw.to_string()));
        }

        let (base, quote) = key.split_at(3);
        Ok(Self::new(Currency::new(base), Currency::new(quote)))
    }

    /// Override key: base and quote codes concatenated with no separator.
    pub fn key(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }

    /// Whether both sides are the same currency.
    pub fn is_identity(&self) -> bool {
        self.base == self.quote
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
