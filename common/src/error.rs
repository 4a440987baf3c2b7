//! Validation errors for caller-supplied values.

use thiserror::Error;

/// A caller-supplied value was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Currency pair key is not two concatenated 3-letter codes.
    #[error("Invalid currency pair: {0}")]
    InvalidPairKey(String),

    /// Override rate is zero, negative or not a finite number.
    #[error("Invalid fx rate {rate} for {pair}: rate must be a positive number")]
    InvalidRate { pair: String, rate: f64 },
}
