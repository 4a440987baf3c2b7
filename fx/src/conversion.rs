//! Conversion result types and rounding.

use ratecalc_common::Currency;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Decimal places applied to cross-rate conversions.
pub const QUANTITY_DECIMAL_PLACES: u32 = 2;

/// Status code carried by successful override acknowledgements.
pub const ACK_OK: u16 = 200;

/// Outcome of a conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Target currency.
    pub currency: Currency,
    /// Converted quantity in the target currency.
    pub quantity: f64,
}

impl ConversionResult {
    pub fn new(currency: Currency, quantity: f64) -> Self {
        Self { currency, quantity }
    }
}

/// Acknowledgement for override set/clear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideAck {
    pub code: u16,
    pub status: String,
}

impl OverrideAck {
    pub fn ok(status: impl Into<String>) -> Self {
        Self {
            code: ACK_OK,
            status: status.into(),
        }
    }
}

/// Finite `f64` values at or above this magnitude (2^53) are integral.
const INTEGRAL_F64_MAGNITUDE: f64 = 9_007_199_254_740_992.0;

/// Round to `dp` decimal places, ties to even.
///
/// Rounding works on the exact binary value of `value`, so `2675.0 / 1000.0`
/// (stored just below 2.675) becomes `2.67`, while exact ties such as `0.125`
/// go to the even neighbour `0.12`. NaN and infinities are returned unchanged,
/// as are magnitudes with no fractional part to round.
pub fn round_quantity(value: f64, dp: u32) -> f64 {
    if !value.is_finite() || value.abs() >= INTEGRAL_F64_MAGNITUDE {
        return value;
    }

    match Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_f64())
    {
        Some(rounded) => rounded,
        None => {
            warn!(value, dp, "Value has no decimal form, returning it unrounded");
            value
        }
    }
}
