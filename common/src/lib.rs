//! RateCalc Common Types
//!
//! Shared types used across the RateCalc workspace: currency codes, currency
//! pairs, validation errors and the clock abstraction used for TTL checks.

pub mod currency;
pub mod error;
pub mod time;

pub use currency::*;
pub use error::*;
pub use time::*;
