//! FX engine error types.

use ratecalc_common::{Currency, ValidationError};
use thiserror::Error;

/// Errors that can occur in the FX engine.
#[derive(Debug, Error)]
pub enum FxError {
    /// Caller supplied a value the engine cannot accept.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Upstream returned a non-success status or could not be reached.
    #[error("Failed to get currency price for {currency}: {reason}")]
    Upstream { currency: Currency, reason: String },

    /// Upstream answered but the payload carried no usable price.
    #[error("Invalid price payload for {currency}: {reason}")]
    Parse { currency: Currency, reason: String },
}

impl FxError {
    pub(crate) fn upstream(currency: &Currency, reason: impl Into<String>) -> Self {
        Self::Upstream {
            currency: currency.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(currency: &Currency, reason: impl Into<String>) -> Self {
        Self::Parse {
            currency: currency.clone(),
            reason: reason.into(),
        }
    }

    /// Whether the failure is rooted in caller input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Currency the failure is attributed to, if any.
    pub fn currency(&self) -> Option<&Currency> {
        match self {
            Self::Upstream { currency, .. } | Self::Parse { currency, .. } => Some(currency),
            Self::Validation(_) => None,
        }
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
