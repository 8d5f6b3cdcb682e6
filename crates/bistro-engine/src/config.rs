//! # Engine Configuration
//!
//! Settings the services apply to every order and payment they create.
//!
//! ## Example
//! ```rust
//! use bistro_engine::EngineConfig;
//!
//! let config = EngineConfig::default().order_fee_cents(500);
//! assert_eq!(config.currency, "BRL");
//! assert_eq!(config.order_fee.cents(), 500);
//! ```

use bistro_core::validation::{validate_currency, validate_price_cents};
use bistro_core::{Money, ValidationError, DEFAULT_CURRENCY};
use serde::{Deserialize, Serialize};

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Currency stamped on every payment.
    /// Default: "BRL"
    pub currency: String,

    /// Flat fee added to every new draft.
    /// Default: 0
    pub order_fee: Money,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            currency: DEFAULT_CURRENCY.to_string(),
            order_fee: Money::zero(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the payment currency.
    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = code.into();
        self
    }

    /// Sets the per-order fee.
    pub fn order_fee_cents(mut self, cents: i64) -> Self {
        self.order_fee = Money::from_cents(cents);
        self
    }

    /// Rejects a malformed currency code or a negative fee.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_currency(&self.currency)?;
        validate_price_cents("order_fee", self.order_fee.cents())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.currency, "BRL");
        assert!(config.order_fee.is_zero());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(EngineConfig::new().currency("real").validate().is_err());
        assert!(EngineConfig::new().order_fee_cents(-1).validate().is_err());
        assert!(EngineConfig::new().currency("USD").order_fee_cents(250).validate().is_ok());
    }
}
