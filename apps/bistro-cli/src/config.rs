//! CLI configuration.
//!
//! Loaded from environment variables with fallback to defaults.

use std::env;
use std::path::PathBuf;

use bistro_core::DEFAULT_CURRENCY;
use bistro_engine::EngineConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    /// SQLite file (`BISTRO_DATABASE_PATH`, default `./bistro_dev.db`)
    pub database_path: PathBuf,

    /// Payment currency (`BISTRO_CURRENCY`, default `BRL`)
    pub currency: String,

    /// Flat fee per order in cents (`BISTRO_ORDER_FEE_CENTS`, default 0)
    pub order_fee_cents: i64,

    /// Load the demo catalog before running (`BISTRO_SEED`, default true)
    pub seed: bool,

    /// Tracing filter (`RUST_LOG`, default `info`)
    pub log_filter: String,
}

impl CliConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`CliConfig::load`] with an injectable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = CliConfig {
            database_path: lookup("BISTRO_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./bistro_dev.db")),

            currency: lookup("BISTRO_CURRENCY")
                .map(|c| c.trim().to_uppercase())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),

            order_fee_cents: lookup("BISTRO_ORDER_FEE_CENTS")
                .unwrap_or_else(|| "0".to_string())
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BISTRO_ORDER_FEE_CENTS".to_string()))?,

            seed: match lookup("BISTRO_SEED") {
                None => true,
                Some(raw) => parse_flag(&raw)
                    .ok_or_else(|| ConfigError::InvalidValue("BISTRO_SEED".to_string()))?,
            },

            log_filter: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        };

        config
            .engine()
            .validate()
            .map_err(|e| ConfigError::Rejected(e.to_string()))?;

        Ok(config)
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig::new()
            .currency(self.currency.clone())
            .order_fee_cents(self.order_fee_cents)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Rejected configuration: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<CliConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CliConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.database_path, PathBuf::from("./bistro_dev.db"));
        assert_eq!(config.currency, "BRL");
        assert_eq!(config.order_fee_cents, 0);
        assert!(config.seed);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("BISTRO_DATABASE_PATH", "/tmp/shop.db"),
            ("BISTRO_CURRENCY", " usd "),
            ("BISTRO_ORDER_FEE_CENTS", "250"),
            ("BISTRO_SEED", "off"),
        ])
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.currency, "USD");
        assert!(!config.seed);

        let engine = config.engine();
        assert_eq!(engine.order_fee.cents(), 250);
        assert_eq!(engine.currency, "USD");
    }

    #[test]
    fn test_bad_values() {
        assert!(matches!(
            load(&[("BISTRO_ORDER_FEE_CENTS", "ten")]),
            Err(ConfigError::InvalidValue(key)) if key == "BISTRO_ORDER_FEE_CENTS"
        ));
        assert!(matches!(
            load(&[("BISTRO_SEED", "maybe")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            load(&[("BISTRO_ORDER_FEE_CENTS", "-1")]),
            Err(ConfigError::Rejected(_))
        ));
        assert!(matches!(
            load(&[("BISTRO_CURRENCY", "reais")]),
            Err(ConfigError::Rejected(_))
        ));
    }
}
