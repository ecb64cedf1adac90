//! Assembler tuning knobs.

use crate::ledger::utxo::LOVELACE_PER_ADA;
use aftermarket_derive::Error;
use std::env;

/// Overrides [`AssemblerConfig::fee_buffer`].
pub const FEE_BUFFER_ENV: &str = "AFTERMARKET_FEE_BUFFER";

/// Overrides [`AssemblerConfig::low_balance_threshold`].
pub const LOW_BALANCE_ENV: &str = "AFTERMARKET_LOW_BALANCE";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must be a lovelace amount, found {value:?}")]
    InvalidAmount { var: &'static str, value: String },
}

/// Knobs applied by the assembler to every build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerConfig {
    /// Lovelace added on top of the provider's fee estimate.
    pub fee_buffer: u64,
    /// Spendable lovelace below which a warning is logged.
    pub low_balance_threshold: u64,
    /// Whether the wallet is asked for a partial signature.
    pub partial_sign: bool,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            fee_buffer: LOVELACE_PER_ADA,
            low_balance_threshold: 5 * LOVELACE_PER_ADA,
            partial_sign: true,
        }
    }
}

impl AssemblerConfig {
    /// Defaults overridden by [`FEE_BUFFER_ENV`] and [`LOW_BALANCE_ENV`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = lookup(FEE_BUFFER_ENV) {
            config.fee_buffer = parse_amount(FEE_BUFFER_ENV, &value)?;
        }
        if let Some(value) = lookup(LOW_BALANCE_ENV) {
            config.low_balance_threshold = parse_amount(LOW_BALANCE_ENV, &value)?;
        }
        Ok(config)
    }
}

fn parse_amount(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidAmount {
            var,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AssemblerConfig::default();
        assert_eq!(config.fee_buffer, 1_000_000);
        assert_eq!(config.low_balance_threshold, 5_000_000);
        assert!(config.partial_sign);
    }

    #[test]
    fn overrides_from_lookup() {
        let config = AssemblerConfig::from_lookup(|var| match var {
            FEE_BUFFER_ENV => Some("250000".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.fee_buffer, 250_000);
        assert_eq!(config.low_balance_threshold, 5_000_000);
    }

    #[test]
    fn rejects_non_numeric_override() {
        let err = AssemblerConfig::from_lookup(|var| match var {
            LOW_BALANCE_ENV => Some("5 ADA".into()),
            _ => None,
        })
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidAmount {
                var: LOW_BALANCE_ENV,
                value: "5 ADA".into(),
            }
        );
    }
}
