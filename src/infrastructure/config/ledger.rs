//! Ledger arithmetic and settlement configuration.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::LedgerPolicy;
use crate::domain::money::{DEFAULT_MONEY_SCALE, DEFAULT_ODDS_SCALE};
use crate::domain::settlement::DEFAULT_FEE_RATE;
use crate::domain::{FeeMode, Precision, RemainderPolicy, SettlementPolicy};
use crate::error::{ConfigError, Result};

/// Largest money scale whose units still fit the settlement arithmetic.
pub const MAX_MONEY_SCALE: u32 = 18;

/// Largest scale a decimal can carry.
pub const MAX_ODDS_SCALE: u32 = 28;

/// `[ledger]` section of the configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Fractional digits of the smallest money unit.
    pub money_scale: u32,
    /// Fractional digits kept on locked-in odds.
    pub odds_scale: u32,
    /// Share of the total pool computed as the resolution fee.
    pub fee_rate: Decimal,
    /// Whether the fee is only reported or withheld from winners.
    pub fee_mode: FeeMode,
    /// Where the truncation residual of winner shares goes.
    pub remainder: RemainderPolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            money_scale: DEFAULT_MONEY_SCALE,
            odds_scale: DEFAULT_ODDS_SCALE,
            fee_rate: DEFAULT_FEE_RATE,
            fee_mode: FeeMode::default(),
            remainder: RemainderPolicy::default(),
        }
    }
}

impl LedgerConfig {
    /// Engine policy described by this section.
    #[must_use]
    pub fn policy(&self) -> LedgerPolicy {
        LedgerPolicy {
            precision: Precision {
                money_scale: self.money_scale,
                odds_scale: self.odds_scale,
            },
            settlement: SettlementPolicy {
                fee_rate: self.fee_rate,
                fee_mode: self.fee_mode,
                remainder: self.remainder,
            },
        }
    }

    #[allow(clippy::result_large_err)]
    pub(crate) fn validate(&self) -> Result<()> {
        if self.money_scale > MAX_MONEY_SCALE {
            return Err(ConfigError::InvalidValue {
                field: "money_scale",
                reason: format!("must be at most {MAX_MONEY_SCALE}"),
            }
            .into());
        }
        if self.odds_scale == 0 || self.odds_scale > MAX_ODDS_SCALE {
            return Err(ConfigError::InvalidValue {
                field: "odds_scale",
                reason: format!("must be between 1 and {MAX_ODDS_SCALE}"),
            }
            .into());
        }
        if self.fee_rate < Decimal::ZERO || self.fee_rate >= Decimal::ONE {
            return Err(ConfigError::InvalidValue {
                field: "fee_rate",
                reason: "must be at least 0 and below 1".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
