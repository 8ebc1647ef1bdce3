//! Canonical test policies.

use rust_decimal::Decimal;

use crate::application::LedgerPolicy;
use crate::domain::{FeeMode, Precision, RemainderPolicy, SettlementPolicy};

/// Default policy: 2% reported fee, residual to the last winner.
pub fn default_policy() -> LedgerPolicy {
    LedgerPolicy::default()
}

/// Policy with the given settlement rules at default precision.
pub fn policy(fee_rate: Decimal, fee_mode: FeeMode, remainder: RemainderPolicy) -> LedgerPolicy {
    LedgerPolicy {
        precision: Precision::default(),
        settlement: SettlementPolicy {
            fee_rate,
            fee_mode,
            remainder,
        },
    }
}

/// Default policy with the fee withheld from winners.
pub fn deducted_fee_policy() -> LedgerPolicy {
    policy(
        crate::domain::settlement::DEFAULT_FEE_RATE,
        FeeMode::Deducted,
        RemainderPolicy::LastWinner,
    )
}

/// Default policy that leaves the truncation residual in the pool.
pub fn leave_in_pool_policy() -> LedgerPolicy {
    policy(
        crate::domain::settlement::DEFAULT_FEE_RATE,
        FeeMode::Reported,
        RemainderPolicy::LeaveInPool,
    )
}

/// Default policy with money kept to `money_scale` fractional digits.
pub fn money_scale_policy(money_scale: u32) -> LedgerPolicy {
    LedgerPolicy {
        precision: Precision {
            money_scale,
            ..Precision::default()
        },
        ..LedgerPolicy::default()
    }
}
