//! Settlement of a resolved market.
//!
//! [`compute`] is a pure function from a market, its stakes and an outcome to
//! a [`Settlement`]: the fee figure, each winner's payout and the list of
//! losers. The caller applies it to the market and stakes in one atomic
//! commit.
//!
//! Winners split the payout pool pro rata by stake amount:
//!
//! ```text
//! payout = payout_pool * amount / winning_pool
//! ```
//!
//! With [`FeeMode::Reported`] the payout pool is the whole pool, which is
//! the same as `amount + losing_pool * amount / winning_pool`. With
//! [`FeeMode::Deducted`] the fee is withheld first. Shares are computed in
//! whole money units and truncated; the leftover units are handled by the
//! [`RemainderPolicy`]. If nobody backed the winning side every stake loses
//! and the pool is forfeited.
//!
//! Amounts are read at the money scale the market was opened with, so a
//! later change of configuration cannot shift the unit stakes were taken in.

use std::collections::{HashMap, HashSet};

use num_bigint::BigUint;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::StakeId;
use super::market::Market;
use super::money::{Amount, Precision};
use super::side::Side;
use super::stake::Stake;

/// Resolver incentive as a fraction of the total pool.
pub const DEFAULT_FEE_RATE: Decimal = dec!(0.02);

/// What happens to the resolution fee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeMode {
    /// Computed and reported only; winners share the full pool and the fee
    /// is paid through a separate transfer.
    #[default]
    Reported,
    /// Withheld from the pool before winners are paid.
    Deducted,
}

/// Where the sub-unit residue of pro rata division goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// Added to the payout of the last winner by placement order.
    #[default]
    LastWinner,
    /// Left in the pool and reported as unallocated.
    LeaveInPool,
}

/// Fee and remainder rules applied at resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SettlementPolicy {
    pub fee_rate: Decimal,
    pub fee_mode: FeeMode,
    pub remainder: RemainderPolicy,
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        Self {
            fee_rate: DEFAULT_FEE_RATE,
            fee_mode: FeeMode::default(),
            remainder: RemainderPolicy::default(),
        }
    }
}

/// Payout owed to one winning stake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payout {
    pub stake_id: StakeId,
    pub amount: Amount,
}

/// Result of settling a market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub outcome: Side,
    pub resolution_fee: Amount,
    pub winning_pool: Amount,
    pub losing_pool: Amount,
    /// Amount winners are entitled to in total.
    pub payout_pool: Amount,
    /// Winner payouts in placement order.
    pub payouts: Vec<Payout>,
    pub losers: Vec<StakeId>,
    /// Residue kept in the pool under [`RemainderPolicy::LeaveInPool`].
    pub unallocated: Amount,
    /// Whole pool when nobody backed the outcome.
    pub forfeited: Amount,
}

impl Settlement {
    /// Sum of all winner payouts.
    #[must_use]
    pub fn total_paid(&self) -> Amount {
        self.payouts.iter().map(|p| p.amount).sum()
    }

    /// Mark every stake won or lost. Stakes not covered by this settlement
    /// are left untouched.
    pub(crate) fn apply(&self, stakes: &mut [Stake]) {
        let payouts: HashMap<&StakeId, Amount> = self
            .payouts
            .iter()
            .map(|p| (&p.stake_id, p.amount))
            .collect();
        let losers: HashSet<&StakeId> = self.losers.iter().collect();

        for stake in stakes.iter_mut() {
            if let Some(amount) = payouts.get(stake.id()) {
                stake.settle_won(*amount);
            } else if losers.contains(stake.id()) {
                stake.settle_lost();
            }
        }
    }
}

/// Compute the settlement of `market` for `outcome`.
///
/// `stakes` are the market's stakes; only active ones take part. Only the
/// odds scale is taken from `precision`; money is kept at the scale the
/// market was opened with.
///
/// # Errors
///
/// [`DomainError::SettlementFailed`] if a pool or stake does not fit the
/// market's money scale, or a winning pool holds no whole money unit.
pub fn compute(
    market: &Market,
    stakes: &[Stake],
    outcome: Side,
    precision: &Precision,
    policy: &SettlementPolicy,
) -> Result<Settlement, DomainError> {
    let precision = market.precision(precision);
    let total = market.total_pool();
    let winning_pool = market.pool(outcome);
    let losing_pool = market.pool(outcome.opposite());
    let resolution_fee = total
        .checked_mul(policy.fee_rate)
        .map(|fee| precision.round_money(fee))
        .ok_or_else(|| failed(market, "resolution fee out of range"))?;

    let mut open: Vec<&Stake> = stakes.iter().filter(|s| !s.status().is_settled()).collect();
    open.sort_by_key(|s| s.sequence());

    if winning_pool <= Decimal::ZERO {
        return Ok(Settlement {
            outcome,
            resolution_fee,
            winning_pool,
            losing_pool,
            payout_pool: Decimal::ZERO,
            payouts: Vec::new(),
            losers: open.iter().map(|s| s.id().clone()).collect(),
            unallocated: Decimal::ZERO,
            forfeited: total,
        });
    }

    let payout_pool = match policy.fee_mode {
        FeeMode::Reported => total,
        FeeMode::Deducted => (total - resolution_fee).max(Decimal::ZERO),
    };

    let pool_units = precision
        .units(payout_pool)
        .ok_or_else(|| failed(market, "payout pool does not fit the money scale"))?;
    let winning_units = precision
        .units(winning_pool)
        .ok_or_else(|| failed(market, "winning pool does not fit the money scale"))?;
    if winning_units.bits() == 0 {
        return Err(failed(market, "winning pool holds no whole money unit"));
    }

    let mut payouts = Vec::new();
    let mut losers = Vec::new();
    for stake in open {
        if stake.position() == outcome {
            let stake_units = precision
                .units(stake.amount())
                .ok_or_else(|| failed(market, "stake does not fit the money scale"))?;
            let amount = precision
                .from_units(&(&pool_units * stake_units / &winning_units))
                .ok_or_else(|| failed(market, "payout out of range"))?;
            payouts.push(Payout {
                stake_id: stake.id().clone(),
                amount,
            });
        } else {
            losers.push(stake.id().clone());
        }
    }

    let paid: Amount = payouts.iter().map(|p| p.amount).sum();
    let remainder = payout_pool - paid;
    let unallocated = match (policy.remainder, payouts.last_mut()) {
        (RemainderPolicy::LastWinner, Some(last)) => {
            last.amount += remainder;
            Decimal::ZERO
        }
        _ => remainder,
    };

    Ok(Settlement {
        outcome,
        resolution_fee,
        winning_pool,
        losing_pool,
        payout_pool,
        payouts,
        losers,
        unallocated,
        forfeited: Decimal::ZERO,
    })
}

fn failed(market: &Market, reason: &str) -> DomainError {
    DomainError::SettlementFailed {
        market_id: market.id().clone(),
        reason: reason.to_string(),
    }
}
