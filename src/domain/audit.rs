//! Ledger invariant checks for one market and its stakes.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use super::id::StakeId;
use super::market::Market;
use super::money::{Amount, Precision};
use super::side::Side;
use super::stake::{Stake, StakeStatus};

/// A violated ledger invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum AuditIssue {
    /// `total_pool != yes_pool + no_pool`.
    PoolImbalance {
        total: Amount,
        yes: Amount,
        no: Amount,
    },
    /// A side's pool differs from the sum of its stakes.
    SideMismatch {
        side: Side,
        pool: Amount,
        staked: Amount,
    },
    /// Stake count on the market differs from stakes found.
    StakeCountMismatch { recorded: u64, found: u64 },
    /// Resolved market still holding an active stake.
    UnsettledStake { stake_id: StakeId },
    /// Settled stake under a market that is still active.
    PrematureSettlement { stake_id: StakeId },
    /// Won stake on the losing side, or lost stake when winners were paid
    /// and it backed the outcome.
    WrongSide { stake_id: StakeId, status: StakeStatus },
    /// Winner payouts do not add up to the recorded payout pool.
    PayoutMismatch { paid: Amount, payout_pool: Amount },
}

impl fmt::Display for AuditIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PoolImbalance { total, yes, no } => {
                write!(f, "total pool {total} != yes {yes} + no {no}")
            }
            Self::SideMismatch { side, pool, staked } => {
                write!(f, "{side} pool {pool} but stakes sum to {staked}")
            }
            Self::StakeCountMismatch { recorded, found } => {
                write!(f, "market records {recorded} stakes, found {found}")
            }
            Self::UnsettledStake { stake_id } => {
                write!(f, "stake {stake_id} still active under a resolved market")
            }
            Self::PrematureSettlement { stake_id } => {
                write!(f, "stake {stake_id} settled while market is active")
            }
            Self::WrongSide { stake_id, status } => {
                write!(f, "stake {stake_id} is {status} on the wrong side")
            }
            Self::PayoutMismatch { paid, payout_pool } => {
                write!(f, "winners paid {paid}, payout pool {payout_pool}")
            }
        }
    }
}

/// Check every ledger invariant for `market` and return the violations.
#[must_use]
pub fn audit(market: &Market, stakes: &[Stake], precision: &Precision) -> Vec<AuditIssue> {
    let mut issues = Vec::new();

    if !market.pools_balanced() {
        issues.push(AuditIssue::PoolImbalance {
            total: market.total_pool(),
            yes: market.yes_pool(),
            no: market.no_pool(),
        });
    }

    for side in [Side::Yes, Side::No] {
        let staked: Amount = stakes
            .iter()
            .filter(|s| s.position() == side)
            .map(Stake::amount)
            .sum();
        if staked != market.pool(side) {
            issues.push(AuditIssue::SideMismatch {
                side,
                pool: market.pool(side),
                staked,
            });
        }
    }

    let found = stakes.len() as u64;
    if found != market.stake_count() {
        issues.push(AuditIssue::StakeCountMismatch {
            recorded: market.stake_count(),
            found,
        });
    }

    let outcome = market.outcome();
    let winners_paid = outcome.is_some_and(|side| market.pool(side) > Decimal::ZERO);
    for stake in stakes {
        let status = stake.status();
        match outcome {
            None if market.status().is_active() && status.is_settled() => {
                issues.push(AuditIssue::PrematureSettlement {
                    stake_id: stake.id().clone(),
                });
            }
            Some(_) if !status.is_settled() => {
                issues.push(AuditIssue::UnsettledStake {
                    stake_id: stake.id().clone(),
                });
            }
            Some(side) => {
                let should_win = winners_paid && stake.position() == side;
                let won = status == StakeStatus::Won;
                if should_win != won {
                    issues.push(AuditIssue::WrongSide {
                        stake_id: stake.id().clone(),
                        status,
                    });
                }
            }
            None => {}
        }
    }

    if let Some(payout_pool) = market.payout_pool() {
        let winners: Vec<&Stake> = stakes
            .iter()
            .filter(|s| s.status() == StakeStatus::Won)
            .collect();
        let paid: Amount = winners.iter().map(|s| s.potential_win()).sum();
        let unit = market.precision(precision).money_unit();
        let slack = unit * Decimal::from(winners.len().max(1));
        let gap = payout_pool - paid;
        if gap < Decimal::ZERO || (!winners.is_empty() && gap >= slack) {
            issues.push(AuditIssue::PayoutMismatch { paid, payout_pool });
        }
    }

    issues
}
