//! Stake ledger entries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{MarketId, StakeId, UserId};
use super::money::{Amount, Odds};
use super::side::Side;

/// Status of a stake. `Won` and `Lost` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StakeStatus {
    Active,
    Won,
    Lost,
}

impl StakeStatus {
    /// Persisted name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }

    #[must_use]
    pub const fn is_settled(self) -> bool {
        !matches!(self, Self::Active)
    }
}

impl fmt::Display for StakeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StakeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "won" => Ok(Self::Won),
            "lost" => Ok(Self::Lost),
            other => Err(format!("unknown stake status '{other}'")),
        }
    }
}

/// One user's wager on a side of a market.
///
/// Amount, position and odds are fixed at placement. `potential_win` holds
/// the placement-time estimate until settlement, when winners get their
/// actual payout written over it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stake {
    id: StakeId,
    market_id: MarketId,
    user_id: UserId,
    sequence: u64,
    amount: Amount,
    position: Side,
    odds: Odds,
    potential_win: Amount,
    status: StakeStatus,
    placed_at: DateTime<Utc>,
}

impl Stake {
    /// Record a freshly priced stake.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        id: StakeId,
        market_id: MarketId,
        user_id: UserId,
        sequence: u64,
        amount: Amount,
        position: Side,
        odds: Odds,
        potential_win: Amount,
        placed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            market_id,
            user_id,
            sequence,
            amount,
            position,
            odds,
            potential_win,
            status: StakeStatus::Active,
            placed_at,
        }
    }

    /// Rebuild a stake from persisted fields.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn restore(
        id: StakeId,
        market_id: MarketId,
        user_id: UserId,
        sequence: u64,
        amount: Amount,
        position: Side,
        odds: Odds,
        potential_win: Amount,
        status: StakeStatus,
        placed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            market_id,
            user_id,
            sequence,
            amount,
            position,
            odds,
            potential_win,
            status,
            placed_at,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &StakeId {
        &self.id
    }

    #[must_use]
    pub const fn market_id(&self) -> &MarketId {
        &self.market_id
    }

    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// 1-based placement order within the market.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    #[must_use]
    pub const fn amount(&self) -> Amount {
        self.amount
    }

    #[must_use]
    pub const fn position(&self) -> Side {
        self.position
    }

    #[must_use]
    pub const fn odds(&self) -> Odds {
        self.odds
    }

    #[must_use]
    pub const fn potential_win(&self) -> Amount {
        self.potential_win
    }

    #[must_use]
    pub const fn status(&self) -> StakeStatus {
        self.status
    }

    #[must_use]
    pub const fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }

    /// Actual payout, once the stake has won.
    #[must_use]
    pub const fn payout(&self) -> Option<Amount> {
        match self.status {
            StakeStatus::Won => Some(self.potential_win),
            _ => None,
        }
    }

    pub(crate) fn settle_won(&mut self, payout: Amount) {
        debug_assert!(!self.status.is_settled());
        self.potential_win = payout;
        self.status = StakeStatus::Won;
    }

    pub(crate) fn settle_lost(&mut self) {
        debug_assert!(!self.status.is_settled());
        self.status = StakeStatus::Lost;
    }
}
