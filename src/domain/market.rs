//! Market entity and its lifecycle.
//!
//! - [`Market`] - One binary prediction with its YES/NO pools
//! - [`MarketStatus`] - Lifecycle state machine
//!
//! A market is created `Active`, grows its pools with every accepted stake
//! and is mutated exactly once more, at resolution. Every mutation bumps
//! [`Market::version`], the token stores use to reject stale writes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::MarketId;
use super::money::{Amount, Precision, DEFAULT_MONEY_SCALE};
use super::side::Side;

/// Lifecycle status of a market.
///
/// `Active` is the only non-terminal state and the only one that accepts
/// stakes. `Expired` and `Cancelled` are set by external processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketStatus {
    Active,
    ResolvedYes,
    ResolvedNo,
    Expired,
    Cancelled,
}

impl MarketStatus {
    /// Persisted name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::ResolvedYes => "resolved_yes",
            Self::ResolvedNo => "resolved_no",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }

    /// Status a market takes when it resolves to `outcome`.
    #[must_use]
    pub const fn resolved(outcome: Side) -> Self {
        match outcome {
            Side::Yes => Self::ResolvedYes,
            Side::No => Self::ResolvedNo,
        }
    }

    /// Winning side, for resolved statuses.
    #[must_use]
    pub const fn outcome(self) -> Option<Side> {
        match self {
            Self::ResolvedYes => Some(Side::Yes),
            Self::ResolvedNo => Some(Side::No),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !self.is_active()
    }

    /// True when the state machine allows moving from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(self, Self::Active) && !matches!(next, Self::Active)
    }
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "resolved_yes" => Ok(Self::ResolvedYes),
            "resolved_no" => Ok(Self::ResolvedNo),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown market status '{other}'")),
        }
    }
}

/// A binary-outcome prediction market and its two stake pools.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Market {
    id: MarketId,
    question: String,
    yes_pool: Amount,
    no_pool: Amount,
    total_pool: Amount,
    status: MarketStatus,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
    resolution_fee: Option<Amount>,
    payout_pool: Option<Amount>,
    stake_count: u64,
    version: u64,
    money_scale: u32,
}

impl Market {
    /// Open a new market with empty pools.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidQuestion`] for a blank question and
    /// [`DomainError::InvalidExpiry`] when `expires_at` is not after `now`.
    pub fn open(
        id: MarketId,
        question: impl Into<String>,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(DomainError::InvalidQuestion);
        }
        if expires_at <= now {
            return Err(DomainError::InvalidExpiry { expires_at, now });
        }

        Ok(Self {
            id,
            question,
            yes_pool: Decimal::ZERO,
            no_pool: Decimal::ZERO,
            total_pool: Decimal::ZERO,
            status: MarketStatus::Active,
            created_at: now,
            expires_at,
            resolved_at: None,
            resolution_fee: None,
            payout_pool: None,
            stake_count: 0,
            version: 0,
            money_scale: DEFAULT_MONEY_SCALE,
        })
    }

    /// Fix the money scale stakes and payouts of this market are kept at.
    #[must_use]
    pub fn with_money_scale(mut self, money_scale: u32) -> Self {
        self.money_scale = money_scale;
        self
    }

    /// Rebuild a market from persisted fields without validation.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn restore(
        id: MarketId,
        question: String,
        yes_pool: Amount,
        no_pool: Amount,
        total_pool: Amount,
        status: MarketStatus,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        resolved_at: Option<DateTime<Utc>>,
        resolution_fee: Option<Amount>,
        payout_pool: Option<Amount>,
        stake_count: u64,
        version: u64,
        money_scale: u32,
    ) -> Self {
        Self {
            id,
            question,
            yes_pool,
            no_pool,
            total_pool,
            status,
            created_at,
            expires_at,
            resolved_at,
            resolution_fee,
            payout_pool,
            stake_count,
            version,
            money_scale,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &MarketId {
        &self.id
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub const fn yes_pool(&self) -> Amount {
        self.yes_pool
    }

    #[must_use]
    pub const fn no_pool(&self) -> Amount {
        self.no_pool
    }

    #[must_use]
    pub const fn total_pool(&self) -> Amount {
        self.total_pool
    }

    /// Pool backing `side`.
    #[must_use]
    pub const fn pool(&self, side: Side) -> Amount {
        match side {
            Side::Yes => self.yes_pool,
            Side::No => self.no_pool,
        }
    }

    #[must_use]
    pub const fn status(&self) -> MarketStatus {
        self.status
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    #[must_use]
    pub const fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    /// Fee figure computed at resolution.
    #[must_use]
    pub const fn resolution_fee(&self) -> Option<Amount> {
        self.resolution_fee
    }

    /// Total winners were entitled to at resolution.
    #[must_use]
    pub const fn payout_pool(&self) -> Option<Amount> {
        self.payout_pool
    }

    #[must_use]
    pub const fn stake_count(&self) -> u64 {
        self.stake_count
    }

    #[must_use]
    pub const fn money_scale(&self) -> u32 {
        self.money_scale
    }

    /// `base` with the money scale this market was opened at. Amounts
    /// already in the pools always fit it.
    #[must_use]
    pub const fn precision(&self, base: &Precision) -> Precision {
        Precision {
            money_scale: self.money_scale,
            odds_scale: base.odds_scale,
        }
    }

    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Winning side once resolved.
    #[must_use]
    pub const fn outcome(&self) -> Option<Side> {
        self.status.outcome()
    }

    /// True when `total_pool == yes_pool + no_pool`.
    #[must_use]
    pub fn pools_balanced(&self) -> bool {
        self.total_pool == self.yes_pool + self.no_pool
    }

    /// Check that a stake may be placed at `now`.
    ///
    /// # Errors
    ///
    /// [`DomainError::MarketNotActive`] unless the market is active, then
    /// [`DomainError::MarketExpired`] once `now >= expires_at`.
    pub fn ensure_accepting(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.status.is_active() {
            return Err(DomainError::MarketNotActive {
                market_id: self.id.clone(),
                status: self.status,
            });
        }
        if now >= self.expires_at {
            return Err(DomainError::MarketExpired {
                market_id: self.id.clone(),
                expires_at: self.expires_at,
            });
        }
        Ok(())
    }

    /// Check that the market may be resolved at `now`.
    ///
    /// # Errors
    ///
    /// [`DomainError::AlreadyResolved`] unless the market is active, then
    /// [`DomainError::NotYetExpired`] while `now < expires_at`.
    pub fn ensure_resolvable(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.status.is_active() {
            return Err(DomainError::AlreadyResolved {
                market_id: self.id.clone(),
                status: self.status,
            });
        }
        if now < self.expires_at {
            return Err(DomainError::NotYetExpired {
                market_id: self.id.clone(),
                expires_at: self.expires_at,
            });
        }
        Ok(())
    }

    /// Add an accepted stake to the pools and return its placement sequence.
    ///
    /// Callers validate the request first with [`Market::ensure_accepting`].
    /// Nothing changes when a pool would overflow.
    ///
    /// # Errors
    ///
    /// [`DomainError::InvalidAmount`] if the pools cannot hold `amount`.
    pub(crate) fn add_stake(&mut self, position: Side, amount: Amount) -> Result<u64, DomainError> {
        let overflow = || DomainError::InvalidAmount {
            amount,
            reason: "pool would overflow".to_string(),
        };
        let total_pool = self.total_pool.checked_add(amount).ok_or_else(overflow)?;
        let side_pool = self
            .pool(position)
            .checked_add(amount)
            .ok_or_else(overflow)?;

        match position {
            Side::Yes => self.yes_pool = side_pool,
            Side::No => self.no_pool = side_pool,
        }
        self.total_pool = total_pool;
        self.stake_count += 1;
        self.version += 1;
        debug_assert!(self.pools_balanced());
        Ok(self.stake_count)
    }

    /// Move to a resolved status, recording the settlement figures.
    pub(crate) fn resolve(
        &mut self,
        outcome: Side,
        now: DateTime<Utc>,
        resolution_fee: Amount,
        payout_pool: Amount,
    ) -> Result<(), DomainError> {
        self.ensure_resolvable(now)?;
        self.transition(MarketStatus::resolved(outcome))?;
        self.resolved_at = Some(now);
        self.resolution_fee = Some(resolution_fee);
        self.payout_pool = Some(payout_pool);
        Ok(())
    }

    fn transition(&mut self, next: MarketStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.version += 1;
        Ok(())
    }
}
