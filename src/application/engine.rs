//! Ledger engine: the pool accounting use cases.
//!
//! Orchestrates pricing and settlement over a [`LedgerStore`]. Writers to one
//! market queue on a per-market async mutex, and every commit carries the
//! market version it was computed from so a store shared with another
//! process still rejects lost updates.
//!
//! ```text
//! place_stake ─┐                                ┌─▶ record_stake
//!              ├─▶ lock ─▶ load ─▶ price/settle ┤
//! resolve ─────┘                                └─▶ record_settlement
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{
    audit, pricing, settlement, Amount, AuditIssue, DomainError, Market, MarketId, Payout,
    Precision, Quote, SettlementPolicy, Side, Stake, StakeId, UserId,
};
use crate::error::Result;
use crate::port::outbound::store::LedgerStore;

/// Numeric and settlement rules the engine applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LedgerPolicy {
    pub precision: Precision,
    pub settlement: SettlementPolicy,
}

/// Outcome of a market resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// The market after resolution.
    pub market: Market,
    /// Fee computed on the total pool.
    pub resolution_fee: Amount,
    /// Stakes marked won.
    pub winning_count: usize,
    /// Stakes marked lost.
    pub losing_count: usize,
    /// Sum of winner payouts.
    pub total_paid: Amount,
    /// Payout pool left undistributed under `LeaveInPool`.
    pub unallocated: Amount,
    /// Pool forfeited because nobody backed the outcome.
    pub forfeited: Amount,
    /// Per-stake payouts in placement order.
    pub payouts: Vec<Payout>,
}

/// Pool ledger service.
pub struct LedgerEngine<S> {
    store: Arc<S>,
    policy: LedgerPolicy,
    locks: DashMap<MarketId, Arc<Mutex<()>>>,
}

impl<S: LedgerStore> LedgerEngine<S> {
    /// Create an engine over `store` applying `policy`.
    pub fn new(store: Arc<S>, policy: LedgerPolicy) -> Self {
        Self {
            store,
            policy,
            locks: DashMap::new(),
        }
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    #[must_use]
    pub const fn policy(&self) -> &LedgerPolicy {
        &self.policy
    }

    fn lock_for(&self, market_id: &MarketId) -> Arc<Mutex<()>> {
        self.locks.entry(market_id.clone()).or_default().clone()
    }

    async fn load(&self, market_id: &MarketId) -> Result<Market> {
        self.store
            .market(market_id)
            .await?
            .ok_or_else(|| {
                DomainError::MarketNotFound {
                    market_id: market_id.clone(),
                }
                .into()
            })
    }

    /// Open a new market with empty pools.
    ///
    /// # Errors
    ///
    /// `MarketExists`, `InvalidQuestion` or `InvalidExpiry`, or a store error.
    pub async fn open_market(
        &self,
        market_id: MarketId,
        question: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Market> {
        let market = Market::open(market_id, question, expires_at, now)?
            .with_money_scale(self.policy.precision.money_scale);
        self.store.insert_market(&market).await?;
        info!(
            market_id = %market.id(),
            expires_at = %market.expires_at(),
            money_scale = market.money_scale(),
            "Market opened"
        );
        Ok(market)
    }

    /// Price a stake without placing it.
    ///
    /// # Errors
    ///
    /// The same validation errors as [`LedgerEngine::place_stake`].
    pub async fn quote_stake(
        &self,
        market_id: &MarketId,
        amount: Amount,
        position: Side,
        now: DateTime<Utc>,
    ) -> Result<Quote> {
        let market = self.load(market_id).await?;
        Ok(pricing::quote(
            &market,
            position,
            amount,
            now,
            &self.policy.precision,
        )?)
    }

    /// Place a stake, locking in the odds it moves the pool to.
    ///
    /// # Errors
    ///
    /// Checked in order: `MarketNotFound`, `MarketNotActive`,
    /// `MarketExpired`, `InvalidAmount`. A store that saw a newer market
    /// version fails with `ConcurrencyConflict` and nothing is written.
    pub async fn place_stake(
        &self,
        market_id: &MarketId,
        user_id: UserId,
        amount: Amount,
        position: Side,
        now: DateTime<Utc>,
    ) -> Result<Stake> {
        let lock = self.lock_for(market_id);
        let _guard = lock.lock().await;

        let mut market = self.load(market_id).await?;
        let quote = match pricing::quote(&market, position, amount, now, &self.policy.precision)
        {
            Ok(quote) => quote,
            Err(e) => {
                debug!(market_id = %market_id, error = %e, "Stake rejected");
                return Err(e.into());
            }
        };

        let expected_version = market.version();
        let sequence = market.add_stake(position, amount)?;
        let stake = Stake::new(
            StakeId::new(),
            market_id.clone(),
            user_id,
            sequence,
            amount,
            position,
            quote.odds,
            quote.potential_win,
            now,
        );

        if let Err(e) = self
            .store
            .record_stake(&market, expected_version, &stake)
            .await
        {
            warn!(market_id = %market_id, error = %e, "Failed to record stake");
            return Err(e);
        }

        info!(
            market_id = %market_id,
            stake_id = %stake.id(),
            user_id = %stake.user_id(),
            position = %position,
            amount = %amount,
            odds = %stake.odds(),
            total_pool = %market.total_pool(),
            "Stake placed"
        );
        Ok(stake)
    }

    /// Resolve an expired market and settle every stake.
    ///
    /// # Errors
    ///
    /// `MarketNotFound`, `AlreadyResolved`, `NotYetExpired` or
    /// `SettlementFailed`. On any error nothing is written.
    pub async fn resolve_market(
        &self,
        market_id: &MarketId,
        outcome: Side,
        now: DateTime<Utc>,
    ) -> Result<Resolution> {
        let lock = self.lock_for(market_id);
        let _guard = lock.lock().await;

        let mut market = self.load(market_id).await?;
        market.ensure_resolvable(now)?;

        let mut open: Vec<Stake> = self
            .store
            .stakes_for_market(market_id)
            .await?
            .into_iter()
            .filter(|s| !s.status().is_settled())
            .collect();

        let settlement = match settlement::compute(
            &market,
            &open,
            outcome,
            &self.policy.precision,
            &self.policy.settlement,
        ) {
            Ok(settlement) => settlement,
            Err(e) => {
                warn!(market_id = %market_id, error = %e, "Settlement failed");
                return Err(e.into());
            }
        };

        let expected_version = market.version();
        market.resolve(
            outcome,
            now,
            settlement.resolution_fee,
            settlement.payout_pool,
        )?;
        settlement.apply(&mut open);

        if let Err(e) = self
            .store
            .record_settlement(&market, expected_version, &open)
            .await
        {
            warn!(market_id = %market_id, error = %e, "Failed to record settlement");
            return Err(e);
        }

        let resolution = Resolution {
            resolution_fee: settlement.resolution_fee,
            winning_count: settlement.payouts.len(),
            losing_count: settlement.losers.len(),
            total_paid: settlement.total_paid(),
            unallocated: settlement.unallocated,
            forfeited: settlement.forfeited,
            payouts: settlement.payouts,
            market,
        };

        if resolution.forfeited > Amount::ZERO {
            warn!(
                market_id = %market_id,
                outcome = %outcome,
                forfeited = %resolution.forfeited,
                "No stakes on winning side, pool forfeited"
            );
        }
        info!(
            market_id = %market_id,
            outcome = %outcome,
            fee = %resolution.resolution_fee,
            winners = resolution.winning_count,
            losers = resolution.losing_count,
            paid = %resolution.total_paid,
            "Market resolved"
        );
        Ok(resolution)
    }

    /// Get a market.
    ///
    /// # Errors
    ///
    /// `MarketNotFound` if it does not exist.
    pub async fn market(&self, market_id: &MarketId) -> Result<Market> {
        self.load(market_id).await
    }

    /// All markets, oldest first.
    pub async fn markets(&self) -> Result<Vec<Market>> {
        self.store.markets().await
    }

    /// Stakes of a market in placement order.
    ///
    /// # Errors
    ///
    /// `MarketNotFound` if the market does not exist.
    pub async fn stakes(&self, market_id: &MarketId) -> Result<Vec<Stake>> {
        self.load(market_id).await?;
        self.store.stakes_for_market(market_id).await
    }

    /// Stakes placed by a user across all markets.
    pub async fn user_stakes(&self, user_id: &UserId) -> Result<Vec<Stake>> {
        self.store.stakes_for_user(user_id).await
    }

    /// Check a market's books against the ledger invariants.
    ///
    /// An empty list means the market is consistent.
    pub async fn audit(&self, market_id: &MarketId) -> Result<Vec<AuditIssue>> {
        let market = self.load(market_id).await?;
        let stakes = self.store.stakes_for_market(market_id).await?;
        let issues = audit::audit(&market, &stakes, &self.policy.precision);
        if !issues.is_empty() {
            warn!(market_id = %market_id, issues = issues.len(), "Audit found issues");
        }
        Ok(issues)
    }
}
