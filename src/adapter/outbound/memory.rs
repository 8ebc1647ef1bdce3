//! In-memory ledger store.
//!
//! Markets and stakes live behind one lock so each commit is applied as a
//! unit. Useful for tests and for embedding the engine without a database.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::domain::{DomainError, Market, MarketId, Stake, UserId};
use crate::error::Result;
use crate::port::outbound::store::LedgerStore;

#[derive(Debug, Default)]
struct Ledger {
    markets: HashMap<MarketId, Market>,
    stakes: HashMap<MarketId, Vec<Stake>>,
}

impl Ledger {
    fn check_version(&self, market: &Market, expected_version: u64) -> Result<()> {
        let current = self
            .markets
            .get(market.id())
            .ok_or_else(|| DomainError::MarketNotFound {
                market_id: market.id().clone(),
            })?;
        if current.version() != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                market_id: market.id().clone(),
            }
            .into());
        }
        Ok(())
    }
}

/// In-memory store for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    ledger: RwLock<Ledger>,
}

impl MemoryLedgerStore {
    /// Create a new empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedgerStore {
    async fn insert_market(&self, market: &Market) -> Result<()> {
        let mut ledger = self.ledger.write();
        if ledger.markets.contains_key(market.id()) {
            return Err(DomainError::MarketExists {
                market_id: market.id().clone(),
            }
            .into());
        }
        ledger.markets.insert(market.id().clone(), market.clone());
        ledger.stakes.insert(market.id().clone(), Vec::new());
        Ok(())
    }

    async fn market(&self, id: &MarketId) -> Result<Option<Market>> {
        Ok(self.ledger.read().markets.get(id).cloned())
    }

    async fn markets(&self) -> Result<Vec<Market>> {
        let mut markets: Vec<Market> = self.ledger.read().markets.values().cloned().collect();
        markets.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(markets)
    }

    async fn stakes_for_market(&self, id: &MarketId) -> Result<Vec<Stake>> {
        Ok(self
            .ledger
            .read()
            .stakes
            .get(id)
            .cloned()
            .unwrap_or_default())
    }

    async fn stakes_for_user(&self, id: &UserId) -> Result<Vec<Stake>> {
        let ledger = self.ledger.read();
        let mut stakes: Vec<Stake> = ledger
            .stakes
            .values()
            .flatten()
            .filter(|s| s.user_id() == id)
            .cloned()
            .collect();
        stakes.sort_by_key(Stake::placed_at);
        Ok(stakes)
    }

    async fn record_stake(
        &self,
        market: &Market,
        expected_version: u64,
        stake: &Stake,
    ) -> Result<()> {
        let mut ledger = self.ledger.write();
        ledger.check_version(market, expected_version)?;
        ledger.markets.insert(market.id().clone(), market.clone());
        ledger
            .stakes
            .entry(market.id().clone())
            .or_default()
            .push(stake.clone());
        Ok(())
    }

    async fn record_settlement(
        &self,
        market: &Market,
        expected_version: u64,
        stakes: &[Stake],
    ) -> Result<()> {
        let mut ledger = self.ledger.write();
        ledger.check_version(market, expected_version)?;

        let stored = ledger.stakes.entry(market.id().clone()).or_default();
        let mut settled = stored.clone();
        for stake in stakes {
            let slot = settled
                .iter_mut()
                .find(|s| s.id() == stake.id())
                .ok_or_else(|| DomainError::StakeNotFound {
                    stake_id: stake.id().clone(),
                })?;
            *slot = stake.clone();
        }
        *stored = settled;
        ledger.markets.insert(market.id().clone(), market.clone());
        Ok(())
    }
}
