//! Persistence port for markets and stakes.
//!
//! Writes are versioned: every commit names the market version the caller
//! read, and the store applies the whole commit atomically only if the
//! stored version still matches. A mismatch fails with
//! [`DomainError::ConcurrencyConflict`](crate::domain::DomainError::ConcurrencyConflict)
//! and leaves nothing changed.

use std::future::Future;

use crate::domain::{Market, MarketId, Stake, UserId};
use crate::error::Result;

/// Storage operations for the pool ledger.
pub trait LedgerStore: Send + Sync {
    /// Insert a new market. Fails with `MarketExists` on a duplicate id.
    fn insert_market(&self, market: &Market) -> impl Future<Output = Result<()>> + Send;

    /// Get a market by ID.
    fn market(&self, id: &MarketId) -> impl Future<Output = Result<Option<Market>>> + Send;

    /// List all markets ordered by creation time.
    fn markets(&self) -> impl Future<Output = Result<Vec<Market>>> + Send;

    /// Stakes of a market in placement order.
    fn stakes_for_market(&self, id: &MarketId)
        -> impl Future<Output = Result<Vec<Stake>>> + Send;

    /// Stakes placed by a user, oldest first.
    fn stakes_for_user(&self, id: &UserId) -> impl Future<Output = Result<Vec<Stake>>> + Send;

    /// Atomically store the updated market and its new stake.
    fn record_stake(
        &self,
        market: &Market,
        expected_version: u64,
        stake: &Stake,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Atomically store the resolved market and every settled stake.
    fn record_settlement(
        &self,
        market: &Market,
        expected_version: u64,
        stakes: &[Stake],
    ) -> impl Future<Output = Result<()>> + Send;
}
