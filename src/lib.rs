//! Stakepool - parimutuel pool accounting and settlement for YES/NO markets.
//!
//! Every stake goes into the pool of the side it backs and locks in odds
//! from the pool state its own amount produces. When a market resolves, the
//! winning side splits the pool pro rata by stake amount and a resolution
//! fee is computed on the total.
//!
//! # Architecture
//!
//! - [`domain`] - Markets, stakes, pricing, settlement and audit rules. Pure,
//!   no I/O.
//! - [`port`] - The `LedgerStore` and `Clock` traits the engine depends on.
//! - [`application`] - `LedgerEngine`, the use cases: open, quote, place,
//!   resolve, query, audit.
//! - [`adapter`] - In-memory and SQLite stores, and the `stakepool` CLI.
//! - [`infrastructure`] - Configuration loading and logging setup.
//! - [`error`] - Crate error type.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use chrono::{Duration, Utc};
//! use rust_decimal_macros::dec;
//! use stakepool::adapter::outbound::memory::MemoryLedgerStore;
//! use stakepool::application::{LedgerEngine, LedgerPolicy};
//! use stakepool::domain::{MarketId, Side, UserId};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> stakepool::error::Result<()> {
//! let engine = LedgerEngine::new(Arc::new(MemoryLedgerStore::new()), LedgerPolicy::default());
//! let now = Utc::now();
//! let id = MarketId::new("rain");
//! engine
//!     .open_market(id.clone(), "Will it rain tomorrow?", now + Duration::hours(1), now)
//!     .await?;
//!
//! engine.place_stake(&id, UserId::new("alice"), dec!(100), Side::Yes, now).await?;
//! engine.place_stake(&id, UserId::new("bob"), dec!(100), Side::No, now).await?;
//!
//! let resolution = engine
//!     .resolve_market(&id, Side::Yes, now + Duration::hours(2))
//!     .await?;
//! assert_eq!(resolution.total_paid, dec!(200));
//! assert_eq!(resolution.resolution_fee, dec!(4));
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
