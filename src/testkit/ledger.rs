//! Ready-to-use engines and markets.

use std::sync::Arc;

use tempfile::TempDir;

use crate::adapter::outbound::memory::MemoryLedgerStore;
use crate::adapter::outbound::sqlite::database::connection;
use crate::adapter::outbound::sqlite::SqliteLedgerStore;
use crate::application::{LedgerEngine, LedgerPolicy};
use crate::domain::{Market, MarketId};
use crate::error::Result;
use crate::port::outbound::store::LedgerStore;

use super::domain::{epoch, expiry};

/// Engine over a fresh in-memory store.
pub fn memory_engine(policy: LedgerPolicy) -> LedgerEngine<MemoryLedgerStore> {
    LedgerEngine::new(Arc::new(MemoryLedgerStore::new()), policy)
}

/// Engine over a SQLite file in a temporary directory.
///
/// Keep the returned [`TempDir`] alive for as long as the engine is used.
pub fn sqlite_engine(policy: LedgerPolicy) -> Result<(LedgerEngine<SqliteLedgerStore>, TempDir)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("ledger.db");
    let pool = connection::open(&path.to_string_lossy())?;
    Ok((
        LedgerEngine::new(Arc::new(SqliteLedgerStore::new(pool)), policy),
        dir,
    ))
}

/// Open market `id` at [`epoch`] expiring at [`expiry`].
pub async fn open_market<S: LedgerStore>(engine: &LedgerEngine<S>, id: &MarketId) -> Result<Market> {
    engine
        .open_market(id.clone(), &format!("Will {id} happen?"), expiry(), epoch())
        .await
}
