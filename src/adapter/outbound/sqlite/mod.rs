//! SQLite persistence adapters.
//!
//! Provides the SQLite-backed ledger store using Diesel ORM.

pub mod database;
pub mod store;

pub use store::SqliteLedgerStore;
