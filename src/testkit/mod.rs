//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] - Builders for ids, users and fixed timestamps.
//! - [`config`] - Canonical ledger policies (fee modes, remainder rules).
//! - [`ledger`] - Engines over the memory store or a throwaway SQLite file.

pub mod config;
pub mod domain;
pub mod ledger;
