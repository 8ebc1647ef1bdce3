//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the infrastructure the ledger depends on:
//! durable storage and a source of time.

pub mod clock;
pub mod store;
