//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!     CLI ──────────▶│  LedgerEngine (app)     │
//!                    │  domain: pricing,       │
//!                    │  settlement, audit      │
//!                    └────────────┬────────────┘
//!                                 │
//!                  ┌──────────────┴──────────────┐
//!                  ▼                             ▼
//!          ┌───────────────┐             ┌──────────────┐
//!          │  LedgerStore  │             │    Clock     │
//!          │ memory/sqlite │             │ system/fixed │
//!          └───────────────┘             └──────────────┘
//! ```

pub mod outbound;

pub use outbound::clock::{Clock, FixedClock, SystemClock};
pub use outbound::store::LedgerStore;
