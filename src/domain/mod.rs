//! Pool ledger domain: markets, stakes, pricing and settlement.
//!
//! Everything here is synchronous and free of I/O. The application layer
//! loads entities through the store port, runs these functions and commits
//! the result.

pub mod audit;
pub mod error;
pub mod id;
pub mod market;
pub mod money;
pub mod pricing;
pub mod settlement;
pub mod side;
pub mod stake;

pub use audit::AuditIssue;
pub use error::{DomainError, ErrorKind};
pub use id::{MarketId, StakeId, UserId};
pub use market::{Market, MarketStatus};
pub use money::{Amount, Odds, Precision};
pub use pricing::Quote;
pub use settlement::{FeeMode, Payout, RemainderPolicy, Settlement, SettlementPolicy};
pub use side::Side;
pub use stake::{Stake, StakeStatus};
