//! Domain errors for the pool ledger.
//!
//! Every precondition failure of pricing, settlement and market opening is a
//! [`DomainError`] variant. Callers that only care about the broad category
//! (for example to decide whether to retry) use [`DomainError::kind`].
//!
//! # Examples
//!
//! ```
//! use stakepool::domain::error::{DomainError, ErrorKind};
//! use stakepool::domain::id::MarketId;
//!
//! let err = DomainError::ConcurrencyConflict {
//!     market_id: MarketId::new("btc-100k"),
//! };
//! assert_eq!(err.kind(), ErrorKind::ConcurrencyConflict);
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use super::id::{MarketId, StakeId};
use super::market::MarketStatus;

/// Broad failure category reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown market or stake.
    NotFound,
    /// The market is not in a state that allows the operation.
    InvalidState,
    /// The request itself is malformed.
    InvalidInput,
    /// Lost a race on a pool update; the caller may retry.
    ConcurrencyConflict,
}

impl ErrorKind {
    /// Stable name used in machine-readable output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidState => "invalid_state",
            Self::InvalidInput => "invalid_input",
            Self::ConcurrencyConflict => "concurrency_conflict",
        }
    }
}

/// Errors raised when a ledger rule is violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("market not found: {market_id}")]
    MarketNotFound { market_id: MarketId },

    #[error("stake not found: {stake_id}")]
    StakeNotFound { stake_id: StakeId },

    #[error("market {market_id} is not accepting stakes (status {status})")]
    MarketNotActive {
        market_id: MarketId,
        status: MarketStatus,
    },

    #[error("market {market_id} expired at {expires_at}")]
    MarketExpired {
        market_id: MarketId,
        expires_at: DateTime<Utc>,
    },

    #[error("market {market_id} is already resolved (status {status})")]
    AlreadyResolved {
        market_id: MarketId,
        status: MarketStatus,
    },

    #[error("market {market_id} does not expire until {expires_at}")]
    NotYetExpired {
        market_id: MarketId,
        expires_at: DateTime<Utc>,
    },

    #[error("invalid stake amount {amount}: {reason}")]
    InvalidAmount { amount: Decimal, reason: String },

    #[error("unsupported outcome '{value}', expected yes or no")]
    InvalidOutcome { value: String },

    #[error("unsupported position '{value}', expected yes or no")]
    InvalidPosition { value: String },

    #[error("market already exists: {market_id}")]
    MarketExists { market_id: MarketId },

    #[error("expiry {expires_at} must be later than {now}")]
    InvalidExpiry {
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    #[error("market question cannot be empty")]
    InvalidQuestion,

    #[error("illegal market transition {from} -> {to}")]
    InvalidTransition { from: MarketStatus, to: MarketStatus },

    #[error("cannot settle market {market_id}: {reason}")]
    SettlementFailed { market_id: MarketId, reason: String },

    #[error("concurrent update on market {market_id}, retry the request")]
    ConcurrencyConflict { market_id: MarketId },
}

impl DomainError {
    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MarketNotFound { .. } | Self::StakeNotFound { .. } => ErrorKind::NotFound,
            Self::MarketNotActive { .. }
            | Self::MarketExpired { .. }
            | Self::AlreadyResolved { .. }
            | Self::NotYetExpired { .. }
            | Self::InvalidTransition { .. }
            | Self::SettlementFailed { .. } => ErrorKind::InvalidState,
            Self::InvalidAmount { .. }
            | Self::InvalidOutcome { .. }
            | Self::InvalidPosition { .. }
            | Self::MarketExists { .. }
            | Self::InvalidExpiry { .. }
            | Self::InvalidQuestion => ErrorKind::InvalidInput,
            Self::ConcurrencyConflict { .. } => ErrorKind::ConcurrencyConflict,
        }
    }

    /// True when the caller may retry the same request.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::ConcurrencyConflict)
    }
}
