//! Builders for domain primitives used across tests.
//!
//! Tests run against a fixed epoch so timestamps survive persistence
//! round trips and expiry checks are deterministic.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::domain::{MarketId, UserId};

/// Fixed instant every fixture is relative to: 2026-01-01T00:00:00Z.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// `epoch() + minutes`.
pub fn at(minutes: i64) -> DateTime<Utc> {
    epoch() + Duration::minutes(minutes)
}

/// Expiry used by [`crate::testkit::ledger::open_market`]: one hour after
/// the epoch.
pub fn expiry() -> DateTime<Utc> {
    at(60)
}

/// Instant after [`expiry`], when markets can be resolved.
pub fn after_expiry() -> DateTime<Utc> {
    at(120)
}

/// Create a [`MarketId`] from a string.
pub fn market_id(id: &str) -> MarketId {
    MarketId::from(id)
}

/// Create a [`UserId`] from a string.
pub fn user(id: &str) -> UserId {
    UserId::from(id)
}

/// Generate `n` user ids named `u0`, `u1`, ..., `u{n-1}`.
pub fn make_users(n: usize) -> Vec<UserId> {
    (0..n).map(|i| UserId::from(format!("u{i}"))).collect()
}
