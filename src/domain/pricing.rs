//! Parimutuel pricing of a new stake.
//!
//! Odds are priced against the opposing pool, counting the new stake on
//! both sides of the ratio:
//!
//! ```text
//! odds = (total_pool + amount) / (opposing_pool + amount)
//! ```
//!
//! so `odds >= 1` for any positive amount and the denominator is never zero,
//! even when the opposing pool is empty. The resulting potential win is a
//! point-in-time estimate; later stakes move the ratio.
//!
//! Amounts are validated at the money scale the market was opened with.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::DomainError;
use super::market::Market;
use super::money::{Amount, Odds, Precision};
use super::side::Side;

/// Locked-in price of a stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub position: Side,
    pub amount: Amount,
    pub odds: Odds,
    pub potential_win: Amount,
}

/// Validate an amount against the money precision.
///
/// # Errors
///
/// [`DomainError::InvalidAmount`] for non-positive amounts or amounts finer
/// than the smallest money unit.
pub fn validate_amount(amount: Amount, precision: &Precision) -> Result<(), DomainError> {
    if amount <= Decimal::ZERO {
        return Err(DomainError::InvalidAmount {
            amount,
            reason: "must be positive".to_string(),
        });
    }
    if !precision.fits_money_scale(amount) {
        return Err(DomainError::InvalidAmount {
            amount,
            reason: format!(
                "more than {} fractional digits",
                precision.money_scale
            ),
        });
    }
    Ok(())
}

/// Price a stake of `amount` on `position` without mutating the market.
///
/// Checks run in order: market active, not expired, amount valid. A stake
/// the pools could not hold is an invalid amount.
///
/// # Errors
///
/// [`DomainError::MarketNotActive`], [`DomainError::MarketExpired`] or
/// [`DomainError::InvalidAmount`].
pub fn quote(
    market: &Market,
    position: Side,
    amount: Amount,
    now: DateTime<Utc>,
    precision: &Precision,
) -> Result<Quote, DomainError> {
    let precision = market.precision(precision);
    market.ensure_accepting(now)?;
    validate_amount(amount, &precision)?;

    let out_of_range = |reason: &str| DomainError::InvalidAmount {
        amount,
        reason: reason.to_string(),
    };
    let new_total = market
        .total_pool()
        .checked_add(amount)
        .ok_or_else(|| out_of_range("pool would overflow"))?;
    let opposing = market
        .pool(position.opposite())
        .checked_add(amount)
        .ok_or_else(|| out_of_range("pool would overflow"))?;
    let odds = new_total
        .checked_div(opposing)
        .map(|odds| precision.round_odds(odds))
        .ok_or_else(|| out_of_range("odds out of range"))?;
    let potential_win = amount
        .checked_mul(odds)
        .map(|win| precision.round_money(win))
        .ok_or_else(|| out_of_range("potential win out of range"))?;

    Ok(Quote {
        position,
        amount,
        odds,
        potential_win,
    })
}
