//! Monetary types and rounding rules.
//!
//! Pools, stakes and payouts are exact decimals. Two scales are in play:
//! the money scale (smallest transferable unit) and the odds scale. Values
//! shown to users as estimates round half-to-even; winner shares truncate so
//! a settlement never pays out more than the pool holds.
//!
//! Unit counts are unbounded integers: a whole pool at the money scale can
//! exceed what `i128` holds once it is multiplied by a stake.

use num_bigint::BigUint;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

/// A quantity of money.
pub type Amount = Decimal;

/// Parimutuel odds (payout per unit staked).
pub type Odds = Decimal;

/// Default number of fractional digits for money.
pub const DEFAULT_MONEY_SCALE: u32 = 6;

/// Default number of fractional digits for odds.
pub const DEFAULT_ODDS_SCALE: u32 = 8;

/// Fractional precision used by pricing and settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Precision {
    /// Fractional digits of the smallest money unit.
    pub money_scale: u32,
    /// Fractional digits kept on locked-in odds.
    pub odds_scale: u32,
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            money_scale: DEFAULT_MONEY_SCALE,
            odds_scale: DEFAULT_ODDS_SCALE,
        }
    }
}

impl Precision {
    /// Smallest representable money unit, e.g. `0.000001` for scale 6.
    #[must_use]
    pub fn money_unit(&self) -> Amount {
        Decimal::new(1, self.money_scale)
    }

    /// Round a money value half-to-even.
    #[must_use]
    pub fn round_money(&self, value: Amount) -> Amount {
        value.round_dp_with_strategy(self.money_scale, RoundingStrategy::MidpointNearestEven)
    }

    /// Truncate a money value toward zero.
    #[must_use]
    pub fn truncate_money(&self, value: Amount) -> Amount {
        value.round_dp_with_strategy(self.money_scale, RoundingStrategy::ToZero)
    }

    /// Round odds half-to-even.
    #[must_use]
    pub fn round_odds(&self, value: Odds) -> Odds {
        value.round_dp_with_strategy(self.odds_scale, RoundingStrategy::MidpointNearestEven)
    }

    /// True when `value` has no digits below the money unit.
    #[must_use]
    pub fn fits_money_scale(&self, value: Amount) -> bool {
        value.normalize().scale() <= self.money_scale
    }

    /// Exact count of money units in `value`.
    ///
    /// `None` when `value` is negative or has digits below the money unit.
    #[must_use]
    pub fn units(&self, value: Amount) -> Option<BigUint> {
        if value.is_sign_negative() && !value.is_zero() {
            return None;
        }
        let value = value.normalize();
        let shift = self.money_scale.checked_sub(value.scale())?;
        Some(BigUint::from(value.mantissa().unsigned_abs()) * BigUint::from(10u32).pow(shift))
    }

    /// Money value of `units` smallest units, truncated toward zero to the
    /// finest scale a decimal can hold.
    ///
    /// `None` only when even the whole part is out of decimal range.
    #[must_use]
    pub fn from_units(&self, units: &BigUint) -> Option<Amount> {
        let ten = BigUint::from(10u32);
        let mut mantissa = units.clone();
        let mut scale = self.money_scale;
        loop {
            if let Some(value) = u128::try_from(&mantissa)
                .ok()
                .and_then(|m| i128::try_from(m).ok())
                .and_then(|m| Decimal::try_from_i128_with_scale(m, scale).ok())
            {
                return Some(value);
            }
            if scale == 0 {
                return None;
            }
            mantissa /= &ten;
            scale -= 1;
            if mantissa.bits() == 0 {
                return Some(Decimal::ZERO);
            }
        }
    }
}
