use rust_decimal::Decimal;
use stakepool::domain::{Market, Stake, StakeStatus};

pub fn assert_decimal_near(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "expected {} ± {}, got {}",
        expected,
        tolerance,
        actual
    );
}

/// Pools add up and each side equals the sum of its stakes.
pub fn assert_pools_conserved(market: &Market, stakes: &[Stake]) {
    assert_eq!(
        market.total_pool(),
        market.yes_pool() + market.no_pool(),
        "total pool out of balance"
    );
    for side in [stakepool::domain::Side::Yes, stakepool::domain::Side::No] {
        let staked: Decimal = stakes
            .iter()
            .filter(|s| s.position() == side)
            .map(Stake::amount)
            .sum();
        assert_eq!(market.pool(side), staked, "{side} pool differs from its stakes");
    }
}

/// Sum of payouts actually owed to winning stakes.
pub fn total_paid(stakes: &[Stake]) -> Decimal {
    stakes
        .iter()
        .filter(|s| s.status() == StakeStatus::Won)
        .map(Stake::potential_win)
        .sum()
}
