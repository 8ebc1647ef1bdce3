use rust_decimal::Decimal;
use stakepool::application::LedgerEngine;
use stakepool::domain::{MarketId, Side, Stake};
use stakepool::port::LedgerStore;
use stakepool::testkit::domain::{epoch, user};

/// Place `(user, side, amount)` stakes in order at the epoch.
pub async fn place_all<S: LedgerStore>(
    engine: &LedgerEngine<S>,
    market: &MarketId,
    book: &[(&str, Side, Decimal)],
) -> Vec<Stake> {
    let mut stakes = Vec::with_capacity(book.len());
    for (name, side, amount) in book {
        let stake = engine
            .place_stake(market, user(name), *amount, *side, epoch())
            .await
            .expect("place stake");
        stakes.push(stake);
    }
    stakes
}
