//! Handlers for `stake place|quote|list`.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::{StakeListArgs, StakePlaceArgs, StakeQuoteArgs};
use crate::adapter::inbound::cli::market::timestamp;
use crate::adapter::inbound::cli::output;
use crate::application::LedgerEngine;
use crate::domain::{MarketId, Side, Stake, UserId};
use crate::error::Result;
use crate::port::outbound::store::LedgerStore;

#[derive(Tabled)]
struct StakeRow {
    #[tabled(rename = "#")]
    sequence: u64,
    #[tabled(rename = "Market")]
    market: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Side")]
    side: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Odds")]
    odds: String,
    #[tabled(rename = "Win")]
    potential_win: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Placed")]
    placed_at: String,
}

impl From<&Stake> for StakeRow {
    fn from(stake: &Stake) -> Self {
        Self {
            sequence: stake.sequence(),
            market: stake.market_id().to_string(),
            user: stake.user_id().to_string(),
            side: stake.position().to_string(),
            amount: stake.amount().to_string(),
            odds: stake.odds().to_string(),
            potential_win: stake.potential_win().to_string(),
            status: stake.status().to_string(),
            placed_at: timestamp(stake.placed_at()),
        }
    }
}

/// Execute `stake place`.
pub async fn place<S: LedgerStore>(
    engine: &LedgerEngine<S>,
    now: DateTime<Utc>,
    args: StakePlaceArgs,
) -> Result<()> {
    let position = Side::from_str(&args.position)?;
    let stake = engine
        .place_stake(
            &MarketId::new(args.market),
            UserId::new(args.user),
            args.amount,
            position,
            now,
        )
        .await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "stake.place",
            "stake": stake,
        }));
        return Ok(());
    }

    output::success(&format!(
        "Staked {} on {} in {}",
        stake.amount(),
        output::highlight(position.as_str().to_uppercase()),
        stake.market_id()
    ));
    output::field("Stake", stake.id());
    output::field("Odds", stake.odds());
    output::field("Potential win", output::positive(stake.potential_win()));
    Ok(())
}

/// Execute `stake quote`.
pub async fn quote<S: LedgerStore>(
    engine: &LedgerEngine<S>,
    now: DateTime<Utc>,
    args: StakeQuoteArgs,
) -> Result<()> {
    let position = Side::from_str(&args.position)?;
    let market_id = MarketId::new(args.market);
    let quote = engine
        .quote_stake(&market_id, args.amount, position, now)
        .await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "stake.quote",
            "market": market_id,
            "quote": quote,
        }));
        return Ok(());
    }

    output::section(&format!(
        "Quote for {} on {}",
        quote.amount,
        position.as_str().to_uppercase()
    ));
    output::field("Odds", quote.odds);
    output::field("Potential win", output::positive(quote.potential_win));
    output::note("Odds move with every stake; placing locks them in.");
    Ok(())
}

/// Execute `stake list`.
pub async fn list<S: LedgerStore>(engine: &LedgerEngine<S>, args: StakeListArgs) -> Result<()> {
    let stakes = match (args.market, args.user) {
        (Some(market), _) => engine.stakes(&MarketId::new(market)).await?,
        (None, Some(user)) => engine.user_stakes(&UserId::new(user)).await?,
        (None, None) => Vec::new(),
    };

    if output::is_json() {
        output::json_output(json!({
            "command": "stake.list",
            "stakes": stakes,
        }));
        return Ok(());
    }

    if stakes.is_empty() {
        output::note("No stakes.");
        return Ok(());
    }

    let rows: Vec<StakeRow> = stakes.iter().map(StakeRow::from).collect();
    output::lines(&Table::new(rows).to_string());
    Ok(())
}
