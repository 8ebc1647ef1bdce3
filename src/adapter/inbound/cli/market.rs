//! Handlers for `market open|show|list`.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::MarketOpenArgs;
use crate::adapter::inbound::cli::output;
use crate::application::LedgerEngine;
use crate::domain::{Market, MarketId, Side};
use crate::error::Result;
use crate::port::outbound::store::LedgerStore;

#[derive(Tabled)]
struct MarketRow {
    #[tabled(rename = "Market")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "YES")]
    yes: String,
    #[tabled(rename = "NO")]
    no: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Stakes")]
    stakes: u64,
    #[tabled(rename = "Expires")]
    expires: String,
}

impl From<&Market> for MarketRow {
    fn from(market: &Market) -> Self {
        Self {
            id: market.id().to_string(),
            status: market.status().to_string(),
            yes: market.yes_pool().to_string(),
            no: market.no_pool().to_string(),
            total: market.total_pool().to_string(),
            stakes: market.stake_count(),
            expires: timestamp(market.expires_at()),
        }
    }
}

pub(crate) fn timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Execute `market open`.
pub async fn open<S: LedgerStore>(
    engine: &LedgerEngine<S>,
    now: DateTime<Utc>,
    args: MarketOpenArgs,
) -> Result<()> {
    let market = engine
        .open_market(MarketId::new(args.market), &args.question, args.expires, now)
        .await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "market.open",
            "market": market,
        }));
        return Ok(());
    }

    output::success(&format!("Opened market {}", output::highlight(market.id())));
    output::field("Question", market.question());
    output::field("Expires", timestamp(market.expires_at()));
    Ok(())
}

/// Execute `market show`.
pub async fn show<S: LedgerStore>(
    engine: &LedgerEngine<S>,
    now: DateTime<Utc>,
    market_id: &str,
) -> Result<()> {
    let market = engine.market(&MarketId::new(market_id)).await?;

    // Odds a single unit would lock in right now, while staking is open.
    let mut odds = Vec::new();
    if market.ensure_accepting(now).is_ok() {
        for side in [Side::Yes, Side::No] {
            let quote = engine
                .quote_stake(market.id(), Decimal::ONE, side, now)
                .await?;
            odds.push((side, quote.odds));
        }
    }

    if output::is_json() {
        let odds: serde_json::Map<String, serde_json::Value> = odds
            .iter()
            .map(|(side, odds)| (side.to_string(), json!(odds)))
            .collect();
        output::json_output(json!({
            "command": "market.show",
            "market": market,
            "odds": odds,
        }));
        return Ok(());
    }

    output::section(&format!("Market {}", market.id()));
    output::field("Question", market.question());
    output::field("Status", market.status());
    output::field("YES pool", market.yes_pool());
    output::field("NO pool", market.no_pool());
    output::field("Total pool", market.total_pool());
    output::field("Stakes", market.stake_count());
    output::field("Created", timestamp(market.created_at()));
    output::field("Expires", timestamp(market.expires_at()));
    for (side, odds) in &odds {
        output::field(&format!("{} odds", side.as_str().to_uppercase()), odds);
    }
    if let Some(resolved_at) = market.resolved_at() {
        output::field("Resolved", timestamp(resolved_at));
    }
    if let Some(fee) = market.resolution_fee() {
        output::field("Fee", fee);
    }
    if let Some(payout_pool) = market.payout_pool() {
        output::field("Payout pool", payout_pool);
    }
    Ok(())
}

/// Execute `market list`.
pub async fn list<S: LedgerStore>(engine: &LedgerEngine<S>) -> Result<()> {
    let markets = engine.markets().await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "market.list",
            "markets": markets,
        }));
        return Ok(());
    }

    if markets.is_empty() {
        output::note("No markets yet.");
        return Ok(());
    }

    let rows: Vec<MarketRow> = markets.iter().map(MarketRow::from).collect();
    output::lines(&Table::new(rows).to_string());
    Ok(())
}
