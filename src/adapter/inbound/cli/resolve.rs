//! Handler for the `resolve` command.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::ResolveArgs;
use crate::adapter::inbound::cli::output;
use crate::application::LedgerEngine;
use crate::domain::{MarketId, Side};
use crate::error::Result;
use crate::port::outbound::store::LedgerStore;

#[derive(Tabled)]
struct PayoutRow {
    #[tabled(rename = "Stake")]
    stake: String,
    #[tabled(rename = "Payout")]
    amount: String,
}

/// Execute the resolve command.
pub async fn execute<S: LedgerStore>(
    engine: &LedgerEngine<S>,
    now: DateTime<Utc>,
    args: ResolveArgs,
) -> Result<()> {
    let outcome = Side::parse_outcome(&args.outcome)?;
    let resolution = engine
        .resolve_market(&MarketId::new(args.market), outcome, now)
        .await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "resolve",
            "resolution": resolution,
        }));
        return Ok(());
    }

    let market = &resolution.market;
    output::success(&format!(
        "Resolved {} as {}",
        output::highlight(market.id()),
        outcome.as_str().to_uppercase()
    ));
    output::field("Total pool", market.total_pool());
    output::field("Fee", resolution.resolution_fee);
    output::field("Winners", resolution.winning_count);
    output::field("Losers", resolution.losing_count);
    output::field("Paid", output::positive(resolution.total_paid));
    if resolution.unallocated > Decimal::ZERO {
        output::field("Unallocated", resolution.unallocated);
    }
    if resolution.forfeited > Decimal::ZERO {
        output::warning(&format!(
            "Nobody backed {}; pool of {} forfeited",
            outcome.as_str().to_uppercase(),
            output::negative(resolution.forfeited)
        ));
    }

    if output::verbosity() > 0 && !resolution.payouts.is_empty() {
        let rows: Vec<PayoutRow> = resolution
            .payouts
            .iter()
            .map(|p| PayoutRow {
                stake: p.stake_id.to_string(),
                amount: p.amount.to_string(),
            })
            .collect();
        output::section("Payouts");
        output::lines(&Table::new(rows).to_string());
    }
    Ok(())
}
