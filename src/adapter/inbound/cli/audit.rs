//! Handler for the `audit` command.

use serde_json::json;

use crate::adapter::inbound::cli::command::AuditArgs;
use crate::adapter::inbound::cli::output;
use crate::application::LedgerEngine;
use crate::domain::{AuditIssue, MarketId};
use crate::error::{Error, Result};
use crate::port::outbound::store::LedgerStore;

/// Execute the audit command.
///
/// Fails with [`Error::AuditFailed`] when any market breaks an invariant.
pub async fn execute<S: LedgerStore>(engine: &LedgerEngine<S>, args: AuditArgs) -> Result<()> {
    let market_ids: Vec<MarketId> = match args.market {
        Some(id) => vec![MarketId::new(id)],
        None => engine
            .markets()
            .await?
            .into_iter()
            .map(|m| m.id().clone())
            .collect(),
    };

    let mut reports: Vec<(MarketId, Vec<AuditIssue>)> = Vec::with_capacity(market_ids.len());
    for id in market_ids {
        let issues = engine.audit(&id).await?;
        reports.push((id, issues));
    }

    let failing = reports.iter().filter(|(_, issues)| !issues.is_empty()).count();
    let issues: usize = reports.iter().map(|(_, issues)| issues.len()).sum();

    if output::is_json() {
        let markets: Vec<serde_json::Value> = reports
            .iter()
            .map(|(id, issues)| json!({ "market": id, "issues": issues }))
            .collect();
        output::json_output(json!({
            "command": "audit",
            "clean": issues == 0,
            "markets": markets,
        }));
    } else if reports.is_empty() {
        output::note("No markets to audit.");
    } else {
        for (id, found) in &reports {
            if found.is_empty() {
                output::success(&format!("{id}: consistent"));
            } else {
                for issue in found {
                    output::warning(&format!("{id}: {issue}"));
                }
            }
        }
    }

    if issues > 0 {
        return Err(Error::AuditFailed {
            markets: failing,
            issues,
        });
    }
    Ok(())
}
