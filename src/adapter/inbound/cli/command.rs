//! Command-line interface definitions.
//!
//! Defines the CLI structure for the stakepool ledger using `clap`: opening
//! markets, placing and quoting stakes, resolving markets and auditing the
//! books.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{ArgGroup, Args, Parser, Subcommand};
use rust_decimal::Decimal;

/// Parimutuel YES/NO pool ledger
#[derive(Parser, Debug)]
#[command(name = "stakepool")]
#[command(version, about)]
pub struct Cli {
    /// Path to the configuration file [default: ./stakepool.toml if present]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite database, overriding the configuration
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Use this RFC 3339 instant as the current time
    #[arg(long, global = true, value_name = "TIME")]
    pub at: Option<DateTime<Utc>>,

    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Forced color setting, if any.
    #[must_use]
    pub const fn forced(self) -> Option<bool> {
        match self {
            Self::Auto => None,
            Self::Always => Some(true),
            Self::Never => Some(false),
        }
    }
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open, inspect and list markets
    #[command(subcommand)]
    Market(MarketCommand),

    /// Place, quote and list stakes
    #[command(subcommand)]
    Stake(StakeCommand),

    /// Resolve an expired market and settle its stakes
    Resolve(ResolveArgs),

    /// Check markets against the ledger invariants
    Audit(AuditArgs),
}

/// Subcommands for `stakepool market`.
#[derive(Subcommand, Debug)]
pub enum MarketCommand {
    /// Open a new market.
    Open(MarketOpenArgs),
    /// Show one market with its pools and current odds.
    Show(MarketArg),
    /// List all markets.
    List,
}

/// Subcommands for `stakepool stake`.
#[derive(Subcommand, Debug)]
pub enum StakeCommand {
    /// Place a stake at the odds it locks in.
    Place(StakePlaceArgs),
    /// Price a stake without placing it.
    Quote(StakeQuoteArgs),
    /// List stakes of a market or of a user.
    List(StakeListArgs),
}

/// A single market id argument.
#[derive(Args, Debug)]
pub struct MarketArg {
    /// Market id.
    pub market: String,
}

/// Arguments for `market open`.
#[derive(Args, Debug)]
pub struct MarketOpenArgs {
    /// Market id.
    pub market: String,

    /// The YES/NO question.
    #[arg(short = 'Q', long)]
    pub question: String,

    /// When staking closes (RFC 3339).
    #[arg(long, value_name = "TIME")]
    pub expires: DateTime<Utc>,
}

/// Arguments for `stake place`.
#[derive(Args, Debug)]
pub struct StakePlaceArgs {
    /// Market id.
    pub market: String,

    /// Side to back: yes or no.
    pub position: String,

    /// Amount to stake.
    #[arg(allow_negative_numbers = true)]
    pub amount: Decimal,

    /// Staking user.
    #[arg(short, long)]
    pub user: String,
}

/// Arguments for `stake quote`.
#[derive(Args, Debug)]
pub struct StakeQuoteArgs {
    /// Market id.
    pub market: String,

    /// Side to back: yes or no.
    pub position: String,

    /// Amount to stake.
    #[arg(allow_negative_numbers = true)]
    pub amount: Decimal,
}

/// Arguments for `stake list`.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("owner").required(true).args(["market", "user"])))]
pub struct StakeListArgs {
    /// Stakes of this market, in placement order.
    #[arg(short, long)]
    pub market: Option<String>,

    /// Stakes of this user, oldest first.
    #[arg(short, long)]
    pub user: Option<String>,
}

/// Arguments for `resolve`.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Market id.
    pub market: String,

    /// Winning outcome: YES or NO.
    pub outcome: String,
}

/// Arguments for `audit`.
#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Market id. Audits every market when omitted.
    pub market: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rust_decimal_macros::dec;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_name() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_name(), "stakepool");
        assert!(cmd.get_version().is_some());
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "stakepool",
            "market",
            "list",
            "--json",
            "-vv",
            "--database",
            "ledger.db",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.database.as_deref(), Some("ledger.db"));
        assert!(matches!(cli.command, Commands::Market(MarketCommand::List)));
    }

    #[test]
    fn test_parse_at_override() {
        let cli = Cli::try_parse_from([
            "stakepool",
            "--at",
            "2026-01-01T00:00:00Z",
            "audit",
        ])
        .unwrap();
        assert_eq!(cli.at.unwrap().to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_parse_market_open() {
        let cli = Cli::try_parse_from([
            "stakepool",
            "market",
            "open",
            "rain",
            "--question",
            "Will it rain?",
            "--expires",
            "2026-06-01T12:00:00Z",
        ])
        .unwrap();
        match cli.command {
            Commands::Market(MarketCommand::Open(args)) => {
                assert_eq!(args.market, "rain");
                assert_eq!(args.question, "Will it rain?");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_stake_place() {
        let cli = Cli::try_parse_from([
            "stakepool", "stake", "place", "rain", "yes", "12.5", "--user", "alice",
        ])
        .unwrap();
        match cli.command {
            Commands::Stake(StakeCommand::Place(args)) => {
                assert_eq!(args.position, "yes");
                assert_eq!(args.amount, dec!(12.5));
                assert_eq!(args.user, "alice");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_stake_amount_must_be_decimal() {
        let result = Cli::try_parse_from([
            "stakepool", "stake", "quote", "rain", "yes", "lots",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_stake_list_needs_market_or_user() {
        assert!(Cli::try_parse_from(["stakepool", "stake", "list"]).is_err());
        assert!(Cli::try_parse_from(["stakepool", "stake", "list", "-u", "alice"]).is_ok());
    }

    #[test]
    fn test_color_choice_forced() {
        assert_eq!(ColorChoice::Auto.forced(), None);
        assert_eq!(ColorChoice::Always.forced(), Some(true));
        assert_eq!(ColorChoice::Never.forced(), Some(false));
    }
}
