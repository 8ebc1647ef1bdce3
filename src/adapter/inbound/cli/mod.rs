//! Command-line adapter.
//!
//! Resolves configuration, opens the SQLite ledger and dispatches each
//! subcommand to its handler. `now` is read once per invocation from the
//! [`Clock`], so `--at` replays a command at any instant.

pub mod audit;
pub mod command;
pub mod market;
pub mod output;
pub mod resolve;
pub mod stake;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::adapter::outbound::sqlite::database::connection;
use crate::adapter::outbound::sqlite::SqliteLedgerStore;
use crate::application::LedgerEngine;
use crate::domain::ErrorKind;
use crate::error::{Error, Result};
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::clock::{Clock, FixedClock, SystemClock};
use crate::port::outbound::store::LedgerStore;

use command::{Cli, Commands, MarketCommand, StakeCommand};

/// Exit code for a failed command.
///
/// Rejected input exits 2, missing markets 3, state conflicts 4 and lost
/// races 5. Everything else exits 1.
#[must_use]
pub fn exit_code(err: &Error) -> u8 {
    match err.as_domain().map(|e| e.kind()) {
        Some(ErrorKind::InvalidInput) => 2,
        Some(ErrorKind::NotFound) => 3,
        Some(ErrorKind::InvalidState) => 4,
        Some(ErrorKind::ConcurrencyConflict) => 5,
        None => 1,
    }
}

/// Load configuration, applying command-line overrides.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
#[allow(clippy::result_large_err)]
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(database) = &cli.database {
        config.database.clone_from(database);
    }
    config.logging = match cli.verbose {
        0 => config.logging,
        1 => config.logging.with_level("debug"),
        _ => config.logging.with_level("trace"),
    };
    Ok(config)
}

/// Run a parsed command line to completion.
///
/// # Errors
///
/// Returns the first error raised by configuration, storage or the ledger.
pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    config.init_logging();

    let pool = connection::open(&config.database)?;
    let engine = LedgerEngine::new(Arc::new(SqliteLedgerStore::new(pool)), config.policy());

    let clock: Box<dyn Clock> = match cli.at {
        Some(at) => Box::new(FixedClock::new(at)),
        None => Box::new(SystemClock),
    };

    dispatch(&engine, clock.now(), cli.command).await
}

/// Route a subcommand to its handler.
///
/// # Errors
///
/// Returns the handler's error.
pub async fn dispatch<S: LedgerStore>(
    engine: &LedgerEngine<S>,
    now: DateTime<Utc>,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::Market(MarketCommand::Open(args)) => market::open(engine, now, args).await,
        Commands::Market(MarketCommand::Show(args)) => {
            market::show(engine, now, &args.market).await
        }
        Commands::Market(MarketCommand::List) => market::list(engine).await,
        Commands::Stake(StakeCommand::Place(args)) => stake::place(engine, now, args).await,
        Commands::Stake(StakeCommand::Quote(args)) => stake::quote(engine, now, args).await,
        Commands::Stake(StakeCommand::List(args)) => stake::list(engine, args).await,
        Commands::Resolve(args) => resolve::execute(engine, now, args).await,
        Commands::Audit(args) => audit::execute(engine, args).await,
    }
}
