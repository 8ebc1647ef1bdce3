use std::process::ExitCode;

use clap::Parser;
use stakepool::adapter::inbound::cli::command::Cli;
use stakepool::adapter::inbound::cli::{self, output};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    output::configure(
        output::OutputConfig::new(cli.json, cli.quiet, cli.verbose),
        cli.color.forced(),
    );

    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let kind = e.as_domain().map(|d| d.kind().as_str());
            output::error(&e.to_string(), kind);
            ExitCode::from(cli::exit_code(&e))
        }
    }
}
